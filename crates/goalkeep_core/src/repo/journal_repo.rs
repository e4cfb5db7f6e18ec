//! Journal repository contract and store-backed implementation.

use crate::model::ids::{JournalEntryId, UserId};
use crate::model::journal::{JournalEntry, JournalPatch};
use crate::model::Keyed;
use crate::repo::{decode, decode_collection, encode, paths, RepoResult};
use crate::store::DocumentStore;

/// Repository interface for journal entries.
pub trait JournalRepository {
    fn create_entry(&self, user_id: &UserId, entry: &JournalEntry) -> RepoResult<JournalEntryId>;
    fn get_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
    ) -> RepoResult<Option<JournalEntry>>;
    /// Every entry of the user, oldest first.
    fn list_entries(
        &self,
        user_id: &UserId,
    ) -> RepoResult<Vec<Keyed<JournalEntryId, JournalEntry>>>;
    fn update_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
        patch: &JournalPatch,
    ) -> RepoResult<()>;
    fn delete_entry(&self, user_id: &UserId, entry_id: &JournalEntryId) -> RepoResult<()>;
}

/// Journal repository over any `DocumentStore`.
pub struct StoreJournalRepository<S> {
    store: S,
}

impl<S: DocumentStore> StoreJournalRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: DocumentStore> JournalRepository for StoreJournalRepository<S> {
    fn create_entry(&self, user_id: &UserId, entry: &JournalEntry) -> RepoResult<JournalEntryId> {
        let collection = paths::journal(user_id)?;
        let path = self.store.push(&collection)?;
        self.store.set(&path, &encode(&path, entry)?)?;
        Ok(JournalEntryId::parse(path.key())?)
    }

    fn get_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
    ) -> RepoResult<Option<JournalEntry>> {
        let path = paths::journal_entry(user_id, entry_id)?;
        match self.store.get(&path)? {
            Some(value) => Ok(Some(decode(&path, value)?)),
            None => Ok(None),
        }
    }

    fn list_entries(
        &self,
        user_id: &UserId,
    ) -> RepoResult<Vec<Keyed<JournalEntryId, JournalEntry>>> {
        let path = paths::journal(user_id)?;
        let snapshot = self.store.get(&path)?;
        decode_collection(&path, snapshot, JournalEntryId::parse)
    }

    fn update_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
        patch: &JournalPatch,
    ) -> RepoResult<()> {
        let path = paths::journal_entry(user_id, entry_id)?;
        self.store.update(&path, &patch.to_fields())?;
        Ok(())
    }

    fn delete_entry(&self, user_id: &UserId, entry_id: &JournalEntryId) -> RepoResult<()> {
        self.store
            .remove(&paths::journal_entry(user_id, entry_id)?)?;
        Ok(())
    }
}
