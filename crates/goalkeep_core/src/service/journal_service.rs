//! Journal use-case service.

use crate::export::{journal_entry_file_name, journal_entry_pdf};
use crate::model::ids::{JournalEntryId, UserId};
use crate::model::journal::{JournalCategory, JournalEntry, JournalPatch};
use crate::model::{now_epoch_ms, Keyed};
use crate::repo::journal_repo::JournalRepository;
use crate::service::{normalize_text, normalize_title, ServiceError, ServiceResult};
use log::info;

/// PDF bytes plus a suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Journal service over a journal repository.
pub struct JournalService<J: JournalRepository> {
    repo: J,
}

impl<J: JournalRepository> JournalService<J> {
    pub fn new(repo: J) -> Self {
        Self { repo }
    }

    pub fn create_entry(
        &self,
        user_id: &UserId,
        title: &str,
        content: &str,
        category: JournalCategory,
    ) -> ServiceResult<JournalEntryId> {
        let entry = JournalEntry::new(
            normalize_title("title", title)?,
            normalize_text("content", content, true)?,
            category,
            now_epoch_ms(),
        );
        Ok(self.repo.create_entry(user_id, &entry)?)
    }

    pub fn get_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
    ) -> ServiceResult<Option<JournalEntry>> {
        Ok(self.repo.get_entry(user_id, entry_id)?)
    }

    /// Entries newest first, optionally limited to one category.
    pub fn list_entries(
        &self,
        user_id: &UserId,
        category: Option<JournalCategory>,
    ) -> ServiceResult<Vec<Keyed<JournalEntryId, JournalEntry>>> {
        let mut entries = self
            .repo
            .list_entries(user_id)?
            .into_iter()
            .filter(|entry| category.map_or(true, |wanted| entry.record.category == wanted))
            .collect::<Vec<_>>();
        entries.sort_by(|left, right| {
            right
                .record
                .created_at
                .cmp(&left.record.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        Ok(entries)
    }

    pub fn update_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
        mut patch: JournalPatch,
    ) -> ServiceResult<JournalEntry> {
        self.require_entry(user_id, entry_id)?;
        if let Some(title) = patch.title.take() {
            patch.title = Some(normalize_title("title", &title)?);
        }
        if let Some(content) = patch.content.take() {
            patch.content = Some(normalize_text("content", &content, true)?);
        }
        if !patch.is_empty() {
            self.repo.update_entry(user_id, entry_id, &patch)?;
        }
        self.require_entry(user_id, entry_id)
    }

    pub fn delete_entry(&self, user_id: &UserId, entry_id: &JournalEntryId) -> ServiceResult<()> {
        self.require_entry(user_id, entry_id)?;
        Ok(self.repo.delete_entry(user_id, entry_id)?)
    }

    /// Renders one entry as PDF for saving on the device.
    pub fn export_entry_pdf(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
    ) -> ServiceResult<ExportedPdf> {
        let entry = self.require_entry(user_id, entry_id)?;
        let bytes = journal_entry_pdf(&entry);
        info!(
            "event=journal_export module=service status=ok format=pdf size_bytes={}",
            bytes.len()
        );
        Ok(ExportedPdf {
            file_name: journal_entry_file_name(&entry),
            bytes,
        })
    }

    fn require_entry(
        &self,
        user_id: &UserId,
        entry_id: &JournalEntryId,
    ) -> ServiceResult<JournalEntry> {
        self.repo
            .get_entry(user_id, entry_id)?
            .ok_or_else(|| ServiceError::not_found("journal entry", entry_id))
    }
}
