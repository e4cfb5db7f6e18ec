use goalkeep_core::blob::MAX_PROFILE_IMAGE_BYTES;
use goalkeep_core::db::open_db_in_memory;
use goalkeep_core::repo::goal_repo::{GoalRepository, StoreGoalRepository};
use goalkeep_core::repo::user_repo::{StoreUserRepository, UserRepository};
use goalkeep_core::session::resolve_route;
use goalkeep_core::{
    BlobError, DirBlobStore, Goal, Identity, ProfileService, RouteDecision, Screen,
    ServiceError, SessionError, SessionProvider, SqliteDocumentStore, UserId,
};
use std::sync::{Arc, Mutex};

fn identity() -> Identity {
    Identity {
        user_id: UserId::parse("ana").unwrap(),
        email: "ana@example.com".to_string(),
        display_name: None,
        photo_url: None,
    }
}

#[test]
fn operations_require_signed_in_user() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let blobs = tempfile::tempdir().unwrap();
    let session = SessionProvider::new();
    let profiles = ProfileService::new(
        StoreUserRepository::new(&store),
        DirBlobStore::new(blobs.path()),
        &session,
    );

    let err = profiles.complete_onboarding("ana").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Session(SessionError::NotSignedIn)
    ));
}

#[test]
fn onboarding_writes_profile_next_to_existing_collections() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let blobs = tempfile::tempdir().unwrap();
    let session = SessionProvider::new();
    session.sign_in(identity());
    let profiles = ProfileService::new(
        StoreUserRepository::new(&store),
        DirBlobStore::new(blobs.path()),
        &session,
    );
    let goals = StoreGoalRepository::new(&store);
    let user_id = identity().user_id;
    goals
        .create_goal(&user_id, &Goal::new("Run 5k", "", 1))
        .unwrap();

    assert!(profiles.get_profile().unwrap().is_none());
    assert!(!profiles.is_onboarded().unwrap());
    assert_eq!(
        resolve_route(Screen::Goals, session.current().as_ref(), false),
        RouteDecision::Redirect(Screen::Onboarding)
    );

    let profile = profiles.complete_onboarding("  Ana  ").unwrap();
    assert_eq!(profile.username, "Ana");
    assert!(profile.onboarded);
    assert_eq!(profiles.get_profile().unwrap(), Some(profile.clone()));
    assert_eq!(goals.list_goals(&user_id).unwrap().len(), 1);
    assert_eq!(
        session.current().unwrap().display_name.as_deref(),
        Some("Ana")
    );
    assert_eq!(
        resolve_route(
            Screen::Goals,
            session.current().as_ref(),
            profiles.is_onboarded().unwrap()
        ),
        RouteDecision::Allow(Screen::Goals)
    );

    let renamed = profiles.update_username("Ana R").unwrap();
    assert_eq!(renamed.username, "Ana R");
    assert_eq!(renamed.created_at, profile.created_at);
    assert_eq!(renamed.email, "ana@example.com");
}

#[test]
fn photo_upload_updates_profile_and_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let blobs = tempfile::tempdir().unwrap();
    let session = SessionProvider::new();
    session.sign_in(identity());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    session.subscribe(move |current| {
        sink.lock()
            .unwrap()
            .push(current.and_then(|identity| identity.photo_url.clone()));
    });
    let profiles = ProfileService::new(
        StoreUserRepository::new(&store),
        DirBlobStore::new(blobs.path()),
        &session,
    );
    profiles.complete_onboarding("ana").unwrap();

    let bytes = b"\x89PNG\r\n\x1a\nfake-image".to_vec();
    let url = profiles.upload_photo(&bytes, "image/png").unwrap();

    assert!(url.starts_with("file://"));
    assert!(url.ends_with(".png"));
    let stored_path = url.trim_start_matches("file://");
    assert_eq!(std::fs::read(stored_path).unwrap(), bytes);
    assert_eq!(
        profiles.get_profile().unwrap().unwrap().photo_url.as_deref(),
        Some(url.as_str())
    );
    assert_eq!(session.current().unwrap().photo_url.as_deref(), Some(url.as_str()));
    assert_eq!(seen.lock().unwrap().last().cloned().flatten(), Some(url));
}

#[test]
fn rejected_uploads_leave_profile_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let blobs = tempfile::tempdir().unwrap();
    let session = SessionProvider::new();
    session.sign_in(identity());
    let profiles = ProfileService::new(
        StoreUserRepository::new(&store),
        DirBlobStore::new(blobs.path()),
        &session,
    );
    profiles.complete_onboarding("ana").unwrap();

    let too_large = vec![0u8; MAX_PROFILE_IMAGE_BYTES + 1];
    let err = profiles.upload_photo(&too_large, "image/png").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Blob(BlobError::TooLarge { .. })
    ));

    let err = profiles.upload_photo(b"%PDF", "application/pdf").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Blob(BlobError::UnsupportedContentType(_))
    ));

    assert_eq!(profiles.get_profile().unwrap().unwrap().photo_url, None);
    assert!(std::fs::read_dir(blobs.path()).unwrap().next().is_none());
}

#[test]
fn deleting_account_removes_user_data_and_signs_out() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let blobs = tempfile::tempdir().unwrap();
    let session = SessionProvider::new();
    session.sign_in(identity());
    let profiles = ProfileService::new(
        StoreUserRepository::new(&store),
        DirBlobStore::new(blobs.path()),
        &session,
    );
    let users = StoreUserRepository::new(&store);
    let goals = StoreGoalRepository::new(&store);
    let user_id = identity().user_id;
    profiles.complete_onboarding("ana").unwrap();
    goals
        .create_goal(&user_id, &Goal::new("Run 5k", "", 1))
        .unwrap();

    profiles.delete_account().unwrap();

    assert!(!session.is_signed_in());
    assert!(users.get_profile(&user_id).unwrap().is_none());
    assert!(goals.list_goals(&user_id).unwrap().is_empty());
}
