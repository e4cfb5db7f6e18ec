use goalkeep_core::db::open_db_in_memory;
use goalkeep_core::repo::post_repo::StorePostRepository;
use goalkeep_core::{FeedService, Identity, ServiceError, SqliteDocumentStore, UserId};

fn identity(user: &str, name: &str) -> Identity {
    Identity {
        user_id: UserId::parse(user).unwrap(),
        email: format!("{user}@example.com"),
        display_name: Some(name.to_string()),
        photo_url: None,
    }
}

#[test]
fn adding_then_deleting_comment_restores_prior_comments() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let feed = FeedService::new(StorePostRepository::new(&store));
    let ana = identity("ana", "Ana");
    let ben = identity("ben", "Ben");

    let post_id = feed.create_post(&ana, "Ran my first 5k!").unwrap();
    feed.add_comment(&ana, &post_id, "thanks all").unwrap();
    let before = feed.list_comments(&post_id).unwrap();

    let comment_id = feed.add_comment(&ben, &post_id, "well done").unwrap();
    let during = feed.list_comments(&post_id).unwrap();
    assert_eq!(during.len(), before.len() + 1);
    assert_eq!(during.last().unwrap().id, comment_id);
    assert_eq!(during.last().unwrap().record.author_name, "Ben");

    feed.delete_comment(&ben, &post_id, &comment_id).unwrap();
    assert_eq!(feed.list_comments(&post_id).unwrap(), before);
}

#[test]
fn deleting_only_comment_leaves_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let feed = FeedService::new(StorePostRepository::new(&store));
    let ana = identity("ana", "Ana");

    let post_id = feed.create_post(&ana, "hello").unwrap();
    let comment_id = feed.add_comment(&ana, &post_id, "first").unwrap();
    feed.delete_comment(&ana, &post_id, &comment_id).unwrap();

    assert!(feed.list_comments(&post_id).unwrap().is_empty());
    assert!(feed.get_post(&post_id).unwrap().unwrap().comments.is_empty());
}

#[test]
fn only_authors_may_edit_or_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let feed = FeedService::new(StorePostRepository::new(&store));
    let ana = identity("ana", "Ana");
    let ben = identity("ben", "Ben");

    let post_id = feed.create_post(&ana, "original").unwrap();
    let comment_id = feed.add_comment(&ana, &post_id, "mine").unwrap();

    let err = feed.edit_post(&ben, &post_id, "hijacked").unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));
    let err = feed.delete_post(&ben, &post_id).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));
    let err = feed
        .delete_comment(&ben, &post_id, &comment_id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden { .. }));

    let edited = feed.edit_post(&ana, &post_id, "  updated  ").unwrap();
    assert_eq!(edited.content, "updated");
    assert!(edited.edited_at.is_some());
    assert_eq!(edited.comments.len(), 1);
}

#[test]
fn encouragement_toggles_per_user() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let feed = FeedService::new(StorePostRepository::new(&store));
    let ana = identity("ana", "Ana");
    let ben = identity("ben", "Ben");
    let post_id = feed.create_post(&ana, "streak day 10").unwrap();

    assert!(feed.toggle_encouragement(&ben, &post_id).unwrap());
    assert!(feed.toggle_encouragement(&ana, &post_id).unwrap());
    let post = feed.get_post(&post_id).unwrap().unwrap();
    assert_eq!(post.encouragement_count(), 2);
    assert!(post.is_encouraged_by(&ben.user_id));

    assert!(!feed.toggle_encouragement(&ben, &post_id).unwrap());
    let post = feed.get_post(&post_id).unwrap().unwrap();
    assert_eq!(post.encouragement_count(), 1);
    assert!(!post.is_encouraged_by(&ben.user_id));
}

#[test]
fn deleting_post_removes_its_comments() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let feed = FeedService::new(StorePostRepository::new(&store));
    let ana = identity("ana", "Ana");
    let ben = identity("ben", "Ben");

    let post_id = feed.create_post(&ana, "bye").unwrap();
    feed.add_comment(&ben, &post_id, "see you").unwrap();
    feed.delete_post(&ana, &post_id).unwrap();

    assert!(feed.get_post(&post_id).unwrap().is_none());
    assert!(feed.list_comments(&post_id).unwrap().is_empty());
    let err = feed.add_comment(&ben, &post_id, "late").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "post", .. }));
}

#[test]
fn feed_lists_newest_first_with_author_from_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let feed = FeedService::new(StorePostRepository::new(&store));
    let mut ana = identity("ana", "Ana");
    ana.photo_url = Some("file:///ana.png".to_string());
    let anonymous = Identity {
        display_name: None,
        ..identity("cara", "unused")
    };

    let first = feed.create_post(&ana, "first").unwrap();
    let second = feed.create_post(&anonymous, "second").unwrap();

    let posts = feed.list_feed().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, second);
    assert_eq!(posts[0].record.author_name, "cara");
    assert_eq!(posts[1].id, first);
    assert_eq!(
        posts[1].record.author_photo_url.as_deref(),
        Some("file:///ana.png")
    );
    assert!(feed.create_post(&ana, "   ").is_err());
}
