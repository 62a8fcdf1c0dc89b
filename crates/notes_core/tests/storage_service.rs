use futures::StreamExt;
use notes_core::db::open_db_in_memory;
use notes_core::{
    Note, NoteRepository, RepoError, SessionAccount, SqliteNoteRepository, StorageError,
    StorageService, User,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const FEED_TIMEOUT: Duration = Duration::from_secs(1);

fn service(
    account: &Arc<SessionAccount>,
) -> (
    StorageService<SessionAccount, SqliteNoteRepository>,
    SqliteNoteRepository,
) {
    let repo = SqliteNoteRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    (StorageService::new(Arc::clone(account), repo.clone()), repo)
}

fn signed_in(user_id: &str) -> Arc<SessionAccount> {
    Arc::new(SessionAccount::signed_in(User::new(user_id)))
}

#[tokio::test]
async fn create_then_read_returns_equal_fields() {
    let account = signed_in("user-a");
    let (service, _) = service(&account);

    let id = service
        .create_note(&Note::new("n-1", "Groceries", "milk", "user-a"))
        .await
        .unwrap();
    assert_eq!(id, "n-1");

    let loaded = service.read_note("n-1").await.unwrap().unwrap();
    assert_eq!(loaded, Note::new("n-1", "Groceries", "milk", "user-a"));
}

#[tokio::test]
async fn create_assigns_ids_and_stamps_owner() {
    let account = signed_in("user-a");
    let (service, _) = service(&account);

    let draft_id = service
        .create_note(&Note::draft("Draft", "body"))
        .await
        .unwrap();
    let placeholder_id = service
        .create_note(&Note::new("-1", "New", "body", "someone-else"))
        .await
        .unwrap();

    assert!(!draft_id.is_empty());
    assert_ne!(draft_id, placeholder_id);
    assert_ne!(placeholder_id, "-1");
    let stored = service.read_note(&placeholder_id).await.unwrap().unwrap();
    assert_eq!(stored.user_id, "user-a");
}

#[tokio::test]
async fn create_propagates_duplicate_id_failure() {
    let account = signed_in("user-a");
    let (service, _) = service(&account);
    let note = Note::new("n-1", "t", "c", "user-a");

    service.create_note(&note).await.unwrap();
    let err = service.create_note(&note).await.unwrap_err();
    assert!(matches!(err, StorageError::Repo(RepoError::Db(_))));
}

#[tokio::test]
async fn update_upserts_and_is_idempotent() {
    let account = signed_in("user-a");
    let (service, repo) = service(&account);
    let note = Note::new("n-1", "Plan", "v1", "user-a");

    service.update_note(&note).await.unwrap();
    assert_eq!(service.read_note("n-1").await.unwrap(), Some(note.clone()));

    service.update_note(&note).await.unwrap();
    assert_eq!(repo.list_notes("user-a").unwrap(), vec![note.clone()]);

    let edited = Note {
        content: "v2".to_string(),
        ..note
    };
    service.update_note(&edited).await.unwrap();
    assert_eq!(service.read_note("n-1").await.unwrap(), Some(edited));
}

#[tokio::test]
async fn update_rejects_unassigned_ids() {
    let account = signed_in("user-a");
    let (service, _) = service(&account);

    let err = service
        .update_note(&Note::draft("t", "c"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidNoteId(_)));
}

#[tokio::test]
async fn delete_then_read_returns_absent_and_repeat_delete_is_ok() {
    let account = signed_in("user-a");
    let (service, _) = service(&account);
    service
        .create_note(&Note::new("n-1", "t", "c", "user-a"))
        .await
        .unwrap();

    service.delete_note("n-1").await.unwrap();
    assert_eq!(service.read_note("n-1").await.unwrap(), None);
    service.delete_note("n-1").await.unwrap();
}

#[tokio::test]
async fn operations_require_a_signed_in_user() {
    let account = Arc::new(SessionAccount::new());
    let (service, _) = service(&account);

    assert!(matches!(
        service.read_note("n-1").await,
        Err(StorageError::NotSignedIn)
    ));
    assert!(matches!(
        service.create_note(&Note::draft("t", "c")).await,
        Err(StorageError::NotSignedIn)
    ));
    assert!(matches!(
        service.delete_note("n-1").await,
        Err(StorageError::NotSignedIn)
    ));
    assert!(matches!(
        service.update_note(&Note::draft("t", "c")).await,
        Err(StorageError::NotSignedIn)
    ));
    assert!(matches!(
        service.update_note(&Note::new("n-1", "t", "c", "")).await,
        Err(StorageError::NotSignedIn)
    ));
}

#[tokio::test]
async fn users_cannot_see_or_delete_each_others_notes() {
    let account = signed_in("user-a");
    let (service, repo) = service(&account);
    service
        .create_note(&Note::new("n-1", "t", "c", "user-a"))
        .await
        .unwrap();

    account.sign_in(User::new("user-b"));
    assert_eq!(service.read_note("n-1").await.unwrap(), None);
    service.delete_note("n-1").await.unwrap();
    assert!(repo.find_note("user-a", "n-1").unwrap().is_some());

    let err = service
        .update_note(&Note::new("n-1", "mine now", "c", "user-b"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Repo(RepoError::OwnershipConflict(_))
    ));
}

#[tokio::test]
async fn feed_yields_current_list_and_follows_writes() {
    let account = signed_in("user-a");
    let (service, repo) = service(&account);
    repo.insert_note(&Note::new("other", "t", "c", "user-b"))
        .unwrap();
    let mut feed = service.notes();

    let initial = feed.next().await.unwrap().unwrap();
    assert!(initial.is_empty());

    service
        .create_note(&Note::new("n-1", "t", "c", "user-a"))
        .await
        .unwrap();
    let after_create = timeout(FEED_TIMEOUT, feed.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let ids: Vec<&str> = after_create.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec!["n-1"]);

    service.delete_note("n-1").await.unwrap();
    let after_delete = timeout(FEED_TIMEOUT, feed.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(after_delete.is_empty());
}

#[tokio::test]
async fn feed_switches_lists_when_user_changes() {
    let account = signed_in("user-a");
    let (service, repo) = service(&account);
    repo.insert_note(&Note::new("a-1", "t", "c", "user-a"))
        .unwrap();
    repo.insert_note(&Note::new("b-1", "t", "c", "user-b"))
        .unwrap();
    let mut feed = Box::pin(service.notes().into_stream());

    let first = feed.next().await.unwrap().unwrap();
    assert!(first.iter().all(|note| note.user_id == "user-a"));
    assert_eq!(first.len(), 1);

    account.sign_in(User::new("user-b"));
    let second = timeout(FEED_TIMEOUT, feed.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(second, vec![Note::new("b-1", "t", "c", "user-b")]);

    account.sign_out();
    let signed_out = timeout(FEED_TIMEOUT, feed.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(signed_out.is_empty());
}

#[tokio::test]
async fn feed_ends_when_service_is_dropped() {
    let account = signed_in("user-a");
    let (service, _) = service(&account);
    let mut feed = service.notes();
    assert!(feed.next().await.is_some());

    drop(service);
    let ended = timeout(FEED_TIMEOUT, feed.next()).await.unwrap();
    assert!(ended.is_none());
}
