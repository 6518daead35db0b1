use std::sync::Arc;

use wrg_schemas::Role;
use wrg_sessions::{SessionError, SessionStore};
use wrg_store::MemoryKvStore;

fn sessions() -> SessionStore {
    SessionStore::new(Arc::new(MemoryKvStore::new()))
}

#[tokio::test]
async fn login_issues_session_and_lookup_round_trips() {
    let sessions = sessions();

    let issued = sessions.login("Andi", Role::Waiter).await.unwrap();
    assert!(issued.session_id.starts_with("session_"));
    assert_eq!(issued.name, "Andi");
    assert_eq!(issued.role, Role::Waiter);

    let found = sessions.lookup(&issued.session_id).await.unwrap();
    assert_eq!(found, issued);
}

#[tokio::test]
async fn login_trims_name_and_rejects_blank() {
    let sessions = sessions();

    let issued = sessions.login("  Budi  ", Role::Kitchen).await.unwrap();
    assert_eq!(issued.name, "Budi");

    assert!(matches!(
        sessions.login("   ", Role::Admin).await,
        Err(SessionError::Validation(_))
    ));
}

#[tokio::test]
async fn repeated_logins_issue_distinct_sessions() {
    let sessions = sessions();

    let first = sessions.login("Sari", Role::Cashier).await.unwrap();
    let second = sessions.login("Sari", Role::Cashier).await.unwrap();

    assert_ne!(first.session_id, second.session_id);
    // Both remain valid: no expiry, no single-session rule.
    sessions.lookup(&first.session_id).await.unwrap();
    sessions.lookup(&second.session_id).await.unwrap();
}

#[tokio::test]
async fn lookup_unknown_session_is_not_found() {
    let sessions = sessions();
    assert!(matches!(
        sessions.lookup("session_missing").await,
        Err(SessionError::NotFound(_))
    ));
}
