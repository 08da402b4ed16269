//! Session gate tests
//!
//! Without a session (or with a non-admin one) every protected workflow
//! fails before any request leaves the process.

use std::sync::Arc;

use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

use adminctl::api::types::VideoType;
use adminctl::session::{MemorySessionStore, Role, Session, SessionStore};
use adminctl::{ApiClient, ApiError, ImportOrchestrator, NotificationDraft, VideoCatalog};

mod common;

async fn silent_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    server
}

async fn assert_gate(client: ApiClient, expected: fn(&ApiError) -> bool) {
    let catalog = Arc::new(VideoCatalog::new(client.clone(), 1000));

    let err = catalog.refresh_all().await.unwrap_err();
    assert!(expected(&err), "refresh_all: {:?}", err);

    let err = catalog.delete(VideoType::Leaders, "v1").await.unwrap_err();
    assert!(expected(&err), "delete: {:?}", err);

    let orchestrator = ImportOrchestrator::new(catalog);
    let err = orchestrator
        .submit(
            &["https://youtu.be/dQw4w9WgXcQ".to_string()],
            VideoType::Leaders,
            None,
        )
        .await
        .unwrap_err();
    assert!(expected(&err), "import: {:?}", err);

    let mut draft = NotificationDraft::new("Title", "Body");
    let err = draft.send(&client).await.unwrap_err();
    assert!(expected(&err), "notify: {:?}", err);
    assert_eq!(draft.title, "Title", "draft kept after failure");
}

#[tokio::test]
async fn test_no_session_short_circuits_every_workflow() {
    let server = silent_server().await;
    assert_gate(common::anonymous_client(&server.uri()), |e| {
        *e == ApiError::Unauthenticated
    })
    .await;
}

#[tokio::test]
async fn test_non_admin_session_is_unauthorized() {
    let server = silent_server().await;
    let client = common::client_with(
        &server.uri(),
        MemorySessionStore::with_session(Session::new("user-token", Role::User)),
    );
    assert_gate(client, |e| matches!(e, ApiError::Unauthorized(_))).await;
}

#[test]
fn test_is_authorized_matches_role() {
    let store = MemorySessionStore::new();
    assert!(!store.is_authorized(Role::Admin));

    store.set_session(&Session::new("t", Role::Admin)).expect("set");
    assert!(store.is_authorized(Role::Admin));
    assert!(!store.is_authorized(Role::User));

    store.clear_session().expect("clear");
    assert!(store.get_session().expect("get").is_none());
}
