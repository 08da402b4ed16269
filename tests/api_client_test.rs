//! API client integration tests
//!
//! Exercises `ApiClient` against a `wiremock` mock server: bearer header,
//! error normalization, public endpoints and request body shapes.

use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adminctl::api::endpoints::AudioSource;
use adminctl::api::types::NotificationPayload;
use adminctl::session::Role;
use adminctl::ApiError;

mod common;

// ---------------------------------------------------------------------------
// Authorization and error mapping
// ---------------------------------------------------------------------------

/// Protected requests carry `Authorization: Bearer <token>`.
#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(header("authorization", "Bearer admin-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"_id": "u1", "fullName": "Asha", "email": "asha@example.com", "role": "USER", "rcmId": "RCM-9"},
                {"_id": "u2", "email": "ravi@example.com", "role": "USER", "autoPayStatus": true}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let users = client.list_users().await.expect("users");

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].rcm_id.as_deref(), Some("RCM-9"));
    assert!(users[1].rcm_id.is_none());
    assert!(users[1].auto_pay_status);
}

/// Without a stored token nothing is sent.
#[tokio::test]
async fn test_missing_token_short_circuits() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::anonymous_client(&server.uri());
    assert_eq!(client.list_users().await.unwrap_err(), ApiError::Unauthenticated);
    assert_eq!(client.list_subscribers().await.unwrap_err(), ApiError::Unauthenticated);
    assert_eq!(
        client.chat_history("u1", 1).await.unwrap_err(),
        ApiError::Unauthenticated
    );
}

#[tokio::test]
async fn test_401_and_403_map_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Not authorized, token failed"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/admins"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());

    let err = client.list_users().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Unauthorized("Not authorized, token failed".to_string())
    );
    assert!(err.requires_login());

    let err = client.list_admins().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_non_2xx_surfaces_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/videos/leaders/v1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Video not found"
        })))
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let err = client
        .delete_video(adminctl::api::types::VideoType::Leaders, "v1")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::RequestFailed {
            status: 404,
            message: "Video not found".to_string()
        }
    );
    assert_eq!(err.operator_message(), "Video not found");
}

#[tokio::test]
async fn test_non_2xx_without_message_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/subscribers"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    match client.list_subscribers().await.unwrap_err() {
        ApiError::RequestFailed { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("502"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// A closed port yields `NetworkError` and the generic unreachable text.
#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let client = common::admin_client(&format!("http://127.0.0.1:{}", port));
    let err = client.list_users().await.unwrap_err();

    assert!(matches!(err, ApiError::NetworkError(_)), "got {:?}", err);
    assert_eq!(err.operator_message(), adminctl::error::SERVER_UNREACHABLE);
}

// ---------------------------------------------------------------------------
// Endpoint shapes
// ---------------------------------------------------------------------------

/// Login is public and returns the token and role.
#[tokio::test]
async fn test_login_sends_credentials_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"loginId": "admin@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "fresh-token",
            "user": {"role": "ADMIN", "email": "admin@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::anonymous_client(&server.uri());
    let response = client.login("admin@example.com", "secret").await.expect("login");

    assert_eq!(response.token, "fresh-token");
    assert_eq!(response.user.role, Role::Admin);
}

#[tokio::test]
async fn test_chat_history_requests_page_number() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/history/u42"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [common::message_json(1, "USER"), common::message_json(2, "AI")],
            "pagination": {"hasMore": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let page = client.chat_history("u42", 3).await.expect("history");

    assert_eq!(page.messages().len(), 2);
    assert!(page.pagination.has_more);
}

#[tokio::test]
async fn test_all_chats_groups_by_email() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/admin/chats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "asha@example.com": [common::message_json(1, "USER")],
                "ravi@example.com": [common::message_json(2, "USER"), common::message_json(3, "ADMIN")]
            }
        })))
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let chats = client.all_chats().await.expect("chats");

    assert_eq!(chats.len(), 2);
    assert_eq!(chats["ravi@example.com"].len(), 2);
}

#[tokio::test]
async fn test_smart_response_with_audio_url_is_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/admin/smart-response"))
        .and(body_json(json!({
            "question": "Opening hours?",
            "answer": "9 to 5",
            "audioUrl": "https://cdn.example.com/hours.mp3"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Smart response saved"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let response = client
        .smart_response(
            "Opening hours?",
            "9 to 5",
            &AudioSource::Url("https://cdn.example.com/hours.mp3".to_string()),
        )
        .await
        .expect("smart response");

    assert_eq!(response.message.as_deref(), Some("Smart response saved"));
}

#[tokio::test]
async fn test_smart_response_with_file_is_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/admin/smart-response"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let audio = dir.path().join("answer.mp3");
    std::fs::write(&audio, b"ID3fake").expect("write audio");

    let client = common::admin_client(&server.uri());
    client
        .smart_response("Q", "A", &AudioSource::File(audio))
        .await
        .expect("upload");

    let requests = server.received_requests().await.expect("recording enabled");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("form-data; name=\"audioFile\""));
    assert!(body.contains("filename=\"answer.mp3\""));
    assert!(body.contains("name=\"question\""));
}

#[tokio::test]
async fn test_missing_audio_file_is_validation_error() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let err = client
        .smart_response("Q", "A", &AudioSource::File("/nonexistent/answer.mp3".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_send_notification_reports_success_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notifications/send"))
        .and(body_json(json!({
            "title": "Sale",
            "body": "Today only",
            "data": {"url": "https://shop.example.com"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"successCount": 128})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::admin_client(&server.uri());
    let response = client
        .send_notification(&NotificationPayload {
            title: "Sale".to_string(),
            body: "Today only".to_string(),
            image_url: None,
            data: Some(json!({"url": "https://shop.example.com"})),
        })
        .await
        .expect("send");

    assert_eq!(response.success_count, 128);
}
