use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;

use adminctl::session::{MemorySessionStore, Role, Session};
use adminctl::ApiClient;

#[allow(dead_code)]
pub const ADMIN_TOKEN: &str = "admin-token-123";

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Client holding an ADMIN session with [`ADMIN_TOKEN`]
#[allow(dead_code)]
pub fn admin_client(base_url: &str) -> ApiClient {
    client_with(
        base_url,
        MemorySessionStore::with_session(Session::new(ADMIN_TOKEN, Role::Admin)),
    )
}

/// Client without any stored session
#[allow(dead_code)]
pub fn anonymous_client(base_url: &str) -> ApiClient {
    client_with(base_url, MemorySessionStore::new())
}

#[allow(dead_code)]
pub fn client_with(base_url: &str, store: MemorySessionStore) -> ApiClient {
    ApiClient::new(
        url::Url::parse(base_url).expect("valid url"),
        Duration::from_secs(5),
        Arc::new(store),
    )
    .expect("client")
}

#[allow(dead_code)]
pub fn video_json(id: &str, title: &str, public_id: &str, category: Option<&str>) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("About {}", title),
        "videoUrl": format!("https://www.youtube.com/watch?v={}", public_id),
        "publicId": public_id,
        "category": category,
    })
}

#[allow(dead_code)]
pub fn message_json(index: usize, sender: &str) -> Value {
    json!({
        "sender": sender,
        "message": format!("message {}", index),
        "createdAt": format!("2026-01-01T00:{:02}:00Z", index % 60),
    })
}
