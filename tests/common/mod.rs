//! Shared fixtures for the integration suites: a mock onboarding backend,
//! canned payloads, and pipeline builders wired against it.
#![allow(dead_code)]

use std::time::Duration;

use httpmock::MockServer;
use serde_json::json;

use ragline::client::BackendClient;
use ragline::config::{ChatOptions, ConnectionConfig};
use ragline::notify::{Notice, Notifier};
use ragline::pipeline::Pipeline;

/// A complete config that passes connection-time validation.
pub fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        base_url: "https://lloydk.atlassian.net/wiki".to_owned(),
        email: "onboarding@lloydk.example".to_owned(),
        api_token: "token-123".to_owned(),
        space_key: "HR".to_owned(),
    }
}

/// The canned `/confluence/categories` payload: four pages across two
/// level-1 categories.
pub fn index_payload() -> serde_json::Value {
    json!({
        "status": "success",
        "pages": [
            { "id": "1", "title": "Leave policy", "path": ["HR", "Attendance"] },
            { "id": "2", "title": "Remote work",  "path": ["HR", "Attendance"] },
            { "id": "3", "title": "VPN guide",    "path": ["IT", "Security"] },
            { "id": "4", "title": "Org chart",    "path": ["HR", "People"] }
        ],
        "category_tree": {
            "HR": { "Attendance": 2, "People": 1 },
            "IT": { "Security": 1 }
        },
        "total_pages": 4
    })
}

pub async fn mock_backend() -> MockServer {
    MockServer::start_async().await
}

/// Pipeline against the mock server, with a zero demo delay and a notice
/// receiver for assertions.
pub fn pipeline_for(server: &MockServer) -> (Pipeline, flume::Receiver<Notice>) {
    let client = BackendClient::new(&server.base_url()).expect("mock server URL is valid");
    let options = ChatOptions::default().with_demo_delay(Duration::ZERO);
    let (notifier, notices) = Notifier::channel();
    (Pipeline::with_notifier(client, options, notifier), notices)
}

/// Pipeline pointed at a closed port: every request fails at transport.
pub fn unreachable_pipeline() -> (Pipeline, flume::Receiver<Notice>) {
    let client = BackendClient::new("http://127.0.0.1:9").expect("static URL is valid");
    let options = ChatOptions::default().with_demo_delay(Duration::ZERO);
    let (notifier, notices) = Notifier::channel();
    (Pipeline::with_notifier(client, options, notifier), notices)
}

/// Drains every pending notice into `(level, message)` pairs.
pub fn drain_notices(notices: &flume::Receiver<Notice>) -> Vec<(String, String)> {
    notices
        .drain()
        .map(|notice| (notice.level.as_str().to_owned(), notice.message))
        .collect()
}
