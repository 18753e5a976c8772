//! Shared fixtures: a temp workspace with queue and archive files, and
//! wiremock stand-ins for the generation and publishing services.

use autopost::config::{GenerationConfig, PublishingConfig};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct Workspace {
    pub dir: TempDir,
    pub queue_path: PathBuf,
    pub archive_path: PathBuf,
}

impl Workspace {
    pub fn with_queue(contents: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let queue_path = dir.path().join("post_ideas.jsonl");
        let archive_path = dir.path().join("posted_posts.jsonl");
        std::fs::write(&queue_path, contents).unwrap();
        Self {
            dir,
            queue_path,
            archive_path,
        }
    }

    pub fn queue_contents(&self) -> String {
        std::fs::read_to_string(&self.queue_path).unwrap()
    }

    pub fn archive_lines(&self) -> Vec<Value> {
        match std::fs::read_to_string(&self.archive_path) {
            Ok(contents) => contents
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub async fn generation_service(status: u16, body: Value) -> (MockServer, GenerationConfig) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/message"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    let config = GenerationConfig {
        base_url: format!("{}/v1", server.uri()),
        api_key: "pai-key".to_string(),
        request_timeout_secs: None,
    };
    (server, config)
}

pub async fn publishing_service(publish_status: u16) -> (MockServer, PublishingConfig) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sub": "member-1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .respond_with(ResponseTemplate::new(publish_status).set_body_json(json!({"id": "123"})))
        .mount(&server)
        .await;
    let config = PublishingConfig {
        base_url: format!("{}/v2", server.uri()),
        access_token: "li-token".to_string(),
    };
    (server, config)
}

/// Publishing stand-in whose identity lookup is rejected with `status`.
pub async fn unauthorized_publishing_service(status: u16) -> (MockServer, PublishingConfig) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/userinfo"))
        .respond_with(ResponseTemplate::new(status).set_body_string("token expired"))
        .mount(&server)
        .await;
    let config = PublishingConfig {
        base_url: format!("{}/v2", server.uri()),
        access_token: "li-token".to_string(),
    };
    (server, config)
}
