//! Publish Client
//!
//! Posts finished text to LinkedIn as a UGC share. The authoring member is
//! resolved once through the userinfo endpoint before any publish call; the
//! resulting [`LinkedInPublisher`] embeds that identity in every payload.

use crate::config::PublishingConfig;
use crate::error::PipelineError;
use crate::http::{build_http_client, error_body, normalize_base_url};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info};

/// Status codes the UGC endpoint uses for a created post
pub const ACCEPTED_STATUS_CODES: [u16; 2] = [200, 201];

const PUBLISH_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolved identity of the publishing member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(sub: impl Into<String>) -> Self {
        Self(sub.into())
    }

    /// Author URN embedded in publish payloads.
    pub fn urn(&self) -> String {
        format!("urn:li:person:{}", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.urn())
    }
}

/// Destination confirmation for one published post
#[derive(Debug, Clone, PartialEq)]
pub struct PublishResult {
    pub status: u16,
    /// Post URN from the `x-restli-id` header or the body `id`
    pub post_id: Option<String>,
    /// Response body as JSON; `Null` when the destination sent no body
    pub payload: Value,
}

/// Capability that looks up the authenticated publishing identity
#[async_trait]
pub trait ActorResolver: Send + Sync {
    async fn resolve_actor_identity(&self) -> Result<ActorId, PipelineError>;
}

/// Capability that submits finished text to the publishing destination
#[async_trait]
pub trait PublishClient: Send + Sync {
    async fn publish(&self, text: &str) -> Result<PublishResult, PipelineError>;
}

/// LinkedIn API client, inert until [`ActorResolver::resolve_actor_identity`] is called
pub struct LinkedInClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl LinkedInClient {
    pub fn new(config: &PublishingConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            client: build_http_client(Some(PUBLISH_REQUEST_TIMEOUT))?,
            access_token: config.access_token.clone(),
            base_url: normalize_base_url(&config.base_url),
        })
    }

    /// Bind a resolved identity, producing the client that can publish.
    pub fn into_publisher(self, actor: ActorId) -> LinkedInPublisher {
        LinkedInPublisher {
            client: self,
            actor,
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[derive(Deserialize)]
struct UserInfo {
    sub: Option<String>,
}

#[async_trait]
impl ActorResolver for LinkedInClient {
    async fn resolve_actor_identity(&self) -> Result<ActorId, PipelineError> {
        info!("Fetching LinkedIn member URN");

        let url = format!("{}/userinfo", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| PipelineError::ActorResolution(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response).await;
            return Err(PipelineError::ActorResolution(format!(
                "userinfo returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let info: UserInfo = response.json().await.map_err(|e| {
            PipelineError::ActorResolution(format!("Failed to parse userinfo response: {}", e))
        })?;
        let actor = info
            .sub
            .filter(|s| !s.is_empty())
            .map(ActorId::new)
            .ok_or_else(|| {
                PipelineError::ActorResolution("userinfo response has no `sub`".to_string())
            })?;

        info!(author = %actor.urn(), "LinkedIn member URN fetched");
        Ok(actor)
    }
}

/// Publisher bound to one author identity
pub struct LinkedInPublisher {
    client: LinkedInClient,
    actor: ActorId,
}

/// UGC share payload for `text` authored by `actor`.
pub fn share_payload(actor: &ActorId, text: &str) -> Value {
    json!({
        "author": actor.urn(),
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": {
                "shareCommentary": {
                    "text": text
                },
                "shareMediaCategory": "NONE"
            }
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}

#[async_trait]
impl PublishClient for LinkedInPublisher {
    async fn publish(&self, text: &str) -> Result<PublishResult, PipelineError> {
        debug!(author = %self.actor.urn(), chars = text.chars().count(), "Preparing to send message to LinkedIn");

        let url = format!("{}/ugcPosts", self.client.base_url);
        let response = self
            .client
            .client
            .post(&url)
            .header("Authorization", self.client.bearer())
            .header("Content-Type", "application/json")
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&share_payload(&self.actor, text))
            .send()
            .await
            .map_err(|e| PipelineError::PublishRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = error_body(response).await;

        if !ACCEPTED_STATUS_CODES.contains(&status) {
            error!(status, body = %body, "Error sending message to LinkedIn");
            return Err(PipelineError::Publish {
                status_code: status,
                body,
            });
        }

        let payload = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };
        let post_id = header_id.or_else(|| {
            payload
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        Ok(PublishResult {
            status,
            post_id,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LinkedInClient {
        LinkedInClient::new(&PublishingConfig {
            base_url: format!("{}/v2", server.uri()),
            access_token: "li-token".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_actor_urn() {
        let actor = ActorId::new("abc123");
        assert_eq!(actor.urn(), "urn:li:person:abc123");
        assert_eq!(actor.to_string(), "urn:li:person:abc123");
    }

    #[test]
    fn test_share_payload_shape() {
        let payload = share_payload(&ActorId::new("abc"), "hello");
        assert_eq!(payload["author"], "urn:li:person:abc");
        assert_eq!(payload["lifecycleState"], "PUBLISHED");
        assert_eq!(
            payload["specificContent"]["com.linkedin.ugc.ShareContent"]["shareCommentary"]["text"],
            "hello"
        );
        assert_eq!(
            payload["visibility"]["com.linkedin.ugc.MemberNetworkVisibility"],
            "PUBLIC"
        );
    }

    #[tokio::test]
    async fn test_resolve_actor_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/userinfo"))
            .and(header("Authorization", "Bearer li-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"sub": "abc123", "name": "Someone"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let actor = client_for(&server).resolve_actor_identity().await.unwrap();
        assert_eq!(actor, ActorId::new("abc123"));
    }

    #[tokio::test]
    async fn test_resolve_actor_identity_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/userinfo"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
            .mount(&server)
            .await;
        let err = client_for(&server).resolve_actor_identity().await.unwrap_err();
        assert!(matches!(err, PipelineError::ActorResolution(ref m) if m.contains("401")));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "x"})))
            .mount(&server)
            .await;
        let err = client_for(&server).resolve_actor_identity().await.unwrap_err();
        assert!(matches!(err, PipelineError::ActorResolution(_)));
    }

    #[tokio::test]
    async fn test_publish_accepts_201_with_header_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .and(header("Authorization", "Bearer li-token"))
            .and(body_json(share_payload(&ActorId::new("abc"), "post body")))
            .respond_with(
                ResponseTemplate::new(201).insert_header("x-restli-id", "urn:li:share:42"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let publisher = client_for(&server).into_publisher(ActorId::new("abc"));
        let result = publisher.publish("post body").await.unwrap();
        assert_eq!(result.status, 201);
        assert_eq!(result.post_id.as_deref(), Some("urn:li:share:42"));
        assert_eq!(result.payload, Value::Null);
    }

    #[tokio::test]
    async fn test_publish_accepts_200_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "123"})))
            .mount(&server)
            .await;

        let publisher = client_for(&server).into_publisher(ActorId::new("abc"));
        let result = publisher.publish("x").await.unwrap();
        assert_eq!(result.payload, json!({"id": "123"}));
        assert_eq!(result.post_id.as_deref(), Some("123"));
    }

    #[tokio::test]
    async fn test_publish_rejects_other_success_codes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/ugcPosts"))
            .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
            .mount(&server)
            .await;

        let publisher = client_for(&server).into_publisher(ActorId::new("abc"));
        match publisher.publish("x").await {
            Err(PipelineError::Publish { status_code, body }) => {
                assert_eq!(status_code, 202);
                assert_eq!(body, "queued");
            }
            other => panic!("expected publish error, got {:?}", other),
        }
    }
}
