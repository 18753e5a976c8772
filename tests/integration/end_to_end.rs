//! End-to-end runs of the publish loop against stand-in HTTP services.

use super::test_utils::{
    generation_service, publishing_service, unauthorized_publishing_service, Workspace,
};
use autopost::archive::PostArchive;
use autopost::cli::{Commands, RunContext};
use autopost::config::{AutopostConfig, DEFAULT_DISCLAIMER};
use autopost::error::PipelineError;
use autopost::generation::PersonalAiClient;
use autopost::pipeline::{LoopOptions, PublishLoop, StopReason};
use autopost::publish::{ActorResolver, LinkedInClient};
use autopost::queue::IdeaStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

async fn run_loop(
    ws: &Workspace,
    generation: &autopost::config::GenerationConfig,
    publishing: &autopost::config::PublishingConfig,
) -> Result<autopost::pipeline::RunSummary, PipelineError> {
    let linkedin = LinkedInClient::new(publishing)?;
    let actor = linkedin.resolve_actor_identity().await?;
    let publish_loop = PublishLoop::new(
        IdeaStore::new(&ws.queue_path),
        PostArchive::new(&ws.archive_path),
        Arc::new(PersonalAiClient::new(generation)?),
        Arc::new(linkedin.into_publisher(actor)),
        LoopOptions {
            throttle: Duration::from_secs(300),
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            max_posts: None,
        },
    );
    publish_loop.run().await
}

#[tokio::test]
async fn test_single_idea_is_generated_published_and_archived() {
    let ws = Workspace::with_queue("{\"text\":\"topic A\"}\n");
    let (_gen, generation) =
        generation_service(200, json!({"ai_message": "Hello world", "ai_score": 7.5})).await;
    let (pub_server, publishing) = publishing_service(201).await;

    let summary = tokio::time::timeout(Duration::from_secs(30), run_loop(&ws, &generation, &publishing))
        .await
        .expect("run should end without waiting out the throttle")
        .unwrap();
    assert_eq!(summary.published, 1);
    assert_eq!(summary.stop, StopReason::Exhausted);

    assert_eq!(ws.queue_contents(), "");
    assert_eq!(
        ws.archive_lines(),
        vec![json!({
            "original_idea": {"text": "topic A"},
            "generated_post": "Hello world",
            "ai_score": 7.5
        })]
    );

    let posts: Vec<Value> = pub_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/v2/ugcPosts")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"], "urn:li:person:member-1");
    assert_eq!(
        posts[0]["specificContent"]["com.linkedin.ugc.ShareContent"]["shareCommentary"]["text"],
        format!("Hello world\n\nAI Score: 7.5{}", DEFAULT_DISCLAIMER)
    );
}

#[tokio::test]
async fn test_generation_outage_keeps_queue_and_archive_unchanged() {
    let queue = "{\"text\":\"topic A\",\"tag\":\"rust\"}\n";
    let ws = Workspace::with_queue(queue);
    let (_gen, generation) = generation_service(503, json!({"error": "down"})).await;
    let (pub_server, publishing) = publishing_service(201).await;

    let err = run_loop(&ws, &generation, &publishing).await.unwrap_err();
    assert!(matches!(err, PipelineError::Generation { status: 503, .. }));
    assert_eq!(ws.queue_contents(), queue);
    assert!(ws.archive_lines().is_empty());

    let ugc_calls = pub_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/v2/ugcPosts")
        .count();
    assert_eq!(ugc_calls, 0);
}

#[tokio::test]
async fn test_rejected_publish_keeps_queue_and_archive_unchanged() {
    let queue = "{\"text\":\"topic A\"}\n";
    let ws = Workspace::with_queue(queue);
    let (_gen, generation) =
        generation_service(200, json!({"ai_message": "Hello", "ai_score": 3})).await;
    let (_pub, publishing) = publishing_service(403).await;

    let err = run_loop(&ws, &generation, &publishing).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Publish {
            status_code: 403,
            ..
        }
    ));
    assert_eq!(ws.queue_contents(), queue);
    assert!(ws.archive_lines().is_empty());
}

#[tokio::test]
async fn test_missing_generation_fields_use_placeholders() {
    let ws = Workspace::with_queue("{\"text\":\"topic A\"}\n");
    let (_gen, generation) = generation_service(200, json!({})).await;
    let (pub_server, publishing) = publishing_service(200).await;

    run_loop(&ws, &generation, &publishing).await.unwrap();

    let archived = ws.archive_lines();
    assert_eq!(archived[0]["generated_post"], Value::Null);
    assert_eq!(archived[0]["ai_score"], Value::Null);

    let request = pub_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.url.path() == "/v2/ugcPosts")
        .unwrap();
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    let text = body["specificContent"]["com.linkedin.ugc.ShareContent"]["shareCommentary"]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(text.starts_with(
        "No valid message returned by Personal.AI\n\nAI Score: No AI score provided."
    ));
}

#[test]
fn test_run_aborts_when_member_identity_cannot_be_resolved() {
    let queue = "{\"text\":\"topic A\"}\n";
    let ws = Workspace::with_queue(queue);

    let rt = tokio::runtime::Runtime::new().unwrap();
    let (gen_server, generation) =
        rt.block_on(generation_service(200, json!({"ai_message": "Hello", "ai_score": 1})));
    let (pub_server, publishing) = rt.block_on(unauthorized_publishing_service(401));

    let mut config = AutopostConfig::default();
    config.generation = generation;
    config.publishing = publishing;
    config.pipeline.throttle_secs = 0;
    let ctx = RunContext::with_config(ws.dir.path().to_path_buf(), config);

    let err = ctx
        .execute(&Commands::Run {
            limit: None,
            throttle_secs: None,
        })
        .unwrap_err();
    assert!(matches!(err, PipelineError::ActorResolution(ref m) if m.contains("401")));

    assert_eq!(ws.queue_contents(), queue);
    assert!(ws.archive_lines().is_empty());
    assert!(!ws.dir.path().join("post_ideas.jsonl.lock").exists());

    let generation_calls = rt.block_on(gen_server.received_requests()).unwrap();
    assert!(generation_calls.is_empty());
    let publish_calls = rt
        .block_on(pub_server.received_requests())
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/v2/ugcPosts")
        .count();
    assert_eq!(publish_calls, 0);
}
