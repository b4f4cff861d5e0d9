//! The OpenAI-backed `AI` driving the pipeline against a mock endpoint.

#![cfg(feature = "openai")]

use std::sync::Arc;
use std::time::Duration;

use openai_client::OpenAIClient;
use playbooks::ai::OpenAI;
use playbooks::{
    DocumentStore, MemoryStore, NewDocument, Orchestrator, PipelineConfig, PlaybookError, Stage,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYBOOK: &str = r#"{"task_name":"Deploy service","steps":[{"step":1,"action":"docker build","description":"build"},{"step":2,"action":"docker push","description":"push"}],"common_failures":[]}"#;

async fn mount_embedding(server: &MockServer, dimensions: usize) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({
            "model": "openai/text-embedding-3-small",
            "input": "Deploy service docker build docker push"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": vec![0.01_f32; dimensions], "index": 0}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_document_is_extracted_through_http_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "anthropic/claude-3.5-sonnet",
            "temperature": 0.3,
            "response_format": {"type": "json_object"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": PLAYBOOK}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_embedding(&server, 1536).await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert_document(&NewDocument::new("deploy.md", "docker build, then docker push"))
        .await
        .unwrap();
    let config = PipelineConfig::default();
    let ai = OpenAI::new(OpenAIClient::new("sk-test").with_base_url(server.uri()), &config);

    let report = Orchestrator::new(store.clone(), ai)
        .with_config(config)
        .extract_all()
        .await
        .unwrap();

    assert_eq!(report.extracted, 1);
    assert_eq!(store.playbooks()[0].embedding.as_ref().unwrap().len(), 1536);
}

#[tokio::test]
async fn test_unreachable_model_is_an_extract_stage_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API key"}
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let doc = store
        .insert_document(&NewDocument::new("deploy.md", "docker build"))
        .await
        .unwrap();
    let config = PipelineConfig::default();
    let ai = OpenAI::new(OpenAIClient::new("sk-bad").with_base_url(server.uri()), &config);

    let failure = Orchestrator::new(store.clone(), ai)
        .process_document(&doc)
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Extract);
    match failure.error {
        PlaybookError::UpstreamModel(msg) => assert!(msg.contains("Invalid API key")),
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(store.playbook_count(), 0);
}

#[tokio::test]
async fn test_slow_endpoint_is_cut_off_by_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "choices": [{"message": {"role": "assistant", "content": PLAYBOOK}}]
                }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let doc = store
        .insert_document(&NewDocument::new("deploy.md", "docker build"))
        .await
        .unwrap();
    let config = PipelineConfig::default().with_model_timeout(Duration::from_millis(100));
    let ai = OpenAI::new(OpenAIClient::new("sk-test").with_base_url(server.uri()), &config);

    let failure = Orchestrator::new(store, ai)
        .with_config(config)
        .process_document(&doc)
        .await
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Extract);
    assert!(matches!(failure.error, PlaybookError::UpstreamModel(_)));
}
