// Common test utilities

#![allow(dead_code)]

pub mod harness;

pub use harness::*;

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use playbook_server::kernel::ServerDeps;
use playbook_server::server::build_app;
use playbooks::testing::MockAI;
use playbooks::{MemoryStore, PipelineConfig};
use serde_json::Value;
use tower::ServiceExt;

/// Router over an in-memory store and a scripted model.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub ai: Arc<MockAI>,
}

impl TestApp {
    pub fn new(ai: MockAI) -> Self {
        Self::with_docs_dir(ai, "sample-docs")
    }

    pub fn with_docs_dir(ai: MockAI, sample_docs_dir: impl AsRef<Path>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let ai = Arc::new(ai);
        let deps = ServerDeps::new(
            store.clone(),
            ai.clone(),
            PipelineConfig::default(),
            sample_docs_dir.as_ref(),
        );
        Self {
            router: build_app(deps),
            store,
            ai,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_raw(&self, uri: &str, body: &'static str) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

/// Model answer for a playbook with the given name and actions.
pub fn playbook_json(task_name: &str, actions: &[&str]) -> String {
    let steps: Vec<Value> = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            serde_json::json!({
                "step": i + 1,
                "action": action,
                "description": format!("Run {}", action),
            })
        })
        .collect();
    serde_json::json!({
        "task_name": task_name,
        "steps": steps,
        "common_failures": [{"issue": "Image pull fails", "fix": "Check registry credentials"}],
    })
    .to_string()
}
