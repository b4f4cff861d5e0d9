//! End-to-end pipeline and retrieval behaviour over `MemoryStore` + `MockAI`.

mod common;

use common::{playbook_json, ScriptedStore};
use playbooks::pipeline::embedding_input;
use playbooks::testing::MockAI;
use playbooks::types::search::ScoredPlaybook;
use playbooks::{
    CommonFailure, DocumentId, DocumentStore, MemoryStore, NewDocument, NewPlaybook,
    Orchestrator, PlaybookError, PlaybookId, PlaybookStep, PlaybookStore, Retriever, SearchMode,
    SearchRequest, SearchType, Stage,
};
use std::sync::Arc;

async fn seed(store: &MemoryStore, contents: &[&str]) -> Vec<DocumentId> {
    let mut ids = Vec::new();
    for (i, content) in contents.iter().enumerate() {
        let doc = store
            .insert_document(&NewDocument::new(format!("doc-{}.md", i + 1), *content))
            .await
            .unwrap();
        ids.push(doc.id);
    }
    ids
}

#[tokio::test]
async fn test_extracted_steps_are_numbered_and_feed_the_embedding() {
    let store = Arc::new(MemoryStore::new());
    seed(&store, &["rotate the signing keys"]).await;
    let ai = Arc::new(MockAI::new().with_completion(
        "signing keys",
        r#"{"task_name":"Rotate signing keys","steps":[
            {"step":3,"action":"generate key","description":"new keypair"},
            {"step":3,"action":"publish key","description":"upload public half"},
            {"step":9,"action":"revoke old key","description":"after 24h"}
        ],"common_failures":[]}"#,
    ));

    let report = Orchestrator::new(store.clone(), ai.clone())
        .extract_all()
        .await
        .unwrap();
    assert_eq!(report.extracted, 1);

    let playbook = &store.playbooks()[0];
    for (i, step) in playbook.steps.iter().enumerate() {
        assert_eq!(step.step as usize, i + 1);
    }

    let actions: Vec<&str> = playbook.steps.iter().map(|s| s.action.as_str()).collect();
    let expected_input = format!("{} {}", playbook.task_name, actions.join(" "));
    assert_eq!(expected_input, "Rotate signing keys generate key publish key revoke old key");
    assert!(ai.calls().iter().any(|c| matches!(
        c,
        playbooks::testing::MockAICall::Embed { text } if *text == expected_input
    )));
}

#[tokio::test]
async fn test_successful_cycle_writes_exactly_one_complete_row() {
    let store = Arc::new(MemoryStore::new());
    seed(&store, &["backup the database with pg_dump"]).await;
    let ai = MockAI::new().with_completion(
        "pg_dump",
        playbook_json("Backup database", &["pg_dump", "upload to s3"], &[]),
    );

    Orchestrator::new(store.clone(), ai).extract_all().await.unwrap();

    let rows = store.playbooks();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].task_name, "Backup database");
    assert_eq!(rows[0].embedding.as_ref().map(Vec::len), Some(1536));
    assert_eq!(rows[0].confidence_score, 0.8);
}

#[tokio::test]
async fn test_failed_cycle_writes_nothing() {
    for ai in [
        MockAI::new().with_completion("pg_dump", "not json at all"),
        MockAI::new().with_completion_failure("pg_dump", "401 Unauthorized"),
        MockAI::new()
            .with_completion("pg_dump", playbook_json("Backup database", &["pg_dump"], &[]))
            .with_embedding_failure("Backup database"),
        MockAI::new()
            .with_completion("pg_dump", playbook_json("Backup database", &["pg_dump"], &[]))
            .with_embedding_dim(3),
    ] {
        let store = Arc::new(MemoryStore::new());
        seed(&store, &["backup the database with pg_dump"]).await;

        let report = Orchestrator::new(store.clone(), ai).extract_all().await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(store.playbook_count(), 0);
    }
}

#[tokio::test]
async fn test_batch_continues_past_a_failing_document() {
    let store = Arc::new(MemoryStore::new());
    seed(&store, &["doc-a", "doc-b", "doc-c", "doc-d", "doc-e"]).await;
    let ai = MockAI::new()
        .with_completion("doc-a", playbook_json("Task A", &["a"], &[]))
        .with_completion("doc-b", playbook_json("Task B", &["b"], &[]))
        .with_completion("doc-c", "{\"task_name\": \"Task C\", \"steps\": ")
        .with_completion("doc-d", playbook_json("Task D", &["d"], &[]))
        .with_completion("doc-e", playbook_json("Task E", &["e"], &[]));

    let report = Orchestrator::new(store.clone(), ai).extract_all().await.unwrap();

    assert_eq!(report.processed, 5);
    assert_eq!(report.extracted, 4);
    assert_eq!(report.failed, 1);
    let names: Vec<&str> = report.playbooks.iter().map(|p| p.task_name.as_str()).collect();
    assert_eq!(names, vec!["Task A", "Task B", "Task D", "Task E"]);
}

#[tokio::test]
async fn test_rerun_appends_duplicates() {
    let store = Arc::new(MemoryStore::new());
    seed(&store, &["doc-a", "doc-b"]).await;
    let ai = MockAI::new()
        .with_completion("doc-a", playbook_json("Task A", &["a"], &[]))
        .with_completion("doc-b", playbook_json("Task B", &["b"], &[]));
    let orchestrator = Orchestrator::new(store.clone(), ai);

    orchestrator.extract_all().await.unwrap();
    orchestrator.extract_all().await.unwrap();

    let names: Vec<String> = store.playbooks().into_iter().map(|p| p.task_name).collect();
    assert_eq!(names, vec!["Task A", "Task B", "Task A", "Task B"]);
}

#[tokio::test]
async fn test_bulk_reports_successes_and_staged_errors() {
    let memory = Arc::new(MemoryStore::new());
    let ids = seed(&memory, &["doc-a", "doc-b", "doc-c", "doc-d"]).await;
    let mut store = ScriptedStore::new(memory.clone());
    store.fail_insert_for = Some("Task D".into());
    let ai = MockAI::new()
        .with_completion("doc-a", playbook_json("Task A", &["a"], &[]))
        .with_completion_failure("doc-b", "429 rate limited")
        .with_completion("doc-c", playbook_json("Task C", &["c"], &[]))
        .with_completion("doc-d", playbook_json("Task D", &["d"], &[]));

    let report = Orchestrator::new(store, ai)
        .extract_documents(&[ids[0], ids[1], ids[3], DocumentId(999)])
        .await
        .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 2);

    assert_eq!(report.results[0].document_id, ids[0]);
    assert_eq!(report.results[0].task_name, "Task A");
    assert_eq!(report.results[0].confidence_score, 0.8);

    assert_eq!(report.errors[0].document_id, ids[1]);
    assert_eq!(report.errors[0].stage, Stage::Extract);
    assert!(report.errors[0].error_message.contains("429"));
    assert_eq!(report.errors[1].document_id, ids[3]);
    assert_eq!(report.errors[1].stage, Stage::Persist);

    // doc-c was not requested.
    assert_eq!(memory.playbook_count(), 1);
}

#[tokio::test]
async fn test_hybrid_averages_overlapping_scores() {
    let memory = Arc::new(MemoryStore::new());
    let p = memory
        .insert_playbook(&new_playbook("Deploy service", &["docker build"]))
        .await
        .unwrap();
    let mut store = ScriptedStore::new(memory);
    store.fuzzy = Some(vec![ScoredPlaybook::new(p.id, "Deploy service", 0.6)]);
    store.fulltext = Some(vec![ScoredPlaybook::new(p.id, "Deploy service", 0.8)]);

    let results = Retriever::new(store, MockAI::new())
        .search(&SearchRequest::new("deploy", SearchMode::Hybrid))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!((results[0].search_score - 0.7).abs() < 1e-9);
    assert!(results[0].search_types.contains(&SearchType::Fuzzy));
    assert!(results[0].search_types.contains(&SearchType::FullText));
    assert_eq!(results[0].playbook.steps[0].action, "docker build");
}

#[tokio::test]
async fn test_hybrid_never_uses_semantic_matches() {
    let store = Arc::new(MemoryStore::new());
    let ai = Arc::new(MockAI::new());
    let query = "ship containers";
    let only_semantic = store
        .insert_playbook(&NewPlaybook {
            embedding: ai.deterministic_embedding(query),
            ..new_playbook("Rotate TLS certificates", &["certbot renew"])
        })
        .await
        .unwrap();
    let retriever = Retriever::new(store.clone(), ai.clone());

    let hybrid = retriever
        .search(&SearchRequest::new(query, SearchMode::Hybrid))
        .await
        .unwrap();
    assert!(hybrid.iter().all(|r| r.playbook.id != only_semantic.id));
    assert_eq!(ai.embed_count(), 0);

    let semantic = retriever.search_semantic(query, 10).await.unwrap();
    assert_eq!(semantic[0].playbook.id, only_semantic.id);
    assert_eq!(semantic[0].search_types, vec![SearchType::Semantic]);
    assert!((semantic[0].search_score - 1.0).abs() < 1e-6);
}

#[test]
fn test_embedding_input_matches_reference_text() {
    let playbook = playbooks::ExtractedPlaybook {
        task_name: "Deploy service".into(),
        steps: vec![
            PlaybookStep::new(1, "docker build", "..."),
            PlaybookStep::new(2, "docker push", "..."),
        ],
        common_failures: vec![],
    };
    assert_eq!(
        embedding_input(&playbook),
        "Deploy service docker build docker push"
    );
}

#[tokio::test]
async fn test_seeded_deployment_doc_is_extracted_and_found() {
    let store = Arc::new(MemoryStore::new());
    seed(
        &store,
        &["To deploy the web service to Kubernetes: build the image with docker build, \
           push it with docker push, then kubectl apply the manifest. If the push is \
           denied, run docker login first."],
    )
    .await;
    let ai = Arc::new(MockAI::new().with_completion(
        "kubectl apply",
        playbook_json(
            "Deploy web service to Kubernetes",
            &["docker build", "docker push", "kubectl apply"],
            &[("Image push denied", "Run docker login")],
        ),
    ));

    let report = Orchestrator::new(store.clone(), ai.clone())
        .extract_all()
        .await
        .unwrap();
    assert_eq!(report.extracted, 1);
    let id = report.playbooks[0].id;

    let stored = store.get_playbook(id).await.unwrap().unwrap();
    assert_eq!(stored.steps.len(), 3);
    let actions: Vec<&str> = stored.steps.iter().map(|s| s.action.as_str()).collect();
    assert_eq!(actions, vec!["docker build", "docker push", "kubectl apply"]);
    assert_eq!(
        stored.common_failures,
        vec![CommonFailure::new("Image push denied", "Run docker login")]
    );

    let results = Retriever::new(store, ai)
        .search(&SearchRequest::new("Kubernetes", SearchMode::Fuzzy))
        .await
        .unwrap();
    assert_eq!(results[0].playbook.id, id);
}

#[tokio::test]
async fn test_search_validation() {
    let retriever = Retriever::new(MemoryStore::new(), MockAI::new());

    let blank = retriever
        .search(&SearchRequest::new("   ", SearchMode::Fuzzy))
        .await
        .unwrap_err();
    assert!(matches!(blank, PlaybookError::Validation(_)));

    let zero = retriever
        .search(&SearchRequest::new("deploy", SearchMode::Fuzzy).with_limit(0))
        .await
        .unwrap_err();
    assert!(matches!(zero, PlaybookError::Validation(_)));

    let empty = retriever
        .search(&SearchRequest::new("deploy", SearchMode::FullText).with_limit(500))
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_hydration_drops_vanished_playbooks() {
    let memory = Arc::new(MemoryStore::new());
    let kept = memory
        .insert_playbook(&new_playbook("Deploy service", &["docker build"]))
        .await
        .unwrap();
    let mut store = ScriptedStore::new(memory);
    store.fuzzy = Some(vec![
        ScoredPlaybook::new(kept.id, "Deploy service", 0.9),
        ScoredPlaybook::new(PlaybookId(404), "Deleted playbook", 0.8),
    ]);

    let results = Retriever::new(store, MockAI::new())
        .search(&SearchRequest::new("deploy", SearchMode::Fuzzy))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].playbook.id, kept.id);
}

fn new_playbook(task_name: &str, actions: &[&str]) -> NewPlaybook {
    NewPlaybook {
        task_name: task_name.into(),
        steps: actions
            .iter()
            .enumerate()
            .map(|(i, a)| PlaybookStep::new(i as u32 + 1, *a, ""))
            .collect(),
        common_failures: vec![],
        embedding: vec![0.0; 1536],
        confidence_score: 0.8,
    }
}
