// HTTP boundary integration tests
//
// Drives the real router with stubbed loader/classifier/embedder seams:
// - /action: end-to-end calc resolution, shortcut bypass, empty query
// - /search: store/embedder degradation and the distance cut-off
// - /install_plan: required-field 400 and the explicit failed plan
// - /ask: errors embedded in `answer`, never a non-success status
// - transport: malformed JSON is a structured 400

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use omni_brain::config::{BrainConfig, CliArgs, FileConfig};
use omni_brain::inference::{CompletionClient, Embedder, InferenceError};
use omni_brain::installer::InstallPlanner;
use omni_brain::intent::Classifier;
use omni_brain::lanes::LaneLocks;
use omni_brain::registry::ResourceLoader;
use omni_brain::store::{FileRecord, VectorStore};
use omni_brain::{build_router, AppState};

// ========================================
// Stub seams
// ========================================

struct StubLoader {
    store_dir: Option<PathBuf>,
    embedder_ready: bool,
    model_error: Option<String>,
}

#[async_trait]
impl ResourceLoader for StubLoader {
    async fn open_store(&self) -> Result<Option<VectorStore>, String> {
        match &self.store_dir {
            Some(dir) => VectorStore::open(dir).map(Some).map_err(|e| e.to_string()),
            None => Ok(None),
        }
    }

    async fn load_language_model(&self) -> Result<(), String> {
        match &self.model_error {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    async fn probe_embedder(&self) -> Result<(), String> {
        if self.embedder_ready {
            Ok(())
        } else {
            Err("no embedding runtime".to_string())
        }
    }
}

struct StubClassifier {
    output: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, _query: &str) -> Result<String, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

struct StubEmbedder {
    vector: Vec<f32>,
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, InferenceError> {
        Ok(self.vector.clone())
    }
}

// ========================================
// Fixtures
// ========================================

fn test_config() -> BrainConfig {
    // Dead local ports; nothing in these tests may reach the network
    let mut file = FileConfig::default();
    file.runtime_url = Some("http://127.0.0.1:9".to_string());
    file.searx_url = Some("http://127.0.0.1:9/search".to_string());
    file.embedding_url = Some("http://127.0.0.1:9".to_string());
    file.timeouts.generation_secs = Some(1);
    file.timeouts.general_secs = Some(1);
    file.timeouts.navigation_secs = Some(1);
    file.timeouts.lookup_secs = Some(1);
    file.timeouts.scrape_secs = Some(1);
    let cli = CliArgs {
        config: None,
        host: None,
        port: None,
        searx_url: None,
    };
    BrainConfig::merge(file, &cli)
}

struct TestApp {
    state: AppState,
    classifier_calls: Arc<AtomicUsize>,
}

fn test_app(
    classifier_output: &str,
    loader: StubLoader,
    embedder_vector: Vec<f32>,
) -> TestApp {
    let config = Arc::new(test_config());
    let lanes = LaneLocks::from_bindings(config.deep_binding(), config.fast_binding());
    let completion = Arc::new(
        CompletionClient::new(&config.runtime_url, &config.model, Duration::from_secs(1)).unwrap(),
    );
    let classifier_calls = Arc::new(AtomicUsize::new(0));
    let classifier = Arc::new(StubClassifier {
        output: classifier_output.to_string(),
        calls: classifier_calls.clone(),
    });
    // No system backends in tests: the planner always falls through
    let planner = Arc::new(InstallPlanner::new(Vec::new()));

    let state = AppState::assemble(
        config,
        lanes,
        Arc::new(loader),
        completion,
        classifier,
        Arc::new(StubEmbedder {
            vector: embedder_vector,
        }),
        planner,
    )
    .unwrap();

    TestApp {
        state,
        classifier_calls,
    }
}

fn healthy_loader() -> StubLoader {
    StubLoader {
        store_dir: None,
        embedder_ready: true,
        model_error: None,
    }
}

async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let app = build_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// ========================================
// /action
// ========================================

#[tokio::test]
async fn action_resolves_calc_end_to_end() {
    let app = test_app("CALC:2+2", healthy_loader(), vec![]);

    let (status, body) = post_json(app.state, "/action", json!({"query": "2+2"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actions"], json!([{"type": "calc", "content": "4"}]));
    assert_eq!(body["action"], json!({"type": "calc", "content": "4"}));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn action_shortcut_bypasses_the_model() {
    let app = test_app("SEARCH:should never run", healthy_loader(), vec![]);

    let (status, body) = post_json(app.state, "/action", json!({"query": "YT"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actions"][0]["type"], "link");
    assert_eq!(body["actions"][0]["url"], "https://www.youtube.com");
    assert_eq!(app.classifier_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn action_empty_query_is_an_empty_success() {
    let app = test_app("CALC:1", healthy_loader(), vec![]);

    let (status, body) = post_json(app.state, "/action", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actions"], json!([]));
    assert!(body["action"].is_null());
}

#[tokio::test]
async fn action_reports_a_failed_model_as_a_status_card() {
    let loader = StubLoader {
        model_error: Some("Model not found at /nowhere".to_string()),
        ..healthy_loader()
    };
    let app = test_app("CALC:1", loader, vec![]);

    let (status, body) = post_json(app.state, "/action", json!({"query": "2+2"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actions"][0]["type"], "status");
    assert_eq!(body["error"], "Model not found at /nowhere");
}

// ========================================
// /search
// ========================================

#[tokio::test]
async fn search_without_a_store_returns_empty() {
    let app = test_app("CALC:1", healthy_loader(), vec![0.0, 0.0]);

    let (status, body) = post_json(app.state, "/search", json!({"query": "notes"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn search_without_an_embedder_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = VectorStore::open(dir.path()).unwrap();
        store
            .insert(&FileRecord {
                name: "notes.md".to_string(),
                path: "/home/user/notes.md".to_string(),
                vector: vec![0.0, 0.0],
            })
            .unwrap();
    }
    let loader = StubLoader {
        store_dir: Some(dir.path().to_path_buf()),
        embedder_ready: false,
        model_error: None,
    };
    let app = test_app("CALC:1", loader, vec![0.0, 0.0]);

    let (_, body) = post_json(app.state, "/search", json!({"query": "notes"})).await;
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn search_excludes_hits_at_the_distance_cutoff() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = VectorStore::open(dir.path()).unwrap();
        // Distances from the stub query vector [0,0]: 0.9 and 1.1
        store
            .insert(&FileRecord {
                name: "near.md".to_string(),
                path: "/home/user/near.md".to_string(),
                vector: vec![0.9, 0.0],
            })
            .unwrap();
        store
            .insert(&FileRecord {
                name: "far.md".to_string(),
                path: "/home/user/far.md".to_string(),
                vector: vec![1.1, 0.0],
            })
            .unwrap();
    }
    let loader = StubLoader {
        store_dir: Some(dir.path().to_path_buf()),
        embedder_ready: true,
        model_error: None,
    };
    let app = test_app("CALC:1", loader, vec![0.0, 0.0]);

    let (status, body) = post_json(app.state, "/search", json!({"query": "notes"})).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "near.md");
    assert_eq!(results[0]["type"], "file");
    assert!((results[0]["score"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

// ========================================
// /install_plan
// ========================================

#[tokio::test]
async fn install_plan_requires_an_app_name() {
    let app = test_app("CALC:1", healthy_loader(), vec![]);

    let (status, body) = post_json(app.state, "/install_plan", json!({"app_name": "  "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn install_plan_exhaustion_is_an_explicit_failed_plan() {
    let app = test_app("CALC:1", healthy_loader(), vec![]);

    let (status, body) = post_json(app.state, "/install_plan", json!({"app_name": "gimp"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "failed");
    assert_eq!(body["commands"], json!([]));
}

// ========================================
// /ask
// ========================================

#[tokio::test]
async fn ask_embeds_generation_errors_in_the_answer() {
    // The completion client points at a dead port; the request must still
    // come back 200 with the error in the text
    let app = test_app("CALC:1", healthy_loader(), vec![]);

    let (status, body) = post_json(app.state, "/ask", json!({"query": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["answer"].as_str().unwrap().starts_with("Error:"));
}

#[tokio::test]
async fn ask_raises_the_cancellation_signal_first() {
    let app = test_app("CALC:1", healthy_loader(), vec![]);
    let token = app.state.cancel.observe();

    let _ = post_json(app.state.clone(), "/ask", json!({"query": "hello"})).await;

    // Fast work that observed the pre-request epoch is now discardable
    assert!(app.state.cancel.superseded(token));
}

#[tokio::test]
async fn ask_embeds_load_failures_in_the_answer() {
    let loader = StubLoader {
        model_error: Some("Model not found at /nowhere".to_string()),
        ..healthy_loader()
    };
    let app = test_app("CALC:1", loader, vec![]);

    let (status, body) = post_json(app.state, "/ask", json!({"query": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("Model failed to load"));
    assert!(answer.contains("Model not found at /nowhere"));
}

// ========================================
// Transport
// ========================================

#[tokio::test]
async fn malformed_json_is_a_structured_400() {
    let app = test_app("CALC:1", healthy_loader(), vec![]);
    let router = build_router(app.state);

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/action")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn health_and_status_answer_without_loading() {
    let app = test_app("CALC:1", healthy_loader(), vec![]);
    let router = build_router(app.state);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "omni-brain");

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    // Nothing has asked for resources yet; the registry must not block
    assert_eq!(body["state"], "unloaded");
    assert_eq!(body["model_ready"], false);
}
