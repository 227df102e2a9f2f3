use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use debtdesk::api::{create_router, AppState};
use debtdesk::auth::{hash_phone, TokenSigner};
use debtdesk::core::{PipelineRunner, SnapshotPipeline};
use debtdesk::db::{connect_in_memory, NoteStore, UserStore};
use debtdesk::domain::model::DebtRecord;
use debtdesk::domain::ports::{DebtSource, SnapshotStore};
use debtdesk::storage::{JsonFileStore, DETAILED_SNAPSHOT, SUMMARY_SNAPSHOT};
use debtdesk::Result;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct IdleSource;

#[async_trait::async_trait]
impl DebtSource for IdleSource {
    async fn authenticate(&self) -> Result<String> {
        Ok("stub-token".to_string())
    }

    async fn fetch_page(&self, _access_token: &str, _page: u32) -> Result<Vec<DebtRecord>> {
        Ok(Vec::new())
    }
}

struct TestApp {
    app: Router,
    _data_dir: TempDir,
    snapshots: Arc<JsonFileStore>,
}

async fn test_app() -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let snapshots = Arc::new(JsonFileStore::new(data_dir.path()));

    let pool = connect_in_memory().await.unwrap();
    let notes = NoteStore::new(pool.clone());
    let users = UserStore::new(pool);

    users
        .create("admin", &hash_phone("+998900000001").unwrap())
        .await
        .unwrap();

    let pipeline = SnapshotPipeline::new(
        Arc::new(IdleSource),
        snapshots.clone(),
        Arc::new(notes.clone()),
        200,
    );
    let runner = Arc::new(PipelineRunner::new(pipeline));

    let state = Arc::new(AppState::new(
        snapshots.clone(),
        notes,
        users,
        TokenSigner::new("test-signing-key", 24),
        runner,
        "admin".to_string(),
    ));

    TestApp {
        app: create_router(state),
        _data_dir: data_dir,
        snapshots,
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, name: &str, phone: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            serde_json::json!({"name": name, "phone_number": phone}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_open() {
    let harness = test_app().await;
    let response = harness
        .app
        .oneshot(bare_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let harness = test_app().await;
    let token = login(&harness.app, "admin", "+998900000001").await;

    let response = harness
        .app
        .oneshot(bare_request("GET", "/api/users", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let users = body_json(response).await;
    assert_eq!(users[0]["name"], "admin");
    assert!(users[0].get("phone_hash").is_none());
}

#[tokio::test]
async fn test_login_with_wrong_phone_rejected() {
    let harness = test_app().await;
    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            serde_json::json!({"name": "admin", "phone_number": "+998909999999"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_token_is_401_and_bad_token_is_403() {
    let harness = test_app().await;

    let response = harness
        .app
        .clone()
        .oneshot(bare_request("GET", "/api/debts/summary", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = harness
        .app
        .oneshot(bare_request("GET", "/api/debts/summary", Some("forged.token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_snapshots_served_verbatim() {
    let harness = test_app().await;
    let detailed = serde_json::json!([{"debt_id": "d-1", "bucket": "<30d", "amount": 1000}]);
    let summary = serde_json::json!([{"customer_id": "c1", "remaining_amount": 1000}]);
    harness
        .snapshots
        .put(DETAILED_SNAPSHOT, &serde_json::to_vec(&detailed).unwrap())
        .await
        .unwrap();
    harness
        .snapshots
        .put(SUMMARY_SNAPSHOT, &serde_json::to_vec(&summary).unwrap())
        .await
        .unwrap();

    let token = login(&harness.app, "admin", "+998900000001").await;

    let response = harness
        .app
        .clone()
        .oneshot(bare_request("GET", "/api/debts/detailed", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, detailed);

    let response = harness
        .app
        .oneshot(bare_request("GET", "/api/debts/summary", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, summary);
}

#[tokio::test]
async fn test_unwritten_snapshot_is_503() {
    let harness = test_app().await;
    let token = login(&harness.app, "admin", "+998900000001").await;

    let response = harness
        .app
        .oneshot(bare_request("GET", "/api/debts/detailed", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SNAPSHOT_PENDING");
}

#[tokio::test]
async fn test_note_crud_records_the_author() {
    let harness = test_app().await;
    let token = login(&harness.app, "admin", "+998900000001").await;

    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/notes",
            Some(&token),
            serde_json::json!({"customer_id": "c1", "note_text": "promised to pay"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["author_name"], "admin");

    let response = harness
        .app
        .oneshot(bare_request("GET", "/api/notes/c1", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let notes = body_json(response).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["note_text"], "promised to pay");
}

#[tokio::test]
async fn test_note_without_text_is_400() {
    let harness = test_app().await;
    let token = login(&harness.app, "admin", "+998900000001").await;

    let response = harness
        .app
        .oneshot(json_request(
            "POST",
            "/api/notes",
            Some(&token),
            serde_json::json!({"customer_id": "c1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_lifecycle_and_admin_protection() {
    let harness = test_app().await;
    let token = login(&harness.app, "admin", "+998900000001").await;

    // Create.
    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&token),
            serde_json::json!({"name": "gulnora", "phone_number": "+998901234567"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let new_id = created["id"].as_i64().unwrap();

    // The new account can log in.
    login(&harness.app, "gulnora", "+998901234567").await;

    // Duplicate name conflicts.
    let response = harness
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            Some(&token),
            serde_json::json!({"name": "gulnora", "phone_number": "+998907654321"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The admin account is protected.
    let response = harness
        .app
        .clone()
        .oneshot(bare_request("DELETE", "/api/users/1", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown ids are 404.
    let response = harness
        .app
        .clone()
        .oneshot(bare_request("DELETE", "/api/users/9999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Ordinary accounts can be removed.
    let response = harness
        .app
        .oneshot(bare_request(
            "DELETE",
            &format!("/api/users/{}", new_id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_manual_refresh_accepted() {
    let harness = test_app().await;
    let token = login(&harness.app, "admin", "+998900000001").await;

    let response = harness
        .app
        .oneshot(bare_request("POST", "/api/debts/refresh", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
