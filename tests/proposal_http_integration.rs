//! Integration tests for proposal HTTP endpoints.
//!
//! These tests drive the full router with in-process requests:
//! 1. JSON API status codes and bodies
//! 2. Board page rendering
//! 3. Store failures surfacing as gateway errors

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use trade_approvals::adapters::http::{app_router, ProposalHandlers};
use trade_approvals::adapters::storage::InMemoryDocumentStore;
use trade_approvals::application::{BoardState, LiveBoard, ProposalSynchronizer};
use trade_approvals::domain::foundation::StorePath;
use trade_approvals::domain::proposal::ParticipantRoster;
use trade_approvals::ports::{DocumentStore, SnapshotListener, StoreError, SubscriptionHandle};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Store whose writes fail but whose subscriptions work.
struct ReadOnlyStore {
    inner: InMemoryDocumentStore,
}

#[async_trait]
impl DocumentStore for ReadOnlyStore {
    async fn write(&self, _path: &StorePath, _document: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("Simulated write failure".to_string()))
    }

    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        self.inner.read(path).await
    }

    async fn update_field(
        &self,
        _path: &StorePath,
        _field: &StorePath,
        _value: Value,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("Simulated update failure".to_string()))
    }

    async fn subscribe(
        &self,
        path: &StorePath,
        listener: Arc<dyn SnapshotListener>,
    ) -> Result<SubscriptionHandle, StoreError> {
        self.inner.subscribe(path, listener).await
    }
}

struct TestApp {
    router: Router,
    board: Arc<LiveBoard>,
    store: InMemoryDocumentStore,
}

impl TestApp {
    async fn new() -> Self {
        let store = InMemoryDocumentStore::new();
        Self::with_store(Arc::new(store.clone()), store).await
    }

    async fn read_only() -> Self {
        let store = InMemoryDocumentStore::new();
        let read_only = ReadOnlyStore {
            inner: store.clone(),
        };
        Self::with_store(Arc::new(read_only), store).await
    }

    async fn with_store(store: Arc<dyn DocumentStore>, backing: InMemoryDocumentStore) -> Self {
        let synchronizer = Arc::new(ProposalSynchronizer::new(
            store,
            StorePath::parse("dynasty5/currentTrade").unwrap(),
            ParticipantRoster::default(),
        ));
        let board = Arc::new(LiveBoard::attach(&synchronizer).await.unwrap());
        let router = app_router(
            ProposalHandlers::new(synchronizer, board.clone()),
            Duration::from_secs(5),
            Vec::new(),
        );

        let app = Self {
            router,
            board,
            store: backing,
        };
        app.wait_for_board(BoardState::is_live).await;
        app
    }

    async fn wait_for_board<F>(&self, predicate: F)
    where
        F: Fn(&BoardState) -> bool,
    {
        let mut rx = self.board.watch();
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|s| predicate(s)))
            .await
            .expect("timed out waiting for board")
            .expect("board channel closed");
    }

    async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.request(method, uri, body).await;
        (status, parse_body(&bytes))
    }

    async fn raw_json(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, parse_body(&bytes))
    }

    async fn create(&self, outbound: &str, inbound: &str) -> (StatusCode, Value) {
        self.json(
            "POST",
            "/api/proposal",
            Some(json!({"weSend": outbound, "weReceive": inbound})),
        )
        .await
    }

    async fn approve(&self, participant: &str, approved: bool) -> StatusCode {
        let uri = format!("/api/proposal/approvals/{}", participant);
        self.json("PUT", &uri, Some(json!({ "approved": approved })))
            .await
            .0
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap()
    }
}

// =============================================================================
// JSON API
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;

    let (status, body) = app.json("GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn participants_are_listed_in_roster_order() {
    let app = TestApp::new().await;

    let (status, body) = app.json("GET", "/api/participants", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["participants"],
        json!(["JCort", "Troy", "Tristan", "Charmin", "Kade"])
    );
}

#[tokio::test]
async fn empty_board_has_no_proposal() {
    let app = TestApp::new().await;

    let (status, body) = app.json("GET", "/api/proposal", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "live");
    assert!(body["proposal"].is_null());
    assert_eq!(body["approvedCount"], 0);
    assert_eq!(body["total"], 5);
    assert_eq!(body["isReady"], false);
}

#[tokio::test]
async fn create_returns_created_proposal() {
    let app = TestApp::new().await;

    let (status, body) = app.create("2025 1st + WR A", "2026 2nd + RB B").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["weSend"], "2025 1st + WR A");
    assert_eq!(body["weReceive"], "2026 2nd + RB B");
    assert_eq!(body["approvals"].as_array().unwrap().len(), 5);
    assert!(body["approvals"]
        .as_array()
        .unwrap()
        .iter()
        .all(|a| a["approved"] == false));
}

#[tokio::test]
async fn create_with_blank_description_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.create("", "X").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["details"]["field"], "weSend");
    assert_eq!(app.store.snapshot(&StorePath::parse("dynasty5").unwrap()), None);
}

#[tokio::test]
async fn create_with_missing_field_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .json("POST", "/api/proposal", Some(json!({"weSend": "A"})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_create_body_gets_error_body() {
    let app = TestApp::new().await;

    let (status, body) = app.raw_json("POST", "/api/proposal", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn approval_without_flag_gets_error_body() {
    let app = TestApp::new().await;
    app.create("A", "B").await;

    let (status, body) = app
        .raw_json("PUT", "/api/proposal/approvals/Troy", r#"{"approve": true}"#)
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_FORMAT");
    assert_eq!(
        app.store
            .snapshot(&StorePath::parse("dynasty5/currentTrade/approvals/Troy").unwrap()),
        Some(Value::Bool(false))
    );
}

#[tokio::test]
async fn approval_without_proposal_conflicts() {
    let app = TestApp::new().await;

    let status = app.approve("Troy", true).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.store.snapshot(&StorePath::parse("dynasty5").unwrap()), None);
}

#[tokio::test]
async fn approval_right_after_create_is_accepted() {
    let app = TestApp::new().await;

    let (status, _) = app.create("A", "B").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.approve("Troy", true).await, StatusCode::NO_CONTENT);

    let stored = app
        .store
        .snapshot(&StorePath::parse("dynasty5/currentTrade/approvals/Troy").unwrap());
    assert_eq!(stored, Some(Value::Bool(true)));
}

#[tokio::test]
async fn approval_for_unknown_participant_is_not_found() {
    let app = TestApp::new().await;
    app.create("A", "B").await;

    let uri = "/api/proposal/approvals/Mallory";
    let (status, body) = app.json("PUT", uri, Some(json!({"approved": true}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTICIPANT_NOT_FOUND");
}

#[tokio::test]
async fn approvals_flow_to_ready() {
    let app = TestApp::new().await;
    app.create("2025 1st + WR A", "2026 2nd + RB B").await;

    for name in ["JCort", "Troy", "Tristan", "Charmin"] {
        assert_eq!(app.approve(name, true).await, StatusCode::NO_CONTENT);
    }
    app.wait_for_board(|s| s.view().is_some_and(|v| v.approved_count == 4))
        .await;
    let (_, body) = app.json("GET", "/api/proposal", None).await;
    assert_eq!(body["approvedCount"], 4);
    assert_eq!(body["isReady"], false);

    assert_eq!(app.approve("Kade", true).await, StatusCode::NO_CONTENT);
    app.wait_for_board(|s| s.view().is_some_and(|v| v.is_ready))
        .await;
    let (_, body) = app.json("GET", "/api/proposal", None).await;
    assert_eq!(body["approvedCount"], 5);
    assert_eq!(body["isReady"], true);
}

#[tokio::test]
async fn store_write_failure_maps_to_bad_gateway() {
    let app = TestApp::read_only().await;

    let (status, body) = app.create("A", "B").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "STORE_WRITE_FAILED");
}

#[tokio::test]
async fn approval_write_failure_maps_to_bad_gateway() {
    let app = TestApp::read_only().await;
    app.store
        .write(
            &StorePath::parse("dynasty5/currentTrade").unwrap(),
            json!({"weSend": "A", "weReceive": "B", "approvals": {}}),
        )
        .await
        .unwrap();

    assert_eq!(app.approve("Troy", true).await, StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Board page
// =============================================================================

#[tokio::test]
async fn board_page_shows_placeholder_without_proposal() {
    let app = TestApp::new().await;

    let (status, bytes) = app.request("GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("No trade proposal yet"));
}

#[tokio::test]
async fn board_page_escapes_descriptions() {
    let app = TestApp::new().await;
    app.create("<img src=x>", "Tom & \"Jerry\"\nRB B").await;
    app.wait_for_board(BoardState::has_proposal).await;

    let (_, bytes) = app.request("GET", "/", None).await;

    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("&lt;img src=x&gt;"));
    assert!(html.contains("Tom &amp; &quot;Jerry&quot;<br/>RB B"));
    assert!(!html.contains("<img src=x>"));
}

#[tokio::test]
async fn board_page_shows_ready_badge() {
    let app = TestApp::new().await;
    app.create("A", "B").await;
    for name in ["JCort", "Troy", "Tristan", "Charmin", "Kade"] {
        app.approve(name, true).await;
    }
    app.wait_for_board(|s| s.view().is_some_and(|v| v.is_ready))
        .await;

    let (_, bytes) = app.request("GET", "/", None).await;

    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("Approvals: <b>5/5</b>"));
    assert!(html.contains("Trade ready to send"));
}
