// 🌐 Receipt API
// Axum routes for submitting receipts and looking up their points

use crate::error::StoreError;
use crate::receipt::NewReceipt;
use crate::rules::RuleEngine;
use crate::store::ReceiptStore;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ReceiptStore>,
    engine: Arc<RuleEngine>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReceiptStore>, engine: RuleEngine) -> Self {
        AppState {
            store,
            engine: Arc::new(engine),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptIdResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointsResponse {
    pub points: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("The receipt is invalid: {0}")]
    BadRequest(String),

    #[error("No receipt found for that ID.")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// POST /receipts/process - Store a receipt and return its id
async fn process_receipt(
    State(state): State<AppState>,
    payload: Result<Json<NewReceipt>, JsonRejection>,
) -> Result<Json<ReceiptIdResponse>, ApiError> {
    let Json(receipt) = payload.map_err(|rejection| {
        tracing::info!(reason = %rejection.body_text(), "rejected receipt");
        ApiError::from(rejection)
    })?;

    let id = state.store.submit(receipt)?;
    tracing::info!(%id, "receipt stored");

    Ok(Json(ReceiptIdResponse { id }))
}

/// GET /receipts/:id/points - Score a stored receipt
async fn get_points(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound)?;
    let receipt = state.store.lookup(&id)?.ok_or(ApiError::NotFound)?;

    let breakdown = state.engine.score(receipt.data());
    for skipped in &breakdown.skipped {
        tracing::warn!(
            %id,
            rule = skipped.rule.name(),
            error = %skipped.error,
            "rule skipped while scoring"
        );
    }

    Ok(Json(PointsResponse {
        points: breakdown.total(),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/receipts/process", post(process_receipt))
        .route("/receipts/:id/points", get(get_points))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryReceiptStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    const TARGET: &str = r#"{
        "retailer": "Target",
        "purchaseDate": "2022-01-01",
        "purchaseTime": "13:01",
        "items": [
            {"shortDescription": "Mountain Dew 12PK", "price": "6.49"},
            {"shortDescription": "Emils Cheese Pizza", "price": "12.25"},
            {"shortDescription": "Knorr Creamy Chicken", "price": "1.26"},
            {"shortDescription": "Doritos Nacho Cheese", "price": "3.35"},
            {"shortDescription": "   Klarbrunn 12-PK 12 FL OZ  ", "price": "12.00"}
        ],
        "total": "35.35"
    }"#;

    fn app() -> (Router, Arc<InMemoryReceiptStore>) {
        let store = Arc::new(InMemoryReceiptStore::new());
        let state = AppState::new(store.clone(), RuleEngine::new());
        (router(state), store)
    }

    async fn post_receipt(app: &Router, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/receipts/process")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get_path(app: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_process_then_get_points() {
        let (app, store) = app();

        let response = post_receipt(&app, TARGET).await;
        assert_eq!(response.status(), StatusCode::OK);
        let created: ReceiptIdResponse = json(response).await;
        assert_eq!(store.len().unwrap(), 1);

        let response = get_path(&app, &format!("/receipts/{}/points", created.id)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let points: PointsResponse = json(response).await;
        assert_eq!(points.points, 28);
    }

    #[tokio::test]
    async fn test_numeric_amounts_accepted() {
        let (app, _) = app();
        let body = r#"{
            "retailer": "M&M Corner Market",
            "purchaseDate": "2022-03-20",
            "purchaseTime": "14:33",
            "items": [
                {"shortDescription": "Gatorade", "price": 2.25},
                {"shortDescription": "Gatorade", "price": 2.25},
                {"shortDescription": "Gatorade", "price": 2.25},
                {"shortDescription": "Gatorade", "price": 2.25}
            ],
            "total": 9.00
        }"#;

        let created: ReceiptIdResponse = json(post_receipt(&app, body).await).await;
        let response = get_path(&app, &format!("/receipts/{}/points", created.id)).await;
        let points: PointsResponse = json(response).await;
        assert_eq!(points.points, 109);
    }

    #[tokio::test]
    async fn test_each_submission_gets_new_id() {
        let (app, _) = app();
        let a: ReceiptIdResponse = json(post_receipt(&app, TARGET).await).await;
        let b: ReceiptIdResponse = json(post_receipt(&app, TARGET).await).await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (app, store) = app();

        let response = post_receipt(&app, "{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = post_receipt(&app, r#"{"retailer": "Target"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse = json(response).await;
        assert!(error.error.starts_with("The receipt is invalid"));

        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (app, _) = app();
        post_receipt(&app, TARGET).await;

        let response = get_path(&app, &format!("/receipts/{}/points", Uuid::new_v4())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ErrorResponse = json(response).await;
        assert_eq!(error.error, "No receipt found for that ID.");

        let response = get_path(&app, "/receipts/not-a-uuid/points").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unparseable_fields_score_remaining_rules() {
        let (app, _) = app();
        let body = r#"{
            "retailer": "Target",
            "purchaseDate": "January 1st",
            "purchaseTime": "1pm",
            "items": [],
            "total": "lots"
        }"#;

        let response = post_receipt(&app, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let created: ReceiptIdResponse = json(response).await;

        let response = get_path(&app, &format!("/receipts/{}/points", created.id)).await;
        let points: PointsResponse = json(response).await;
        assert_eq!(points.points, 6);
    }
}
