use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use fieldbook_core::{CategoryId, ExpenseCategory};
use fieldbook_recon::{
    parse_statement, save_reconciled, ManualTarget, MatchedTransaction, Matcher, SaveReport,
    StatementError, Summary, TxnId, WorkingSet,
};
use fieldbook_storage::{self as storage, SqliteExpenseStore};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/reconcile", post(upload_statement))
        .route("/reconcile/{id}", get(get_session))
        .route("/reconcile/{id}/match", post(manual_match))
        .route("/reconcile/{id}/categorize", post(categorize))
        .route("/reconcile/{id}/ignore", post(ignore))
        .route("/reconcile/{id}/save", post(save))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Unprocessable(String),
    Internal(String),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<StatementError> for ApiError {
    fn from(e: StatementError) -> Self {
        ApiError::Unprocessable(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m),
            ApiError::Internal(m) => {
                tracing::error!("internal error: {m}");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize)]
struct SessionView {
    session_id: Uuid,
    transactions: Vec<MatchedTransaction>,
    summary: Summary,
}

impl SessionView {
    fn new(id: Uuid, set: &WorkingSet) -> Self {
        Self {
            session_id: id,
            transactions: set.transactions().to_vec(),
            summary: set.summary(),
        }
    }
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpenseCategory>>, ApiError> {
    Ok(Json(storage::get_categories(&state.db).await?))
}

/// Upload a raw CSV statement and start a review session. The whole upload
/// is rejected when nothing parses; there is no partial result.
async fn upload_statement(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<SessionView>, ApiError> {
    let parsed = parse_statement(&body)?;
    let invoices = storage::get_paid_invoices(&state.db).await?;
    let receipts = storage::get_receipts(&state.db).await?;

    let set = WorkingSet::new(Matcher::default().match_all(&parsed, &invoices, &receipts));
    let id = Uuid::new_v4();
    tracing::info!("statement upload: {} rows in session {id}", set.len());

    let view = SessionView::new(id, &set);
    state.sessions.lock().await.insert(id, set);
    Ok(Json(view))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let sessions = state.sessions.lock().await;
    let set = sessions.get(&id).ok_or(ApiError::NotFound)?;
    Ok(Json(SessionView::new(id, set)))
}

#[derive(Deserialize)]
struct MatchRequest {
    txn_id: TxnId,
    target: ManualTarget,
}

async fn manual_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let invoices = storage::get_paid_invoices(&state.db).await?;
    let receipts = storage::get_receipts(&state.db).await?;

    let mut sessions = state.sessions.lock().await;
    let set = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    if !set.manual_match(req.txn_id, req.target, &invoices, &receipts) {
        return Err(ApiError::Unprocessable(
            "Transaction or match target not found".to_string(),
        ));
    }
    Ok(Json(SessionView::new(id, set)))
}

#[derive(Deserialize)]
struct CategorizeRequest {
    txn_id: TxnId,
    category_id: CategoryId,
}

async fn categorize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategorizeRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let categories = storage::get_categories(&state.db).await?;

    let mut sessions = state.sessions.lock().await;
    let set = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    if !set.categorize(req.txn_id, req.category_id, &categories) {
        return Err(ApiError::Unprocessable(
            "Only debit transactions can be categorized, and the category must exist".to_string(),
        ));
    }
    Ok(Json(SessionView::new(id, set)))
}

#[derive(Deserialize)]
struct IgnoreRequest {
    txn_id: TxnId,
}

async fn ignore(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<IgnoreRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let set = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    if !set.ignore(req.txn_id) {
        return Err(ApiError::Unprocessable("Transaction not found".to_string()));
    }
    Ok(Json(SessionView::new(id, set)))
}

#[derive(Serialize)]
struct SaveView {
    report: SaveReport,
    message: String,
    summary: Summary,
}

/// Persist categorized rows. Partial failure is reported in the body, not
/// as an HTTP error — the loop itself always runs to completion.
async fn save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaveView>, ApiError> {
    let store = SqliteExpenseStore::new(state.db.clone());

    let mut sessions = state.sessions.lock().await;
    let set = sessions.get_mut(&id).ok_or(ApiError::NotFound)?;
    let report = save_reconciled(set, state.user, &store).await;
    tracing::info!("session {id}: {report}");

    Ok(Json(SaveView {
        report,
        message: report.to_string(),
        summary: set.summary(),
    }))
}
