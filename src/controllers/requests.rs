use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{ApiError, AppError};
use crate::middleware::StaffSession;
use crate::services::transitions;
use crate::session_store::{expired_session_cookie, session_id};
use crate::views::{pages, RequestFilter};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests/{id}", get(request_details))
        .route("/requests/{id}/accept", post(accept_request))
        .route("/requests/{id}/close", post(close_request))
        .route("/newrequests", get(new_requests))
        .route("/my-requests", get(my_requests))
}

/* ---------- LISTS ---------- */

// GET /requests?status=&search=
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
    StaffSession(session): StaffSession,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let filter = RequestFilter::new(query.status.as_deref(), query.search.as_deref());
    let snapshot = state.feed.snapshot().await;
    Html(pages::requests_page(
        state.page_context(&session),
        &snapshot,
        &filter,
    ))
}

// GET /newrequests
async fn new_requests(
    State(state): State<Arc<AppState>>,
    StaffSession(session): StaffSession,
) -> Html<String> {
    let snapshot = state.feed.snapshot().await;
    Html(pages::new_requests_page(state.page_context(&session), &snapshot))
}

// GET /my-requests
async fn my_requests(
    State(state): State<Arc<AppState>>,
    StaffSession(session): StaffSession,
) -> Html<String> {
    let snapshot = state.feed.snapshot().await;
    Html(pages::my_requests_page(state.page_context(&session), &snapshot))
}

/* ---------- DETAILS ---------- */

// GET /requests/{id} - всегда свежая запись из API
async fn request_details(
    State(state): State<Arc<AppState>>,
    StaffSession(session): StaffSession,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let request = state.api.get_request(id).await?;
    Ok(Html(pages::request_detail_page(
        state.page_context(&session),
        &request,
    )))
}

/* ---------- TRANSITIONS ---------- */

// POST /requests/{id}/accept
async fn accept_request(
    State(state): State<Arc<AppState>>,
    StaffSession(session): StaffSession,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    match transitions::accept_request(&state.api, &state.feed, &session, id).await {
        Ok(()) => Redirect::to("/newrequests").into_response(),
        Err(e) => transition_failed(&state, &headers, e).await,
    }
}

// POST /requests/{id}/close
async fn close_request(
    State(state): State<Arc<AppState>>,
    StaffSession(session): StaffSession,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    match transitions::close_request(&state.api, &state.feed, &session, id).await {
        Ok(()) => Redirect::to("/my-requests").into_response(),
        Err(e) => transition_failed(&state, &headers, e).await,
    }
}

// API отклонил токен: сессия консоли тоже больше не годится
async fn transition_failed(state: &AppState, headers: &HeaderMap, error: ApiError) -> Response {
    if !matches!(error, ApiError::Unauthorized) {
        return AppError::from(error).into_response();
    }
    if let Some(id) = session_id(headers) {
        state.sessions.remove(&id).await;
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        AppError::from(error),
    )
        .into_response()
}
