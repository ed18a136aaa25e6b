//! Охранники маршрутов.
//!
//! Сессия берётся из cookie и хранилища сессий, страницы получают её
//! через экстракторы. Это ограничение интерфейса, а не граница безопасности:
//! права на изменение заявок проверяет удалённый API.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum::http::StatusCode;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::warn;

use crate::models::Session;
use crate::views;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(state.sessions.from_headers(&parts.headers).await))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    RedirectHome,
    LoginRequired,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::RedirectHome => Redirect::to("/").into_response(),
            GuardRejection::LoginRequired => (
                StatusCode::UNAUTHORIZED,
                Html(views::layout::login_required_page()),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StaffSession(pub Session);

impl FromRequestParts<Arc<AppState>> for StaffSession {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match state.sessions.from_headers(&parts.headers).await {
            Some(session) if session.is_staff() => Ok(StaffSession(session)),
            Some(session) => {
                warn!(
                    "Requester {} tried to open staff route {}",
                    session.username,
                    parts.uri.path()
                );
                Err(GuardRejection::RedirectHome)
            }
            None => Err(GuardRejection::LoginRequired),
        }
    }
}

// Маршруты заявителя: форма заявки. Сотрудников отправляем на главную,
// анонимные пользователи проходят - они приходят по QR-коду
#[derive(Debug, Clone)]
pub struct RequesterAccess(pub Option<Session>);

impl FromRequestParts<Arc<AppState>> for RequesterAccess {
    type Rejection = GuardRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match state.sessions.from_headers(&parts.headers).await {
            Some(session) if session.is_staff() => {
                warn!(
                    "Staff user {} tried to open requester route {}",
                    session.username,
                    parts.uri.path()
                );
                Err(GuardRejection::RedirectHome)
            }
            session => Ok(RequesterAccess(session)),
        }
    }
}
