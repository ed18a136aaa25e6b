use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::error::{ApiError, AppError};
use crate::session_store::{expired_session_cookie, session_cookie, session_id};
use crate::views::pages;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
}

// GET /login
async fn login_form() -> Html<String> {
    Html(pages::login_page("", None))
}

// POST /login - учётные данные проверяет API авторизации
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    match state.api.login(username, &form.password).await {
        Ok(session) => {
            let id = state.sessions.create(session).await;
            Ok((
                [(header::SET_COOKIE, session_cookie(id))],
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(ApiError::Unauthorized) => {
            warn!("Failed login attempt for {}", username);
            Ok((
                StatusCode::UNAUTHORIZED,
                Html(pages::login_page(username, Some("Неверный логин или пароль"))),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// POST /logout
async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.remove(&id).await;
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
