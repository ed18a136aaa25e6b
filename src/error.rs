//! Типы ошибок консоли.
//!
//! `ApiError` - всё, что может пойти не так при обращении к удалённому API.
//! `AppError` - ошибка уровня обработчика, превращается в HTML-страницу,
//! чтобы пользователь видел проблему, а не молча смотрел на устаревшие данные.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Link encoding failed: {0}")]
    Link(#[from] serde_urlencoded::ser::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Api(ApiError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Api(ApiError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Api(ApiError::Unauthorized) => StatusCode::UNAUTHORIZED,
            AppError::Api(ApiError::Forbidden(_)) => StatusCode::FORBIDDEN,
            AppError::Api(_) => StatusCode::BAD_GATEWAY,
            AppError::Link(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::NotFound(_)) => "Заявка или терминал не найдены".to_string(),
            AppError::Api(ApiError::Unauthorized) => {
                "Сессия недействительна, войдите заново".to_string()
            }
            AppError::Api(ApiError::Forbidden(_)) => "Недостаточно прав".to_string(),
            AppError::Api(ApiError::Validation(details)) => {
                format!("Сервер отклонил данные: {}", details)
            }
            AppError::Api(_) => "Сервер заявок недоступен, попробуйте позже".to_string(),
            AppError::Link(_) => "Не удалось сформировать ссылку".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }
        let page = views::layout::error_page(status, &self.user_message());
        (status, Html(page)).into_response()
    }
}
