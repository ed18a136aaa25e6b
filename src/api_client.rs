use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{HelpdeskRequest, NewRequest, Role, Session, StatusUpdate, Terminal};
use crate::services::feed::RequestSource;

/// Единственный слой доступа к API helpdesk.
///
/// Все страницы ходят в API только через этот клиент, поэтому базовый URL
/// и форма ответа определены в одном месте.
#[derive(Debug, Clone)]
pub struct HelpdeskApi {
    http_client: reqwest::Client,
    base_url: String,
    login_path: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(alias = "id")]
    user_id: i64,
    username: String,
    #[serde(default)]
    is_helpdesk_user: bool,
}

impl HelpdeskApi {
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login_path: config.login_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // GET /api/auditoriums/
    pub async fn list_terminals(&self) -> ApiResult<Vec<Terminal>> {
        let response = self
            .http_client
            .get(self.url("/api/auditoriums/"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // GET /api/helpdesk-requests/
    pub async fn list_requests(&self) -> ApiResult<Vec<HelpdeskRequest>> {
        let response = self
            .http_client
            .get(self.url("/api/helpdesk-requests/"))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // GET /api/helpdesk-requests/{id}/
    pub async fn get_request(&self, id: i64) -> ApiResult<HelpdeskRequest> {
        let response = self
            .http_client
            .get(self.url(&format!("/api/helpdesk-requests/{}/", id)))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    // PATCH /api/helpdesk-requests/{id}/ - частичное обновление статуса.
    // Тело ответа не разбираем: локальная копия обновляется по отправленным данным.
    pub async fn update_request(
        &self,
        id: i64,
        update: &StatusUpdate,
        token: Option<&str>,
    ) -> ApiResult<()> {
        let mut request = self
            .http_client
            .patch(self.url(&format!("/api/helpdesk-requests/{}/", id)))
            .json(update);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Token {}", token));
        }

        let response = request.send().await?;
        Self::check_status(response).await?;
        info!("Request {} moved to {}", id, update.status);
        Ok(())
    }

    // POST /api/helpdesk-requests/ - заявка с формы терминала.
    pub async fn create_request(&self, new_request: &NewRequest) -> ApiResult<()> {
        let response = self
            .http_client
            .post(self.url("/api/helpdesk-requests/"))
            .json(new_request)
            .send()
            .await?;
        Self::check_status(response).await?;
        info!("New request submitted for terminal {}", new_request.auditorium);
        Ok(())
    }

    // Вход через API авторизации. Неверные учётные данные - `Unauthorized`.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let response = self
            .http_client
            .post(self.url(&self.login_path))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let login: LoginResponse = match Self::handle_response(response).await {
            Ok(login) => login,
            Err(ApiError::Validation(_)) => return Err(ApiError::Unauthorized),
            Err(e) => return Err(e),
        };

        Ok(Session {
            token: login.token,
            role: if login.is_helpdesk_user {
                Role::Staff
            } else {
                Role::Requester
            },
            user_id: login.user_id,
            username: login.username,
        })
    }

    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let text = response.text().await.unwrap_or_default();
        error!("API call {} failed with {}: {}", url, status, text);

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(text),
            StatusCode::NOT_FOUND => ApiError::NotFound(url.path().to_string()),
            StatusCode::BAD_REQUEST => ApiError::Validation(text),
            _ => ApiError::Status {
                status: status.as_u16(),
                body: text,
            },
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let response = Self::check_status(response).await?;
        let url = response.url().clone();
        let body = response.bytes().await?;
        debug!("API call {} returned {} bytes", url, body.len());

        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to decode response from {}: {}", url, e);
            ApiError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait]
impl RequestSource for HelpdeskApi {
    async fn fetch_requests(&self) -> ApiResult<Vec<HelpdeskRequest>> {
        self.list_requests().await
    }
}
