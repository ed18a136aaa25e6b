pub mod api_client;
pub mod config;
pub mod controllers;
pub mod error;
pub mod links;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session_store;
pub mod views;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api_client::HelpdeskApi;
use crate::error::ApiError;
use crate::models::Session;
use crate::services::RequestFeed;
use crate::session_store::SessionStore;
use crate::views::pages::PageContext;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub api: HelpdeskApi,
    pub sessions: SessionStore,
    pub feed: RequestFeed,
}

impl AppState {
    // Собирает состояние. Опрос заявок не запускается: его монтирует вызывающий
    pub fn new(config: config::Config) -> Result<Arc<Self>, ApiError> {
        let api = HelpdeskApi::from_config(&config.api)?;
        let feed = RequestFeed::new(Arc::new(api.clone()), config.polling.interval());
        let sessions = SessionStore::new(config.sessions.ttl());

        Ok(Arc::new(Self {
            config,
            api,
            sessions,
            feed,
        }))
    }

    pub fn page_context<'a>(&self, session: &'a Session) -> PageContext<'a> {
        PageContext {
            session,
            offset: self.config.display.offset(),
            refresh_secs: self.config.polling.interval_seconds,
        }
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
