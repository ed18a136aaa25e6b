#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use helpdesk_console::config::{
    ApiConfig, AppConfig, Config, DisplayConfig, LinkConfig, PollingConfig, SessionConfig,
};
use helpdesk_console::models::{Role, Session};
use helpdesk_console::session_store::SESSION_COOKIE;
use helpdesk_console::{app, AppState};

pub fn test_config(base_url: &str) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "helpdesk_console=debug".to_string(),
        },
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            login_path: "/api/login/".to_string(),
        },
        // Длинный интервал: в тестах достаточно первой загрузки
        polling: PollingConfig {
            interval_seconds: 60,
        },
        links: LinkConfig {
            public_base_url: "http://console.test".to_string(),
        },
        display: DisplayConfig {
            utc_offset_minutes: 0,
        },
        sessions: SessionConfig { ttl_seconds: 3600 },
    }
}

/// Состояние без живого API: для проверок охранников.
pub fn offline_state() -> Arc<AppState> {
    AppState::new(test_config("http://127.0.0.1:9")).unwrap()
}

pub fn staff_session() -> Session {
    Session {
        token: "staff-token".to_string(),
        role: Role::Staff,
        user_id: 7,
        username: "aigerim".to_string(),
    }
}

pub fn requester_session() -> Session {
    Session {
        token: "requester-token".to_string(),
        role: Role::Requester,
        user_id: 42,
        username: "ivanov".to_string(),
    }
}

/// Заводит сессию и возвращает значение заголовка `Cookie`.
pub async fn login_as(state: &AppState, session: Session) -> String {
    let id = state.sessions.create(session).await;
    format!("{}={}", SESSION_COOKIE, id)
}

pub async fn get(state: &Arc<AppState>, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app(state.clone())
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(
    state: &Arc<AppState>,
    uri: &str,
    cookie: Option<&str>,
    form: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app(state.clone())
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
}

/// Запись заявки в том виде, в котором её отдаёт API.
pub fn request_json(id: i64, status: &str, minute: u32, handler: Option<(i64, &str)>) -> Value {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap();
    json!({
        "id": id,
        "creator": format!("Пассажир {}", id),
        "phone_number": "",
        "description": format!("Проблема {}", id),
        "status": status,
        "handler": handler.map(|(id, _)| id),
        "handler_username": handler.map(|(_, name)| name),
        "created_at": created_at.to_rfc3339(),
        "auditorium": 3,
        "auditorium_number_display": format!("{}05", id),
    })
}

/// Ждёт, пока опрос заполнит снимок (реальное время, т.к. API - wiremock).
pub async fn wait_for_feed<F>(state: &AppState, ready: F)
where
    F: Fn(&helpdesk_console::services::FeedSnapshot) -> bool,
{
    for _ in 0..100 {
        if ready(&state.feed.snapshot().await) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("request feed did not reach the expected state");
}
