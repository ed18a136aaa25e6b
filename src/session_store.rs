use axum::http::{header, HeaderMap};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Session;

pub const SESSION_COOKIE: &str = "helpdesk_session";

struct StoredSession {
    session: Session,
    last_seen: Instant,
}

/// Сессии консоли в памяти процесса, ключ - случайный UUID из cookie.
///
/// Сессия живёт `ttl` с последнего обращения. Просроченные записи
/// удаляются при обращении к ним и при каждом новом входе.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn create(&self, session: Session) -> Uuid {
        let id = Uuid::new_v4();
        info!("Session opened for {} ({:?})", session.username, session.role);

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| now.duration_since(stored.last_seen) < self.ttl);
        if sessions.len() < before {
            debug!("Dropped {} expired sessions", before - sessions.len());
        }
        sessions.insert(
            id,
            StoredSession {
                session,
                last_seen: now,
            },
        );
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(id)?;
        if now.duration_since(stored.last_seen) >= self.ttl {
            if let Some(expired) = sessions.remove(id) {
                info!("Session expired for {}", expired.session.username);
            }
            return None;
        }
        stored.last_seen = now;
        Some(stored.session.clone())
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn remove(&self, id: &Uuid) -> Option<Session> {
        let removed = self.sessions.write().await.remove(id).map(|stored| stored.session);
        if let Some(session) = &removed {
            info!("Session closed for {}", session.username);
        }
        removed
    }

    pub async fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let id = session_id(headers)?;
        self.get(&id).await
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use axum::http::HeaderValue;

    fn session() -> Session {
        Session {
            token: "abc".to_string(),
            role: Role::Staff,
            user_id: 7,
            username: "aigerim".to_string(),
        }
    }

    #[tokio::test]
    async fn cookie_resolves_to_stored_session() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let id = store.create(session()).await;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(store.from_headers(&headers).await, Some(session()));

        store.remove(&id).await;
        assert_eq!(store.from_headers(&headers).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_expires_and_is_dropped() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create(session()).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(store.get(&id).await, Some(session()));

        // обращение продлевает сессию
        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(store.get(&id).await, Some(session()));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(store.get(&id).await, None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn new_login_sweeps_abandoned_sessions() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.create(session()).await;
        store.create(session()).await;

        tokio::time::advance(Duration::from_secs(120)).await;
        let fresh = store.create(session()).await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(&fresh).await.is_some());
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("helpdesk_session=not-a-uuid"),
        );
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }
}
