//! feed.rs
//!
//! Опрос списка заявок по таймеру.
//!
//! У консоли нет push-канала, поэтому таблица заявок держится примерно
//! в актуальном состоянии так:
//! 1.  **mount**: сразу запрашиваем всю коллекцию, сортируем от новых к старым
//!     и кладём в снимок; дальше повторяем каждые `interval`.
//! 2.  **unmount**: гасим таймер и текущий запрос. Ответ, пришедший после
//!     размонтирования, в снимок не попадает.
//! 3.  **patch_local**: после смены статуса правим одну запись локально,
//!     без повторной загрузки. Опрос, начатый до правки, приносит старые
//!     строки, поэтому правка запоминается и накладывается на его ответ.
//!
//! Ошибка загрузки оставляет прежние строки на экране, но запоминается
//! в `last_error`, чтобы страница показала предупреждение.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::models::{Handler, HelpdeskRequest, RequestStatus};
use crate::views::filter::sort_newest_first;

// Источник коллекции заявок. В приложении это `HelpdeskApi`
#[async_trait]
pub trait RequestSource: Send + Sync + 'static {
    async fn fetch_requests(&self) -> ApiResult<Vec<HelpdeskRequest>>;
}

#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub requests: Vec<HelpdeskRequest>,
    pub last_error: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl FeedSnapshot {
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

// Локальная правка одной заявки
#[derive(Debug, Clone)]
struct LocalPatch {
    generation: u64,
    id: i64,
    status: RequestStatus,
    handler: Option<Handler>,
}

impl LocalPatch {
    fn apply(&self, requests: &mut [HelpdeskRequest]) -> bool {
        match requests.iter_mut().find(|request| request.id == self.id) {
            Some(request) => {
                request.status = self.status;
                if self.handler.is_some() {
                    request.handler = self.handler.clone();
                }
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct FeedState {
    snapshot: FeedSnapshot,
    // Растёт с каждой локальной правкой
    generation: u64,
    patches: Vec<LocalPatch>,
}

impl FeedState {
    // Ответ опроса, начатого на поколении `started`. Правки, сделанные
    // позже, сервер мог ещё не отразить, их накладываем заново
    fn replace_rows(&mut self, mut requests: Vec<HelpdeskRequest>, started: u64) {
        self.patches.retain(|patch| patch.generation > started);
        for patch in &self.patches {
            patch.apply(&mut requests);
        }
        self.snapshot.requests = requests;
    }
}

#[derive(Clone)]
pub struct RequestFeed {
    source: Arc<dyn RequestSource>,
    interval: Duration,
    state: Arc<RwLock<FeedState>>,
}

/// Смонтированный опрос. Удаление хэндла тоже размонтирует опрос.
pub struct FeedHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RequestFeed {
    pub fn new(source: Arc<dyn RequestSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            state: Arc::new(RwLock::new(FeedState::default())),
        }
    }

    /// Запускает опрос: первый запрос сразу, дальше раз в `interval`.
    pub fn mount(&self) -> FeedHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            self.source.clone(),
            self.interval,
            self.state.clone(),
            token.clone(),
        ));
        info!("Request feed mounted, polling every {:?}", self.interval);

        FeedHandle {
            token,
            task: Some(task),
        }
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.state.read().await.snapshot.clone()
    }

    /// Оптимистично меняет одну заявку без перезагрузки списка.
    ///
    /// `handler = None` оставляет текущего обработчика. Возвращает `false`,
    /// если такой заявки в снимке нет.
    pub async fn patch_local(
        &self,
        id: i64,
        status: RequestStatus,
        handler: Option<Handler>,
    ) -> bool {
        let mut state = self.state.write().await;
        let patch = LocalPatch {
            generation: state.generation + 1,
            id,
            status,
            handler,
        };
        if !patch.apply(&mut state.snapshot.requests) {
            return false;
        }
        state.generation = patch.generation;
        state.patches.push(patch);
        debug!("Request {} patched locally to {}", id, status);
        true
    }
}

impl FeedHandle {
    pub async fn unmount(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Request feed task ended abnormally: {}", e);
            }
        }
        info!("Request feed unmounted");
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn poll_loop(
    source: Arc<dyn RequestSource>,
    interval: Duration,
    state: Arc<RwLock<FeedState>>,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // Медленный ответ сдвигает следующий опрос, запросы не накладываются
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let started = state.read().await.generation;
        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!("Request feed unmounted while a fetch was in flight");
                break;
            }
            result = source.fetch_requests() => result,
        };

        let mut current = state.write().await;
        if token.is_cancelled() {
            debug!("Discarding response received after unmount");
            break;
        }

        match result {
            Ok(mut requests) => {
                sort_newest_first(&mut requests);
                debug!("Request feed refreshed: {} requests", requests.len());
                current.replace_rows(requests, started);
                current.snapshot.last_error = None;
                current.snapshot.last_refreshed = Some(Utc::now());
            }
            Err(e) => {
                warn!("Request feed refresh failed, keeping stale data: {}", e);
                current.snapshot.last_error = Some(e.to_string());
            }
        }
    }
}
