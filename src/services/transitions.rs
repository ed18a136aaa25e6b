use tracing::{debug, info};

use crate::api_client::HelpdeskApi;
use crate::error::ApiResult;
use crate::models::{RequestStatus, Session, StatusUpdate};
use crate::services::feed::RequestFeed;

// Принять новую заявку: статус IN_PROCESS, обработчик - пользователь сессии
pub async fn accept_request(
    api: &HelpdeskApi,
    feed: &RequestFeed,
    session: &Session,
    id: i64,
) -> ApiResult<()> {
    api.update_request(id, &StatusUpdate::accept(session.user_id), Some(&session.token))
        .await?;

    if !feed
        .patch_local(id, RequestStatus::InProcess, Some(session.as_handler()))
        .await
    {
        debug!("Accepted request {} is not in the local feed yet", id);
    }
    info!("Request {} accepted by {}", id, session.username);
    Ok(())
}

pub async fn close_request(
    api: &HelpdeskApi,
    feed: &RequestFeed,
    session: &Session,
    id: i64,
) -> ApiResult<()> {
    api.update_request(id, &StatusUpdate::close(), Some(&session.token))
        .await?;

    if !feed.patch_local(id, RequestStatus::Closed, None).await {
        debug!("Closed request {} is not in the local feed yet", id);
    }
    info!("Request {} closed by {}", id, session.username);
    Ok(())
}
