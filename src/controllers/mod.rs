pub mod auth;
pub mod home;
pub mod requests;
pub mod submission;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(home::routes())
        .merge(auth::routes())
        .merge(requests::routes())
        .merge(submission::routes())
}
