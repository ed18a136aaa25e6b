use axum::{extract::State, response::Html, routing::get, Router};
use std::sync::Arc;

use crate::error::AppError;
use crate::links;
use crate::middleware::MaybeSession;
use crate::views::pages::{self, TerminalCard};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

// GET / - сотрудникам список терминалов со ссылками для QR-кодов
async fn home(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
) -> Result<Html<String>, AppError> {
    if !session.as_ref().is_some_and(|s| s.is_staff()) {
        return Ok(Html(pages::home_page(session.as_ref(), None)));
    }

    let terminals = state.api.list_terminals().await?;
    let cards = terminals
        .iter()
        .map(|terminal| -> Result<TerminalCard, AppError> {
            Ok(TerminalCard {
                number: terminal.number.clone(),
                path: links::submission_path(terminal)?,
                link: links::submission_link(&state.config.links.public_base_url, terminal)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(Html(pages::home_page(session.as_ref(), Some(cards.as_slice()))))
}
