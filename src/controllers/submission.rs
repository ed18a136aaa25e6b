use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::links::parse_auditorium_info;
use crate::middleware::RequesterAccess;
use crate::models::NewRequest;
use crate::views::pages::{self, SubmissionFormView};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/add-request", get(show_form).post(submit_form))
}

// GET /add-request?auditoriumInfo={id}-{number}
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionQuery {
    #[serde(rename = "auditoriumInfo")]
    pub auditorium_info: Option<String>,
}

async fn show_form(
    RequesterAccess(session): RequesterAccess,
    Query(query): Query<SubmissionQuery>,
) -> Html<String> {
    let terminal = query.auditorium_info.as_deref().and_then(parse_auditorium_info);
    let form = SubmissionFormView {
        terminal_id: terminal.as_ref().map(|(id, _)| *id),
        terminal_number: terminal.map(|(_, number)| number),
        ..SubmissionFormView::default()
    };
    Html(pages::submission_form_page(session.as_ref(), &form))
}

// POST /add-request
#[derive(Debug, Deserialize)]
pub struct SubmissionForm {
    pub auditorium: i64,
    pub auditorium_number: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub description: String,
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    RequesterAccess(session): RequesterAccess,
    Form(form): Form<SubmissionForm>,
) -> Result<Response, AppError> {
    let new_request = NewRequest::new(
        &form.creator,
        Some(&form.phone_number),
        &form.description,
        form.auditorium,
    );

    if let Err(errors) = new_request.check() {
        info!("Submission for terminal {} rejected by validation", form.auditorium);
        let messages = errors
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .map(|error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string())
            })
            .collect();
        let view = SubmissionFormView {
            terminal_id: Some(form.auditorium),
            terminal_number: Some(form.auditorium_number),
            creator: form.creator,
            phone_number: form.phone_number,
            description: form.description,
            errors: messages,
        };
        return Ok((
            StatusCode::BAD_REQUEST,
            Html(pages::submission_form_page(session.as_ref(), &view)),
        )
            .into_response());
    }

    state.api.create_request(&new_request).await?;
    Ok(Html(pages::submission_done_page(session.as_ref(), &form.auditorium_number)).into_response())
}
