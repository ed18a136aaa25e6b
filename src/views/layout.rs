use axum::http::StatusCode;
use chrono::FixedOffset;

use super::format::{escape, format_timestamp};
use crate::models::Session;
use crate::services::feed::FeedSnapshot;

/// Общая обёртка страницы: шапка, навигация для сотрудников, контент.
///
/// `refresh_secs` добавляет meta refresh, чтобы открытая таблица
/// подтягивала свежий снимок с тем же периодом, что и опрос API.
pub fn page(title: &str, session: Option<&Session>, body: &str, refresh_secs: Option<u64>) -> String {
    let refresh = refresh_secs
        .map(|secs| format!("<meta http-equiv=\"refresh\" content=\"{}\">", secs))
        .unwrap_or_default();

    format!(
        "<!doctype html><html lang=\"ru\"><head><meta charset=\"utf-8\">{}\
<title>{} | HelpDesk for airlines</title></head><body>\
<div class=\"header-wrapper\">{}</div>\
<div class=\"container py-4\">{}</div>\
</body></html>",
        refresh,
        escape(title),
        header(session),
        body
    )
}

fn header(session: Option<&Session>) -> String {
    let mut nav = String::from("<nav><a href=\"/\" class=\"header-logo\">HelpDesk for airlines</a>");
    match session {
        Some(session) if session.is_staff() => {
            nav.push_str(
                "<ol class=\"breadcrumb\">\
<li class=\"breadcrumb-item\"><a href=\"/requests\">Все заявки</a></li>\
<li class=\"breadcrumb-item\"><a href=\"/newrequests\">Новые заявки</a></li>\
<li class=\"breadcrumb-item\"><a href=\"/my-requests\">Мои заявки</a></li>\
</ol>",
            );
            nav.push_str(&logout_form(session));
        }
        Some(session) => nav.push_str(&logout_form(session)),
        None => nav.push_str("<a href=\"/login\">Войти</a>"),
    }
    nav.push_str("</nav>");
    nav
}

fn logout_form(session: &Session) -> String {
    format!(
        "<form method=\"post\" action=\"/logout\" class=\"logout\">\
<span>{}</span> <button type=\"submit\">Выйти</button></form>",
        escape(&session.username)
    )
}

// Предупреждение о том, что данные могли устареть
pub fn stale_banner(snapshot: &FeedSnapshot, offset: FixedOffset) -> String {
    let Some(error) = &snapshot.last_error else {
        return String::new();
    };
    let as_of = match &snapshot.last_refreshed {
        Some(refreshed) => format!("показаны данные на {}", format_timestamp(refreshed, offset)),
        None => "данные ещё не загружались".to_string(),
    };
    format!(
        "<div class=\"alert alert-warning\" role=\"alert\">\
Не удалось обновить список заявок, {}. <small>{}</small></div>",
        as_of,
        escape(error)
    )
}

pub fn login_required_page() -> String {
    page(
        "Требуется вход",
        None,
        "<div class=\"d-flex justify-content-center align-items-center\">\
<p>Вы не авторизованы. Пожалуйста, <a href=\"/login\">войдите</a>, \
используя свой логин и пароль.</p></div>",
        None,
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Ошибка",
        None,
        &format!(
            "<h2 class=\"mb-4\">Ошибка {}</h2><p>{}</p><p><a href=\"/\">На главную</a></p>",
            status.as_u16(),
            escape(message)
        ),
        None,
    )
}
