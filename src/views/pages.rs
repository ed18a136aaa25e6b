//! HTML страниц консоли. Каждая функция получает уже отфильтрованные
//! данные и только рисует их.

use chrono::FixedOffset;

use super::filter::{my_queue, new_queue, RequestFilter};
use super::format::{escape, format_timestamp};
use super::layout::{page, stale_banner};
use crate::models::{HelpdeskRequest, RequestStatus, Session};
use crate::services::feed::FeedSnapshot;

#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub session: &'a Session,
    pub offset: FixedOffset,
    pub refresh_secs: u64,
}

#[derive(Debug, Clone)]
pub struct TerminalCard {
    pub number: String,
    pub path: String,
    pub link: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionFormView {
    pub terminal_id: Option<i64>,
    pub terminal_number: Option<String>,
    pub creator: String,
    pub phone_number: String,
    pub description: String,
    pub errors: Vec<String>,
}

fn phone_cell(request: &HelpdeskRequest) -> String {
    escape(request.phone_number.as_deref().unwrap_or("-"))
}

fn terminal_cell(request: &HelpdeskRequest) -> String {
    escape(request.terminal_number.as_deref().unwrap_or("-"))
}

fn action_form(id: i64, action: &str, label: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/requests/{}/{}\"><button type=\"submit\" class=\"btn btn-success\">{}</button></form>",
        id, action, label
    )
}

fn empty_row(colspan: usize, text: &str) -> String {
    format!(
        "<tr><td colspan=\"{}\" class=\"text-center\">{}</td></tr>",
        colspan, text
    )
}

pub fn home_page(session: Option<&Session>, terminals: Option<&[TerminalCard]>) -> String {
    let mut body = String::new();
    match terminals {
        Some(cards) => {
            body.push_str("<h1>Список терминалов</h1><div class=\"row mt-4\">");
            for card in cards {
                body.push_str(&format!(
                    "<div class=\"card\"><div class=\"card-body\">\
<h3 class=\"card-title\">Терминал №{}</h3>\
<p>Ссылка для QR-кода: <code>{}</code></p>\
<a href=\"{}\" class=\"btn btn-primary\">Добавить заявку</a>\
</div></div>",
                    escape(&card.number),
                    escape(&card.link),
                    escape(&card.path)
                ));
            }
            if cards.is_empty() {
                body.push_str("<p>Терминалов пока нет</p>");
            }
            body.push_str("</div>");
        }
        None => body.push_str(
            "<h1>HelpDesk for airlines</h1>\
<p>Чтобы оставить заявку, отсканируйте QR-код на терминале.</p>",
        ),
    }
    page("Главная", session, &body, None)
}

pub fn requests_page(ctx: PageContext<'_>, snapshot: &FeedSnapshot, filter: &RequestFilter) -> String {
    let mut body = String::from("<h2 class=\"mb-4\">Заявки</h2>");
    body.push_str(&stale_banner(snapshot, ctx.offset));

    body.push_str(&format!(
        "<form method=\"get\" action=\"/requests\" class=\"row mb-3\">\
<input type=\"text\" name=\"search\" class=\"form-control\" placeholder=\"Поиск...\" value=\"{}\">\
<select name=\"status\" class=\"form-select\"><option value=\"\">Все статусы</option>",
        escape(&filter.search)
    ));
    for status in RequestStatus::ALL {
        let selected = filter
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(status.as_str()));
        body.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            status.as_str(),
            if selected { " selected" } else { "" },
            status.label()
        ));
    }
    body.push_str("</select><button type=\"submit\" class=\"btn btn-secondary\">Найти</button></form>");

    body.push_str(
        "<table class=\"table table-striped table-bordered\"><thead><tr>\
<th>№</th><th>Терминал</th><th>Пользователь</th><th>Номер телефона</th>\
<th>Описание</th><th>HelpDesk сотрудник</th><th>Создана</th><th>Статус</th>\
</tr></thead><tbody>",
    );
    let rows = filter.apply(&snapshot.requests);
    for (index, request) in rows.iter().enumerate() {
        body.push_str(&format!(
            "<tr><td><a href=\"/requests/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            request.id,
            index + 1,
            terminal_cell(request),
            escape(&request.creator),
            phone_cell(request),
            escape(&request.description),
            escape(&request.handler_name()),
            format_timestamp(&request.created_at, ctx.offset),
            request.status.label()
        ));
    }
    if rows.is_empty() {
        body.push_str(&empty_row(8, "Заявок не найдено"));
    }
    body.push_str("</tbody></table>");

    page("Заявки", Some(ctx.session), &body, Some(ctx.refresh_secs))
}

pub fn new_requests_page(ctx: PageContext<'_>, snapshot: &FeedSnapshot) -> String {
    let mut body = String::from("<h2 class=\"mb-4\">Новые заявки</h2>");
    body.push_str(&stale_banner(snapshot, ctx.offset));
    body.push_str(
        "<table class=\"table table-striped table-bordered\"><thead><tr>\
<th>№</th><th>Терминал</th><th>Пользователь</th><th>Номер телефона</th>\
<th>Описание</th><th>Создана</th><th>Действия</th>\
</tr></thead><tbody>",
    );
    let rows = new_queue(&snapshot.requests);
    for (index, request) in rows.iter().enumerate() {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            index + 1,
            terminal_cell(request),
            escape(&request.creator),
            phone_cell(request),
            escape(&request.description),
            format_timestamp(&request.created_at, ctx.offset),
            action_form(request.id, "accept", "Принять")
        ));
    }
    if rows.is_empty() {
        body.push_str(&empty_row(7, "Новых заявок нет"));
    }
    body.push_str("</tbody></table>");

    page("Новые заявки", Some(ctx.session), &body, Some(ctx.refresh_secs))
}

pub fn my_requests_page(ctx: PageContext<'_>, snapshot: &FeedSnapshot) -> String {
    let mut body = String::from("<h2 class=\"mb-4\">Мои заявки</h2>");
    body.push_str(&stale_banner(snapshot, ctx.offset));
    body.push_str(
        "<table class=\"table table-striped table-bordered\"><thead><tr>\
<th>№</th><th>Терминал</th><th>Пользователь</th><th>HelpDesk сотрудник</th>\
<th>Создана</th><th>Действия</th>\
</tr></thead><tbody>",
    );
    let rows = my_queue(&snapshot.requests, ctx.session);
    for (index, request) in rows.iter().enumerate() {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            index + 1,
            terminal_cell(request),
            escape(&request.creator),
            escape(&request.handler_name()),
            format_timestamp(&request.created_at, ctx.offset),
            action_form(request.id, "close", "Закрыть")
        ));
    }
    if rows.is_empty() {
        body.push_str(&empty_row(
            6,
            "Заявок в процессе обработки нет или они не назначены на вас",
        ));
    }
    body.push_str("</tbody></table>");

    page("Мои заявки", Some(ctx.session), &body, Some(ctx.refresh_secs))
}

pub fn request_detail_page(ctx: PageContext<'_>, request: &HelpdeskRequest) -> String {
    let action = match request.status {
        RequestStatus::New => action_form(request.id, "accept", "Принять"),
        RequestStatus::InProcess
            if request
                .handler
                .as_ref()
                .is_some_and(|h| h.is_user(ctx.session)) =>
        {
            action_form(request.id, "close", "Закрыть")
        }
        _ => String::new(),
    };

    let body = format!(
        "<h2 class=\"mb-4\">Заявка №{}</h2><dl>\
<dt>Терминал</dt><dd>{}</dd>\
<dt>Пользователь</dt><dd>{}</dd>\
<dt>Номер телефона</dt><dd>{}</dd>\
<dt>Описание</dt><dd>{}</dd>\
<dt>HelpDesk сотрудник</dt><dd>{}</dd>\
<dt>Создана</dt><dd>{}</dd>\
<dt>Статус</dt><dd>{}</dd>\
</dl>{}<p><a href=\"/requests\">Назад к списку</a></p>",
        request.id,
        terminal_cell(request),
        escape(&request.creator),
        phone_cell(request),
        escape(&request.description),
        escape(&request.handler_name()),
        format_timestamp(&request.created_at, ctx.offset),
        request.status.label(),
        action
    );

    page(&format!("Заявка №{}", request.id), Some(ctx.session), &body, None)
}

pub fn submission_form_page(session: Option<&Session>, form: &SubmissionFormView) -> String {
    let mut body = String::from("<h2 class=\"mb-4\">Новая заявка</h2>");

    let (terminal_id, terminal_number) = match (form.terminal_id, &form.terminal_number) {
        (Some(id), Some(number)) => (id, number),
        _ => {
            body.push_str(
                "<p>Терминал не указан. Отсканируйте QR-код на терминале, чтобы оставить заявку.</p>",
            );
            return page("Новая заявка", session, &body, None);
        }
    };

    if !form.errors.is_empty() {
        body.push_str("<div class=\"alert alert-danger\"><ul>");
        for error in &form.errors {
            body.push_str(&format!("<li>{}</li>", escape(error)));
        }
        body.push_str("</ul></div>");
    }

    body.push_str(&format!(
        "<form method=\"post\" action=\"/add-request\">\
<p>Терминал №{number}</p>\
<input type=\"hidden\" name=\"auditorium\" value=\"{id}\">\
<input type=\"hidden\" name=\"auditorium_number\" value=\"{number}\">\
<label>Ваше имя <input type=\"text\" name=\"creator\" value=\"{creator}\" required></label>\
<label>Номер телефона <input type=\"tel\" name=\"phone_number\" value=\"{phone}\"></label>\
<label>Описание проблемы <textarea name=\"description\" required>{description}</textarea></label>\
<button type=\"submit\" class=\"btn btn-primary\">Отправить</button></form>",
        number = escape(terminal_number),
        id = terminal_id,
        creator = escape(&form.creator),
        phone = escape(&form.phone_number),
        description = escape(&form.description),
    ));

    page("Новая заявка", session, &body, None)
}

pub fn submission_done_page(session: Option<&Session>, terminal_number: &str) -> String {
    let body = format!(
        "<h2 class=\"mb-4\">Заявка отправлена</h2>\
<p>Заявка с терминала №{} принята. Сотрудник HelpDesk скоро подойдёт.</p>",
        escape(terminal_number)
    );
    page("Заявка отправлена", session, &body, None)
}

pub fn login_page(username: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!("<div class=\"alert alert-danger\">{}</div>", escape(e)))
        .unwrap_or_default();
    let body = format!(
        "<h2 class=\"mb-4\">Вход</h2>{}\
<form method=\"post\" action=\"/login\">\
<label>Логин <input type=\"text\" name=\"username\" value=\"{}\" required></label>\
<label>Пароль <input type=\"password\" name=\"password\" required></label>\
<button type=\"submit\" class=\"btn btn-primary\">Войти</button></form>",
        error,
        escape(username)
    );
    page("Вход", None, &body, None)
}
