//! Ссылки на форму заявки для терминалов.
//!
//! Ссылка кодируется в QR-код и наклеивается на терминал; сама генерация
//! картинки делается сторонним инструментом, здесь только адрес.

use crate::models::Terminal;

pub const AUDITORIUM_INFO_PARAM: &str = "auditoriumInfo";

// Значение параметра `auditoriumInfo`: `{id}-{number}`
pub fn auditorium_info(terminal: &Terminal) -> String {
    format!("{}-{}", terminal.id, terminal.number)
}

pub fn submission_path(terminal: &Terminal) -> Result<String, serde_urlencoded::ser::Error> {
    let query = serde_urlencoded::to_string([(AUDITORIUM_INFO_PARAM, auditorium_info(terminal))])?;
    Ok(format!("/add-request?{}", query))
}

pub fn submission_link(
    public_base_url: &str,
    terminal: &Terminal,
) -> Result<String, serde_urlencoded::ser::Error> {
    Ok(format!(
        "{}{}",
        public_base_url.trim_end_matches('/'),
        submission_path(terminal)?
    ))
}

/// Разбирает `{id}-{number}`. Номер может сам содержать дефисы.
pub fn parse_auditorium_info(value: &str) -> Option<(i64, String)> {
    let (id, number) = value.trim().split_once('-')?;
    let id = id.parse().ok()?;
    if number.is_empty() {
        return None;
    }
    Some((id, number.to_string()))
}
