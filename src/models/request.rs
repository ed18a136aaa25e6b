use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use super::{Scalar, Session};

/// Статус заявки. Жизненный цикл: NEW → IN_PROCESS → CLOSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    New,
    InProcess,
    Closed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::New,
        RequestStatus::InProcess,
        RequestStatus::Closed,
    ];

    // Значение в том виде, в котором его принимает и отдаёт API
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "NEW",
            RequestStatus::InProcess => "IN_PROCESS",
            RequestStatus::Closed => "CLOSED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::New => "Новый",
            RequestStatus::InProcess => "В процессе",
            RequestStatus::Closed => "Закрыт",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown request status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    // Регистр не важен: фильтр приходит из формы как угодно
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Handler {
    pub id: Option<i64>,
    pub username: Option<String>,
}

impl Handler {
    pub fn display_name(&self) -> String {
        match (&self.username, self.id) {
            (Some(username), _) => username.clone(),
            (None, Some(id)) => format!("#{}", id),
            (None, None) => String::new(),
        }
    }

    pub fn is_user(&self, session: &Session) -> bool {
        if let Some(id) = self.id {
            if id == session.user_id {
                return true;
            }
        }
        self.username.as_deref() == Some(session.username.as_str())
    }
}

/// Заявка в нормализованном виде, независимо от того,
/// какие поля прислал конкретный эндпоинт.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RequestRecord")]
pub struct HelpdeskRequest {
    pub id: i64,
    pub creator: String,
    pub phone_number: Option<String>,
    pub description: String,
    pub status: RequestStatus,
    pub handler: Option<Handler>,
    pub created_at: DateTime<Utc>,
    pub terminal_id: Option<i64>,
    pub terminal_number: Option<String>,
}

impl HelpdeskRequest {
    pub fn handler_name(&self) -> String {
        self.handler
            .as_ref()
            .map(Handler::display_name)
            .unwrap_or_default()
    }
}

// Сырой ответ API: разные страницы исторически читали
// `auditorium_number` / `auditorium_number_display` и `handler` / `handler_username`
#[derive(Deserialize)]
struct RequestRecord {
    id: i64,
    #[serde(default)]
    creator: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    description: Option<String>,
    status: RequestStatus,
    #[serde(default)]
    handler: Option<Scalar>,
    #[serde(default)]
    handler_username: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    auditorium: Option<Scalar>,
    #[serde(default)]
    auditorium_number: Option<Scalar>,
    #[serde(default)]
    auditorium_number_display: Option<Scalar>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<RequestRecord> for HelpdeskRequest {
    fn from(record: RequestRecord) -> Self {
        // Строка из цифр может быть и id, и логином: без `handler_username`
        // сохраняем оба толкования
        let handler_id = record.handler.as_ref().and_then(Scalar::as_id);
        let handler_text = match record.handler {
            Some(Scalar::Text(name)) => Some(name),
            _ => None,
        };
        let username = non_empty(record.handler_username).or_else(|| non_empty(handler_text));
        let handler = if handler_id.is_some() || username.is_some() {
            Some(Handler {
                id: handler_id,
                username,
            })
        } else {
            None
        };

        let terminal_number = record
            .auditorium_number_display
            .or(record.auditorium_number)
            .map(Scalar::into_text);

        Self {
            id: record.id,
            creator: record.creator.unwrap_or_default(),
            phone_number: non_empty(record.phone_number),
            description: record.description.unwrap_or_default(),
            status: record.status,
            handler,
            created_at: record.created_at,
            terminal_id: record.auditorium.as_ref().and_then(Scalar::as_id),
            terminal_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler: Option<i64>,
}

impl StatusUpdate {
    pub fn accept(handler_id: i64) -> Self {
        Self {
            status: RequestStatus::InProcess,
            handler: Some(handler_id),
        }
    }

    pub fn close() -> Self {
        Self {
            status: RequestStatus::Closed,
            handler: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct NewRequest {
    #[validate(length(min = 1, max = 150, message = "Укажите имя"))]
    pub creator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Опишите проблему"))]
    pub description: String,
    pub auditorium: i64,
}

impl NewRequest {
    pub fn new(
        creator: &str,
        phone_number: Option<&str>,
        description: &str,
        auditorium: i64,
    ) -> Self {
        Self {
            creator: creator.trim().to_string(),
            phone_number: non_empty(phone_number.map(str::to_string)),
            description: description.trim().to_string(),
            auditorium,
        }
    }

    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(phone) = &self.phone_number {
            let allowed = phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
            let digits = phone.chars().filter(char::is_ascii_digit).count();
            if !allowed || !(5..=15).contains(&digits) {
                let mut error = ValidationError::new("phone");
                error.message = Some("Некорректный номер телефона".into());
                errors.add("phone_number", error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn session() -> Session {
        Session {
            token: "t".to_string(),
            role: Role::Staff,
            user_id: 7,
            username: "aigerim".to_string(),
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("closed".parse::<RequestStatus>(), Ok(RequestStatus::Closed));
        assert_eq!(" In_Process ".parse::<RequestStatus>(), Ok(RequestStatus::InProcess));
        assert!("DONE".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn display_field_names_are_normalized() {
        let json = r#"{
            "id": 1,
            "creator": "Иванов",
            "phone_number": "",
            "description": "Не печатает принтер",
            "status": "IN_PROCESS",
            "handler": 7,
            "handler_username": "aigerim",
            "created_at": "2024-03-01T09:15:00Z",
            "auditorium": 3,
            "auditorium_number_display": 305
        }"#;
        let request: HelpdeskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.terminal_number.as_deref(), Some("305"));
        assert_eq!(request.terminal_id, Some(3));
        assert_eq!(request.phone_number, None);
        assert_eq!(
            request.handler,
            Some(Handler {
                id: Some(7),
                username: Some("aigerim".to_string())
            })
        );
    }

    #[test]
    fn legacy_field_names_are_normalized() {
        let json = r#"{
            "id": 2,
            "creator": "Петров",
            "description": "Нет сети",
            "status": "NEW",
            "handler": "aigerim",
            "created_at": "2024-03-01T09:15:00+05:00",
            "auditorium_number": "101"
        }"#;
        let request: HelpdeskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.terminal_number.as_deref(), Some("101"));
        assert_eq!(request.handler_name(), "aigerim");
        assert_eq!(request.handler.as_ref().and_then(|h| h.id), None);
        assert!(request.handler.as_ref().unwrap().is_user(&session()));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let json = r#"{"id": 3, "status": "REOPENED", "created_at": "2024-03-01T09:15:00Z"}"#;
        assert!(serde_json::from_str::<HelpdeskRequest>(json).is_err());
    }

    #[test]
    fn missing_handler_stays_empty() {
        let json = r#"{"id": 4, "status": "NEW", "handler": null, "created_at": "2024-03-01T09:15:00Z"}"#;
        let request: HelpdeskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.handler, None);
        assert_eq!(request.handler_name(), "");
    }

    #[test]
    fn numeric_legacy_handler_keeps_username() {
        let json = r#"{"id": 5, "status": "IN_PROCESS", "handler": "2024", "created_at": "2024-03-01T09:15:00Z"}"#;
        let request: HelpdeskRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.handler_name(), "2024");
        assert_eq!(
            request.handler,
            Some(Handler {
                id: Some(2024),
                username: Some("2024".to_string())
            })
        );
    }

    #[test]
    fn accept_update_carries_handler_and_close_does_not() {
        assert_eq!(
            serde_json::to_value(StatusUpdate::accept(7)).unwrap(),
            serde_json::json!({"status": "IN_PROCESS", "handler": 7})
        );
        assert_eq!(
            serde_json::to_value(StatusUpdate::close()).unwrap(),
            serde_json::json!({"status": "CLOSED"})
        );
    }

    #[test]
    fn new_request_is_trimmed_and_checked() {
        let request = NewRequest::new("  Иванов ", Some("  "), " Не работает мышь ", 3);
        assert_eq!(request.creator, "Иванов");
        assert_eq!(request.phone_number, None);
        assert!(request.check().is_ok());

        let blank = NewRequest::new(" ", None, "", 3);
        let errors = blank.check().unwrap_err();
        assert!(errors.field_errors().contains_key("creator"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn phone_number_format_is_checked() {
        let ok = NewRequest::new("Иванов", Some("+7 (701) 123-45-67"), "Сломался сканер", 1);
        assert!(ok.check().is_ok());

        let bad = NewRequest::new("Иванов", Some("call me"), "Сломался сканер", 1);
        let errors = bad.check().unwrap_err();
        assert!(errors.field_errors().contains_key("phone_number"));
    }
}
