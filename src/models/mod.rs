pub mod request;
pub mod session;
pub mod terminal;

pub use request::{Handler, HelpdeskRequest, NewRequest, RequestStatus, StatusUpdate};
pub use session::{Role, Session};
pub use terminal::Terminal;

use serde::Deserialize;

// Значение, которое API отдаёт то числом, то строкой
// (номер терминала, ссылка на обработчика)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    pub(crate) fn into_text(self) -> String {
        match self {
            Scalar::Int(value) => value.to_string(),
            Scalar::Text(value) => value,
        }
    }

    pub(crate) fn as_id(&self) -> Option<i64> {
        match self {
            Scalar::Int(value) => Some(*value),
            Scalar::Text(value) => value.trim().parse().ok(),
        }
    }
}
