use serde::Deserialize;

use super::Scalar;

// Терминал ("аудитория") - точка, где пользователь оставляет заявку
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TerminalRecord")]
pub struct Terminal {
    pub id: i64,
    pub number: String,
}

#[derive(Deserialize)]
struct TerminalRecord {
    id: i64,
    number: Scalar,
}

impl From<TerminalRecord> for Terminal {
    fn from(record: TerminalRecord) -> Self {
        Self {
            id: record.id,
            number: record.number.into_text(),
        }
    }
}
