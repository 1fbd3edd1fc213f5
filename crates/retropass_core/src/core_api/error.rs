use std::io;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoreErrorCode {
    InvalidPassword,
    UnknownField,
    MalformedCell,
    FieldRange,
    Schema,
    UnknownGame,
    Settings,
    Io,
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("no such field: {0}")]
    UnknownField(String),

    #[error("malformed cell {0:?}: expected a row letter A-E and a column digit 1-5")]
    MalformedCell(String),

    #[error("value {value} out of range for {field} (allowed {min}..={max})")]
    FieldRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("schema error in {origin} line {line}: {message}")]
    Schema {
        origin: String,
        line: usize,
        message: String,
    },

    #[error("unknown game: {0}")]
    UnknownGame(String),

    #[error("settings error on line {line}: {message}")]
    Settings { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn code(&self) -> CoreErrorCode {
        match self {
            Self::InvalidPassword(_) => CoreErrorCode::InvalidPassword,
            Self::UnknownField(_) => CoreErrorCode::UnknownField,
            Self::MalformedCell(_) => CoreErrorCode::MalformedCell,
            Self::FieldRange { .. } => CoreErrorCode::FieldRange,
            Self::Schema { .. } => CoreErrorCode::Schema,
            Self::UnknownGame(_) => CoreErrorCode::UnknownGame,
            Self::Settings { .. } => CoreErrorCode::Settings,
            Self::Io(_) => CoreErrorCode::Io,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidPassword(message.into())
    }

    pub(crate) fn schema(origin: &str, line: usize, message: impl Into<String>) -> Self {
        Self::Schema {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn range(field: &str, value: i64, min: i64, max: i64) -> Self {
        Self::FieldRange {
            field: field.to_string(),
            value,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_variants() {
        assert_eq!(
            CoreError::invalid("bad").code(),
            CoreErrorCode::InvalidPassword
        );
        assert_eq!(
            CoreError::UnknownField("x".into()).code(),
            CoreErrorCode::UnknownField
        );
        assert_eq!(
            CoreError::range("missiles", 300, 0, 255).code(),
            CoreErrorCode::FieldRange
        );
    }

    #[test]
    fn range_message_names_bounds() {
        let err = CoreError::range("stage", 5, 1, 4);
        assert_eq!(
            err.to_string(),
            "value 5 out of range for stage (allowed 1..=4)"
        );
    }
}
