use thiserror::Error;

use crate::value::Value;

/// Every failure the engine can report.
///
/// All variants are terminal for the operation that raised them; nothing is
/// retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("column '{column}' does not exist{}", table_suffix(.table))]
    ColumnNotFound {
        column: String,
        table: Option<String>,
    },

    #[error("no index on column '{column}' in table '{table}'")]
    IndexNotFound { table: String, column: String },

    /// A PRIMARY KEY or UNIQUE value collides with a live row.
    #[error("duplicate value '{value}' for column '{column}'")]
    DuplicateKey { column: String, value: Value },

    /// NOT NULL violations and attempts to modify a primary key.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A value's kind or length does not fit the column it is written to.
    #[error("type mismatch for column '{column}': expected {expected}, got {value:?}")]
    TypeMismatch {
        column: String,
        expected: String,
        value: Value,
    },

    /// An ordering operator was applied to values of unrelated kinds.
    #[error(
        "cannot compare {} '{left}' with {} '{right}'",
        .left.kind_name(),
        .right.kind_name()
    )]
    Incomparable { left: Value, right: Value },

    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    #[error("unknown constraint '{0}'")]
    UnknownConstraint(String),
}

fn table_suffix(table: &Option<String>) -> String {
    match table {
        Some(table) => format!(" in table '{table}'"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn column_not_found(column: &str, table: Option<&str>) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
            table: table.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_entity() {
        let err = Error::column_not_found("age", Some("users"));
        assert_eq!(
            err.to_string(),
            "column 'age' does not exist in table 'users'"
        );

        let err = Error::column_not_found("age", None);
        assert_eq!(err.to_string(), "column 'age' does not exist");

        let err = Error::DuplicateKey {
            column: "id".into(),
            value: Value::Int(7),
        };
        assert_eq!(err.to_string(), "duplicate value '7' for column 'id'");

        let err = Error::Incomparable {
            left: Value::from("abc"),
            right: Value::Int(3),
        };
        assert_eq!(err.to_string(), "cannot compare TEXT 'abc' with INTEGER '3'");
    }
}
