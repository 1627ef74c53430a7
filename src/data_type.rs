use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Represents the supported data types in the database schema.
/// These types define the structure of columns and the expected format of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 64-bit signed integer.
    Integer,
    /// A 64-bit floating-point number.
    Float,
    /// A UTF-8 string with an optional maximum length, carried by the column.
    Varchar,
    /// An unbounded UTF-8 string.
    Text,
    /// A boolean value (true or false).
    Boolean,
}

impl DataType {
    /// Canonical upper-case name, as used in declarations and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Parses a declared type name, case-insensitively.
    /// `INT`, `REAL` and `BOOL` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Ok(Self::Integer),
            "FLOAT" | "REAL" => Ok(Self::Float),
            "VARCHAR" => Ok(Self::Varchar),
            "TEXT" => Ok(Self::Text),
            "BOOLEAN" | "BOOL" => Ok(Self::Boolean),
            _ => Err(Error::UnknownDataType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_aliases() {
        assert_eq!("INTEGER".parse::<DataType>(), Ok(DataType::Integer));
        assert_eq!("int".parse::<DataType>(), Ok(DataType::Integer));
        assert_eq!("Real".parse::<DataType>(), Ok(DataType::Float));
        assert_eq!("varchar".parse::<DataType>(), Ok(DataType::Varchar));
        assert_eq!("TEXT".parse::<DataType>(), Ok(DataType::Text));
        assert_eq!("bool".parse::<DataType>(), Ok(DataType::Boolean));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "BLOB".parse::<DataType>(),
            Err(Error::UnknownDataType("BLOB".into()))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for dt in [
            DataType::Integer,
            DataType::Float,
            DataType::Varchar,
            DataType::Text,
            DataType::Boolean,
        ] {
            assert_eq!(dt.to_string().parse::<DataType>(), Ok(dt));
        }
    }
}
