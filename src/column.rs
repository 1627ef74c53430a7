use std::fmt;
use std::str::FromStr;

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::identifier::validate_identifier;
use crate::value::Value;

/// Constraints a column may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnConstraint {
    /// Implies both [ColumnConstraint::Unique] and [ColumnConstraint::NotNull].
    PrimaryKey,
    Unique,
    NotNull,
}

impl ColumnConstraint {
    pub fn name(self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::Unique => "UNIQUE",
            Self::NotNull => "NOT NULL",
        }
    }
}

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnConstraint {
    type Err = Error;

    /// Accepts `PRIMARY KEY`, `UNIQUE` and `NOT NULL` in any case, with `_` or
    /// any run of whitespace between words.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        match normalized.as_str() {
            "PRIMARY KEY" => Ok(Self::PrimaryKey),
            "UNIQUE" => Ok(Self::Unique),
            "NOT NULL" => Ok(Self::NotNull),
            _ => Err(Error::UnknownConstraint(s.to_string())),
        }
    }
}

/// Schema entry for one column: name, declared type, optional VARCHAR bound
/// and constraint set.
///
/// This is the only place type and constraint rules are defined. Every
/// write path goes through [Column::coerce].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data_type: DataType,
    max_length: Option<usize>,
    constraints: Vec<ColumnConstraint>,
}

impl Column {
    /// Creates an unconstrained column.
    ///
    /// # Errors
    /// Returns [Error::InvalidIdentifier] if the name is not a valid identifier.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self {
            name,
            data_type,
            max_length: None,
            constraints: Vec::new(),
        })
    }

    /// Adds a constraint. Adding one twice has no effect.
    pub fn with_constraint(mut self, constraint: ColumnConstraint) -> Self {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
        self
    }

    pub fn primary_key(self) -> Self {
        self.with_constraint(ColumnConstraint::PrimaryKey)
    }

    pub fn unique(self) -> Self {
        self.with_constraint(ColumnConstraint::Unique)
    }

    pub fn not_null(self) -> Self {
        self.with_constraint(ColumnConstraint::NotNull)
    }

    /// Sets the maximum length (VARCHAR only).
    ///
    /// # Errors
    /// Returns [Error::InvalidSchema] for any other data type.
    pub fn with_max_length(mut self, max_length: usize) -> Result<Self> {
        if self.data_type != DataType::Varchar {
            return Err(Error::InvalidSchema(format!(
                "column '{}' of type {} cannot declare a length",
                self.name, self.data_type
            )));
        }
        self.max_length = Some(max_length);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn constraints(&self) -> &[ColumnConstraint] {
        &self.constraints
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.is_primary_key() || self.constraints.contains(&ColumnConstraint::Unique)
    }

    pub fn is_not_null(&self) -> bool {
        self.is_primary_key() || self.constraints.contains(&ColumnConstraint::NotNull)
    }

    /// Checks a value against the declared type and constraints.
    ///
    /// `Null` passes unless the column is NOT NULL (explicitly or through
    /// PRIMARY KEY). A non-null value must match the storage type exactly:
    /// an integer is not a float and a boolean is not a 0/1 integer.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let matches = match (self.data_type, value) {
            (_, Value::Null) => {
                if self.is_not_null() {
                    return Err(Error::ConstraintViolation(format!(
                        "column '{}' cannot be NULL",
                        self.name
                    )));
                }
                return Ok(());
            }
            (DataType::Integer, Value::Int(_))
            | (DataType::Float, Value::Float(_))
            | (DataType::Text, Value::Text(_))
            | (DataType::Boolean, Value::Bool(_)) => true,
            (DataType::Varchar, Value::Text(s)) => {
                self.max_length.is_none_or(|max| s.chars().count() <= max)
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                column: self.name.clone(),
                expected: self.type_label(),
                value: value.clone(),
            })
        }
    }

    /// Applies the explicit INTEGER → FLOAT promotion, then validates.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        let value = match (self.data_type, value) {
            (DataType::Float, Value::Int(i)) => Value::Float(i as f64),
            (_, value) => value,
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Declared type as written, e.g. `VARCHAR(10)`.
    pub fn type_label(&self) -> String {
        match self.max_length {
            Some(max) => format!("{}({max})", self.data_type),
            None => self.data_type.to_string(),
        }
    }

    pub fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            data_type: self.data_type,
            max_length: self.max_length,
            constraints: self.constraints.clone(),
        }
    }
}

/// Read-only description of a column, as returned by `Table::get_schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
    pub max_length: Option<usize>,
    pub constraints: Vec<ColumnConstraint>,
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if let Some(max) = self.max_length {
            write!(f, "({max})")?;
        }
        for constraint in &self.constraints {
            write!(f, " {constraint}")?;
        }
        Ok(())
    }
}
