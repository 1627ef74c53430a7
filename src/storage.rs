use std::sync::Arc;

use bitvec::prelude::*;

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Physical storage for one column's values.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone)]
pub(crate) enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    /// Shared by VARCHAR and TEXT columns.
    Text(Vec<Arc<str>>),
    /// Compact bit-vector for boolean values.
    Bool(BitVec),
}

/// Values of a single column for every row slot of a table, live or deleted.
///
/// Slot `i` belongs to row identifier `i`. Slots are never removed, so an
/// identifier stays valid for the whole lifetime of the table.
#[derive(Debug, Clone)]
pub(crate) struct ColumnStore {
    name: String,
    data: ColumnData,
    /// A `true` bit marks the slot as `NULL`.
    null_bitmap: BitVec,
}

impl ColumnStore {
    /// Creates an empty store whose physical layout follows the data type.
    pub(crate) fn new(name: &str, data_type: DataType) -> Self {
        let data = match data_type {
            DataType::Integer => ColumnData::Int(vec![]),
            DataType::Float => ColumnData::Float(vec![]),
            DataType::Boolean => ColumnData::Bool(bitvec!()),
            DataType::Varchar | DataType::Text => ColumnData::Text(vec![]),
        };
        Self {
            name: name.to_string(),
            data,
            null_bitmap: bitvec!(),
        }
    }

    /// Appends a value in a new slot.
    ///
    /// A `Null` pushes a placeholder into the data vector to keep it aligned
    /// with the bitmap. The value must already be coerced to the column type.
    pub(crate) fn push(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            self.null_bitmap.push(true);
            match &mut self.data {
                ColumnData::Int(v) => v.push(0),
                ColumnData::Float(v) => v.push(0.0),
                ColumnData::Text(v) => v.push(Arc::from("")),
                ColumnData::Bool(v) => v.push(false),
            }
            return Ok(());
        }

        match (&mut self.data, value) {
            (ColumnData::Int(col), Value::Int(v)) => col.push(*v),
            (ColumnData::Float(col), Value::Float(v)) => col.push(*v),
            (ColumnData::Text(col), Value::Text(v)) => col.push(Arc::clone(v)),
            (ColumnData::Bool(col), Value::Bool(v)) => col.push(*v),
            _ => return Err(self.mismatch(value)),
        }
        self.null_bitmap.push(false);
        Ok(())
    }

    /// Returns the number of slots, including those of deleted rows.
    pub(crate) fn len(&self) -> usize {
        self.null_bitmap.len()
    }

    /// Retrieves the value in a slot, or `None` past the end.
    pub(crate) fn get(&self, slot: usize) -> Option<Value> {
        if slot >= self.len() {
            return None;
        }
        if self.null_bitmap[slot] {
            return Some(Value::Null);
        }
        match &self.data {
            ColumnData::Int(col) => Some(Value::Int(col[slot])),
            ColumnData::Float(col) => Some(Value::Float(col[slot])),
            ColumnData::Text(col) => Some(Value::Text(Arc::clone(&col[slot]))),
            ColumnData::Bool(col) => Some(Value::Bool(col[slot])),
        }
    }

    /// Replaces the value of an existing slot.
    ///
    /// Setting `Null` only flips the bitmap; the stale payload is never read.
    pub(crate) fn set(&mut self, slot: usize, value: &Value) -> Result<()> {
        if slot >= self.len() {
            return Err(Error::InvalidStatement(format!(
                "row slot {slot} is out of range for column '{}'",
                self.name
            )));
        }

        if value.is_null() {
            self.null_bitmap.set(slot, true);
            return Ok(());
        }

        match (&mut self.data, value) {
            (ColumnData::Int(col), Value::Int(v)) => col[slot] = *v,
            (ColumnData::Float(col), Value::Float(v)) => col[slot] = *v,
            (ColumnData::Text(col), Value::Text(v)) => col[slot] = Arc::clone(v),
            (ColumnData::Bool(col), Value::Bool(v)) => col.set(slot, *v),
            _ => return Err(self.mismatch(value)),
        }
        self.null_bitmap.set(slot, false);
        Ok(())
    }

    fn mismatch(&self, value: &Value) -> Error {
        let expected = match self.data {
            ColumnData::Int(_) => "INTEGER",
            ColumnData::Float(_) => "FLOAT",
            ColumnData::Text(_) => "TEXT",
            ColumnData::Bool(_) => "BOOLEAN",
        };
        Error::TypeMismatch {
            column: self.name.clone(),
            expected: expected.to_string(),
            value: value.clone(),
        }
    }
}
