use std::fmt;

use bitvec::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::column::{Column, ColumnDescriptor};
use crate::error::{Error, Result};
use crate::index::{HashIndex, Index};
use crate::row::{Row, RowId};
use crate::storage::ColumnStore;
use crate::value::Value;

/// A table: schema, columnar row storage and the indexes kept in step with it.
///
/// Rows live in slots addressed by [RowId]. Deleting a row only sets its
/// tombstone bit, so identifiers held by any index stay valid. Every live row
/// appears in each index under its current non-null value and deleted rows
/// appear in none.
#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    primary_key: Option<usize>,
    /// One store per column, same order as `columns`.
    stores: Vec<ColumnStore>,
    /// Tombstones, one bit per slot. Its length is the next row id.
    deleted: BitVec,
    live_rows: usize,
    indexes: FxHashMap<String, Box<dyn Index>>,
}

impl Table {
    /// Creates an empty table.
    ///
    /// Primary-key and unique columns get their index immediately. The table
    /// name is not validated here; [crate::Database::create_table] does that.
    ///
    /// # Errors
    /// Returns [Error::InvalidSchema] when there are no columns, more than one
    /// primary key, or two columns with the same name.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(Error::InvalidSchema(format!(
                "table '{name}' must have at least one column"
            )));
        }

        let mut primary_key = None;
        for (pos, column) in columns.iter().enumerate() {
            if columns[..pos].iter().any(|c| c.name() == column.name()) {
                return Err(Error::InvalidSchema(format!(
                    "column '{}' is declared twice in table '{name}'",
                    column.name()
                )));
            }
            if column.is_primary_key() {
                if primary_key.is_some() {
                    return Err(Error::InvalidSchema(format!(
                        "table '{name}' can have at most one PRIMARY KEY"
                    )));
                }
                primary_key = Some(pos);
            }
        }

        let stores = columns
            .iter()
            .map(|c| ColumnStore::new(c.name(), c.data_type()))
            .collect();

        let mut table = Self {
            name,
            columns,
            primary_key,
            stores,
            deleted: BitVec::new(),
            live_rows: 0,
            indexes: FxHashMap::default(),
        };

        let constrained: Vec<String> = table
            .columns
            .iter()
            .filter(|c| c.is_unique())
            .map(|c| c.name().to_string())
            .collect();
        for column in constrained {
            table.create_index(&column)?;
        }

        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn primary_key(&self) -> Option<&Column> {
        self.primary_key.map(|pos| &self.columns[pos])
    }

    pub fn get_column(&self, name: &str) -> Result<&Column> {
        self.position(name).map(|pos| &self.columns[pos])
    }

    /// Ordered column descriptors.
    pub fn get_schema(&self) -> Vec<ColumnDescriptor> {
        self.columns.iter().map(Column::descriptor).collect()
    }

    /// Number of live rows.
    pub fn row_count(&self) -> usize {
        self.live_rows
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.indexes.contains_key(column)
    }

    pub fn get_index(&self, column: &str) -> Option<&dyn Index> {
        self.indexes.get(column).map(|index| index.as_ref())
    }

    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    /// Builds an index on `column` from the current live rows and attaches it.
    /// Indexing an already indexed column does nothing.
    pub fn create_index(&mut self, column: &str) -> Result<()> {
        let pos = self.position(column)?;
        if self.has_index(column) {
            return Ok(());
        }

        let store = &self.stores[pos];
        let values: Vec<(RowId, Value)> = self
            .live_ids()
            .filter_map(|id| store.get(id).map(|v| (id, v)))
            .collect();
        let index = HashIndex::build(column, values.iter().map(|(id, v)| (*id, v)));

        debug!(
            table = %self.name,
            column = index.column_name(),
            keys = index.len(),
            "created index"
        );
        self.indexes.insert(column.to_string(), Box::new(index));
        Ok(())
    }

    /// Detaches the index on `column`.
    ///
    /// # Errors
    /// Primary-key and unique indexes are mandatory and cannot be dropped.
    pub fn drop_index(&mut self, column: &str) -> Result<()> {
        let pos = self.position(column)?;
        if self.columns[pos].is_unique() {
            return Err(Error::InvalidSchema(format!(
                "cannot drop index on PRIMARY KEY or UNIQUE column '{column}'"
            )));
        }
        match self.indexes.remove(column) {
            Some(_) => {
                debug!(table = %self.name, column, "dropped index");
                Ok(())
            }
            None => Err(Error::IndexNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            }),
        }
    }

    /// Inserts a row and returns its identifier.
    ///
    /// Missing columns default to `Null`. Every value is coerced and
    /// validated, then the primary key and each unique column are checked for
    /// collisions. Nothing is written until all checks have passed.
    pub fn insert_row(&mut self, values: Row) -> Result<RowId> {
        if let Some(unknown) = values.keys().find(|k| self.position(k).is_err()) {
            return Err(Error::column_not_found(unknown, Some(&self.name)));
        }

        let mut complete = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = values.get(column.name()).cloned().unwrap_or(Value::Null);
            complete.push(column.coerce(value)?);
        }

        if let Some(pk) = self.primary_key {
            self.check_unique(pk, &complete[pk], None)?;
        }
        for (pos, column) in self.columns.iter().enumerate() {
            if column.is_unique() && Some(pos) != self.primary_key {
                self.check_unique(pos, &complete[pos], None)?;
            }
        }

        let row_id = self.deleted.len();
        for (store, value) in self.stores.iter_mut().zip(&complete) {
            store.push(value)?;
        }
        self.deleted.push(false);
        self.live_rows += 1;

        for (pos, column) in self.columns.iter().enumerate() {
            if let Some(index) = self.indexes.get_mut(column.name()) {
                index.insert(&complete[pos], row_id);
            }
        }

        trace!(table = %self.name, row_id, "inserted row");
        Ok(row_id)
    }

    /// The row's external view, or `None` if unknown or deleted.
    pub fn get_row(&self, row_id: RowId) -> Option<Row> {
        if !self.is_live(row_id) {
            return None;
        }
        let mut row = Row::with_capacity(self.columns.len());
        for (column, store) in self.columns.iter().zip(&self.stores) {
            row.insert(column.name(), store.get(row_id)?);
        }
        Some(row)
    }

    /// Applies `assignments` to a live row.
    ///
    /// Returns `Ok(false)` if the row is unknown or deleted. All assignments
    /// are validated before any is applied: unknown columns, primary-key
    /// changes, type errors and unique collisions with another row fail.
    pub fn update_row(&mut self, row_id: RowId, assignments: &Row) -> Result<bool> {
        if !self.is_live(row_id) {
            return Ok(false);
        }

        let mut changes = Vec::with_capacity(assignments.len());
        for (name, value) in assignments.iter() {
            let pos = self.position(name)?;
            let column = &self.columns[pos];
            if column.is_primary_key() {
                return Err(Error::ConstraintViolation(format!(
                    "cannot update PRIMARY KEY column '{name}'"
                )));
            }
            let value = column.coerce(value.clone())?;
            if column.is_unique() {
                self.check_unique(pos, &value, Some(row_id))?;
            }
            changes.push((pos, value));
        }

        for (pos, new_value) in changes {
            let store = &mut self.stores[pos];
            let old_value = store.get(row_id).unwrap_or(Value::Null);
            store.set(row_id, &new_value)?;
            if let Some(index) = self.indexes.get_mut(self.columns[pos].name()) {
                index.delete(&old_value, row_id);
                index.insert(&new_value, row_id);
            }
        }

        trace!(table = %self.name, row_id, "updated row");
        Ok(true)
    }

    /// Marks a live row deleted and removes it from every index.
    /// Returns `false`, changing nothing, if the row is unknown or already deleted.
    pub fn delete_row(&mut self, row_id: RowId) -> bool {
        if !self.is_live(row_id) {
            return false;
        }

        for (pos, column) in self.columns.iter().enumerate() {
            if let Some(index) = self.indexes.get_mut(column.name()) {
                let value = self.stores[pos].get(row_id).unwrap_or(Value::Null);
                index.delete(&value, row_id);
            }
        }
        self.deleted.set(row_id, true);
        self.live_rows -= 1;

        trace!(table = %self.name, row_id, "deleted row");
        true
    }

    /// Lazily yields every live row in insertion order.
    pub fn scan(&self) -> impl Iterator<Item = Row> + '_ {
        self.live_ids().filter_map(move |id| self.get_row(id))
    }

    /// Live rows paired with their identifiers, in insertion order.
    pub(crate) fn scan_with_ids(&self) -> impl Iterator<Item = (RowId, Row)> + '_ {
        self.live_ids()
            .filter_map(move |id| self.get_row(id).map(|row| (id, row)))
    }

    fn live_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.deleted.iter_zeros()
    }

    fn is_live(&self, row_id: RowId) -> bool {
        self.deleted.get(row_id).is_some_and(|bit| !*bit)
    }

    fn position(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == column)
            .ok_or_else(|| Error::column_not_found(column, Some(&self.name)))
    }

    /// Fails if a live row other than `owner` already holds `value` in the
    /// unique column at `pos`.
    fn check_unique(&self, pos: usize, value: &Value, owner: Option<RowId>) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let column = &self.columns[pos];
        let Some(index) = self.indexes.get(column.name()) else {
            return Ok(());
        };
        if index.search(value).iter().any(|&id| Some(id) != owner) {
            return Err(Error::DuplicateKey {
                column: column.name().to_string(),
                value: value.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} rows, {} columns)",
            self.name,
            self.row_count(),
            self.columns.len()
        )
    }
}
