use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::column::Column;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::identifier::validate_identifier;
use crate::table::Table;

/// Registry of named tables. Table names are unique within a database.
#[derive(Debug, Default)]
pub struct Database {
    config: DatabaseConfig,
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

/// Per-table figures reported by [Database::stats].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStats {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub index_count: usize,
}

/// Snapshot of a database's size, tables sorted by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub name: String,
    pub table_count: usize,
    pub tables: Vec<TableStats>,
}

impl Database {
    /// Creates a new, empty database with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DatabaseConfig) -> Self {
        Self {
            config,
            tables: HashMap::default(),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Creates a new table in the database.
    ///
    /// # Errors
    /// Returns [Error::InvalidIdentifier] for a bad name,
    /// [Error::TableAlreadyExists] if the name is taken, or whatever
    /// [Table::new] rejects about the columns.
    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<&mut Table> {
        validate_identifier(name)?;
        if self.tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }
        let table = Table::new(name, columns)?;
        debug!(table = name, columns = table.columns().len(), "created table");
        Ok(self.tables.entry(name.to_string()).or_insert(table))
    }

    /// Removes a table from the database by its name.
    ///
    /// # Errors
    /// Returns an error if the table does not exist.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.tables.remove(name) {
            Some(_) => {
                debug!(table = name, "dropped table");
                Ok(())
            }
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Retrieves a reference to a table by name.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Retrieves a mutable reference to a table by name.
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the names of all tables, sorted.
    pub fn list_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Drops every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn stats(&self) -> DatabaseStats {
        let mut tables: Vec<TableStats> = self
            .tables
            .values()
            .map(|t| TableStats {
                name: t.name().to_string(),
                row_count: t.row_count(),
                column_count: t.columns().len(),
                index_count: t.index_count(),
            })
            .collect();
        tables.sort_unstable_by(|a, b| a.name.cmp(&b.name));

        DatabaseStats {
            name: self.config.name.clone(),
            table_count: tables.len(),
            tables,
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} tables)", self.name(), self.table_count())
    }
}
