use tracing::debug;

use crate::ast::{
    ColumnDecl, ColumnRef, ColumnsSelect, CreateIndex, CreateTable, Delete, Insert, JoinClause,
    Select, Statement, Update,
};
use crate::column::{Column, ColumnConstraint};
use crate::data_type::DataType;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::evaluator::evaluate;
use crate::identifier::validate_identifier;
use crate::planner::QueryPlanner;
use crate::row::Row;
use crate::table::Table;
use crate::value::Value;

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// SELECT output. Keys are bare column names for a single table and
    /// `table.column` for a join.
    Rows(Vec<Row>),
    /// Rows written by INSERT, UPDATE or DELETE.
    Affected(usize),
    /// DDL statements.
    Empty,
}

impl QueryResult {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Self::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn affected(&self) -> Option<usize> {
        match self {
            Self::Affected(n) => Some(*n),
            _ => None,
        }
    }
}

/// Runs statements against an owned [Database].
#[derive(Debug, Default)]
pub struct QueryExecutor {
    database: Database,
    planner: QueryPlanner,
}

impl QueryExecutor {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            planner: QueryPlanner::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    pub fn into_database(self) -> Database {
        self.database
    }

    /// Executes one statement.
    ///
    /// # Errors
    /// Any failure from the layers below is returned unchanged. A failed
    /// single-row write leaves the table untouched; a multi-row UPDATE that
    /// fails part way keeps the rows it already changed.
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        debug!(statement = statement.kind(), "executing statement");
        match statement {
            Statement::CreateTable(create) => self.create_table(create),
            Statement::DropTable(drop) => {
                self.database.drop_table(&drop.table)?;
                Ok(QueryResult::Empty)
            }
            Statement::CreateIndex(create) => self.create_index(create),
            Statement::Insert(insert) => self.insert(insert),
            Statement::Select(select) => self.select(select).map(QueryResult::Rows),
            Statement::Update(update) => self.update(update),
            Statement::Delete(delete) => self.delete(delete),
        }
    }

    fn create_table(&mut self, create: &CreateTable) -> Result<QueryResult> {
        let columns = create
            .columns
            .iter()
            .map(build_column)
            .collect::<Result<Vec<_>>>()?;
        self.database.create_table(&create.table, columns)?;
        Ok(QueryResult::Empty)
    }

    fn create_index(&mut self, create: &CreateIndex) -> Result<QueryResult> {
        validate_identifier(&create.index_name)?;
        self.database
            .table_mut(&create.table)?
            .create_index(&create.column)?;
        Ok(QueryResult::Empty)
    }

    fn insert(&mut self, insert: &Insert) -> Result<QueryResult> {
        if insert.columns.len() != insert.values.len() {
            return Err(Error::InvalidStatement(format!(
                "INSERT names {} columns but supplies {} values",
                insert.columns.len(),
                insert.values.len()
            )));
        }
        let table = self.database.table_mut(&insert.table)?;
        let row: Row = insert
            .columns
            .iter()
            .cloned()
            .zip(insert.values.iter().cloned())
            .collect();
        table.insert_row(row)?;
        Ok(QueryResult::Affected(1))
    }

    fn select(&self, select: &Select) -> Result<Vec<Row>> {
        if let Some(join) = &select.join {
            return self.select_join(select, join);
        }

        let table = self.database.table(&select.table)?;
        let projection = match &select.columns {
            ColumnsSelect::Star => None,
            ColumnsSelect::Names(names) => Some(resolve_projection(table, names)?),
        };

        let rows = self
            .planner
            .matching_rows(table, select.where_clause.as_ref())?;
        let Some(projection) = projection else {
            return Ok(rows);
        };

        rows.iter()
            .map(|row| {
                projection
                    .iter()
                    .map(|&column| {
                        row.get(column)
                            .cloned()
                            .map(|value| (column.to_string(), value))
                            .ok_or_else(|| Error::column_not_found(column, Some(table.name())))
                    })
                    .collect::<Result<Row>>()
            })
            .collect()
    }

    /// Inner equi-join, left rows in scan order, each followed by its right
    /// matches in scan order. A NULL join value matches a NULL on the other
    /// side.
    fn select_join(&self, select: &Select, join: &JoinClause) -> Result<Vec<Row>> {
        let left = self.database.table(&select.table)?;
        let right = self.database.table(&join.table)?;
        let (left_column, right_column) = orient(join, left.name(), right.name());

        let probe = self.database.config().join_index_probe
            && right_column
                .table
                .as_deref()
                .is_none_or(|t| t == right.name())
            && right.has_index(&right_column.column);
        debug!(
            left = left.name(),
            right = right.name(),
            strategy = if probe { "index probe" } else { "nested loop" },
            "joining tables"
        );

        // Loaded on first use. Indexes hold no NULL keys, so a NULL left
        // value scans the right side even when probing.
        let mut right_rows: Option<Vec<Row>> = None;

        let mut joined = Vec::new();
        for left_row in left.scan() {
            let Some(key) = left_row.resolve(&left_column.column, Some(left.name())) else {
                continue;
            };

            let candidates = if probe && !key.is_null() {
                probe_matches(right, &right_column.column, key)
            } else {
                right_rows
                    .get_or_insert_with(|| right.scan().collect())
                    .iter()
                    .filter(|row| {
                        row.resolve(&right_column.column, Some(right.name()))
                            .is_some_and(|v| key.equals(v))
                    })
                    .cloned()
                    .collect()
            };

            for right_row in candidates {
                let combined = Row::combine(&left_row, left.name(), &right_row, right.name());
                if let Some(predicate) = &select.where_clause {
                    if !evaluate(predicate, &combined)? {
                        continue;
                    }
                }
                joined.push(combined);
            }
        }

        match &select.columns {
            ColumnsSelect::Star => Ok(joined),
            ColumnsSelect::Names(names) => joined
                .iter()
                .map(|row| project_joined(row, names))
                .collect(),
        }
    }

    fn update(&mut self, update: &Update) -> Result<QueryResult> {
        let table = self.database.table_mut(&update.table)?;
        for (name, _) in &update.assignments {
            table.get_column(name)?;
        }
        let assignments: Row = update.assignments.iter().cloned().collect();

        let matches = self
            .planner
            .matching_entries(table, update.where_clause.as_ref())?;
        let mut affected = 0;
        for (row_id, _) in matches {
            if table.update_row(row_id, &assignments)? {
                affected += 1;
            }
        }

        debug!(table = %update.table, affected, "updated rows");
        Ok(QueryResult::Affected(affected))
    }

    fn delete(&mut self, delete: &Delete) -> Result<QueryResult> {
        let table = self.database.table_mut(&delete.table)?;
        let matches = self
            .planner
            .matching_entries(table, delete.where_clause.as_ref())?;
        let mut affected = 0;
        for (row_id, _) in matches {
            if table.delete_row(row_id) {
                affected += 1;
            }
        }

        debug!(table = %delete.table, affected, "deleted rows");
        Ok(QueryResult::Affected(affected))
    }
}

/// Maps a declaration onto the column model.
fn build_column(decl: &ColumnDecl) -> Result<Column> {
    let data_type: DataType = decl.type_name.parse()?;
    let mut column = Column::new(decl.name.as_str(), data_type)?;
    if let Some(max_length) = decl.max_length {
        column = column.with_max_length(max_length)?;
    }
    for constraint in &decl.constraints {
        column = column.with_constraint(constraint.parse::<ColumnConstraint>()?);
    }
    Ok(column)
}

/// The schema column behind each requested name. `users.name` on table
/// `users` reads and outputs `name`.
fn resolve_projection<'a>(table: &Table, names: &'a [String]) -> Result<Vec<&'a str>> {
    names
        .iter()
        .map(|name| {
            let column = name
                .strip_prefix(table.name())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(name);
            table.get_column(column)?;
            Ok(column)
        })
        .collect()
}

/// The join columns as (left side, right side). References qualified the
/// other way round are swapped.
fn orient<'a>(join: &'a JoinClause, left: &str, right: &str) -> (&'a ColumnRef, &'a ColumnRef) {
    let swapped = join.left_column.table.as_deref() == Some(right)
        && join.right_column.table.as_deref() == Some(left)
        && left != right;
    if swapped {
        (&join.right_column, &join.left_column)
    } else {
        (&join.left_column, &join.right_column)
    }
}

fn probe_matches(right: &Table, column: &str, key: &Value) -> Vec<Row> {
    let Some(index) = right.get_index(column) else {
        return Vec::new();
    };
    index
        .search(key)
        .into_iter()
        .filter_map(|id| right.get_row(id))
        .filter(|row| row.get(column).is_some_and(|v| key.equals(v)))
        .collect()
}

/// Exact key first, then the first `*.name` key. Output rows keep the
/// qualified key that was matched.
fn project_joined(row: &Row, names: &[String]) -> Result<Row> {
    names
        .iter()
        .map(|name| {
            let found = match row.get(name) {
                Some(value) => Some((name.as_str(), value)),
                None => row.find_suffix(name),
            };
            found
                .map(|(key, value)| (key.to_string(), value.clone()))
                .ok_or_else(|| Error::column_not_found(name, None))
        })
        .collect()
}
