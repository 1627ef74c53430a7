use tracing::debug;

use crate::ast::{ComparisonOp, Expr, Predicate};
use crate::error::Result;
use crate::evaluator::evaluate;
use crate::row::{Row, RowId};
use crate::table::Table;
use crate::value::Value;

/// How the planner gathers candidate rows for a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessPath {
    /// Every live row is evaluated.
    FullScan,
    /// Point search on `column`'s index, then the full predicate is
    /// re-evaluated on each candidate.
    IndexLookup { column: String, key: Value },
}

impl AccessPath {
    pub fn is_index_lookup(&self) -> bool {
        matches!(self, Self::IndexLookup { .. })
    }
}

/// Chooses between an index lookup and a full scan, then filters the
/// candidates through the evaluator.
///
/// Only a top-level `column = literal` (either operand order) on an indexed
/// column is recognised. Equalities nested in AND/OR trees are not
/// extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, table: &Table, predicate: Option<&Predicate>) -> AccessPath {
        let Some(Predicate::Comparison {
            left,
            op: ComparisonOp::Eq,
            right,
        }) = predicate
        else {
            return AccessPath::FullScan;
        };

        let (column, literal) = match (left, right) {
            (Expr::Column(column), Expr::Literal(literal))
            | (Expr::Literal(literal), Expr::Column(column)) => (column, literal),
            _ => return AccessPath::FullScan,
        };

        let own_column = column.table.as_deref().is_none_or(|t| t == table.name());
        if !own_column || literal.value.is_null() || !table.has_index(&column.column) {
            return AccessPath::FullScan;
        }

        AccessPath::IndexLookup {
            column: column.column.clone(),
            key: literal.value.clone(),
        }
    }

    /// Whether [QueryPlanner::matching_rows] would narrow candidates through
    /// an index for `predicate`.
    pub fn can_use_index(&self, table: &Table, predicate: &Predicate) -> bool {
        self.plan(table, Some(predicate)).is_index_lookup()
    }

    /// Live rows of `table` satisfying `predicate`, in insertion order. With
    /// no predicate every live row matches.
    pub fn matching_rows(&self, table: &Table, predicate: Option<&Predicate>) -> Result<Vec<Row>> {
        Ok(self
            .matching_entries(table, predicate)?
            .into_iter()
            .map(|(_, row)| row)
            .collect())
    }

    /// Same as [QueryPlanner::matching_rows], keeping each row's identifier.
    pub(crate) fn matching_entries(
        &self,
        table: &Table,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<(RowId, Row)>> {
        let Some(predicate) = predicate else {
            debug!(table = table.name(), "full scan without predicate");
            return Ok(table.scan_with_ids().collect());
        };

        let candidates: Vec<(RowId, Row)> = match self.plan(table, Some(predicate)) {
            AccessPath::IndexLookup { column, key } => {
                let ids = table
                    .get_index(&column)
                    .map(|index| index.search(&key))
                    .unwrap_or_default();
                debug!(
                    table = table.name(),
                    column = %column,
                    candidates = ids.len(),
                    "index lookup"
                );
                ids.into_iter()
                    .filter_map(|id| table.get_row(id).map(|row| (id, row)))
                    .collect()
            }
            AccessPath::FullScan => {
                debug!(table = table.name(), rows = table.row_count(), "full scan");
                table.scan_with_ids().collect()
            }
        };

        let mut matches = Vec::new();
        for (id, row) in candidates {
            if evaluate(predicate, &row)? {
                matches.push((id, row));
            }
        }
        Ok(matches)
    }
}
