use std::cmp::Ordering;

use crate::ast::{ComparisonOp, Expr, LogicalOp, Predicate};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;

/// Evaluates a WHERE predicate against a single row.
///
/// Column references resolve against `row` by qualified key first, then by
/// bare name. AND/OR short-circuit, so the right side of `false AND x` or
/// `true OR x` is never resolved.
///
/// # SQL NULL Semantics
/// - A comparison with a `NULL` operand is `false` for every operator but `!=`.
/// - `NULL != NULL` is `false`; `NULL != x` for a non-null `x` is `true`.
///
/// # Errors
/// [Error::ColumnNotFound] for an unresolved column reference, and
/// [Error::Incomparable] for an ordering between unrelated kinds.
pub fn evaluate(predicate: &Predicate, row: &Row) -> Result<bool> {
    match predicate {
        Predicate::Comparison { left, op, right } => {
            let left = resolve(left, row)?;
            let right = resolve(right, row)?;
            compare_values(left, *op, right)
        }
        Predicate::Logical { left, op, right } => {
            let left_result = evaluate(left, row)?;
            match (op, left_result) {
                (LogicalOp::And, false) => Ok(false),
                (LogicalOp::Or, true) => Ok(true),
                _ => evaluate(right, row),
            }
        }
    }
}

fn resolve<'a>(expr: &'a Expr, row: &'a Row) -> Result<&'a Value> {
    match expr {
        Expr::Literal(literal) => Ok(&literal.value),
        Expr::Column(column) => row
            .resolve(&column.column, column.table.as_deref())
            .ok_or_else(|| Error::column_not_found(&column.column, column.table.as_deref())),
    }
}

/// Compares two resolved operands with `op`.
pub fn compare_values(left: &Value, op: ComparisonOp, right: &Value) -> Result<bool> {
    if left.is_null() || right.is_null() {
        return Ok(op == ComparisonOp::Ne && left.is_null() != right.is_null());
    }

    match op {
        ComparisonOp::Eq => Ok(left.equals(right)),
        ComparisonOp::Ne => Ok(!left.equals(right)),
        ComparisonOp::Lt => ordering(left, right).map(|o| o == Some(Ordering::Less)),
        ComparisonOp::Gt => ordering(left, right).map(|o| o == Some(Ordering::Greater)),
        ComparisonOp::Le => {
            ordering(left, right).map(|o| matches!(o, Some(Ordering::Less | Ordering::Equal)))
        }
        ComparisonOp::Ge => {
            ordering(left, right).map(|o| matches!(o, Some(Ordering::Greater | Ordering::Equal)))
        }
    }
}

/// `None` only for NaN, which orders against nothing.
fn ordering(left: &Value, right: &Value) -> Result<Option<Ordering>> {
    if !left.is_comparable_with(right) {
        return Err(Error::Incomparable {
            left: left.clone(),
            right: right.clone(),
        });
    }
    Ok(left.compare(right))
}
