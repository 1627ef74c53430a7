//! In-memory relational storage engine.
//!
//! Tables hold typed, constrained columns with hash indexes on primary-key,
//! unique and explicitly indexed columns. Statements arrive as [ast] values
//! and run through [QueryExecutor], which uses [QueryPlanner] to pick between
//! an index point lookup and a full scan.

pub mod ast;
pub mod column;
pub mod config;
pub mod data_type;
pub mod database;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod identifier;
pub mod index;
pub mod planner;
pub mod row;
mod storage;
pub mod table;
pub mod value;

pub use column::{Column, ColumnConstraint, ColumnDescriptor};
pub use config::DatabaseConfig;
pub use data_type::DataType;
pub use database::{Database, DatabaseStats, TableStats};
pub use error::{Error, Result};
pub use evaluator::evaluate;
pub use executor::{QueryExecutor, QueryResult};
pub use index::{HashIndex, Index};
pub use planner::{AccessPath, QueryPlanner};
pub use row::{Row, RowId};
pub use table::Table;
pub use value::Value;
