//! Statement and predicate values consumed by the executor.
//!
//! These are produced by an external translator; nothing in this crate parses
//! text into them.

use std::fmt;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    DropTable(DropTable),
    CreateIndex(CreateIndex),
    Insert(Insert),
    Select(Select),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// Statement keyword, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "CREATE TABLE",
            Self::DropTable(_) => "DROP TABLE",
            Self::CreateIndex(_) => "CREATE INDEX",
            Self::Insert(_) => "INSERT",
            Self::Select(_) => "SELECT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
        }
    }
}

/// Column declaration in CREATE TABLE. Type and constraint names are strings
/// such as `"VARCHAR"` and `"PRIMARY KEY"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: String,
    pub type_name: String,
    pub max_length: Option<usize>,
    pub constraints: Vec<String>,
}

impl ColumnDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            max_length: None,
            constraints: Vec::new(),
        }
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<ColumnDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub table: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub index_name: String,
    pub table: String,
    pub column: String,
}

/// `columns` and `values` pair up positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnsSelect {
    Star,
    Names(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: ColumnsSelect,
    pub table: String,
    pub where_clause: Option<Predicate>,
    pub join: Option<JoinClause>,
}

/// Inner equi-join with a second table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub left_column: ColumnRef,
    pub right_column: ColumnRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
        })
    }
}

/// Reference to a column, optionally qualified with its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub column: String,
    pub table: Option<String>,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            table: None,
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            table: Some(table.into()),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => f.write_str(&self.column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    Null,
}

impl LiteralKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Int(_) | Value::Float(_) => Self::Number,
            Value::Text(_) => Self::String,
            Value::Bool(_) => Self::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub kind: LiteralKind,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            kind: LiteralKind::of(&value),
            value,
        }
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
}

impl Expr {
    pub fn column(column: impl Into<String>) -> Self {
        Self::Column(ColumnRef::new(column))
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column(ColumnRef::qualified(table, column))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(Literal::new(value))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(column) => column.fmt(f),
            Self::Literal(Literal {
                value: Value::Text(s),
                ..
            }) => write!(f, "'{s}'"),
            Self::Literal(literal) => literal.value.fmt(f),
        }
    }
}

/// Boolean predicate tree of a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Comparison {
        left: Expr,
        op: ComparisonOp,
        right: Expr,
    },
    Logical {
        left: Box<Predicate>,
        op: LogicalOp,
        right: Box<Predicate>,
    },
}

impl Predicate {
    pub fn compare(left: Expr, op: ComparisonOp, right: Expr) -> Self {
        Self::Comparison { left, op, right }
    }

    /// `column = value`, the common case.
    pub fn column_eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(Expr::column(column), ComparisonOp::Eq, Expr::literal(value))
    }

    pub fn and(self, right: Predicate) -> Self {
        Self::Logical {
            left: Box::new(self),
            op: LogicalOp::And,
            right: Box::new(right),
        }
    }

    pub fn or(self, right: Predicate) -> Self {
        Self::Logical {
            left: Box::new(self),
            op: LogicalOp::Or,
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison { left, op, right } => write!(f, "{left} {op} {right}"),
            Self::Logical { left, op, right } => write!(f, "({left} {op} {right})"),
        }
    }
}
