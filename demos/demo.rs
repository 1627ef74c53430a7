use relstore::ast::{
    ColumnDecl, ColumnRef, ColumnsSelect, ComparisonOp, CreateTable, Expr, Insert, JoinClause,
    Predicate, Select, Statement, Update,
};
use relstore::{Database, DatabaseConfig, QueryExecutor, Result, Row, Value};
use tracing_subscriber::EnvFilter;

fn insert(table: &str, columns: &[&str], values: Vec<Value>) -> Statement {
    Statement::Insert(Insert {
        table: table.into(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

fn print_rows(rows: &[Row]) {
    for row in rows {
        let cells: Vec<String> = row.iter().map(|(k, v)| format!("{k}={v}")).collect();
        println!("  {}", cells.join(", "));
    }
}

fn main() -> Result<()> {
    // RUST_LOG=relstore=debug shows planner and executor decisions.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relstore=info")),
        )
        .init();

    println!("In-Memory Database Demo\n");

    let mut executor = QueryExecutor::new(Database::with_config(
        DatabaseConfig::default().with_name("demo"),
    ));

    executor.execute(&Statement::CreateTable(CreateTable {
        table: "users".into(),
        columns: vec![
            ColumnDecl::new("id", "INTEGER").constraint("PRIMARY KEY"),
            ColumnDecl::new("name", "VARCHAR").max_length(32),
            ColumnDecl::new("age", "INTEGER"),
        ],
    }))?;
    executor.execute(&Statement::CreateTable(CreateTable {
        table: "posts".into(),
        columns: vec![
            ColumnDecl::new("id", "INTEGER").constraint("PRIMARY KEY"),
            ColumnDecl::new("user_id", "INTEGER"),
            ColumnDecl::new("title", "TEXT"),
        ],
    }))?;
    println!("Created tables 'users' and 'posts'");

    for (id, name, age) in [(1, "Alice", Some(30)), (2, "Bob", None), (3, "Charlie", Some(25))] {
        executor.execute(&insert(
            "users",
            &["id", "name", "age"],
            vec![Value::Int(id), Value::from(name), Value::from(age)],
        ))?;
    }
    for (id, user_id, title) in [(1, 1, "Hello"), (2, 1, "Again"), (3, 3, "First post")] {
        executor.execute(&insert(
            "posts",
            &["id", "user_id", "title"],
            vec![Value::Int(id), Value::Int(user_id), Value::from(title)],
        ))?;
    }
    println!("Inserted 3 users and 3 posts\n");

    let duplicate = insert("users", &["id", "name"], vec![Value::Int(1), Value::from("Dup")]);
    if let Err(err) = executor.execute(&duplicate) {
        println!("Rejected duplicate: {err}\n");
    }

    println!("Users older than 26:");
    let older = executor.execute(&Statement::Select(Select {
        columns: ColumnsSelect::Names(vec!["name".into(), "age".into()]),
        table: "users".into(),
        where_clause: Some(Predicate::compare(
            Expr::column("age"),
            ComparisonOp::Gt,
            Expr::literal(26),
        )),
        join: None,
    }))?;
    print_rows(older.rows().unwrap_or_default());

    let updated = executor.execute(&Statement::Update(Update {
        table: "users".into(),
        assignments: vec![("age".into(), Value::Int(41))],
        where_clause: Some(Predicate::column_eq("name", "Bob")),
    }))?;
    println!("\nUpdated {} row(s)", updated.affected().unwrap_or(0));

    println!("\nPosts with their authors:");
    let joined = executor.execute(&Statement::Select(Select {
        columns: ColumnsSelect::Names(vec!["users.name".into(), "title".into()]),
        table: "users".into(),
        where_clause: None,
        join: Some(JoinClause {
            table: "posts".into(),
            left_column: ColumnRef::qualified("users", "id"),
            right_column: ColumnRef::qualified("posts", "user_id"),
        }),
    }))?;
    print_rows(joined.rows().unwrap_or_default());

    let stats = executor.database().stats();
    println!("\nDatabase '{}':", stats.name);
    for table in stats.tables {
        println!(
            "  - {} ({} rows, {} indexes)",
            table.name, table.row_count, table.index_count
        );
    }

    Ok(())
}
