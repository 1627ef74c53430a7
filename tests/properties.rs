use std::collections::BTreeSet;

use proptest::prelude::*;
use relstore::ast::{ComparisonOp, Expr, Literal, Predicate};
use relstore::{Column, DataType, Error, QueryPlanner, Row, RowId, Table, Value, evaluate};

fn arb_value() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
        "[a-z]{0,6}".prop_map(Value::from),
        any::<bool>().prop_map(Value::Bool),
    ]
    .boxed()
}

fn arb_op() -> BoxedStrategy<ComparisonOp> {
    prop_oneof![
        Just(ComparisonOp::Eq),
        Just(ComparisonOp::Ne),
        Just(ComparisonOp::Lt),
        Just(ComparisonOp::Gt),
        Just(ComparisonOp::Le),
        Just(ComparisonOp::Ge),
    ]
    .boxed()
}

/// `items(id PRIMARY KEY, bucket INTEGER)` with `bucket` indexed.
fn items(ids: &BTreeSet<i64>, buckets: i64) -> (Table, Vec<RowId>) {
    let mut table = Table::new(
        "items",
        vec![
            Column::new("id", DataType::Integer).unwrap().primary_key(),
            Column::new("bucket", DataType::Integer).unwrap(),
        ],
    )
    .unwrap();
    table.create_index("bucket").unwrap();

    let row_ids = ids
        .iter()
        .map(|&id| {
            table
                .insert_row(Row::from([
                    ("id", Value::Int(id)),
                    ("bucket", Value::Int(id.rem_euclid(buckets))),
                ]))
                .unwrap()
        })
        .collect();
    (table, row_ids)
}

/// Every index's search results for every key it reports.
fn index_snapshot(table: &Table) -> Vec<(String, Vec<(Value, Vec<RowId>)>)> {
    ["id", "bucket"]
        .into_iter()
        .map(|column| {
            let index = table.get_index(column).unwrap();
            let mut keys = index.all_keys();
            keys.sort_by(|a, b| a.compare(b).unwrap());
            let entries = keys
                .into_iter()
                .map(|key| {
                    let ids = index.search(&key);
                    (key, ids)
                })
                .collect();
            (column.to_string(), entries)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn primary_key_duplicates_fail_until_deleted(
        ids in prop::collection::btree_set(-1000i64..1000, 1..40),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut table, row_ids) = items(&ids, 7);
        let keys: Vec<i64> = ids.iter().copied().collect();
        let at = pick.index(keys.len());
        let key = keys[at];
        let duplicate = Row::from([("id", Value::Int(key)), ("bucket", Value::Int(0))]);

        prop_assert_eq!(
            table.insert_row(duplicate.clone()),
            Err(Error::DuplicateKey { column: "id".into(), value: Value::Int(key) })
        );
        prop_assert_eq!(table.row_count(), keys.len());

        prop_assert!(table.delete_row(row_ids[at]));
        prop_assert!(table.insert_row(duplicate).is_ok());
        prop_assert_eq!(table.row_count(), keys.len());
    }

    #[test]
    fn index_search_matches_live_rows(
        ids in prop::collection::btree_set(0i64..500, 0..60),
        deletes in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let (mut table, row_ids) = items(&ids, 5);
        let mut deleted = BTreeSet::new();
        for pick in deletes {
            if row_ids.is_empty() {
                break;
            }
            let row_id = row_ids[pick.index(row_ids.len())];
            table.delete_row(row_id);
            deleted.insert(row_id);
        }

        let index = table.get_index("bucket").unwrap();
        for bucket in 0..5 {
            let expected: Vec<RowId> = row_ids
                .iter()
                .copied()
                .filter(|id| !deleted.contains(id))
                .filter(|&id| table.get_row(id).unwrap().get("bucket") == Some(&Value::Int(bucket)))
                .collect();
            prop_assert_eq!(index.search(&Value::Int(bucket)), expected);
        }
        for row_id in &deleted {
            for column in ["id", "bucket"] {
                let index = table.get_index(column).unwrap();
                for key in index.all_keys() {
                    prop_assert!(!index.search(&key).contains(row_id));
                }
            }
        }
        prop_assert!(index.search(&Value::Null).is_empty());
    }

    #[test]
    fn indexed_and_scanned_lookups_agree(
        ids in prop::collection::btree_set(0i64..300, 0..50),
        bucket in 0i64..6,
    ) {
        let (table, _) = items(&ids, 6);
        let predicate = Predicate::column_eq("bucket", bucket);
        prop_assert!(QueryPlanner.can_use_index(&table, &predicate));

        let indexed = QueryPlanner.matching_rows(&table, Some(&predicate)).unwrap();
        let scanned: Vec<Row> = table
            .scan()
            .filter(|row| row.get("bucket") == Some(&Value::Int(bucket)))
            .collect();
        prop_assert_eq!(indexed, scanned);
    }

    #[test]
    fn missing_operand_raises_unless_short_circuited(
        present in arb_value(),
        op in arb_op(),
        left_true in any::<bool>(),
        use_and in any::<bool>(),
    ) {
        let row = Row::from([("present", present)]);
        let missing = Predicate::compare(Expr::column("absent"), op, Expr::literal(1));
        prop_assert!(matches!(evaluate(&missing, &row), Err(Error::ColumnNotFound { .. })), "expected ColumnNotFound");

        let row = Row::from([("flag", Value::Bool(true))]);
        let left = Predicate::column_eq("flag", left_true);
        let combined = if use_and { left.and(missing) } else { left.or(missing) };

        let short_circuits = use_and != left_true;
        match evaluate(&combined, &row) {
            Ok(result) => {
                prop_assert!(short_circuits);
                prop_assert_eq!(result, left_true);
            }
            Err(err) => {
                prop_assert!(!short_circuits);
                let is_not_found = matches!(err, Error::ColumnNotFound { .. });
                prop_assert!(is_not_found);
            }
        }
    }

    #[test]
    fn null_comparison_law(value in arb_value(), op in arb_op(), null_on_left in any::<bool>()) {
        let null = Expr::Literal(Literal::null());
        let other = Expr::literal(value.clone());
        let predicate = if null_on_left {
            Predicate::compare(null, op, other)
        } else {
            Predicate::compare(other, op, null)
        };

        let expected = op == ComparisonOp::Ne && !value.is_null();
        prop_assert_eq!(evaluate(&predicate, &Row::new()), Ok(expected));
    }

    #[test]
    fn insert_then_read_back_by_primary_key(
        id in any::<i64>(),
        name in proptest::option::of("[A-Za-z ]{0,12}"),
        score in proptest::option::of(-1.0e9..1.0e9f64),
        active in proptest::option::of(any::<bool>()),
    ) {
        let mut table = Table::new(
            "people",
            vec![
                Column::new("id", DataType::Integer).unwrap().primary_key(),
                Column::new("name", DataType::Text).unwrap(),
                Column::new("score", DataType::Float).unwrap(),
                Column::new("active", DataType::Boolean).unwrap(),
            ],
        )
        .unwrap();
        let row = Row::from([
            ("id", Value::Int(id)),
            ("name", Value::from(name)),
            ("score", Value::from(score)),
            ("active", Value::from(active)),
        ]);
        table.insert_row(row.clone()).unwrap();

        let found = QueryPlanner
            .matching_rows(&table, Some(&Predicate::column_eq("id", id)))
            .unwrap();
        prop_assert_eq!(found, vec![row]);
    }

    #[test]
    fn deleting_twice_changes_nothing(
        ids in prop::collection::btree_set(0i64..200, 1..30),
        pick in any::<prop::sample::Index>(),
        unknown in 1000usize..2000,
    ) {
        let (mut table, row_ids) = items(&ids, 4);
        let row_id = row_ids[pick.index(row_ids.len())];
        prop_assert!(table.delete_row(row_id));

        let before = index_snapshot(&table);
        let count = table.row_count();

        prop_assert!(!table.delete_row(row_id));
        prop_assert!(!table.delete_row(unknown));
        prop_assert_eq!(index_snapshot(&table), before);
        prop_assert_eq!(table.row_count(), count);
    }
}
