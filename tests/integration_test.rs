use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread;
use vibetable::column::Column;
use vibetable::event::{ColumnEvent, EventLog, TableEvent};
use vibetable::expression::{
    validate_filter_predicate, ColumnCollector, Expression, Function, Predicate,
};
use vibetable::loader::{load_records, schema_for, DefaultFieldHandler, MemorySource, SourceType};
use vibetable::{DataError, DataType, Field, Schema, Table, Value};

fn people() -> Table {
    let schema = Schema::builder()
        .field("name", DataType::String)
        .field_with_default("age", DataType::Int, -1)
        .field("score", DataType::Double)
        .field("member", DataType::Boolean)
        .build()
        .unwrap();
    let mut table = Table::new(schema).unwrap();
    for (name, age, score, member) in [
        ("ada", 36, 91.5, true),
        ("bob", 17, 55.0, false),
        ("cy", 52, 78.25, true),
        ("dee", 29, 64.0, false),
    ] {
        let row = table.add_row();
        table.set_string(row, "name", name).unwrap();
        table.set_int(row, "age", age).unwrap();
        table.set_double(row, "score", score).unwrap();
        table.set_boolean(row, "member", member).unwrap();
    }
    table
}

#[test]
fn test_column_boundary_scenario() {
    let mut column = Column::new(DataType::Int, 3, 5, Value::Int(-1)).unwrap();
    assert_eq!(column.row_count(), 3);
    assert_eq!(
        column.get(4).unwrap_err(),
        DataError::OutOfBounds { row: 4, size: 3 }
    );

    column.set_maximum_row(6);
    assert_eq!(column.row_count(), 6);
    for row in 3..6 {
        assert_eq!(column.get_int(row).unwrap(), -1);
    }
}

#[test]
fn test_coercion_scenario() {
    let schema = Schema::builder()
        .field("label", DataType::String)
        .field("count", DataType::Int)
        .build()
        .unwrap();
    let mut table = Table::new(schema).unwrap();
    let row = table.add_row();

    let err = table.set(row, "label", true).unwrap_err();
    assert!(matches!(err, DataError::TypeMismatch { .. }));
    assert_eq!(table.get_string(row, "label").unwrap(), "");

    table.set(row, "count", 3.9).unwrap();
    assert_eq!(table.get_int(row, "count").unwrap(), 3);
    table.set(row, "count", -3.9).unwrap();
    assert_eq!(table.get_int(row, "count").unwrap(), -3);

    for n in [i32::MIN, -1, 0, 7, i32::MAX] {
        table.set_int(row, "count", n).unwrap();
        assert_eq!(table.get_double(row, "count").unwrap(), f64::from(n));
    }

    assert_eq!(
        table.set(row, "count", Value::Null).unwrap_err(),
        DataError::NullRejected(DataType::Int)
    );
}

#[test]
fn test_tuple_stays_invalid_after_row_reuse() {
    let mut table = people();
    let bob = table.tuple(1).unwrap();
    assert_eq!(bob.get_string(&table, "name").unwrap(), "bob");

    assert!(table.remove_row(1));
    assert_eq!(bob.get(&table, "name").unwrap_err(), DataError::InvalidTuple);

    let row = table.add_row();
    assert_eq!(row, 1);
    table.set_string(row, "name", "eve").unwrap();

    // the old handle does not see the new occupant of its row
    assert_eq!(bob.get(&table, "name").unwrap_err(), DataError::InvalidTuple);
    assert!(!bob.is_valid(&table));
    assert_eq!(bob.row(), 1);

    let eve = table.tuple(1).unwrap();
    assert_eq!(eve.get_string(&table, "name").unwrap(), "eve");
    assert_eq!(eve.get_int(&table, "age").unwrap(), -1);
}

#[test]
fn test_listeners_see_changes_in_order() {
    let mut table = people();
    let log = EventLog::new();
    table.add_listener(log.listener());

    let ages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&ages);
    table
        .add_column_listener("age", move |e| seen.lock().push((e.row, e.previous.clone())))
        .unwrap();

    let tuple = table.tuple(2).unwrap();
    tuple.set_int(&mut table, "age", 53).unwrap();
    tuple.set_int(&mut table, "age", 53).unwrap();
    tuple.set_string(&mut table, "name", "cyd").unwrap();
    table.remove_row(0);

    let events = log.drain();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        TableEvent::Updated {
            column: 1,
            field: "age".to_string(),
            row: 2,
            previous: Value::Int(52),
        }
    );
    assert_eq!(events[2], TableEvent::Deleted { row: 0 });
    assert_eq!(*ages.lock(), vec![(2, Value::Int(52))]);
}

#[test]
fn test_rejected_write_changes_nothing() {
    let mut table = people();
    let log = EventLog::new();
    table.add_listener(log.listener());

    table.set_read_only("score", true).unwrap();
    assert_eq!(table.set_double(0, "score", 1.0).unwrap_err(), DataError::ReadOnly);
    assert!(table.set(0, "member", "perhaps").is_err());
    assert!(table.set_int(9, "age", 1).is_err());

    assert!(log.is_empty());
    assert_eq!(table.get_double(0, "score").unwrap(), 91.5);
    assert!(table.get_boolean(0, "member").unwrap());
}

#[test]
fn test_select_members() {
    let table = people();
    let expr = Expression::and(
        Expression::field("member"),
        Expression::gt(Expression::field("score"), Expression::literal(80)),
    );
    validate_filter_predicate(&expr, table.schema()).unwrap();
    assert_eq!(ColumnCollector::collect(&expr), vec!["member", "score"]);

    let matches = table.select(&Predicate::new(expr));
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].get_string(&table, "name").unwrap(), "ada");

    let label = Expression::if_then_else(
        Expression::ge(Expression::field("age"), Expression::literal(18)),
        Expression::call(Function::Upper, vec![Expression::field("name")]),
        Expression::literal("minor"),
    );
    let labels: Vec<Value> = table
        .rows()
        .map(|row| table.evaluate(row, &label).unwrap())
        .collect();
    assert_eq!(
        labels,
        vec![
            Value::from("ADA"),
            Value::from("minor"),
            Value::from("CY"),
            Value::from("DEE")
        ]
    );
}

#[test]
fn test_tuple_rendering() {
    let table = people();
    let tuple = table.tuple(3).unwrap();
    assert_eq!(tuple.bind(&table).to_string(), "Tuple[dee,29,64,false]");
    assert_eq!(
        tuple.bind(&table).get(Field::Index(0)).unwrap(),
        Value::from("dee")
    );
}

#[test]
fn test_load_then_query() {
    let mut source = MemorySource::new(vec![
        ("city".to_string(), SourceType::VarChar),
        ("population".to_string(), SourceType::BigInt),
        ("area".to_string(), SourceType::Real),
    ]);
    source.push(vec![Value::from("oslo"), Value::Long(709_000), Value::Float(454.0)]);
    source.push(vec![Value::from("bergen"), Value::Long(291_000), Value::Float(465.0)]);
    source.push(vec![Value::from("tromso"), Value::Null, Value::Float(2_521.0)]);

    let handler = DefaultFieldHandler::default();
    let mut table = Table::new(schema_for(&source, &handler).unwrap()).unwrap();
    assert_eq!(load_records(&mut table, &mut source, &handler).unwrap(), 3);

    let dense = Predicate::new(Expression::gt(
        Expression::div_expr(Expression::field("population"), Expression::field("area")),
        Expression::literal(1000),
    ));
    let names = table.select_values(&dense, "city").unwrap();
    assert_eq!(names, vec![Value::from("oslo")]);
    assert_eq!(table.get_long(2, "population").unwrap(), 0);
}

#[test]
fn test_shared_table_across_threads() {
    let table = Arc::new(Mutex::new(people()));
    let mut handles = vec![];

    for i in 0..4 {
        let table = Arc::clone(&table);
        handles.push(thread::spawn(move || {
            let mut table = table.lock();
            let row = table.add_row();
            table.set_int(row, "age", 100 + i).unwrap();
            row
        }));
    }

    let mut rows: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    rows.sort_unstable();
    assert_eq!(rows, vec![4, 5, 6, 7]);

    let table = table.lock();
    assert_eq!(table.row_count(), 8);
    let old = Predicate::new(Expression::ge(
        Expression::field("age"),
        Expression::literal(100),
    ));
    assert_eq!(table.select(&old).len(), 4);
}

#[test]
fn test_concurrent_readers_share_table() {
    let mut table = people();
    let log = EventLog::new();
    table.add_listener(log.listener());
    table
        .add_column_listener("age", |_: &ColumnEvent| {})
        .unwrap();
    let table = Arc::new(RwLock::new(table));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let table = table.read();
                let adults = Predicate::new(Expression::ge(
                    Expression::field("age"),
                    Expression::literal(18),
                ));
                (table.get_int(0, "age").unwrap(), table.select(&adults).len())
            })
        })
        .collect();

    for reader in readers {
        assert_eq!(reader.join().unwrap(), (36, 3));
    }

    table.write().set_int(1, "age", 18).unwrap();
    assert_eq!(log.len(), 1);
}

#[test]
fn test_scoped_readers_borrow_table() {
    let table = people();
    let names: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = table
            .rows()
            .map(|row| {
                let table = &table;
                scope.spawn(move || table.get_string(row, "name").unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(names, vec!["ada", "bob", "cy", "dee"]);
}
