//! vibetable - build a typed in-memory table, fill it and query it

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser as ClapParser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use vibetable::config::SchemaConfig;
use vibetable::expression::{
    validate_filter_predicate, ColumnCollector, Expression, ExpressionStats, Predicate,
};
use vibetable::loader::{load_records, DefaultFieldHandler, MemorySource, SourceType};
use vibetable::table::Table;
use vibetable::value::{epoch, DataType, Value};

/// vibetable - A typed in-memory table engine
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Fields as comma separated name:type[:default] entries
    #[arg(short, long, default_value = "name:string,age:int,score:double,member:boolean")]
    fields: String,

    /// JSON schema file; takes precedence over --fields
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Number of generated rows
    #[arg(short, long, default_value = "10")]
    rows: usize,

    /// Initial row capacity of the table
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Seed for the row generator
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Field to filter on
    #[arg(long)]
    filter_field: Option<String>,

    /// Lower bound for the filter field; without it the filter keeps non-null values
    #[arg(long)]
    min: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

const NAMES: &[&str] = &[
    "ada", "grace", "alan", "edsger", "barbara", "donald", "frances", "ken",
];

fn generate_value(rng: &mut StdRng, data_type: DataType) -> Value {
    match data_type {
        DataType::Int => Value::Int(rng.gen_range(0..100)),
        DataType::Long => Value::Long(rng.gen_range(0..1_000_000)),
        DataType::Float => Value::Float(rng.gen_range(0.0..10.0)),
        DataType::Double => Value::Double(rng.gen_range(0.0..100.0)),
        DataType::Boolean => Value::Boolean(rng.gen()),
        DataType::String => Value::from(*NAMES.choose(rng).unwrap_or(&"anonymous")),
        DataType::Date => Value::Date(epoch() + Duration::days(rng.gen_range(0..20_000))),
        DataType::Object if rng.gen_bool(0.2) => Value::Null,
        DataType::Object => Value::Int(rng.gen_range(-10..10)),
    }
}

/// Generate `count` random records shaped like the table's fields.
fn generate_records(table: &Table, count: usize, seed: u64) -> MemorySource {
    let mut rng = StdRng::seed_from_u64(seed);
    let fields: Vec<(String, DataType)> = table
        .schema()
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.data_type))
        .collect();

    let mut source = MemorySource::new(
        fields
            .iter()
            .map(|(name, data_type)| (name.clone(), SourceType::for_data_type(*data_type)))
            .collect(),
    );
    for _ in 0..count {
        source.push(
            fields
                .iter()
                .map(|(_, data_type)| generate_value(&mut rng, *data_type))
                .collect(),
        );
    }
    source
}

fn filter_expression(field: &str, min: Option<f64>) -> Expression {
    match min {
        Some(min) => Expression::ge(Expression::field(field), Expression::literal(min)),
        None => Expression::is_not_null(Expression::field(field)),
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.schema {
        Some(path) => SchemaConfig::load(path)?,
        None => SchemaConfig::parse_fields(&args.fields).context("Invalid --fields")?,
    };
    let mut table = config.build_table(args.capacity)?;
    log::info!("created table with {}", table.schema());

    let mut source = generate_records(&table, args.rows, args.seed);
    let loaded = load_records(&mut table, &mut source, &DefaultFieldHandler::new(false))
        .context("Failed to load generated rows")?;
    log::info!("loaded {} rows", loaded);

    println!("{}", table.schema());
    for tuple in table.tuples() {
        println!("  {:>4}  {}", tuple.row(), tuple.bind(&table));
    }

    if let Some(field) = &args.filter_field {
        let expr = filter_expression(field, args.min);
        validate_filter_predicate(&expr, table.schema())
            .with_context(|| format!("Cannot filter with {}", expr))?;

        let stats = ExpressionStats::of(&expr);
        log::debug!(
            "filter {} has {} nodes, depth {}, fields {:?}",
            expr,
            stats.nodes,
            stats.max_depth,
            ColumnCollector::collect(&expr)
        );

        let predicate = Predicate::new(expr);
        let matches = table.select(&predicate);
        println!(
            "{} matched {} of {} rows",
            predicate.expression(),
            matches.len(),
            table.row_count()
        );
        for tuple in matches {
            println!("  {:>4}  {}", tuple.row(), tuple.bind(&table));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibetable::loader::RecordSource;

    #[test]
    fn test_generated_rows_load() {
        let config = SchemaConfig::parse_fields("a:int,b:date,c:object,d:float").unwrap();
        let mut table = config.build_table(None).unwrap();
        let mut source = generate_records(&table, 25, 7);
        let loaded =
            load_records(&mut table, &mut source, &DefaultFieldHandler::new(false)).unwrap();
        assert_eq!(loaded, 25);
        assert_eq!(table.row_count(), 25);
        for row in table.rows() {
            let a = table.get_int(row, "a").unwrap();
            assert!((0..100).contains(&a));
        }
    }

    #[test]
    fn test_same_seed_same_rows() {
        let config = SchemaConfig::parse_fields("name:string,n:long").unwrap();
        let table = config.build_table(None).unwrap();
        let mut a = generate_records(&table, 5, 1);
        let mut b = generate_records(&table, 5, 1);
        while a.advance().unwrap() {
            assert!(b.advance().unwrap());
            assert_eq!(a.value(0), b.value(0));
            assert_eq!(a.value(1), b.value(1));
        }
    }

    #[test]
    fn test_filter_expression() {
        assert_eq!(filter_expression("age", Some(30.0)).to_string(), "(age >= 30)");
        assert_eq!(filter_expression("age", None).to_string(), "(age IS NOT NULL)");
    }
}
