//! Example: translate a JSON-encoded statement against a mapping directory
//!
//! ```bash
//! RUST_LOG=ejbql=debug cargo run -p ejbql-core --example print_sql -- \
//!     tests/fixtures/mapping tests/fixtures/statements/artists_by_name.json
//! ```

use anyhow::Context;
use serde::Deserialize;

use ejbql::config::TranslatorConfig;
use ejbql::{load_and_validate, CatalogValidator, SqlTranslator, Statement, TranslationRequest};

#[derive(Deserialize)]
struct Input {
    statement: Statement,
    #[serde(default)]
    request: TranslationRequest,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("ejbql=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(mapping_dir), Some(statement_file)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: print_sql <mapping-dir> <statement.json>");
    };

    let catalog = load_and_validate(&mapping_dir, &CatalogValidator::new(true))
        .with_context(|| format!("loading mapping from {mapping_dir}"))?;
    let contents = std::fs::read_to_string(&statement_file)
        .with_context(|| format!("reading {statement_file}"))?;
    let input: Input = serde_json::from_str(&contents)?;

    let translator = SqlTranslator::with_config(TranslatorConfig::load_default());
    let query = translator.translate(&catalog, &input.statement, &input.request)?;

    println!("{}", query.sql);
    for (name, value) in &query.parameters {
        println!("  ${name} = {value}");
    }
    for column in &query.result_columns {
        println!(
            "  [{}] {} -> {} ({})",
            column.segment, column.expression, column.column_alias, column.java_type
        );
    }
    Ok(())
}
