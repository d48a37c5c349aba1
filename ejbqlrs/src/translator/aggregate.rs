//! Aggregate functions, in the select list and in HAVING / ORDER BY.

use crate::ast::{Aggregate, AggregateFunction, Expr};
use crate::error::{Result, TranslationError};
use crate::metadata::{DbAttribute, ObjAttribute};
use crate::types::JdbcType;

use super::context::TranslationContext;
use super::path::{self, MultiColumnOperand, PathHandler, PathTerminal, PathWalker};
use super::result::ResultColumn;

/// Collects the type of the aggregated column while writing it.
#[derive(Debug, Default)]
struct AggregateArgument {
    java_type: Option<String>,
    jdbc_type: Option<JdbcType>,
}

impl PathHandler for AggregateArgument {
    fn terminating_attribute<'a>(
        &mut self,
        ctx: &mut TranslationContext<'a>,
        walker: &PathWalker<'a>,
        attribute: &'a ObjAttribute,
    ) -> Result<()> {
        let (alias, column) = walker.attribute_column(ctx, attribute)?;
        self.java_type = Some(attribute.java_type.clone());
        self.jdbc_type = Some(column.jdbc_type);
        let quoted = ctx.dialect().quote_ident(&column.name);
        ctx.append(format!(" {alias}.{quoted}"));
        Ok(())
    }

    fn terminating_column(&mut self, ctx: &mut TranslationContext<'_>, alias: &str, column: &DbAttribute) -> Result<()> {
        self.java_type = Some(column.jdbc_type.default_java_type().to_string());
        self.jdbc_type = Some(column.jdbc_type);
        let quoted = ctx.dialect().quote_ident(&column.name);
        ctx.append(format!(" {alias}.{quoted}"));
        Ok(())
    }

    fn multi_column(&mut self, _ctx: &mut TranslationContext<'_>, _operand: MultiColumnOperand) -> Result<()> {
        Err(TranslationError::Unsupported(
            "aggregate over a multi-column value".to_string(),
        ))
    }
}

/// Writes `FN([DISTINCT] arg)`; in a result-annotated select list the
/// expression is wrapped in a `#result` directive with the aggregate's type.
pub(crate) fn translate_aggregate(ctx: &mut TranslationContext<'_>, aggregate: &Aggregate) -> Result<()> {
    let scratch = ctx.scratch_marker();
    ctx.push_marker(&scratch, true)?;
    let mut argument = AggregateArgument::default();
    let written = write_argument(ctx, aggregate, &mut argument);
    ctx.pop_marker()?;
    written?;

    let inner = ctx.marker_text(&scratch);
    let expression = format!(
        "{}({}{})",
        aggregate.function.sql_name(),
        if aggregate.distinct { "DISTINCT " } else { "" },
        inner.trim_start()
    );

    if !ctx.is_appending_result_columns() {
        ctx.append(format!(" {expression}"));
        return Ok(());
    }

    let (java_type, jdbc_type) = match aggregate.function {
        AggregateFunction::Count => ("java.lang.Long".to_string(), JdbcType::BigInt),
        AggregateFunction::Avg => ("java.lang.Double".to_string(), JdbcType::Double),
        AggregateFunction::Max | AggregateFunction::Min | AggregateFunction::Sum => {
            let jdbc_type = argument
                .java_type
                .as_deref()
                .and_then(JdbcType::from_java_type)
                .or(argument.jdbc_type)
                .unwrap_or(JdbcType::Other);
            let java_type = argument
                .java_type
                .unwrap_or_else(|| jdbc_type.default_java_type().to_string());
            (java_type, jdbc_type)
        }
    };
    let (segment, label) = ctx.next_scalar_result()?;
    let column = ResultColumn {
        segment,
        expression,
        java_type,
        jdbc_type: jdbc_type.code(),
        column_alias: label.clone(),
        data_row_key: label,
    };
    ctx.append(column.directive());
    ctx.push_result_column(column);
    Ok(())
}

fn write_argument(
    ctx: &mut TranslationContext<'_>,
    aggregate: &Aggregate,
    argument: &mut AggregateArgument,
) -> Result<()> {
    let function = aggregate.function;
    match (function, aggregate.arg.as_ref()) {
        (AggregateFunction::Count, Expr::Path(path)) => path::walk_path(ctx, path, argument),
        (_, Expr::Path(path)) => {
            if !matches!(path::path_terminal(ctx, path)?, PathTerminal::Attribute(..)) {
                return Err(TranslationError::InvalidAst(format!(
                    "{} requires a path to an attribute, got {}",
                    function.sql_name(),
                    path.absolute()
                )));
            }
            path::walk_path(ctx, path, argument)
        }
        (_, Expr::DbPath(path)) => path::walk_db_path(ctx, path, argument),
        (AggregateFunction::Count, Expr::IdentificationVariable(id)) => count_key(ctx, id),
        (AggregateFunction::Count, Expr::IntegerLiteral { text, negative: false })
            if text.chars().all(|c| c.is_ascii_digit()) && !text.is_empty() =>
        {
            ctx.append(format!(" {text}"));
            Ok(())
        }
        (_, other) => Err(TranslationError::InvalidAst(format!(
            "unsupported {} argument {other:?}",
            function.sql_name()
        ))),
    }
}

/// COUNT over an entity counts its first mandatory key column, or its first
/// key column if none is marked mandatory.
fn count_key(ctx: &mut TranslationContext<'_>, id: &str) -> Result<()> {
    let entity = ctx.entity_for_id(id)?;
    let table = ctx.catalog().table_for(entity)?;
    let keys = table.primary_keys();
    let key = keys
        .iter()
        .find(|key| key.mandatory)
        .or_else(|| keys.first())
        .ok_or_else(|| {
            TranslationError::Unsupported(format!("entity {} has no primary key", entity.name))
        })?;
    let root = ctx.variable_id(id)?;
    let alias = ctx.table_alias(&root.id_path(), table);
    let quoted = ctx.dialect().quote_ident(&key.name);
    ctx.append(format!(" {alias}.{quoted}"));
    Ok(())
}
