use crate::ast::{Expr, FromItem, SelectStatement};
use crate::error::{Result, TranslationError};

use super::columns;
use super::condition::ConditionTranslator;
use super::context::TranslationContext;
use super::from;
use super::path::{self, PathTerminal};
use super::scope::Hop;
use super::PrefetchNode;

pub(crate) fn translate_select(ctx: &mut TranslationContext<'_>, statement: &SelectStatement) -> Result<()> {
    select(ctx, statement, true)
}

/// Writes `SELECT ...` of a nested query; the caller supplies parentheses.
pub(crate) fn translate_subselect(ctx: &mut TranslationContext<'_>, statement: &SelectStatement) -> Result<()> {
    select(ctx, statement, false)
}

fn select(ctx: &mut TranslationContext<'_>, statement: &SelectStatement, top_level: bool) -> Result<()> {
    ctx.begin_select();
    let written = select_body(ctx, statement, top_level);
    ctx.end_select();
    written
}

fn select_body(ctx: &mut TranslationContext<'_>, statement: &SelectStatement, top_level: bool) -> Result<()> {
    if statement.from.is_empty() {
        return Err(TranslationError::InvalidAst("SELECT without FROM".to_string()));
    }
    declare_from(ctx, &statement.from, top_level)?;

    ctx.append("SELECT");
    if statement.distinct {
        ctx.append(" DISTINCT");
    } else {
        let marker = ctx.distinct_marker();
        ctx.mark_current_position(&marker)?;
    }

    // select list first: its paths may add joins to the FROM clause
    let previous = ctx.is_appending_result_columns();
    ctx.set_appending_result_columns(top_level && ctx.config().annotate_result_columns);
    let listed = columns::translate_select_list(ctx, &statement.select);
    ctx.set_appending_result_columns(previous);
    listed?;

    ctx.append(" FROM");
    from::translate_from(ctx, &statement.from)?;
    where_clause(ctx, statement.where_clause.as_ref())?;

    if !statement.group_by.is_empty() {
        ctx.append(" GROUP BY");
        for (i, expr) in statement.group_by.iter().enumerate() {
            if i > 0 {
                ctx.append(",");
            }
            ConditionTranslator::new().translate(ctx, expr)?;
        }
    }
    if let Some(having) = &statement.having {
        ctx.append(" HAVING");
        ConditionTranslator::new().translate(ctx, having)?;
    }
    if !statement.order_by.is_empty() {
        ctx.append(" ORDER BY");
        for (i, item) in statement.order_by.iter().enumerate() {
            if i > 0 {
                ctx.append(",");
            }
            ConditionTranslator::new().translate(ctx, &item.expr)?;
            if item.descending {
                ctx.append(" DESC");
            }
        }
    }
    Ok(())
}

/// Declares the statement's identification variables and registers its
/// explicit joins as reusable before anything is written, so paths in the
/// select list resolve to them.
fn declare_from(ctx: &mut TranslationContext<'_>, items: &[FromItem], top_level: bool) -> Result<()> {
    for item in items {
        ctx.catalog().require_entity(&item.entity)?;
        ctx.declare_variable(&item.id, &item.entity, None)?;

        for join in &item.joins {
            let Some((last, intermediate)) = join.path.components.split_last() else {
                return Err(TranslationError::InvalidAst(format!(
                    "join path {} has no components",
                    join.path.id
                )));
            };
            let target_entity = match path::path_terminal(ctx, &join.path)? {
                PathTerminal::ToOne(_, relationship) | PathTerminal::ToMany(_, relationship) => {
                    relationship.target_entity.clone()
                }
                PathTerminal::Attribute(..) => {
                    return Err(TranslationError::InvalidAst(format!(
                        "join path {} doesn't end in a relationship",
                        join.path.absolute()
                    )))
                }
            };

            let mut source = ctx.variable_id(&join.path.id)?;
            for name in intermediate {
                let hop = Hop::Object(name.clone());
                source = ctx
                    .reusable_join(&source, &hop)
                    .cloned()
                    .unwrap_or_else(|| source.child(hop));
            }
            let hop = Hop::Object(last.clone());
            let path_id = source.child(hop.clone());
            let rhs = match &join.id {
                Some(id) => ctx.declare_variable(id, &target_entity, Some(path_id))?,
                None => path_id,
            };
            // a second join over the same path stays a separate occurrence
            let _ = ctx.register_reusable_join(&source, &hop, rhs);

            if join.fetch && top_level {
                ctx.add_prefetch(PrefetchNode {
                    entity_id: join.path.id.clone(),
                    path: join.path.relative(),
                });
            }
        }
    }
    Ok(())
}

/// Places the WHERE and entity-qualifier markers and writes the condition.
/// Inheritance qualifiers written by the FROM clause are ANDed with it.
pub(crate) fn where_clause(ctx: &mut TranslationContext<'_>, condition: Option<&Expr>) -> Result<()> {
    let where_marker = ctx.where_marker();
    let qualifier_marker = ctx.entity_qualifier_marker();
    ctx.mark_current_position(&where_marker)?;
    ctx.mark_current_position(&qualifier_marker)?;

    let Some(condition) = condition else {
        return Ok(());
    };
    let qualified = !ctx.is_marker_empty(&qualifier_marker);
    if ctx.is_marker_empty(&where_marker) {
        ctx.append(" WHERE");
    }
    if qualified {
        ctx.append(" AND (");
    }
    ConditionTranslator::new().translate(ctx, condition)?;
    if qualified {
        ctx.append(")");
    }
    Ok(())
}
