//! Select-list columns: whole entities, attribute paths, scalar expressions
//! and joint-prefetched relationships.

use crate::ast::{Expr, Function, JoinKind, SelectExpression};
use crate::error::{Result, TranslationError};
use crate::metadata::{DbAttribute, ObjAttribute, ObjEntity, ObjRelationship};
use crate::types::JdbcType;

use super::aggregate;
use super::condition::ConditionTranslator;
use super::context::TranslationContext;
use super::joins;
use super::path::{self, MultiColumnOperand, PathHandler, PathWalker};
use super::result::{EntityResult, ResultColumn};
use super::scope::{Hop, TableId};
use super::PrefetchNode;

pub(crate) fn translate_select_list(ctx: &mut TranslationContext<'_>, items: &[SelectExpression]) -> Result<()> {
    if items.is_empty() {
        return Err(TranslationError::InvalidAst("empty select list".to_string()));
    }
    for item in items {
        match item {
            SelectExpression::IdentificationVariable(id) => {
                let entity = ctx.entity_for_id(id)?;
                let root = ctx.variable_id(id)?;
                append_entity_columns(ctx, &root, &root, entity)?;
            }
            SelectExpression::Path(path) | SelectExpression::Scalar(Expr::Path(path)) => {
                path::walk_path(ctx, path, &mut SelectPath)?;
            }
            SelectExpression::Scalar(Expr::DbPath(path)) => {
                path::walk_db_path(ctx, path, &mut SelectPath)?;
            }
            SelectExpression::Aggregate(aggregate) | SelectExpression::Scalar(Expr::Aggregate(aggregate)) => {
                ctx.begin_select_item();
                aggregate::translate_aggregate(ctx, aggregate)?;
            }
            SelectExpression::Scalar(expr) => append_scalar_expression(ctx, expr)?,
        }
    }
    Ok(())
}

/// Select-list terminal of a path: attributes become scalar columns,
/// to-one relationships become entity results.
struct SelectPath;

impl PathHandler for SelectPath {
    fn terminating_attribute<'a>(
        &mut self,
        ctx: &mut TranslationContext<'a>,
        walker: &PathWalker<'a>,
        attribute: &'a ObjAttribute,
    ) -> Result<()> {
        let (alias, column) = walker.attribute_column(ctx, attribute)?;
        let expression = format!("{alias}.{}", ctx.dialect().quote_ident(&column.name));
        let jdbc_type = JdbcType::from_java_type(&attribute.java_type).unwrap_or(column.jdbc_type);
        append_scalar_column(ctx, expression, &attribute.java_type, jdbc_type)
    }

    fn terminating_relationship<'a>(
        &mut self,
        ctx: &mut TranslationContext<'a>,
        walker: &PathWalker<'a>,
        relationship: &'a ObjRelationship,
    ) -> Result<()> {
        let catalog = ctx.catalog();
        let entity = walker.entity()?;
        if catalog.is_to_many(entity, relationship)? {
            return Err(TranslationError::Unsupported(format!(
                "collection-valued path {}.{} in select list",
                walker.id(),
                relationship.name
            )));
        }
        let target = catalog.relationship_target(relationship)?;
        let target_id = joins::resolve_join(
            ctx,
            walker.root(),
            walker.id(),
            Hop::Object(relationship.name.clone()),
            JoinKind::Inner,
        )?;
        append_entity_columns(ctx, walker.root(), &target_id, target)
    }

    fn terminating_column(&mut self, ctx: &mut TranslationContext<'_>, alias: &str, column: &DbAttribute) -> Result<()> {
        let expression = format!("{alias}.{}", ctx.dialect().quote_ident(&column.name));
        append_scalar_column(ctx, expression, column.jdbc_type.default_java_type(), column.jdbc_type)
    }

    fn multi_column(&mut self, _ctx: &mut TranslationContext<'_>, _operand: MultiColumnOperand) -> Result<()> {
        Err(TranslationError::Internal(
            "multi-column value in select list".to_string(),
        ))
    }
}

fn append_scalar_column(
    ctx: &mut TranslationContext<'_>,
    expression: String,
    java_type: &str,
    jdbc_type: JdbcType,
) -> Result<()> {
    ctx.begin_select_item();
    if !ctx.is_appending_result_columns() {
        ctx.append(format!(" {expression}"));
        return Ok(());
    }
    let (segment, label) = ctx.next_scalar_result()?;
    let column = ResultColumn {
        segment,
        expression,
        java_type: java_type.to_string(),
        jdbc_type: jdbc_type.code(),
        column_alias: label.clone(),
        data_row_key: label,
    };
    ctx.append(column.directive());
    ctx.push_result_column(column);
    Ok(())
}

/// Any other scalar: rendered through the condition translator and typed
/// from its outermost function where possible.
fn append_scalar_expression(ctx: &mut TranslationContext<'_>, expr: &Expr) -> Result<()> {
    let scratch = ctx.scratch_marker();
    ctx.push_marker(&scratch, true)?;
    let written = ConditionTranslator::new().translate(ctx, expr);
    ctx.pop_marker()?;
    written?;

    let expression = ctx.marker_text(&scratch).trim_start().to_string();
    let jdbc_type = scalar_type(expr);
    append_scalar_column(ctx, expression, jdbc_type.default_java_type(), jdbc_type)
}

fn scalar_type(expr: &Expr) -> JdbcType {
    match expr {
        Expr::StringLiteral(_) => JdbcType::Varchar,
        Expr::IntegerLiteral { .. } => JdbcType::Integer,
        Expr::DecimalLiteral { .. } => JdbcType::Decimal,
        Expr::BooleanLiteral(_) => JdbcType::Boolean,
        Expr::Size(_) => JdbcType::BigInt,
        Expr::Function(function) => match function {
            Function::Length(_) | Function::Locate(_) | Function::Mod(..) => JdbcType::Integer,
            Function::Abs(_) | Function::Sqrt(_) => JdbcType::Double,
            Function::Concat(_)
            | Function::Substring(_)
            | Function::Lower(_)
            | Function::Upper(_)
            | Function::Trim { .. } => JdbcType::Varchar,
            Function::CurrentDate => JdbcType::Date,
            Function::CurrentTime => JdbcType::Time,
            Function::CurrentTimestamp => JdbcType::Timestamp,
        },
        _ => JdbcType::Other,
    }
}

/// Appends every column needed to build objects of `entity` from the table
/// occurrence `id`: mapped attributes of the whole hierarchy, primary key,
/// to-one foreign keys, discriminator, then joint-prefetched relationships.
/// Columns already selected are skipped.
fn append_entity_columns<'a>(
    ctx: &mut TranslationContext<'a>,
    root: &TableId,
    id: &TableId,
    entity: &'a ObjEntity,
) -> Result<()> {
    let catalog = ctx.catalog();
    let mut result = if ctx.is_appending_result_columns() {
        Some(ctx.next_entity_result()?)
    } else {
        None
    };
    let walker = PathWalker::at(ctx, root.clone(), id.clone())?;

    for (_, attribute) in catalog.hierarchy_attributes(entity) {
        let (alias, column) = walker.attribute_column(ctx, attribute)?;
        append_entity_column(ctx, &mut result, &alias, column, &attribute.java_type, &attribute.db_path)?;
    }

    let table = walker.table();
    let alias = walker.alias(ctx);
    for key in table.primary_keys() {
        append_entity_column(ctx, &mut result, &alias, key, key.jdbc_type.default_java_type(), &key.name)?;
    }

    for (owner, relationship) in catalog.hierarchy_relationships(entity) {
        let hops = catalog.relationship_hops(owner, relationship)?;
        let Some(first) = hops.first() else {
            continue;
        };
        if first.relationship.to_many {
            continue;
        }
        for join in &first.relationship.joins {
            if let Some(column) = table.attribute(&join.source) {
                append_entity_column(ctx, &mut result, &alias, column, column.jdbc_type.default_java_type(), &column.name)?;
            }
        }
    }

    if let Some(discriminator) = catalog.discriminator_column(entity) {
        if let Some(column) = table.attribute(&discriminator) {
            append_entity_column(ctx, &mut result, &alias, column, column.jdbc_type.default_java_type(), &column.name)?;
        }
    }

    if id.is_root() {
        let prefetch: Vec<PrefetchNode> = ctx
            .prefetch()
            .iter()
            .filter(|node| node.entity_id.eq_ignore_ascii_case(id.root_id()))
            .cloned()
            .collect();
        for node in prefetch {
            append_prefetch_columns(ctx, id, entity, &node, &mut result)?;
        }
    }
    Ok(())
}

fn append_entity_column(
    ctx: &mut TranslationContext<'_>,
    result: &mut Option<EntityResult>,
    alias: &str,
    column: &DbAttribute,
    java_type: &str,
    data_row_key: &str,
) -> Result<()> {
    let expression = format!("{alias}.{}", ctx.dialect().quote_ident(&column.name));
    if !ctx.claim_select_column(&expression) {
        return Ok(());
    }
    ctx.begin_select_item();
    match result {
        Some(result) => {
            let column = ResultColumn {
                segment: result.segment,
                column_alias: result.column_alias(data_row_key),
                expression,
                java_type: java_type.to_string(),
                jdbc_type: column.jdbc_type.code(),
                data_row_key: data_row_key.to_string(),
            };
            ctx.append(column.directive());
            ctx.push_result_column(column);
        }
        None => {
            ctx.append(format!(" {expression}"));
        }
    }
    Ok(())
}

/// Columns of a relationship target fetched along with the root entity.
/// The relationship is outer-joined unless the FROM clause joins it already.
fn append_prefetch_columns<'a>(
    ctx: &mut TranslationContext<'a>,
    root: &TableId,
    entity: &'a ObjEntity,
    node: &PrefetchNode,
    result: &mut Option<EntityResult>,
) -> Result<()> {
    let catalog = ctx.catalog();
    let mut id = root.clone();
    let mut current = entity;
    for name in node.path.split('.') {
        let relationship = catalog.relationship(current, name).ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "invalid joint prefetch {} for entity {}",
                node.path, entity.name
            ))
        })?;
        id = joins::resolve_join(ctx, root, &id, Hop::Object(name.to_string()), JoinKind::LeftOuter)?;
        current = catalog.relationship_target(relationship)?;
    }

    let table = catalog.table_for(current)?;
    let alias = ctx.table_alias(&id.id_path(), table);
    for column in &table.attributes {
        let data_row_key = format!("{}.{}", node.path, column.name);
        append_entity_column(ctx, result, &alias, column, column.jdbc_type.default_java_type(), &data_row_key)?;
    }
    Ok(())
}
