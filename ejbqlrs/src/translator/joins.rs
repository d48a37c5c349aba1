//! Emits FROM-clause tables and joins.

use crate::ast::JoinKind;
use crate::error::{Result, TranslationError};

use super::context::TranslationContext;
use super::scope::{Hop, TableId};

impl JoinKind {
    fn sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
        }
    }
}

/// Follows `hop` from `source`, reusing an earlier join of the same pair or
/// appending a new one at the tail of `root`'s joins.
pub(crate) fn resolve_join(
    ctx: &mut TranslationContext<'_>,
    root: &TableId,
    source: &TableId,
    hop: Hop,
    kind: JoinKind,
) -> Result<TableId> {
    let candidate = source.child(hop.clone());
    if let Some(existing) = ctx.register_reusable_join(source, &hop, candidate.clone()) {
        return Ok(existing);
    }
    let marker = TranslationContext::join_tail_marker(root);
    append_join(ctx, Some(&marker), kind, source, &candidate)?;
    Ok(candidate)
}

pub(crate) fn append_inner_join(
    ctx: &mut TranslationContext<'_>,
    marker: Option<&str>,
    lhs: &TableId,
    rhs: &TableId,
) -> Result<()> {
    append_join(ctx, marker, JoinKind::Inner, lhs, rhs)
}

pub(crate) fn append_outer_join(
    ctx: &mut TranslationContext<'_>,
    marker: Option<&str>,
    lhs: &TableId,
    rhs: &TableId,
) -> Result<()> {
    append_join(ctx, marker, JoinKind::LeftOuter, lhs, rhs)
}

/// Writes the join from `lhs` to `rhs`, one SQL join per table hop for
/// flattened relationships. With a marker the text goes there (created if
/// missing), otherwise to the current position.
pub(crate) fn append_join(
    ctx: &mut TranslationContext<'_>,
    marker: Option<&str>,
    kind: JoinKind,
    lhs: &TableId,
    rhs: &TableId,
) -> Result<()> {
    if !ctx.is_using_aliases() {
        return Err(TranslationError::Unsupported(format!(
            "join to {rhs} in a statement without table aliases"
        )));
    }
    let hops = ctx.incoming_hops(rhs)?;
    let Some(last) = hops.len().checked_sub(1) else {
        return Err(TranslationError::Internal(format!("no relationship leads to {rhs}")));
    };

    if let Some(marker) = marker {
        ctx.push_marker(marker, true)?;
    }

    let dialect = ctx.dialect();
    let mut source_id = lhs.clone();
    let mut source_alias = ctx.table_alias(&lhs.id_path(), hops[0].source);
    for (i, hop) in hops.iter().enumerate() {
        // intermediate tables of a flattened relationship hang off lhs and
        // are shared with other paths through the same table relationship
        let target_id = if i == last {
            rhs.clone()
        } else {
            let hop_id = Hop::Db(hop.relationship.name.clone());
            let target_id = source_id.child(hop_id.clone());
            if let Some(existing) = ctx.register_reusable_join(&source_id, &hop_id, target_id.clone()) {
                source_alias = ctx.table_alias(&existing.id_path(), hop.target);
                source_id = existing;
                continue;
            }
            target_id
        };
        let target_alias = ctx.table_alias(&target_id.id_path(), hop.target);
        tracing::trace!(
            kind = kind.sql(),
            source = %source_alias,
            target = %target_alias,
            relationship = %hop.relationship.name,
            "appending join"
        );

        ctx.append(format!(
            " {} {} {} ON (",
            kind.sql(),
            dialect.qualify_table(hop.target),
            target_alias
        ));
        for (j, join) in hop.relationship.joins.iter().enumerate() {
            if j > 0 {
                ctx.append(" AND ");
            }
            ctx.append(format!(
                "{}.{} = {}.{}",
                source_alias,
                dialect.quote_ident(&join.source),
                target_alias,
                dialect.quote_ident(&join.target)
            ));
        }
        ctx.append(")");

        source_id = target_id;
        source_alias = target_alias;
    }

    if marker.is_some() {
        ctx.pop_marker()?;
    }
    Ok(())
}

/// Writes a root table with its alias. For entities in an inheritance
/// hierarchy the discriminator restriction goes to the entity qualifier
/// marker and the WHERE keyword to the where marker.
pub(crate) fn append_table(ctx: &mut TranslationContext<'_>, id: &TableId) -> Result<String> {
    let (entity, table) = ctx.resolve_table(id)?;
    let alias = ctx.table_alias(&id.id_path(), table);
    let table_sql = ctx.dialect().qualify_table(table);
    if ctx.is_using_aliases() {
        ctx.append(format!(" {table_sql} {alias}"));
    } else {
        ctx.append(format!(" {table_sql}"));
    }

    let Some(entity) = entity else {
        return Ok(alias);
    };
    let Some((column, values)) = ctx.catalog().qualifier_values(entity) else {
        return Ok(alias);
    };
    let jdbc_type = table
        .attribute(&column)
        .map(|a| a.jdbc_type)
        .ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "qualifier column {column} of entity {} is not in table {}",
                entity.name, table.name
            ))
        })?;

    let qualifier_marker = ctx.entity_qualifier_marker();
    ctx.push_marker(&qualifier_marker, true)?;
    if !ctx.is_marker_empty(&qualifier_marker) {
        ctx.append(" AND");
    }
    ctx.append(" (");
    let column_sql = format!("{alias}.{}", ctx.dialect().quote_ident(&column));
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            ctx.append(" OR");
        }
        let name = ctx.bind_parameter(value);
        ctx.append(format!(" {column_sql} = {}", bind_directive(&name, Some(jdbc_type.sql_name()))));
    }
    ctx.append(")");
    ctx.pop_marker()?;

    let where_marker = ctx.where_marker();
    ctx.push_marker(&where_marker, true)?;
    if ctx.is_marker_empty(&where_marker) {
        ctx.append(" WHERE");
    }
    ctx.pop_marker()?;
    Ok(alias)
}

/// `#bind($name)`, or `#bind($name 'TYPE')` with an explicit SQL type.
pub(crate) fn bind_directive(name: &str, sql_type: Option<&str>) -> String {
    match sql_type {
        Some(sql_type) => format!("#bind(${name} '{sql_type}')"),
        None => format!("#bind(${name})"),
    }
}
