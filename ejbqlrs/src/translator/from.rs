use crate::ast::{FromItem, JoinDeclaration, JoinKind};
use crate::error::{Result, TranslationError};

use super::context::TranslationContext;
use super::joins;
use super::scope::Hop;

/// Writes the FROM list. Each root table is followed by its explicit joins
/// and then by the joins other clauses discover for it.
pub(crate) fn translate_from(ctx: &mut TranslationContext<'_>, items: &[FromItem]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            ctx.append(",");
        }
        let root = ctx.variable_id(&item.id)?;
        joins::append_table(ctx, &root)?;
        for join in &item.joins {
            append_explicit_join(ctx, join)?;
        }
        ctx.mark_current_position(&TranslationContext::join_tail_marker(&root))?;
    }
    Ok(())
}

fn append_explicit_join(ctx: &mut TranslationContext<'_>, join: &JoinDeclaration) -> Result<()> {
    let Some((last, intermediate)) = join.path.components.split_last() else {
        return Err(TranslationError::InvalidAst(format!(
            "join path {} has no components",
            join.path.id
        )));
    };

    // intermediate hops are joined in place, ahead of the declared join
    let mut source = ctx.variable_id(&join.path.id)?;
    for name in intermediate {
        let hop = Hop::Object(name.clone());
        let candidate = source.child(hop.clone());
        source = match ctx.register_reusable_join(&source, &hop, candidate.clone()) {
            Some(existing) => existing,
            None => {
                joins::append_inner_join(ctx, None, &source, &candidate)?;
                candidate
            }
        };
    }

    let rhs = match &join.id {
        Some(id) => ctx.variable_id(id)?,
        None => source.child(Hop::Object(last.clone())),
    };
    match join.kind {
        JoinKind::Inner => joins::append_inner_join(ctx, None, &source, &rhs)?,
        JoinKind::LeftOuter => joins::append_outer_join(ctx, None, &source, &rhs)?,
    }
    ctx.mark_current_position(&TranslationContext::join_tail_marker(&rhs))
}
