use crate::ast::DeleteStatement;
use crate::error::Result;

use super::context::TranslationContext;
use super::joins;
use super::select;

/// `DELETE FROM TABLE [WHERE ...]`. Columns are qualified with the table
/// name since DELETE takes no alias.
pub(crate) fn translate_delete(ctx: &mut TranslationContext<'_>, statement: &DeleteStatement) -> Result<()> {
    ctx.catalog().require_entity(&statement.entity)?;
    ctx.begin_select();
    ctx.set_using_aliases(false);
    let written = delete_body(ctx, statement);
    ctx.end_select();
    written
}

fn delete_body(ctx: &mut TranslationContext<'_>, statement: &DeleteStatement) -> Result<()> {
    let root = ctx.declare_variable(&statement.id, &statement.entity, None)?;
    ctx.append("DELETE FROM");
    joins::append_table(ctx, &root)?;
    select::where_clause(ctx, statement.where_clause.as_ref())
}
