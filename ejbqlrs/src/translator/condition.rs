//! WHERE / HAVING expressions and every scalar expression below them.

use serde_json::{Number, Value};

use crate::ast::{ArithmeticOp, ComparisonOp, Expr, Function, Path, SelectStatement};
use crate::error::{Result, TranslationError};

use super::aggregate;
use super::context::TranslationContext;
use super::joins::bind_directive;
use super::path::{self, MultiColumnOperand, PathHandler, PathTerminal};
use super::scope::Hop;
use super::select;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    /// Higher means looser binding.
    fn priority(self) -> u8 {
        match self {
            Connective::And => 1,
            Connective::Or => 2,
        }
    }

    fn of(expr: &Expr) -> Option<Connective> {
        match expr {
            Expr::And(_) => Some(Connective::And),
            Expr::Or(_) => Some(Connective::Or),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Connective::And => " AND",
            Connective::Or => " OR",
        }
    }
}

impl ComparisonOp {
    fn sql(self) -> &'static str {
        match self {
            ComparisonOp::Equals => " =",
            ComparisonOp::NotEquals => " <>",
            ComparisonOp::GreaterThan => " >",
            ComparisonOp::GreaterOrEqual => " >=",
            ComparisonOp::LessThan => " <",
            ComparisonOp::LessOrEqual => " <=",
        }
    }
}

impl ArithmeticOp {
    fn sql(self) -> &'static str {
        match self {
            ArithmeticOp::Add => " +",
            ArithmeticOp::Subtract => " -",
            ArithmeticOp::Multiply => " *",
            ArithmeticOp::Divide => " /",
        }
    }
}

/// Translates conditions and scalar expressions into the current output
/// position. Composite values met on the way are collected as
/// multi-column operands and expanded by the enclosing comparison.
#[derive(Debug, Default)]
pub(crate) struct ConditionTranslator {
    operands: Vec<MultiColumnOperand>,
}

impl PathHandler for ConditionTranslator {
    fn multi_column(&mut self, _ctx: &mut TranslationContext<'_>, operand: MultiColumnOperand) -> Result<()> {
        self.operands.push(operand);
        Ok(())
    }
}

impl ConditionTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, ctx: &mut TranslationContext<'_>, expr: &Expr) -> Result<()> {
        self.expression(ctx, expr, None)?;
        self.ensure_no_operands()
    }

    fn ensure_no_operands(&mut self) -> Result<()> {
        if self.operands.is_empty() {
            return Ok(());
        }
        self.operands.clear();
        Err(TranslationError::Unsupported(
            "multi-column value outside of an equality comparison or null check".to_string(),
        ))
    }

    fn expression(&mut self, ctx: &mut TranslationContext<'_>, expr: &Expr, hint: Option<&str>) -> Result<()> {
        match expr {
            Expr::And(children) => self.connective(ctx, Connective::And, children),
            Expr::Or(children) => self.connective(ctx, Connective::Or, children),
            Expr::Not(inner) => {
                ctx.append(" NOT");
                if Connective::of(inner).is_some() {
                    ctx.append(" (");
                    self.expression(ctx, inner, None)?;
                    ctx.append(")");
                    Ok(())
                } else {
                    self.expression(ctx, inner, None)
                }
            }
            Expr::Comparison { op, left, right } => self.comparison(ctx, *op, left, right),
            Expr::Between {
                negated,
                expr,
                lower,
                upper,
            } => {
                let hint = operand_type(ctx, &[expr.as_ref(), lower.as_ref(), upper.as_ref()]);
                self.expression(ctx, expr, hint)?;
                if *negated {
                    ctx.append(" NOT");
                }
                ctx.append(" BETWEEN");
                self.expression(ctx, lower, hint)?;
                ctx.append(" AND");
                self.expression(ctx, upper, hint)?;
                self.ensure_no_operands()
            }
            Expr::In {
                negated,
                expr,
                items,
            } => self.in_list(ctx, *negated, expr, items),
            Expr::Like {
                negated,
                ignore_case,
                expr,
                pattern,
                escape,
            } => self.like(ctx, *negated, *ignore_case, expr, pattern, *escape),
            Expr::IsNull { negated, expr } => self.null_check(ctx, expr, *negated),
            Expr::IsEmpty { negated, path } => self.is_empty(ctx, *negated, path),
            Expr::MemberOf { negated, operands } => self.member_of(ctx, *negated, operands),
            Expr::Size(operands) => {
                let path = single_path_operand("SIZE", operands)?;
                ctx.append(" (SELECT COUNT(1) FROM");
                self.correlated_subquery(ctx, path)?;
                ctx.append(")");
                Ok(())
            }
            Expr::Exists { negated, subselect } => {
                if *negated {
                    ctx.append(" NOT");
                }
                ctx.append(" EXISTS");
                self.subselect(ctx, subselect)
            }
            Expr::All(subselect) => {
                ctx.append(" ALL");
                self.subselect(ctx, subselect)
            }
            Expr::Any(subselect) => {
                ctx.append(" ANY");
                self.subselect(ctx, subselect)
            }
            Expr::Subselect(subselect) => self.subselect(ctx, subselect),
            Expr::Arithmetic { op, left, right } => {
                let hint = operand_type(ctx, &[left.as_ref(), right.as_ref()]);
                ctx.append(" (");
                self.expression(ctx, left, hint)?;
                ctx.append(op.sql());
                self.expression(ctx, right, hint)?;
                ctx.append(")");
                Ok(())
            }
            Expr::Path(path) => path::walk_path(ctx, path, self),
            Expr::DbPath(path) => path::walk_db_path(ctx, path, self),
            Expr::IdentificationVariable(id) => self.identification_variable(ctx, id),
            Expr::NamedParameter(name) => {
                let bound = ctx.bind_named_parameter(name);
                self.parameter(ctx, &bound, hint)
            }
            Expr::PositionalParameter(position) => {
                let bound = ctx.bind_positional_parameter(*position);
                self.parameter(ctx, &bound, hint)
            }
            Expr::StringLiteral(text) => {
                literal(ctx, Value::String(text.clone()), "VARCHAR");
                Ok(())
            }
            Expr::IntegerLiteral { text, negative } => {
                let signed = if *negative { format!("-{}", text.trim()) } else { text.trim().to_string() };
                let value: i64 = signed.parse().map_err(|_| {
                    TranslationError::MalformedLiteral(format!("invalid integer literal {signed}"))
                })?;
                literal(ctx, Value::from(value), "INTEGER");
                Ok(())
            }
            Expr::DecimalLiteral { text, negative } => {
                let signed = if *negative { format!("-{}", text.trim()) } else { text.trim().to_string() };
                let value = signed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| {
                        TranslationError::MalformedLiteral(format!("invalid decimal literal {signed}"))
                    })?;
                literal(ctx, Value::Number(value), "DECIMAL");
                Ok(())
            }
            Expr::BooleanLiteral(value) => {
                literal(ctx, Value::Bool(*value), "BOOLEAN");
                Ok(())
            }
            Expr::Function(function) => self.function(ctx, function),
            Expr::Aggregate(aggregate) => aggregate::translate_aggregate(ctx, aggregate),
        }
    }

    fn connective(&mut self, ctx: &mut TranslationContext<'_>, connective: Connective, children: &[Expr]) -> Result<()> {
        if children.is_empty() {
            return Err(TranslationError::InvalidAst(format!(
                "{} without operands",
                connective.sql().trim()
            )));
        }
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                ctx.append(connective.sql());
            }
            let bracket = Connective::of(child)
                .map(|inner| inner.priority() > connective.priority())
                .unwrap_or(false);
            if bracket {
                ctx.append(" (");
            }
            self.expression(ctx, child, None)?;
            if bracket {
                ctx.append(")");
            }
        }
        Ok(())
    }

    fn comparison(&mut self, ctx: &mut TranslationContext<'_>, op: ComparisonOp, left: &Expr, right: &Expr) -> Result<()> {
        let equality = matches!(op, ComparisonOp::Equals | ComparisonOp::NotEquals);
        // only a null parameter on the right is rewritten
        if equality && is_null_parameter(ctx, right) {
            return self.null_check(ctx, left, op == ComparisonOp::NotEquals);
        }

        let hint = operand_type(ctx, &[left, right]);
        let start = self.operands.len();
        self.expression(ctx, left, hint)?;
        ctx.append(op.sql());
        self.expression(ctx, right, hint)?;

        let collected: Vec<MultiColumnOperand> = self.operands.drain(start..).collect();
        match collected.as_slice() {
            [] => Ok(()),
            [lhs, rhs] => {
                if !equality {
                    return Err(TranslationError::Unsupported(format!(
                        "operator{} can't compare multi-column values",
                        op.sql()
                    )));
                }
                ctx.trim(1)?;
                expand_multi_column(ctx, op, lhs, rhs)
            }
            other => Err(TranslationError::Unsupported(format!(
                "multi-column comparison needs two multi-column operands, got {}",
                other.len()
            ))),
        }
    }

    /// `expr IS [NOT] NULL`, one check per column for multi-column values.
    fn null_check(&mut self, ctx: &mut TranslationContext<'_>, expr: &Expr, negated: bool) -> Result<()> {
        let suffix = if negated { " IS NOT NULL" } else { " IS NULL" };
        let start = self.operands.len();
        self.expression(ctx, expr, None)?;
        let collected: Vec<MultiColumnOperand> = self.operands.drain(start..).collect();
        match collected.as_slice() {
            [] => {
                ctx.append(suffix);
                Ok(())
            }
            [operand] => {
                let joiner = if negated { " OR" } else { " AND" };
                ctx.append(" (");
                for (i, key) in operand.keys().enumerate() {
                    if i > 0 {
                        ctx.append(joiner);
                    }
                    let value = operand.value_sql(key)?;
                    ctx.append(format!(" {value}{suffix}"));
                }
                ctx.append(")");
                Ok(())
            }
            _ => Err(TranslationError::Unsupported(
                "null check over several multi-column values".to_string(),
            )),
        }
    }

    fn in_list(&mut self, ctx: &mut TranslationContext<'_>, negated: bool, expr: &Expr, items: &[Expr]) -> Result<()> {
        let mut typed: Vec<&Expr> = vec![expr];
        typed.extend(items.iter());
        let hint = operand_type(ctx, &typed);

        self.expression(ctx, expr, hint)?;
        if negated {
            ctx.append(" NOT");
        }
        ctx.append(" IN");
        match items {
            [Expr::Subselect(subselect)] => self.subselect(ctx, subselect)?,
            [] => {
                return Err(TranslationError::InvalidAst(
                    "IN requires a value list or a subselect".to_string(),
                ))
            }
            items => {
                if let Some(bad) = items.iter().find(|item| is_condition(item) || matches!(item, Expr::Subselect(_))) {
                    return Err(TranslationError::InvalidAst(format!(
                        "unexpected IN list item {bad:?}"
                    )));
                }
                ctx.append(" (");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        ctx.append(",");
                    }
                    self.in_item(ctx, item, hint)?;
                }
                ctx.append(")");
            }
        }
        self.ensure_no_operands()
    }

    /// A collection parameter in an IN list expands to one binding per
    /// element.
    fn in_item(&mut self, ctx: &mut TranslationContext<'_>, item: &Expr, hint: Option<&str>) -> Result<()> {
        let collection = match item {
            Expr::NamedParameter(name) => ctx.named_parameter(name),
            Expr::PositionalParameter(position) => ctx.positional_parameter(*position),
            _ => None,
        };
        let Some(Value::Array(values)) = collection else {
            return self.expression(ctx, item, hint);
        };
        if values.is_empty() {
            return Err(TranslationError::InvalidAst(format!(
                "IN list parameter {item:?} is an empty collection"
            )));
        }
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                ctx.append(",");
            }
            let bound = ctx.bind_parameter(value.clone());
            self.parameter(ctx, &bound, hint)?;
        }
        Ok(())
    }

    fn like(
        &mut self,
        ctx: &mut TranslationContext<'_>,
        negated: bool,
        ignore_case: bool,
        expr: &Expr,
        pattern: &Expr,
        escape: Option<char>,
    ) -> Result<()> {
        if is_null_parameter(ctx, pattern) {
            return self.null_check(ctx, expr, negated);
        }
        let upper = ignore_case && !ctx.is_case_insensitive();
        let hint = operand_type(ctx, &[expr]);

        if upper {
            ctx.append(" UPPER(");
        }
        self.expression(ctx, expr, None)?;
        if upper {
            ctx.append(")");
        }
        if negated {
            ctx.append(" NOT");
        }
        ctx.append(" LIKE");
        if upper {
            ctx.append(" UPPER(");
        }
        self.expression(ctx, pattern, hint.or(Some("VARCHAR")))?;
        if upper {
            ctx.append(")");
        }
        if let Some(escape) = escape {
            let escaped = if escape == '\'' { "''".to_string() } else { escape.to_string() };
            ctx.append(format!(" ESCAPE '{escaped}'"));
        }
        self.ensure_no_operands()
    }

    fn is_empty(&mut self, ctx: &mut TranslationContext<'_>, negated: bool, path: &Path) -> Result<()> {
        if !matches!(path::path_terminal(ctx, path)?, PathTerminal::ToMany(..)) {
            return Err(TranslationError::InvalidAst(format!(
                "IS EMPTY requires a collection-valued path, got {}",
                path.absolute()
            )));
        }
        if negated {
            let marker = ctx.distinct_marker();
            ctx.push_marker(&marker, true)?;
            if ctx.is_marker_empty(&marker) {
                ctx.append(" DISTINCT");
            }
            ctx.pop_marker()?;
        }
        path::walk_path(ctx, path, self)?;
        ctx.append(if negated { " IS NOT NULL" } else { " IS NULL" });
        Ok(())
    }

    fn member_of(&mut self, ctx: &mut TranslationContext<'_>, negated: bool, operands: &[Expr]) -> Result<()> {
        let [member, collection] = operands else {
            return Err(TranslationError::InvalidAst(format!(
                "MEMBER OF expects 2 operands, got {}",
                operands.len()
            )));
        };
        let Expr::Path(path) = collection else {
            return Err(TranslationError::InvalidAst(
                "MEMBER OF requires a collection-valued path on the right".to_string(),
            ));
        };
        if negated {
            ctx.append(" NOT");
        }
        ctx.append(" EXISTS (SELECT 1 FROM");
        let subquery_id = self.correlated_subquery(ctx, path)?;
        ctx.append(" AND");
        let identity = Expr::Comparison {
            op: ComparisonOp::Equals,
            left: Box::new(Expr::IdentificationVariable(subquery_id)),
            right: Box::new(member.clone()),
        };
        self.expression(ctx, &identity, None)?;
        ctx.append(")");
        Ok(())
    }

    /// Writes ` TARGET alias [JOIN ...] WHERE <correlation>` for a
    /// relationship of an outer identification variable, and returns the
    /// variable naming the target inside the subquery.
    fn correlated_subquery(&mut self, ctx: &mut TranslationContext<'_>, path: &Path) -> Result<String> {
        let [name] = path.components.as_slice() else {
            return Err(TranslationError::Unsupported(format!(
                "collection subquery over multi-step path {}",
                path.absolute()
            )));
        };
        let catalog = ctx.catalog();
        let dialect = ctx.dialect();
        let entity = ctx.entity_for_id(&path.id)?;
        let relationship = catalog.relationship(entity, name).ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "unknown relationship {name} of entity {}",
                entity.name
            ))
        })?;
        let target = catalog.relationship_target(relationship)?;
        let hops = catalog.relationship_hops(entity, relationship)?;
        let Some((first, _)) = hops.split_first() else {
            return Err(TranslationError::Internal(format!(
                "relationship {name} maps to no table relationship"
            )));
        };

        let outer = ctx.variable_id(&path.id)?;
        let outer_alias = ctx.table_alias(&outer.id_path(), first.source);
        let subquery_id = ctx.create_id_alias(&target.name, outer.child(Hop::Object(name.clone())))?;
        let target_table = catalog.table_for(target)?;
        let subquery_root = ctx.variable_id(&subquery_id)?;
        let target_alias = ctx.table_alias(&subquery_root.id_path(), target_table);
        ctx.append(format!(" {} {target_alias}", dialect.qualify_table(target_table)));

        // flattened: join back from the target towards the outer table
        let mut near_alias = target_alias;
        for i in (1..hops.len()).rev() {
            let hop = &hops[i];
            let source_alias = ctx.table_alias(&format!("{subquery_id}.{i}"), hop.source);
            ctx.append(format!(
                " JOIN {} {source_alias} ON (",
                dialect.qualify_table(hop.source)
            ));
            for (j, join) in hop.relationship.joins.iter().enumerate() {
                if j > 0 {
                    ctx.append(" AND ");
                }
                ctx.append(format!(
                    "{near_alias}.{} = {source_alias}.{}",
                    dialect.quote_ident(&join.target),
                    dialect.quote_ident(&join.source)
                ));
            }
            ctx.append(")");
            near_alias = source_alias;
        }

        ctx.append(" WHERE");
        for (i, join) in first.relationship.joins.iter().enumerate() {
            if i > 0 {
                ctx.append(" AND");
            }
            ctx.append(format!(
                " {near_alias}.{} = {outer_alias}.{}",
                dialect.quote_ident(&join.target),
                dialect.quote_ident(&join.source)
            ));
        }
        Ok(subquery_id)
    }

    fn subselect(&mut self, ctx: &mut TranslationContext<'_>, subselect: &SelectStatement) -> Result<()> {
        ctx.append(" (");
        select::translate_subselect(ctx, subselect)?;
        ctx.append(")");
        Ok(())
    }

    fn identification_variable(&mut self, ctx: &mut TranslationContext<'_>, id: &str) -> Result<()> {
        let entity = ctx.entity_for_id(id)?;
        let table = ctx.catalog().table_for(entity)?;
        let root = ctx.variable_id(id)?;
        let alias = ctx.table_alias(&root.id_path(), table);
        let dialect = ctx.dialect();
        match table.primary_keys().as_slice() {
            [] => Err(TranslationError::Unsupported(format!(
                "entity {} has no primary key",
                entity.name
            ))),
            [key] => {
                ctx.append(format!(" {alias}.{}", dialect.quote_ident(&key.name)));
                Ok(())
            }
            keys => {
                let operand = MultiColumnOperand::columns(
                    keys.iter()
                        .map(|key| (key.name.clone(), format!("{alias}.{}", dialect.quote_ident(&key.name))))
                        .collect(),
                );
                self.operands.push(operand);
                Ok(())
            }
        }
    }

    /// Writes a bound parameter. Id snapshots with one entry are rebound
    /// to that value; larger ones become multi-column operands. Null
    /// values carry an explicit SQL type.
    fn parameter(&mut self, ctx: &mut TranslationContext<'_>, bound: &str, hint: Option<&str>) -> Result<()> {
        match ctx.bound_parameter(bound).cloned() {
            Some(Value::Object(id)) => match id.len() {
                0 => Err(TranslationError::InvalidAst(format!(
                    "parameter {bound} is an empty object id"
                ))),
                1 => {
                    let value = id.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null);
                    ctx.rebind_parameter(bound, value)?;
                    self.parameter(ctx, bound, hint)
                }
                _ => {
                    let operand = MultiColumnOperand::object(ctx, &id);
                    self.operands.push(operand);
                    Ok(())
                }
            },
            Some(Value::Null) | None => {
                let sql_type = hint.unwrap_or(ctx.config().default_parameter_type.as_str()).to_string();
                ctx.append(format!(" {}", bind_directive(bound, Some(&sql_type))));
                Ok(())
            }
            Some(_) => {
                ctx.append(format!(" {}", bind_directive(bound, None)));
                Ok(())
            }
        }
    }

    fn function(&mut self, ctx: &mut TranslationContext<'_>, function: &Function) -> Result<()> {
        match function {
            Function::Abs(arg) => self.jdbc_function(ctx, "ABS", std::slice::from_ref(arg.as_ref())),
            Function::Sqrt(arg) => self.jdbc_function(ctx, "SQRT", std::slice::from_ref(arg.as_ref())),
            Function::Mod(a, b) => self.jdbc_function(ctx, "MOD", &[a.as_ref().clone(), b.as_ref().clone()]),
            Function::Concat(args) => {
                check_arity("CONCAT", args, 2, usize::MAX)?;
                self.jdbc_function(ctx, "CONCAT", args)
            }
            Function::Substring(args) => {
                check_arity("SUBSTRING", args, 2, 3)?;
                self.jdbc_function(ctx, "SUBSTRING", args)
            }
            Function::Lower(arg) => self.jdbc_function(ctx, "LCASE", std::slice::from_ref(arg.as_ref())),
            Function::Upper(arg) => self.jdbc_function(ctx, "UCASE", std::slice::from_ref(arg.as_ref())),
            Function::Length(arg) => self.jdbc_function(ctx, "LENGTH", std::slice::from_ref(arg.as_ref())),
            Function::Locate(args) => {
                check_arity("LOCATE", args, 2, 3)?;
                self.jdbc_function(ctx, "LOCATE", args)
            }
            Function::Trim { spec, character, expr } => {
                let template = ctx.dialect().trim(*spec, character.as_deref())?;
                ctx.append(template.open);
                self.expression(ctx, expr, None)?;
                ctx.append(template.close);
                Ok(())
            }
            Function::CurrentDate => {
                ctx.append(" {fn CURDATE()}");
                Ok(())
            }
            Function::CurrentTime => {
                ctx.append(" {fn CURTIME()}");
                Ok(())
            }
            Function::CurrentTimestamp => {
                ctx.append(" {fn NOW()}");
                Ok(())
            }
        }
    }

    fn jdbc_function(&mut self, ctx: &mut TranslationContext<'_>, name: &str, args: &[Expr]) -> Result<()> {
        ctx.append(format!(" {{fn {name}("));
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                ctx.append(",");
            }
            self.expression(ctx, arg, None)?;
        }
        ctx.append(")}");
        Ok(())
    }
}

fn literal(ctx: &mut TranslationContext<'_>, value: Value, sql_type: &str) {
    let bound = ctx.bind_parameter(value);
    ctx.append(format!(" {}", bind_directive(&bound, Some(sql_type))));
}

fn expand_multi_column(
    ctx: &mut TranslationContext<'_>,
    op: ComparisonOp,
    lhs: &MultiColumnOperand,
    rhs: &MultiColumnOperand,
) -> Result<()> {
    if lhs.len() != rhs.len() {
        return Err(TranslationError::Unsupported(format!(
            "multi-column operands differ in size: {} vs {}",
            lhs.len(),
            rhs.len()
        )));
    }
    let joiner = if op == ComparisonOp::NotEquals { " OR" } else { " AND" };
    // the per-column comparisons stay one bracketed operand of any
    // enclosing AND / OR
    ctx.append(" (");
    for (i, key) in lhs.keys().enumerate() {
        if i > 0 {
            ctx.append(joiner);
        }
        let left = lhs.value_sql(key)?;
        let right = rhs.value_sql(key)?;
        ctx.append(format!(" {left}{} {right}", op.sql()));
    }
    ctx.append(")");
    Ok(())
}

fn is_null_parameter(ctx: &TranslationContext<'_>, expr: &Expr) -> bool {
    let value = match expr {
        Expr::NamedParameter(name) => ctx.named_parameter(name),
        Expr::PositionalParameter(position) => ctx.positional_parameter(*position),
        _ => None,
    };
    matches!(value, Some(Value::Null))
}

/// SQL type of the first path among `operands` whose type is known, used
/// for null parameters compared against it.
fn operand_type(ctx: &TranslationContext<'_>, operands: &[&Expr]) -> Option<&'static str> {
    operands.iter().find_map(|operand| {
        let jdbc_type = match operand {
            Expr::Path(path) => path::path_type(ctx, path).ok().flatten(),
            Expr::DbPath(path) => path::db_path_type(ctx, path).ok().flatten(),
            _ => None,
        };
        jdbc_type.map(|t| t.sql_name())
    })
}

fn single_path_operand<'e>(function: &str, operands: &'e [Expr]) -> Result<&'e Path> {
    match operands {
        [Expr::Path(path)] => Ok(path),
        [_] => Err(TranslationError::InvalidAst(format!(
            "{function} requires a collection-valued path"
        ))),
        _ => Err(TranslationError::InvalidAst(format!(
            "{function} expects 1 operand, got {}",
            operands.len()
        ))),
    }
}

fn check_arity(function: &str, args: &[Expr], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(TranslationError::InvalidAst(format!(
            "{function} called with {} arguments",
            args.len()
        )));
    }
    Ok(())
}

fn is_condition(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::And(_)
            | Expr::Or(_)
            | Expr::Not(_)
            | Expr::Comparison { .. }
            | Expr::Between { .. }
            | Expr::In { .. }
            | Expr::Like { .. }
            | Expr::IsNull { .. }
            | Expr::IsEmpty { .. }
            | Expr::MemberOf { .. }
            | Expr::Exists { .. }
    )
}
