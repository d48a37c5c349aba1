//! Shared fixtures: the art gallery mapping under `tests/fixtures/mapping`
//! and small AST builders.

#![allow(dead_code)]

use std::collections::HashMap;

use serde_json::Value;

use ejbql::ast::{
    ComparisonOp, DeleteStatement, Expr, FromItem, JoinDeclaration, JoinKind, Path,
    SelectExpression, SelectStatement, Statement,
};
use ejbql::catalog::MetadataCatalog;
use ejbql::config::TranslatorConfig;
use ejbql::{SqlTranslator, TranslatedQuery, TranslationRequest};

pub fn mapping_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mapping")
}

pub fn catalog() -> MetadataCatalog {
    MetadataCatalog::load_from_dir(mapping_dir()).expect("fixture mapping loads")
}

/// Translator that leaves select-list columns unannotated, which keeps
/// expected SQL short.
pub fn plain_translator() -> SqlTranslator {
    let mut config = TranslatorConfig::default();
    config.translation.annotate_result_columns = false;
    SqlTranslator::with_config(config)
}

pub fn translate(statement: Statement) -> TranslatedQuery {
    translate_with(&plain_translator(), statement, &TranslationRequest::default())
}

pub fn translate_with(
    translator: &SqlTranslator,
    statement: Statement,
    request: &TranslationRequest,
) -> TranslatedQuery {
    translator
        .translate(&catalog(), &statement, request)
        .expect("statement translates")
}

pub fn named(params: &[(&str, Value)]) -> TranslationRequest {
    TranslationRequest {
        named_parameters: params
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect::<HashMap<_, _>>(),
        ..Default::default()
    }
}

pub fn path(id: &str, components: &[&str]) -> Expr {
    Expr::Path(Path::new(id, components))
}

pub fn param(name: &str) -> Expr {
    Expr::NamedParameter(name.to_string())
}

pub fn string(text: &str) -> Expr {
    Expr::StringLiteral(text.to_string())
}

pub fn integer(value: i64) -> Expr {
    Expr::IntegerLiteral {
        text: value.abs().to_string(),
        negative: value < 0,
    }
}

pub fn compare(op: ComparisonOp, left: Expr, right: Expr) -> Expr {
    Expr::Comparison {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    compare(ComparisonOp::Equals, left, right)
}

pub fn from(entity: &str, id: &str) -> FromItem {
    FromItem {
        entity: entity.to_string(),
        id: id.to_string(),
        joins: Vec::new(),
    }
}

pub fn join(kind: JoinKind, path: Path, id: Option<&str>, fetch: bool) -> JoinDeclaration {
    JoinDeclaration {
        kind,
        fetch,
        path,
        id: id.map(str::to_string),
    }
}

/// `SELECT id FROM Entity id [WHERE ...]`
pub fn select_entity(entity: &str, id: &str, where_clause: Option<Expr>) -> SelectStatement {
    SelectStatement {
        select: vec![SelectExpression::IdentificationVariable(id.to_string())],
        from: vec![from(entity, id)],
        where_clause,
        ..Default::default()
    }
}

pub fn delete(entity: &str, id: &str, where_clause: Option<Expr>) -> Statement {
    Statement::Delete(DeleteStatement {
        entity: entity.to_string(),
        id: id.to_string(),
        where_clause,
    })
}

pub const ARTIST_COLUMNS: &str = "SELECT t0.ARTIST_NAME, t0.DATE_OF_BIRTH, t0.ARTIST_ID FROM ARTIST t0";
