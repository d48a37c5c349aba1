//! SQL dialect hooks.
//!
//! The translator emits portable SQL with JDBC escape functions; a dialect
//! only decides how identifiers are quoted and how constructs the generic
//! output can't express (TRIM of arbitrary characters) are rendered.

use crate::ast::TrimSpec;
use crate::error::{Result, TranslationError};
use crate::metadata::DbEntity;

/// Opening and closing text wrapped around a TRIM operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimTemplate {
    pub open: String,
    pub close: String,
}

pub trait Dialect {
    fn quote_ident(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn qualify_table(&self, table: &DbEntity) -> String {
        match &table.schema {
            Some(schema) => format!("{}.{}", self.quote_ident(schema), self.quote_ident(&table.name)),
            None => self.quote_ident(&table.name),
        }
    }

    /// Renders TRIM. The portable form only strips spaces.
    fn trim(&self, spec: Option<TrimSpec>, character: Option<&str>) -> Result<TrimTemplate> {
        if let Some(c) = character {
            if c != " " {
                return Err(TranslationError::Unsupported(format!(
                    "TRIM character other than space is not supported by a generic dialect: '{c}'"
                )));
            }
        }
        Ok(jdbc_trim(spec))
    }
}

pub(crate) fn jdbc_trim(spec: Option<TrimSpec>) -> TrimTemplate {
    let (open, close) = match spec {
        Some(TrimSpec::Leading) => (" {fn LTRIM(", ")}"),
        Some(TrimSpec::Trailing) => (" {fn RTRIM(", ")}"),
        Some(TrimSpec::Both) | None => (" {fn LTRIM({fn RTRIM(", ")})}"),
    };
    TrimTemplate {
        open: open.to_string(),
        close: close.to_string(),
    }
}

/// Unquoted identifiers, JDBC escapes only.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl Dialect for GenericDialect {}

mod postgres;
pub use postgres::PostgresDialect;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_trim_rejects_other_characters() {
        let err = GenericDialect
            .trim(Some(TrimSpec::Leading), Some("x"))
            .unwrap_err();
        assert!(matches!(err, TranslationError::Unsupported(_)));
    }

    #[test]
    fn generic_trim_accepts_space() {
        let template = GenericDialect.trim(None, Some(" ")).unwrap();
        assert_eq!(template.open, " {fn LTRIM({fn RTRIM(");
        assert_eq!(template.close, ")})}");
    }
}
