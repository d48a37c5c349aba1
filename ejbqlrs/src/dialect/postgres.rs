//! PostgreSQL dialect implementation.

use crate::ast::TrimSpec;
use crate::error::Result;

use super::{jdbc_trim, Dialect, TrimTemplate};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn trim(&self, spec: Option<TrimSpec>, character: Option<&str>) -> Result<TrimTemplate> {
        match character {
            Some(c) if c != " " => {
                let side = match spec {
                    Some(TrimSpec::Leading) => "LEADING",
                    Some(TrimSpec::Trailing) => "TRAILING",
                    Some(TrimSpec::Both) | None => "BOTH",
                };
                Ok(TrimTemplate {
                    open: format!(" TRIM({side} '{}' FROM", c.replace('\'', "''")),
                    close: ")".to_string(),
                })
            }
            _ => Ok(jdbc_trim(spec)),
        }
    }
}
