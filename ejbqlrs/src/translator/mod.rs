//! EJBQL to SQL translation.
//!
//! [`SqlTranslator::translate`] walks a parsed statement against a
//! [`MetadataCatalog`] and produces SQL text with `#bind` / `#result`
//! template directives plus the parameter values those directives refer to.

mod aggregate;
mod columns;
mod condition;
mod context;
mod delete;
mod from;
mod joins;
mod path;
mod result;
mod scope;
mod select;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ast::Statement;
use crate::catalog::MetadataCatalog;
use crate::config::TranslatorConfig;
use crate::dialect::Dialect;
use crate::error::Result;

pub use result::{ResultColumn, ResultSegment};

use context::TranslationContext;

/// Relationship of an entity in the select list to fetch in the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchNode {
    /// Identification variable of the entity owning the relationship.
    pub entity_id: String,
    /// Dotted relationship path relative to that entity.
    pub path: String,
}

/// Per-query inputs besides the statement itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationRequest {
    /// `:name` parameter values. JSON objects are object id snapshots
    /// (column name to value), arrays are collections for IN lists.
    pub named_parameters: HashMap<String, Value>,
    /// `?n` parameter values keyed by position.
    pub positional_parameters: HashMap<usize, Value>,
    /// Declared shape of the result; labels are generated when absent.
    pub result_mapping: Option<Vec<ResultSegment>>,
    pub prefetch: Vec<PrefetchNode>,
}

/// Output of one translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedQuery {
    pub sql: String,
    /// Bound values in binding order, keyed by the names used in `#bind`.
    pub parameters: Vec<(String, Value)>,
    /// Annotated select-list columns, empty for DELETE.
    pub result_columns: Vec<ResultColumn>,
}

impl TranslatedQuery {
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

pub struct SqlTranslator {
    config: TranslatorConfig,
    dialect: Box<dyn Dialect>,
}

impl Default for SqlTranslator {
    fn default() -> Self {
        Self::with_config(TranslatorConfig::default())
    }
}

impl SqlTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TranslatorConfig) -> Self {
        let dialect = config.dialect.build();
        Self { config, dialect }
    }

    /// Replaces the dialect chosen by the configuration.
    pub fn with_dialect(mut self, dialect: Box<dyn Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn translate(
        &self,
        catalog: &MetadataCatalog,
        statement: &Statement,
        request: &TranslationRequest,
    ) -> Result<TranslatedQuery> {
        let mut ctx = TranslationContext::new(
            catalog,
            self.dialect.as_ref(),
            &self.config.translation,
            request,
        );
        let kind = match statement {
            Statement::Select(select) => {
                select::translate_select(&mut ctx, select)?;
                "select"
            }
            Statement::Delete(delete) => {
                delete::translate_delete(&mut ctx, delete)?;
                "delete"
            }
        };
        let (sql, parameters, result_columns) = ctx.into_parts();
        tracing::debug!(
            kind,
            parameters = parameters.len(),
            columns = result_columns.len(),
            sql = %sql,
            "translated statement"
        );
        Ok(TranslatedQuery {
            sql,
            parameters,
            result_columns,
        })
    }
}
