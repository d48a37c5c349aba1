//! Result-set description: how select-list columns map back to entities and
//! scalars.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One declared item of the statement's result, in select-list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSegment {
    /// An entity result. `columns` maps data-row keys (column names, or
    /// `path.COLUMN` for prefetched columns) to column labels; unmapped keys
    /// get generated labels.
    Entity {
        #[serde(default)]
        entity: Option<String>,
        #[serde(default)]
        columns: HashMap<String, String>,
    },
    /// A scalar result read from the given column label.
    Scalar { column: String },
}

/// A column of the generated select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Position of the result segment the column belongs to.
    pub segment: usize,
    /// SQL expression selected, e.g. `t0.ARTIST_NAME`.
    pub expression: String,
    pub java_type: String,
    pub jdbc_type: i32,
    pub column_alias: String,
    pub data_row_key: String,
}

impl ResultColumn {
    /// The `#result(...)` directive wrapping the column in the SQL text.
    pub fn directive(&self) -> String {
        format!(
            " #result('{}' '{}' '{}' '{}' {})",
            self.expression, self.java_type, self.column_alias, self.data_row_key, self.jdbc_type
        )
    }
}

/// Label source for the columns of one entity result.
#[derive(Debug)]
pub(crate) struct EntityResult {
    pub segment: usize,
    index: usize,
    labels: HashMap<String, String>,
    next_column: usize,
}

impl EntityResult {
    pub fn new(segment: usize, index: usize, labels: HashMap<String, String>) -> Self {
        Self {
            segment,
            index,
            labels,
            next_column: 0,
        }
    }

    pub fn column_alias(&mut self, data_row_key: &str) -> String {
        let position = self.next_column;
        self.next_column += 1;
        self.labels
            .get(data_row_key)
            .cloned()
            .unwrap_or_else(|| format!("ec{}_{}", self.index, position))
    }
}
