//! Mapping metadata: the object layer (entities, attributes, relationships)
//! and the table layer (tables, columns, foreign-key joins).

use serde::{de, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::JdbcType;

/// A physical table.
#[derive(Debug, Clone, Serialize)]
pub struct DbEntity {
    pub name: String,
    pub schema: Option<String>,
    pub attributes: Vec<DbAttribute>,
    pub relationships: Vec<DbRelationship>,
}

impl<'de> Deserialize<'de> for DbEntity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            name: String,
            #[serde(default)]
            schema: Option<String>,
            // Either mark attributes individually or name the key here
            #[serde(default)]
            primary_key: Option<String>,
            #[serde(default)]
            primary_keys: Option<Vec<String>>,
            #[serde(default)]
            attributes: Vec<DbAttribute>,
            #[serde(default)]
            relationships: Vec<DbRelationship>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let keys = match (raw.primary_keys, raw.primary_key) {
            (Some(keys), _) => keys,
            (None, Some(key)) => vec![key],
            (None, None) => Vec::new(),
        };

        let mut attributes = raw.attributes;
        for key in &keys {
            let attribute = attributes
                .iter_mut()
                .find(|a| &a.name == key)
                .ok_or_else(|| {
                    de::Error::custom(format!(
                        "primary key {key} is not an attribute of table {}",
                        raw.name
                    ))
                })?;
            attribute.primary_key = true;
        }

        Ok(DbEntity {
            name: raw.name,
            schema: raw.schema,
            attributes,
            relationships: raw.relationships,
        })
    }
}

impl DbEntity {
    pub fn attribute(&self, name: &str) -> Option<&DbAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&DbRelationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Primary key columns in declaration order.
    pub fn primary_keys(&self) -> Vec<&DbAttribute> {
        self.attributes.iter().filter(|a| a.primary_key).collect()
    }

    /// Table name qualified with the schema, if any.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub jdbc_type: JdbcType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub mandatory: bool,
}

/// A foreign-key style link between two tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbRelationship {
    pub name: String,
    pub target: String,
    pub joins: Vec<DbJoin>,
    #[serde(default)]
    pub to_many: bool,
}

/// One column pair of a relationship: `source` lives in the table owning
/// the relationship, `target` in the related table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbJoin {
    pub source: String,
    pub target: String,
}

/// A persistent object class mapped to a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjEntity {
    pub name: String,
    pub db_entity: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub super_entity: Option<String>,
    #[serde(default)]
    pub attributes: Vec<ObjAttribute>,
    #[serde(default)]
    pub relationships: Vec<ObjRelationship>,
    /// Discriminator for single-table inheritance.
    #[serde(default)]
    pub qualifier: Option<EntityQualifier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjAttribute {
    pub name: String,
    /// Column name, or a dotted path through table relationships ending in
    /// a column for flattened attributes.
    pub db_path: String,
    pub java_type: String,
}

impl<'de> Deserialize<'de> for ObjAttribute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            name: String,
            #[serde(default)]
            db_path: Option<String>,
            #[serde(default)]
            column: Option<String>,
            java_type: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        let db_path = match (raw.db_path, raw.column) {
            (Some(path), None) => path,
            (None, Some(column)) => column,
            (Some(_), Some(_)) => {
                return Err(de::Error::custom(format!(
                    "attribute {} must not specify both db_path and column",
                    raw.name
                )))
            }
            (None, None) => {
                return Err(de::Error::custom(format!(
                    "attribute {} requires db_path or column",
                    raw.name
                )))
            }
        };
        Ok(ObjAttribute {
            name: raw.name,
            db_path,
            java_type: raw.java_type,
        })
    }
}

impl ObjAttribute {
    /// Flattened attributes live in a related table.
    pub fn is_flattened(&self) -> bool {
        self.db_path.contains('.')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjRelationship {
    pub name: String,
    pub target_entity: String,
    /// One table relationship name, or a dotted chain of them.
    pub db_path: String,
}

impl ObjRelationship {
    pub fn is_flattened(&self) -> bool {
        self.db_path.contains('.')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityQualifier {
    pub column: String,
    pub value: Value,
}
