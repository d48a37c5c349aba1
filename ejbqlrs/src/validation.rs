use crate::catalog::MetadataCatalog;
use crate::error::{Result, TranslationError};
use crate::metadata::{DbEntity, ObjEntity};

/// Consistency checks over a loaded catalog: dangling names, unknown join
/// columns, tables without a primary key.
pub struct CatalogValidator {
    warn_only: bool,
}

impl Default for CatalogValidator {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CatalogValidator {
    pub fn new(warn_only: bool) -> Self {
        Self { warn_only }
    }

    pub fn validate(&self, catalog: &MetadataCatalog) -> Result<()> {
        let mut tables: Vec<&DbEntity> = catalog.db_entities.values().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        for table in tables {
            self.validate_table(table, catalog)?;
        }

        let mut entities: Vec<&ObjEntity> = catalog.obj_entities.values().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        for entity in entities {
            self.validate_entity(entity, catalog)?;
        }
        Ok(())
    }

    fn validate_table(&self, table: &DbEntity, catalog: &MetadataCatalog) -> Result<()> {
        self.check(
            !table.primary_keys().is_empty(),
            format!("table {} has no primary key", table.name),
        )?;

        for relationship in &table.relationships {
            let Some(target) = catalog.db_entity(&relationship.target) else {
                self.check(
                    false,
                    format!(
                        "relationship {}.{} targets unknown table {}",
                        table.name, relationship.name, relationship.target
                    ),
                )?;
                continue;
            };
            self.check(
                !relationship.joins.is_empty(),
                format!("relationship {}.{} has no join columns", table.name, relationship.name),
            )?;
            for join in &relationship.joins {
                self.check(
                    table.attribute(&join.source).is_some(),
                    format!(
                        "relationship {}.{} joins from unknown column {}",
                        table.name, relationship.name, join.source
                    ),
                )?;
                self.check(
                    target.attribute(&join.target).is_some(),
                    format!(
                        "relationship {}.{} joins to unknown column {}.{}",
                        table.name, relationship.name, target.name, join.target
                    ),
                )?;
            }
        }
        Ok(())
    }

    fn validate_entity(&self, entity: &ObjEntity, catalog: &MetadataCatalog) -> Result<()> {
        let Some(table) = catalog.db_entity(&entity.db_entity) else {
            return self.check(
                false,
                format!("entity {} maps to unknown table {}", entity.name, entity.db_entity),
            );
        };

        if let Some(parent) = &entity.super_entity {
            self.check(
                catalog.obj_entity(parent).is_some(),
                format!("entity {} extends unknown entity {parent}", entity.name),
            )?;
        }

        for attribute in &entity.attributes {
            if let Err(err) = catalog.attribute_column(entity, attribute) {
                self.check(false, format!("attribute {}.{}: {err}", entity.name, attribute.name))?;
            }
        }

        for relationship in &entity.relationships {
            self.check(
                catalog.obj_entity(&relationship.target_entity).is_some(),
                format!(
                    "relationship {}.{} targets unknown entity {}",
                    entity.name, relationship.name, relationship.target_entity
                ),
            )?;
            if let Err(err) = catalog.relationship_hops(entity, relationship) {
                self.check(false, format!("relationship {}.{}: {err}", entity.name, relationship.name))?;
            }
        }

        if let Some(qualifier) = &entity.qualifier {
            self.check(
                table.attribute(&qualifier.column).is_some(),
                format!(
                    "qualifier column {} of entity {} is not in table {}",
                    qualifier.column, entity.name, table.name
                ),
            )?;
        }
        Ok(())
    }

    fn check(&self, condition: bool, message: String) -> Result<()> {
        if condition {
            return Ok(());
        }
        if self.warn_only {
            tracing::warn!("{message}");
            Ok(())
        } else {
            Err(TranslationError::Catalog(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DbAttribute, DbJoin, DbRelationship, ObjRelationship};
    use crate::types::JdbcType;

    fn table(name: &str, columns: &[&str], relationships: Vec<DbRelationship>) -> DbEntity {
        DbEntity {
            name: name.to_string(),
            schema: None,
            attributes: columns
                .iter()
                .enumerate()
                .map(|(i, column)| DbAttribute {
                    name: column.to_string(),
                    jdbc_type: JdbcType::Integer,
                    primary_key: i == 0,
                    mandatory: i == 0,
                })
                .collect(),
            relationships,
        }
    }

    #[test]
    fn reports_unknown_join_column() {
        let artist = table(
            "ARTIST",
            &["ID"],
            vec![DbRelationship {
                name: "paintings".to_string(),
                target: "PAINTING".to_string(),
                joins: vec![DbJoin {
                    source: "ID".to_string(),
                    target: "OWNER_ID".to_string(),
                }],
                to_many: true,
            }],
        );
        let painting = table("PAINTING", &["ID", "ARTIST_ID"], vec![]);
        let catalog = MetadataCatalog::from_parts(vec![artist, painting], vec![]);

        let err = CatalogValidator::default().validate(&catalog).unwrap_err();
        assert!(matches!(err, TranslationError::Catalog(m) if m.contains("PAINTING.OWNER_ID")));
        assert!(CatalogValidator::new(true).validate(&catalog).is_ok());
    }

    #[test]
    fn reports_dangling_entity_relationship() {
        let artist = table("ARTIST", &["ID"], vec![]);
        let entity = ObjEntity {
            name: "Artist".to_string(),
            db_entity: "ARTIST".to_string(),
            class_name: None,
            super_entity: None,
            attributes: vec![],
            relationships: vec![ObjRelationship {
                name: "paintings".to_string(),
                target_entity: "Painting".to_string(),
                db_path: "paintings".to_string(),
            }],
            qualifier: None,
        };
        let catalog = MetadataCatalog::from_parts(vec![artist], vec![entity]);
        let err = CatalogValidator::default().validate(&catalog).unwrap_err();
        assert!(matches!(err, TranslationError::Catalog(m) if m.contains("unknown entity Painting")));
    }
}
