use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use serde_json::Value;

use crate::error::{Result, TranslationError};
use crate::metadata::{DbAttribute, DbEntity, DbRelationship, ObjAttribute, ObjEntity, ObjRelationship};

/// One resolved step of a table-layer relationship path.
#[derive(Debug, Clone, Copy)]
pub struct DbHop<'a> {
    pub source: &'a DbEntity,
    pub relationship: &'a DbRelationship,
    pub target: &'a DbEntity,
}

/// Read-only mapping metadata consumed by the translator.
#[derive(Debug, Default, Clone)]
pub struct MetadataCatalog {
    pub db_entities: HashMap<String, DbEntity>,
    pub obj_entities: HashMap<String, ObjEntity>,
}

impl MetadataCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(db_entities: Vec<DbEntity>, obj_entities: Vec<ObjEntity>) -> Self {
        let mut catalog = MetadataCatalog::new();
        for table in db_entities {
            catalog.db_entities.insert(table.name.clone(), table);
        }
        for entity in obj_entities {
            catalog.obj_entities.insert(entity.name.clone(), entity);
        }
        catalog
    }

    /// Loads `tables/*.yml` and `entities/*.yml` below `root`.
    pub fn load_from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let mut catalog = MetadataCatalog::new();
        for path in yaml_files(root.as_ref().join("tables"))? {
            let contents = fs::read_to_string(&path)?;
            let table: DbEntity = serde_yaml::from_str(&contents)?;
            tracing::debug!(table = %table.name, path = %path.display(), "loaded table mapping");
            catalog.db_entities.insert(table.name.clone(), table);
        }
        for path in yaml_files(root.as_ref().join("entities"))? {
            let contents = fs::read_to_string(&path)?;
            let entity: ObjEntity = serde_yaml::from_str(&contents)?;
            tracing::debug!(entity = %entity.name, path = %path.display(), "loaded entity mapping");
            catalog.obj_entities.insert(entity.name.clone(), entity);
        }
        Ok(catalog)
    }

    pub fn obj_entity(&self, name: &str) -> Option<&ObjEntity> {
        self.obj_entities.get(name)
    }

    pub fn db_entity(&self, name: &str) -> Option<&DbEntity> {
        self.db_entities.get(name)
    }

    pub fn require_entity(&self, name: &str) -> Result<&ObjEntity> {
        self.obj_entity(name)
            .ok_or_else(|| TranslationError::UnmappedReference(format!("unknown entity {name}")))
    }

    pub fn require_table(&self, name: &str) -> Result<&DbEntity> {
        self.db_entity(name)
            .ok_or_else(|| TranslationError::UnmappedReference(format!("unknown table {name}")))
    }

    pub fn table_for(&self, entity: &ObjEntity) -> Result<&DbEntity> {
        self.db_entity(&entity.db_entity).ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "entity {} is mapped to unknown table {}",
                entity.name, entity.db_entity
            ))
        })
    }

    /// The entity followed by its super entities, nearest first.
    pub fn lineage<'a>(&'a self, entity: &'a ObjEntity) -> Vec<&'a ObjEntity> {
        let mut out = vec![entity];
        let mut seen: HashSet<&str> = HashSet::from([entity.name.as_str()]);
        let mut current = entity;
        while let Some(parent) = current
            .super_entity
            .as_deref()
            .and_then(|name| self.obj_entity(name))
        {
            if !seen.insert(parent.name.as_str()) {
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }

    /// All entities inheriting from `entity`, directly or not, sorted by name.
    pub fn descendants(&self, entity: &ObjEntity) -> Vec<&ObjEntity> {
        let mut out: Vec<&ObjEntity> = self
            .obj_entities
            .values()
            .filter(|candidate| {
                candidate.name != entity.name
                    && self
                        .lineage(candidate)
                        .iter()
                        .any(|ancestor| ancestor.name == entity.name)
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn attribute<'a>(&'a self, entity: &'a ObjEntity, name: &str) -> Option<&'a ObjAttribute> {
        self.lineage(entity)
            .into_iter()
            .find_map(|e| e.attributes.iter().find(|a| a.name == name))
    }

    pub fn relationship<'a>(
        &'a self,
        entity: &'a ObjEntity,
        name: &str,
    ) -> Option<&'a ObjRelationship> {
        self.lineage(entity)
            .into_iter()
            .find_map(|e| e.relationships.iter().find(|r| r.name == name))
    }

    pub fn relationship_target(&self, relationship: &ObjRelationship) -> Result<&ObjEntity> {
        self.require_entity(&relationship.target_entity)
    }

    /// Resolves a dotted chain of table relationships starting at `source`.
    pub fn db_relationship_chain<'a>(
        &'a self,
        source: &'a DbEntity,
        db_path: &str,
    ) -> Result<Vec<DbHop<'a>>> {
        let mut hops = Vec::new();
        let mut current = source;
        for name in db_path.split('.') {
            let relationship = current.relationship(name).ok_or_else(|| {
                TranslationError::UnmappedReference(format!(
                    "unknown table relationship {name} on {}",
                    current.name
                ))
            })?;
            let target = self.require_table(&relationship.target)?;
            hops.push(DbHop {
                source: current,
                relationship,
                target,
            });
            current = target;
        }
        Ok(hops)
    }

    /// The table relationships an object relationship is mapped to.
    pub fn relationship_hops<'a>(
        &'a self,
        entity: &'a ObjEntity,
        relationship: &'a ObjRelationship,
    ) -> Result<Vec<DbHop<'a>>> {
        let table = self.table_for(entity)?;
        self.db_relationship_chain(table, &relationship.db_path)
    }

    pub fn is_to_many(&self, entity: &ObjEntity, relationship: &ObjRelationship) -> Result<bool> {
        Ok(self
            .relationship_hops(entity, relationship)?
            .iter()
            .any(|hop| hop.relationship.to_many))
    }

    /// Resolves an attribute's column, along with the relationship hops of a
    /// flattened attribute.
    pub fn attribute_column<'a>(
        &'a self,
        entity: &'a ObjEntity,
        attribute: &'a ObjAttribute,
    ) -> Result<(Vec<DbHop<'a>>, &'a DbAttribute)> {
        let table = self.table_for(entity)?;
        let (hops, owner, column) = match attribute.db_path.rsplit_once('.') {
            Some((path, column)) => {
                let hops = self.db_relationship_chain(table, path)?;
                let owner = hops.last().map(|h| h.target).unwrap_or(table);
                (hops, owner, column)
            }
            None => (Vec::new(), table, attribute.db_path.as_str()),
        };
        let column = owner.attribute(column).ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "attribute {}.{} maps to unknown column {}.{}",
                entity.name, attribute.name, owner.name, column
            ))
        })?;
        Ok((hops, column))
    }

    /// Every persistent attribute of the hierarchy the entity belongs to:
    /// its own, inherited ones and those of its subclasses. First
    /// declaration of a name wins.
    pub fn hierarchy_attributes<'a>(&'a self, entity: &'a ObjEntity) -> Vec<(&'a ObjEntity, &'a ObjAttribute)> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        let mut owners = self.lineage(entity);
        owners.reverse();
        owners.extend(self.descendants(entity));
        for owner in owners {
            for attribute in &owner.attributes {
                if seen.insert(attribute.name.as_str()) {
                    out.push((owner, attribute));
                }
            }
        }
        out
    }

    /// Relationships of the entity's hierarchy, collected like
    /// [`Self::hierarchy_attributes`].
    pub fn hierarchy_relationships<'a>(
        &'a self,
        entity: &'a ObjEntity,
    ) -> Vec<(&'a ObjEntity, &'a ObjRelationship)> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();
        let mut owners = self.lineage(entity);
        owners.reverse();
        owners.extend(self.descendants(entity));
        for owner in owners {
            for relationship in &owner.relationships {
                if seen.insert(relationship.name.as_str()) {
                    out.push((owner, relationship));
                }
            }
        }
        out
    }

    /// Discriminator column of the hierarchy `entity` belongs to, taken from
    /// the nearest qualified ancestor or else from any qualified subclass.
    pub fn discriminator_column(&self, entity: &ObjEntity) -> Option<String> {
        self.lineage(entity)
            .into_iter()
            .chain(self.descendants(entity))
            .find_map(|member| member.qualifier.as_ref().map(|q| q.column.clone()))
    }

    /// Discriminator column and values selecting the entity and all of its
    /// subclasses. `None` means every row of the table matches: the entity
    /// or one of its subclasses has no qualifier of its own.
    pub fn qualifier_values<'a>(&'a self, entity: &'a ObjEntity) -> Option<(String, Vec<Value>)> {
        let own = entity.qualifier.as_ref()?;
        let mut values = vec![own.value.clone()];
        for descendant in self.descendants(entity) {
            let qualifier = descendant.qualifier.as_ref()?;
            values.push(qualifier.value.clone());
        }
        Some((own.column.clone(), values))
    }
}

fn yaml_files(dir: PathBuf) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(TranslationError::Catalog(format!(
            "mapping directory not found: {}",
            dir.display()
        )));
    }
    let mut files = Vec::new();
    for pattern in ["yml", "yaml"] {
        for entry in glob(&format!("{}/*.{pattern}", dir.display()))
            .map_err(|e| TranslationError::Other(e.into()))?
            .flatten()
        {
            files.push(entry);
        }
    }
    files.sort();
    Ok(files)
}
