//! Path resolution: walks `id.rel.rel.prop` (object layer) or
//! `id.dbrel.COLUMN` (table layer), joining intermediate tables as it goes
//! and handing the terminal to a [`PathHandler`].

use serde_json::{Map, Value};

use crate::ast::{JoinKind, Path};
use crate::error::{Result, TranslationError};
use crate::metadata::{DbAttribute, DbEntity, DbJoin, ObjAttribute, ObjEntity, ObjRelationship};
use crate::types::JdbcType;

use super::context::TranslationContext;
use super::joins::{self, bind_directive};
use super::scope::{Hop, TableId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum OperandValue {
    Column(String),
    Parameter(String),
}

/// A value spanning several columns, keyed by the target's key column
/// names: either a composite foreign key of a path or an object id bound as
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MultiColumnOperand {
    values: Vec<(String, OperandValue)>,
}

impl MultiColumnOperand {
    pub fn columns(columns: Vec<(String, String)>) -> Self {
        Self {
            values: columns
                .into_iter()
                .map(|(key, column)| (key, OperandValue::Column(column)))
                .collect(),
        }
    }

    /// Binds every entry of an id snapshot as its own parameter.
    pub fn object(ctx: &mut TranslationContext<'_>, id: &Map<String, Value>) -> Self {
        Self {
            values: id
                .iter()
                .map(|(key, value)| {
                    let name = ctx.bind_parameter(value.clone());
                    (key.clone(), OperandValue::Parameter(name))
                })
                .collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// SQL for the value of one key.
    pub fn value_sql(&self, key: &str) -> Result<String> {
        let value = self
            .values
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
            .ok_or_else(|| {
                TranslationError::Unsupported(format!(
                    "multi-column operands don't match: no value for key {key}"
                ))
            })?;
        Ok(match value {
            OperandValue::Column(column) => column.clone(),
            OperandValue::Parameter(name) => bind_directive(name, None),
        })
    }
}

/// Receives the terminal of a walked path. The defaults write a plain
/// column reference.
pub(crate) trait PathHandler {
    /// Join kind for relationships in the middle of a path.
    fn intermediate_join(&self) -> JoinKind {
        JoinKind::Inner
    }

    fn terminating_attribute<'a>(
        &mut self,
        ctx: &mut TranslationContext<'a>,
        walker: &PathWalker<'a>,
        attribute: &'a ObjAttribute,
    ) -> Result<()> {
        let (alias, column) = walker.attribute_column(ctx, attribute)?;
        let quoted = ctx.dialect().quote_ident(&column.name);
        ctx.append(format!(" {alias}.{quoted}"));
        Ok(())
    }

    fn terminating_relationship<'a>(
        &mut self,
        ctx: &mut TranslationContext<'a>,
        walker: &PathWalker<'a>,
        relationship: &'a ObjRelationship,
    ) -> Result<()> {
        append_relationship_key(self, ctx, walker, relationship)
    }

    /// Terminal column of a table-layer path.
    fn terminating_column(
        &mut self,
        ctx: &mut TranslationContext<'_>,
        alias: &str,
        column: &DbAttribute,
    ) -> Result<()> {
        let quoted = ctx.dialect().quote_ident(&column.name);
        ctx.append(format!(" {alias}.{quoted}"));
        Ok(())
    }

    fn multi_column(&mut self, ctx: &mut TranslationContext<'_>, operand: MultiColumnOperand) -> Result<()>;
}

/// Position of a path walk: the table occurrence reached so far.
#[derive(Debug, Clone)]
pub(crate) struct PathWalker<'a> {
    root: TableId,
    id: TableId,
    entity: Option<&'a ObjEntity>,
    table: &'a DbEntity,
}

impl<'a> PathWalker<'a> {
    pub fn start(ctx: &TranslationContext<'a>, id: &str) -> Result<Self> {
        let entity = ctx.entity_for_id(id)?;
        let root = ctx.variable_id(id)?;
        Ok(Self {
            root: root.clone(),
            id: root,
            entity: Some(entity),
            table: ctx.catalog().table_for(entity)?,
        })
    }

    /// A walk positioned at a table occurrence joined below `root`.
    pub fn at(ctx: &TranslationContext<'a>, root: TableId, id: TableId) -> Result<Self> {
        let (entity, table) = ctx.resolve_table(&id)?;
        Ok(Self {
            root,
            id,
            entity,
            table,
        })
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn root(&self) -> &TableId {
        &self.root
    }

    pub fn table(&self) -> &'a DbEntity {
        self.table
    }

    pub fn entity(&self) -> Result<&'a ObjEntity> {
        self.entity.ok_or_else(|| {
            TranslationError::Internal(format!("{} is a table-layer position", self.id))
        })
    }

    pub fn alias(&self, ctx: &mut TranslationContext<'a>) -> String {
        ctx.table_alias(&self.id.id_path(), self.table)
    }

    fn follow_object(&mut self, ctx: &mut TranslationContext<'a>, name: &str, kind: JoinKind) -> Result<()> {
        let catalog = ctx.catalog();
        let entity = self.entity()?;
        let relationship = catalog.relationship(entity, name).ok_or_else(|| {
            if catalog.attribute(entity, name).is_some() {
                TranslationError::InvalidAst(format!(
                    "attribute {name} of {} can't be navigated further",
                    entity.name
                ))
            } else {
                TranslationError::UnmappedReference(format!(
                    "unknown relationship {name} of entity {}",
                    entity.name
                ))
            }
        })?;
        let target = catalog.relationship_target(relationship)?;
        self.id = joins::resolve_join(ctx, &self.root, &self.id, Hop::Object(name.to_string()), kind)?;
        self.entity = Some(target);
        self.table = catalog.table_for(target)?;
        Ok(())
    }

    fn follow_db(&mut self, ctx: &mut TranslationContext<'a>, name: &str, kind: JoinKind) -> Result<()> {
        let relationship = self.table.relationship(name).ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "unknown table relationship {name} on {}",
                self.table.name
            ))
        })?;
        let target = ctx.catalog().require_table(&relationship.target)?;
        self.id = joins::resolve_join(ctx, &self.root, &self.id, Hop::Db(name.to_string()), kind)?;
        self.entity = None;
        self.table = target;
        Ok(())
    }

    /// Alias and column of an attribute of the current entity. Tables of a
    /// flattened attribute are outer-joined.
    pub fn attribute_column(
        &self,
        ctx: &mut TranslationContext<'a>,
        attribute: &'a ObjAttribute,
    ) -> Result<(String, &'a DbAttribute)> {
        let entity = self.entity()?;
        let (hops, column) = ctx.catalog().attribute_column(entity, attribute)?;
        let mut id = self.id.clone();
        for hop in &hops {
            id = joins::resolve_join(
                ctx,
                &self.root,
                &id,
                Hop::Db(hop.relationship.name.clone()),
                JoinKind::LeftOuter,
            )?;
        }
        let table = hops.last().map(|hop| hop.target).unwrap_or(self.table);
        Ok((ctx.table_alias(&id.id_path(), table), column))
    }
}

/// Walks an object-layer path.
pub(crate) fn walk_path<H: PathHandler + ?Sized>(
    ctx: &mut TranslationContext<'_>,
    path: &Path,
    handler: &mut H,
) -> Result<()> {
    let mut walker = PathWalker::start(ctx, &path.id)?;
    let Some((terminal, intermediate)) = path.components.split_last() else {
        return Err(TranslationError::InvalidAst(format!(
            "path {} has no components",
            path.id
        )));
    };
    for name in intermediate {
        walker.follow_object(ctx, name, handler.intermediate_join())?;
    }

    let catalog = ctx.catalog();
    let entity = walker.entity()?;
    if let Some(attribute) = catalog.attribute(entity, terminal) {
        handler.terminating_attribute(ctx, &walker, attribute)
    } else if let Some(relationship) = catalog.relationship(entity, terminal) {
        handler.terminating_relationship(ctx, &walker, relationship)
    } else {
        Err(TranslationError::UnmappedReference(format!(
            "entity {} has no property {terminal} (in {})",
            entity.name,
            path.absolute()
        )))
    }
}

/// Walks a table-layer path.
pub(crate) fn walk_db_path<H: PathHandler + ?Sized>(
    ctx: &mut TranslationContext<'_>,
    path: &Path,
    handler: &mut H,
) -> Result<()> {
    let mut walker = PathWalker::start(ctx, &path.id)?;
    let Some((terminal, intermediate)) = path.components.split_last() else {
        return Err(TranslationError::InvalidAst(format!(
            "db path {} has no components",
            path.id
        )));
    };
    for name in intermediate {
        walker.follow_db(ctx, name, handler.intermediate_join())?;
    }

    let table = walker.table();
    if let Some(column) = table.attribute(terminal) {
        let alias = walker.alias(ctx);
        return handler.terminating_column(ctx, &alias, column);
    }
    let relationship = table.relationship(terminal).ok_or_else(|| {
        TranslationError::UnmappedReference(format!(
            "table {} has no column or relationship {terminal} (in db:{})",
            table.name,
            path.absolute()
        ))
    })?;
    if relationship.to_many {
        let target = ctx.catalog().require_table(&relationship.target)?;
        let target_id = joins::resolve_join(
            ctx,
            walker.root(),
            walker.id(),
            Hop::Db(terminal.clone()),
            JoinKind::LeftOuter,
        )?;
        append_single_key(ctx, &target_id, target)
    } else {
        let alias = walker.alias(ctx);
        append_source_columns(handler, ctx, &alias, &relationship.joins)
    }
}

/// Default terminal for an object relationship: the target key of a to-many
/// (outer-joined), or the foreign key columns of a to-one.
pub(crate) fn append_relationship_key<'a, H: PathHandler + ?Sized>(
    handler: &mut H,
    ctx: &mut TranslationContext<'a>,
    walker: &PathWalker<'a>,
    relationship: &'a ObjRelationship,
) -> Result<()> {
    let catalog = ctx.catalog();
    let entity = walker.entity()?;
    let hops = catalog.relationship_hops(entity, relationship)?;
    let Some((last, intermediate)) = hops.split_last() else {
        return Err(TranslationError::Internal(format!(
            "relationship {} maps to no table relationship",
            relationship.name
        )));
    };

    if hops.iter().any(|hop| hop.relationship.to_many) {
        let target_id = joins::resolve_join(
            ctx,
            walker.root(),
            walker.id(),
            Hop::Object(relationship.name.clone()),
            JoinKind::LeftOuter,
        )?;
        return append_single_key(ctx, &target_id, last.target);
    }

    let mut id = walker.id().clone();
    for hop in intermediate {
        id = joins::resolve_join(
            ctx,
            walker.root(),
            &id,
            Hop::Db(hop.relationship.name.clone()),
            JoinKind::LeftOuter,
        )?;
    }
    let alias = ctx.table_alias(&id.id_path(), last.source);
    append_source_columns(handler, ctx, &alias, &last.relationship.joins)
}

fn append_single_key(ctx: &mut TranslationContext<'_>, id: &TableId, table: &DbEntity) -> Result<()> {
    let keys = table.primary_keys();
    let [key] = keys.as_slice() else {
        return Err(TranslationError::Unsupported(format!(
            "to-many match against {} requires a single-column primary key, found {}",
            table.name,
            keys.len()
        )));
    };
    let alias = ctx.table_alias(&id.id_path(), table);
    let quoted = ctx.dialect().quote_ident(&key.name);
    ctx.append(format!(" {alias}.{quoted}"));
    Ok(())
}

fn append_source_columns<H: PathHandler + ?Sized>(
    handler: &mut H,
    ctx: &mut TranslationContext<'_>,
    alias: &str,
    pairs: &[DbJoin],
) -> Result<()> {
    let dialect = ctx.dialect();
    match pairs {
        [join] => {
            ctx.append(format!(" {alias}.{}", dialect.quote_ident(&join.source)));
            Ok(())
        }
        _ => {
            let operand = MultiColumnOperand::columns(
                pairs
                    .iter()
                    .map(|join| {
                        (
                            join.target.clone(),
                            format!("{alias}.{}", dialect.quote_ident(&join.source)),
                        )
                    })
                    .collect(),
            );
            handler.multi_column(ctx, operand)
        }
    }
}

/// What a path ends in, resolved from metadata alone.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PathTerminal<'a> {
    Attribute(&'a ObjEntity, &'a ObjAttribute),
    ToOne(&'a ObjEntity, &'a ObjRelationship),
    ToMany(&'a ObjEntity, &'a ObjRelationship),
}

pub(crate) fn path_terminal<'a>(ctx: &TranslationContext<'a>, path: &Path) -> Result<PathTerminal<'a>> {
    let catalog = ctx.catalog();
    let mut entity = ctx.entity_for_id(&path.id)?;
    let Some((terminal, intermediate)) = path.components.split_last() else {
        return Err(TranslationError::InvalidAst(format!(
            "path {} has no components",
            path.id
        )));
    };
    for name in intermediate {
        let relationship = catalog.relationship(entity, name).ok_or_else(|| {
            TranslationError::UnmappedReference(format!(
                "unknown relationship {name} of entity {}",
                entity.name
            ))
        })?;
        entity = catalog.relationship_target(relationship)?;
    }
    if let Some(attribute) = catalog.attribute(entity, terminal) {
        return Ok(PathTerminal::Attribute(entity, attribute));
    }
    let relationship = catalog.relationship(entity, terminal).ok_or_else(|| {
        TranslationError::UnmappedReference(format!(
            "entity {} has no property {terminal} (in {})",
            entity.name,
            path.absolute()
        ))
    })?;
    if catalog.is_to_many(entity, relationship)? {
        Ok(PathTerminal::ToMany(entity, relationship))
    } else {
        Ok(PathTerminal::ToOne(entity, relationship))
    }
}

/// JDBC type of the attribute an object path ends in, if it ends in one.
pub(crate) fn path_type(ctx: &TranslationContext<'_>, path: &Path) -> Result<Option<JdbcType>> {
    match path_terminal(ctx, path)? {
        PathTerminal::Attribute(entity, attribute) => {
            if let Some(jdbc_type) = JdbcType::from_java_type(&attribute.java_type) {
                return Ok(Some(jdbc_type));
            }
            let (_, column) = ctx.catalog().attribute_column(entity, attribute)?;
            Ok(Some(column.jdbc_type))
        }
        _ => Ok(None),
    }
}

/// JDBC type of the column a table-layer path ends in.
pub(crate) fn db_path_type(ctx: &TranslationContext<'_>, path: &Path) -> Result<Option<JdbcType>> {
    let catalog = ctx.catalog();
    let entity = ctx.entity_for_id(&path.id)?;
    let mut table = catalog.table_for(entity)?;
    let Some((terminal, intermediate)) = path.components.split_last() else {
        return Ok(None);
    };
    if !intermediate.is_empty() {
        let hops = catalog.db_relationship_chain(table, &intermediate.join("."))?;
        if let Some(hop) = hops.last() {
            table = hop.target;
        }
    }
    Ok(table.attribute(terminal).map(|column| column.jdbc_type))
}
