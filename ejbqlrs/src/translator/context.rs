//! Mutable state of one translation: the output buffer with its named
//! insertion points, parameter bindings, table aliases and join bookkeeping.
//!
//! Output is a tree of slots. Text always goes to the active slot; a marker
//! is a slot that may be created before it has a position and placed later
//! with [`TranslationContext::mark_current_position`]. Slots that are never
//! placed do not render.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::catalog::{DbHop, MetadataCatalog};
use crate::config::TranslationConfig;
use crate::dialect::Dialect;
use crate::error::{Result, TranslationError};
use crate::metadata::{DbEntity, ObjEntity};

use super::result::{EntityResult, ResultColumn, ResultSegment};
use super::scope::{Hop, Scope, TableId};
use super::{PrefetchNode, TranslationRequest};

const ROOT_SLOT: usize = 0;

#[derive(Debug)]
enum Fragment {
    Text(String),
    Slot(usize),
}

#[derive(Debug, Default)]
struct Slot {
    fragments: Vec<Fragment>,
    placed: bool,
}

#[derive(Debug)]
struct SelectLevel {
    number: usize,
    columns: HashSet<String>,
    column_count: usize,
}

pub(crate) struct TranslationContext<'a> {
    catalog: &'a MetadataCatalog,
    dialect: &'a dyn Dialect,
    config: &'a TranslationConfig,
    request: &'a TranslationRequest,
    prefetch: Vec<PrefetchNode>,

    slots: Vec<Slot>,
    markers: HashMap<String, usize>,
    active: Vec<usize>,

    aliases: HashMap<String, String>,
    parameters: Vec<(String, Value)>,
    scope: Scope,
    reusable_joins: HashMap<(TableId, Hop), TableId>,
    id_alias_count: usize,
    scratch_count: usize,

    selects: Vec<SelectLevel>,
    select_count: usize,
    using_aliases: bool,
    appending_result_columns: bool,

    result_position: usize,
    entity_results: usize,
    scalar_results: usize,
    result_columns: Vec<ResultColumn>,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        catalog: &'a MetadataCatalog,
        dialect: &'a dyn Dialect,
        config: &'a TranslationConfig,
        request: &'a TranslationRequest,
    ) -> Self {
        Self {
            catalog,
            dialect,
            config,
            request,
            prefetch: request.prefetch.clone(),
            slots: vec![Slot {
                fragments: Vec::new(),
                placed: true,
            }],
            markers: HashMap::new(),
            active: vec![ROOT_SLOT],
            aliases: HashMap::new(),
            parameters: Vec::new(),
            scope: Scope::default(),
            reusable_joins: HashMap::new(),
            id_alias_count: 0,
            scratch_count: 0,
            selects: Vec::new(),
            select_count: 0,
            using_aliases: config.use_table_aliases,
            appending_result_columns: false,
            result_position: 0,
            entity_results: 0,
            scalar_results: 0,
            result_columns: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &'a MetadataCatalog {
        self.catalog
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn config(&self) -> &'a TranslationConfig {
        self.config
    }

    // ----- output -----

    /// Appends one token to the active slot.
    pub fn append(&mut self, chunk: impl Into<String>) -> &mut Self {
        let slot = self.active_slot();
        self.slots[slot].fragments.push(Fragment::Text(chunk.into()));
        self
    }

    fn active_slot(&self) -> usize {
        self.active.last().copied().unwrap_or(ROOT_SLOT)
    }

    /// Makes the named marker the target of subsequent appends. With
    /// `create`, a missing marker is created unplaced.
    pub fn push_marker(&mut self, name: &str, create: bool) -> Result<()> {
        let slot = match self.markers.get(name) {
            Some(&slot) => slot,
            None if create => self.new_marker(name),
            None => {
                return Err(TranslationError::Internal(format!(
                    "no marker named {name}"
                )))
            }
        };
        self.active.push(slot);
        Ok(())
    }

    pub fn pop_marker(&mut self) -> Result<()> {
        if self.active.len() <= 1 {
            return Err(TranslationError::Internal(
                "pop_marker called without a pushed marker".to_string(),
            ));
        }
        self.active.pop();
        Ok(())
    }

    /// Places the named marker at the current output position, creating it
    /// if needed. Content already written to it appears here.
    pub fn mark_current_position(&mut self, name: &str) -> Result<()> {
        let slot = match self.markers.get(name) {
            Some(&slot) => slot,
            None => self.new_marker(name),
        };
        if self.slots[slot].placed {
            return Err(TranslationError::Internal(format!(
                "marker {name} is already placed"
            )));
        }
        if self.active.contains(&slot) {
            return Err(TranslationError::Internal(format!(
                "marker {name} can't be placed inside itself"
            )));
        }
        self.slots[slot].placed = true;
        let target = self.active_slot();
        self.slots[target].fragments.push(Fragment::Slot(slot));
        Ok(())
    }

    fn new_marker(&mut self, name: &str) -> usize {
        let slot = self.slots.len();
        self.slots.push(Slot::default());
        self.markers.insert(name.to_string(), slot);
        slot
    }

    /// True if the marker is absent or renders to nothing.
    pub fn is_marker_empty(&self, name: &str) -> bool {
        self.markers
            .get(name)
            .map(|&slot| self.slot_is_empty(slot))
            .unwrap_or(true)
    }

    fn slot_is_empty(&self, slot: usize) -> bool {
        self.slots[slot].fragments.iter().all(|fragment| match fragment {
            Fragment::Text(text) => text.is_empty(),
            Fragment::Slot(child) => self.slot_is_empty(*child),
        })
    }

    /// Removes the last `tokens` appended tokens of the active slot.
    pub fn trim(&mut self, tokens: usize) -> Result<()> {
        let slot = self.active_slot();
        for _ in 0..tokens {
            match self.slots[slot].fragments.last() {
                Some(Fragment::Text(_)) => {
                    self.slots[slot].fragments.pop();
                }
                Some(Fragment::Slot(_)) => {
                    return Err(TranslationError::Internal(
                        "can't trim across a marker".to_string(),
                    ))
                }
                None => {
                    return Err(TranslationError::Internal(
                        "nothing left to trim".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_slot(ROOT_SLOT, &mut out);
        out
    }

    fn render_slot(&self, slot: usize, out: &mut String) {
        for fragment in &self.slots[slot].fragments {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Slot(child) => self.render_slot(*child, out),
            }
        }
    }

    /// Name for an unplaced marker used to capture output as text.
    pub fn scratch_marker(&mut self) -> String {
        let name = format!("SCRATCH{}", self.scratch_count);
        self.scratch_count += 1;
        name
    }

    /// Renders what has been written to a marker so far.
    pub fn marker_text(&self, name: &str) -> String {
        let mut out = String::new();
        if let Some(&slot) = self.markers.get(name) {
            self.render_slot(slot, &mut out);
        }
        out
    }

    // ----- parameters -----

    /// Binds a value under a fresh generated name and returns the name.
    pub fn bind_parameter(&mut self, value: Value) -> String {
        let name = format!("{}{}", self.config.parameter_prefix, self.parameters.len());
        self.parameters.push((name.clone(), value));
        name
    }

    pub fn bind_named_parameter(&mut self, name: &str) -> String {
        let value = self.named_parameter(name).cloned().unwrap_or_else(|| {
            tracing::warn!(parameter = %name, "named parameter has no value, binding null");
            Value::Null
        });
        self.bind_parameter(value)
    }

    pub fn bind_positional_parameter(&mut self, position: usize) -> String {
        let value = self.positional_parameter(position).cloned().unwrap_or_else(|| {
            tracing::warn!(position, "positional parameter has no value, binding null");
            Value::Null
        });
        self.bind_parameter(value)
    }

    pub fn named_parameter(&self, name: &str) -> Option<&'a Value> {
        self.request.named_parameters.get(name)
    }

    pub fn positional_parameter(&self, position: usize) -> Option<&'a Value> {
        self.request.positional_parameters.get(&position)
    }

    pub fn bound_parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    pub fn rebind_parameter(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = self
            .parameters
            .iter_mut()
            .find(|(bound, _)| bound == name)
            .ok_or_else(|| {
                TranslationError::Internal(format!("parameter {name} was never bound"))
            })?;
        slot.1 = value;
        Ok(())
    }

    // ----- aliases and scope -----

    /// Alias of one table occurrence. Stable for the same id path and
    /// table; without aliases the qualified table name is returned.
    pub fn table_alias(&mut self, id_path: &str, table: &DbEntity) -> String {
        if !self.using_aliases {
            return self.dialect.qualify_table(table);
        }
        let key = match id_path.split_once('.') {
            Some((root, rest)) => format!("{}.{rest}:{}", root.to_lowercase(), table.qualified_name()),
            None => format!("{}:{}", id_path.to_lowercase(), table.qualified_name()),
        };
        let next = self.aliases.len();
        self.aliases
            .entry(key)
            .or_insert_with_key(|key| {
                tracing::trace!(key = %key, alias = next, "assigned table alias");
                format!("t{next}")
            })
            .clone()
    }

    /// Declares an identification variable of the current SELECT.
    pub fn declare_variable(&mut self, id: &str, entity: &str, defined_by: Option<TableId>) -> Result<TableId> {
        self.scope.declare(id, entity, defined_by).ok_or_else(|| {
            TranslationError::InvalidAst(format!("identification variable {id} is declared twice"))
        })
    }

    /// Table id an identification variable stands for in the current SELECT.
    pub fn variable_id(&self, id: &str) -> Result<TableId> {
        self.scope.lookup(id).ok_or_else(|| {
            TranslationError::UnmappedReference(format!("undefined identification variable {id}"))
        })
    }

    /// Declares a synthetic identification variable standing for a path.
    pub fn create_id_alias(&mut self, entity: &str, defined_by: TableId) -> Result<String> {
        let id = format!(
            "{}_alias{}",
            defined_by.id_path().replace(['.', ':', '#'], "_"),
            self.id_alias_count
        );
        self.id_alias_count += 1;
        self.declare_variable(&id, entity, Some(defined_by))?;
        Ok(id)
    }

    pub fn entity_for_id(&self, id: &str) -> Result<&'a ObjEntity> {
        self.entity_for_root(&self.variable_id(id)?)
    }

    fn entity_for_root(&self, root: &TableId) -> Result<&'a ObjEntity> {
        let variable = self.scope.variable(root).ok_or_else(|| {
            TranslationError::Internal(format!("{root} has no identification variable"))
        })?;
        self.catalog.require_entity(&variable.entity)
    }

    /// Entity (object-layer occurrences only) and table of a table
    /// occurrence.
    pub fn resolve_table(&self, id: &TableId) -> Result<(Option<&'a ObjEntity>, &'a DbEntity)> {
        let catalog = self.catalog;
        let Some((parent, hop)) = id.parent() else {
            let entity = self.entity_for_root(id)?;
            return Ok((Some(entity), catalog.table_for(entity)?));
        };
        let (entity, table) = self.resolve_table(&parent)?;
        match hop {
            Hop::Object(name) => {
                let entity = entity.ok_or_else(|| {
                    TranslationError::Internal(format!(
                        "object relationship {name} follows a table relationship in {id}"
                    ))
                })?;
                let relationship = catalog.relationship(entity, name).ok_or_else(|| {
                    TranslationError::UnmappedReference(format!(
                        "unknown relationship {name} of entity {}",
                        entity.name
                    ))
                })?;
                let target = catalog.relationship_target(relationship)?;
                Ok((Some(target), catalog.table_for(target)?))
            }
            Hop::Db(name) => {
                let relationship = table.relationship(name).ok_or_else(|| {
                    TranslationError::UnmappedReference(format!(
                        "unknown table relationship {name} on {}",
                        table.name
                    ))
                })?;
                Ok((None, catalog.require_table(&relationship.target)?))
            }
        }
    }

    /// Table relationships leading into a table occurrence from the one it
    /// hangs off.
    pub fn incoming_hops(&self, id: &TableId) -> Result<Vec<DbHop<'a>>> {
        let catalog = self.catalog;
        let Some((parent, hop)) = id.parent() else {
            let defined_by = self
                .scope
                .variable(id)
                .and_then(|variable| variable.defined_by.clone())
                .ok_or_else(|| {
                    TranslationError::Internal(format!("{id} is not reached through a relationship"))
                })?;
            return self.incoming_hops(&defined_by);
        };
        let (entity, table) = self.resolve_table(&parent)?;
        match hop {
            Hop::Object(name) => {
                let entity = entity.ok_or_else(|| {
                    TranslationError::Internal(format!(
                        "object relationship {name} follows a table relationship in {id}"
                    ))
                })?;
                let relationship = catalog.relationship(entity, name).ok_or_else(|| {
                    TranslationError::UnmappedReference(format!(
                        "unknown relationship {name} of entity {}",
                        entity.name
                    ))
                })?;
                catalog.relationship_hops(entity, relationship)
            }
            Hop::Db(name) => catalog.db_relationship_chain(table, name),
        }
    }

    pub fn reusable_join(&self, source: &TableId, hop: &Hop) -> Option<&TableId> {
        self.reusable_joins.get(&(source.clone(), hop.clone()))
    }

    /// Records `source --hop--> target` as reusable. Returns the occurrence
    /// already registered for the pair, if any.
    pub fn register_reusable_join(&mut self, source: &TableId, hop: &Hop, target: TableId) -> Option<TableId> {
        match self.reusable_joins.entry((source.clone(), hop.clone())) {
            Entry::Occupied(existing) => Some(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(target);
                None
            }
        }
    }

    // ----- select levels -----

    /// Enters a SELECT (top level or subselect); markers made afterwards are
    /// numbered for it.
    pub fn begin_select(&mut self) -> usize {
        let number = self.select_count;
        self.select_count += 1;
        self.scope.push_frame();
        self.selects.push(SelectLevel {
            number,
            columns: HashSet::new(),
            column_count: 0,
        });
        number
    }

    pub fn end_select(&mut self) {
        self.selects.pop();
        self.scope.pop_frame();
    }

    fn select_number(&self) -> usize {
        self.selects.last().map(|level| level.number).unwrap_or(0)
    }

    pub fn distinct_marker(&self) -> String {
        format!("DISTINCT_MARKER{}", self.select_number())
    }

    pub fn where_marker(&self) -> String {
        format!("WHERE_MARKER{}", self.select_number())
    }

    pub fn entity_qualifier_marker(&self) -> String {
        format!("ENTITY_QUALIFIER{}", self.select_number())
    }

    pub fn join_tail_marker(id: &TableId) -> String {
        format!("FROM_TAIL{}", id.id_path())
    }

    /// Claims a column for the current select list; false if it was
    /// already selected.
    pub fn claim_select_column(&mut self, key: &str) -> bool {
        match self.selects.last_mut() {
            Some(level) => level.columns.insert(key.to_string()),
            None => true,
        }
    }

    /// Writes the separator preceding a select-list item.
    pub fn begin_select_item(&mut self) {
        let first = match self.selects.last_mut() {
            Some(level) => {
                level.column_count += 1;
                level.column_count == 1
            }
            None => true,
        };
        if !first {
            self.append(",");
        }
    }

    // ----- flags -----

    pub fn is_using_aliases(&self) -> bool {
        self.using_aliases
    }

    pub fn set_using_aliases(&mut self, using_aliases: bool) {
        self.using_aliases = using_aliases;
    }

    pub fn is_appending_result_columns(&self) -> bool {
        self.appending_result_columns
    }

    pub fn set_appending_result_columns(&mut self, appending: bool) {
        self.appending_result_columns = appending;
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.config.case_insensitive
    }

    // ----- results -----

    pub fn prefetch(&self) -> &[PrefetchNode] {
        &self.prefetch
    }

    pub fn add_prefetch(&mut self, node: PrefetchNode) {
        if !self.prefetch.contains(&node) {
            self.prefetch.push(node);
        }
    }

    fn result_mapping(&self) -> Option<&'a [ResultSegment]> {
        self.request.result_mapping.as_deref()
    }

    fn next_segment(&mut self) -> Result<(usize, Option<&'a ResultSegment>)> {
        let position = self.result_position;
        self.result_position += 1;
        match self.result_mapping() {
            None => Ok((position, None)),
            Some(segments) => segments.get(position).map(|s| (position, Some(s))).ok_or_else(|| {
                TranslationError::InvalidAst(format!(
                    "result mapping declares {} segments but the select list has more",
                    segments.len()
                ))
            }),
        }
    }

    /// Starts the next entity result of the select list.
    pub fn next_entity_result(&mut self) -> Result<EntityResult> {
        let (position, segment) = self.next_segment()?;
        let labels = match segment {
            None => HashMap::new(),
            Some(ResultSegment::Entity { columns, .. }) => columns.clone(),
            Some(ResultSegment::Scalar { .. }) => {
                return Err(TranslationError::InvalidAst(format!(
                    "result segment {position} is a scalar but the select list has an entity there"
                )))
            }
        };
        let index = self.entity_results;
        self.entity_results += 1;
        Ok(EntityResult::new(position, index, labels))
    }

    /// Starts the next scalar result, returning its segment position and
    /// column label.
    pub fn next_scalar_result(&mut self) -> Result<(usize, String)> {
        let (position, segment) = self.next_segment()?;
        let label = match segment {
            None => format!("sc{}", self.scalar_results),
            Some(ResultSegment::Scalar { column }) => column.clone(),
            Some(ResultSegment::Entity { .. }) => {
                return Err(TranslationError::InvalidAst(format!(
                    "result segment {position} is an entity but the select list has a scalar there"
                )))
            }
        };
        self.scalar_results += 1;
        Ok((position, label))
    }

    pub fn push_result_column(&mut self, column: ResultColumn) {
        self.result_columns.push(column);
    }

    pub fn into_parts(self) -> (String, Vec<(String, Value)>, Vec<ResultColumn>) {
        let sql = self.render();
        (sql, self.parameters, self.result_columns)
    }
}
