//! Table occurrences and identification variables.

use std::collections::HashMap;
use std::fmt;

/// One step from a table occurrence to a related one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Hop {
    /// Object-layer relationship, possibly flattened.
    Object(String),
    /// Table-layer relationship.
    Db(String),
}

/// Identifies one table occurrence in a statement: an identification
/// variable, optionally followed by relationship hops. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId {
    root: String,
    hops: Vec<Hop>,
}

impl TableId {
    /// Identification variables are case-insensitive; relationship names
    /// are not.
    pub fn root(id: &str) -> Self {
        Self {
            root: id.to_lowercase(),
            hops: Vec::new(),
        }
    }

    pub fn child(&self, hop: Hop) -> Self {
        let mut hops = self.hops.clone();
        hops.push(hop);
        Self {
            root: self.root.clone(),
            hops,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root
    }

    pub fn is_root(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn parent(&self) -> Option<(TableId, &Hop)> {
        let (last, rest) = self.hops.split_last()?;
        Some((
            TableId {
                root: self.root.clone(),
                hops: rest.to_vec(),
            },
            last,
        ))
    }

    /// Dotted form used for alias lookup and marker names.
    pub fn id_path(&self) -> String {
        let mut out = self.root.clone();
        for hop in &self.hops {
            match hop {
                Hop::Object(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                Hop::Db(name) => {
                    out.push_str(".db:");
                    out.push_str(name);
                }
            }
        }
        out
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id_path())
    }
}

#[derive(Debug, Clone)]
pub struct IdVariable {
    pub entity: String,
    /// Set for variables introduced by a join: the path they stand for.
    pub defined_by: Option<TableId>,
}

/// Identification variables of a statement. Each SELECT opens a frame;
/// names resolve innermost first. Every declaration gets a root unique in
/// the statement (`g`, later ones `g#<n>`) so table ids of different
/// subselects never collide.
#[derive(Debug)]
pub struct Scope {
    frames: Vec<HashMap<String, String>>,
    variables: HashMap<String, IdVariable>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            frames: vec![HashMap::new()],
            variables: HashMap::new(),
        }
    }
}

impl Scope {
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// The outermost frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declares `id` in the innermost frame and returns its table id, or
    /// `None` if that frame already declares it.
    pub fn declare(&mut self, id: &str, entity: &str, defined_by: Option<TableId>) -> Option<TableId> {
        let name = id.to_lowercase();
        let root = if self.variables.contains_key(&name) {
            format!("{name}#{}", self.variables.len())
        } else {
            name.clone()
        };
        let frame = self.frames.last_mut()?;
        if frame.contains_key(&name) {
            return None;
        }
        frame.insert(name, root.clone());
        self.variables.insert(
            root.clone(),
            IdVariable {
                entity: entity.to_string(),
                defined_by,
            },
        );
        Some(TableId::root(&root))
    }

    /// Table id of a visible identification variable.
    pub fn lookup(&self, id: &str) -> Option<TableId> {
        let name = id.to_lowercase();
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&name))
            .map(|root| TableId::root(root))
    }

    /// Variable behind a table id root, visible or not.
    pub fn variable(&self, root: &TableId) -> Option<&IdVariable> {
        self.variables.get(root.root_id())
    }
}
