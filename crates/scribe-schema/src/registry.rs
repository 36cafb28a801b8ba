//! Per-pass reference and effect bookkeeping.
//!
//! A [`ConversionContext`] lives for exactly one document build. It tracks
//! which nodes have been assigned component names, which of those are still
//! being rendered, the finished definitions, resolved lazy getters, and the
//! effect log used to detect input/output conflicts on shared components.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{SchemaError, SchemaResult};
use crate::node::{GetterId, NodeId, Side};
use crate::schema::Schema;

/// Registration status of a named node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefStatus {
    /// The node is being rendered; revisits emit a reference.
    InProgress,
    /// The node's definition is stored.
    Complete,
}

/// Traversal state of a node within the active recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    /// Not seen in this pass.
    Unvisited,
    /// On the active recursion stack.
    InProgress,
    /// Rendered at least once.
    Done,
}

/// Saved traversal state, restored when a visit ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitFrame {
    state: VisitState,
    depth: usize,
}

/// Where an effect record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSource {
    /// The transform declared its direction.
    Declared,
    /// The direction was taken from the conversion side.
    Context,
}

/// One recorded effect on a named node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRecord {
    /// Traversal path of the transform (or of the reuse site).
    pub path: String,
    /// Side that was rendered.
    pub side: Side,
    /// Origin of the direction.
    pub source: EffectSource,
}

/// Conversion state for one document build.
#[derive(Debug, Default)]
pub struct ConversionContext {
    definitions: IndexMap<String, Schema>,
    references: HashMap<NodeId, (String, RefStatus)>,
    names: HashMap<String, NodeId>,
    getters: HashMap<GetterId, NodeId>,
    effects: IndexMap<String, Vec<EffectRecord>>,
    visits: HashMap<NodeId, VisitFrame>,
    path: Vec<String>,
    enclosing: Vec<String>,
}

impl ConversionContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished component definitions, in completion order.
    pub fn definitions(&self) -> &IndexMap<String, Schema> {
        &self.definitions
    }

    /// Consume the context, yielding the definitions.
    pub fn into_definitions(self) -> IndexMap<String, Schema> {
        self.definitions
    }

    /// The registration of `id`, if any.
    pub fn reference(&self, id: NodeId) -> Option<(&str, RefStatus)> {
        self.references
            .get(&id)
            .map(|(name, status)| (name.as_str(), *status))
    }

    /// Register `id` under `name` as in-progress.
    ///
    /// Fails with [`SchemaError::DuplicateSchemaName`] when another node
    /// already owns the name. Registering the same node twice is a no-op.
    pub fn register(&mut self, id: NodeId, name: &str) -> SchemaResult<()> {
        match self.names.get(name) {
            Some(owner) if *owner == id => Ok(()),
            Some(_) => Err(SchemaError::DuplicateSchemaName {
                name: name.to_string(),
                path: self.path_string(),
            }),
            None => {
                self.names.insert(name.to_string(), id);
                self.references
                    .insert(id, (name.to_string(), RefStatus::InProgress));
                Ok(())
            }
        }
    }

    /// Store the definition for a registered node and mark it complete.
    ///
    /// The first stored definition wins.
    pub fn complete(&mut self, id: NodeId, schema: Schema) {
        if let Some((name, status)) = self.references.get_mut(&id) {
            *status = RefStatus::Complete;
            self.definitions.entry(name.clone()).or_insert(schema);
        }
    }

    /// Record an effect against `name`.
    pub fn record_effect(&mut self, name: &str, side: Side, source: EffectSource) {
        let record = EffectRecord {
            path: self.path_string(),
            side,
            source,
        };
        self.effects
            .entry(name.to_string())
            .or_default()
            .push(record);
    }

    /// Record an effect against every enclosing named node.
    pub fn record_enclosing(&mut self, side: Side, source: EffectSource) {
        let names = self.enclosing.clone();
        for name in names {
            self.record_effect(&name, side, source);
        }
    }

    /// The effect log of `name`.
    pub fn effects(&self, name: &str) -> &[EffectRecord] {
        self.effects.get(name).map_or(&[], Vec::as_slice)
    }

    /// Whether `name` has effects whose rendering followed the conversion side.
    pub fn has_context_effects(&self, name: &str) -> bool {
        self.effects(name)
            .iter()
            .any(|r| r.source == EffectSource::Context)
    }

    /// Scan the log of `name` for context-derived effects on both sides.
    pub fn check_effects(&self, name: &str) -> SchemaResult<()> {
        let log = self.effects(name);
        let first = |side: Side| {
            log.iter()
                .find(|r| r.source == EffectSource::Context && r.side == side)
        };
        match (first(Side::Input), first(Side::Output)) {
            (Some(input), Some(output)) => Err(SchemaError::ConflictingEffectDirection {
                name: name.to_string(),
                input_path: input.path.clone(),
                output_path: output.path.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Resolved target of a getter, if cached.
    pub fn resolved_getter(&self, id: GetterId) -> Option<NodeId> {
        self.getters.get(&id).copied()
    }

    /// Cache the target of a getter.
    pub fn cache_getter(&mut self, id: GetterId, target: NodeId) {
        self.getters.insert(id, target);
    }

    /// Traversal state of `id`.
    pub fn visit_state(&self, id: NodeId) -> VisitState {
        self.visits
            .get(&id)
            .map_or(VisitState::Unvisited, |frame| frame.state)
    }

    /// Whether revisiting `id` closes a cycle with no named node on it.
    ///
    /// A cycle through a named node is fine: the named node is emitted as a
    /// reference the second time round.
    pub fn closes_cycle(&self, id: NodeId) -> bool {
        matches!(
            self.visits.get(&id),
            Some(frame) if frame.state == VisitState::InProgress && self.enclosing.len() <= frame.depth
        )
    }

    /// Mark `id` as on the recursion stack, returning the state to restore.
    pub fn begin_visit(&mut self, id: NodeId) -> VisitFrame {
        let entered = VisitFrame {
            state: VisitState::InProgress,
            depth: self.enclosing.len(),
        };
        self.visits.insert(id, entered).unwrap_or(VisitFrame {
            state: VisitState::Unvisited,
            depth: 0,
        })
    }

    /// Take `id` off the recursion stack.
    pub fn end_visit(&mut self, id: NodeId, previous: VisitFrame) {
        let restored = match previous.state {
            VisitState::InProgress => previous,
            VisitState::Unvisited | VisitState::Done => VisitFrame {
                state: VisitState::Done,
                depth: 0,
            },
        };
        self.visits.insert(id, restored);
    }

    /// Push a path segment.
    pub fn enter(&mut self, segment: impl Into<String>) {
        self.path.push(segment.into());
    }

    /// Pop the last path segment.
    pub fn leave(&mut self) {
        self.path.pop();
    }

    /// Replace the whole path with a single root label.
    pub fn reset_path(&mut self, root: impl Into<String>) {
        self.path.clear();
        self.path.push(root.into());
    }

    /// The current traversal path, `/`-joined.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            "#".to_string()
        } else {
            self.path.join("/")
        }
    }

    /// Push a named node onto the enclosing-name stack.
    pub fn push_enclosing(&mut self, name: &str) {
        self.enclosing.push(name.to_string());
    }

    /// Pop the enclosing-name stack.
    pub fn pop_enclosing(&mut self) {
        self.enclosing.pop();
    }
}
