//! The control tree: fields, groups, and lists in one arena.
//!
//! Controls live in a [`FormTree`] arena and are addressed by [`ControlId`].
//! The three node kinds form a tagged variant over a common control state
//! (value, status, errors, interaction flags):
//!
//! - **Field** — a leaf scalar value.
//! - **Group** — an ordered mapping from name to child control; owns its own
//!   (cross-field) errors only, never its descendants'.
//! - **List** — an ordered, append-only sequence of controls.
//!
//! `status` and `errors` are private state: the only writer is the engine's
//! `evaluate`, which keeps the aggregation invariant (a control is Invalid
//! iff its own errors are non-empty or any descendant is Invalid).

use indexmap::IndexMap;
use serde_json::Value as Json;
use smallvec::SmallVec;

use crate::foundation::{EngineError, ErrorMap};
use crate::model::Value;

static NULL: Value = Value::Null;

// ============================================================================
// IDS AND STATUS
// ============================================================================

/// Handle to a control inside a [`FormTree`].
///
/// Ids are arena indices: cheap to copy, stable for the lifetime of the tree
/// (controls are never removed in this scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub(crate) usize);

/// Validation status of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlStatus {
    /// No own errors and no invalid descendant.
    #[default]
    Valid,
    /// Own errors present, or some descendant is invalid.
    Invalid,
    /// Reserved for asynchronous validators; never produced by the
    /// synchronous engine.
    Pending,
}

// ============================================================================
// NODES
// ============================================================================

/// The kind-specific payload of a control.
#[derive(Debug, Clone)]
pub enum ControlKind {
    /// Leaf scalar.
    Field {
        /// Current value.
        value: Value,
        /// Value at construction time; the pristine/dirty baseline.
        initial: Value,
    },
    /// Ordered mapping from field name to child control.
    Group {
        /// Children in declaration order.
        children: IndexMap<String, ControlId>,
    },
    /// Ordered, append-only sequence of controls.
    List {
        /// Items in insertion order.
        items: Vec<ControlId>,
    },
}

/// A single node: kind payload plus the common control state.
#[derive(Debug, Clone)]
pub struct ControlNode {
    parent: Option<ControlId>,
    kind: ControlKind,
    status: ControlStatus,
    errors: ErrorMap,
    touched: bool,
    dirty: bool,
}

impl ControlNode {
    fn new(kind: ControlKind) -> Self {
        Self {
            parent: None,
            kind,
            status: ControlStatus::Valid,
            errors: ErrorMap::new(),
            touched: false,
            dirty: false,
        }
    }

    /// The kind-specific payload.
    #[must_use]
    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    /// Current validation status.
    #[must_use]
    pub fn status(&self) -> ControlStatus {
        self.status
    }

    /// The control's *own* errors. For a group this holds cross-field errors
    /// only — descendant field errors never appear here.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// True once the control has received and lost focus at least once.
    #[must_use]
    pub fn touched(&self) -> bool {
        self.touched
    }

    /// True once the value has been changed by user input at least once.
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Negation of [`dirty`](Self::dirty).
    #[must_use]
    pub fn pristine(&self) -> bool {
        !self.dirty
    }

    /// The scalar value, for fields. Groups and lists read as `Null`.
    #[must_use]
    pub fn value(&self) -> &Value {
        match &self.kind {
            ControlKind::Field { value, .. } => value,
            ControlKind::Group { .. } | ControlKind::List { .. } => &NULL,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

/// Arena holding every control of one form.
///
/// Construction is bottom-up: build leaves first, then the groups that own
/// them. A node can be attached to at most one parent; attaching it twice is
/// a defect and fails with [`EngineError::AlreadyAttached`].
#[derive(Debug, Default)]
pub struct FormTree {
    nodes: Vec<ControlNode>,
}

impl FormTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of controls in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no controls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: ControlNode) -> ControlId {
        let id = ControlId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Creates a detached field with the given initial value.
    pub fn new_field(&mut self, initial: Value) -> ControlId {
        self.push(ControlNode::new(ControlKind::Field {
            value: initial.clone(),
            initial,
        }))
    }

    /// Creates a group owning the given children, in order.
    pub fn new_group<N, I>(&mut self, children: I) -> Result<ControlId, EngineError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, ControlId)>,
    {
        let children: IndexMap<String, ControlId> = children
            .into_iter()
            .map(|(name, id)| (name.into(), id))
            .collect();
        for &child in children.values() {
            self.ensure_detached(child)?;
        }
        let id = self.push(ControlNode::new(ControlKind::Group {
            children: children.clone(),
        }));
        for &child in children.values() {
            self.node_mut(child)?.parent = Some(id);
        }
        Ok(id)
    }

    /// Creates a list owning the given items, in order.
    pub fn new_list<I>(&mut self, items: I) -> Result<ControlId, EngineError>
    where
        I: IntoIterator<Item = ControlId>,
    {
        let items: Vec<ControlId> = items.into_iter().collect();
        for &item in &items {
            self.ensure_detached(item)?;
        }
        let id = self.push(ControlNode::new(ControlKind::List { items: items.clone() }));
        for &item in &items {
            self.node_mut(item)?.parent = Some(id);
        }
        Ok(id)
    }

    /// Appends an existing detached control to a list.
    pub(crate) fn push_item(
        &mut self,
        list: ControlId,
        item: ControlId,
    ) -> Result<(), EngineError> {
        self.ensure_detached(item)?;
        match &mut self.node_mut(list)?.kind {
            ControlKind::List { items } => items.push(item),
            _ => {
                return Err(EngineError::KindMismatch {
                    id: list,
                    expected: "list",
                });
            }
        }
        self.node_mut(item)?.parent = Some(list);
        Ok(())
    }

    fn ensure_detached(&self, id: ControlId) -> Result<(), EngineError> {
        if self.node(id)?.parent.is_some() {
            return Err(EngineError::AlreadyAttached(id));
        }
        Ok(())
    }

    /// Borrows a node, failing loudly for detached/foreign ids.
    pub fn node(&self, id: ControlId) -> Result<&ControlNode, EngineError> {
        self.nodes.get(id.0).ok_or(EngineError::UnknownControl(id))
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Result<&mut ControlNode, EngineError> {
        self.nodes
            .get_mut(id.0)
            .ok_or(EngineError::UnknownControl(id))
    }

    /// A read-only view suitable for handing to validators.
    pub fn control(&self, id: ControlId) -> Result<ControlRef<'_>, EngineError> {
        self.node(id)?;
        Ok(ControlRef { tree: self, id })
    }

    /// The control's parent, if attached.
    pub fn parent(&self, id: ControlId) -> Result<Option<ControlId>, EngineError> {
        Ok(self.node(id)?.parent)
    }

    /// Direct children in order (empty for fields).
    pub fn children(&self, id: ControlId) -> Result<SmallVec<[ControlId; 8]>, EngineError> {
        Ok(match &self.node(id)?.kind {
            ControlKind::Field { .. } => SmallVec::new(),
            ControlKind::Group { children } => children.values().copied().collect(),
            ControlKind::List { items } => items.iter().copied().collect(),
        })
    }

    /// Looks up a group child by name.
    pub fn child(&self, group: ControlId, name: &str) -> Result<ControlId, EngineError> {
        match &self.node(group)?.kind {
            ControlKind::Group { children } => {
                children
                    .get(name)
                    .copied()
                    .ok_or_else(|| EngineError::NoSuchChild {
                        group,
                        name: name.to_owned(),
                    })
            }
            _ => Err(EngineError::KindMismatch {
                id: group,
                expected: "group",
            }),
        }
    }

    /// Assigns a field's value. `user_edit` distinguishes user input (which
    /// marks the control dirty) from programmatic assignment (which leaves
    /// the interaction flags alone).
    pub(crate) fn assign(
        &mut self,
        id: ControlId,
        value: Value,
        user_edit: bool,
    ) -> Result<(), EngineError> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            ControlKind::Field { value: slot, .. } => {
                *slot = value;
                if user_edit {
                    node.dirty = true;
                }
                Ok(())
            }
            _ => Err(EngineError::KindMismatch {
                id,
                expected: "field",
            }),
        }
    }

    /// Flags the control as touched (focus received and lost).
    pub(crate) fn mark_touched(&mut self, id: ControlId) -> Result<(), EngineError> {
        self.node_mut(id)?.touched = true;
        Ok(())
    }

    /// Installs an evaluation result. Returns whether the status flipped.
    pub(crate) fn install_result(
        &mut self,
        id: ControlId,
        errors: ErrorMap,
        status: ControlStatus,
    ) -> Result<bool, EngineError> {
        let node = self.node_mut(id)?;
        let changed = node.status != status;
        node.errors = errors;
        node.status = status;
        Ok(changed)
    }

    /// Snapshot of the subtree's values as a nested JSON mapping mirroring
    /// the tree shape. This is the "save" boundary: the engine exposes the
    /// snapshot and transmits nothing.
    pub fn snapshot(&self, id: ControlId) -> Result<Json, EngineError> {
        Ok(match &self.node(id)?.kind {
            ControlKind::Field { value, .. } => {
                serde_json::to_value(value).unwrap_or(Json::Null)
            }
            ControlKind::Group { children } => {
                let mut map = serde_json::Map::with_capacity(children.len());
                for (name, &child) in children {
                    map.insert(name.clone(), self.snapshot(child)?);
                }
                Json::Object(map)
            }
            ControlKind::List { items } => {
                let mut out = Vec::with_capacity(items.len());
                for &item in items {
                    out.push(self.snapshot(item)?);
                }
                Json::Array(out)
            }
        })
    }
}

// ============================================================================
// CONTROL REF
// ============================================================================

/// Cheap read-only view of one control, handed to validators.
///
/// Cross-field validators navigate from a group to its children through
/// [`child`](Self::child) and read their values and pristine flags; nothing
/// reachable from a `ControlRef` can mutate the tree.
#[derive(Clone, Copy)]
pub struct ControlRef<'a> {
    tree: &'a FormTree,
    id: ControlId,
}

impl<'a> ControlRef<'a> {
    /// The id of the viewed control.
    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    fn node(&self) -> &'a ControlNode {
        // The id was checked when the ref was created and nodes are never
        // removed, so the lookup cannot fail.
        &self.tree.nodes[self.id.0]
    }

    /// The scalar value (fields); groups and lists read as `Null`.
    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.node().value()
    }

    /// Own errors of the viewed control.
    #[must_use]
    pub fn errors(&self) -> &'a ErrorMap {
        self.node().errors()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ControlStatus {
        self.node().status()
    }

    /// True once focus was received and lost.
    #[must_use]
    pub fn touched(&self) -> bool {
        self.node().touched()
    }

    /// True once user input changed the value.
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.node().dirty()
    }

    /// Negation of [`dirty`](Self::dirty).
    #[must_use]
    pub fn pristine(&self) -> bool {
        self.node().pristine()
    }

    /// Navigates to a group child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<ControlRef<'a>> {
        match self.node().kind() {
            ControlKind::Group { children } => children.get(name).map(|&id| ControlRef {
                tree: self.tree,
                id,
            }),
            _ => None,
        }
    }

    /// Navigates to a list item by position.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<ControlRef<'a>> {
        match self.node().kind() {
            ControlKind::List { items } => items.get(index).map(|&id| ControlRef {
                tree: self.tree,
                id,
            }),
            _ => None,
        }
    }

    /// Number of direct children (fields report zero).
    #[must_use]
    pub fn child_count(&self) -> usize {
        match self.node().kind() {
            ControlKind::Field { .. } => 0,
            ControlKind::Group { children } => children.len(),
            ControlKind::List { items } => items.len(),
        }
    }
}

impl std::fmt::Debug for ControlRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlRef")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("errors", &self.errors())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
