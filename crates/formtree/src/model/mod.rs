//! The control-tree data model.
//!
//! A form is a tree of controls: scalar [fields](ControlKind::Field),
//! ordered [groups](ControlKind::Group), and append-only
//! [lists](ControlKind::List), all stored in a [`FormTree`] arena and
//! addressed by [`ControlId`]. Validators see the tree only through
//! [`ControlRef`], a read-only view.

pub mod tree;
pub mod value;

pub use tree::{ControlId, ControlKind, ControlNode, ControlRef, ControlStatus, FormTree};
pub use value::Value;
