//! # Advanced Layouts
//!
//! An advanced type puts caller code in front of a backing node. The
//! backing node is built by the type that shares the layout's name, so
//! `Data bytes representation advanced DataLayout` together with
//! `type DataLayout map` gives a `Data` node whose storage is a map.
//!
//! Each hook receives the advanced node itself; implementations reach the
//! storage through [`Node::backing`]. Every hook defaults to forwarding to
//! the backing node, so an empty `impl AdvancedLayout for X {}` is a valid
//! pass-through layout.

use dagtype_core::Value;

use crate::error::NodeError;
use crate::node::Node;

/// Caller-supplied behavior for an advanced layout.
pub trait AdvancedLayout: Send + Sync {
    fn validate(&self, node: &Node) -> Result<(), NodeError> {
        node.backing()?.validate()
    }

    fn encode(&self, node: &Node) -> Result<Value, NodeError> {
        node.backing()?.encode()
    }

    fn resolve(&self, node: &Node, segment: &str) -> Result<Option<Node>, NodeError> {
        node.backing()?.resolve(segment)
    }

    /// Layout-specific operations, called through [`Node::invoke`].
    fn invoke(&self, node: &Node, operation: &str, _args: &[Value]) -> Result<Value, NodeError> {
        Err(NodeError::UnknownOperation {
            type_name: node.type_name().to_string(),
            operation: operation.to_string(),
        })
    }
}

/// A layout with no behavior of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl AdvancedLayout for PassThrough {}
