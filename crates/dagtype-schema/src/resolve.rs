//! # Path Resolution Across Blocks
//!
//! `node.get("a/b/c")` walks a slash-separated path one property at a time.
//! Every link the walk lands on is followed, including one reached by the
//! last segment: the target block is fetched through the registry's
//! [`BlockSource`](dagtype_block::BlockSource), decoded, and built as the
//! link's expected type (or inferred when there is none).
//!
//! A path never yields a link node. An empty path on a link node yields the
//! link's target; [`Node::resolve`] is the way to reach the link itself.
//!
//! ## Concurrency
//!
//! Resolution shares no mutable state. Any number of `get` calls may run
//! concurrently on the same tree; each awaits one block fetch per link hop
//! and nothing else.

use dagtype_core::Value;

use crate::error::NodeError;
use crate::node::Node;

/// Expected-type name meaning "build the target by inference".
pub const ANY_TYPE: &str = "Any";

impl Node {
    /// Resolve `path` to a node. Empty segments are ignored, so `""` and
    /// `"/"` return this node, or its target when this node is a link.
    pub async fn get_node(&self, path: &str) -> Result<Node, NodeError> {
        let mut node = if self.is_link() {
            self.follow_link().await?
        } else {
            self.clone()
        };
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            node = node
                .resolve(segment)?
                .ok_or_else(|| NodeError::MissingProperty {
                    type_name: node.type_name().to_string(),
                    property: segment.to_string(),
                })?;
            if node.is_link() {
                node = node.follow_link().await?;
            }
        }
        Ok(node)
    }

    /// Resolve `path` and encode the node found there.
    pub async fn get(&self, path: &str) -> Result<Value, NodeError> {
        self.get_node(path).await?.encode()
    }

    /// Fetch and build the node a link points at.
    pub async fn follow_link(&self) -> Result<Node, NodeError> {
        let cid = match self.value() {
            Some(Value::Link(cid)) if self.is_link() => cid.clone(),
            _ => {
                return Err(NodeError::KindMismatch {
                    type_name: "Link".to_string(),
                    value: self.type_name().to_string(),
                })
            }
        };
        let registry = self.registry().clone();
        let source = registry
            .block_source()
            .cloned()
            .ok_or(NodeError::MissingBlockSource)?;
        let target = self
            .expected_type()
            .filter(|name| *name != ANY_TYPE)
            .map(str::to_string);

        tracing::debug!(
            cid = %cid,
            expected = target.as_deref().unwrap_or(ANY_TYPE),
            "following link"
        );

        let block = source
            .get_block(&cid)
            .await?
            .ok_or_else(|| NodeError::BlockNotFound(cid.clone()))?;
        let value = block.decode()?;
        match target {
            Some(name) => registry.require(&name)?.decoder(value),
            None => registry.infer(value),
        }
    }
}
