//! # Nodes — Typed Values
//!
//! A [`Node`] is an immutable value tagged with its compiled type. Nodes
//! are built by [`TypeHandle::create`](crate::TypeHandle::create) and its
//! `encoder`/`decoder` variants, and share structure by `Arc`: cloning a
//! node, or resolving a child out of it, never copies the tree.
//!
//! ## Operations
//!
//! - [`validate`](Node::validate): check the kind predicate of every node
//!   in the tree. Struct field presence and nullability are checked before
//!   the fields themselves.
//! - [`encode`](Node::encode): produce the native value the node stands for.
//! - [`resolve`](Node::resolve): one step of property lookup. Path
//!   traversal across links lives in [`get`](Node::get).
//! - [`keys`](Node::keys), [`read`](Node::read), [`block`](Node::block) and
//!   [`invoke`](Node::invoke) for the kinds that support them.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use dagtype_block::{Block, Multicodec};
use dagtype_core::Value;
use indexmap::IndexMap;

use crate::advanced::AdvancedLayout;
use crate::error::NodeError;
use crate::kind::Kind;
use crate::registry::Registry;
use crate::typedef::{Shape, StructRepresentation, TypeDef};

/// Largest slice yielded by [`Node::read`].
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// A typed, immutable value. Cheap to clone.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    registry: Registry,
    def: Arc<TypeDef>,
    /// Set when the slot holding this node allows null.
    nullable: bool,
    body: Body,
}

#[derive(Debug)]
pub(crate) enum Body {
    /// Scalars and links, and containers handed a value of the wrong shape.
    Scalar(Value),
    Map(IndexMap<String, Node>),
    List(Vec<Node>),
    Struct(IndexMap<String, Node>),
    Union { key: String, variant: Node },
    Advanced { backing: Node },
}

impl Node {
    pub(crate) fn new(registry: Registry, def: Arc<TypeDef>, nullable: bool, body: Body) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                registry,
                def,
                nullable,
                body,
            }),
        }
    }

    pub(crate) fn def(&self) -> &Arc<TypeDef> {
        &self.inner.def
    }

    /// The registry this node resolves type names and links in.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn type_name(&self) -> &str {
        &self.inner.def.name
    }

    pub fn kind(&self) -> Kind {
        self.inner.def.kind
    }

    pub fn definition(&self) -> &TypeDef {
        &self.inner.def
    }

    pub fn is_link(&self) -> bool {
        self.kind() == Kind::Link
    }

    /// True for data-model kinds: scalars, maps, lists and links. Structs,
    /// unions and advanced nodes are schema-level shapes over those.
    pub fn is_kind(&self) -> bool {
        !matches!(self.kind(), Kind::Struct | Kind::Union | Kind::Advanced)
    }

    /// True for nodes of a builtin base type or an anonymous inline type.
    pub fn is_builtin(&self) -> bool {
        self.inner.def.open
    }

    /// The held value of a scalar or link node.
    pub fn value(&self) -> Option<&Value> {
        match &self.inner.body {
            Body::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.inner.body, Body::Scalar(Value::Null))
    }

    /// Target type of a link node. `None` or `Some("Any")` mean the target
    /// is built by inference.
    pub fn expected_type(&self) -> Option<&str> {
        self.inner.def.expected_type()
    }

    /// The storage node behind an advanced node.
    pub fn backing(&self) -> Result<&Node, NodeError> {
        match &self.inner.body {
            Body::Advanced { backing } => Ok(backing),
            _ => Err(self.not_advanced()),
        }
    }

    /// The active variant of a union node.
    pub fn variant(&self) -> Option<(&str, &Node)> {
        match &self.inner.body {
            Body::Union { key, variant } => Some((key.as_str(), variant)),
            _ => None,
        }
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.inner.nullable && self.is_null() {
            return Ok(());
        }
        match &self.inner.body {
            Body::Scalar(value) => {
                if self.kind().accepts_scalar(value) {
                    Ok(())
                } else {
                    Err(NodeError::KindMismatch {
                        type_name: self.type_name().to_string(),
                        value: value.to_string(),
                    })
                }
            }
            Body::Map(entries) => entries.values().try_for_each(Node::validate),
            Body::List(items) => items.iter().try_for_each(Node::validate),
            Body::Struct(entries) => {
                self.check_fields(entries)?;
                entries.values().try_for_each(Node::validate)
            }
            Body::Union { variant, .. } => variant.validate(),
            Body::Advanced { .. } => self.layout()?.validate(self),
        }
    }

    fn check_fields(&self, entries: &IndexMap<String, Node>) -> Result<(), NodeError> {
        let Shape::Struct { fields, .. } = &self.inner.def.shape else {
            return Ok(());
        };
        for (name, field) in fields {
            match entries.get(name) {
                None if !field.optional => {
                    return Err(NodeError::MissingField {
                        type_name: self.type_name().to_string(),
                        field: name.clone(),
                    })
                }
                Some(child) if child.is_null() && !field.nullable && child.kind() != Kind::Null => {
                    return Err(NodeError::NotNullable {
                        type_name: self.type_name().to_string(),
                        field: name.clone(),
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    pub fn encode(&self) -> Result<Value, NodeError> {
        match &self.inner.body {
            Body::Scalar(value) => Ok(value.clone()),
            Body::Map(entries) => encode_entries(entries),
            Body::List(items) => Ok(Value::List(
                items.iter().map(Node::encode).collect::<Result<_, _>>()?,
            )),
            Body::Struct(entries) => {
                if let Shape::Struct {
                    representation: StructRepresentation::Unsupported(strategy),
                    ..
                } = &self.inner.def.shape
                {
                    return Err(NodeError::NotImplemented(format!(
                        "{strategy} representation of struct {}",
                        self.type_name()
                    )));
                }
                encode_entries(entries)
            }
            Body::Union { key, variant } => Ok(Value::map([(key.clone(), variant.encode()?)])),
            Body::Advanced { .. } => self.layout()?.encode(self),
        }
    }

    /// Encode this node into a block. Byte nodes become `raw` blocks;
    /// everything else uses the registry's default codec.
    pub fn block(&self) -> Result<Block, NodeError> {
        let codec = match self.value() {
            Some(Value::Bytes(_)) => Multicodec::Raw,
            _ => self.inner.registry.default_codec(),
        };
        self.block_with(codec)
    }

    pub fn block_with(&self, codec: Multicodec) -> Result<Block, NodeError> {
        Ok(Block::encoder(&self.encode()?, codec)?)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Look up one property. `Ok(None)` means the property is absent.
    ///
    /// Lists take decimal indexes. Unions accept their active key or `*`.
    pub fn resolve(&self, segment: &str) -> Result<Option<Node>, NodeError> {
        match &self.inner.body {
            Body::Scalar(_) => Err(NodeError::NotTraversable {
                type_name: self.type_name().to_string(),
            }),
            Body::Map(entries) | Body::Struct(entries) => Ok(entries.get(segment).cloned()),
            Body::List(items) => Ok(segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .cloned()),
            Body::Union { key, variant } => {
                if segment == "*" || segment == key {
                    Ok(Some(variant.clone()))
                } else {
                    Err(NodeError::UnionKeyMismatch {
                        type_name: self.type_name().to_string(),
                        actual: key.clone(),
                        requested: segment.to_string(),
                    })
                }
            }
            Body::Advanced { .. } => self.layout()?.resolve(self, segment),
        }
    }

    /// Property names of a map or struct, or indexes of a list. Advanced
    /// nodes report the keys of their backing node. Each call starts over.
    pub fn keys(&self) -> Result<Keys<'_>, NodeError> {
        match &self.inner.body {
            Body::Map(entries) | Body::Struct(entries) => Ok(Keys {
                inner: KeysInner::Named(entries.keys()),
            }),
            Body::List(items) => Ok(Keys {
                inner: KeysInner::Indexes(0..items.len()),
            }),
            Body::Advanced { backing } => backing.keys(),
            _ => Err(NodeError::NoKeys {
                type_name: self.type_name().to_string(),
            }),
        }
    }

    /// Iterate the bytes in `start..end` in slices of at most
    /// [`READ_CHUNK_SIZE`]. Both bounds are clamped to the data.
    pub fn read(&self, start: usize, end: Option<usize>) -> Result<ByteChunks<'_>, NodeError> {
        let bytes = match &self.inner.body {
            Body::Scalar(Value::Bytes(bytes)) if self.kind() == Kind::Bytes => bytes.as_slice(),
            _ => {
                return Err(NodeError::NotBytes {
                    type_name: self.type_name().to_string(),
                })
            }
        };
        let end = end.unwrap_or(bytes.len()).min(bytes.len());
        let start = start.min(end);
        Ok(ByteChunks {
            remaining: &bytes[start..end],
        })
    }

    // -----------------------------------------------------------------------
    // Advanced layouts
    // -----------------------------------------------------------------------

    /// Call a layout-specific operation on an advanced node.
    pub fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, NodeError> {
        self.layout()?.invoke(self, operation, args)
    }

    fn layout(&self) -> Result<&Arc<dyn AdvancedLayout>, NodeError> {
        match &self.inner.def.shape {
            Shape::Advanced { implementation, .. } => Ok(implementation),
            _ => Err(self.not_advanced()),
        }
    }

    fn not_advanced(&self) -> NodeError {
        NodeError::NotAdvanced {
            type_name: self.type_name().to_string(),
        }
    }
}

fn encode_entries(entries: &IndexMap<String, Node>) -> Result<Value, NodeError> {
    entries
        .iter()
        .map(|(key, node)| Ok((key.clone(), node.encode()?)))
        .collect::<Result<dagtype_core::Map, NodeError>>()
        .map(Value::Map)
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("type", &self.type_name())
            .field("kind", &self.kind())
            .field("nullable", &self.inner.nullable)
            .field("body", &self.inner.body)
            .finish()
    }
}

/// Iterator returned by [`Node::keys`].
pub struct Keys<'a> {
    inner: KeysInner<'a>,
}

enum KeysInner<'a> {
    Named(indexmap::map::Keys<'a, String, Node>),
    Indexes(Range<usize>),
}

impl<'a> Iterator for Keys<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            KeysInner::Named(keys) => keys.next().map(|key| Cow::Borrowed(key.as_str())),
            KeysInner::Indexes(range) => range.next().map(|index| Cow::Owned(index.to_string())),
        }
    }
}

/// Iterator returned by [`Node::read`].
#[derive(Debug, Clone)]
pub struct ByteChunks<'a> {
    remaining: &'a [u8],
}

impl<'a> Iterator for ByteChunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let (chunk, rest) = self
            .remaining
            .split_at(self.remaining.len().min(READ_CHUNK_SIZE));
        self.remaining = rest;
        Some(chunk)
    }
}
