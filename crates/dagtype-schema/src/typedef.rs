//! # Compiled Types
//!
//! [`TypeDef`] is the immutable descriptor a [`Registry`](crate::Registry)
//! holds for every type name. Descriptors are shared by `Arc`; external
//! types imported from another registry keep pointing at the same
//! allocation, which is what node re-typing checks compare.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::advanced::AdvancedLayout;
use crate::kind::Kind;

/// A compiled type.
pub struct TypeDef {
    pub(crate) name: String,
    pub(crate) kind: Kind,
    pub(crate) shape: Shape,
    /// Builtin base types and anonymous inline definitions accept any
    /// existing node of the same kind.
    pub(crate) open: bool,
}

pub(crate) enum Shape {
    Scalar,
    Link {
        expected: Option<String>,
    },
    Map {
        values: Option<Member>,
    },
    List {
        values: Option<Member>,
    },
    Struct {
        fields: IndexMap<String, FieldSpec>,
        representation: StructRepresentation,
    },
    Union {
        representation: UnionRepresentation,
    },
    Advanced {
        layout: String,
        implementation: Arc<dyn AdvancedLayout>,
    },
}

/// Where a nested value's type comes from.
#[derive(Clone)]
pub(crate) enum Member {
    Named(String),
    Inline(Arc<TypeDef>),
}

pub(crate) struct FieldSpec {
    pub(crate) member: Member,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
}

pub(crate) enum StructRepresentation {
    Map,
    Unsupported(String),
}

pub(crate) enum UnionRepresentation {
    Keyed(IndexMap<String, Member>),
    Unsupported(String),
}

impl TypeDef {
    pub(crate) fn builtin(kind: Kind) -> Self {
        let shape = match kind {
            Kind::Link => Shape::Link { expected: None },
            Kind::Map => Shape::Map { values: None },
            Kind::List => Shape::List { values: None },
            _ => Shape::Scalar,
        };
        Self {
            name: kind.builtin_name().to_string(),
            kind,
            shape,
            open: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The expected target type of a link type, if one was declared.
    pub fn expected_type(&self) -> Option<&str> {
        match &self.shape {
            Shape::Link { expected } => expected.as_deref(),
            _ => None,
        }
    }

    /// Field names of a struct type, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        let fields = match &self.shape {
            Shape::Struct { fields, .. } => Some(fields.keys().map(String::as_str)),
            _ => None,
        };
        fields.into_iter().flatten()
    }

    /// Named types this definition refers to, including through inline
    /// definitions. Link targets are excluded; they resolve lazily.
    pub(crate) fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        fn visit<'a>(member: &'a Member, out: &mut Vec<&'a str>) {
            match member {
                Member::Named(name) => out.push(name.as_str()),
                Member::Inline(def) => def.collect_references(out),
            }
        }
        match &self.shape {
            Shape::Map { values } | Shape::List { values } => {
                if let Some(member) = values {
                    visit(member, out);
                }
            }
            Shape::Struct { fields, .. } => {
                for field in fields.values() {
                    visit(&field.member, out);
                }
            }
            Shape::Union {
                representation: UnionRepresentation::Keyed(members),
            } => {
                for member in members.values() {
                    visit(member, out);
                }
            }
            Shape::Advanced { layout, .. } => out.push(layout.as_str()),
            _ => {}
        }
    }
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
