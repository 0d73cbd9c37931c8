//! # Type Registry — Schema Compilation
//!
//! [`compile`] turns a [`Schema`] into a [`Registry`]: a name-indexed set of
//! immutable [`TypeDef`]s, seeded with the builtin base types and any
//! external types, plus the block source and codec its nodes use.
//!
//! ## Invariants
//!
//! - Every name maps to exactly one descriptor. Redefinitions, builtin
//!   names and names already imported from another registry are rejected.
//! - Every named reference reachable from a local type (struct fields, map
//!   and list value types, union members, advanced backing types) resolves
//!   once compilation succeeds. Link target types are looked up lazily when
//!   a link is followed.
//! - Types are compiled in declaration order. An advanced type's backing
//!   type must be declared before it.
//! - A registry never changes after `compile` returns; it is shared by
//!   `Arc` between every node it creates and is safe to use from any thread.

use std::fmt;
use std::sync::Arc;

use dagtype_block::{BlockSource, Multicodec};
use dagtype_core::Value;
use indexmap::IndexMap;

use crate::advanced::AdvancedLayout;
use crate::cast::{self, NodeInput};
use crate::description::{
    InlineType, Representation, RepresentationDefinition, Schema, TypeDefinition, TypeRef,
};
use crate::error::{CompileError, NodeError};
use crate::kind::{Kind, BUILTIN_KINDS, RESERVED_NAMES};
use crate::node::Node;
use crate::options::CompileOptions;
use crate::typedef::{FieldSpec, Member, Shape, StructRepresentation, TypeDef, UnionRepresentation};

/// Compile a schema description.
pub fn compile(schema: &Schema, options: CompileOptions) -> Result<Registry, CompileError> {
    let CompileOptions {
        block_source,
        default_codec,
        advanced,
        external,
    } = options;

    let mut types: IndexMap<String, Entry> = IndexMap::new();
    for kind in BUILTIN_KINDS {
        types.insert(
            kind.builtin_name().to_string(),
            Entry {
                def: Arc::new(TypeDef::builtin(kind)),
                home: None,
            },
        );
    }

    for registry in &external {
        for (name, entry) in registry.inner.types.iter() {
            if RESERVED_NAMES.contains(&name.as_str()) {
                continue;
            }
            match types.get(name) {
                Some(existing) if Arc::ptr_eq(&existing.def, &entry.def) => {}
                Some(_) => return Err(CompileError::NameConflict(name.clone())),
                None => {
                    let home = entry.home.clone().unwrap_or_else(|| registry.clone());
                    types.insert(
                        name.clone(),
                        Entry {
                            def: Arc::clone(&entry.def),
                            home: Some(home),
                        },
                    );
                }
            }
        }
    }

    for (name, definition) in &schema.types {
        if RESERVED_NAMES.contains(&name.as_str()) || types.contains_key(name) {
            return Err(CompileError::NameConflict(name.clone()));
        }
        let def = compile_type(name, definition, schema, &advanced, &types)?;
        tracing::debug!(type_name = %name, kind = %def.kind, "compiled type");
        types.insert(
            name.clone(),
            Entry {
                def: Arc::new(def),
                home: None,
            },
        );
    }

    for (name, entry) in types.iter().filter(|(_, entry)| entry.home.is_none()) {
        if let Some(missing) = entry
            .def
            .references()
            .into_iter()
            .find(|reference| !types.contains_key(*reference))
        {
            return Err(CompileError::UnresolvedType {
                referrer: name.clone(),
                reference: missing.to_string(),
            });
        }
    }

    tracing::debug!(
        types = types.len(),
        external = external.len(),
        codec = %default_codec,
        "schema compiled"
    );

    Ok(Registry {
        inner: Arc::new(RegistryInner {
            types,
            block_source,
            default_codec,
        }),
    })
}

fn compile_type(
    name: &str,
    definition: &TypeDefinition,
    schema: &Schema,
    advanced: &std::collections::HashMap<String, Arc<dyn AdvancedLayout>>,
    types: &IndexMap<String, Entry>,
) -> Result<TypeDef, CompileError> {
    let kind = Kind::from_declared(&definition.kind).ok_or_else(|| CompileError::UnknownKind {
        type_name: name.to_string(),
        kind: definition.kind.clone(),
    })?;
    let representation = definition
        .representation
        .as_ref()
        .and_then(RepresentationDefinition::strategy);

    if let Some(Representation::Advanced(layout)) = representation {
        if !schema.advanced.contains_key(layout) {
            return Err(CompileError::MissingAdvancedLayout(layout.to_string()));
        }
        if !types.contains_key(layout) {
            return Err(CompileError::MissingAdvancedSchema(layout.to_string()));
        }
        let implementation = advanced
            .get(layout)
            .cloned()
            .ok_or_else(|| CompileError::MissingAdvancedImplementation(layout.to_string()))?;
        return Ok(TypeDef {
            name: name.to_string(),
            kind: Kind::Advanced,
            shape: Shape::Advanced {
                layout: layout.to_string(),
                implementation,
            },
            open: false,
        });
    }

    let shape = match kind {
        Kind::Link => Shape::Link {
            expected: definition.expected_type.clone(),
        },
        Kind::Map => {
            check_key_type(name, definition.key_type.as_deref())?;
            Shape::Map {
                values: definition
                    .value_type
                    .as_ref()
                    .map(|t| member(name, t))
                    .transpose()?,
            }
        }
        Kind::List => Shape::List {
            values: definition
                .value_type
                .as_ref()
                .map(|t| member(name, t))
                .transpose()?,
        },
        Kind::Struct => {
            let fields = definition
                .fields
                .iter()
                .map(|(field, spec)| {
                    Ok((
                        field.clone(),
                        FieldSpec {
                            member: member(name, &spec.type_ref)?,
                            optional: spec.optional,
                            nullable: spec.nullable,
                        },
                    ))
                })
                .collect::<Result<IndexMap<_, _>, CompileError>>()?;
            let representation = match representation {
                None | Some(Representation::Map) => StructRepresentation::Map,
                Some(Representation::Keyed(_)) => StructRepresentation::Unsupported("keyed".into()),
                Some(Representation::Advanced(layout)) | Some(Representation::Other(layout)) => {
                    StructRepresentation::Unsupported(layout.to_string())
                }
            };
            Shape::Struct {
                fields,
                representation,
            }
        }
        Kind::Union => {
            let representation = match representation {
                Some(Representation::Keyed(members)) => UnionRepresentation::Keyed(
                    members
                        .iter()
                        .map(|(key, t)| Ok((key.clone(), member(name, t)?)))
                        .collect::<Result<IndexMap<_, _>, CompileError>>()?,
                ),
                Some(Representation::Map) => UnionRepresentation::Unsupported("map".into()),
                Some(Representation::Advanced(other)) | Some(Representation::Other(other)) => {
                    UnionRepresentation::Unsupported(other.to_string())
                }
                None => UnionRepresentation::Unsupported("unspecified".into()),
            };
            Shape::Union { representation }
        }
        Kind::Int
        | Kind::Float
        | Kind::String
        | Kind::Bool
        | Kind::Null
        | Kind::Bytes
        | Kind::Advanced => Shape::Scalar,
    };

    Ok(TypeDef {
        name: name.to_string(),
        kind,
        shape,
        open: false,
    })
}

/// Compile a type reference. Inline definitions become anonymous open types
/// named after their builtin kind.
fn member(owner: &str, type_ref: &TypeRef) -> Result<Member, CompileError> {
    let (kind, shape) = match type_ref {
        TypeRef::Named(name) => return Ok(Member::Named(name.clone())),
        TypeRef::Inline(InlineType::Link { expected_type }) => (
            Kind::Link,
            Shape::Link {
                expected: expected_type.clone(),
            },
        ),
        TypeRef::Inline(InlineType::Map {
            key_type,
            value_type,
        }) => {
            check_key_type(owner, key_type.as_deref())?;
            (
                Kind::Map,
                Shape::Map {
                    values: value_type.as_deref().map(|t| member(owner, t)).transpose()?,
                },
            )
        }
        TypeRef::Inline(InlineType::List { value_type }) => (
            Kind::List,
            Shape::List {
                values: value_type.as_deref().map(|t| member(owner, t)).transpose()?,
            },
        ),
    };
    Ok(Member::Inline(Arc::new(TypeDef {
        name: kind.builtin_name().to_string(),
        kind,
        shape,
        open: true,
    })))
}

fn check_key_type(owner: &str, key_type: Option<&str>) -> Result<(), CompileError> {
    match key_type {
        None | Some("String") => Ok(()),
        Some(other) => Err(CompileError::UnsupportedKeyType {
            type_name: owner.to_string(),
            key_type: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The compiled, immutable set of types. Cheap to clone.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    types: IndexMap<String, Entry>,
    block_source: Option<Arc<dyn BlockSource>>,
    default_codec: Multicodec,
}

#[derive(Clone)]
struct Entry {
    def: Arc<TypeDef>,
    /// The registry an imported type was compiled in. `None` for local types.
    home: Option<Registry>,
}

impl Registry {
    /// Same as [`compile`].
    pub fn compile(schema: &Schema, options: CompileOptions) -> Result<Self, CompileError> {
        compile(schema, options)
    }

    /// Look up a type by name.
    pub fn get(&self, name: &str) -> Option<TypeHandle> {
        self.inner.types.get(name).map(|entry| TypeHandle {
            registry: entry.home.clone().unwrap_or_else(|| self.clone()),
            def: Arc::clone(&entry.def),
        })
    }

    /// Look up a type by name, failing with [`NodeError::UnknownType`].
    pub fn require(&self, name: &str) -> Result<TypeHandle, NodeError> {
        self.get(name)
            .ok_or_else(|| NodeError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.types.contains_key(name)
    }

    /// Every type name, builtins first, then imports, then the schema's own
    /// types in declaration order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.inner.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.types.is_empty()
    }

    pub fn block_source(&self) -> Option<&Arc<dyn BlockSource>> {
        self.inner.block_source.as_ref()
    }

    pub fn default_codec(&self) -> Multicodec {
        self.inner.default_codec
    }

    /// Build an untyped value as a node of the builtin type for its kind.
    pub fn infer(&self, value: Value) -> Result<Node, NodeError> {
        self.require(Kind::infer(&value).builtin_name())?
            .build(value, false)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.inner.types.keys().collect::<Vec<_>>())
            .field("block_source", &self.inner.block_source.is_some())
            .field("default_codec", &self.inner.default_codec)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TypeHandle
// ---------------------------------------------------------------------------

/// A compiled type together with the registry its nodes resolve names in.
#[derive(Clone)]
pub struct TypeHandle {
    registry: Registry,
    def: Arc<TypeDef>,
}

impl TypeHandle {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn kind(&self) -> Kind {
        self.def.kind
    }

    pub fn definition(&self) -> &TypeDef {
        &self.def
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Build a node without validating it.
    ///
    /// An existing node is returned unchanged when it already has this
    /// type. Builtin base types also accept any node of their kind. Every
    /// other node input fails with [`NodeError::CannotRetype`].
    pub fn create(&self, input: impl Into<NodeInput>) -> Result<Node, NodeError> {
        cast::create(&self.registry, &self.def, input.into())
    }

    /// Build a node and validate it.
    pub fn encoder(&self, input: impl Into<NodeInput>) -> Result<Node, NodeError> {
        let node = self.create(input)?;
        node.validate()?;
        Ok(node)
    }

    /// Build a node from decoded block data and validate it.
    pub fn decoder(&self, input: impl Into<NodeInput>) -> Result<Node, NodeError> {
        self.encoder(input)
    }

    pub(crate) fn build(&self, value: Value, nullable: bool) -> Result<Node, NodeError> {
        cast::build(&self.registry, &self.def, value, nullable)
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeHandle").field(&self.def.name).finish()
    }
}
