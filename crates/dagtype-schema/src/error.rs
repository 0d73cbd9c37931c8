//! # Error Types — Compilation and Node Failures
//!
//! Two families, matching the two phases of the engine:
//!
//! - [`CompileError`]: raised once, while turning a schema description into
//!   a [`Registry`](crate::Registry). A schema that compiles never raises
//!   these again.
//! - [`NodeError`]: raised by node construction, validation, encoding,
//!   property resolution and path traversal.

use dagtype_block::BlockError;
use dagtype_core::Cid;
use thiserror::Error;

/// Errors raised while compiling a schema description.
#[derive(Error, Debug)]
pub enum CompileError {
    /// A type name was defined twice, or shadows a builtin or external type.
    #[error("name conflict, cannot define {0} twice")]
    NameConflict(String),

    /// The declared kind is not one the engine knows.
    #[error("unknown kind {kind} for type {type_name}")]
    UnknownKind {
        /// The type being compiled.
        type_name: String,
        /// The kind string from the description.
        kind: String,
    },

    /// A type uses an advanced layout that the schema never declares.
    #[error("missing advanced layout {0}")]
    MissingAdvancedLayout(String),

    /// An advanced layout is declared but no type of the same name was
    /// compiled before the type that uses it.
    #[error("missing advanced layout schema {0}")]
    MissingAdvancedSchema(String),

    /// An advanced layout is declared but the caller supplied no
    /// implementation for it.
    #[error("missing implementation of advanced layout {0}")]
    MissingAdvancedImplementation(String),

    /// A field, value type or union member names a type that does not exist.
    #[error("type {referrer} references undefined type {reference}")]
    UnresolvedType {
        /// The type holding the reference.
        referrer: String,
        /// The name that could not be resolved.
        reference: String,
    },

    /// Maps are keyed by strings only.
    #[error("type {type_name} uses unsupported map key type {key_type}")]
    UnsupportedKeyType { type_name: String, key_type: String },

    /// The description could not be parsed.
    #[error("invalid schema description: {0}")]
    Description(String),

    /// Invalid codec in configuration.
    #[error(transparent)]
    Codec(#[from] BlockError),
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Description(err.to_string())
    }
}

impl From<serde_yaml::Error> for CompileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Description(err.to_string())
    }
}

/// Errors raised by nodes and the path resolver.
#[derive(Error, Debug)]
pub enum NodeError {
    /// A value does not satisfy its type's kind predicate.
    #[error("{value} is not a valid {type_name}")]
    KindMismatch { type_name: String, value: String },

    /// A struct lacks a non-optional field.
    #[error("{type_name} is missing required field {field}")]
    MissingField { type_name: String, field: String },

    /// A non-nullable struct field holds null.
    #[error("field {field} of {type_name} is not nullable")]
    NotNullable { type_name: String, field: String },

    /// A keyed union value must carry exactly one key.
    #[error("union {type_name} requires exactly one key, found {found}")]
    UnionKeyCount { type_name: String, found: usize },

    /// A keyed union value must be a map.
    #[error("union {type_name} requires a map, found {found}")]
    UnionNotMap {
        type_name: String,
        found: &'static str,
    },

    /// The union value's key is not one of the declared variants.
    #[error("union {type_name} has no variant {key}")]
    UnknownUnionKey { type_name: String, key: String },

    /// The union value holds one variant and a different one was requested.
    #[error("union {type_name} contains {actual} and not {requested}")]
    UnionKeyMismatch {
        type_name: String,
        actual: String,
        requested: String,
    },

    /// The representation strategy is recognised but has no implementation.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A node of one type was passed where a different type was requested.
    #[error("cannot re-type node of type {from} as {to}")]
    CannotRetype { from: String, to: String },

    /// A lookup named a type that the registry does not hold.
    #[error("no type named {0}")]
    UnknownType(String),

    /// Property lookup found nothing.
    #[error("{type_name} does not contain property {property}")]
    MissingProperty { type_name: String, property: String },

    /// Scalars and links have no properties.
    #[error("cannot look up properties of {type_name}")]
    NotTraversable { type_name: String },

    /// Only maps, lists and advanced nodes backed by them have keys.
    #[error("{type_name} has no keys")]
    NoKeys { type_name: String },

    /// Only bytes nodes can be read.
    #[error("{type_name} is not a bytes node")]
    NotBytes { type_name: String },

    /// Operation requested on a node that has no advanced layout.
    #[error("{type_name} is not an advanced node")]
    NotAdvanced { type_name: String },

    /// The advanced layout does not provide the requested operation.
    #[error("advanced layout {type_name} has no operation {operation}")]
    UnknownOperation {
        type_name: String,
        operation: String,
    },

    /// A link was reached during traversal and no block source is configured.
    #[error("cannot perform get() without get_block")]
    MissingBlockSource,

    /// The block source answered and does not have the block.
    #[error("block {0} not found")]
    BlockNotFound(Cid),

    /// The block source failed, or the block did not decode.
    #[error(transparent)]
    Block(#[from] BlockError),
}
