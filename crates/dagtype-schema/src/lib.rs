//! # dagtype-schema — Runtime Types for Content-Addressed Data
//!
//! Compiles a schema description into a [`Registry`] of typed
//! constructors, then builds, validates and encodes [`Node`] trees and
//! resolves slash-separated paths through them, following links into other
//! blocks on demand.
//!
//! ```ignore
//! let registry = compile(&Schema::from_json_str(text)?, CompileOptions::new()
//!     .with_block_source(store.clone()))?;
//! let root = registry.require("A")?.encoder(value)?;
//! let name = root.get("b/c/name").await?;
//! ```
//!
//! ## Modules
//!
//! - [`description`]: serde model of schema descriptions (JSON or YAML).
//! - [`kind`]: the closed set of kinds and their predicates.
//! - [`registry`]: compilation and type lookup.
//! - [`node`]: typed values; validation, encoding, lookup.
//! - [`resolve`]: async path traversal across links.
//! - [`advanced`]: caller-implemented layouts.
//! - [`options`]: compile-time configuration.

pub mod advanced;
pub mod cast;
pub mod description;
pub mod error;
pub mod kind;
pub mod node;
pub mod options;
pub mod registry;
pub mod resolve;
pub mod typedef;

pub use advanced::{AdvancedLayout, PassThrough};
pub use cast::NodeInput;
pub use description::{
    AdvancedDeclaration, FieldDefinition, InlineType, Representation, RepresentationDefinition,
    Schema, TypeDefinition, TypeRef,
};
pub use error::{CompileError, NodeError};
pub use kind::Kind;
pub use node::{ByteChunks, Keys, Node, READ_CHUNK_SIZE};
pub use options::{CompileOptions, DEFAULT_CODEC_ENV};
pub use registry::{compile, Registry, TypeHandle};
pub use resolve::ANY_TYPE;
pub use typedef::TypeDef;
