//! # Compile Options
//!
//! Everything a [`Registry`](crate::Registry) needs besides the schema
//! description itself: the block source used for link traversal, the
//! advanced layout implementations, external types imported from other
//! registries, and the codec [`Node::block`](crate::Node::block) uses by
//! default.
//!
//! Options are built fluently:
//!
//! ```ignore
//! let options = CompileOptions::new()
//!     .with_block_source(store.clone())
//!     .with_advanced("DataLayout", PassThrough);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dagtype_block::{BlockSource, Multicodec};

use crate::advanced::AdvancedLayout;
use crate::error::CompileError;
use crate::registry::Registry;

/// Environment variable overriding the default block codec.
pub const DEFAULT_CODEC_ENV: &str = "DAGTYPE_DEFAULT_CODEC";

/// Configuration for [`compile`](crate::compile).
#[derive(Clone, Default)]
pub struct CompileOptions {
    pub(crate) block_source: Option<Arc<dyn BlockSource>>,
    pub(crate) default_codec: Multicodec,
    pub(crate) advanced: HashMap<String, Arc<dyn AdvancedLayout>>,
    pub(crate) external: Vec<Registry>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the codec taken from `DAGTYPE_DEFAULT_CODEC` when set.
    pub fn from_env() -> Result<Self, CompileError> {
        let mut options = Self::default();
        if let Ok(codec) = std::env::var(DEFAULT_CODEC_ENV) {
            options.default_codec = codec.trim().parse()?;
        }
        Ok(options)
    }

    pub fn with_block_source(self, source: impl BlockSource + 'static) -> Self {
        self.with_shared_block_source(Arc::new(source))
    }

    pub fn with_shared_block_source(mut self, source: Arc<dyn BlockSource>) -> Self {
        self.block_source = Some(source);
        self
    }

    pub fn with_default_codec(mut self, codec: Multicodec) -> Self {
        self.default_codec = codec;
        self
    }

    /// Register the implementation of the advanced layout `name`.
    pub fn with_advanced(
        mut self,
        name: impl Into<String>,
        layout: impl AdvancedLayout + 'static,
    ) -> Self {
        self.advanced.insert(name.into(), Arc::new(layout));
        self
    }

    /// Make every type of `registry` available by name. Imported types keep
    /// resolving their own references against `registry`.
    pub fn with_types(mut self, registry: &Registry) -> Self {
        self.external.push(registry.clone());
        self
    }

    pub fn default_codec(&self) -> Multicodec {
        self.default_codec
    }

    pub fn has_block_source(&self) -> bool {
        self.block_source.is_some()
    }
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut advanced: Vec<_> = self.advanced.keys().collect();
        advanced.sort();
        f.debug_struct("CompileOptions")
            .field("block_source", &self.block_source.is_some())
            .field("default_codec", &self.default_codec)
            .field("advanced", &advanced)
            .field("external", &self.external.len())
            .finish()
    }
}
