use std::path::Path;
use std::sync::Arc;

use crate::core::{CoreSbr, DEFAULT_K};
use crate::error::Result;
use crate::index::InverseIndex;
use crate::ingest::{PrefixSource, TripletSource};
use crate::warn::{SilentSink, WarnSink};

// Add logging
use log::{debug, info};

pub struct CoreSbrBuilder {
    // Number of ranked candidates behind the should clause of a retrieval
    default_k: usize,
    // Build the item index at the end of every ingest instead of on first use
    eager_transpose: bool,
    sink: Arc<dyn WarnSink>,
}

impl Default for CoreSbrBuilder {
    fn default() -> Self {
        debug!("Creating CoreSbrBuilder with default parameters");
        Self {
            default_k: DEFAULT_K,
            eager_transpose: false,
            sink: Arc::new(SilentSink),
        }
    }
}

impl CoreSbrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_k(mut self, k: usize) -> Self {
        info!("Setting default k: {}", k);
        self.default_k = k;
        self
    }

    /// Build the item-keyed index right after ingest. Useful when the facade
    /// is shared between threads from the start.
    pub fn with_eager_transpose(mut self, eager: bool) -> Self {
        info!("Setting eager transpose: {}", eager);
        self.eager_transpose = eager;
        self
    }

    /// Where query diagnostics go when a query asks for warnings.
    pub fn with_warn_sink(mut self, sink: Arc<dyn WarnSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Empty facade.
    pub fn build(self) -> CoreSbr {
        debug!(
            "Build configuration: default_k={}, eager_transpose={}",
            self.default_k, self.eager_transpose
        );
        CoreSbr::with_config(self.default_k, self.eager_transpose, self.sink)
    }

    /// Facade over a prebuilt tag-keyed index.
    pub fn build_from_index(self, index: InverseIndex) -> CoreSbr {
        let mut sbr = self.build();
        sbr.set_tag_inverse_index(index);
        sbr
    }

    pub fn build_from_source<S: TripletSource + ?Sized>(self, source: &S) -> Result<CoreSbr> {
        let mut sbr = self.build();
        sbr.ingest(source)?;
        Ok(sbr)
    }

    pub fn build_from_prefix<P: AsRef<Path>>(self, prefix: P) -> Result<CoreSbr> {
        let source = PrefixSource::new(prefix)?;
        self.build_from_source(&source)
    }
}
