//! Builder for constructing an [`EventManager`].

use std::sync::Arc;

use crate::config::EventConfig;
use crate::core::manager::EventManager;
use crate::events::EventDefinitionResolver;
use crate::transport::EventTransport;

/// Builder for an [`EventManager`].
///
/// The definition resolver is required (collection is meaningless without a
/// declared-type schema to validate against) and therefore a constructor
/// argument; the transport is optional — a manager without one collects and
/// then discards each batch at send time.
///
/// ## Example
/// ```rust
/// use eventpipe::{EventConfig, EventManager, StaticResolver};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = StaticResolver::new().declare("FileSystem", "mountChanged");
/// let manager = EventManager::builder(EventConfig::default(), resolver).build();
/// manager.start();
/// // ...
/// manager.shutdown().await;
/// # }
/// ```
pub struct EventManagerBuilder {
    cfg: EventConfig,
    resolver: Arc<dyn EventDefinitionResolver>,
    transport: Option<Arc<dyn EventTransport>>,
}

impl EventManagerBuilder {
    /// Creates a builder; prefer [`EventManager::builder`].
    pub(crate) fn new(cfg: EventConfig, resolver: Arc<dyn EventDefinitionResolver>) -> Self {
        Self {
            cfg,
            resolver,
            transport: None,
        }
    }

    /// Sets the transport that receives closed batches.
    pub fn with_transport(self, transport: impl EventTransport) -> Self {
        self.with_transport_arc(Arc::new(transport))
    }

    /// Sets an already-shared transport.
    pub fn with_transport_arc(mut self, transport: Arc<dyn EventTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the manager in its `new` (not yet started) state.
    pub fn build(self) -> Arc<EventManager> {
        Arc::new(EventManager::new_internal(
            self.cfg,
            self.resolver,
            self.transport,
        ))
    }
}
