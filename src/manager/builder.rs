use super::{InventoryManager, InventoryOptions};
use crate::backend::{Backend, EventReceiver};
use std::sync::Arc;
use std::time::Duration;

/// Builder for constructing an [`InventoryManager`].
#[derive(Debug)]
pub struct InventoryManagerBuilder {
    pub backend: Arc<dyn Backend>,
    pub events: EventReceiver,
    pub options: InventoryOptions,
}

impl InventoryManagerBuilder {
    pub fn new(
        backend: Arc<dyn Backend>,
        events: EventReceiver,
    ) -> Self {
        Self {
            backend,
            events,
            options: InventoryOptions::default(),
        }
    }

    pub fn options(mut self, options: InventoryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn result_timeout(mut self, timeout: Duration) -> Self {
        self.options.result_timeout = timeout;
        self
    }

    pub fn definitions_timeout(mut self, timeout: Duration) -> Self {
        self.options.definitions_timeout = timeout;
        self
    }

    /// Release abandoned handles when their late notification arrives.
    pub fn reclaim_abandoned_results(mut self, reclaim: bool) -> Self {
        self.options.reclaim_abandoned_results = reclaim;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.options.event_capacity = capacity;
        self
    }

    /// Builds the manager. Must be called from within a tokio runtime.
    pub fn build(self) -> InventoryManager {
        InventoryManager::from(self)
    }
}
