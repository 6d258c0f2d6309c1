use std::time::Duration;

/// Options for an [`InventoryManager`][crate::InventoryManager].
#[derive(Debug, Clone, Copy)]
pub struct InventoryOptions {
    /// How long to wait for a result handle or call result before giving up. Default is 60
    /// seconds.
    pub result_timeout: Duration,
    /// How long [`InventoryManager::wait_for_definitions`][crate::InventoryManager::wait_for_definitions]
    /// waits when no timeout is given. Default is 30 seconds.
    pub definitions_timeout: Duration,
    /// How often to check whether definitions arrived while waiting for them. Default is 10
    /// milliseconds.
    pub definitions_poll_interval: Duration,
    /// Release handles that were abandoned after a timeout once their ready notification
    /// eventually arrives. Without this they are never released. Default is `false`.
    pub reclaim_abandoned_results: bool,
    /// How many events a slow subscriber can fall behind before missing some. Default is 16.
    pub event_capacity: usize,
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            result_timeout: Duration::from_secs(60),
            definitions_timeout: Duration::from_secs(30),
            definitions_poll_interval: Duration::from_millis(10),
            reclaim_abandoned_results: false,
            event_capacity: 16,
        }
    }
}
