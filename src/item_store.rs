//! The cached list of items the user owns.

use crate::response::InventoryItem;
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;

/// Holds the user's items as of the last full refresh, patched by partial results.
///
/// Writers swap in a new list, so a snapshot taken by a reader is never torn. Merging only
/// replaces items that are already cached. Items that appear for the first time in a partial
/// result (newly generated or dropped items) are not added until the next full refresh.
#[derive(Debug, Clone, Default)]
pub(crate) struct ItemStore {
    items: Arc<RwLock<Arc<Vec<InventoryItem>>>>,
}

impl ItemStore {
    /// The current items.
    pub(crate) fn snapshot(&self) -> Arc<Vec<InventoryItem>> {
        Arc::clone(&self.items.read())
    }

    /// Replaces every item.
    pub(crate) fn replace_all(&self, items: Vec<InventoryItem>) -> Arc<Vec<InventoryItem>> {
        let items = Arc::new(items);

        *self.items.write() = Arc::clone(&items);
        items
    }

    /// Replaces cached items that share an ID with an item in `items`. Returns how many
    /// were replaced.
    pub(crate) fn merge(&self, items: &[InventoryItem]) -> usize {
        if items.is_empty() {
            return 0;
        }

        // The write lock is held while building the new list so concurrent merges cannot
        // drop each other's changes.
        let mut current = self.items.write();
        let mut updates = items
            .iter()
            .map(|item| (item.id, item))
            .collect::<HashMap<_, _>>();
        let mut replaced = 0;
        let merged = current
            .iter()
            .map(|item| match updates.remove(&item.id) {
                Some(update) => {
                    replaced += 1;
                    update.clone()
                },
                None => item.clone(),
            })
            .collect::<Vec<_>>();

        if !updates.is_empty() {
            log::debug!("{} merged items are not cached and were skipped", updates.len());
        }

        if replaced > 0 {
            *current = Arc::new(merged);
        }

        replaced
    }
}
