//! Reads items out of ready result handles.

use crate::backend::{Backend, ResultHandle};
use crate::bridge::ReadyResult;
use crate::error::{Error, Result};
use crate::response::{InventoryItem, InventoryResult, ItemList};
use crate::time;
use crate::types::PropertyMap;

/// Reads ready handles into items.
pub(crate) struct ResultReader<'a> {
    backend: &'a dyn Backend,
}

impl<'a> ResultReader<'a> {
    pub(crate) fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
        }
    }

    /// Reads a ready result.
    ///
    /// With `destroy_on_read` the handle is released as soon as the items are extracted.
    /// Otherwise the returned [`InventoryResult`] keeps it until it is dropped. If reading fails
    /// the handle is released either way.
    pub(crate) fn read(
        &self,
        ready: ReadyResult,
        destroy_on_read: bool,
    ) -> Result<InventoryResult> {
        let ReadyResult { handle, expired } = ready;
        let raw = handle.raw();
        let items = self.read_items(raw)?;
        let timestamp = time::timestamp_to_server_time(i64::from(self.backend.result_timestamp(raw)));
        let handle = if destroy_on_read {
            handle.release();
            None
        } else {
            Some(handle)
        };

        Ok(InventoryResult::new(items, expired, timestamp, handle))
    }

    /// Reads the items of a ready handle without taking ownership of it.
    pub(crate) fn read_items(&self, handle: ResultHandle) -> Result<ItemList> {
        let count = self.backend.result_item_count(handle)
            .ok_or(Error::Read("Item count is unavailable"))?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let items = self.backend.result_items(handle, count)
            .ok_or(Error::Read("Items are unavailable"))?;

        if items.len() != count as usize {
            log::debug!("Result {handle:?} reported {count} items but {} were read", items.len());
        }

        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let mut item = InventoryItem::from(item);

                item.properties = Some(self.read_properties(handle, index as u32));
                item
            })
            .collect();

        Ok(items)
    }

    fn read_properties(&self, handle: ResultHandle, index: u32) -> PropertyMap {
        let Some(names) = self.backend.result_item_property(handle, index, None) else {
            return PropertyMap::new();
        };

        names
            .split(',')
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                let value = self.backend.result_item_property(handle, index, Some(name))?;

                Some((name.to_string(), value))
            })
            .collect()
    }
}
