//! Batched item property updates.

use crate::backend::UpdateHandle;
use crate::enums::TransactionState;
use crate::error::{Error, Result};
use crate::manager::Shared;
use crate::request::PropertyValue;
use crate::response::InventoryResult;
use crate::types::ItemId;
use std::sync::Arc;

/// A batch of property updates, created with
/// [`InventoryManager::start_update_properties`][crate::InventoryManager::start_update_properties].
///
/// Each staged change reports whether the backend accepted it, but nothing is committed until
/// [`PropertyUpdate::submit`] succeeds. A failed submit commits none of the staged changes,
/// including the ones that were accepted.
#[derive(Debug)]
pub struct PropertyUpdate {
    shared: Arc<Shared>,
    handle: UpdateHandle,
    state: TransactionState,
    staged: usize,
}

impl PropertyUpdate {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        let handle = shared.bridge.backend().start_update_properties();

        log::trace!("Opened property update {handle:?}");

        Self {
            shared,
            handle,
            state: TransactionState::Open,
            staged: 0,
        }
    }

    /// The current state. Either [`TransactionState::Open`] or
    /// [`TransactionState::Accumulating`] while the update is held.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Stages setting a property on an item.
    pub fn set_property<T>(&mut self, item_id: ItemId, name: &str, value: T) -> Result<()>
    where
        T: Into<PropertyValue>,
    {
        check_name(name)?;

        let value = value.into();

        if !self.shared.bridge.backend().set_property(self.handle, item_id, name, &value) {
            return Err(Error::PropertyRejected {
                item: item_id,
                name: name.into(),
            });
        }

        self.accept();
        Ok(())
    }

    /// Stages removing a property from an item.
    pub fn remove_property(&mut self, item_id: ItemId, name: &str) -> Result<()> {
        check_name(name)?;

        if !self.shared.bridge.backend().remove_property(self.handle, item_id, name) {
            return Err(Error::PropertyRejected {
                item: item_id,
                name: name.into(),
            });
        }

        self.accept();
        Ok(())
    }

    fn accept(&mut self) {
        self.staged += 1;
        self.state = TransactionState::Accumulating;
    }

    /// Commits the staged changes and waits for the result. The updated items are merged into
    /// the cached items.
    ///
    /// `None` means the batch did not commit and none of the staged changes took effect. The
    /// update cannot be reused either way.
    pub async fn submit(self) -> Option<InventoryResult> {
        let handle = self.handle;

        log::debug!(
            "Property update {handle:?} is {} with {} changes",
            TransactionState::Submitted,
            self.staged,
        );

        let result = self.shared.read_result(
            |backend| backend.submit_update_properties(handle),
            false,
        ).await;

        match result {
            Ok(result) => {
                self.shared.merge_items(&result);
                log::debug!("Property update {handle:?} is {}", TransactionState::Merged);
                Some(result)
            },
            Err(error) => {
                log::debug!("Property update {handle:?} is {}: {error}", TransactionState::Failed);
                None
            },
        }
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Parameter("Property name is empty"));
    }

    Ok(())
}
