use super::InventoryItem;
use crate::enums::HandleState;
use crate::handle::OwnedHandle;
use crate::time::ServerTime;
use bytes::Bytes;
use steamid_ng::SteamID;

/// The items returned by an inventory operation.
///
/// While this is alive it may still hold the underlying result handle, which is released when
/// it is dropped or when [`InventoryResult::into_items`] is called. Drop results promptly once
/// you are done inspecting them.
///
/// Results deserialized from data another user sent must be checked with
/// [`InventoryResult::belongs_to`] before trusting that the items are owned by that user.
#[derive(Debug)]
pub struct InventoryResult {
    items: Vec<InventoryItem>,
    expired: bool,
    timestamp: ServerTime,
    handle: Option<OwnedHandle>,
}

impl InventoryResult {
    pub(crate) fn new(
        items: Vec<InventoryItem>,
        expired: bool,
        timestamp: ServerTime,
        handle: Option<OwnedHandle>,
    ) -> Self {
        Self {
            items,
            expired,
            timestamp,
            handle,
        }
    }

    /// The items.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Takes the items, releasing the handle.
    pub fn into_items(self) -> Vec<InventoryItem> {
        self.items
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The result contains no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The data may be stale. Expired results are otherwise complete; whether to accept them or
    /// request a fresh result is up to you.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// When the result was generated on Steam's servers.
    pub fn timestamp(&self) -> ServerTime {
        self.timestamp
    }

    /// The state of the underlying handle. [`HandleState::Invalid`] once released.
    pub fn handle_state(&self) -> HandleState {
        self.handle.as_ref().map_or(HandleState::Invalid, OwnedHandle::state)
    }

    /// Whether the handle was already released. Released results can no longer be checked or
    /// serialized.
    pub fn is_released(&self) -> bool {
        self.handle_state() == HandleState::Invalid
    }

    /// Checks whether the result belongs to `steamid`. Always `false` once released.
    pub fn belongs_to(&self, steamid: SteamID) -> bool {
        self.handle.as_ref().map_or(false, |handle| {
            handle.backend().check_result_steam_id(handle.raw(), steamid)
        })
    }

    /// Serializes the result so it can be sent to another user, who can pass it to
    /// [`InventoryManager::deserialize`][crate::InventoryManager::deserialize].
    pub fn serialize(&self) -> Option<Bytes> {
        let handle = self.handle.as_ref()?;

        handle.backend().serialize_result(handle.raw()).map(Bytes::from)
    }
}
