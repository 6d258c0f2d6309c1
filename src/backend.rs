//! The native inventory surface this crate is layered on.
//!
//! [`Backend`] is implemented by whatever binds to the Steam client library. Calls are
//! synchronous and cheap; anything that takes time completes later through a [`BackendEvent`]
//! pushed into the channel created by [`event_channel`].

use crate::enums::EResult;
use crate::request::{DefinitionAmount, ItemAmount, PropertyValue};
use crate::types::{ApiCallId, DefinitionId, ItemId, OrderId, Quantity, TransactionId};
use steamid_ng::SteamID;
use tokio::sync::mpsc;

/// An opaque handle for an inventory result. Handles are single-use: once released the backend
/// may hand out the same value again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultHandle(pub i32);

impl ResultHandle {
    /// The value the backend uses for "no handle".
    pub const INVALID: ResultHandle = ResultHandle(-1);
}

/// An opaque handle for a batch of property updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UpdateHandle(pub u64);

/// Item details as stored in a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawItem {
    /// The ID of the item.
    pub item_id: ItemId,
    /// The definition of the item.
    pub definition: DefinitionId,
    /// The size of the stack.
    pub quantity: Quantity,
    /// Raw item flags.
    pub flags: u16,
}

/// A definition that has a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionPrice {
    /// The definition.
    pub definition: DefinitionId,
    /// The current price.
    pub price: u64,
    /// The price before any discount.
    pub base_price: u64,
}

/// Notifications delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// A result handle is no longer pending.
    ResultReady {
        /// The handle.
        handle: ResultHandle,
        /// The status reported with the notification.
        result: EResult,
    },
    /// A handle containing the full inventory is ready.
    FullUpdate {
        /// The handle.
        handle: ResultHandle,
    },
    /// Item definitions were loaded or changed.
    DefinitionsUpdated,
    /// Prices requested through [`Backend::request_prices`] arrived.
    PricesReceived {
        /// The call this completes.
        call: ApiCallId,
        /// The status of the call.
        result: EResult,
        /// The currency code prices are in.
        currency: String,
    },
    /// A purchase started through [`Backend::start_purchase`] was created.
    PurchaseStarted {
        /// The call this completes.
        call: ApiCallId,
        /// The status of the call.
        result: EResult,
        /// The order ID.
        order_id: OrderId,
        /// The transaction ID.
        transaction_id: TransactionId,
    },
}

/// Sending half of the backend notification channel. Notifications can be sent from any thread
/// without blocking.
pub type EventSender = mpsc::UnboundedSender<BackendEvent>;
/// Receiving half of the backend notification channel.
pub type EventReceiver = mpsc::UnboundedReceiver<BackendEvent>;

/// Creates the channel the backend delivers notifications through.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// The native inventory capability.
///
/// Methods issuing a result handle return `None` when the backend refuses the call. A returned
/// handle is owned by the caller and must be released with [`Backend::destroy_result`] exactly
/// once.
pub trait Backend: Send + Sync {
    /// Requests every item the user owns. Also produces a [`BackendEvent::FullUpdate`].
    fn get_all_items(&self) -> Option<ResultHandle>;

    /// Requests specific items.
    fn get_items_by_id(&self, item_ids: &[ItemId]) -> Option<ResultHandle>;

    /// Generates items. Only works for developers or on test accounts.
    fn generate_items(&self, items: &[DefinitionAmount]) -> Option<ResultHandle>;

    /// Grants every promo item the user is eligible for.
    fn grant_promo_items(&self) -> Option<ResultHandle>;

    /// Grants specific promo items.
    fn add_promo_items(&self, definitions: &[DefinitionId]) -> Option<ResultHandle>;

    /// Triggers a playtime drop from a generator definition.
    fn trigger_item_drop(&self, definition: DefinitionId) -> Option<ResultHandle>;

    /// Consumes `destroy` to create `generate`.
    fn exchange_items(
        &self,
        generate: &[DefinitionAmount],
        destroy: &[ItemAmount],
    ) -> Option<ResultHandle>;

    /// Consumes some of a stack.
    fn consume_item(&self, item_id: ItemId, quantity: u32) -> Option<ResultHandle>;

    /// Moves quantity from one stack to another. With no destination a new stack is created.
    fn transfer_item_quantity(
        &self,
        source: ItemId,
        quantity: u32,
        destination: Option<ItemId>,
    ) -> Option<ResultHandle>;

    /// Deserializes a result serialized with [`Backend::serialize_result`]. The signature is
    /// checked by the backend.
    fn deserialize_result(&self, buffer: &[u8]) -> Option<ResultHandle>;

    /// Gets the status of a handle. [`EResult::Pending`] while it is not ready.
    fn result_status(&self, handle: ResultHandle) -> EResult;

    /// Gets the number of items in a ready result.
    fn result_item_count(&self, handle: ResultHandle) -> Option<u32>;

    /// Reads up to `count` items from a ready result.
    fn result_items(&self, handle: ResultHandle, count: u32) -> Option<Vec<RawItem>>;

    /// Reads a property of the item at `index`. With no `name` this returns a comma-separated
    /// list of the available property names.
    fn result_item_property(
        &self,
        handle: ResultHandle,
        index: u32,
        name: Option<&str>,
    ) -> Option<String>;

    /// The server time the result was generated at, in seconds since the epoch.
    fn result_timestamp(&self, handle: ResultHandle) -> u32;

    /// Checks whether the result belongs to `steamid`.
    fn check_result_steam_id(&self, handle: ResultHandle, steamid: SteamID) -> bool;

    /// Serializes a result so it can be sent to another user.
    fn serialize_result(&self, handle: ResultHandle) -> Option<Vec<u8>>;

    /// Releases a handle.
    fn destroy_result(&self, handle: ResultHandle);

    /// Starts loading item definitions. Completion is signalled by
    /// [`BackendEvent::DefinitionsUpdated`].
    fn load_item_definitions(&self) -> bool;

    /// Enumerates definition IDs. With no buffer this returns how many there are; with a buffer
    /// it fills it and returns how many were written. `None` if no definitions are available.
    fn item_definition_ids(&self, ids: Option<&mut [DefinitionId]>) -> Option<u32>;

    /// Reads a definition property. With no `name` this returns a comma-separated list of the
    /// available property names.
    fn item_definition_property(
        &self,
        definition: DefinitionId,
        name: Option<&str>,
    ) -> Option<String>;

    /// Requests prices. Completion is signalled by [`BackendEvent::PricesReceived`].
    fn request_prices(&self) -> Option<ApiCallId>;

    /// Reads every definition that has a price. Only available after prices were received.
    fn items_with_prices(&self) -> Option<Vec<DefinitionPrice>>;

    /// Starts a purchase. Completion is signalled by [`BackendEvent::PurchaseStarted`].
    fn start_purchase(&self, items: &[DefinitionAmount]) -> Option<ApiCallId>;

    /// Opens a batch of property updates.
    fn start_update_properties(&self) -> UpdateHandle;

    /// Stages setting a property.
    fn set_property(
        &self,
        update: UpdateHandle,
        item_id: ItemId,
        name: &str,
        value: &PropertyValue,
    ) -> bool;

    /// Stages removing a property.
    fn remove_property(&self, update: UpdateHandle, item_id: ItemId, name: &str) -> bool;

    /// Commits a batch of property updates.
    fn submit_update_properties(&self, update: UpdateHandle) -> Option<ResultHandle>;
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("Backend")
    }
}
