mod builder;
mod event_loop;
mod options;

pub use builder::InventoryManagerBuilder;
pub use options::InventoryOptions;

use event_loop::EventLoop;
use crate::backend::{Backend, EventReceiver, ResultHandle};
use crate::bridge::{AsyncBridge, CallResult};
use crate::definition_cache::DefinitionCache;
use crate::error::{Error, Result};
use crate::item_store::ItemStore;
use crate::reader::ResultReader;
use crate::request::{DefinitionAmount, ItemAmount};
use crate::response::{InventoryItem, InventoryResult, ItemDefinition, PurchaseResult};
use crate::transaction::PropertyUpdate;
use crate::types::{DefinitionId, ItemId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Events broadcast to subscribers after the cached state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// The definition catalog was replaced.
    DefinitionsUpdated,
    /// The cached items changed. Contains the new items.
    ItemsUpdated(Arc<Vec<InventoryItem>>),
}

/// State shared between the manager, its event loop and open property updates.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) bridge: AsyncBridge,
    pub(crate) definitions: DefinitionCache,
    pub(crate) items: ItemStore,
    pub(crate) options: InventoryOptions,
    /// The currency prices were last received in.
    currency: RwLock<Option<String>>,
    /// Handles from fire-and-forget refreshes. These are released by the event loop.
    detached: Mutex<HashSet<ResultHandle>>,
    events: broadcast::Sender<InventoryEvent>,
}

impl Shared {
    fn backend(&self) -> &dyn Backend {
        self.bridge.backend().as_ref()
    }

    /// Starts a call, waits for its handle and reads it.
    pub(crate) async fn read_result<F>(
        &self,
        start: F,
        destroy_on_read: bool,
    ) -> Result<InventoryResult>
    where
        F: FnOnce(&dyn Backend) -> Option<ResultHandle>,
    {
        let ready = self.bridge.await_result(start, self.options.result_timeout).await?;

        ResultReader::new(self.backend()).read(ready, destroy_on_read)
    }

    /// Like [`Shared::read_result`], then patches the cached items with the result.
    async fn read_merged<F>(&self, start: F) -> Result<InventoryResult>
    where
        F: FnOnce(&dyn Backend) -> Option<ResultHandle>,
    {
        let result = self.read_result(start, false).await?;

        self.merge_items(&result);
        Ok(result)
    }

    pub(crate) fn merge_items(&self, result: &InventoryResult) {
        if self.items.merge(result.items()) > 0 {
            self.broadcast(InventoryEvent::ItemsUpdated(self.items.snapshot()));
        }
    }

    pub(crate) fn replace_items(&self, items: Vec<InventoryItem>) {
        let items = self.items.replace_all(items);

        log::debug!("Replaced cached items with {} items", items.len());
        self.broadcast(InventoryEvent::ItemsUpdated(items));
    }

    pub(crate) fn broadcast(&self, event: InventoryEvent) {
        // Having no subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Logs the reason an operation did not happen and converts it to absence.
fn absent_on_error<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            log::debug!("{operation} did not complete: {error}");
            None
        },
    }
}

fn check_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(Error::Parameter("Quantity must be greater than zero"));
    }

    Ok(())
}

/// Manager for the current user's inventory.
///
/// Awaited operations resolve to `None` when the operation did not happen: the backend refused
/// it, the result failed, or it timed out. The reason is logged at the `debug` level. A timed
/// out operation may still complete on Steam later.
///
/// Cloning is cheap and clones share the same caches. The event loop consuming backend
/// notifications stops when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InventoryManager {
    shared: Arc<Shared>,
    _event_loop: Arc<EventLoop>,
}

impl InventoryManager {
    /// Creates a new [`InventoryManager`] with default options. Must be called from within a
    /// tokio runtime.
    pub fn new(
        backend: Arc<dyn Backend>,
        events: EventReceiver,
    ) -> Self {
        Self::builder(backend, events).build()
    }

    /// Builder for constructing an [`InventoryManager`].
    pub fn builder(
        backend: Arc<dyn Backend>,
        events: EventReceiver,
    ) -> InventoryManagerBuilder {
        InventoryManagerBuilder::new(backend, events)
    }

    /// Subscribes to changes of the cached state.
    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.shared.events.subscribe()
    }

    /// The options in use.
    pub fn options(&self) -> &InventoryOptions {
        &self.shared.options
    }

    /// The cached items as of the last full refresh, patched by later partial results.
    pub fn items(&self) -> Arc<Vec<InventoryItem>> {
        self.shared.items.snapshot()
    }

    /// The currency prices were last received in.
    pub fn currency(&self) -> Option<String> {
        self.shared.currency.read().clone()
    }

    /// Asks the backend to load item definitions. Definitions the backend already has are read
    /// right away, the rest arrive through the event loop. Calling this again is harmless.
    pub fn load_item_definitions(&self) -> bool {
        self.reload_definitions_if_empty();
        self.shared.backend().load_item_definitions()
    }

    /// Loads item definitions and waits until they are available. Uses
    /// [`InventoryOptions::definitions_timeout`] when no `timeout` is given. Returns whether
    /// definitions are available.
    pub async fn wait_for_definitions(&self, timeout: Option<Duration>) -> bool {
        let timeout = timeout.unwrap_or(self.shared.options.definitions_timeout);
        let deadline = Instant::now().checked_add(timeout);

        if self.reload_definitions_if_empty() {
            return true;
        }

        if !self.shared.backend().load_item_definitions() {
            log::debug!("Backend refused to load item definitions");
        }

        loop {
            if self.shared.definitions.is_loaded() {
                return true;
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                log::debug!("Item definitions were not available after {timeout:?}");
                return false;
            }

            tokio::time::sleep(self.shared.options.definitions_poll_interval).await;
        }
    }

    /// Reads definitions the backend already has if none are cached. Returns whether
    /// definitions are cached afterwards.
    fn reload_definitions_if_empty(&self) -> bool {
        if self.shared.definitions.is_loaded() {
            return true;
        }

        match self.shared.definitions.reload(self.shared.backend()) {
            Ok(_count) => {
                self.shared.broadcast(InventoryEvent::DefinitionsUpdated);
                true
            },
            Err(error) => {
                log::trace!("Definitions are not loaded yet: {error}");
                false
            },
        }
    }

    /// Looks up a definition. `None` if definitions are not loaded or the ID is unknown.
    pub fn find_definition(&self, id: DefinitionId) -> Option<Arc<ItemDefinition>> {
        self.shared.definitions.lookup(id)
    }

    /// All cached definitions ordered by ID.
    pub fn definitions(&self) -> Vec<Arc<ItemDefinition>> {
        self.shared.definitions.definitions()
    }

    /// Requests prices in the user's currency and returns every definition that has one. The
    /// prices are also stored on the cached definitions.
    pub async fn get_definitions_with_prices(&self) -> Option<Vec<Arc<ItemDefinition>>> {
        absent_on_error("get_definitions_with_prices", self.request_prices().await)
    }

    async fn request_prices(&self) -> Result<Vec<Arc<ItemDefinition>>> {
        let call = self.shared.bridge.await_call(
            |backend| backend.request_prices(),
            self.shared.options.result_timeout,
        ).await?;
        let CallResult::Prices { result, currency } = call else {
            return Err(Error::UnexpectedCallResult);
        };

        if !result.is_success() {
            return Err(Error::CallFailed(result));
        }

        *self.shared.currency.write() = Some(currency);

        let prices = self.shared.backend().items_with_prices()
            .ok_or(Error::Read("Prices are unavailable"))?;

        if !self.reload_definitions_if_empty() {
            return Err(Error::NoDefinitions);
        }

        let priced = self.shared.definitions.apply_prices(&prices);

        log::debug!("Received prices for {priced} definitions");
        self.shared.broadcast(InventoryEvent::DefinitionsUpdated);

        Ok(self.definitions()
            .into_iter()
            .filter(|definition| definition.price.is_some())
            .collect())
    }

    /// Requests every item the user owns without waiting. The cached items are replaced when
    /// the result arrives. Returns whether the request was issued.
    pub fn get_all_items(&self) -> bool {
        // The lock is held across the call so the event loop cannot see the full update
        // before the handle is registered.
        let mut detached = self.shared.detached.lock();

        match self.shared.backend().get_all_items() {
            Some(handle) => {
                log::trace!("Requested all items with detached handle {handle:?}");
                detached.insert(handle);
                true
            },
            None => {
                log::debug!("get_all_items was rejected");
                false
            },
        }
    }

    /// Gets every item the user owns and replaces the cached items with them.
    pub async fn get_all_items_async(&self) -> Option<InventoryResult> {
        let result = self.shared.read_result(|backend| backend.get_all_items(), true).await;
        let result = absent_on_error("get_all_items_async", result)?;

        self.shared.replace_items(result.items().to_vec());
        Some(result)
    }

    /// Gets specific items. The result keeps its handle, so it can be serialized to prove
    /// ownership to another user.
    pub async fn get_items_by_id(&self, item_ids: &[ItemId]) -> Option<InventoryResult> {
        absent_on_error("get_items_by_id", async {
            if item_ids.is_empty() {
                return Err(Error::Parameter("No item IDs given"));
            }

            self.shared.read_result(|backend| backend.get_items_by_id(item_ids), false).await
        }.await)
    }

    /// Generates items. Only works for developers or on test accounts.
    pub async fn generate_items(&self, items: &[DefinitionAmount]) -> Option<InventoryResult> {
        absent_on_error("generate_items", async {
            if items.is_empty() {
                return Err(Error::Parameter("No items given"));
            }

            for item in items {
                check_quantity(item.quantity)?;
            }

            self.shared.read_result(|backend| backend.generate_items(items), false).await
        }.await)
    }

    /// Generates `quantity` of a single definition.
    pub async fn generate_item(
        &self,
        definition: DefinitionId,
        quantity: u32,
    ) -> Option<InventoryResult> {
        self.generate_items(&[DefinitionAmount::from((definition, quantity))]).await
    }

    /// Exchanges items for others, e.g. crafting. `destroy` lists the ingredients to consume
    /// and `generate` the items to create. Consumed ingredients are updated in the cached
    /// items; created items appear after the next full refresh.
    pub async fn exchange_items(
        &self,
        generate: &[DefinitionAmount],
        destroy: &[ItemAmount],
    ) -> Option<InventoryResult> {
        absent_on_error("exchange_items", async {
            if generate.is_empty() || destroy.is_empty() {
                return Err(Error::Parameter("An exchange needs items to generate and destroy"));
            }

            for amount in destroy {
                check_quantity(amount.quantity)?;
            }

            self.shared.read_merged(|backend| backend.exchange_items(generate, destroy)).await
        }.await)
    }

    /// Consumes some of a stack, e.g. using a consumable.
    pub async fn consume_item(&self, item_id: ItemId, quantity: u32) -> Option<InventoryResult> {
        absent_on_error("consume_item", async {
            check_quantity(quantity)?;
            self.shared.read_merged(|backend| backend.consume_item(item_id, quantity)).await
        }.await)
    }

    /// Splits `quantity` off a stack into a new stack. The new stack appears after the next
    /// full refresh.
    pub async fn split_stack(&self, item_id: ItemId, quantity: u32) -> Option<InventoryResult> {
        absent_on_error("split_stack", async {
            check_quantity(quantity)?;
            self.shared.read_merged(|backend| backend.transfer_item_quantity(item_id, quantity, None)).await
        }.await)
    }

    /// Moves `quantity` from `source` onto `destination`.
    pub async fn stack_items(
        &self,
        source: ItemId,
        destination: ItemId,
        quantity: u32,
    ) -> Option<InventoryResult> {
        absent_on_error("stack_items", async {
            check_quantity(quantity)?;

            if source == destination {
                return Err(Error::Parameter("Cannot stack an item onto itself"));
            }

            self.shared.read_merged(|backend| {
                backend.transfer_item_quantity(source, quantity, Some(destination))
            }).await
        }.await)
    }

    /// Triggers a playtime drop from a generator definition.
    pub async fn trigger_item_drop(&self, definition: DefinitionId) -> Option<InventoryResult> {
        let result = self.shared.read_result(|backend| backend.trigger_item_drop(definition), false).await;

        absent_on_error("trigger_item_drop", result)
    }

    /// Grants every promo item the user is eligible for.
    pub async fn grant_promo_items(&self) -> Option<InventoryResult> {
        let result = self.shared.read_result(|backend| backend.grant_promo_items(), false).await;

        absent_on_error("grant_promo_items", result)
    }

    /// Grants a single promo item.
    pub async fn add_promo_item(&self, definition: DefinitionId) -> Option<InventoryResult> {
        self.add_promo_items(&[definition]).await
    }

    /// Grants specific promo items.
    pub async fn add_promo_items(&self, definitions: &[DefinitionId]) -> Option<InventoryResult> {
        absent_on_error("add_promo_items", async {
            if definitions.is_empty() {
                return Err(Error::Parameter("No definitions given"));
            }

            self.shared.read_result(|backend| backend.add_promo_items(definitions), false).await
        }.await)
    }

    /// Starts a purchase. The user completes it in the Steam overlay.
    pub async fn start_purchase(&self, items: &[DefinitionAmount]) -> Option<PurchaseResult> {
        absent_on_error("start_purchase", async {
            if items.is_empty() {
                return Err(Error::Parameter("No items given"));
            }

            let call = self.shared.bridge.await_call(
                |backend| backend.start_purchase(items),
                self.shared.options.result_timeout,
            ).await?;

            match call {
                CallResult::Purchase { result, order_id, transaction_id } if result.is_success() => {
                    Ok(PurchaseResult {
                        order_id,
                        transaction_id,
                    })
                },
                CallResult::Purchase { result, .. } => Err(Error::CallFailed(result)),
                CallResult::Prices { .. } => Err(Error::UnexpectedCallResult),
            }
        }.await)
    }

    /// Opens a batch of property updates.
    pub fn start_update_properties(&self) -> PropertyUpdate {
        PropertyUpdate::new(Arc::clone(&self.shared))
    }

    /// Reads a result serialized by another user.
    ///
    /// The backend checks the signature of the data but not who it came from. Check
    /// [`InventoryResult::belongs_to`] before trusting that the items are owned by the sender.
    ///
    /// Fails only when `data` is empty. Otherwise resolves to `None` if the data could not be
    /// read.
    pub async fn deserialize(&self, data: &[u8]) -> Result<Option<InventoryResult>> {
        if data.is_empty() {
            return Err(Error::Parameter("Serialized result is empty"));
        }

        let buffer = data.to_vec();
        let result = self.shared.read_result(|backend| backend.deserialize_result(&buffer), false).await;

        Ok(absent_on_error("deserialize", result))
    }
}

impl From<InventoryManagerBuilder> for InventoryManager {
    fn from(builder: InventoryManagerBuilder) -> Self {
        let (events, _receiver) = broadcast::channel(builder.options.event_capacity.max(1));
        let shared = Arc::new(Shared {
            bridge: AsyncBridge::new(builder.backend),
            definitions: DefinitionCache::default(),
            items: ItemStore::default(),
            options: builder.options,
            currency: RwLock::new(None),
            detached: Mutex::new(HashSet::new()),
            events,
        });
        let event_loop = event_loop::spawn(Arc::clone(&shared), builder.events);

        Self {
            shared,
            _event_loop: Arc::new(event_loop),
        }
    }
}
