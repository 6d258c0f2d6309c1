//! An in-memory backend for tests. Every release is recorded so tests can check handle
//! ownership.

use crate::backend::{
    Backend,
    BackendEvent,
    DefinitionPrice,
    EventReceiver,
    EventSender,
    RawItem,
    ResultHandle,
    UpdateHandle,
    event_channel,
};
use crate::enums::EResult;
use crate::request::{DefinitionAmount, ItemAmount, PropertyValue};
use crate::response::ItemFlags;
use crate::types::{ApiCallId, DefinitionId, ItemId, PropertyMap};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use steamid_ng::SteamID;

pub const OWNER: u64 = 76561198000000001;
pub const TIMESTAMP: u32 = 1_700_000_000;

/// How issued handles and calls complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Ready as soon as they are issued. A notification is still sent.
    Immediate,
    /// Pending until the given delay elapses, then a notification is sent.
    After(Duration),
    /// Pending forever with no notification.
    Never,
}

#[derive(Debug)]
struct MockResult {
    status: EResult,
    items: Vec<RawItem>,
    owner: u64,
}

#[derive(Debug)]
pub struct MockState {
    next_handle: i32,
    next_call: ApiCallId,
    next_update: u64,
    next_item_id: ItemId,
    results: HashMap<ResultHandle, MockResult>,
    /// Handles issued, in order.
    pub issued: Vec<ResultHandle>,
    /// Handles released, in order.
    pub released: Vec<ResultHandle>,
    /// Whether calls are refused.
    pub reject: bool,
    /// How calls complete.
    pub completion: Completion,
    /// The status handles and calls complete with.
    pub outcome: EResult,
    /// Whether reading items out of ready results fails.
    pub fail_reads: bool,
    /// The user's items.
    pub inventory: Vec<RawItem>,
    /// Properties of the user's items.
    pub item_properties: HashMap<ItemId, PropertyMap>,
    /// Definitions available to enumerate.
    pub definitions: BTreeMap<DefinitionId, PropertyMap>,
    /// Whether each definition ID enumeration was given a buffer.
    pub definition_id_queries: Vec<bool>,
    /// Prices available after requesting them.
    pub prices: Vec<DefinitionPrice>,
    /// Mutations staged per update handle.
    staged: HashMap<u64, Vec<(ItemId, String, Option<PropertyValue>)>>,
    /// Property names the backend refuses.
    pub rejected_properties: HashSet<String>,
    /// Number of accepted staged mutations.
    pub accepted_mutations: usize,
    /// How long reading a definition property blocks.
    pub definition_property_delay: Option<Duration>,
}

impl MockState {
    fn issue(&mut self, items: Vec<RawItem>) -> ResultHandle {
        self.next_handle += 1;

        let handle = ResultHandle(self.next_handle);
        let status = match self.completion {
            Completion::Immediate => self.outcome,
            _ => EResult::Pending,
        };

        self.issued.push(handle);
        self.results.insert(handle, MockResult {
            status,
            items,
            owner: OWNER,
        });
        handle
    }

    fn new_items(&mut self, definitions: &[DefinitionAmount]) -> Vec<RawItem> {
        let items = definitions
            .iter()
            .map(|amount| {
                self.next_item_id += 1;

                RawItem {
                    item_id: self.next_item_id,
                    definition: amount.definition,
                    quantity: amount.quantity as u16,
                    flags: 0,
                }
            })
            .collect::<Vec<_>>();

        if self.outcome.is_success() {
            self.inventory.extend(items.iter().copied());
        }

        items
    }

    /// Takes quantity from an owned stack, returning its new record.
    fn take(&mut self, item_id: ItemId, quantity: u32, flag: u16) -> Option<RawItem> {
        let commit = self.outcome.is_success();
        let item = self.inventory.iter_mut().find(|item| item.item_id == item_id)?;
        let mut updated = *item;

        updated.quantity = updated.quantity.saturating_sub(quantity as u16);

        if updated.quantity == 0 {
            updated.flags |= flag;
        }

        if commit {
            *item = updated;
        }

        Some(updated)
    }

    fn ready_items(&self, handle: ResultHandle) -> Option<&Vec<RawItem>> {
        if self.fail_reads {
            return None;
        }

        self.results
            .get(&handle)
            .filter(|result| result.status.is_success())
            .map(|result| &result.items)
    }

    fn item_at(&self, handle: ResultHandle, index: u32) -> Option<RawItem> {
        self.ready_items(handle)?.get(index as usize).copied()
    }
}

#[derive(Debug)]
pub struct MockBackend {
    pub state: Arc<Mutex<MockState>>,
    events: EventSender,
}

impl MockBackend {
    /// Creates a backend owning `inventory`, along with the receiver for its notifications.
    pub fn new(inventory: Vec<RawItem>) -> (Arc<Self>, EventReceiver) {
        let (events, receiver) = event_channel();
        let state = MockState {
            next_handle: 0,
            next_call: 0,
            next_update: 0,
            next_item_id: 1000,
            results: HashMap::new(),
            issued: Vec::new(),
            released: Vec::new(),
            reject: false,
            completion: Completion::Immediate,
            outcome: EResult::OK,
            fail_reads: false,
            inventory,
            item_properties: HashMap::new(),
            definitions: BTreeMap::new(),
            definition_id_queries: Vec::new(),
            prices: Vec::new(),
            staged: HashMap::new(),
            rejected_properties: HashSet::new(),
            accepted_mutations: 0,
            definition_property_delay: None,
        };
        let backend = Self {
            state: Arc::new(Mutex::new(state)),
            events,
        };

        (Arc::new(backend), receiver)
    }

    pub fn set_completion(&self, completion: Completion) {
        self.state.lock().completion = completion;
    }

    pub fn set_outcome(&self, outcome: EResult) {
        self.state.lock().outcome = outcome;
    }

    pub fn set_reject(&self, reject: bool) {
        self.state.lock().reject = reject;
    }

    /// Hands out handle values again from the start, the way a backend may once they are
    /// released.
    pub fn reuse_handles(&self) {
        self.state.lock().next_handle = 0;
    }

    /// Completes a pending handle with the configured outcome without notifying.
    pub fn finish(&self, handle: ResultHandle) {
        let mut state = self.state.lock();
        let outcome = state.outcome;

        if let Some(result) = state.results.get_mut(&handle) {
            result.status = outcome;
        }
    }

    pub fn issued(&self) -> Vec<ResultHandle> {
        self.state.lock().issued.clone()
    }

    pub fn released(&self) -> Vec<ResultHandle> {
        self.state.lock().released.clone()
    }

    pub fn inventory(&self) -> Vec<RawItem> {
        self.state.lock().inventory.clone()
    }

    /// Installs definitions given as `(id, name)` and notifies that they changed.
    pub fn install_definitions(&self, definitions: &[(DefinitionId, &str)]) {
        {
            let mut state = self.state.lock();

            state.definitions = definitions
                .iter()
                .map(|(id, name)| {
                    let properties = [
                        ("name".to_string(), name.to_string()),
                        ("type".to_string(), "item".to_string()),
                    ]
                        .into_iter()
                        .collect();

                    (*id, properties)
                })
                .collect();
        }

        self.send(BackendEvent::DefinitionsUpdated);
    }

    pub fn send(&self, event: BackendEvent) {
        // Nobody may be listening in bridge-only tests.
        let _ = self.events.send(event);
    }

    /// Notifies the completion of a handle according to the completion mode.
    fn notify(&self, handle: ResultHandle, full_update: bool) {
        let completion = self.state.lock().completion;

        match completion {
            Completion::Immediate => {
                let result = self.result_status(handle);

                if full_update && result.is_success() {
                    self.send(BackendEvent::FullUpdate { handle });
                }

                self.send(BackendEvent::ResultReady { handle, result });
            },
            Completion::After(delay) => {
                let state = Arc::clone(&self.state);
                let events = self.events.clone();

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;

                    let result = {
                        let mut state = state.lock();
                        let outcome = state.outcome;

                        match state.results.get_mut(&handle) {
                            Some(pending) => {
                                pending.status = outcome;
                                outcome
                            },
                            // Released before it completed.
                            None => return,
                        }
                    };

                    if full_update && result.is_success() {
                        let _ = events.send(BackendEvent::FullUpdate { handle });
                    }

                    let _ = events.send(BackendEvent::ResultReady { handle, result });
                });
            },
            Completion::Never => {},
        }
    }

    fn issue_with<F>(&self, full_update: bool, items: F) -> Option<ResultHandle>
    where
        F: FnOnce(&mut MockState) -> Option<Vec<RawItem>>,
    {
        let handle = {
            let mut state = self.state.lock();

            if state.reject {
                return None;
            }

            let items = items(&mut state)?;

            state.issue(items)
        };

        self.notify(handle, full_update);
        Some(handle)
    }

    fn issue_call<F>(&self, event: F) -> Option<ApiCallId>
    where
        F: FnOnce(ApiCallId, EResult) -> BackendEvent + Send + 'static,
    {
        let (call, completion, outcome) = {
            let mut state = self.state.lock();

            if state.reject {
                return None;
            }

            state.next_call += 1;
            (state.next_call, state.completion, state.outcome)
        };

        match completion {
            Completion::Immediate => self.send(event(call, outcome)),
            Completion::After(delay) => {
                let events = self.events.clone();

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = events.send(event(call, outcome));
                });
            },
            Completion::Never => {},
        }

        Some(call)
    }
}

/// Encodes items the way [`MockBackend::serialize_result`] does.
pub fn encode_items(owner: u64, items: &[RawItem]) -> Vec<u8> {
    let items = items
        .iter()
        .map(|item| (item.item_id, item.definition, item.quantity, item.flags))
        .collect::<Vec<_>>();

    serde_json::to_vec(&(owner, items)).unwrap()
}

impl Backend for MockBackend {
    fn get_all_items(&self) -> Option<ResultHandle> {
        self.issue_with(true, |state| Some(state.inventory.clone()))
    }

    fn get_items_by_id(&self, item_ids: &[ItemId]) -> Option<ResultHandle> {
        self.issue_with(false, |state| Some(state.inventory
            .iter()
            .filter(|item| item_ids.contains(&item.item_id))
            .copied()
            .collect()))
    }

    fn generate_items(&self, items: &[DefinitionAmount]) -> Option<ResultHandle> {
        self.issue_with(false, |state| Some(state.new_items(items)))
    }

    fn grant_promo_items(&self) -> Option<ResultHandle> {
        self.issue_with(false, |_state| Some(Vec::new()))
    }

    fn add_promo_items(&self, definitions: &[DefinitionId]) -> Option<ResultHandle> {
        let amounts = definitions
            .iter()
            .map(|definition| DefinitionAmount::one(*definition))
            .collect::<Vec<_>>();

        self.issue_with(false, |state| Some(state.new_items(&amounts)))
    }

    fn trigger_item_drop(&self, definition: DefinitionId) -> Option<ResultHandle> {
        self.issue_with(false, |state| Some(state.new_items(&[DefinitionAmount::one(definition)])))
    }

    fn exchange_items(
        &self,
        generate: &[DefinitionAmount],
        destroy: &[ItemAmount],
    ) -> Option<ResultHandle> {
        self.issue_with(false, |state| {
            let mut items = destroy
                .iter()
                .map(|amount| state.take(amount.item_id, amount.quantity, ItemFlags::REMOVED))
                .collect::<Option<Vec<_>>>()?;

            items.extend(state.new_items(generate));
            Some(items)
        })
    }

    fn consume_item(&self, item_id: ItemId, quantity: u32) -> Option<ResultHandle> {
        self.issue_with(false, |state| {
            state.take(item_id, quantity, ItemFlags::CONSUMED).map(|item| vec![item])
        })
    }

    fn transfer_item_quantity(
        &self,
        source: ItemId,
        quantity: u32,
        destination: Option<ItemId>,
    ) -> Option<ResultHandle> {
        self.issue_with(false, |state| {
            let commit = state.outcome.is_success();
            let taken = state.take(source, quantity, ItemFlags::REMOVED)?;
            let received = match destination {
                Some(destination) => {
                    let item = state.inventory.iter_mut().find(|item| item.item_id == destination)?;
                    let mut updated = *item;

                    updated.quantity += quantity as u16;

                    if commit {
                        *item = updated;
                    }

                    updated
                },
                None => {
                    state.next_item_id += 1;

                    let item = RawItem {
                        item_id: state.next_item_id,
                        definition: taken.definition,
                        quantity: quantity as u16,
                        flags: 0,
                    };

                    if commit {
                        state.inventory.push(item);
                    }

                    item
                },
            };

            Some(vec![taken, received])
        })
    }

    fn deserialize_result(&self, buffer: &[u8]) -> Option<ResultHandle> {
        // A buffer that does not decode stands in for a failed signature check.
        let (owner, items) = serde_json::from_slice::<(u64, Vec<(ItemId, DefinitionId, u16, u16)>)>(buffer).ok()?;
        let items = items
            .into_iter()
            .map(|(item_id, definition, quantity, flags)| RawItem {
                item_id,
                definition,
                quantity,
                flags,
            })
            .collect::<Vec<_>>();
        let handle = self.issue_with(false, |_state| Some(items))?;

        if let Some(result) = self.state.lock().results.get_mut(&handle) {
            result.owner = owner;
        }

        Some(handle)
    }

    fn result_status(&self, handle: ResultHandle) -> EResult {
        self.state.lock().results
            .get(&handle)
            .map(|result| result.status)
            .unwrap_or(EResult::InvalidParam)
    }

    fn result_item_count(&self, handle: ResultHandle) -> Option<u32> {
        self.state.lock().ready_items(handle).map(|items| items.len() as u32)
    }

    fn result_items(&self, handle: ResultHandle, count: u32) -> Option<Vec<RawItem>> {
        self.state.lock().ready_items(handle)
            .map(|items| items.iter().take(count as usize).copied().collect())
    }

    fn result_item_property(
        &self,
        handle: ResultHandle,
        index: u32,
        name: Option<&str>,
    ) -> Option<String> {
        let state = self.state.lock();
        let item = state.item_at(handle, index)?;
        let properties = state.item_properties.get(&item.item_id)?;

        match name {
            Some(name) => properties.get(name).cloned(),
            None => Some(properties.keys().cloned().collect::<Vec<_>>().join(",")),
        }
    }

    fn result_timestamp(&self, _handle: ResultHandle) -> u32 {
        TIMESTAMP
    }

    fn check_result_steam_id(&self, handle: ResultHandle, steamid: SteamID) -> bool {
        self.state.lock().results
            .get(&handle)
            .map_or(false, |result| result.owner == u64::from(steamid))
    }

    fn serialize_result(&self, handle: ResultHandle) -> Option<Vec<u8>> {
        let state = self.state.lock();

        state.ready_items(handle).map(|items| encode_items(OWNER, items))
    }

    fn destroy_result(&self, handle: ResultHandle) {
        let mut state = self.state.lock();

        state.results.remove(&handle);
        state.released.push(handle);
    }

    fn load_item_definitions(&self) -> bool {
        !self.state.lock().reject
    }

    fn item_definition_ids(&self, ids: Option<&mut [DefinitionId]>) -> Option<u32> {
        let mut state = self.state.lock();

        state.definition_id_queries.push(ids.is_some());

        if state.definitions.is_empty() {
            return None;
        }

        match ids {
            Some(ids) => {
                let mut written = 0;

                for (slot, id) in ids.iter_mut().zip(state.definitions.keys()) {
                    *slot = *id;
                    written += 1;
                }

                Some(written)
            },
            None => Some(state.definitions.len() as u32),
        }
    }

    fn item_definition_property(
        &self,
        definition: DefinitionId,
        name: Option<&str>,
    ) -> Option<String> {
        let delay = self.state.lock().definition_property_delay;

        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let state = self.state.lock();
        let properties = state.definitions.get(&definition)?;

        match name {
            Some(name) => properties.get(name).cloned(),
            None => Some(properties.keys().cloned().collect::<Vec<_>>().join(",")),
        }
    }

    fn request_prices(&self) -> Option<ApiCallId> {
        self.issue_call(|call, result| BackendEvent::PricesReceived {
            call,
            result,
            currency: "USD".into(),
        })
    }

    fn items_with_prices(&self) -> Option<Vec<DefinitionPrice>> {
        let state = self.state.lock();

        if state.prices.is_empty() {
            None
        } else {
            Some(state.prices.clone())
        }
    }

    fn start_purchase(&self, _items: &[DefinitionAmount]) -> Option<ApiCallId> {
        self.issue_call(|call, result| BackendEvent::PurchaseStarted {
            call,
            result,
            order_id: 500 + call,
            transaction_id: 900 + call,
        })
    }

    fn start_update_properties(&self) -> UpdateHandle {
        let mut state = self.state.lock();

        state.next_update += 1;
        UpdateHandle(state.next_update)
    }

    fn set_property(
        &self,
        update: UpdateHandle,
        item_id: ItemId,
        name: &str,
        value: &PropertyValue,
    ) -> bool {
        let mut state = self.state.lock();

        if state.rejected_properties.contains(name) {
            return false;
        }

        state.accepted_mutations += 1;
        state.staged
            .entry(update.0)
            .or_default()
            .push((item_id, name.into(), Some(value.clone())));
        true
    }

    fn remove_property(&self, update: UpdateHandle, item_id: ItemId, name: &str) -> bool {
        let mut state = self.state.lock();

        if state.rejected_properties.contains(name) {
            return false;
        }

        state.accepted_mutations += 1;
        state.staged
            .entry(update.0)
            .or_default()
            .push((item_id, name.into(), None));
        true
    }

    fn submit_update_properties(&self, update: UpdateHandle) -> Option<ResultHandle> {
        self.issue_with(false, |state| {
            let staged = state.staged.remove(&update.0).unwrap_or_default();
            let commit = state.outcome.is_success();
            let mut touched = Vec::new();

            for (item_id, name, value) in staged {
                if !touched.contains(&item_id) {
                    touched.push(item_id);
                }

                if !commit {
                    continue;
                }

                let properties = state.item_properties.entry(item_id).or_default();
                let mut dynamic = properties
                    .get("dynamic_props")
                    .and_then(|json| serde_json::from_str::<BTreeMap<String, PropertyValue>>(json).ok())
                    .unwrap_or_default();

                match value {
                    Some(value) => {
                        dynamic.insert(name, value);
                    },
                    None => {
                        dynamic.remove(&name);
                    },
                }

                properties.insert("dynamic_props".into(), serde_json::to_string(&dynamic).unwrap());
            }

            Some(state.inventory
                .iter()
                .filter(|item| touched.contains(&item.item_id))
                .copied()
                .collect())
        })
    }
}
