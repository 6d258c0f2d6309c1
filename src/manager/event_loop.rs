use super::{InventoryEvent, Shared};
use crate::backend::{BackendEvent, EventReceiver, ResultHandle};
use crate::bridge::{CallResult, Delivery, ReadyResult};
use crate::enums::EResult;
use crate::handle::OwnedHandle;
use crate::reader::ResultReader;
use crate::types::ApiCallId;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Aborts the event loop when dropped.
#[derive(Debug)]
pub(super) struct EventLoop(JoinHandle<()>);

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawns the task consuming backend notifications. Notifications are handled one at a time in
/// the order they were sent, so this is the only writer for full refreshes and definitions.
pub(super) fn spawn(
    shared: Arc<Shared>,
    mut events: EventReceiver,
) -> EventLoop {
    let handle = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            handle_event(&shared, event);
        }

        log::debug!("Backend notification channel closed");
    });

    EventLoop(handle)
}

pub(super) fn handle_event(shared: &Shared, event: BackendEvent) {
    match event {
        BackendEvent::ResultReady { handle, result } => {
            on_result_ready(shared, handle, result);
        },
        BackendEvent::FullUpdate { handle } => {
            on_full_update(shared, handle);
        },
        BackendEvent::DefinitionsUpdated => {
            match shared.definitions.reload(shared.bridge.backend().as_ref()) {
                Ok(_count) => shared.broadcast(InventoryEvent::DefinitionsUpdated),
                Err(error) => log::debug!("Error reloading definitions: {error}"),
            }
        },
        BackendEvent::PricesReceived { call, result, currency } => {
            deliver_call(shared, call, CallResult::Prices { result, currency });
        },
        BackendEvent::PurchaseStarted { call, result, order_id, transaction_id } => {
            deliver_call(shared, call, CallResult::Purchase { result, order_id, transaction_id });
        },
    }
}

fn on_result_ready(shared: &Shared, handle: ResultHandle, result: EResult) {
    // A handle value is reused once released, so a notification queued for a handle that
    // completed synchronously can arrive while the new handle with that value is pending.
    if shared.bridge.backend().result_status(handle) == EResult::Pending {
        log::trace!("Ignoring stale notification for pending result handle {handle:?}");
        return;
    }

    match shared.bridge.notify_result(handle, result) {
        Delivery::Delivered => {},
        Delivery::Abandoned => {
            if shared.options.reclaim_abandoned_results {
                log::debug!("Releasing abandoned result handle {handle:?} ({result})");
                shared.bridge.backend().destroy_result(handle);
            } else {
                log::debug!("Result handle {handle:?} completed after its wait timed out ({result})");
            }
        },
        Delivery::Unknown => {
            // A detached refresh still registered here either failed or produced no full
            // update because nothing changed. Either way nobody will read it.
            if shared.detached.lock().remove(&handle) {
                log::trace!("Releasing detached result handle {handle:?} ({result})");
                shared.bridge.backend().destroy_result(handle);
            } else {
                log::trace!("No waiter for result handle {handle:?}");
            }
        },
    }
}

fn on_full_update(shared: &Shared, raw: ResultHandle) {
    // Handles from awaited refreshes belong to their caller, who replaces the items itself.
    if !shared.detached.lock().remove(&raw) {
        log::trace!("Full update for result handle {raw:?} is owned by a caller");
        return;
    }

    let backend = shared.bridge.backend();
    let status = backend.result_status(raw);

    if status == EResult::Pending {
        shared.detached.lock().insert(raw);
        log::debug!("Full update for result handle {raw:?} arrived before the result was ready");
        return;
    }

    let mut handle = OwnedHandle::new(raw, Arc::clone(backend));

    handle.mark_ready();

    if !status.is_success() {
        log::debug!("Full update for result handle {raw:?} failed: {status}");
        return;
    }

    let ready = ReadyResult {
        handle,
        expired: status == EResult::Expired,
    };

    match ResultReader::new(backend.as_ref()).read(ready, true) {
        Ok(result) => shared.replace_items(result.into_items()),
        Err(error) => log::debug!("Error reading full update: {error}"),
    }
}

fn deliver_call(shared: &Shared, call: ApiCallId, result: CallResult) {
    if shared.bridge.notify_call(call, result) == Delivery::Unknown {
        log::warn!("Received a call result for unknown call {call}");
    }
}
