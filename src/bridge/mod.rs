//! Turns handle-issuing backend calls and their notifications into awaitable results.

mod pending;

pub(crate) use pending::Delivery;

use pending::PendingMap;
use crate::backend::{Backend, ResultHandle};
use crate::enums::EResult;
use crate::error::{Error, Result};
use crate::handle::OwnedHandle;
use crate::types::{ApiCallId, OrderId, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// A handle whose status was checked and which can be read.
#[derive(Debug)]
pub(crate) struct ReadyResult {
    /// The handle. Dropping it releases it.
    pub(crate) handle: OwnedHandle,
    /// The data may be stale.
    pub(crate) expired: bool,
}

/// The payload of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CallResult {
    /// Prices arrived.
    Prices {
        result: EResult,
        currency: String,
    },
    /// A purchase was started.
    Purchase {
        result: EResult,
        order_id: OrderId,
        transaction_id: TransactionId,
    },
}

/// Waits for backend completions.
///
/// Each wait is independent and keyed by its own handle or call ID, so any number of waits
/// can be outstanding at once.
#[derive(Debug)]
pub(crate) struct AsyncBridge {
    backend: Arc<dyn Backend>,
    results: PendingMap<ResultHandle, EResult>,
    calls: PendingMap<ApiCallId, CallResult>,
}

impl AsyncBridge {
    pub(crate) fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            results: PendingMap::default(),
            calls: PendingMap::default(),
        }
    }

    pub(crate) fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Starts a call that issues a result handle and waits until the handle is ready.
    ///
    /// - A refused call resolves to [`Error::Rejected`]. There is nothing to release.
    /// - A handle that becomes ready with a failure is released and resolves to
    ///   [`Error::ResultFailed`].
    /// - A handle that does not become ready within `timeout` is abandoned without being
    ///   released and resolves to [`Error::Timeout`].
    ///
    /// Dropping the returned future while the handle is pending also abandons it. A later
    /// notification for it is then reported as [`Delivery::Abandoned`].
    pub(crate) async fn await_result<F>(
        &self,
        start: F,
        timeout: Duration,
    ) -> Result<ReadyResult>
    where
        F: FnOnce(&dyn Backend) -> Option<ResultHandle>,
    {
        let backend = self.backend.as_ref();
        let (raw, mut receiver) = self.results
            .issue(|| start(backend))
            .ok_or(Error::Rejected)?;
        let mut handle = OwnedHandle::new(raw, Arc::clone(&self.backend));
        let deadline = Instant::now().checked_add(timeout);

        log::trace!("Waiting on result handle {raw:?}");

        // The status is checked after every registration. The handle may already be done if the
        // backend completes synchronously, and a notification may be stale if an earlier handle
        // with the same value was released.
        let status = loop {
            match backend.result_status(raw) {
                EResult::Pending => {},
                status => {
                    self.results.cancel(&raw);
                    break status;
                },
            }

            match wait_until(deadline, receiver).await {
                Some(Ok(notified)) => {
                    log::trace!("Handle {raw:?} was notified with {notified}");
                    receiver = self.results.register(raw);
                },
                Some(Err(_)) => {
                    handle.abandon();
                    return Err(Error::EventLoopClosed);
                },
                None => {
                    self.results.abandon(raw);
                    handle.abandon();
                    return Err(Error::Timeout(timeout));
                },
            }
        };

        handle.mark_ready();

        match status {
            EResult::OK | EResult::Expired => Ok(ReadyResult {
                handle,
                expired: status == EResult::Expired,
            }),
            // The handle is released as it goes out of scope.
            status => Err(Error::ResultFailed(status)),
        }
    }

    /// Starts a call that completes with a call result and waits for it.
    pub(crate) async fn await_call<F>(
        &self,
        start: F,
        timeout: Duration,
    ) -> Result<CallResult>
    where
        F: FnOnce(&dyn Backend) -> Option<ApiCallId>,
    {
        let backend = self.backend.as_ref();
        let (call, receiver) = self.calls
            .issue(|| start(backend))
            .ok_or(Error::Rejected)?;

        match wait_until(Instant::now().checked_add(timeout), receiver).await {
            Some(Ok(result)) => Ok(result),
            Some(Err(_)) => Err(Error::EventLoopClosed),
            None => {
                self.calls.abandon(call);
                Err(Error::Timeout(timeout))
            },
        }
    }

    /// Delivers a ready notification for a handle.
    pub(crate) fn notify_result(&self, handle: ResultHandle, result: EResult) -> Delivery {
        self.results.complete(&handle, result)
    }

    /// Delivers a completed call.
    pub(crate) fn notify_call(&self, call: ApiCallId, result: CallResult) -> Delivery {
        self.calls.complete(&call, result)
    }
}

/// Waits for a notification. `None` once `deadline` passes; no deadline waits forever.
async fn wait_until<T>(
    deadline: Option<Instant>,
    receiver: oneshot::Receiver<T>,
) -> Option<std::result::Result<T, oneshot::error::RecvError>> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, receiver).await.ok(),
        None => Some(receiver.await),
    }
}
