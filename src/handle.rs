use crate::backend::{Backend, ResultHandle};
use crate::enums::HandleState;
use std::fmt;
use std::sync::Arc;

/// An issued result handle owned by this crate. The handle is released when this is dropped
/// once its status is known, so every owned handle is released at most once. Handles dropped
/// while still pending are left to the backend, the same as abandoned ones.
pub(crate) struct OwnedHandle {
    raw: ResultHandle,
    state: HandleState,
    backend: Arc<dyn Backend>,
}

impl OwnedHandle {
    /// Takes ownership of a freshly issued handle.
    pub(crate) fn new(raw: ResultHandle, backend: Arc<dyn Backend>) -> Self {
        Self {
            raw,
            state: HandleState::Pending,
            backend,
        }
    }

    pub(crate) fn raw(&self) -> ResultHandle {
        self.raw
    }

    pub(crate) fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub(crate) fn state(&self) -> HandleState {
        self.state
    }

    /// Marks the handle as completed. Its status may still be a failure.
    pub(crate) fn mark_ready(&mut self) {
        self.state = HandleState::Ready;
    }

    /// Gives up ownership without releasing. Used when a wait times out, since the backend still
    /// holds the handle for its own pending completion.
    pub(crate) fn abandon(mut self) -> ResultHandle {
        self.state = HandleState::Invalid;
        self.raw
    }

    /// Releases the handle now.
    pub(crate) fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("raw", &self.raw)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        match self.state {
            HandleState::Invalid => return,
            HandleState::Pending => {
                log::debug!("Result handle {:?} dropped while pending, leaving it unreleased", self.raw);
                return;
            },
            HandleState::Ready => {},
        }

        log::trace!("Releasing result handle {:?} ({})", self.raw, self.state);
        self.backend.destroy_result(self.raw);
        self.state = HandleState::Invalid;
    }
}
