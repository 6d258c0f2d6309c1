use crate::enums::EResult;
use crate::types::ItemId;
use std::time::Duration;

/// Any range of errors encountered while talking to the inventory backend.
///
/// Awaited operations on [`InventoryManager`][crate::InventoryManager] do not return these
/// directly. An operation that did not happen resolves to `None` and the reason is logged. The
/// variants are kept distinct so the reason is never lost internally.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    /// An invalid argument was passed. Nothing was sent to the backend.
    #[error("Invalid parameter: {}", .0)]
    Parameter(&'static str),
    /// The backend refused to start the call. No handle was issued.
    #[error("Backend rejected the call")]
    Rejected,
    /// The handle became ready but reported a failure.
    #[error("Result failed: {}", .0)]
    ResultFailed(EResult),
    /// The call result completed with a failure.
    #[error("Call failed: {}", .0)]
    CallFailed(EResult),
    /// No ready notification arrived in time. The operation may still complete later.
    #[error("Timed out after {:?}", .0)]
    Timeout(Duration),
    /// Items could not be read out of a ready handle.
    #[error("Error reading result: {}", .0)]
    Read(&'static str),
    /// A staged property mutation was refused.
    #[error("Property `{name}` on item {item} was rejected")]
    PropertyRejected {
        item: ItemId,
        name: String,
    },
    /// The backend has no item definitions available.
    #[error("No item definitions are available")]
    NoDefinitions,
    /// The event loop stopped before a notification for this call could be delivered.
    #[error("Event loop closed")]
    EventLoopClosed,
    /// A call result of an unexpected kind was delivered for a call.
    #[error("Unexpected call result")]
    UnexpectedCallResult,
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
