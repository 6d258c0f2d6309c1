use num_enum::{TryFromPrimitive, IntoPrimitive};
use serde_repr::{Serialize_repr, Deserialize_repr};
use strum_macros::Display;

/// Result codes reported by the backend for handles and call results.
#[derive(Serialize_repr, Deserialize_repr, Display, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Clone, Copy)]
#[repr(i32)]
pub enum EResult {
    /// Success.
    OK = 1,
    /// Generic failure.
    Fail = 2,
    /// No connection to Steam.
    NoConnection = 3,
    /// A parameter was incorrect.
    InvalidParam = 8,
    /// The service is busy.
    Busy = 10,
    /// The call was made in an invalid state.
    InvalidState = 11,
    /// Access was denied.
    AccessDenied = 15,
    /// The operation timed out on the backend.
    Timeout = 16,
    /// The service is unavailable.
    ServiceUnavailable = 20,
    /// The result is not ready yet.
    Pending = 22,
    /// Too many requests of this kind.
    LimitExceeded = 25,
    /// The result is present but its data may be stale.
    Expired = 27,
    /// The user does not have enough funds for the purchase.
    InsufficientFunds = 107,
    /// Too many requests in a short period.
    RateLimitExceeded = 84,
}

impl EResult {
    /// Converts a raw code. Codes not known to this crate are treated as [`EResult::Fail`].
    pub fn from_code(code: i32) -> Self {
        Self::try_from(code).unwrap_or(Self::Fail)
    }

    /// The code is a success. [`EResult::Expired`] counts as one since the data is still
    /// readable.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::OK | Self::Expired)
    }
}
