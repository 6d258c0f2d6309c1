use strum_macros::Display;

/// State of a property update transaction.
///
/// `Submitted` is only observable in logs since submitting consumes the transaction. The
/// terminal states are reported by the return value of
/// [`PropertyUpdate::submit`][crate::PropertyUpdate::submit]: `Some` is `Merged` and `None` is
/// `Failed`.
#[derive(Display, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TransactionState {
    /// A handle was acquired and no mutations were staged.
    Open,
    /// At least one mutation was accepted.
    Accumulating,
    /// The batch was sent and its result is being awaited.
    Submitted,
    /// The returned items were merged into the cached items.
    Merged,
    /// The batch did not commit.
    Failed,
}
