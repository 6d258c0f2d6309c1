use strum_macros::Display;

/// Lifecycle state of a result handle.
#[derive(Display, Debug, PartialEq, Eq, Clone, Copy)]
pub enum HandleState {
    /// Never issued, or already released.
    Invalid,
    /// Issued but not ready yet.
    Pending,
    /// The backend reported a final status. Successful results can be read any number of
    /// times until released.
    Ready,
}
