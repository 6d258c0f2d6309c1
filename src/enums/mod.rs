//! Enumerated types.

mod eresult;
mod handle_state;
mod transaction_state;

pub use eresult::EResult;
pub use handle_state::HandleState;
pub use transaction_state::TransactionState;
