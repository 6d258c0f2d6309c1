//! Types for common values in Steam inventory results.

/// Identifies an item definition. Definitions are the catalog entries items are created from.
pub type DefinitionId = i32;
/// An ID unique to a single owned item instance. Stacks and duplicates of the same definition
/// each get their own ID.
pub type ItemId = u64;
/// How many of an item are in a stack. For non-stackable items this is simply `1`.
pub type Quantity = u16;
/// An ID for an asynchronous call that completes with a call result rather than a result
/// handle, e.g. price requests and purchases.
pub type ApiCallId = u64;
/// An ID for an order created when starting a purchase.
pub type OrderId = u64;
/// An ID for a transaction created when starting a purchase.
pub type TransactionId = u64;
/// Item properties keyed by name, as reported by the backend.
pub type PropertyMap = std::collections::BTreeMap<String, String>;

pub use crate::time::ServerTime;

// Types internally used by the crate.
use crate::response::ItemDefinition;
use std::sync::Arc;
use std::collections::HashMap;

pub(crate) type DefinitionMap = HashMap<DefinitionId, Arc<ItemDefinition>>;
