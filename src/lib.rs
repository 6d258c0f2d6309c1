//! Awaitable Steam inventory results with cached item definitions and items.
//!
//! The native inventory interface hands out result handles and reports their completion
//! through notifications. [`InventoryManager`] turns those into awaitable operations, keeps the
//! definition catalog and the user's items cached, and makes sure every handle is released.
//!
//! Implement [`Backend`] over the native library and forward its notifications through the
//! sender from [`event_channel`].

pub mod types;
pub mod time;
pub mod enums;
pub mod request;
pub mod response;

mod backend;
mod bridge;
mod definition_cache;
mod error;
mod handle;
mod item_store;
mod manager;
mod reader;
mod transaction;

#[cfg(test)]
mod mock;

pub use backend::{
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
pub use enums::{EResult, HandleState, TransactionState};
pub use error::{Error, Result};
pub use manager::{InventoryEvent, InventoryManager, InventoryManagerBuilder, InventoryOptions};
pub use response::{InventoryItem, InventoryResult, ItemDefinition};
pub use request::{DefinitionAmount, ItemAmount, PropertyValue};
pub use transaction::PropertyUpdate;
pub use time::ServerTime;
pub use steamid_ng::SteamID;
