//! Records returned from inventory operations.

mod definition;
mod inventory_result;
mod item;
mod purchase;
mod recipe;

pub use definition::{ItemDefinition, ItemPrice};
pub use inventory_result::InventoryResult;
pub use item::{InventoryItem, ItemFlags};
pub use purchase::PurchaseResult;
pub use recipe::{Ingredient, Recipe};

/// A list of items.
pub type ItemList = Vec<InventoryItem>;
