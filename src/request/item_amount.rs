use crate::response::InventoryItem;
use crate::types::{DefinitionId, ItemId};
use serde::{Serialize, Deserialize};

/// A quantity of an owned item, used as an ingredient when exchanging items.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ItemAmount {
    /// The ID of the owned item.
    pub item_id: ItemId,
    /// How many to take from the stack.
    pub quantity: u32,
}

impl From<&InventoryItem> for ItemAmount {
    fn from(item: &InventoryItem) -> ItemAmount {
        ItemAmount {
            item_id: item.id,
            quantity: u32::from(item.quantity),
        }
    }
}

impl From<(ItemId, u32)> for ItemAmount {
    fn from((item_id, quantity): (ItemId, u32)) -> ItemAmount {
        ItemAmount {
            item_id,
            quantity,
        }
    }
}

/// A quantity of a definition, used for generating, exchanging or purchasing items.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct DefinitionAmount {
    /// The definition to create items from.
    pub definition: DefinitionId,
    /// How many to create.
    pub quantity: u32,
}

impl DefinitionAmount {
    /// A single item of `definition`.
    pub fn one(definition: DefinitionId) -> Self {
        Self {
            definition,
            quantity: 1,
        }
    }
}

impl From<(DefinitionId, u32)> for DefinitionAmount {
    fn from((definition, quantity): (DefinitionId, u32)) -> DefinitionAmount {
        DefinitionAmount {
            definition,
            quantity,
        }
    }
}
