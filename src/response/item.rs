use crate::backend::RawItem;
use crate::request::PropertyValue;
use crate::time::{self, ServerTime};
use crate::types::{DefinitionId, ItemId, PropertyMap, Quantity};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Flags describing the state of an owned item.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(transparent)]
pub struct ItemFlags(pub u16);

impl ItemFlags {
    /// The item is untradable.
    pub const NO_TRADE: u16 = 1 << 0;
    /// The item was removed from the inventory.
    pub const REMOVED: u16 = 1 << 8;
    /// The item was consumed.
    pub const CONSUMED: u16 = 1 << 9;

    /// Checks whether every bit in `flag` is set.
    pub fn contains(&self, flag: u16) -> bool {
        self.0 & flag == flag
    }
}

/// An owned item.
///
/// Two items with the same `id` are the same logical item. Items are never mutated in place by
/// this crate, newer records replace older ones as a whole.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct InventoryItem {
    /// The ID unique to this item instance.
    pub id: ItemId,
    /// The definition this item was created from.
    pub definition: DefinitionId,
    /// The size of the stack.
    pub quantity: Quantity,
    /// State flags.
    pub flags: ItemFlags,
    /// Properties of the item. This is only included when the result was read with properties.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
}

impl InventoryItem {
    /// The item cannot be traded.
    pub fn is_no_trade(&self) -> bool {
        self.flags.contains(ItemFlags::NO_TRADE)
    }

    /// The item was removed, e.g. as the ingredient of an exchange.
    pub fn is_removed(&self) -> bool {
        self.flags.contains(ItemFlags::REMOVED)
    }

    /// The item was consumed.
    pub fn is_consumed(&self) -> bool {
        self.flags.contains(ItemFlags::CONSUMED)
    }

    /// Gets a property by name.
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|properties| properties.get(name))
            .map(String::as_str)
    }

    /// Gets a property parsed into any type that implements [`std::str::FromStr`].
    pub fn get_property_parsed<T>(&self, name: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get_property(name).and_then(|value| value.parse::<T>().ok())
    }

    /// When the item was acquired.
    pub fn acquired(&self) -> Option<ServerTime> {
        self.get_property("acquired").and_then(time::parse_acquired_time)
    }

    /// How the item was obtained e.g. `"playtime"`, `"purchase"` or `"external"`.
    pub fn origin(&self) -> Option<&str> {
        self.get_property("origin")
    }

    /// Dynamic properties set through property updates. These are reported as a JSON object in
    /// the `dynamic_props` property. `None` if the property is missing or malformed.
    pub fn dynamic_properties(&self) -> Option<HashMap<String, PropertyValue>> {
        let json = self.get_property("dynamic_props")?;

        match serde_json::from_str(json) {
            Ok(properties) => Some(properties),
            Err(error) => {
                log::debug!("Malformed dynamic_props on item {}: {error}", self.id);
                None
            },
        }
    }

    /// Gets a single dynamic property.
    pub fn get_dynamic_property(&self, name: &str) -> Option<PropertyValue> {
        self.dynamic_properties()?.remove(name)
    }
}

impl From<RawItem> for InventoryItem {
    fn from(item: RawItem) -> Self {
        Self {
            id: item.item_id,
            definition: item.definition,
            quantity: item.quantity,
            flags: ItemFlags(item.flags),
            properties: None,
        }
    }
}
