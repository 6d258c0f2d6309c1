use super::recipe::{self, Recipe};
use crate::types::{DefinitionId, PropertyMap};
use serde::{Serialize, Deserialize};

/// The price of a definition in the user's currency, in the currency's smallest unit.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct ItemPrice {
    /// The current price.
    pub price: u64,
    /// The price before any discount.
    pub base_price: u64,
}

impl ItemPrice {
    /// The item is currently on sale.
    pub fn is_discounted(&self) -> bool {
        self.price < self.base_price
    }
}

/// Contains details about a kind of item. Definitions are immutable; a reload replaces them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ItemDefinition {
    /// The ID of this definition.
    pub id: DefinitionId,
    /// All properties of the definition as reported by the backend.
    pub properties: PropertyMap,
    /// The price. This is only included after prices were requested.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<ItemPrice>,
}

impl ItemDefinition {
    /// Creates a definition without price data.
    pub fn new(id: DefinitionId, properties: PropertyMap) -> Self {
        Self {
            id,
            properties,
            price: None,
        }
    }

    /// Gets a property by name.
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Gets a property parsed into any type that implements [`std::str::FromStr`].
    pub fn get_property_parsed<T>(&self, name: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get_property(name).and_then(|value| value.parse::<T>().ok())
    }

    /// Gets a boolean property. Accepts `true`/`false` as well as `1`/`0`.
    pub fn get_bool_property(&self, name: &str) -> Option<bool> {
        match self.get_property(name)? {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// The name of the item.
    pub fn name(&self) -> Option<&str> {
        self.get_property("name")
    }

    /// The description of the item.
    pub fn description(&self) -> Option<&str> {
        self.get_property("description")
    }

    /// The definition's type e.g. `"item"`, `"bundle"` or `"generator"`.
    pub fn item_type(&self) -> Option<&str> {
        self.get_property("type")
    }

    /// The URL to the icon for the item.
    pub fn icon_url(&self) -> Option<&str> {
        self.get_property("icon_url")
    }

    /// The URL to the large icon for the item.
    pub fn icon_url_large(&self) -> Option<&str> {
        self.get_property("icon_url_large")
    }

    /// The price category e.g. `"1;VLV100"`.
    pub fn price_category(&self) -> Option<&str> {
        self.get_property("price_category")
    }

    /// Whether items of this definition can be traded. Defaults to `false`.
    pub fn is_tradable(&self) -> bool {
        self.get_bool_property("tradable").unwrap_or(false)
    }

    /// Whether items of this definition can be sold on the market. Defaults to `false`.
    pub fn is_marketable(&self) -> bool {
        self.get_bool_property("marketable").unwrap_or(false)
    }

    /// Generators drop other items rather than being items themselves.
    pub fn is_generator(&self) -> bool {
        self.item_type() == Some("generator")
    }

    /// The recipes that can be exchanged for this definition.
    pub fn recipes(&self) -> Vec<Recipe> {
        self.get_property("exchange")
            .map(recipe::parse_recipes)
            .unwrap_or_default()
    }

    /// Returns a copy of this definition with `price` set.
    pub fn with_price(&self, price: ItemPrice) -> Self {
        Self {
            price: Some(price),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> ItemDefinition {
        let properties = [
            ("name", "Wooden Crate"),
            ("type", "generator"),
            ("tradable", "true"),
            ("marketable", "0"),
            ("exchange", "100x2"),
            ("max_stack", "20"),
        ]
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        ItemDefinition::new(5, properties)
    }

    #[test]
    fn reads_properties() {
        let definition = definition();

        assert_eq!(definition.name(), Some("Wooden Crate"));
        assert!(definition.is_generator());
        assert!(definition.is_tradable());
        assert!(!definition.is_marketable());
        assert_eq!(definition.get_property_parsed::<u32>("max_stack"), Some(20));
        assert_eq!(definition.description(), None);
    }

    #[test]
    fn reads_recipes() {
        let recipes = definition().recipes();

        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].contains_definition(100));
    }

    #[test]
    fn sets_price() {
        let priced = definition().with_price(ItemPrice {
            price: 199,
            base_price: 249,
        });

        assert!(priced.price.unwrap().is_discounted());
        assert_eq!(priced.name(), Some("Wooden Crate"));
    }
}
