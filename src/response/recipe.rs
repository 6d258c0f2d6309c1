use crate::types::DefinitionId;
use lazy_regex::regex_captures;
use serde::{Serialize, Deserialize};

/// One component of a recipe.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub enum Ingredient {
    /// Items of a specific definition.
    Definition {
        /// The definition.
        definition: DefinitionId,
        /// How many are required.
        quantity: u32,
    },
    /// Any items carrying a tag.
    Tag {
        /// The tag's name.
        name: String,
        /// The tag's value.
        value: String,
        /// How many are required.
        quantity: u32,
    },
}

/// A recipe listed in a definition's `exchange` property. These are read as-is; whether an
/// exchange is allowed is decided by the backend.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Recipe {
    /// The ingredients consumed by the recipe.
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Checks if the recipe uses the given definition as an ingredient.
    pub fn contains_definition(&self, definition: DefinitionId) -> bool {
        self.ingredients.iter().any(|ingredient| matches!(
            ingredient,
            Ingredient::Definition { definition: id, .. } if *id == definition
        ))
    }
}

/// Parses an `exchange` property e.g. `"101x1,102x1;103x2"`. Recipes are separated by `;` and
/// ingredients by `,`. Recipes containing an ingredient that cannot be parsed are skipped.
pub(crate) fn parse_recipes(exchange: &str) -> Vec<Recipe> {
    exchange
        .split(';')
        .map(str::trim)
        .filter(|recipe| !recipe.is_empty())
        .filter_map(|recipe| {
            let ingredients = recipe
                .split(',')
                .map(|ingredient| parse_ingredient(ingredient.trim()))
                .collect::<Option<Vec<_>>>();

            if ingredients.is_none() {
                log::debug!("Skipping unparseable recipe `{recipe}`");
            }

            ingredients.map(|ingredients| Recipe { ingredients })
        })
        .collect()
}

fn parse_ingredient(ingredient: &str) -> Option<Ingredient> {
    if let Some((_, definition, quantity)) = regex_captures!(r"^(\d+)(?:x(\d+))?$", ingredient) {
        return Some(Ingredient::Definition {
            definition: definition.parse().ok()?,
            quantity: parse_quantity(quantity)?,
        });
    }

    if let Some((_, name, value, quantity)) = regex_captures!(r"^([^:*]+):([^:*]+)(?:\*(\d+))?$", ingredient) {
        return Some(Ingredient::Tag {
            name: name.into(),
            value: value.into(),
            quantity: parse_quantity(quantity)?,
        });
    }

    None
}

fn parse_quantity(quantity: &str) -> Option<u32> {
    if quantity.is_empty() {
        Some(1)
    } else {
        quantity.parse().ok()
    }
}
