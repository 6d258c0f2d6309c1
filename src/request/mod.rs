//! Values passed into inventory operations.

mod item_amount;
mod property_value;

pub use item_amount::{ItemAmount, DefinitionAmount};
pub use property_value::PropertyValue;
