//! Item definitions keyed by ID.

use crate::backend::{Backend, DefinitionPrice};
use crate::error::{Error, Result};
use crate::response::{ItemDefinition, ItemPrice};
use crate::types::{DefinitionId, DefinitionMap, PropertyMap};
use std::sync::Arc;
use parking_lot::{Mutex, RwLock};

/// Holds the definition catalog.
///
/// The catalog is either empty or the complete set read during the last successful reload. A
/// reload builds a new map and swaps it in whole, so lookups never observe a partial catalog.
#[derive(Debug, Clone, Default)]
pub(crate) struct DefinitionCache {
    inner: Arc<RwLock<Option<Arc<DefinitionMap>>>>,
    /// Serializes writers. Each builds from the current catalog and swaps, so two overlapping
    /// writers would lose one of the updates.
    writer: Arc<Mutex<()>>,
}

impl DefinitionCache {
    /// Rebuilds the catalog from the backend. Returns the number of definitions loaded.
    ///
    /// Prices of definitions that are still present are carried over.
    pub(crate) fn reload(&self, backend: &dyn Backend) -> Result<usize> {
        let _writer = self.writer.lock();
        let ids = read_definition_ids(backend)?;
        let previous = self.snapshot();
        let definitions = ids
            .into_iter()
            .map(|id| {
                let mut definition = ItemDefinition::new(id, read_definition_properties(backend, id));

                definition.price = previous
                    .as_ref()
                    .and_then(|previous| previous.get(&id))
                    .and_then(|previous| previous.price);

                (id, Arc::new(definition))
            })
            .collect::<DefinitionMap>();
        let count = definitions.len();

        *self.inner.write() = Some(Arc::new(definitions));
        log::debug!("Loaded {count} item definitions");

        Ok(count)
    }

    /// Looks up a definition. Always `None` before the first successful reload.
    pub(crate) fn lookup(&self, id: DefinitionId) -> Option<Arc<ItemDefinition>> {
        self.inner.read()
            .as_ref()
            .and_then(|definitions| definitions.get(&id))
            .cloned()
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }

    /// All definitions ordered by ID.
    pub(crate) fn definitions(&self) -> Vec<Arc<ItemDefinition>> {
        let Some(definitions) = self.snapshot() else {
            return Vec::new();
        };
        let mut definitions = definitions
            .values()
            .cloned()
            .collect::<Vec<_>>();

        definitions.sort_by_key(|definition| definition.id);
        definitions
    }

    /// Swaps in a catalog with `prices` applied. Prices for unknown definitions are ignored.
    /// Returns the number of definitions that received a price.
    pub(crate) fn apply_prices(&self, prices: &[DefinitionPrice]) -> usize {
        let _writer = self.writer.lock();
        let mut inner = self.inner.write();
        let Some(current) = inner.as_ref() else {
            return 0;
        };
        let mut definitions = DefinitionMap::clone(current);
        let mut priced = 0;

        for price in prices {
            if let Some(definition) = definitions.get_mut(&price.definition) {
                *definition = Arc::new(definition.with_price(ItemPrice {
                    price: price.price,
                    base_price: price.base_price,
                }));
                priced += 1;
            }
        }

        *inner = Some(Arc::new(definitions));
        priced
    }

    fn snapshot(&self) -> Option<Arc<DefinitionMap>> {
        self.inner.read().clone()
    }
}

/// Enumerates IDs in two passes: first the count, then a buffer of that size.
fn read_definition_ids(backend: &dyn Backend) -> Result<Vec<DefinitionId>> {
    let count = backend.item_definition_ids(None)
        .ok_or(Error::NoDefinitions)?;

    if count == 0 {
        return Ok(Vec::new());
    }

    let mut ids = vec![0; count as usize];
    let written = backend.item_definition_ids(Some(&mut ids))
        .ok_or(Error::NoDefinitions)?;

    ids.truncate(written as usize);
    Ok(ids)
}

fn read_definition_properties(backend: &dyn Backend, id: DefinitionId) -> PropertyMap {
    let Some(names) = backend.item_definition_property(id, None) else {
        return PropertyMap::new();
    };

    names
        .split(',')
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let value = backend.item_definition_property(id, Some(name))?;

            Some((name.to_string(), value))
        })
        .collect()
}
