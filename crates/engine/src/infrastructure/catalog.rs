//! Built-in item catalog.
//!
//! The loot table ships with the binary. Entries are constructed once at
//! boot, so item ids are stable for the lifetime of the process.

use async_trait::async_trait;

use taberna_domain::{CatalogItem, ItemId, Rarity};

use crate::infrastructure::ports::ItemCatalogPort;

pub struct StaticItemCatalog {
    items: Vec<CatalogItem>,
}

impl StaticItemCatalog {
    pub fn new() -> Self {
        let items = vec![
            entry("Dented Tankard", Rarity::Common, 1),
            entry("Patched Travel Cloak", Rarity::Common, 1),
            entry("Oak Cudgel", Rarity::Common, 3),
            entry("Jar of Pickled Herring", Rarity::Common, 5),
            entry("Barmaid's Lucky Charm", Rarity::Uncommon, 2),
            entry("Iron Buckler", Rarity::Uncommon, 4),
            entry("Juggler's Throwing Knives", Rarity::Uncommon, 7),
            entry("Cellar Key", Rarity::Rare, 5),
            entry("Smuggler's Dagger", Rarity::Rare, 8),
            entry("Brewmaster's Recipe Book", Rarity::Epic, 10),
            entry("Deed to the Tavern", Rarity::Legendary, 15),
        ];
        Self { items }
    }
}

impl Default for StaticItemCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn entry(name: &str, rarity: Rarity, level_required: i32) -> CatalogItem {
    CatalogItem {
        id: ItemId::new(),
        name: name.to_string(),
        rarity,
        level_required,
    }
}

#[async_trait]
impl ItemCatalogPort for StaticItemCatalog {
    async fn eligible_items(&self, max_level: i32) -> Vec<CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.level_required <= max_level)
            .cloned()
            .collect()
    }
}
