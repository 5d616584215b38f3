//! Research unlocks and the market catalog they gate.
//!
//! The unlock table is plain state owned by the simulation and handed to
//! the engine through the snapshot; nothing here is global.

use std::collections::BTreeSet;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Potion,
    Weapon,
    Armor,
}

/// One purchasable item.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShopItem {
    pub name:     &'static str,
    pub kind:     ItemKind,
    pub price:    u32,
    /// Attack bonus for weapons, defense for armor, unused for potions.
    pub power:    u32,
    /// Research that must be unlocked before the market stocks this.
    pub requires: Option<&'static str>,
}

/// Everything a marketplace can ever sell.
pub const CATALOG: &[ShopItem] = &[
    ShopItem { name: "healing_potion", kind: ItemKind::Potion, price: 20,  power: 0, requires: None },
    ShopItem { name: "iron_sword",     kind: ItemKind::Weapon, price: 60,  power: 2, requires: None },
    ShopItem { name: "leather_armor",  kind: ItemKind::Armor,  price: 50,  power: 1, requires: None },
    ShopItem { name: "steel_sword",    kind: ItemKind::Weapon, price: 120, power: 4, requires: Some("blacksmithing") },
    ShopItem { name: "chain_mail",     kind: ItemKind::Armor,  price: 110, power: 3, requires: Some("blacksmithing") },
    ShopItem { name: "enchanted_blade", kind: ItemKind::Weapon, price: 250, power: 7, requires: Some("enchanting") },
];

/// Research completed so far.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Research {
    unlocked: BTreeSet<String>,
}

impl Research {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlock(&mut self, name: &str) {
        self.unlocked.insert(name.to_owned());
    }

    pub fn is_unlocked(&self, name: &str) -> bool {
        self.unlocked.contains(name)
    }

    /// Catalog entries currently for sale, in catalog order.
    pub fn available_items(&self) -> impl Iterator<Item = &'static ShopItem> + '_ {
        CATALOG
            .iter()
            .filter(|item| item.requires.is_none_or(|r| self.is_unlocked(r)))
    }

    /// The potion for sale, if any.
    pub fn potion(&self) -> Option<&'static ShopItem> {
        self.available_items().find(|i| i.kind == ItemKind::Potion)
    }
}
