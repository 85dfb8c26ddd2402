use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Result of resolving a loot table: item name -> accumulated quantity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LootDrops {
    items: BTreeMap<String, u64>,
}

impl LootDrops {
    /// Create an empty set of drops
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `name`, creating the item at zero first if absent
    pub fn add(&mut self, name: &str, quantity: u64) {
        match self.items.get_mut(name) {
            Some(total) => *total = total.saturating_add(quantity),
            None => {
                self.items.insert(name.to_string(), quantity);
            }
        }
    }

    /// Sum another set of drops into this one, key by key
    pub fn merge(&mut self, other: LootDrops) {
        for (name, quantity) in other.items {
            self.add(&name, quantity);
        }
    }

    /// Quantity of an item, if it was dropped at all
    pub fn get(&self, name: &str) -> Option<u64> {
        self.items.get(name).copied()
    }

    /// Items in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.items.iter().map(|(name, &qty)| (name.as_str(), qty))
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities
    pub fn total_quantity(&self) -> u64 {
        self.items.values().sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, u64> {
        self.items
    }
}

impl IntoIterator for LootDrops {
    type Item = (String, u64);
    type IntoIter = btree_map::IntoIter<String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for LootDrops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, quantity)) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {}", quantity, name)?;
        }
        Ok(())
    }
}
