use crate::drops::LootDrops;
use crate::registry::LootRegistry;
use crate::resolve::Resolution;
use crate::{EntryError, ResolveError};
use rand::Rng;

/// What an entry produces when selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Drops the item called `name` directly
    Item,
    /// Rolls the table called `name`, once per drop
    Reference,
}

/// One weighted, repeatable selection unit within a loot table
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    kind: EntryKind,
    name: String,
    weight: f64,
    min_drops: u32,
    max_drops: u32,
}

impl Entry {
    /// Create an entry, rejecting inverted drop ranges and negative or non-finite weights
    pub fn new(
        kind: EntryKind,
        name: impl Into<String>,
        weight: f64,
        min_drops: u32,
        max_drops: u32,
    ) -> Result<Self, EntryError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(EntryError::InvalidWeight(weight));
        }
        if min_drops > max_drops {
            return Err(EntryError::InvalidRange {
                min: min_drops,
                max: max_drops,
            });
        }

        Ok(Entry {
            kind,
            name: name.into(),
            weight,
            min_drops,
            max_drops,
        })
    }

    pub fn item(
        name: impl Into<String>,
        weight: f64,
        min_drops: u32,
        max_drops: u32,
    ) -> Result<Self, EntryError> {
        Self::new(EntryKind::Item, name, weight, min_drops, max_drops)
    }

    pub fn reference(
        table: impl Into<String>,
        weight: f64,
        min_drops: u32,
        max_drops: u32,
    ) -> Result<Self, EntryError> {
        Self::new(EntryKind::Reference, table, weight, min_drops, max_drops)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Item name for item entries, table name for references
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn min_drops(&self) -> u32 {
        self.min_drops
    }

    pub fn max_drops(&self) -> u32 {
        self.max_drops
    }

    /// Roll how many times this entry resolves, uniform over the inclusive range
    pub fn roll_drop_count<R: Rng>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min_drops..=self.max_drops)
    }

    /// Resolve this entry once against a registry and return what it dropped
    pub fn resolve<R: Rng>(
        &self,
        registry: &LootRegistry,
        rng: &mut R,
    ) -> Result<LootDrops, ResolveError> {
        let mut drops = LootDrops::new();
        let mut resolution = Resolution::new(registry, rng);
        self.resolve_into(&mut resolution, &mut drops)?;
        Ok(drops)
    }

    pub(crate) fn resolve_into<'a, R: Rng>(
        &'a self,
        resolution: &mut Resolution<'a, R>,
        drops: &mut LootDrops,
    ) -> Result<(), ResolveError> {
        let drop_count = self.roll_drop_count(resolution.rng());
        tracing::trace!(entry = %self.name, drop_count, "rolled entry");

        match self.kind {
            EntryKind::Item => {
                drops.add(&self.name, u64::from(drop_count));
                Ok(())
            }
            EntryKind::Reference => {
                let table = resolution.lookup(&self.name)?;
                resolution.generate(table, drop_count, drops)
            }
        }
    }
}
