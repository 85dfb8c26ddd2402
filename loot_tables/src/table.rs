use crate::drops::LootDrops;
use crate::entry::Entry;
use crate::registry::LootRegistry;
use crate::resolve::Resolution;
use crate::select::pick_weighted;
use crate::{DefinitionError, ResolveError};
use rand::Rng;

/// How a table picks entries within one call to `generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionPolicy {
    /// The same entry may be picked any number of times
    WithReplacement,
    /// Each entry is picked at most once; extra picks are dropped once the pool is empty
    WithoutReplacement,
}

/// A named loot table of weighted entries
#[derive(Debug, Clone, PartialEq)]
pub struct LootTable {
    name: String,
    policy: SelectionPolicy,
    entries: Vec<Entry>,
}

impl LootTable {
    /// Create a table; a table needs at least one entry to pick from
    pub fn new(
        name: impl Into<String>,
        policy: SelectionPolicy,
        entries: Vec<Entry>,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        if entries.is_empty() {
            return Err(DefinitionError::EmptyTable(name));
        }

        Ok(LootTable {
            name,
            policy,
            entries,
        })
    }

    pub fn with_replacement(
        name: impl Into<String>,
        entries: Vec<Entry>,
    ) -> Result<Self, DefinitionError> {
        Self::new(name, SelectionPolicy::WithReplacement, entries)
    }

    pub fn without_replacement(
        name: impl Into<String>,
        entries: Vec<Entry>,
    ) -> Result<Self, DefinitionError> {
        Self::new(name, SelectionPolicy::WithoutReplacement, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Make `count` picks from this table and return everything they dropped.
    ///
    /// References are looked up in `registry`. A without-replacement table
    /// makes at most `entries().len()` picks.
    pub fn generate<R: Rng>(
        &self,
        registry: &LootRegistry,
        count: u32,
        rng: &mut R,
    ) -> Result<LootDrops, ResolveError> {
        let mut drops = LootDrops::new();
        Resolution::new(registry, rng).generate(self, count, &mut drops)?;
        Ok(drops)
    }

    pub(crate) fn generate_into<'a, R: Rng>(
        &'a self,
        resolution: &mut Resolution<'a, R>,
        count: u32,
        drops: &mut LootDrops,
    ) -> Result<(), ResolveError> {
        let mut pool: Vec<&'a Entry> = self.entries.iter().collect();
        let mut weights: Vec<f64> = pool.iter().map(|e| e.weight()).collect();

        match self.policy {
            SelectionPolicy::WithReplacement => {
                for _ in 0..count {
                    let Some(idx) = pick_weighted(resolution.rng(), &weights) else {
                        break;
                    };
                    pool[idx].resolve_into(resolution, drops)?;
                }
            }
            SelectionPolicy::WithoutReplacement => {
                let picks = pool.len().min(count as usize);
                for _ in 0..picks {
                    let Some(idx) = pick_weighted(resolution.rng(), &weights) else {
                        break;
                    };
                    // Keep the remaining order stable so a fixed seed replays exactly
                    let entry = pool.remove(idx);
                    weights.remove(idx);
                    entry.resolve_into(resolution, drops)?;
                }
            }
        }

        Ok(())
    }
}
