use crate::drops::LootDrops;
use crate::registry::LootRegistry;
use crate::table::LootTable;
use crate::ResolveError;
use rand::Rng;

/// State for one top-level resolution: the registry, the caller's rng,
/// and the chain of tables currently being generated.
pub(crate) struct Resolution<'a, R> {
    registry: &'a LootRegistry,
    rng: &'a mut R,
    in_flight: Vec<&'a str>,
}

impl<'a, R: Rng> Resolution<'a, R> {
    pub(crate) fn new(registry: &'a LootRegistry, rng: &'a mut R) -> Self {
        Resolution {
            registry,
            rng,
            in_flight: Vec::new(),
        }
    }

    pub(crate) fn rng(&mut self) -> &mut R {
        &mut *self.rng
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<&'a LootTable, ResolveError> {
        self.registry
            .get(name)
            .ok_or_else(|| ResolveError::TableNotFound(name.to_string()))
    }

    /// Generate `count` picks from `table`, failing if the table is already in flight
    pub(crate) fn generate(
        &mut self,
        table: &'a LootTable,
        count: u32,
        drops: &mut LootDrops,
    ) -> Result<(), ResolveError> {
        if let Some(start) = self.in_flight.iter().position(|&n| n == table.name()) {
            let mut chain: Vec<String> = self.in_flight[start..]
                .iter()
                .map(|n| n.to_string())
                .collect();
            chain.push(table.name().to_string());
            return Err(ResolveError::CyclicReference(chain));
        }

        tracing::trace!(
            table = table.name(),
            count,
            depth = self.in_flight.len(),
            "generating table"
        );

        self.in_flight.push(table.name());
        let result = table.generate_into(self, count, drops);
        self.in_flight.pop();
        result
    }
}

/// Resolve `count` picks from the named table into a fresh set of drops
pub fn resolve_table<R: Rng>(
    registry: &LootRegistry,
    table_name: &str,
    count: u32,
    rng: &mut R,
) -> Result<LootDrops, ResolveError> {
    let mut resolution = Resolution::new(registry, rng);
    let table = resolution.lookup(table_name)?;

    let mut drops = LootDrops::new();
    resolution.generate(table, count, &mut drops)?;
    Ok(drops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entry;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn item(name: &str, weight: f64, min: u32, max: u32) -> Entry {
        Entry::item(name, weight, min, max).unwrap()
    }

    fn reference(table: &str, weight: f64, min: u32, max: u32) -> Entry {
        Entry::reference(table, weight, min, max).unwrap()
    }

    fn gold() -> LootTable {
        LootTable::with_replacement("Gold", vec![item("Coin", 1.0, 5, 5)]).unwrap()
    }

    #[test]
    fn test_gold_scenario() {
        let registry = LootRegistry::build(vec![gold()]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let drops = resolve_table(&registry, "Gold", 1, &mut rng).unwrap();
        assert_eq!(drops.len(), 1);
        assert_eq!(drops.get("Coin"), Some(5));
    }

    #[test]
    fn test_chest_with_missing_reference_fails() {
        let chest = LootTable::without_replacement(
            "Chest",
            vec![reference("Gold", 1.0, 1, 1), reference("Gems", 1.0, 1, 1)],
        )
        .unwrap();
        let registry = LootRegistry::build(vec![gold(), chest]).unwrap();

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = resolve_table(&registry, "Chest", 2, &mut rng);
            assert_eq!(result, Err(ResolveError::TableNotFound("Gems".to_string())));
        }
    }

    #[test]
    fn test_unknown_top_level_table() {
        let registry = LootRegistry::build(vec![gold()]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = resolve_table(&registry, "Nope", 1, &mut rng);
        assert_eq!(result, Err(ResolveError::TableNotFound("Nope".to_string())));
    }

    #[test]
    fn test_zero_count_yields_nothing() {
        let registry = LootRegistry::build(vec![gold()]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let drops = resolve_table(&registry, "Gold", 0, &mut rng).unwrap();
        assert!(drops.is_empty());
    }

    #[test]
    fn test_nested_drops_are_summed() {
        let purse = LootTable::with_replacement(
            "Purse",
            vec![reference("Gold", 1.0, 2, 2), item("Button", 0.0, 1, 1)],
        )
        .unwrap();
        let registry = LootRegistry::build(vec![gold(), purse]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // 3 picks of Purse -> 6 rolls of Gold -> 30 coins
        let drops = resolve_table(&registry, "Purse", 3, &mut rng).unwrap();
        assert_eq!(drops.get("Coin"), Some(30));
        assert_eq!(drops.get("Button"), None);
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let looping =
            LootTable::with_replacement("Loop", vec![reference("Loop", 1.0, 1, 1)]).unwrap();
        let registry = LootRegistry::build(vec![looping]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = resolve_table(&registry, "Loop", 1, &mut rng);
        assert_eq!(
            result,
            Err(ResolveError::CyclicReference(vec![
                "Loop".to_string(),
                "Loop".to_string()
            ]))
        );
    }

    #[test]
    fn test_indirect_cycle_reports_chain() {
        let root = LootTable::with_replacement("Root", vec![reference("A", 1.0, 1, 1)]).unwrap();
        let a = LootTable::with_replacement("A", vec![reference("B", 1.0, 1, 1)]).unwrap();
        let b = LootTable::with_replacement("B", vec![reference("A", 1.0, 1, 1)]).unwrap();
        let registry = LootRegistry::build(vec![root, a, b]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = resolve_table(&registry, "Root", 1, &mut rng);
        assert_eq!(
            result,
            Err(ResolveError::CyclicReference(vec![
                "A".to_string(),
                "B".to_string(),
                "A".to_string()
            ]))
        );
    }

    #[test]
    fn test_shared_subtable_is_not_a_cycle() {
        // Diamond: Top -> Left, Right; Left -> Gold; Right -> Gold
        let top = LootTable::without_replacement(
            "Top",
            vec![reference("Left", 1.0, 1, 1), reference("Right", 1.0, 1, 1)],
        )
        .unwrap();
        let left = LootTable::with_replacement("Left", vec![reference("Gold", 1.0, 1, 1)]).unwrap();
        let right =
            LootTable::with_replacement("Right", vec![reference("Gold", 1.0, 1, 1)]).unwrap();
        let registry = LootRegistry::build(vec![top, left, right, gold()]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let drops = resolve_table(&registry, "Top", 2, &mut rng).unwrap();
        assert_eq!(drops.get("Coin"), Some(10));
    }

    #[test]
    fn test_failure_leaves_registry_usable() {
        let broken =
            LootTable::with_replacement("Broken", vec![reference("Gems", 1.0, 1, 1)]).unwrap();
        let registry = LootRegistry::build(vec![gold(), broken]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(resolve_table(&registry, "Broken", 1, &mut rng).is_err());
        let drops = resolve_table(&registry, "Gold", 2, &mut rng).unwrap();
        assert_eq!(drops.get("Coin"), Some(10));
    }

    #[test]
    fn test_same_seed_same_drops() {
        let mixed = LootTable::with_replacement(
            "Mixed",
            vec![
                item("Coin", 5.0, 1, 10),
                item("Gem", 2.0, 1, 2),
                item("Relic", 0.5, 1, 1),
            ],
        )
        .unwrap();
        let registry = LootRegistry::build(vec![mixed]).unwrap();

        let first = resolve_table(&registry, "Mixed", 25, &mut ChaCha8Rng::seed_from_u64(11));
        let second = resolve_table(&registry, "Mixed", 25, &mut ChaCha8Rng::seed_from_u64(11));
        assert_eq!(first.unwrap(), second.unwrap());
    }
}
