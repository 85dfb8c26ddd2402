//! Weighted selection primitive shared by both table policies

use rand::Rng;

/// Pick an index from `weights` with probability proportional to its weight.
///
/// Draws `r` from `[0, total)` and returns the first index whose running
/// sum exceeds `r`, so zero-weight candidates are never chosen while any
/// candidate has weight. When every weight is zero the pick is uniform over
/// all indices. Returns `None` only for an empty slice.
///
/// Weights are divided by the largest weight before summing, so the total
/// stays finite for any finite weights.
pub fn pick_weighted<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let max_weight = weights.iter().copied().fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return Some(rng.gen_range(0..weights.len()));
    }

    let total_weight: f64 = weights.iter().map(|w| w / max_weight).sum();
    let roll = rng.gen::<f64>() * total_weight;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w / max_weight;
        if cumulative > roll {
            return Some(i);
        }
    }

    // Rounding in the running sum can leave the roll at the top of the range
    weights.iter().rposition(|&w| w > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_has_no_pick() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pick_weighted(&mut rng, &[]), None);
    }

    #[test]
    fn test_single_nonzero_weight_always_wins() {
        let weights = [0.0, 0.0, 2.5, 0.0];
        for seed in 0..1000 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(pick_weighted(&mut rng, &weights), Some(2));
        }
    }

    #[test]
    fn test_extreme_draws_skip_zero_weights() {
        let weights = [0.0, 0.1, 0.2, 0.0];

        // Lowest possible draw
        let mut low = StepRng::new(0, 0);
        assert_eq!(pick_weighted(&mut low, &weights), Some(1));

        // Highest possible draw
        let mut high = StepRng::new(u64::MAX, 0);
        assert_eq!(pick_weighted(&mut high, &weights), Some(2));
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let weights = [0.0; 3];
        let mut counts = [0u32; 3];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..3000 {
            let idx = pick_weighted(&mut rng, &weights).unwrap();
            counts[idx] += 1;
        }

        for count in counts {
            assert!(count > 850 && count < 1150, "Counts were {:?}", counts);
        }
    }

    #[test]
    fn test_huge_weights_stay_proportional() {
        // The raw sum of these weights overflows to infinity
        let weights = [1e308, 1e308];
        let mut counts = [0u32; 2];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..1000 {
            let idx = pick_weighted(&mut rng, &weights).unwrap();
            counts[idx] += 1;
        }

        assert!(counts[0] > 400 && counts[0] < 600, "Counts were {:?}", counts);
    }

    #[test]
    fn test_pick_is_proportional() {
        let weights = [1.0, 3.0];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let iterations = 10000;

        let heavy = (0..iterations)
            .filter(|_| pick_weighted(&mut rng, &weights) == Some(1))
            .count();

        // Expected 75%
        let pct = heavy as f64 / iterations as f64;
        assert!(pct > 0.72 && pct < 0.78, "Heavy percentage was {}", pct);
    }
}
