//! Weighted random selection over named outcomes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{PetError, Result};

/// One `{name, probability}` entry as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEntry {
    pub name: String,
    pub probability: f64,
}

impl WeightedEntry {
    pub fn new(name: &str, probability: f64) -> Self {
        Self {
            name: name.to_string(),
            probability,
        }
    }
}

/// Immutable weighted selector.
///
/// Weights are normalized at construction and stored alongside a cumulative
/// distribution aligned one-to-one with the outcome names.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedChoice {
    names: Vec<String>,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
}

impl WeightedChoice {
    pub fn new(entries: &[WeightedEntry]) -> Result<Self> {
        if entries.is_empty() {
            return Err(PetError::config("weighted choice needs at least one outcome"));
        }

        for entry in entries {
            if !entry.probability.is_finite() || entry.probability < 0.0 {
                return Err(PetError::config(format!(
                    "weight for '{}' must be a non-negative number, got {}",
                    entry.name, entry.probability
                )));
            }
        }

        // Scale by the largest weight so the sum cannot overflow.
        let largest = entries.iter().map(|e| e.probability).fold(0.0, f64::max);
        if largest <= 0.0 {
            return Err(PetError::config(format!(
                "weights for [{}] sum to zero",
                entries
                    .iter()
                    .map(|e| e.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        let scaled: Vec<f64> = entries.iter().map(|e| e.probability / largest).collect();
        let total: f64 = scaled.iter().sum();
        let weights: Vec<f64> = scaled.iter().map(|w| w / total).collect();
        let cumulative = weights
            .iter()
            .scan(0.0, |acc, w| {
                *acc += w;
                Some(*acc)
            })
            .collect();

        Ok(Self {
            names: entries.iter().map(|e| e.name.clone()).collect(),
            weights,
            cumulative,
        })
    }

    /// Outcome names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Normalized weights, summing to 1.0.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Draw one outcome.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.pick(rng.random::<f64>())
    }

    /// Selects the first entry whose cumulative value strictly exceeds `roll`,
    /// falling back to the last entry when rounding leaves none.
    pub fn pick(&self, roll: f64) -> &str {
        let index = self
            .cumulative
            .iter()
            .position(|&c| c > roll)
            .unwrap_or(self.names.len() - 1);
        &self.names[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn entries(weights: &[(&str, f64)]) -> Vec<WeightedEntry> {
        weights.iter().map(|(n, p)| WeightedEntry::new(n, *p)).collect()
    }

    #[rstest]
    #[case(&[("a", 1.0)])]
    #[case(&[("a", 0.5), ("b", 0.5)])]
    #[case(&[("a", 3.0), ("b", 1.0), ("c", 6.0)])]
    #[case(&[("a", 0.1), ("b", 0.2), ("c", 0.3), ("d", 0.7), ("e", 13.0)])]
    #[case(&[("a", 1.0), ("b", 0.0)])]
    #[case(&[("a", 1e308), ("b", 1e308)])]
    #[case(&[("a", f64::MAX), ("b", 1.0), ("c", f64::MAX)])]
    fn test_weights_normalize_to_one(#[case] raw: &[(&str, f64)]) {
        let choice = WeightedChoice::new(&entries(raw)).unwrap();
        let sum: f64 = choice.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
        assert_eq!(choice.len(), raw.len());
    }

    #[test]
    fn test_huge_weights_keep_proportions() {
        let choice = WeightedChoice::new(&entries(&[("a", 1e308), ("b", 1e308)])).unwrap();
        assert_eq!(choice.weights(), &[0.5, 0.5]);
        assert_eq!(choice.pick(0.1), "a");
        assert_eq!(choice.pick(0.9), "b");
    }

    #[test]
    fn test_cumulative_is_non_decreasing() {
        let choice =
            WeightedChoice::new(&entries(&[("a", 2.0), ("b", 0.0), ("c", 5.0)])).unwrap();
        let cumulative = choice.cumulative();
        assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
        assert!((cumulative[2] - 1.0).abs() < 1e-9);
    }

    #[rstest]
    #[case::empty(&[])]
    #[case::negative(&[("a", 1.0), ("b", -0.5)])]
    #[case::all_zero(&[("a", 0.0), ("b", 0.0)])]
    #[case::nan(&[("a", f64::NAN)])]
    fn test_invalid_weights_rejected(#[case] raw: &[(&str, f64)]) {
        let err = WeightedChoice::new(&entries(raw)).unwrap_err();
        assert!(matches!(err, PetError::Config(_)));
    }

    #[test]
    fn test_pick_uses_strict_inequality() {
        let choice = WeightedChoice::new(&entries(&[("a", 0.5), ("b", 0.5)])).unwrap();
        assert_eq!(choice.pick(0.0), "a");
        assert_eq!(choice.pick(0.49), "a");
        // Exactly on the boundary belongs to the next entry.
        assert_eq!(choice.pick(0.5), "b");
        assert_eq!(choice.pick(0.99), "b");
    }

    #[test]
    fn test_pick_falls_back_to_last() {
        let choice = WeightedChoice::new(&entries(&[("a", 0.5), ("b", 0.5)])).unwrap();
        assert_eq!(choice.pick(1.0), "b");
        assert_eq!(choice.pick(5.0), "b");
    }

    #[test]
    fn test_zero_weight_tail_never_sampled() {
        let choice = WeightedChoice::new(&entries(&[("first", 1.0), ("second", 0.0)])).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert_eq!(choice.sample(&mut rng), "first");
        }
    }

    #[test]
    fn test_even_split_converges() {
        let choice = WeightedChoice::new(&entries(&[("a", 0.5), ("b", 0.5)])).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 100_000;
        let hits = (0..n).filter(|_| choice.sample(&mut rng) == "a").count();
        let ratio = hits as f64 / f64::from(n);
        assert!((ratio - 0.5).abs() < 0.01, "ratio was {ratio}");
    }
}
