//! Random selection helpers shared by the generation stages
//!
//! Every helper takes the caller's RNG so a whole generation run draws from
//! one deterministic stream.

use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform float in `[a, b)`. Reversed bounds are swapped, equal bounds return `a`.
pub fn range_f32<R: Rng>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Bernoulli trial that tolerates probabilities outside `[0, 1]`.
pub fn chance<R: Rng>(rng: &mut R, probability: f32) -> bool {
    if probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.gen::<f32>() < probability
    }
}

/// Pick an element with probability proportional to `weight`.
///
/// Returns `None` when the slice is empty or every weight is zero. Negative
/// weights count as zero.
pub fn try_random_element_by_weight<'a, T, R, F>(
    items: &'a [T],
    mut weight: F,
    rng: &mut R,
) -> Option<&'a T>
where
    R: Rng,
    F: FnMut(&T) -> f32,
{
    let weights: Vec<f32> = items.iter().map(|item| weight(item).max(0.0)).collect();
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.gen::<f32>() * total;
    for (item, w) in items.iter().zip(weights.iter()) {
        if *w <= 0.0 {
            continue;
        }
        if roll < *w {
            return Some(item);
        }
        roll -= w;
    }
    // Float drift: fall back to the last weighted item
    items
        .iter()
        .zip(weights.iter())
        .rev()
        .find(|(_, w)| **w > 0.0)
        .map(|(item, _)| item)
}

/// Weighted pick that may also land on an implicit "nothing" option.
///
/// The "nothing" option carries `default_weight`; when it wins the result is
/// `None` even though weighted items exist.
pub fn random_element_by_weight_with_default<'a, T, R, F>(
    items: &'a [T],
    mut weight: F,
    default_weight: f32,
    rng: &mut R,
) -> Option<&'a T>
where
    R: Rng,
    F: FnMut(&T) -> f32,
{
    let weights: Vec<f32> = items.iter().map(|item| weight(item).max(0.0)).collect();
    let total: f32 = weights.iter().sum();
    let default_weight = default_weight.max(0.0);
    if total + default_weight <= 0.0 {
        return None;
    }
    let mut roll = rng.gen::<f32>() * (total + default_weight);
    if roll < default_weight {
        return None;
    }
    roll -= default_weight;
    for (item, w) in items.iter().zip(weights.iter()) {
        if *w <= 0.0 {
            continue;
        }
        if roll < *w {
            return Some(item);
        }
        roll -= w;
    }
    items
        .iter()
        .zip(weights.iter())
        .rev()
        .find(|(_, w)| **w > 0.0)
        .map(|(item, _)| item)
}

/// Uniform pick from a slice.
pub fn random_element<'a, T, R: Rng>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_weighted_pick_respects_zero_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let items = [("a", 0.0), ("b", 1.0), ("c", 0.0)];
        for _ in 0..100 {
            let picked = try_random_element_by_weight(&items, |i| i.1, &mut rng).unwrap();
            assert_eq!(picked.0, "b");
        }
    }

    #[test]
    fn test_weighted_pick_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let items: [f32; 0] = [];
        assert!(try_random_element_by_weight(&items, |w| *w, &mut rng).is_none());
        assert!(try_random_element_by_weight(&[0.0f32, 0.0], |w| *w, &mut rng).is_none());
    }

    #[test]
    fn test_default_weight_can_win() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let items = [1.0f32];
        let mut nones = 0;
        for _ in 0..1000 {
            if random_element_by_weight_with_default(&items, |w| *w, 9.0, &mut rng).is_none() {
                nones += 1;
            }
        }
        // ~90% expected
        assert!(nones > 800 && nones < 980, "nones = {}", nones);
    }

    #[test]
    fn test_range_f32_handles_reversed_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let v = range_f32(&mut rng, 1.0, 0.7);
            assert!((0.7..=1.0).contains(&v));
        }
        assert_eq!(range_f32(&mut rng, 2.0, 2.0), 2.0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!chance(&mut rng, 0.0));
        assert!(chance(&mut rng, 1.0));
        assert!(!chance(&mut rng, -3.0));
    }

    #[test]
    fn test_random_element_reaches_every_item() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let items = ["a", "b", "c"];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(*random_element(&items, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), items.len());
        let empty: [u8; 0] = [];
        assert_eq!(random_element(&empty, &mut rng), None);
    }
}
