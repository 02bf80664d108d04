//! Integer range generation and length equalization for brush strokes.
//!
//! Pointer motion arrives as sparse samples. Each segment between two samples is
//! expanded into one integer sequence per axis; the shorter sequence is then
//! grown until both can be zipped into coordinate pairs.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the shorter axis sequence is grown to match the longer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EqualizeStrategy {
    /// Duplicate interior values at random positions.
    ///
    /// This yields a biased, slightly jittery diagonal rather than an evenly
    /// spaced one. That is the intended look of the pen, not a defect.
    #[default]
    Random,
    /// Spread the shorter sequence evenly over the target length.
    Even,
}

/// Returns the inclusive sequence from `start` to `end` in unit steps.
///
/// Direction is preserved: `range(5, 1)` is `[5, 4, 3, 2, 1]`.
pub fn range(start: i32, end: i32) -> Vec<i32> {
    if start <= end {
        (start..=end).collect()
    } else {
        (end..=start).rev().collect()
    }
}

/// Pads the shorter of two sequences so both have `max(len(a), len(b))` items.
///
/// The first and last element of each input stay first and last in the output.
/// Empty inputs cannot be padded and are returned as they are.
pub fn equalize_length<R: Rng + ?Sized>(
    a: Vec<i32>,
    b: Vec<i32>,
    strategy: EqualizeStrategy,
    rng: &mut R,
) -> (Vec<i32>, Vec<i32>) {
    if a.len() == b.len() {
        return (a, b);
    }
    if a.len() > b.len() {
        let target = a.len();
        (a, grow(b, target, strategy, rng))
    } else {
        let target = b.len();
        (grow(a, target, strategy, rng), b)
    }
}

fn grow<R: Rng + ?Sized>(
    seq: Vec<i32>,
    target: usize,
    strategy: EqualizeStrategy,
    rng: &mut R,
) -> Vec<i32> {
    if seq.is_empty() {
        return seq;
    }
    match strategy {
        EqualizeStrategy::Random => grow_random(seq, target, rng),
        EqualizeStrategy::Even => grow_even(&seq, target),
    }
}

fn grow_random<R: Rng + ?Sized>(mut seq: Vec<i32>, target: usize, rng: &mut R) -> Vec<i32> {
    seq.reserve(target - seq.len());
    while seq.len() < target {
        if seq.len() == 1 {
            seq.push(seq[0]);
            continue;
        }
        // Insertion points are 1..len so the first and last slot never move.
        let index = rng.gen_range(1..seq.len());
        seq.insert(index, seq[index - 1]);
    }
    seq
}

fn grow_even(seq: &[i32], target: usize) -> Vec<i32> {
    if seq.len() == 1 {
        return vec![seq[0]; target];
    }
    let last_src = seq.len() - 1;
    let last_dst = target - 1;
    (0..target)
        .map(|i| seq[(i * last_src + last_dst / 2) / last_dst])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn range_ascending_descending_and_single() {
        assert_eq!(range(1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(range(5, 1), vec![5, 4, 3, 2, 1]);
        assert_eq!(range(7, 7), vec![7]);
        assert_eq!(range(-2, 1), vec![-2, -1, 0, 1]);
    }

    #[test]
    fn equal_lengths_are_returned_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        let (a, b) = equalize_length(
            vec![1, 2, 3],
            vec![9, 8, 7],
            EqualizeStrategy::Random,
            &mut rng,
        );
        assert_eq!(a, vec![1, 2, 3]);
        assert_eq!(b, vec![9, 8, 7]);
    }

    #[test]
    fn single_element_is_duplicated() {
        let mut rng = StdRng::seed_from_u64(2);
        let (a, b) = equalize_length(vec![509, 510], vec![501], EqualizeStrategy::Random, &mut rng);
        assert_eq!(a, vec![509, 510]);
        assert_eq!(b, vec![501, 501]);
    }

    fn assert_contract(a: &[i32], b: &[i32], out_a: &[i32], out_b: &[i32]) {
        let expected = a.len().max(b.len());
        assert_eq!(out_a.len(), expected);
        assert_eq!(out_b.len(), expected);
        assert_eq!(out_a.first(), a.first());
        assert_eq!(out_a.last(), a.last());
        assert_eq!(out_b.first(), b.first());
        assert_eq!(out_b.last(), b.last());
    }

    #[test]
    fn random_strategy_preserves_length_and_endpoints() {
        let xs = range(1183, 1160);
        let ys = range(829, 818);
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (out_x, out_y) =
                equalize_length(xs.clone(), ys.clone(), EqualizeStrategy::Random, &mut rng);
            assert_contract(&xs, &ys, &out_x, &out_y);
            // Only duplicates are inserted, so the sequence stays monotone.
            assert!(out_y.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn random_strategy_is_deterministic_for_a_seed() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            equalize_length(range(0, 3), range(0, 20), EqualizeStrategy::Random, &mut rng)
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn even_strategy_spreads_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let (a, b) = equalize_length(range(0, 2), range(0, 4), EqualizeStrategy::Even, &mut rng);
        assert_eq!(b, vec![0, 1, 2, 3, 4]);
        assert_eq!(a, vec![0, 1, 1, 2, 2]);
        assert_contract(&range(0, 2), &range(0, 4), &a, &b);
    }

    #[test]
    fn even_strategy_handles_descending_and_single() {
        let mut rng = StdRng::seed_from_u64(0);
        let (a, b) = equalize_length(vec![4], range(10, 6), EqualizeStrategy::Even, &mut rng);
        assert_eq!(a, vec![4; 5]);
        assert_eq!(b, vec![10, 9, 8, 7, 6]);
    }

    #[test]
    fn empty_input_is_left_alone() {
        let mut rng = StdRng::seed_from_u64(0);
        let (a, b) = equalize_length(Vec::new(), vec![1, 2], EqualizeStrategy::Random, &mut rng);
        assert!(a.is_empty());
        assert_eq!(b, vec![1, 2]);
    }
}
