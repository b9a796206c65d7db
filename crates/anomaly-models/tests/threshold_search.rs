// Integration tests for the best-F1 threshold search

use anomaly_models::*;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_samples(rng: &mut StdRng, len: usize) -> (Vec<u8>, Vec<f64>) {
    let mut labels: Vec<u8> = (0..len).map(|_| rng.gen_range(0..2u8)).collect();
    // Guarantee both classes
    labels[0] = 0;
    labels[len - 1] = 1;
    let scores: Vec<f64> = (0..len).map(|_| rng.gen::<f64>()).collect();
    (labels, scores)
}

#[test]
fn test_result_is_a_grid_point() {
    let mut rng = StdRng::seed_from_u64(42);
    let grid = cutoff_grid();
    for len in [2usize, 3, 10, 57, 500] {
        let (labels, scores) = random_samples(&mut rng, len);
        let search = search_max_fscore(&labels, &scores).unwrap();
        assert!(search.index < CUTOFF_COUNT);
        assert_eq!(search.cutoff, grid[search.index]);
        assert!(search.cutoff >= 0.0 && search.cutoff <= 0.99 + 1e-12);
    }
}

#[test]
fn test_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let (labels, scores) = random_samples(&mut rng, 200);
    let first = find_max_fscore(&labels, &scores).unwrap();
    let second = find_max_fscore(&labels, &scores).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn test_best_f1_is_maximum_of_curve() {
    let mut rng = StdRng::seed_from_u64(2024);
    let (labels, scores) = random_samples(&mut rng, 300);
    let search = search_max_fscore(&labels, &scores).unwrap();
    let max = search
        .curve
        .iter()
        .map(|&(_, f1)| f1)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(search.f1, max);
    // Every earlier cutoff scored strictly lower
    assert!(search.curve[..search.index].iter().all(|&(_, f1)| f1 < max));
}

#[test]
fn test_tie_keeps_smaller_cutoff() {
    // F1 is 1.0 for every cutoff in [0.20, 0.79]
    let search = search_max_fscore(&[0, 1], &[0.2, 0.8]).unwrap();
    assert_eq!(search.curve[20].1, search.curve[21].1);
    assert_eq!(search.index, 20);
    assert_relative_eq!(search.cutoff, 0.20);
    assert_relative_eq!(search.f1, 1.0);
}

#[test]
fn test_all_zero_labels() {
    let cutoff = find_max_fscore(&[0, 0, 0, 0], &[0.0, 0.25, 0.5, 0.99]).unwrap();
    assert_eq!(cutoff, 0.0);
}

#[test]
fn test_worked_example() {
    let cutoff = find_max_fscore(&[0, 0, 1, 1], &[0.1, 0.4, 0.6, 0.9]).unwrap();
    assert_relative_eq!(cutoff, 0.40);
    let cm = ConfusionMatrix::at_cutoff(&[0, 0, 1, 1], &[0.1, 0.4, 0.6, 0.9], cutoff).unwrap();
    assert_relative_eq!(cm.f1(), 1.0);
}

#[test]
fn test_matches_manual_binarization() {
    let labels = [1, 0, 1, 1, 0, 0, 1];
    let scores = [0.91, 0.35, 0.42, 0.77, 0.51, 0.08, 0.33];
    let search = search_max_fscore(&labels, &scores).unwrap();
    for &(cutoff, f1) in &search.curve {
        let predicted = binarize(&scores, cutoff);
        assert_relative_eq!(f1, f1_score(&labels, &predicted).unwrap());
    }
}

#[test]
fn test_nan_score_counts_as_negative() {
    let labels = [0, 1, 1];
    let scores = [0.1, f64::NAN, 0.9];
    let search = search_max_fscore(&labels, &scores).unwrap();
    // From 0.10 on the negative at 0.1 drops out while the NaN stays a miss
    assert_eq!(search.index, 10);
    assert_relative_eq!(search.cutoff, 0.10);
    assert_relative_eq!(search.f1, 2.0 / 3.0);
    assert_eq!(find_max_fscore(&labels, &scores).unwrap(), search.cutoff);
}
