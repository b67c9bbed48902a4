// the reason this is named mod.rs has to do with some complexities of how
// testing is handled
//
// we are following the advice of the rust book
// https://doc.rust-lang.org/book/ch11-03-test-organization.html#submodules-in-integration-tests

#![allow(dead_code)]

use hicorr::{Axis, BinnedContainer, ContainerCollection};
use rand::distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;
use rand_xoshiro::rand_core::SeedableRng;

// based on numpy!
// https://numpy.org/doc/stable/reference/generated/numpy.isclose.html
pub fn isclose(actual: f64, ref_val: f64, rtol: f64, atol: f64) -> bool {
    let actual_nan = actual.is_nan();
    let ref_nan = ref_val.is_nan();
    if actual_nan || ref_nan {
        actual_nan && ref_nan
    } else {
        (actual - ref_val).abs() <= (atol + rtol * ref_val.abs())
    }
}

pub fn assert_all_close(actual: &[f64], expected: &[f64], rtol: f64, atol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            isclose(a, e, rtol, atol),
            "element {i}: actual = {a}, expected = {e}"
        );
    }
}

pub fn axis(n: usize) -> Axis {
    Axis::regular("x", n, 0.0, n as f64).unwrap()
}

/// a zero-filled histogram with the given per-axis bin counts
pub fn empty_histogram(name: &str, counts: &[usize]) -> BinnedContainer {
    match *counts {
        [a] => BinnedContainer::histogram_1d(name, axis(a)).unwrap(),
        [a, b] => BinnedContainer::histogram_2d(name, axis(a), axis(b)).unwrap(),
        [a, b, c] => BinnedContainer::histogram_3d(name, axis(a), axis(b), axis(c)).unwrap(),
        _ => panic!("unsupported dimensionality"),
    }
}

/// a histogram with contents drawn uniformly from `[low, high]` and Poisson
/// errors
pub fn random_histogram(
    name: &str,
    counts: &[usize],
    low: f64,
    high: f64,
    rng: &mut Xoshiro256PlusPlus,
) -> BinnedContainer {
    let mut h = empty_histogram(name, counts);
    let distribution = Uniform::new_inclusive(low, high).unwrap();
    for i in 0..h.n_bins() {
        let v = distribution.sample(rng);
        h.set_bin_at(i, v, v.abs().sqrt());
    }
    h.set_entries(h.n_bins() as f64);
    h
}

pub fn rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

pub fn collection_of(name: &str, containers: Vec<BinnedContainer>) -> ContainerCollection {
    let mut c = ContainerCollection::new(name);
    for container in containers {
        c.push(container);
    }
    c
}
