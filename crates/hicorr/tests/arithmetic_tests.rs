mod common;

use common::{assert_all_close, empty_histogram, random_histogram, rng};
use hicorr::{
    ErrorMode, RelativeCoordinate, add, difference, divide, product_2d, product_flattened, ratio,
    reduce_pair_axes, reduce_pair_index, same_dimensions, scale, sum,
};

#[test]
fn difference_then_add_roundtrips() {
    let mut rng = rng(10582441886303702641_u64);
    let a = random_histogram("a", &[5, 4], 1.0, 10.0, &mut rng);
    let b = random_histogram("b", &[5, 4], 1.0, 10.0, &mut rng);
    let mut d = a.empty_like("d");
    difference(&mut d, &a, &b, ErrorMode::Uncorrelated).unwrap();
    add(&mut d, &b, 1.0, ErrorMode::Uncorrelated).unwrap();
    assert_all_close(d.contents(), a.contents(), 1e-14, 1e-14);
}

#[test]
fn self_ratio_is_one() {
    let mut rng = rng(42);
    let mut a = random_histogram("a", &[7], 0.5, 3.0, &mut rng);
    a.set_bin_at(3, 0.0, 0.0);
    for mode in [ErrorMode::Uncorrelated, ErrorMode::Correlated] {
        let mut r = a.empty_like("r");
        ratio(&mut r, &a, &a, mode).unwrap();
        for i in 0..a.n_bins() {
            if a.content_at(i) == 0.0 {
                assert_eq!((r.content_at(i), r.error_at(i)), (0.0, 0.0));
            } else {
                assert_eq!(r.content_at(i), 1.0);
                assert_eq!(r.error_at(i), 0.0);
            }
        }
    }
}

#[test]
fn mismatched_dimensionality_changes_nothing() {
    let mut rng = rng(7);
    let mut a = random_histogram("a", &[3, 4], 1.0, 2.0, &mut rng);
    let mut b = random_histogram("b", &[3, 4, 1], 1.0, 2.0, &mut rng);
    let (a_before, b_before) = (a.clone(), b.clone());

    assert!(same_dimensions("test", &a, &b).unwrap_err().is_dimension_mismatch());
    assert!(add(&mut a, &b, 1.0, ErrorMode::Uncorrelated).unwrap_err().is_dimension_mismatch());
    assert!(divide(&mut b, &a, ErrorMode::Correlated).unwrap_err().is_dimension_mismatch());
    let c = a.clone();
    assert!(sum(&mut a, &b, &c, 1.0, 1.0, ErrorMode::Uncorrelated).is_err());
    assert!(ratio(&mut b, &c, &c, ErrorMode::Uncorrelated).is_err());

    assert_eq!(a.contents(), a_before.contents());
    assert_eq!(a.errors(), a_before.errors());
    assert_eq!(b.contents(), b_before.contents());
    assert_eq!(b.errors(), b_before.errors());
}

#[test]
fn correlated_ratio_of_subset() {
    // b is a subset of a: σ(a/b) uses |rel_a² − rel_b²|
    let mut a = empty_histogram("a", &[1]);
    let mut b = empty_histogram("b", &[1]);
    a.set_bin_at(0, 100.0, 10.0);
    b.set_bin_at(0, 25.0, 5.0);
    let mut r = a.empty_like("r");
    ratio(&mut r, &b, &a, ErrorMode::Correlated).unwrap();
    assert_eq!(r.content_at(0), 0.25);
    let expected = 0.25 * (0.2_f64 * 0.2 - 0.1 * 0.1).sqrt();
    assert!(common::isclose(r.error_at(0), expected, 1e-14, 0.0));
}

#[test]
fn scale_then_uniform_reduction() {
    // a constant pair density reduces to a constant in (Δη, Δφ)
    let (n_eta, n_phi) = (3, 4);
    let n = n_eta * n_phi;
    let mut pair = empty_histogram("n2", &[n, n]);
    for i in 0..pair.n_bins() {
        pair.set_bin_at(i, 1.0, 0.1);
    }
    scale(&mut pair, 2.5);
    let mut target = empty_histogram("dedp", &[2 * n_eta - 1, n_phi]);
    let summary = reduce_pair_index(&pair, &mut target, n_eta, n_phi).unwrap();
    assert_eq!(summary.empty_bins, 0);
    for i in 0..target.n_bins() {
        assert_eq!(target.content_at(i), 2.5);
    }
    // Δη = 0, Δφ = 0 receives n_eta*n_phi pair bins
    let err = target.error(&[n_eta - 1, 0]);
    assert!(common::isclose(err, 0.25 / (n as f64).sqrt(), 1e-12, 0.0));
    // the outermost Δη bins only receive n_phi pair bins
    let err = target.error(&[0, 0]);
    assert!(common::isclose(err, 0.25 / (n_phi as f64).sqrt(), 1e-12, 0.0));

    let mut wrong = empty_histogram("wrong", &[2 * n_eta, n_phi]);
    assert!(reduce_pair_index(&pair, &mut wrong, n_eta, n_phi).is_err());
}

#[test]
fn reduced_baseline_matches_direct_product() {
    // N1⊗N1 over (η, φ), flattened, then reduced: a uniform N1 gives a
    // uniform baseline in relative coordinates
    let mut n1 = empty_histogram("n1", &[2, 3]);
    for i in 0..n1.n_bins() {
        n1.set_bin_at(i, 2.0, 0.0);
    }
    let mut n1n1 = empty_histogram("n1n1", &[36]);
    let mean = product_flattened(&mut n1n1, &n1, &n1).unwrap();
    assert_eq!(mean, 4.0);

    let mut n1_1d = empty_histogram("n1", &[6]);
    for i in 0..6 {
        n1_1d.set_bin_at(i, i as f64, 0.0);
    }
    let mut native = empty_histogram("n1n1", &[6, 6]);
    product_2d(&mut native, &n1_1d, &n1_1d).unwrap();
    let mut dx = empty_histogram("dx", &[11]);
    reduce_pair_axes(&native, &mut dx, RelativeCoordinate::Shifted).unwrap();
    // Δ = +5: only (5, 0) → 0
    assert_eq!(dx.content(&[10]), 0.0);
    // Δ = 0: mean of i² for i in 0..6
    assert_eq!(dx.content(&[5]), 55.0 / 6.0);
}
