mod common;

use common::{collection_of, empty_histogram, isclose, random_histogram, rng};
use hicorr::{
    R2_RELATIVE_ERROR_LIMIT, f2r2, nudyn_named, product_2d, r2_from_singles_1d,
    r2_from_singles_2d, r2_named, r2_with_baseline,
};

#[test]
fn r2_variants_agree() {
    let mut rng = rng(10582441886303702641_u64);
    let n1_1 = random_histogram("n1_1", &[4], 50.0, 100.0, &mut rng);
    let n1_2 = random_histogram("n1_2", &[3], 50.0, 100.0, &mut rng);
    let n2 = random_histogram("n2", &[4, 3], 4000.0, 6000.0, &mut rng);

    let mut baseline = empty_histogram("n1n1", &[4, 3]);
    product_2d(&mut baseline, &n1_1, &n1_2).unwrap();
    let mut with_baseline = n2.empty_like("r2_a");
    r2_with_baseline(&n2, &baseline, &mut with_baseline, false).unwrap();

    let mut from_singles = n2.empty_like("r2_b");
    r2_from_singles_1d(&n2, &n1_1, &n1_2, &mut from_singles, false).unwrap();
    assert_eq!(with_baseline.contents(), from_singles.contents());
    assert_eq!(with_baseline.errors(), from_singles.errors());

    for i in 0..n2.n_bins() {
        let expected = n2.content_at(i) / baseline.content_at(i) - 1.0;
        assert!(isclose(with_baseline.content_at(i), expected, 1e-14, 1e-14));
    }

    // swapping the single densities is a shape error
    assert!(r2_from_singles_1d(&n2, &n1_2, &n1_1, &mut from_singles, false).is_err());
}

#[test]
fn r2_from_2d_singles() {
    let mut rng = rng(99);
    let n1_1 = random_histogram("n1_1", &[2, 3], 50.0, 100.0, &mut rng);
    let n1_2 = random_histogram("n1_2", &[2, 2], 50.0, 100.0, &mut rng);
    let n2 = random_histogram("n2", &[6, 4], 4000.0, 6000.0, &mut rng);
    let mut out = n2.empty_like("r2");
    r2_from_singles_2d(&n2, &n1_1, &n1_2, &mut out, true).unwrap();
    // bin (i, j) pairs single bin i of n1_1 with single bin j of n1_2
    let (i, j) = (4, 3);
    let base = n1_1.content(&[1, 1]) * n1_2.content(&[1, 1]);
    let expected = 2.0 * n2.content(&[i, j]) / base - 1.0;
    assert!(isclose(out.content(&[i, j]), expected, 1e-14, 1e-14));
}

#[test]
fn r2_precision_floor() {
    let mut n2 = empty_histogram("n2", &[2]);
    let mut base = empty_histogram("base", &[2]);
    n2.set_bin_at(0, 10.0, 10.0 * R2_RELATIVE_ERROR_LIMIT);
    n2.set_bin_at(1, 10.0, 10.0 * R2_RELATIVE_ERROR_LIMIT * 1.01);
    base.set_bin_at(0, 5.0, 0.0);
    base.set_bin_at(1, 5.0, 0.0);
    let mut out = n2.empty_like("r2");
    r2_with_baseline(&n2, &base, &mut out, false).unwrap();
    // the limit itself is still accepted
    assert_eq!(out.content_at(0), 1.0);
    assert_eq!((out.content_at(1), out.error_at(1)), (0.0, 0.0));
}

#[test]
fn f2r2_worked_example() {
    let mut f1 = empty_histogram("f1", &[1]);
    f1.set_bin_at(0, 2.0, 0.0);
    let mut f2 = empty_histogram("f2", &[1]);
    f2.set_bin_at(0, 4.5, 0.2);
    let mut big_f2 = f1.empty_like("F2");
    let mut r2 = f1.empty_like("R2");
    f2r2([&f1, &f1], &f2, &mut big_f2, &mut r2).unwrap();
    assert_eq!(big_f2.content_at(0), 0.5);
    assert_eq!(r2.content_at(0), 0.125);
    assert_eq!(r2.error_at(0), 0.05);
}

#[test]
fn named_operands() {
    let mut rng = rng(3);
    let n2 = random_histogram("n2", &[3, 3], 400.0, 600.0, &mut rng);
    let n1n1 = random_histogram("n1n1", &[3, 3], 400.0, 600.0, &mut rng);
    let mut collection = collection_of("run", vec![n2.clone(), n1n1.clone()]);

    r2_named(&mut collection, "n2", "n1n1", "r2_11", false).unwrap();
    let mut direct = n2.empty_like("direct");
    r2_with_baseline(&n2, &n1n1, &mut direct, false).unwrap();
    assert_eq!(collection.find("r2_11").unwrap().contents(), direct.contents());

    // a second call replaces the output rather than appending
    r2_named(&mut collection, "n2", "n1n1", "r2_11", true).unwrap();
    assert_eq!(collection.len(), 3);

    let err = r2_named(&mut collection, "n2", "missing", "out", false).unwrap_err();
    assert_eq!(err.null_operand_ordinal(), Some(2));
    assert_eq!(err.kind_name(), "NullOperand");
    assert!(collection.find("out").is_none());

    r2_named(&mut collection, "n2", "n1n1", "r2_22", false).unwrap();
    nudyn_named(&mut collection, "r2_22", "r2_22", "r2_22", "nudyn").unwrap();
    let nudyn = collection.find("nudyn").unwrap();
    assert!(nudyn.contents().iter().all(|&v| v == 0.0));

    let err = nudyn_named(&mut collection, "r2_22", "r2_22", "nope", "nudyn").unwrap_err();
    assert_eq!(err.null_operand_ordinal(), Some(3));
}
