//! The correlation-function algebra.
//!
//! Everything in here is a pure bin-wise transform: the inputs are read, a
//! single output (or pair of outputs) is overwritten, and nothing else is
//! modified. Shapes are validated up front.
//!
//! # Precision floors
//!
//! Bins where the normalization is meaningless (empty, negative or dominated
//! by its statistical error) are clamped to `(0, 0)` rather than producing
//! `inf`/`NaN`. The thresholds are [`R2_RELATIVE_ERROR_LIMIT`] and
//! [`crate::CUMULANT_FLOOR`].

use crate::arithmetic::{ErrorMode, add, sum};
use crate::dimension::{all_same_dimensions, expect_dims, expect_extents, same_dimensions};
use crate::{BinnedContainer, ContainerCollection, Error};
use hicorr_nostd_internal::FactorialMoments;

/// An R2 bin is zeroed when the relative error of either the pair density
/// or the baseline exceeds this value
pub const R2_RELATIVE_ERROR_LIMIT: f64 = 0.5;

/// The factor applied to `N2` before normalizing. When pairs were only
/// counted once (`ij_normalization`), the pair density is doubled.
#[inline]
fn pair_factor(ij_normalization: bool) -> f64 {
    if ij_normalization { 2.0 } else { 1.0 }
}

/// `R2 = k·n2/baseline − 1`, with value & error clamped to zero for bins
/// below the precision floor
#[inline]
fn r2_bin(n2: f64, e2: f64, base: f64, ebase: f64, k: f64) -> (f64, f64) {
    if n2 <= 0.0 || base <= 0.0 {
        return (0.0, 0.0);
    }
    let rel2 = e2 / n2;
    let relbase = ebase / base;
    if rel2 > R2_RELATIVE_ERROR_LIMIT || relbase > R2_RELATIVE_ERROR_LIMIT {
        return (0.0, 0.0);
    }
    let ratio = k * n2 / base;
    (ratio - 1.0, ratio * (rel2 * rel2 + relbase * relbase).sqrt())
}

#[inline]
fn product(a: f64, ea: f64, b: f64, eb: f64) -> (f64, f64) {
    let ta = ea * b;
    let tb = a * eb;
    (a * b, (ta * ta + tb * tb).sqrt())
}

/// R2 from a pair density and a precomputed baseline (e.g. `N1⊗N1`) of the
/// same shape
pub fn r2_with_baseline(
    n2: &BinnedContainer,
    n1n1: &BinnedContainer,
    out: &mut BinnedContainer,
    ij_normalization: bool,
) -> Result<(), Error> {
    all_same_dimensions("r2_with_baseline", &[n2, n1n1, &*out])?;
    let k = pair_factor(ij_normalization);
    for i in 0..out.n_bins() {
        let (v, e) = r2_bin(
            n2.content_at(i),
            n2.error_at(i),
            n1n1.content_at(i),
            n1n1.error_at(i),
            k,
        );
        out.set_bin_at(i, v, e);
    }
    Ok(())
}

/// R2 over `(x1, x2)` where `n2` is 2D and the baseline is built on the fly
/// from the 1D single densities: `n1_1` along the first axis and `n1_2`
/// along the second
pub fn r2_from_singles_1d(
    n2: &BinnedContainer,
    n1_1: &BinnedContainer,
    n1_2: &BinnedContainer,
    out: &mut BinnedContainer,
    ij_normalization: bool,
) -> Result<(), Error> {
    let na = expect_dims("r2_from_singles_1d", n1_1, 1)?[0];
    let nb = expect_dims("r2_from_singles_1d", n1_2, 1)?[0];
    expect_extents("r2_from_singles_1d", n2, &[na, nb])?;
    same_dimensions("r2_from_singles_1d", n2, out)?;
    r2_outer(n2, n1_1, n1_2, out, ij_normalization);
    Ok(())
}

/// Like [`r2_from_singles_1d`], but the single densities are 2D (e.g. over
/// `(η, φ)`) and each axis of `n2` runs over a flattened single index
/// (`i*n_second + j`)
pub fn r2_from_singles_2d(
    n2: &BinnedContainer,
    n1_1: &BinnedContainer,
    n1_2: &BinnedContainer,
    out: &mut BinnedContainer,
    ij_normalization: bool,
) -> Result<(), Error> {
    expect_dims("r2_from_singles_2d", n1_1, 2)?;
    expect_dims("r2_from_singles_2d", n1_2, 2)?;
    expect_extents("r2_from_singles_2d", n2, &[n1_1.n_bins(), n1_2.n_bins()])?;
    same_dimensions("r2_from_singles_2d", n2, out)?;
    r2_outer(n2, n1_1, n1_2, out, ij_normalization);
    Ok(())
}

// the dense buffers of 1D & 2D single densities are both indexed by the
// flattened single index, so one loop serves both variants
fn r2_outer(
    n2: &BinnedContainer,
    n1_1: &BinnedContainer,
    n1_2: &BinnedContainer,
    out: &mut BinnedContainer,
    ij_normalization: bool,
) {
    let k = pair_factor(ij_normalization);
    let nb = n1_2.n_bins();
    for i in 0..n1_1.n_bins() {
        for j in 0..nb {
            let (base, ebase) = product(
                n1_1.content_at(i),
                n1_1.error_at(i),
                n1_2.content_at(j),
                n1_2.error_at(j),
            );
            let flat = i * nb + j;
            let (v, e) = r2_bin(n2.content_at(flat), n2.error_at(flat), base, ebase, k);
            out.set_bin_at(flat, v, e);
        }
    }
}

/// `v / integral` where the integral carries a global relative error
#[inline]
fn normalized_bin(v: f64, e: f64, integral: f64, rel_integral: f64) -> (f64, f64) {
    let r = v / integral;
    if v == 0.0 {
        (0.0, e / integral)
    } else {
        let rel = e / v;
        (r, r.abs() * (rel * rel + rel_integral * rel_integral).sqrt())
    }
}

fn normalize_into(
    out: &mut BinnedContainer,
    values: impl Iterator<Item = (f64, f64)>,
    integral: (f64, f64),
) {
    let (total, etotal) = integral;
    if total <= 0.0 {
        log::warn!(
            "balance function \"{}\": non-positive normalization integral {total}",
            out.name()
        );
        out.reset();
        return;
    }
    let rel = etotal / total;
    for (i, (v, e)) in values.enumerate() {
        let (v, e) = normalized_bin(v, e, total, rel);
        out.set_bin_at(i, v, e);
    }
}

/// Computes both balance-function orderings from a 2D pair density.
///
/// `bf_12` has the shape of `n2_12` and is `n2_12 / ∫n1_2`. `bf_21` has the
/// transposed shape and is `transpose(n2_12) / ∫n1_1`. If an integral is not
/// positive, the corresponding output is zeroed.
pub fn balance_function(
    n1_1: &BinnedContainer,
    n1_2: &BinnedContainer,
    n2_12: &BinnedContainer,
    bf_12: &mut BinnedContainer,
    bf_21: &mut BinnedContainer,
) -> Result<(), Error> {
    let extents = expect_dims("balance_function", n2_12, 2)?;
    let (n_first, n_second) = (extents[0], extents[1]);
    expect_extents("balance_function", bf_12, &[n_first, n_second])?;
    expect_extents("balance_function", bf_21, &[n_second, n_first])?;

    let direct = (0..n2_12.n_bins()).map(|i| (n2_12.content_at(i), n2_12.error_at(i)));
    normalize_into(bf_12, direct, n1_2.integral());

    // walk bf_21 in its own row-major order, i.e. (j, i) of n2_12
    let swapped = (0..n_second)
        .flat_map(|j| (0..n_first).map(move |i| i * n_second + j))
        .map(|flat| (n2_12.content_at(flat), n2_12.error_at(flat)));
    normalize_into(bf_21, swapped, n1_1.integral());
    Ok(())
}

/// Combines the four charge orderings of a balance function:
/// `B = ½[(B₊₋ − B₋₋) + (B₋₊ − B₊₊)]`.
///
/// `b_us` & `b_su` are the unlike-sign orderings (`+-` and `-+`), `b_ll` &
/// `b_uu` the like-sign ones (`--` and `++`). The inputs are independent.
pub fn combine_balance_functions(
    dst: &mut BinnedContainer,
    b_us: &BinnedContainer,
    b_su: &BinnedContainer,
    b_ll: &BinnedContainer,
    b_uu: &BinnedContainer,
) -> Result<(), Error> {
    all_same_dimensions(
        "combine_balance_functions",
        &[&*dst, b_us, b_su, b_ll, b_uu],
    )?;
    sum(dst, b_us, b_ll, 0.5, -0.5, ErrorMode::Uncorrelated)?;
    let mut other = dst.empty_like("combine_balance_functions_tmp");
    sum(&mut other, b_su, b_uu, 0.5, -0.5, ErrorMode::Uncorrelated)?;
    add(dst, &other, 1.0, ErrorMode::Uncorrelated)
}

/// A factorial moment container together with the (1-based) particle labels
/// it describes
type Moment<'a> = (&'a [usize], &'a BinnedContainer);

/// Shared implementation of the cumulant calculators.
///
/// The last entry of `moments` must be the moment of every particle: its
/// error is reported as the error of the cumulant.
fn factorial_cumulant(
    operation: &'static str,
    order: usize,
    moments: &[Moment],
    f_out: &mut BinnedContainer,
    r_out: &mut BinnedContainer,
) -> Result<(), Error> {
    let mut shapes: Vec<&BinnedContainer> = moments.iter().map(|(_, c)| *c).collect();
    shapes.push(&*f_out);
    shapes.push(&*r_out);
    all_same_dimensions(operation, &shapes)?;
    let top = moments
        .last()
        .map(|(_, c)| *c)
        .ok_or_else(|| Error::internal_legacy_adhoc("no factorial moments were provided"))?;

    let mut scratch = FactorialMoments::new(order).map_err(Error::internal_legacy_adhoc)?;
    for i in 0..f_out.n_bins() {
        for (members, c) in moments {
            scratch.set_members(members, c.content_at(i));
        }
        if scratch.below_floor() {
            f_out.set_bin_at(i, 0.0, 0.0);
            r_out.set_bin_at(i, 0.0, 0.0);
            continue;
        }
        let f = scratch.cumulant();
        let ef = top.error_at(i);
        let norm = scratch.single_product();
        f_out.set_bin_at(i, f, ef);
        r_out.set_bin_at(i, f / norm, ef / norm);
    }
    Ok(())
}

/// Two-particle factorial cumulant `F2 = f₁₂ − f₁f₂` and its normalized form
/// `R2 = F2/(f₁f₂)`
pub fn f2r2(
    f1: [&BinnedContainer; 2],
    f2_12: &BinnedContainer,
    f2_out: &mut BinnedContainer,
    r2_out: &mut BinnedContainer,
) -> Result<(), Error> {
    let moments: [Moment; 3] = [(&[1], f1[0]), (&[2], f1[1]), (&[1, 2], f2_12)];
    factorial_cumulant("f2r2", 2, &moments, f2_out, r2_out)
}

/// Three-particle factorial cumulant and `R3 = F3/(f₁f₂f₃)`.
///
/// `f2` holds the pair moments in the order `[f₁₂, f₁₃, f₂₃]`.
pub fn f3r3(
    f1: [&BinnedContainer; 3],
    f2: [&BinnedContainer; 3],
    f3_123: &BinnedContainer,
    f3_out: &mut BinnedContainer,
    r3_out: &mut BinnedContainer,
) -> Result<(), Error> {
    let moments: [Moment; 7] = [
        (&[1], f1[0]),
        (&[2], f1[1]),
        (&[3], f1[2]),
        (&[1, 2], f2[0]),
        (&[1, 3], f2[1]),
        (&[2, 3], f2[2]),
        (&[1, 2, 3], f3_123),
    ];
    factorial_cumulant("f3r3", 3, &moments, f3_out, r3_out)
}

/// Four-particle factorial cumulant and `R4 = F4/(f₁f₂f₃f₄)`.
///
/// `f2` holds the pair moments in the order
/// `[f₁₂, f₁₃, f₁₄, f₂₃, f₂₄, f₃₄]` and `f3` holds the triplet moments in
/// the order `[f₁₂₃, f₁₂₄, f₁₃₄, f₂₃₄]`.
pub fn f4r4(
    f1: [&BinnedContainer; 4],
    f2: [&BinnedContainer; 6],
    f3: [&BinnedContainer; 4],
    f4_1234: &BinnedContainer,
    f4_out: &mut BinnedContainer,
    r4_out: &mut BinnedContainer,
) -> Result<(), Error> {
    let moments: [Moment; 15] = [
        (&[1], f1[0]),
        (&[2], f1[1]),
        (&[3], f1[2]),
        (&[4], f1[3]),
        (&[1, 2], f2[0]),
        (&[1, 3], f2[1]),
        (&[1, 4], f2[2]),
        (&[2, 3], f2[3]),
        (&[2, 4], f2[4]),
        (&[3, 4], f2[5]),
        (&[1, 2, 3], f3[0]),
        (&[1, 2, 4], f3[1]),
        (&[1, 3, 4], f3[2]),
        (&[2, 3, 4], f3[3]),
        (&[1, 2, 3, 4], f4_1234),
    ];
    factorial_cumulant("f4r4", 4, &moments, f4_out, r4_out)
}

/// `νdyn = R2₁₁ + R2₂₂ − 2·R2₁₂`, with the input errors combined in
/// quadrature with weights `(1, 1, 4)`
pub fn nudyn(
    r2_11: &BinnedContainer,
    r2_22: &BinnedContainer,
    r2_12: &BinnedContainer,
    out: &mut BinnedContainer,
) -> Result<(), Error> {
    all_same_dimensions("nudyn", &[r2_11, r2_22, r2_12, &*out])?;
    for i in 0..out.n_bins() {
        let v = r2_11.content_at(i) + r2_22.content_at(i) - 2.0 * r2_12.content_at(i);
        let (e11, e22, e12) = (r2_11.error_at(i), r2_22.error_at(i), r2_12.error_at(i));
        out.set_bin_at(i, v, (e11 * e11 + e22 * e22 + 4.0 * e12 * e12).sqrt());
    }
    Ok(())
}

/// Looks up `n2` and `n1n1` in `collection`, computes
/// [`r2_with_baseline`], and stores the result under `out_name` (replacing
/// any container with that name)
pub fn r2_named(
    collection: &mut ContainerCollection,
    n2: &str,
    n1n1: &str,
    out_name: &str,
    ij_normalization: bool,
) -> Result<(), Error> {
    let n2 = collection.operand("r2_named", 1, n2)?;
    let n1n1 = collection.operand("r2_named", 2, n1n1)?;
    let mut out = n2.empty_like(out_name);
    r2_with_baseline(n2, n1n1, &mut out, ij_normalization)?;
    collection.put(out);
    Ok(())
}

/// Looks up the three R2 containers in `collection`, computes [`nudyn`],
/// and stores the result under `out_name`
pub fn nudyn_named(
    collection: &mut ContainerCollection,
    r2_11: &str,
    r2_22: &str,
    r2_12: &str,
    out_name: &str,
) -> Result<(), Error> {
    let r2_11 = collection.operand("nudyn_named", 1, r2_11)?;
    let r2_22 = collection.operand("nudyn_named", 2, r2_22)?;
    let r2_12 = collection.operand("nudyn_named", 3, r2_12)?;
    let mut out = r2_11.empty_like(out_name);
    nudyn(r2_11, r2_22, r2_12, &mut out)?;
    collection.put(out);
    Ok(())
}
