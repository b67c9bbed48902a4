//! Builders for the uncorrelated baselines that correlators are normalized
//! by: external products of single-particle densities (`N1⊗N1`,
//! `N1⊗N1⊗N1`) and of a pair density with a single-particle density
//! (`N2⊗N1`).
//!
//! The factors are independent by construction, so the errors always combine
//! in quadrature. Each builder returns the mean bin content of the product,
//! which is a handy sanity check for the caller to log.

use crate::dimension::{expect_dims, expect_extents};
use crate::{BinnedContainer, Error};

/// value & error of `a * b` for independent factors
#[inline]
fn product_bin(a: f64, ea: f64, b: f64, eb: f64) -> (f64, f64) {
    let ta = ea * b;
    let tb = a * eb;
    (a * b, (ta * ta + tb * tb).sqrt())
}

/// Selects the axis of an `N2⊗N1` product that is occupied by the
/// single-particle factor. The pair factor fills the two remaining axes in
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SingleAxis {
    First,
    Second,
    Third,
}

/// `dst[i*nb + j] = a[i] * b[j]`, where `a` and `b` may each be 1D or 2D (2D
/// operands are flattened in row-major order) and `dst` is 1D.
pub fn product_flattened(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
) -> Result<f64, Error> {
    let nb = b.n_bins();
    expect_extents("product_flattened", dst, &[a.n_bins() * nb])?;
    for i in 0..a.n_bins() {
        for j in 0..nb {
            let (v, e) = product_bin(a.content_at(i), a.error_at(i), b.content_at(j), b.error_at(j));
            dst.set_bin_at(i * nb + j, v, e);
        }
    }
    Ok(dst.mean_content())
}

/// `dst[i*nb*nc + j*nc + k] = a[i] * b[j] * c[k]` with a 1D `dst`
pub fn product_triple_flattened(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
    c: &BinnedContainer,
) -> Result<f64, Error> {
    let (na, nb, nc) = (a.n_bins(), b.n_bins(), c.n_bins());
    expect_extents("product_triple_flattened", dst, &[na * nb * nc])?;
    fill_triple(dst, a, b, c);
    Ok(dst.mean_content())
}

/// `dst[i, j] = a[i] * b[j]` for 1D factors
pub fn product_2d(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
) -> Result<f64, Error> {
    let na = expect_dims("product_2d", a, 1)?[0];
    let nb = expect_dims("product_2d", b, 1)?[0];
    expect_extents("product_2d", dst, &[na, nb])?;
    for i in 0..na {
        for j in 0..nb {
            let (v, e) = product_bin(a.content_at(i), a.error_at(i), b.content_at(j), b.error_at(j));
            dst.set_bin_at(i * nb + j, v, e);
        }
    }
    Ok(dst.mean_content())
}

/// `dst[i, j, k] = a[i] * b[j] * c[k]` for 1D factors
pub fn product_3d(
    dst: &mut BinnedContainer,
    a: &BinnedContainer,
    b: &BinnedContainer,
    c: &BinnedContainer,
) -> Result<f64, Error> {
    let na = expect_dims("product_3d", a, 1)?[0];
    let nb = expect_dims("product_3d", b, 1)?[0];
    let nc = expect_dims("product_3d", c, 1)?[0];
    expect_extents("product_3d", dst, &[na, nb, nc])?;
    fill_triple(dst, a, b, c);
    Ok(dst.mean_content())
}

// both the flattened and the native 3D layouts are row-major, so they share
// the same buffer ordering
fn fill_triple(dst: &mut BinnedContainer, a: &BinnedContainer, b: &BinnedContainer, c: &BinnedContainer) {
    let (nb, nc) = (b.n_bins(), c.n_bins());
    for i in 0..a.n_bins() {
        for j in 0..nb {
            let (vab, eab) = product_bin(a.content_at(i), a.error_at(i), b.content_at(j), b.error_at(j));
            for k in 0..nc {
                let (v, e) = product_bin(vab, eab, c.content_at(k), c.error_at(k));
                dst.set_bin_at((i * nb + j) * nc + k, v, e);
            }
        }
    }
}

/// Builds the `N2⊗N1` baseline of a three-particle correlator in a 3D
/// `dst`. `n1` is 1D and occupies the axis chosen by `single`; `n2` is 2D
/// and its axes fill the other 2 axes of `dst`, in order.
pub fn pair_single_product(
    dst: &mut BinnedContainer,
    n2: &BinnedContainer,
    n1: &BinnedContainer,
    single: SingleAxis,
) -> Result<f64, Error> {
    let pair = expect_dims("pair_single_product", n2, 2)?;
    let (p0, p1) = (pair[0], pair[1]);
    let s = expect_dims("pair_single_product", n1, 1)?[0];
    let extents = match single {
        SingleAxis::First => [s, p0, p1],
        SingleAxis::Second => [p0, s, p1],
        SingleAxis::Third => [p0, p1, s],
    };
    expect_extents("pair_single_product", dst, &extents)?;

    let layout = *dst.layout();
    for flat in 0..dst.n_bins() {
        let [i, j, k] = layout.reverse_map_idx(flat);
        let (i_single, i_pair) = match single {
            SingleAxis::First => (i, j * p1 + k),
            SingleAxis::Second => (j, i * p1 + k),
            SingleAxis::Third => (k, i * p1 + j),
        };
        let (v, e) = product_bin(
            n2.content_at(i_pair),
            n2.error_at(i_pair),
            n1.content_at(i_single),
            n1.error_at(i_single),
        );
        dst.set_bin_at(flat, v, e);
    }
    Ok(dst.mean_content())
}
