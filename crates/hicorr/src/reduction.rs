//! Folding pair-space containers into relative coordinates.
//!
//! The bookkeeping happens in `hicorr_nostd_internal` (see
//! [`hicorr_nostd_internal::accumulate_pair_index`]). Here we validate the
//! containers, run the accumulation, and normalize: every relative bin
//! holds the *unweighted average* of the pair bins that map onto it, with
//! error `sqrt(Σσ²) / n`.

use crate::dimension::{expect_dims, expect_extents};
use crate::{BinnedContainer, Error};
use hicorr_nostd_internal::{
    PairIndexMap, RelativeCoordinate, accumulate_pair_axes, accumulate_pair_index, count_empty,
};
use ndarray::{Array, Array1, Array2, Dimension};

/// Describes the outcome of a reduction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReductionSummary {
    /// the number of target bins that no pair bin mapped onto.
    ///
    /// For a well-formed pair space this is always 0; anything else points
    /// at inconsistent `n_eta`/`n_phi` arguments.
    pub empty_bins: usize,
}

fn finalize(
    target: &mut BinnedContainer,
    numerator: &[f64],
    err2: &[f64],
    denominator: &[f64],
) {
    for i in 0..target.n_bins() {
        let n = denominator[i];
        if n == 0.0 {
            target.set_bin_at(i, 0.0, 0.0);
        } else {
            target.set_bin_at(i, numerator[i] / n, err2[i].sqrt() / n);
        }
    }
}

fn standard_slice<D: Dimension>(a: &Array<f64, D>) -> &[f64] {
    a.as_slice()
        .expect("There must be a bug: accumulators are allocated in standard layout")
}

fn report_empty(operation: &str, target: &BinnedContainer, empty_bins: usize) -> ReductionSummary {
    if empty_bins > 0 {
        log::warn!(
            "{operation}: {empty_bins} bins of \"{}\" received no pair bins; check the index mapping",
            target.name()
        );
    }
    ReductionSummary { empty_bins }
}

/// Reduce a pair container over flattened `(η, φ)` indices into `(Δη, Δφ)`.
///
/// `source` must be 2D with `n_eta*n_phi` bins along each axis (the
/// flattened index is `iEta*n_phi + iPhi`). `target` must be 2D with
/// `2*n_eta - 1` Δη bins and `n_phi` Δφ bins. Δφ wraps around periodically.
pub fn reduce_pair_index(
    source: &BinnedContainer,
    target: &mut BinnedContainer,
    n_eta: usize,
    n_phi: usize,
) -> Result<ReductionSummary, Error> {
    let map = PairIndexMap::new(n_eta, n_phi).map_err(Error::internal_legacy_adhoc)?;
    let n = map.n_single();
    expect_extents("reduce_pair_index", source, &[n, n])?;
    let rel = map.relative_counts();
    expect_extents("reduce_pair_index", target, &rel)?;

    let mut numerator = Array2::<f64>::zeros(rel);
    let mut err2 = Array2::<f64>::zeros(rel);
    let mut denominator = Array2::<f64>::zeros(rel);
    let (values, errors) = source.views_2d()?;
    accumulate_pair_index(
        &map,
        values,
        errors,
        numerator.view_mut(),
        err2.view_mut(),
        denominator.view_mut(),
    )
    .map_err(Error::internal_legacy_adhoc)?;

    // the accumulators are freshly allocated (standard layout), so their
    // slices follow the target's row-major buffer
    let (numerator, err2, denominator) = (
        standard_slice(&numerator),
        standard_slice(&err2),
        standard_slice(&denominator),
    );
    let empty = count_empty(denominator);
    finalize(target, numerator, err2, denominator);
    Ok(report_empty("reduce_pair_index", target, empty))
}

/// Reduce a native pair container over `(x1, x2)` (same number of bins on
/// both axes) into the 1D relative coordinate `Δx`.
///
/// With [`RelativeCoordinate::Shifted`], `target` needs `2n - 1` bins;
/// with [`RelativeCoordinate::Periodic`] it needs `n` bins and the
/// difference wraps around exactly like Δφ in [`reduce_pair_index`].
pub fn reduce_pair_axes(
    source: &BinnedContainer,
    target: &mut BinnedContainer,
    coord: RelativeCoordinate,
) -> Result<ReductionSummary, Error> {
    let extents = expect_dims("reduce_pair_axes", source, 2)?;
    let n = extents[0];
    expect_extents("reduce_pair_axes", source, &[n, n])?;
    expect_extents("reduce_pair_axes", target, &[coord.n_relative_bins(n)])?;

    let n_rel = coord.n_relative_bins(n);
    let mut numerator = Array1::<f64>::zeros(n_rel);
    let mut err2 = Array1::<f64>::zeros(n_rel);
    let mut denominator = Array1::<f64>::zeros(n_rel);
    let (values, errors) = source.views_2d()?;
    accumulate_pair_axes(
        coord,
        values,
        errors,
        numerator.view_mut(),
        err2.view_mut(),
        denominator.view_mut(),
    )
    .map_err(Error::internal_legacy_adhoc)?;

    let denominator = standard_slice(&denominator);
    let empty = count_empty(denominator);
    finalize(target, standard_slice(&numerator), standard_slice(&err2), denominator);
    Ok(report_empty("reduce_pair_axes", target, empty))
}
