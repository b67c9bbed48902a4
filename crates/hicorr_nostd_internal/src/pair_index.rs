//! Index arithmetic for folding pair-space bins into relative coordinates.
//!
//! Pair histograms are usually filled over the flattened single-particle
//! index `i = iEta*nPhi + iPhi` of each member of the pair. Most correlation
//! observables are instead quoted as a function of the relative coordinates
//! `(Δη, Δφ)`. The functions here perform the bookkeeping part of that fold
//! (sums, squared-error sums & the number of pair bins contributing to each
//! relative bin). The final normalization involves a square root, so it
//! lives in the public crate.

use ndarray::{ArrayView2, ArrayViewMut1, ArrayViewMut2};

/// Describes how the difference of 2 bin indices along a single axis (with
/// `n` bins) is mapped to a non-negative relative-coordinate index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativeCoordinate {
    /// `i - j + n - 1`; the relative axis holds `2n - 1` bins and the bin
    /// with zero separation sits at index `n - 1`
    Shifted,
    /// `(i - j) mod n`; the relative axis holds `n` bins (e.g. azimuth)
    Periodic,
}

impl RelativeCoordinate {
    /// number of relative-coordinate bins produced from an axis of `n` bins
    pub fn n_relative_bins(&self, n: usize) -> usize {
        match self {
            Self::Shifted => 2 * n - 1,
            Self::Periodic => n,
        }
    }

    /// relative-coordinate index for the pair of axis indices `(i, j)`
    #[inline]
    pub fn relative_index(&self, i: usize, j: usize, n: usize) -> usize {
        match self {
            Self::Shifted => i + n - 1 - j,
            Self::Periodic => (i + n - j) % n,
        }
    }

    /// the relative index corresponding to the negated separation
    #[inline]
    pub fn negated_index(&self, d: usize, n: usize) -> usize {
        match self {
            Self::Shifted => 2 * n - 2 - d,
            Self::Periodic => (n - d) % n,
        }
    }
}

/// Maps a pair of flattened `(η, φ)` indices onto `(Δη, Δφ)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairIndexMap {
    n_eta: usize,
    n_phi: usize,
}

impl PairIndexMap {
    pub fn new(n_eta: usize, n_phi: usize) -> Result<Self, &'static str> {
        if n_eta == 0 || n_phi == 0 {
            Err("n_eta and n_phi must both be positive")
        } else {
            Ok(Self { n_eta, n_phi })
        }
    }

    pub fn n_eta(&self) -> usize {
        self.n_eta
    }

    pub fn n_phi(&self) -> usize {
        self.n_phi
    }

    /// the number of flattened single-particle bins
    pub fn n_single(&self) -> usize {
        self.n_eta * self.n_phi
    }

    /// shape of the `(Δη, Δφ)` target
    pub fn relative_counts(&self) -> [usize; 2] {
        [
            RelativeCoordinate::Shifted.n_relative_bins(self.n_eta),
            RelativeCoordinate::Periodic.n_relative_bins(self.n_phi),
        ]
    }

    /// `(Δη, Δφ)` bin of the pair of flattened indices `(i, j)`
    #[inline]
    pub fn relative_bin(&self, i: usize, j: usize) -> [usize; 2] {
        let (i_eta, i_phi) = (i / self.n_phi, i % self.n_phi);
        let (j_eta, j_phi) = (j / self.n_phi, j % self.n_phi);
        [
            RelativeCoordinate::Shifted.relative_index(i_eta, j_eta, self.n_eta),
            RelativeCoordinate::Periodic.relative_index(i_phi, j_phi, self.n_phi),
        ]
    }
}

/// Accumulates every bin of the flattened pair-space arrays (`values` &
/// `errors`, shape `[n_single, n_single]`) into the `(Δη, Δφ)` accumulators.
///
/// `numerator` receives the sum of values, `err2` the sum of squared
/// errors, and `denominator` the number of contributing pair bins. The
/// accumulators are **not** reset first.
pub fn accumulate_pair_index(
    map: &PairIndexMap,
    values: ArrayView2<f64>,
    errors: ArrayView2<f64>,
    mut numerator: ArrayViewMut2<f64>,
    mut err2: ArrayViewMut2<f64>,
    mut denominator: ArrayViewMut2<f64>,
) -> Result<(), &'static str> {
    let n = map.n_single();
    let rel = map.relative_counts();
    if values.shape() != [n, n] || errors.shape() != [n, n] {
        return Err("pair-space arrays must have shape [n_eta*n_phi, n_eta*n_phi]");
    }
    if numerator.shape() != rel || err2.shape() != rel || denominator.shape() != rel {
        return Err("relative-coordinate arrays must have shape [2*n_eta-1, n_phi]");
    }

    for i in 0..n {
        for j in 0..n {
            let [d_eta, d_phi] = map.relative_bin(i, j);
            let e = errors[[i, j]];
            numerator[[d_eta, d_phi]] += values[[i, j]];
            err2[[d_eta, d_phi]] += e * e;
            denominator[[d_eta, d_phi]] += 1.0;
        }
    }
    Ok(())
}

/// The 1D analogue of [`accumulate_pair_index`] for a pair histogram over
/// `(x1, x2)` with `n` bins per axis.
pub fn accumulate_pair_axes(
    coord: RelativeCoordinate,
    values: ArrayView2<f64>,
    errors: ArrayView2<f64>,
    mut numerator: ArrayViewMut1<f64>,
    mut err2: ArrayViewMut1<f64>,
    mut denominator: ArrayViewMut1<f64>,
) -> Result<(), &'static str> {
    let n = values.shape()[0];
    if n == 0 || values.shape()[1] != n || errors.shape() != values.shape() {
        return Err("pair arrays must be square and non-empty");
    }
    let n_rel = coord.n_relative_bins(n);
    if numerator.len() != n_rel || err2.len() != n_rel || denominator.len() != n_rel {
        return Err("relative-coordinate arrays have the wrong length");
    }

    for i in 0..n {
        for j in 0..n {
            let d = coord.relative_index(i, j, n);
            let e = errors[[i, j]];
            numerator[d] += values[[i, j]];
            err2[d] += e * e;
            denominator[d] += 1.0;
        }
    }
    Ok(())
}

/// counts the entries of `denominator` that are still zero
pub fn count_empty(denominator: &[f64]) -> usize {
    denominator.iter().filter(|&&d| d == 0.0).count()
}
