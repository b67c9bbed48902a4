//! Define the scalar machinery behind subsample aggregation
//!
//! # Subsample Aggregation
//!
//! An analysis is usually run as many independent jobs, each producing the
//! same set of binned containers from a disjoint subsample of events. To
//! quote a final value with a statistical uncertainty, we treat each
//! subsample as a single measurement `vᵢ` with weight `wᵢ` and compute the
//! weighted mean & weighted variance of those measurements, bin by bin.
//!
//! We do this in a single pass (the subsamples are usually stored in
//! separate archives and we only want to open each one once). The update
//! for sample `n`, given the cumulative weight `W` of the preceding samples,
//! is
//! ```text
//! w     = wₙ / (wₙ + W)
//! δ     = vₙ − mean
//! mean += w δ
//! var   = W/(wₙ + W) · (var + w δ²)
//! ```
//! which reproduces `mean = Σ wᵢvᵢ / Σ wᵢ` and the weighted population
//! variance.
//!
//! The order of the updates matters for the rounding of the result, even
//! though the update is order-independent in exact arithmetic. Callers must
//! fold samples in a fixed order (we never do any kind of tree-reduction).

/// A single measurement of one bin, as consumed by [`fold_datum`]
#[derive(Clone, Copy, Debug)]
pub struct Datum {
    pub value: f64,
    pub weight: f64,
}

impl Datum {
    pub fn zeroed() -> Self {
        Datum {
            value: 0.0,
            weight: 0.0,
        }
    }
}

/// The running state of a single bin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinAggregate {
    pub mean: f64,
    /// the weighted variance of the samples folded so far (not the variance
    /// of the mean)
    pub variance: f64,
}

impl BinAggregate {
    /// the state after folding the first sample
    pub fn from_first(value: f64) -> Self {
        BinAggregate {
            mean: value,
            variance: 0.0,
        }
    }
}

/// Folds `datum` into `state`, where `cumulative_weight_before` is the sum of
/// the weights of every sample that was previously folded into `state`.
///
/// When `cumulative_weight_before` is zero, this acts like
/// [`BinAggregate::from_first`]. A datum with zero weight leaves `state`
/// untouched (unless nothing was folded before either, in which case the
/// state is reset to zeros).
#[inline]
pub fn fold_datum(state: &mut BinAggregate, datum: &Datum, cumulative_weight_before: f64) {
    let total = datum.weight + cumulative_weight_before;
    if total == 0.0 {
        *state = BinAggregate {
            mean: 0.0,
            variance: 0.0,
        };
        return;
    }
    let w = datum.weight / total;
    let delta = datum.value - state.mean;
    state.mean += w * delta;
    state.variance = (cumulative_weight_before / total) * (state.variance + w * delta * delta);
}
