//! Combine the outputs of independent subsamples.
//!
//! The scalar update lives in [`hicorr_nostd_internal::fold_datum`] (its
//! module documentation describes the algorithm). While samples are being
//! folded, a running collection stores the weighted mean in the bin
//! content and the square root of the weighted variance in the bin error.
//! The final fold turns the error into the error on the mean,
//! `sqrt(var/n)`.

use crate::dimension::same_dimensions;
use crate::{BinnedContainer, ContainerCollection, Error};
use hicorr_nostd_internal::{BinAggregate, Datum, fold_datum};

fn fold_container(
    running: &mut BinnedContainer,
    sample: &BinnedContainer,
    cumulative_weight_before: f64,
    sample_weight: f64,
    final_count: Option<usize>,
) {
    let (content, error) = running.bins_mut();
    for i in 0..content.len() {
        let mut state = BinAggregate {
            mean: content[i],
            variance: error[i] * error[i],
        };
        let datum = Datum {
            value: sample.content_at(i),
            weight: sample_weight,
        };
        fold_datum(&mut state, &datum, cumulative_weight_before);
        content[i] = state.mean;
        error[i] = match final_count {
            Some(n) => (state.variance / (n as f64)).sqrt(),
            None => state.variance.sqrt(),
        };
    }
    if running.is_profile() {
        running.set_entries(1.0);
    } else if cumulative_weight_before == 0.0 {
        running.set_entries(sample.entries());
    } else {
        running.set_entries(running.entries() + sample.entries());
    }
}

/// Fold every container of `sample` into the matching container of
/// `running`.
///
/// `cumulative_weight_before` is the summed weight of the samples already
/// folded into `running` (0 when `sample` is the first one, in which case
/// the current contents of `running` are ignored). When `is_final` is
/// `true`, the errors are converted to errors on the mean using
/// `sample_count`, the total number of samples (this one included); the
/// result must not be folded into again.
///
/// The collections must correspond in lock-step and every pair of
/// containers must have the same shape. These checks all happen before
/// anything is written.
pub fn fold_sample(
    running: &mut ContainerCollection,
    sample: &ContainerCollection,
    cumulative_weight_before: f64,
    sample_weight: f64,
    is_final: bool,
    sample_count: usize,
) -> Result<(), Error> {
    running.check_same_size(sample)?;
    for (r, s) in running.iter().zip(sample.iter()) {
        same_dimensions("fold_sample", r, s)?;
    }
    if is_final && sample_count == 0 {
        return Err(Error::configuration(
            "the final fold needs a non-zero sample count",
        ));
    }
    let final_count = is_final.then_some(sample_count);
    for (r, s) in running.iter_mut().zip(sample.iter()) {
        fold_container(r, s, cumulative_weight_before, sample_weight, final_count);
    }
    Ok(())
}

/// Owns a running collection and the bookkeeping needed to fold samples
/// into it.
///
/// # Example
/// ```
/// use hicorr::{Axis, BinnedContainer, ContainerCollection, RunningAggregate};
///
/// let sample = |v: f64| {
///     let mut h =
///         BinnedContainer::histogram_1d("h", Axis::regular("x", 1, 0.0, 1.0).unwrap()).unwrap();
///     h.set_content(&[0], v);
///     let mut c = ContainerCollection::new("sample");
///     c.push(h);
///     c
/// };
///
/// let mut aggregate = RunningAggregate::start(sample(1.0), 1.0);
/// aggregate.fold(&sample(4.0), 2.0).unwrap();
/// aggregate.finalize().unwrap();
/// assert_eq!(aggregate.collection().get(0).unwrap().content(&[0]), 3.0);
/// ```
#[derive(Clone, Debug)]
pub struct RunningAggregate {
    collection: ContainerCollection,
    cumulative_weight: f64,
    samples: usize,
    finalized: bool,
}

impl RunningAggregate {
    /// Initialize the aggregate from the first sample. The errors of the
    /// first sample are discarded.
    pub fn start(mut first: ContainerCollection, weight: f64) -> Self {
        for c in first.iter_mut() {
            c.reset_errors();
            if c.is_profile() {
                c.set_entries(1.0);
            }
        }
        log::debug!(
            "started aggregating \"{}\" ({} containers, weight {weight})",
            first.name(),
            first.len()
        );
        RunningAggregate {
            collection: first,
            cumulative_weight: weight,
            samples: 1,
            finalized: false,
        }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.finalized {
            Err(Error::finalized())
        } else {
            Ok(())
        }
    }

    fn fold_impl(
        &mut self,
        sample: &ContainerCollection,
        weight: f64,
        is_final: bool,
    ) -> Result<(), Error> {
        self.check_open()?;
        let count = self.samples + 1;
        fold_sample(
            &mut self.collection,
            sample,
            self.cumulative_weight,
            weight,
            is_final,
            count,
        )?;
        self.cumulative_weight += weight;
        self.samples = count;
        self.finalized = is_final;
        log::debug!(
            "folded sample {count} (weight {weight}, cumulative weight {})",
            self.cumulative_weight
        );
        Ok(())
    }

    /// fold another sample
    pub fn fold(&mut self, sample: &ContainerCollection, weight: f64) -> Result<(), Error> {
        self.fold_impl(sample, weight, false)
    }

    /// fold the last sample and finalize the errors
    pub fn fold_final(&mut self, sample: &ContainerCollection, weight: f64) -> Result<(), Error> {
        self.fold_impl(sample, weight, true)
    }

    /// finalize the errors without folding another sample
    pub fn finalize(&mut self) -> Result<(), Error> {
        self.check_open()?;
        let n = self.samples as f64;
        for c in self.collection.iter_mut() {
            let (_, error) = c.bins_mut();
            for e in error.iter_mut() {
                *e = (*e * *e / n).sqrt();
            }
        }
        self.finalized = true;
        Ok(())
    }

    pub fn collection(&self) -> &ContainerCollection {
        &self.collection
    }

    pub fn cumulative_weight(&self) -> f64 {
        self.cumulative_weight
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn into_collection(self) -> ContainerCollection {
        self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;

    fn sample(values: &[f64], profile: bool) -> ContainerCollection {
        let axis = Axis::regular("x", values.len(), 0.0, 1.0).unwrap();
        let mut h = if profile {
            BinnedContainer::profile_1d("h", axis).unwrap()
        } else {
            BinnedContainer::histogram_1d("h", axis).unwrap()
        };
        for (i, &v) in values.iter().enumerate() {
            h.set_bin_at(i, v, 0.5);
        }
        h.set_entries(10.0);
        let mut c = ContainerCollection::new("sample");
        c.push(h);
        c
    }

    #[test]
    fn equal_samples() {
        let mut agg = RunningAggregate::start(sample(&[2.0, 3.0], false), 1.0);
        agg.fold(&sample(&[2.0, 3.0], false), 1.0).unwrap();
        agg.fold_final(&sample(&[2.0, 3.0], false), 1.0).unwrap();
        let h = agg.collection().get(0).unwrap();
        assert_eq!(h.contents(), &[2.0, 3.0]);
        assert_eq!(h.errors(), &[0.0, 0.0]);
        assert_eq!(h.entries(), 30.0);
        assert_eq!(agg.samples(), 3);
        assert!(agg.fold(&sample(&[2.0, 3.0], false), 1.0).unwrap_err().is_finalized());
        assert!(agg.finalize().unwrap_err().is_finalized());
    }

    #[test]
    fn variance_and_final_error() {
        // values 1 & 3 with equal weights: mean 2, population variance 1
        let mut running = sample(&[1.0], true);
        fold_sample(&mut running, &sample(&[1.0], true), 0.0, 1.0, false, 1).unwrap();
        fold_sample(&mut running, &sample(&[3.0], true), 1.0, 1.0, false, 2).unwrap();
        let h = running.get(0).unwrap();
        assert_eq!(h.content(&[0]), 2.0);
        assert_eq!(h.error(&[0]), 1.0);
        assert_eq!(h.entries(), 1.0);

        let mut agg = RunningAggregate::start(sample(&[1.0], false), 1.0);
        agg.fold_final(&sample(&[3.0], false), 1.0).unwrap();
        let h = agg.collection().get(0).unwrap();
        assert!((h.error(&[0]) - 0.5_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn first_fold_replaces_histogram_entries() {
        // the running collection still holds entries from an earlier use
        let mut running = sample(&[7.0], false);
        let mut first = sample(&[1.0], false);
        first.get_mut(0).unwrap().set_entries(5.0);
        fold_sample(&mut running, &first, 0.0, 1.0, false, 2).unwrap();
        let h = running.get(0).unwrap();
        assert_eq!(h.content(&[0]), 1.0);
        assert_eq!(h.error(&[0]), 0.0);
        assert_eq!(h.entries(), 5.0);

        fold_sample(&mut running, &first, 1.0, 1.0, true, 2).unwrap();
        assert_eq!(running.get(0).unwrap().entries(), 10.0);
    }

    #[test]
    fn mismatch_leaves_running_untouched() {
        let mut running = sample(&[1.0, 2.0], false);
        let before = running.get(0).unwrap().contents().to_vec();
        let err = fold_sample(&mut running, &sample(&[1.0], false), 1.0, 1.0, false, 2);
        assert!(err.unwrap_err().is_dimension_mismatch());
        assert_eq!(running.get(0).unwrap().contents(), before.as_slice());
        assert_eq!(running.get(0).unwrap().entries(), 10.0);

        let empty = ContainerCollection::new("empty");
        assert!(
            fold_sample(&mut running, &empty, 1.0, 1.0, false, 2)
                .unwrap_err()
                .is_collection_size()
        );
    }
}
