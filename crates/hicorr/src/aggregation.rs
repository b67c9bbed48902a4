//! The driver that turns a list of per-subsample archives into aggregated
//! archives.

use crate::archive::{Archive, ArchiveSink, ArchiveSource, Scalar};
use crate::config::AggregationConfig;
use crate::{ContainerCollection, Error, RunningAggregate};

/// Summarizes one output archive written by [`aggregate_archives`]
#[derive(Clone, Debug, PartialEq)]
pub struct GroupReport {
    pub output: String,
    /// the archives that were folded, in folding order
    pub inputs: Vec<String>,
    /// the summed weight of the inputs
    pub total_weight: f64,
}

/// Everything we read from a single input archive
struct Sample {
    containers: ContainerCollection,
    scalars: Vec<(String, Scalar)>,
    weight: f64,
}

fn read_sample<A: Archive>(archive: &A, weight_scalar: &str) -> Result<Sample, Error> {
    let mut containers = ContainerCollection::new(archive.name());
    for name in archive.list_named_objects()? {
        containers.push(archive.read_object(&name)?);
    }
    let mut scalars = Vec::new();
    for name in archive.list_scalars()? {
        if let Some(value) = archive.read_scalar(&name)? {
            scalars.push((name, value));
        }
    }
    let weight = match archive.read_scalar(weight_scalar)? {
        Some(value) => value.as_f64(),
        None => {
            log::warn!(
                "archive \"{}\" has no \"{weight_scalar}\" scalar, using a weight of 1",
                archive.name()
            );
            1.0
        }
    };
    Ok(Sample {
        containers,
        scalars,
        weight,
    })
}

fn accumulate_scalars(totals: &mut Vec<(String, Scalar)>, sample: Vec<(String, Scalar)>) {
    for (name, value) in sample {
        match totals.iter_mut().find(|(key, _)| *key == name) {
            Some((_, total)) => *total = *total + value,
            None => totals.push((name, value)),
        }
    }
}

/// Folds the archives of one group. Nothing is written here, so an error
/// leaves the sink untouched.
fn fold_group<S: ArchiveSource>(
    source: &S,
    group: &[&str],
    weight_scalar: &str,
) -> Result<(RunningAggregate, Vec<(String, Scalar)>), Error> {
    let n = group.len();
    let mut aggregate: Option<RunningAggregate> = None;
    let mut scalars = Vec::new();
    for (position, name) in group.iter().enumerate() {
        let archive = source.open(name)?;
        let sample = read_sample(&archive, weight_scalar)?;
        log::debug!(
            "read {} containers from \"{name}\" (weight {})",
            sample.containers.len(),
            sample.weight
        );
        let is_last = position + 1 == n;
        aggregate = Some(match aggregate {
            None => RunningAggregate::start(sample.containers, sample.weight),
            Some(mut running) => {
                if is_last {
                    running.fold_final(&sample.containers, sample.weight)?;
                } else {
                    running.fold(&sample.containers, sample.weight)?;
                }
                running
            }
        });
        accumulate_scalars(&mut scalars, sample.scalars);
    }
    let mut aggregate =
        aggregate.ok_or_else(|| Error::internal_legacy_adhoc("an aggregation group is empty"))?;
    if !aggregate.is_finalized() {
        // single-archive group
        aggregate.finalize()?;
    }
    Ok((aggregate, scalars))
}

fn write_group<K: ArchiveSink>(
    sink: &mut K,
    output: &str,
    aggregate: &RunningAggregate,
    scalars: &[(String, Scalar)],
) -> Result<(), Error> {
    let archive = sink.create(output)?;
    for container in aggregate.collection() {
        archive.write_object(container)?;
    }
    for (name, value) in scalars {
        archive.write_scalar(name, *value)?;
    }
    Ok(())
}

/// Aggregate the archives in `names` that pass the selection of `config`.
///
/// The selected names are split, in order, into consecutive groups of
/// `config.group_size` archives (the last group may be shorter). Each group
/// produces one output archive in `sink` holding the finalized aggregate
/// of every container and the sum of every scalar. Within a group, each
/// sample is weighted by the scalar named `config.weight_scalar` (1 when it
/// is absent).
///
/// The first error aborts the run. An error while reading a group means
/// that group's output is never created; an error while writing it
/// discards the partially written output.
pub fn aggregate_archives<S, K>(
    config: &AggregationConfig,
    source: &S,
    names: &[String],
    sink: &mut K,
) -> Result<Vec<GroupReport>, Error>
where
    S: ArchiveSource,
    K: ArchiveSink,
{
    let selector = config.validate()?;
    let selected = selector.select(names);
    if selected.is_empty() {
        log::warn!("none of the {} archives were selected", names.len());
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for (index, group) in selected.chunks(config.group_size).enumerate() {
        let first = index * config.group_size;
        let last = first + group.len() - 1;
        let output = config.output_name(first, last);
        log::info!("aggregating {} archives into \"{output}\"", group.len());

        let (aggregate, scalars) = fold_group(source, group, &config.weight_scalar)?;

        if let Err(err) = write_group(sink, &output, &aggregate, &scalars) {
            if let Err(discard_err) = sink.discard(&output) {
                log::warn!("can't discard the partially written \"{output}\": {discard_err}");
            }
            return Err(err);
        }
        log::info!(
            "wrote {} containers and {} scalars to \"{output}\"",
            aggregate.collection().len(),
            scalars.len()
        );
        reports.push(GroupReport {
            output,
            inputs: group.iter().map(|s| s.to_string()).collect(),
            total_weight: aggregate.cumulative_weight(),
        });
    }
    Ok(reports)
}
