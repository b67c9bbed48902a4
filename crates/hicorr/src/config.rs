//! Configuration objects.
//!
//! Centrality tables are built per collision system when they are
//! constructed; there is no global lookup state. [`AggregationConfig`]
//! drives [`crate::aggregate_archives`] and can be deserialized (e.g. from
//! JSON) or assembled with [`AggregationConfigBuilder`].

use crate::Error;
use crate::archive::EVENTS_PROCESSED;
use globset::{Glob, GlobSet, GlobSetBuilder};
use hicorr_nostd_internal::{BinEdges, IrregularBinEdges, validate_bin_edges};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionSystem {
    PbPb,
    XeXe,
    #[serde(rename = "pPb")]
    PPb,
    #[serde(rename = "pp")]
    PP,
    AuAu,
}

impl CollisionSystem {
    /// the default centrality class edges, in percent
    fn default_percentile_edges(&self) -> &'static [f64] {
        match self {
            CollisionSystem::PbPb | CollisionSystem::XeXe => {
                &[0.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0]
            }
            CollisionSystem::PPb => &[0.0, 5.0, 10.0, 20.0, 40.0, 60.0, 80.0, 100.0],
            CollisionSystem::PP => &[0.0, 1.0, 5.0, 10.0, 15.0, 20.0, 30.0, 40.0, 50.0, 70.0, 100.0],
            CollisionSystem::AuAu => &[0.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0],
        }
    }
}

/// Maps centrality percentiles and event multiplicities to centrality
/// classes. Class 0 is the most central one.
#[derive(Clone, Debug, PartialEq)]
pub struct CentralityTable {
    system: CollisionSystem,
    percentile_edges: Vec<f64>,
    // lower bound on the multiplicity of each class (non-increasing)
    multiplicity_thresholds: Option<Vec<f64>>,
}

impl CentralityTable {
    pub fn for_system(system: CollisionSystem) -> Self {
        CentralityTable {
            system,
            percentile_edges: system.default_percentile_edges().to_vec(),
            multiplicity_thresholds: None,
        }
    }

    /// Build a table with custom class edges (in percent)
    pub fn with_percentile_edges(system: CollisionSystem, edges: Vec<f64>) -> Result<Self, Error> {
        validate_bin_edges(&edges)
            .map_err(|what| Error::bin_edge(format!("centrality table for {system:?}"), what))?;
        Ok(CentralityTable {
            system,
            percentile_edges: edges,
            multiplicity_thresholds: None,
        })
    }

    /// Attach the minimum multiplicity of every class. There must be one
    /// threshold per class, ordered from the most central class.
    pub fn with_multiplicity_thresholds(mut self, thresholds: Vec<f64>) -> Result<Self, Error> {
        if thresholds.len() != self.n_classes() {
            return Err(Error::configuration(format!(
                "{} multiplicity thresholds were given for {} centrality classes",
                thresholds.len(),
                self.n_classes()
            )));
        }
        if thresholds.windows(2).any(|w| w[1] > w[0]) {
            return Err(Error::configuration(
                "multiplicity thresholds must not increase with the class index",
            ));
        }
        self.multiplicity_thresholds = Some(thresholds);
        Ok(self)
    }

    pub fn system(&self) -> CollisionSystem {
        self.system
    }

    pub fn n_classes(&self) -> usize {
        self.percentile_edges.len() - 1
    }

    pub fn percentile_edges(&self) -> &[f64] {
        &self.percentile_edges
    }

    fn edges(&self) -> IrregularBinEdges<'_> {
        IrregularBinEdges::new(&self.percentile_edges)
            .expect("There must be a bug: the edges are validated at construction")
    }

    /// `(low, high)` percentile bounds of class `class`
    pub fn class_bounds(&self, class: usize) -> Option<(f64, f64)> {
        (class < self.n_classes()).then(|| {
            let edges = self.edges();
            (edges.edge(class), edges.edge(class + 1))
        })
    }

    /// The class holding `percentile`. The upper edge of the most
    /// peripheral class is included in that class.
    pub fn class_for_percentile(&self, percentile: f64) -> Option<usize> {
        self.edges().bin_index_closed(percentile)
    }

    /// The most central class whose multiplicity threshold is reached.
    /// Returns `None` when no thresholds were attached or the multiplicity
    /// is below every threshold.
    pub fn class_for_multiplicity(&self, multiplicity: f64) -> Option<usize> {
        self.multiplicity_thresholds
            .as_ref()?
            .iter()
            .position(|&threshold| multiplicity >= threshold)
    }
}

/// Configures a run of [`crate::aggregate_archives`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregationConfig {
    /// the number of archives combined into each output
    #[serde(default = "AggregationConfig::default_group_size")]
    pub group_size: usize,
    /// glob patterns selecting the input archives (empty selects all)
    #[serde(default)]
    pub include: Vec<String>,
    /// glob patterns removing archives from the selection
    #[serde(default)]
    pub exclude: Vec<String>,
    /// the scalar holding the weight of each sample
    #[serde(default = "AggregationConfig::default_weight_scalar")]
    pub weight_scalar: String,
    /// output archives are named `<output_stem>_<first>-<last>`, where
    /// `first` & `last` are positions in the selected list
    #[serde(default = "AggregationConfig::default_output_stem")]
    pub output_stem: String,
}

impl AggregationConfig {
    const fn default_group_size() -> usize {
        10
    }

    fn default_weight_scalar() -> String {
        EVENTS_PROCESSED.to_owned()
    }

    fn default_output_stem() -> String {
        "aggregate".to_owned()
    }

    /// check the values & compile the patterns
    pub fn validate(&self) -> Result<ArchiveSelector, Error> {
        if self.group_size == 0 {
            return Err(Error::configuration("group_size must be at least 1"));
        }
        if self.output_stem.is_empty() {
            return Err(Error::configuration("output_stem must not be empty"));
        }
        ArchiveSelector::new(&self.include, &self.exclude)
    }

    /// the name of the output archive of the group spanning positions
    /// `first..=last` of the selection
    pub fn output_name(&self, first: usize, last: usize) -> String {
        format!("{}_{first}-{last}", self.output_stem)
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            group_size: Self::default_group_size(),
            include: Vec::new(),
            exclude: Vec::new(),
            weight_scalar: Self::default_weight_scalar(),
            output_stem: Self::default_output_stem(),
        }
    }
}

/// Assembles an [`AggregationConfig`]
///
/// # Example
/// ```
/// use hicorr::AggregationConfigBuilder;
/// let config = AggregationConfigBuilder::new()
///     .group_size(5)
///     .include("PairGen_*.root")
///     .exclude("*_Sum*")
///     .build()
///     .unwrap();
/// assert_eq!(config.group_size, 5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AggregationConfigBuilder {
    config: AggregationConfig,
}

impl AggregationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_size(mut self, group_size: usize) -> Self {
        self.config.group_size = group_size;
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.config.include.push(pattern.to_owned());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.exclude.push(pattern.to_owned());
        self
    }

    pub fn weight_scalar(mut self, name: &str) -> Self {
        self.config.weight_scalar = name.to_owned();
        self
    }

    pub fn output_stem(mut self, stem: &str) -> Self {
        self.config.output_stem = stem.to_owned();
        self
    }

    pub fn build(self) -> Result<AggregationConfig, Error> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|err| Error::configuration(format!("bad pattern \"{pattern}\": {err}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| Error::configuration(format!("can't build glob set: {err}")))
}

/// Selects archive names with include/exclude glob patterns
#[derive(Clone, Debug)]
pub struct ArchiveSelector {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl ArchiveSelector {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, Error> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_globset(include)?)
        };
        Ok(ArchiveSelector {
            include,
            exclude: build_globset(exclude)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.as_ref().is_none_or(|set| set.is_match(name));
        included && !self.exclude.is_match(name)
    }

    /// the matching names, in their original order
    pub fn select<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .map(String::as_str)
            .filter(|name| self.matches(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_lookup() {
        let table = CentralityTable::for_system(CollisionSystem::PbPb);
        assert_eq!(table.n_classes(), 10);
        assert_eq!(table.class_for_percentile(0.0), Some(0));
        assert_eq!(table.class_for_percentile(7.5), Some(1));
        assert_eq!(table.class_for_percentile(10.0), Some(2));
        assert_eq!(table.class_for_percentile(90.0), Some(9));
        assert_eq!(table.class_for_percentile(95.0), None);
        assert_eq!(table.class_bounds(2), Some((10.0, 20.0)));
        assert_eq!(table.class_bounds(10), None);
    }

    #[test]
    fn multiplicity_lookup() {
        let edges = vec![0.0, 10.0, 50.0, 100.0];
        let table = CentralityTable::with_percentile_edges(CollisionSystem::PP, edges).unwrap();
        assert_eq!(table.class_for_multiplicity(40.0), None);
        let table = table
            .with_multiplicity_thresholds(vec![30.0, 12.0, 0.0])
            .unwrap();
        assert_eq!(table.class_for_multiplicity(40.0), Some(0));
        assert_eq!(table.class_for_multiplicity(12.0), Some(1));
        assert_eq!(table.class_for_multiplicity(3.0), Some(2));

        let table = CentralityTable::for_system(CollisionSystem::PP);
        assert!(table.clone().with_multiplicity_thresholds(vec![1.0]).is_err());
        let mut increasing = vec![0.0; table.n_classes()];
        increasing[1] = 1.0;
        assert!(table.with_multiplicity_thresholds(increasing).is_err());
    }

    #[test]
    fn selector() {
        let config = AggregationConfigBuilder::new()
            .include("run_*")
            .exclude("*_bad")
            .build()
            .unwrap();
        let selector = config.validate().unwrap();
        let names: Vec<String> = ["run_2", "run_1_bad", "other", "run_1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(selector.select(&names), ["run_2", "run_1"]);

        let all = ArchiveSelector::new(&[], &[]).unwrap();
        assert_eq!(all.select(&names).len(), 4);
    }

    #[test]
    fn invalid_config() {
        assert!(
            AggregationConfigBuilder::new()
                .group_size(0)
                .build()
                .unwrap_err()
                .is_configuration()
        );
        assert!(AggregationConfigBuilder::new().include("[").build().is_err());
    }
}
