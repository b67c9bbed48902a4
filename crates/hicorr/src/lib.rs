/*!
Provides the binned-statistics & correlation engine used to turn raw
single-particle and pair yields (as recorded in heavy-ion collisions) into
correlation observables with statistical uncertainties.

# High-Level: Correlation Functions

Analyzers fill binned *densities*: `N1` (single particles, e.g. over
`(η, φ)`) and `N2` (pairs, over the coordinates of both particles). The
observables are built from these by

1. building uncorrelated baselines (`N1⊗N1`, `N2⊗N1`, ...) and folding pair
   spaces into relative coordinates such as `(Δη, Δφ)`,
2. normalizing (R2 and balance functions, factorial cumulants F2R2 to
   F4R4, νdyn),
3. enforcing the symmetries that hold by construction,
4. combining the outputs of independent subsamples into a weighted mean
   whose error is the subsample spread.

Every step operates on [`BinnedContainer`]s in place. Each bin holds a
`(content, error)` pair, and every operation propagates the error alongside
the content.

Numerical edge cases are never errors: bins that fall below a precision
floor are clamped to `(0, 0)`, and unphysical kinematics produce an
[`Unphysical`] status. Structural problems (mismatched shapes, missing
operands, storage failures) are reported as an [`Error`], before anything
was written.

# Developer Guide

Code that doesn't need an allocator (bin-edge handling, index bookkeeping,
the scalar subsample update & the cumulant expansion) lives in the
`hicorr_nostd_internal` crate.

Logging goes through the [`log`] facade. The library never installs a
logger.

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod aggregation;
mod archive;
mod arithmetic;
mod collection;
mod config;
mod container;
mod correlation;
mod dimension;
mod error;
mod kinematics;
mod product;
mod reduction;
mod subsample;
mod symmetry;

// pull in symbols that visible outside of the package
pub use aggregation::{GroupReport, aggregate_archives};
pub use archive::{
    ACCEPTED_PREFIX, Archive, ArchiveSink, ArchiveSource, EVENTS_PROCESSED, MemoryArchive,
    MemoryArchiveStore, Scalar,
};
pub use arithmetic::{ErrorMode, add, difference, divide, ratio, scale, sum};
pub use collection::ContainerCollection;
pub use config::{
    AggregationConfig, AggregationConfigBuilder, ArchiveSelector, CentralityTable,
    CollisionSystem,
};
pub use container::{Axis, BinnedContainer, ContainerKind};
pub use correlation::{
    R2_RELATIVE_ERROR_LIMIT, balance_function, combine_balance_functions, f2r2, f3r3, f4r4,
    nudyn, nudyn_named, r2_from_singles_1d, r2_from_singles_2d, r2_named, r2_with_baseline,
};
pub use dimension::{all_same_dimensions, expect_dims, expect_extents, same_dimensions};
pub use error::Error;
pub use hicorr_nostd_internal::{CUMULANT_FLOOR, RelativeCoordinate};
pub use kinematics::{
    FourMomentum, LongitudinalVariable, ParticleKinematics, Q3d, Unphysical, fill_q3d, q3d,
    q3d_from_momenta,
};
pub use product::{
    SingleAxis, pair_single_product, product_2d, product_3d, product_flattened,
    product_triple_flattened,
};
pub use reduction::{ReductionSummary, reduce_pair_axes, reduce_pair_index};
pub use subsample::{RunningAggregate, fold_sample};
pub use symmetry::{symmetrize_3d, symmetrize_delta_eta_delta_phi, symmetrize_xx};
