#![no_std]
//! The numeric core of `hicorr` that doesn't require the standard library.
//!
//! Nothing in here knows about named containers, archives or error
//! propagation policies. It provides the index arithmetic and the scalar
//! update rules that the public crate composes. Errors are reported as
//! `&'static str` and wrapped by the public crate.

#[cfg(test)]
extern crate std;

mod bins;
mod cumulant;
mod fold;
mod layout;
mod pair_index;

pub use bins::{BinEdges, IrregularBinEdges, RegularBinEdges, validate_bin_edges};
pub use cumulant::{CUMULANT_FLOOR, FactorialMoments, MAX_ORDER};
pub use fold::{BinAggregate, Datum, fold_datum};
pub use layout::BinLayout;
pub use pair_index::{
    PairIndexMap, RelativeCoordinate, accumulate_pair_axes, accumulate_pair_index, count_empty,
};
