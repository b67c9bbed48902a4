//! Bin-edge types shared by container axes and centrality classes.
//!
//! [`BinEdges`] is the common interface. [`RegularBinEdges`] describes an
//! axis of uniform width (e.g. η in `[-0.8, 0.8)`), [`IrregularBinEdges`]
//! borrows an explicit, strictly increasing list of edges (e.g. centrality
//! percentiles).

pub trait BinEdges {
    /// The bin holding `value`. Bins are half-open: a value sitting on an
    /// edge belongs to the bin above it, and the rightmost edge is outside.
    fn bin_index(&self, value: f64) -> Option<usize>;

    fn n_bins(&self) -> usize;

    /// Edge `index`, where edge `i` is the lower edge of bin `i` and edge
    /// `n_bins()` is the upper edge of the last bin.
    ///
    /// # Panics
    /// when `index > self.n_bins()`
    fn edge(&self, index: usize) -> f64;

    /// Like [`BinEdges::bin_index`], except that the rightmost edge is
    /// assigned to the last bin.
    fn bin_index_closed(&self, value: f64) -> Option<usize> {
        if value == self.rightmost_edge() {
            Some(self.n_bins() - 1)
        } else {
            self.bin_index(value)
        }
    }

    fn leftmost_edge(&self) -> f64 {
        self.edge(0)
    }

    fn rightmost_edge(&self) -> f64 {
        self.edge(self.n_bins())
    }

    fn bin_center(&self, index: usize) -> f64 {
        0.5 * (self.edge(index) + self.edge(index + 1))
    }

    fn bin_width(&self, index: usize) -> f64 {
        self.edge(index + 1) - self.edge(index)
    }
}

/// `n_bins` bins of equal width spanning `[low, high)`
#[derive(Clone, Debug, PartialEq)]
pub struct RegularBinEdges {
    low: f64,
    high: f64,
    width: f64,
    n_bins: usize,
}

impl RegularBinEdges {
    pub fn new(low: f64, high: f64, n_bins: usize) -> Result<Self, &'static str> {
        if n_bins == 0 {
            return Err("an axis needs at least one bin");
        }
        if !(low.is_finite() && high.is_finite()) {
            return Err("axis limits must be finite");
        }
        if high <= low {
            return Err("the upper axis limit must exceed the lower one");
        }
        Ok(Self {
            low,
            high,
            width: (high - low) / n_bins as f64,
            n_bins,
        })
    }
}

impl BinEdges for RegularBinEdges {
    fn bin_index(&self, value: f64) -> Option<usize> {
        if !(self.low..self.high).contains(&value) {
            return None;
        }
        // rounding may push values just below `high` past the last bin
        let index = ((value - self.low) / self.width) as usize;
        Some(index.min(self.n_bins - 1))
    }

    fn n_bins(&self) -> usize {
        self.n_bins
    }

    fn edge(&self, index: usize) -> f64 {
        assert!(index <= self.n_bins);
        // return `high` itself so the last edge never picks up rounding error
        if index == self.n_bins {
            self.high
        } else {
            self.low + (index as f64) * self.width
        }
    }
}

/// Check that `edges` is usable as an [`IrregularBinEdges`]
pub fn validate_bin_edges(edges: &[f64]) -> Result<(), &'static str> {
    if edges.len() < 2 {
        Err("at least two bin edges are needed")
    } else if edges.iter().any(|e| !e.is_finite()) {
        Err("bin edges must be finite")
    } else if edges.windows(2).any(|w| w[1] <= w[0]) {
        Err("bin edges must be strictly increasing")
    } else {
        Ok(())
    }
}

/// A view of an explicit list of edges
#[derive(Clone, Copy, Debug)]
pub struct IrregularBinEdges<'a> {
    edges: &'a [f64],
}

impl<'a> IrregularBinEdges<'a> {
    pub fn new(edges: &'a [f64]) -> Result<Self, &'static str> {
        validate_bin_edges(edges)?;
        Ok(Self { edges })
    }

    pub fn as_slice(&self) -> &'a [f64] {
        self.edges
    }
}

impl BinEdges for IrregularBinEdges<'_> {
    fn bin_index(&self, value: f64) -> Option<usize> {
        if !(self.leftmost_edge()..self.rightmost_edge()).contains(&value) {
            return None;
        }
        // number of edges <= value, which is at least 1 here
        Some(self.edges.partition_point(|&edge| edge <= value) - 1)
    }

    fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    fn edge(&self, index: usize) -> f64 {
        self.edges[index]
    }
}
