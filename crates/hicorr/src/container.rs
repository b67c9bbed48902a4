//! Binned containers: the 1D/2D/3D histograms & profiles that every other
//! part of the crate operates upon.
//!
//! A container holds a dense, row-major array of bin contents and a
//! parallel array of bin errors (there are no underflow/overflow bins). The
//! containers are created upstream (usually by reading them from an archive)
//! and are mutated in place; they are never resized.

use crate::Error;
use hicorr_nostd_internal::{BinEdges, BinLayout, IrregularBinEdges, RegularBinEdges};
use ndarray::{ArrayView2, ArrayViewMut2};

/// The kind of a container.
///
/// Profiles hold a mean (and its error) per bin rather than a yield. This
/// mostly matters when combining independent samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Histogram1D,
    Histogram2D,
    Histogram3D,
    Profile1D,
    Profile2D,
}

impl ContainerKind {
    pub fn n_dims(&self) -> usize {
        match self {
            Self::Histogram1D | Self::Profile1D => 1,
            Self::Histogram2D | Self::Profile2D => 2,
            Self::Histogram3D => 3,
        }
    }

    pub fn is_profile(&self) -> bool {
        matches!(self, Self::Profile1D | Self::Profile2D)
    }
}

#[derive(Clone, Debug)]
enum AxisEdges {
    Regular(RegularBinEdges),
    // validated at construction
    Irregular(Vec<f64>),
}

/// A single axis of a container
#[derive(Clone, Debug)]
pub struct Axis {
    title: String,
    edges: AxisEdges,
}

impl Axis {
    /// an axis with `n_bins` uniform bins spanning `[min, max)`
    pub fn regular(title: &str, n_bins: usize, min: f64, max: f64) -> Result<Axis, Error> {
        let edges = RegularBinEdges::new(min, max, n_bins)
            .map_err(|what| Error::bin_edge(format!("axis \"{title}\""), what))?;
        Ok(Axis {
            title: title.to_owned(),
            edges: AxisEdges::Regular(edges),
        })
    }

    /// an axis with arbitrary (strictly increasing, finite) bin edges
    pub fn irregular(title: &str, edges: Vec<f64>) -> Result<Axis, Error> {
        hicorr_nostd_internal::validate_bin_edges(&edges)
            .map_err(|what| Error::bin_edge(format!("axis \"{title}\""), what))?;
        Ok(Axis {
            title: title.to_owned(),
            edges: AxisEdges::Irregular(edges),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Calls `f` with the underlying [`BinEdges`] implementation
    fn with_edges<R>(&self, f: impl FnOnce(&dyn BinEdges) -> R) -> R {
        match &self.edges {
            AxisEdges::Regular(edges) => f(edges),
            AxisEdges::Irregular(v) => {
                let edges = IrregularBinEdges::new(v).expect(
                    "There must be a bug: the edges were validated when the \
                     axis was constructed and they are never mutated",
                );
                f(&edges)
            }
        }
    }

    pub fn n_bins(&self) -> usize {
        match &self.edges {
            AxisEdges::Regular(edges) => edges.n_bins(),
            AxisEdges::Irregular(v) => v.len() - 1,
        }
    }

    pub fn bin_index(&self, value: f64) -> Option<usize> {
        self.with_edges(|e| e.bin_index(value))
    }

    pub fn bin_center(&self, index: usize) -> f64 {
        self.with_edges(|e| e.bin_center(index))
    }

    pub fn bin_width(&self, index: usize) -> f64 {
        self.with_edges(|e| e.bin_width(index))
    }

    pub fn low_edge(&self) -> f64 {
        self.with_edges(|e| e.leftmost_edge())
    }

    pub fn high_edge(&self) -> f64 {
        self.with_edges(|e| e.rightmost_edge())
    }
}

/// A 1D, 2D or 3D histogram or profile holding a (content, error) pair per
/// bin.
#[derive(Clone, Debug)]
pub struct BinnedContainer {
    name: String,
    title: String,
    kind: ContainerKind,
    axes: Vec<Axis>,
    layout: BinLayout,
    content: Vec<f64>,
    error: Vec<f64>,
    entries: f64,
}

impl BinnedContainer {
    /// Create a zero-initialized container
    pub fn new(name: &str, kind: ContainerKind, axes: Vec<Axis>) -> Result<Self, Error> {
        if axes.len() != kind.n_dims() {
            return Err(Error::bin_edge_custom(
                format!("container \"{name}\""),
                format!(
                    "a {:?} needs {} axes, but {} were provided",
                    kind,
                    kind.n_dims(),
                    axes.len()
                ),
            ));
        }
        let counts: Vec<usize> = axes.iter().map(Axis::n_bins).collect();
        let layout = BinLayout::new(&counts).map_err(Error::internal_legacy_adhoc)?;
        Ok(Self {
            name: name.to_owned(),
            title: name.to_owned(),
            kind,
            axes,
            layout,
            content: vec![0.0; layout.n_bins()],
            error: vec![0.0; layout.n_bins()],
            entries: 0.0,
        })
    }

    pub fn histogram_1d(name: &str, x: Axis) -> Result<Self, Error> {
        Self::new(name, ContainerKind::Histogram1D, vec![x])
    }

    pub fn histogram_2d(name: &str, x: Axis, y: Axis) -> Result<Self, Error> {
        Self::new(name, ContainerKind::Histogram2D, vec![x, y])
    }

    pub fn histogram_3d(name: &str, x: Axis, y: Axis, z: Axis) -> Result<Self, Error> {
        Self::new(name, ContainerKind::Histogram3D, vec![x, y, z])
    }

    pub fn profile_1d(name: &str, x: Axis) -> Result<Self, Error> {
        Self::new(name, ContainerKind::Profile1D, vec![x])
    }

    pub fn profile_2d(name: &str, x: Axis, y: Axis) -> Result<Self, Error> {
        Self::new(name, ContainerKind::Profile2D, vec![x, y])
    }

    /// A zero-initialized container with the same kind & axes as `self`
    pub fn empty_like(&self, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            title: name.to_owned(),
            kind: self.kind,
            axes: self.axes.clone(),
            layout: self.layout,
            content: vec![0.0; self.content.len()],
            error: vec![0.0; self.error.len()],
            entries: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_profile(&self) -> bool {
        self.kind.is_profile()
    }

    /// the dimensionality (1, 2 or 3)
    pub fn dims(&self) -> usize {
        self.layout.n_dims()
    }

    /// the number of bins along each axis
    pub fn axis_extents(&self) -> &[usize] {
        self.layout.counts()
    }

    pub fn axis(&self, i: usize) -> &Axis {
        &self.axes[i]
    }

    pub fn layout(&self) -> &BinLayout {
        &self.layout
    }

    /// the total number of bins
    pub fn n_bins(&self) -> usize {
        self.content.len()
    }

    /// Returns whether `self` and `other` share dimensionality and per-axis
    /// bin counts (the axis ranges are not compared)
    pub fn same_shape(&self, other: &BinnedContainer) -> bool {
        self.layout.same_counts(&other.layout)
    }

    pub fn content(&self, idx: &[usize]) -> f64 {
        self.content[self.layout.map_idx(idx)]
    }

    pub fn error(&self, idx: &[usize]) -> f64 {
        self.error[self.layout.map_idx(idx)]
    }

    pub fn set_content(&mut self, idx: &[usize], value: f64) {
        let i = self.layout.map_idx(idx);
        self.content[i] = value;
    }

    pub fn set_error(&mut self, idx: &[usize], value: f64) {
        let i = self.layout.map_idx(idx);
        self.error[i] = value;
    }

    /// content of the bin at position `i` of the dense buffer
    #[inline]
    pub fn content_at(&self, i: usize) -> f64 {
        self.content[i]
    }

    #[inline]
    pub fn error_at(&self, i: usize) -> f64 {
        self.error[i]
    }

    #[inline]
    pub fn set_bin_at(&mut self, i: usize, content: f64, error: f64) {
        self.content[i] = content;
        self.error[i] = error;
    }

    pub fn contents(&self) -> &[f64] {
        &self.content
    }

    pub fn errors(&self) -> &[f64] {
        &self.error
    }

    /// mutable access to the content & error buffers at the same time
    pub fn bins_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.content, &mut self.error)
    }

    pub fn entries(&self) -> f64 {
        self.entries
    }

    pub fn set_entries(&mut self, entries: f64) {
        self.entries = entries;
    }

    /// Adds `weight` to the bin holding `coords` (one coordinate per axis).
    ///
    /// The error is updated so that it tracks `sqrt(Σw²)`. Returns whether
    /// the coordinates fell inside the container. Out of range coordinates
    /// still count as an entry. A coordinate count that differs from the
    /// dimensionality is an error and leaves the container untouched.
    pub fn fill(&mut self, coords: &[f64], weight: f64) -> Result<bool, Error> {
        if coords.len() != self.dims() {
            return Err(Error::dimension_mismatch(
                "fill (number of coordinates)",
                &[self.dims()],
                &[coords.len()],
            ));
        }
        self.entries += 1.0;
        let mut idx = [0_usize; 3];
        for (axis, &x) in coords.iter().enumerate() {
            match self.axes[axis].bin_index(x) {
                Some(i) => idx[axis] = i,
                None => return Ok(false),
            }
        }
        let i = self.layout.map_idx(&idx[..self.dims()]);
        self.content[i] += weight;
        self.error[i] = (self.error[i] * self.error[i] + weight * weight).sqrt();
        Ok(true)
    }

    /// the sum of all bin contents and its error (errors added in
    /// quadrature)
    pub fn integral(&self) -> (f64, f64) {
        let sum = self.content.iter().sum();
        let err2: f64 = self.error.iter().map(|e| e * e).sum();
        (sum, err2.sqrt())
    }

    /// the mean bin content
    pub fn mean_content(&self) -> f64 {
        self.content.iter().sum::<f64>() / (self.content.len() as f64)
    }

    /// zero every content, error, and the entry count
    pub fn reset(&mut self) {
        self.content.fill(0.0);
        self.error.fill(0.0);
        self.entries = 0.0;
    }

    /// zero the errors while keeping the contents
    pub fn reset_errors(&mut self) {
        self.error.fill(0.0);
    }

    /// Assign Poisson errors, `sqrt(content)`, to every bin (bins with
    /// negative content get a zero error)
    pub fn set_errors_from_content(&mut self) {
        for (e, &v) in self.error.iter_mut().zip(self.content.iter()) {
            *e = v.max(0.0).sqrt();
        }
    }

    fn require_2d(&self, operation: &'static str) -> Result<[usize; 2], Error> {
        match *self.axis_extents() {
            [a, b] => Ok([a, b]),
            _ => Err(Error::dimension_mismatch(
                operation,
                self.axis_extents(),
                &[0, 0],
            )),
        }
    }

    /// views of the contents & errors of a 2D container
    pub fn views_2d(&self) -> Result<(ArrayView2<'_, f64>, ArrayView2<'_, f64>), Error> {
        let shape = self.require_2d("views_2d")?;
        let content =
            ArrayView2::from_shape(shape, &self.content).map_err(|_| Self::layout_bug())?;
        let error = ArrayView2::from_shape(shape, &self.error).map_err(|_| Self::layout_bug())?;
        Ok((content, error))
    }

    /// mutable views of the contents & errors of a 2D container
    pub fn views_2d_mut(
        &mut self,
    ) -> Result<(ArrayViewMut2<'_, f64>, ArrayViewMut2<'_, f64>), Error> {
        let shape = self.require_2d("views_2d_mut")?;
        let content =
            ArrayViewMut2::from_shape(shape, &mut self.content).map_err(|_| Self::layout_bug())?;
        let error =
            ArrayViewMut2::from_shape(shape, &mut self.error).map_err(|_| Self::layout_bug())?;
        Ok((content, error))
    }

    fn layout_bug() -> Error {
        Error::internal_legacy_adhoc("buffer length is inconsistent with the container layout")
    }

    /// A copy of a 2D container with its axes swapped, i.e. bin `(i, j)` of
    /// the result holds bin `(j, i)` of `self`
    pub fn transposed(&self, name: &str) -> Result<BinnedContainer, Error> {
        let (content, error) = self.views_2d()?;
        let mut out = BinnedContainer::new(
            name,
            self.kind,
            vec![self.axes[1].clone(), self.axes[0].clone()],
        )?;
        {
            let (mut out_content, mut out_error) = out.views_2d_mut()?;
            out_content.assign(&content.t());
            out_error.assign(&error.t());
        }
        out.entries = self.entries;
        Ok(out)
    }
}
