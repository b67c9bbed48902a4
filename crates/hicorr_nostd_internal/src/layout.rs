/// Check if the per-axis bin counts are valid
fn check_counts(counts: &[usize]) -> Result<(), &'static str> {
    if counts.is_empty() || counts.len() > 3 {
        Err("a binned layout must have 1, 2, or 3 axes")
    } else if counts.contains(&0) {
        Err("every axis of a binned layout must hold at least 1 bin")
    } else {
        Ok(())
    }
}

/// BinLayout specifies how the bins of a 1D, 2D or 3D container are laid out
/// in a dense buffer. The layout is always contiguous & row-major: the last
/// axis is the fast axis.
///
/// For concreteness, a layout with counts `[a, b, c]`, has `a` bins along
/// axis 0 and `c` bins along axis 2. Index `[i, j, k]` lives at
/// `i*b*c + j*c + k`.
///
/// Unused axes (beyond `n_dims`) are stored with a count of 1, which lets us
/// use the same 3D arithmetic for every dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinLayout {
    n_dims: usize,
    counts: [usize; 3],
    strides: [usize; 3],
}

impl BinLayout {
    /// Create a layout from the number of bins along each axis
    pub fn new(counts: &[usize]) -> Result<BinLayout, &'static str> {
        check_counts(counts)?;
        let mut padded = [1_usize; 3];
        padded[..counts.len()].copy_from_slice(counts);
        Ok(Self {
            n_dims: counts.len(),
            counts: padded,
            strides: [padded[1] * padded[2], padded[2], 1],
        })
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    /// the bin counts of the axes that are actually in use
    pub fn counts(&self) -> &[usize] {
        &self.counts[..self.n_dims]
    }

    /// the total number of bins (i.e. the length of the dense buffer)
    pub fn n_bins(&self) -> usize {
        self.counts[0] * self.counts[1] * self.counts[2]
    }

    /// Returns whether `self` and `other` have the same dimensionality & the
    /// same number of bins along every axis
    pub fn same_counts(&self, other: &BinLayout) -> bool {
        self.n_dims == other.n_dims && self.counts == other.counts
    }

    /// map a multi-dimensional index to the 1D buffer index. Missing trailing
    /// components are treated as 0.
    ///
    /// # Panics
    /// if `idx` holds more components than `n_dims` or any component is out
    /// of bounds
    pub fn map_idx(&self, idx: &[usize]) -> usize {
        assert!(idx.len() <= self.n_dims, "index has too many components");
        let mut out = 0;
        for (axis, &i) in idx.iter().enumerate() {
            assert!(i < self.counts[axis], "index is out of bounds");
            out += i * self.strides[axis];
        }
        out
    }

    /// map a 3-component index (with padding axes set to 0) to 1D
    #[inline]
    pub fn map_idx3(&self, i: usize, j: usize, k: usize) -> usize {
        i * self.strides[0] + j * self.strides[1] + k
    }

    /// the inverse of [`BinLayout::map_idx3`]
    pub fn reverse_map_idx(&self, idx: usize) -> [usize; 3] {
        let i = idx / self.strides[0];
        let j = (idx - i * self.strides[0]) / self.strides[1];
        let k = idx - i * self.strides[0] - j * self.strides[1];
        [i, j, k]
    }

    /// the index obtained by reflecting `i` about the center of `axis`
    #[inline]
    pub fn mirror(&self, axis: usize, i: usize) -> usize {
        self.counts[axis] - 1 - i
    }
}
