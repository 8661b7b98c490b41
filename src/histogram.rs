//! The histogram façade.

use std::ops::{Add, AddAssign, DivAssign, Mul, MulAssign};

use crate::axis::{Axis, AxisVariant};
use crate::error::HistogramError;
use crate::linearize::fill_index;
use crate::storage::{AdaptiveStorage, CountDepth};

// ============================================================================
// Bin view
// ============================================================================

/// Read-only view of one bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinView {
    /// Count, or sum of weights once the storage is weighted.
    pub value: f64,
    /// Count under the Poisson convention, or sum of squared weights.
    pub variance: f64,
}

// ============================================================================
// Histogram
// ============================================================================

/// A multi-dimensional histogram: an ordered axis collection plus an
/// adaptive count storage sized to the product of the axis extents.
///
/// Bins are laid out row-major with axis 0 varying fastest. Bin indices on
/// the query surface are *internal*: when an axis has an underflow bin it is
/// index 0 and the first real bin is index 1; the overflow bin, when
/// present, is `extent − 1`.
///
/// # Example
///
/// ```
/// use ndhist::axis::RegularAxis;
/// use ndhist::Histogram;
///
/// let mut h = Histogram::new(vec![RegularAxis::new(10, 0.0, 1.0).unwrap().into()]);
/// h.fill(&[0.05]).unwrap();
/// h.fill(&[-1.0]).unwrap(); // lands in the underflow bin
/// assert_eq!(h.at(&[1]).unwrap().value, 1.0);
/// assert_eq!(h.at(&[0]).unwrap().value, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Histogram {
    axes: Vec<AxisVariant>,
    storage: AdaptiveStorage,
}

impl Histogram {
    /// Create a histogram over the given axes with all bins zero.
    ///
    /// At least one axis is expected; storage is allocated lazily on the
    /// first fill.
    pub fn new(axes: Vec<AxisVariant>) -> Self {
        debug_assert!(!axes.is_empty(), "at least one axis required");
        let size = axes.iter().map(|a| a.extent() as usize).product();
        Self {
            storage: AdaptiveStorage::new(size),
            axes,
        }
    }

    /// Create a histogram with the storage pre-allocated at a given width,
    /// for callers that know their counts will not fit narrow cells.
    pub fn with_depth(axes: Vec<AxisVariant>, depth: CountDepth) -> Self {
        debug_assert!(!axes.is_empty(), "at least one axis required");
        let size = axes.iter().map(|a| a.extent() as usize).product();
        Self {
            storage: AdaptiveStorage::with_depth(size, depth),
            axes,
        }
    }

    /// Reconstruct from parts; used by the decoder, which has validated that
    /// the storage size matches the axes.
    pub(crate) fn from_parts(axes: Vec<AxisVariant>, storage: AdaptiveStorage) -> Self {
        debug_assert_eq!(
            axes.iter().map(|a| a.extent() as usize).product::<usize>(),
            storage.size()
        );
        Self { axes, storage }
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// Total number of bins, including flow bins.
    #[inline]
    pub fn size(&self) -> usize {
        self.storage.size()
    }

    /// The `k`-th axis.
    ///
    /// # Panics
    /// Panics if `k >= rank()`.
    #[inline]
    pub fn axis(&self, k: usize) -> &AxisVariant {
        &self.axes[k]
    }

    /// All axes in order.
    #[inline]
    pub fn axes(&self) -> &[AxisVariant] {
        &self.axes
    }

    /// The underlying count storage.
    #[inline]
    pub fn storage(&self) -> &AdaptiveStorage {
        &self.storage
    }

    fn check_arity(&self, got: usize) -> Result<(), HistogramError> {
        if got != self.rank() {
            return Err(HistogramError::ArityMismatch {
                expected: self.rank(),
                got,
            });
        }
        Ok(())
    }

    /// Unweighted fill: increment the bin selected by `coords`.
    ///
    /// A coordinate outside a non-growable axis without the matching flow
    /// bin drops the fill silently; that cell simply does not exist.
    pub fn fill(&mut self, coords: &[f64]) -> Result<(), HistogramError> {
        self.check_arity(coords.len())?;
        if let Some(i) = fill_index(&mut self.axes, &mut self.storage, coords) {
            self.storage.increase(i);
        }
        Ok(())
    }

    /// Weighted fill: add `(w, w²)` to the bin selected by `coords`.
    pub fn fill_weighted(&mut self, coords: &[f64], w: f64) -> Result<(), HistogramError> {
        self.check_arity(coords.len())?;
        if let Some(i) = fill_index(&mut self.axes, &mut self.storage, coords) {
            self.storage.increase_weighted(i, w);
        }
        Ok(())
    }

    /// Read the bin at the given internal indices.
    pub fn at(&self, indices: &[usize]) -> Result<BinView, HistogramError> {
        self.check_arity(indices.len())?;
        let mut offset = 0usize;
        let mut stride = 1usize;
        for (k, axis) in self.axes.iter().enumerate() {
            let extent = axis.extent();
            if indices[k] >= extent as usize {
                return Err(HistogramError::IndexOutOfRange {
                    axis: k,
                    index: indices[k],
                    extent,
                });
            }
            offset += indices[k] * stride;
            stride *= extent as usize;
        }
        Ok(BinView {
            value: self.storage.value(offset),
            variance: self.storage.variance(offset),
        })
    }

    /// Clear every bin; axes (including any grown state) are kept and the
    /// storage returns to its minimal depth.
    pub fn reset(&mut self) {
        let size = self.storage.size();
        self.storage.reset(size);
    }

    /// Bin-wise addition of a histogram with element-wise equal axes.
    ///
    /// On a mismatch the receiver is unmodified.
    pub fn merge(&mut self, rhs: &Histogram) -> Result<(), HistogramError> {
        if self.axes != rhs.axes {
            return Err(HistogramError::AxesMismatch);
        }
        self.storage.merge_from(&rhs.storage);
        Ok(())
    }

    /// Scale every bin by `k`; values scale by `k`, variances by `k²`.
    pub fn scale(&mut self, k: f64) {
        self.storage.scale(k);
    }

    /// Total of all bin values, flow bins included.
    pub fn sum(&self) -> f64 {
        (0..self.size()).map(|i| self.storage.value(i)).sum()
    }

    /// Project onto a strictly ascending subset of axes, summing out the
    /// rest (their flow bins included).
    pub fn reduce_to(&self, keep: &[usize]) -> Result<Histogram, HistogramError> {
        let rank = self.rank();
        let ascending = keep.windows(2).all(|w| w[0] < w[1]);
        let in_range = keep.iter().all(|&k| k < rank);
        if keep.is_empty() || !ascending || !in_range {
            return Err(HistogramError::InvalidReduce);
        }

        let axes: Vec<AxisVariant> = keep.iter().map(|&k| self.axes[k].clone()).collect();
        let mut out = Histogram::new(axes);

        let extents: Vec<usize> = self.axes.iter().map(|a| a.extent() as usize).collect();
        let mut keep_strides = vec![0usize; keep.len()];
        let mut stride = 1usize;
        for (j, &k) in keep.iter().enumerate() {
            keep_strides[j] = stride;
            stride *= extents[k];
        }

        for i in 0..self.size() {
            let mut rem = i;
            let mut off = 0usize;
            let mut kj = 0usize;
            for (k, &extent) in extents.iter().enumerate() {
                let idx = rem % extent;
                rem /= extent;
                if kj < keep.len() && keep[kj] == k {
                    off += idx * keep_strides[kj];
                    kj += 1;
                }
            }
            match self.storage.count(i) {
                Some(c) => out.storage.add_count(off, c),
                None => {
                    out.storage
                        .add_weighted(off, self.storage.value(i), self.storage.variance(i))
                }
            }
        }
        Ok(out)
    }

    /// Iterate bins in row-major order (axis 0 fastest), flow bins included.
    pub fn iter(&self) -> BinIter<'_> {
        BinIter {
            storage: &self.storage,
            extents: self.axes.iter().map(|a| a.extent()).collect(),
            index: vec![0; self.axes.len()],
            flat: 0,
        }
    }
}

impl PartialEq for Histogram {
    fn eq(&self, other: &Self) -> bool {
        self.axes == other.axes && self.storage == other.storage
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Row-major iterator over `(multi-index, bin)` pairs.
pub struct BinIter<'a> {
    storage: &'a AdaptiveStorage,
    extents: Vec<u32>,
    index: Vec<u32>,
    flat: usize,
}

impl Iterator for BinIter<'_> {
    type Item = (Vec<u32>, BinView);

    fn next(&mut self) -> Option<Self::Item> {
        if self.flat >= self.storage.size() {
            return None;
        }
        let item = (
            self.index.clone(),
            BinView {
                value: self.storage.value(self.flat),
                variance: self.storage.variance(self.flat),
            },
        );
        self.flat += 1;
        for (i, e) in self.index.iter_mut().zip(&self.extents) {
            *i += 1;
            if *i < *e {
                break;
            }
            *i = 0;
        }
        Some(item)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// `h1 += &h2`. Thin delegate to [`Histogram::merge`].
///
/// # Panics
/// Panics if the axes differ; use `merge` to handle the mismatch.
impl AddAssign<&Histogram> for Histogram {
    fn add_assign(&mut self, rhs: &Histogram) {
        if let Err(e) = self.merge(rhs) {
            panic!("{e}");
        }
    }
}

/// `h1 + &h2`. Delegates to `+=`.
impl Add<&Histogram> for Histogram {
    type Output = Histogram;

    fn add(mut self, rhs: &Histogram) -> Histogram {
        self += rhs;
        self
    }
}

/// `h1 + h2`. Delegates to `+=`.
impl Add for Histogram {
    type Output = Histogram;

    fn add(mut self, rhs: Histogram) -> Histogram {
        self += &rhs;
        self
    }
}

/// `h *= k`. Delegates to [`Histogram::scale`].
impl MulAssign<f64> for Histogram {
    fn mul_assign(&mut self, k: f64) {
        self.scale(k);
    }
}

/// `h /= k`. Delegates to [`Histogram::scale`] with `1/k`.
impl DivAssign<f64> for Histogram {
    fn div_assign(&mut self, k: f64) {
        self.scale(1.0 / k);
    }
}

/// `h * k`. Delegates to `*=`.
impl Mul<f64> for Histogram {
    type Output = Histogram;

    fn mul(mut self, k: f64) -> Histogram {
        self *= k;
        self
    }
}
