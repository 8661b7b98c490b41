//! Failures reported by the histogram façade.

use thiserror::Error;

/// Errors from fills, lookups and combination operators.
///
/// Out-of-range *coordinates* are not an error: on an axis without the
/// matching flow bin the corresponding cell does not exist and the fill is
/// dropped silently. The variants here are genuine caller mistakes, and the
/// receiver is left unmodified in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistogramError {
    /// Fill or lookup with the wrong number of coordinates.
    #[error("number of arguments ({got}) differs from histogram rank ({expected})")]
    ArityMismatch { expected: usize, got: usize },

    /// Combination of histograms whose axes are not element-wise equal.
    #[error("histogram axes differ")]
    AxesMismatch,

    /// Lookup index outside an axis extent.
    #[error("index {index} out of range for axis {axis} with extent {extent}")]
    IndexOutOfRange {
        axis: usize,
        index: usize,
        extent: u32,
    },

    /// Projection onto an axis sequence that is not strictly ascending and
    /// in range.
    #[error("reduce axes must be strictly ascending and in range")]
    InvalidReduce,
}
