//! ndhist: multi-dimensional histograms for Rust.
//!
//! A histogram is a Cartesian product of binning axes over an adaptive count
//! storage. Fills start in 8-bit counters and the storage widens itself on
//! demand, up to a weighted `(sum_w, sum_w²)` accumulator per bin, so memory
//! tracks what the data actually needs.
//!
//! # Key Types
//!
//! - [`Histogram`] - the façade: fill, lookup, merge, scale, reduce
//! - [`axis::RegularAxis`] / [`axis::IntegerAxis`] / [`axis::CategoryAxis`] -
//!   the axis kinds, combined through [`axis::AxisVariant`]
//! - [`storage::AdaptiveStorage`] - the width-promoting bin store
//! - [`io::NativeCodec`] - framed binary persistence
//!
//! # Filling
//!
//! ```
//! use ndhist::axis::{AxisOptions, IntegerAxis, RegularAxis};
//! use ndhist::Histogram;
//!
//! let mut h = Histogram::new(vec![
//!     RegularAxis::new(10, 0.0, 1.0).unwrap().into(),
//!     IntegerAxis::new(0, 3, AxisOptions::flow()).unwrap().into(),
//! ]);
//! h.fill(&[0.25, 1.0]).unwrap();
//! h.fill_weighted(&[0.25, 1.0], 0.5).unwrap();
//!
//! // Internal indices: bin 0 is underflow on axes that have it.
//! let bin = h.at(&[3, 2]).unwrap();
//! assert_eq!(bin.value, 1.5);
//! assert_eq!(bin.variance, 1.25);
//! ```
//!
//! # Persistence
//!
//! Use [`io::NativeCodec`] to serialize to the framed `NDHS` format and load
//! it back; see the [`io`] module for the wire layout.

// Re-export approx traits for users who want to compare bin contents.
pub use approx;

pub mod axis;
pub mod io;
pub mod storage;

mod arrays;
mod error;
mod histogram;
mod linearize;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::HistogramError;
pub use histogram::{BinIter, BinView, Histogram};
