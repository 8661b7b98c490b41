//! Binning axes.
//!
//! An axis maps an input coordinate to an internal bin index in
//! `0..extent`, where the extent counts the real bins plus the optional
//! underflow and overflow bins. Three kinds are provided:
//!
//! - [`RegularAxis`] — uniform real-valued bins over `[lo, hi)`
//! - [`IntegerAxis`] — unit bins over a half-open integer range
//! - [`CategoryAxis`] — a finite set of integer labels
//!
//! Kinds are combined into the tagged [`AxisVariant`], which a histogram
//! stores as an ordered `Vec`. Dispatch is by exhaustive match, so equality
//! and serialization stay ordinary data operations.
//!
//! Coordinates are `f64` for every kind; the category axis truncates the
//! coordinate to an integer label.

mod category;
mod integer;
mod regular;

pub use category::CategoryAxis;
pub use integer::IntegerAxis;
pub use regular::RegularAxis;

// ============================================================================
// Options
// ============================================================================

/// Bitfield of axis behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisOptions(u8);

impl AxisOptions {
    /// Reserve internal index 0 for coordinates below the low edge.
    pub const UNDERFLOW: u8 = 1 << 0;
    /// Reserve the last internal index for coordinates at/above the high edge.
    pub const OVERFLOW: u8 = 1 << 1;
    /// Wrap finite coordinates modulo the axis period.
    pub const CIRCULAR: u8 = 1 << 2;
    /// Enlarge the axis instead of rejecting out-of-range coordinates.
    pub const GROWTH: u8 = 1 << 3;

    /// No options set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Underflow and overflow bins enabled (the default).
    pub const fn flow() -> Self {
        Self(Self::UNDERFLOW | Self::OVERFLOW)
    }

    /// Growth enabled, flow bins disabled.
    pub const fn growth() -> Self {
        Self(Self::GROWTH)
    }

    /// Create from raw bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if a flag is set.
    pub const fn contains(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Number of flow bins implied by these options (0, 1 or 2).
    #[inline]
    pub fn flow_bins(self) -> u32 {
        self.contains(Self::UNDERFLOW) as u32 + self.contains(Self::OVERFLOW) as u32
    }
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self::flow()
    }
}

// ============================================================================
// Axis contract
// ============================================================================

/// The contract every axis kind satisfies.
pub trait Axis {
    /// Number of real bins, excluding flow bins.
    fn n_bins(&self) -> u32;

    /// Option bits.
    fn options(&self) -> AxisOptions;

    /// Number of internal bins including flow bins.
    #[inline]
    fn extent(&self) -> u32 {
        self.n_bins() + self.options().flow_bins()
    }

    /// Map a coordinate to `(index, shift)`.
    ///
    /// The index is relative to the real bins: in-range coordinates map to
    /// `0..n_bins`, below-range to `-1` and at/above-range to `n_bins`. The
    /// linearizer biases by +1 when the underflow bin exists; indices that
    /// land outside `0..extent` after biasing invalidate the fill.
    ///
    /// `shift` is non-zero only when a growable axis enlarged itself: negative
    /// when bins were prepended below, positive when appended above. After
    /// growth the extent has increased by `|shift|` and the returned index is
    /// valid in the new extent.
    fn update(&mut self, coord: f64) -> (i32, i32);
}

/// Construction-time validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AxisError {
    #[error("axis must have at least one bin")]
    EmptyRange,

    #[error("axis range [{lo}, {hi}) must be finite and increasing")]
    InvalidRange { lo: f64, hi: f64 },

    #[error("duplicate category label {0}")]
    DuplicateLabel(i64),

    #[error("option {0} cannot be combined with {1}")]
    IncompatibleOptions(&'static str, &'static str),
}

pub(crate) fn check_growth_excludes_flow(options: AxisOptions) -> Result<(), AxisError> {
    if options.contains(AxisOptions::GROWTH)
        && (options.contains(AxisOptions::UNDERFLOW) || options.contains(AxisOptions::OVERFLOW))
    {
        return Err(AxisError::IncompatibleOptions("growth", "underflow/overflow"));
    }
    if options.contains(AxisOptions::GROWTH) && options.contains(AxisOptions::CIRCULAR) {
        return Err(AxisError::IncompatibleOptions("growth", "circular"));
    }
    Ok(())
}

// ============================================================================
// Variant
// ============================================================================

/// Tagged sum of the axis kinds.
///
/// Heterogeneous axis sequences hold this type; every operation dispatches
/// with an exhaustive match rather than through a vtable.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisVariant {
    /// Uniform real-valued bins.
    Regular(RegularAxis),
    /// Unit integer bins.
    Integer(IntegerAxis),
    /// Discrete labels.
    Category(CategoryAxis),
}

impl Axis for AxisVariant {
    #[inline]
    fn n_bins(&self) -> u32 {
        match self {
            Self::Regular(a) => a.n_bins(),
            Self::Integer(a) => a.n_bins(),
            Self::Category(a) => a.n_bins(),
        }
    }

    #[inline]
    fn options(&self) -> AxisOptions {
        match self {
            Self::Regular(a) => a.options(),
            Self::Integer(a) => a.options(),
            Self::Category(a) => a.options(),
        }
    }

    #[inline]
    fn update(&mut self, coord: f64) -> (i32, i32) {
        match self {
            Self::Regular(a) => a.update(coord),
            Self::Integer(a) => a.update(coord),
            Self::Category(a) => a.update(coord),
        }
    }
}

impl From<RegularAxis> for AxisVariant {
    fn from(a: RegularAxis) -> Self {
        Self::Regular(a)
    }
}

impl From<IntegerAxis> for AxisVariant {
    fn from(a: IntegerAxis) -> Self {
        Self::Integer(a)
    }
}

impl From<CategoryAxis> for AxisVariant {
    fn from(a: CategoryAxis) -> Self {
        Self::Category(a)
    }
}
