//! Real-valued axis with uniform bins.

use bon::Builder;

use super::{check_growth_excludes_flow, Axis, AxisError, AxisOptions};

/// Axis with `bins` uniform divisions of the half-open interval `[lo, hi)`.
///
/// Coordinates below `lo` map to the underflow bin and coordinates at or
/// above `hi` to the overflow bin, when those are enabled. With
/// [`AxisOptions::CIRCULAR`] finite coordinates wrap modulo the period
/// `hi - lo`. With [`AxisOptions::GROWTH`] an out-of-range coordinate
/// extends the axis in whole-bin steps toward the value instead.
///
/// # Example
///
/// ```
/// use ndhist::axis::{Axis, AxisOptions, RegularAxis};
///
/// let axis = RegularAxis::builder()
///     .bins(10)
///     .lo(0.0)
///     .hi(1.0)
///     .build()
///     .unwrap();
/// assert_eq!(axis.extent(), 12); // 10 bins + underflow + overflow
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct RegularAxis {
    /// Number of real bins. Grows when [`AxisOptions::GROWTH`] is set.
    bins: u32,
    /// Low edge of the first real bin.
    lo: f64,
    /// High edge past the last real bin.
    hi: f64,
    /// Option bits. Default: underflow and overflow enabled.
    #[builder(default)]
    options: AxisOptions,
}

/// Custom finishing function that validates the axis parameters.
impl<S: regular_axis_builder::IsComplete> RegularAxisBuilder<S> {
    /// Build and validate the axis.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError`] for a zero bin count, a non-finite or inverted
    /// range, or an incompatible option combination.
    pub fn build(self) -> Result<RegularAxis, AxisError> {
        let axis = self.__build_internal();
        axis.validate()?;
        Ok(axis)
    }
}

impl RegularAxis {
    /// Axis with underflow and overflow bins.
    pub fn new(bins: u32, lo: f64, hi: f64) -> Result<Self, AxisError> {
        Self::with_options(bins, lo, hi, AxisOptions::flow())
    }

    /// Axis with explicit options.
    pub fn with_options(bins: u32, lo: f64, hi: f64, options: AxisOptions) -> Result<Self, AxisError> {
        let axis = Self { bins, lo, hi, options };
        axis.validate()?;
        Ok(axis)
    }

    fn validate(&self) -> Result<(), AxisError> {
        if self.bins == 0 {
            return Err(AxisError::EmptyRange);
        }
        if !(self.lo.is_finite() && self.hi.is_finite() && self.lo < self.hi) {
            return Err(AxisError::InvalidRange { lo: self.lo, hi: self.hi });
        }
        check_growth_excludes_flow(self.options)?;
        if self.options.contains(AxisOptions::CIRCULAR)
            && self.options.contains(AxisOptions::UNDERFLOW)
        {
            return Err(AxisError::IncompatibleOptions("circular", "underflow"));
        }
        Ok(())
    }

    /// Low edge.
    #[inline]
    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// High edge.
    #[inline]
    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Width of one bin.
    #[inline]
    pub fn step(&self) -> f64 {
        (self.hi - self.lo) / self.bins as f64
    }
}

impl Axis for RegularAxis {
    #[inline]
    fn n_bins(&self) -> u32 {
        self.bins
    }

    #[inline]
    fn options(&self) -> AxisOptions {
        self.options
    }

    fn update(&mut self, x: f64) -> (i32, i32) {
        let n = self.bins as i32;
        if self.options.contains(AxisOptions::CIRCULAR) {
            if x.is_finite() {
                let z = (x - self.lo) / (self.hi - self.lo);
                let z = z - z.floor();
                // The wrap keeps z in [0, 1); the min guards the float edge
                // where z * bins rounds up to bins.
                let j = ((z * self.bins as f64) as i32).min(n - 1);
                return (j, 0);
            }
            return (n, 0);
        }

        let z = (x - self.lo) / (self.hi - self.lo);
        if (0.0..1.0).contains(&z) {
            let j = ((z * self.bins as f64) as i32).min(n - 1);
            return (j, 0);
        }

        if self.options.contains(AxisOptions::GROWTH) && x.is_finite() {
            let step = self.step();
            let d = ((x - self.lo) / step).floor();
            if d < 0.0 {
                let add = (-d) as u32;
                self.lo += d * step;
                self.bins += add;
                return (0, d as i32);
            }
            let d = d as u32;
            let add = d + 1 - self.bins;
            self.hi += add as f64 * step;
            self.bins = d + 1;
            return (d as i32, add as i32);
        }

        // NaN joins the overflow arm, like any non-finite coordinate.
        if z < 0.0 {
            (-1, 0)
        } else {
            (n, 0)
        }
    }
}
