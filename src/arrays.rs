//! ndarray export.
//!
//! Bin contents copy out into dynamic-dimensional arrays whose shape is the
//! per-axis extent (flow bins included) and whose index order matches the
//! histogram's internal indices: `arr[[i0, i1, …]]` is the bin at internal
//! indices `(i0, i1, …)`.

use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use crate::axis::Axis;
use crate::Histogram;

impl Histogram {
    fn shape(&self) -> Vec<usize> {
        self.axes().iter().map(|a| a.extent() as usize).collect()
    }

    fn export<F: Fn(usize) -> f64>(&self, read: F) -> ArrayD<f64> {
        let data: Vec<f64> = (0..self.size()).map(read).collect();
        // Axis 0 varies fastest in storage, which is Fortran order.
        ArrayD::from_shape_vec(IxDyn(&self.shape()).f(), data)
            .expect("bin count matches histogram shape")
    }

    /// Bin values as an array shaped `[extent_0, …, extent_{r−1}]`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndhist::axis::RegularAxis;
    /// use ndhist::Histogram;
    ///
    /// let mut h = Histogram::new(vec![RegularAxis::new(3, 0.0, 1.0).unwrap().into()]);
    /// h.fill(&[0.5]).unwrap();
    /// let values = h.values();
    /// assert_eq!(values.shape(), &[5]);
    /// assert_eq!(values[[2]], 1.0);
    /// ```
    pub fn values(&self) -> ArrayD<f64> {
        self.export(|i| self.storage().value(i))
    }

    /// Bin variances as an array shaped `[extent_0, …, extent_{r−1}]`.
    pub fn variances(&self) -> ArrayD<f64> {
        self.export(|i| self.storage().variance(i))
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::{AxisOptions, IntegerAxis, RegularAxis};
    use crate::Histogram;

    #[test]
    fn arrays_follow_internal_indices() {
        let mut h = Histogram::new(vec![
            RegularAxis::new(2, 0.0, 1.0).unwrap().into(),
            IntegerAxis::new(0, 2, AxisOptions::empty()).unwrap().into(),
        ]);
        h.fill(&[0.7, 1.0]).unwrap();
        h.fill_weighted(&[0.2, 0.0], 0.5).unwrap();

        let values = h.values();
        assert_eq!(values.shape(), &[4, 2]);
        assert_eq!(values[[2, 1]], 1.0);
        assert_eq!(values[[1, 0]], 0.5);

        let variances = h.variances();
        assert_eq!(variances[[1, 0]], 0.25);
        assert_eq!(variances[[2, 1]], 1.0);
    }
}
