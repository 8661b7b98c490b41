//! Categorical axis over integer labels.

use std::collections::HashMap;

use super::{Axis, AxisError, AxisOptions};

/// Axis over a finite ordered set of distinct integer labels.
///
/// Bin `j` holds label `labels[j]`; the coordinate is truncated to an
/// integer label before lookup. There is no underflow bin. An unknown label
/// goes to the overflow bin when [`AxisOptions::OVERFLOW`] is set, is
/// appended as a new bin when [`AxisOptions::GROWTH`] is set, and is dropped
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAxis {
    /// Labels in bin order.
    labels: Vec<i64>,
    /// Label → bin index.
    lookup: HashMap<i64, u32>,
    options: AxisOptions,
}

impl CategoryAxis {
    /// Axis over the given labels, unknown labels collected in overflow.
    pub fn new(labels: Vec<i64>) -> Result<Self, AxisError> {
        Self::with_options(labels, AxisOptions::from_bits(AxisOptions::OVERFLOW))
    }

    /// Axis with explicit options.
    pub fn with_options(labels: Vec<i64>, options: AxisOptions) -> Result<Self, AxisError> {
        if labels.is_empty() {
            return Err(AxisError::EmptyRange);
        }
        if options.contains(AxisOptions::UNDERFLOW) {
            return Err(AxisError::IncompatibleOptions("underflow", "category"));
        }
        if options.contains(AxisOptions::CIRCULAR) {
            return Err(AxisError::IncompatibleOptions("circular", "category"));
        }
        if options.contains(AxisOptions::GROWTH) && options.contains(AxisOptions::OVERFLOW) {
            return Err(AxisError::IncompatibleOptions("growth", "underflow/overflow"));
        }
        let mut lookup = HashMap::with_capacity(labels.len());
        for (j, &label) in labels.iter().enumerate() {
            if lookup.insert(label, j as u32).is_some() {
                return Err(AxisError::DuplicateLabel(label));
            }
        }
        Ok(Self { labels, lookup, options })
    }

    /// Growable axis: unknown labels are appended instead of collected.
    pub fn growable(labels: Vec<i64>) -> Result<Self, AxisError> {
        Self::with_options(labels, AxisOptions::growth())
    }

    /// Labels in bin order.
    #[inline]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }
}

impl Axis for CategoryAxis {
    #[inline]
    fn n_bins(&self) -> u32 {
        self.labels.len() as u32
    }

    #[inline]
    fn options(&self) -> AxisOptions {
        self.options
    }

    fn update(&mut self, x: f64) -> (i32, i32) {
        let n = self.n_bins() as i32;
        if !x.is_finite() {
            return (n, 0);
        }
        let label = x as i64;
        if let Some(&j) = self.lookup.get(&label) {
            return (j as i32, 0);
        }
        if self.options.contains(AxisOptions::GROWTH) {
            self.lookup.insert(label, self.labels.len() as u32);
            self.labels.push(label);
            return (n, 1);
        }
        // Overflow bin when enabled, invalid otherwise.
        (n, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_in_order() {
        let mut a = CategoryAxis::new(vec![3, 1, 7]).unwrap();
        assert_eq!(a.update(3.0), (0, 0));
        assert_eq!(a.update(1.0), (1, 0));
        assert_eq!(a.update(7.0), (2, 0));
        assert_eq!(a.extent(), 4);
    }

    #[test]
    fn unknown_label_goes_to_overflow() {
        let mut a = CategoryAxis::new(vec![3, 1, 7]).unwrap();
        assert_eq!(a.update(5.0), (3, 0));
        assert_eq!(a.update(f64::NAN), (3, 0));
    }

    #[test]
    fn without_overflow_unknown_is_invalid() {
        let mut a = CategoryAxis::with_options(vec![3, 1], AxisOptions::empty()).unwrap();
        assert_eq!(a.extent(), 2);
        assert_eq!(a.update(5.0), (2, 0)); // == extent, dropped by the linearizer
    }

    #[test]
    fn growth_appends_unknown_labels() {
        let mut a = CategoryAxis::growable(vec![3]).unwrap();
        assert_eq!(a.update(5.0), (1, 1));
        assert_eq!(a.update(5.0), (1, 0));
        assert_eq!(a.labels(), &[3, 5]);
        assert_eq!(a.extent(), 2);
    }

    #[test]
    fn rejects_duplicates_and_underflow() {
        assert_eq!(
            CategoryAxis::new(vec![1, 1]),
            Err(AxisError::DuplicateLabel(1))
        );
        assert!(CategoryAxis::with_options(vec![1], AxisOptions::flow()).is_err());
    }
}
