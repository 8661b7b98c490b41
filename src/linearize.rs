//! Folding per-axis indices into a flat storage offset.
//!
//! The fill path runs every coordinate through its axis, biases the result
//! when an underflow bin exists, and accumulates a row-major offset with
//! axis 0 varying fastest. An index outside the axis extent collapses the
//! running stride to zero, which both marks the fill invalid and keeps the
//! remaining axes from contributing.
//!
//! When any axis reports a growth shift, the storage is rebuilt onto the
//! enlarged shape before the cell update; per-axis indices are already
//! computed in the new extents, so the folded offset stays valid.

use crate::axis::{Axis, AxisOptions, AxisVariant};
use crate::storage::AdaptiveStorage;

/// A flat index with an invalid state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OptionalIndex {
    idx: usize,
    stride: usize,
}

impl OptionalIndex {
    pub(crate) fn new() -> Self {
        Self { idx: 0, stride: 1 }
    }

    /// Fold one axis: `idx += j · stride`, `stride *= extent`, or collapse
    /// the stride when `j` is outside `0..extent`.
    pub(crate) fn accumulate(&mut self, extent: u32, j: i32) {
        if self.stride == 0 {
            return;
        }
        if 0 <= j && (j as u32) < extent {
            self.idx += j as usize * self.stride;
            self.stride *= extent as usize;
        } else {
            self.stride = 0;
        }
    }

    /// The folded offset, or `None` if any axis rejected its coordinate.
    pub(crate) fn get(&self) -> Option<usize> {
        (self.stride > 0).then_some(self.idx)
    }
}

/// Run a coordinate tuple through the axes and return the storage offset of
/// the target cell, or `None` for a dropped fill.
///
/// Growable axes may enlarge themselves here; the storage is rebuilt in that
/// case so every prior count keeps its bin. Arity has been checked by the
/// caller.
pub(crate) fn fill_index(
    axes: &mut [AxisVariant],
    storage: &mut AdaptiveStorage,
    coords: &[f64],
) -> Option<usize> {
    debug_assert_eq!(axes.len(), coords.len());
    let mut out = OptionalIndex::new();
    let mut shifts = vec![0i32; axes.len()];
    let mut grew = false;
    for (k, axis) in axes.iter_mut().enumerate() {
        let (mut j, shift) = axis.update(coords[k]);
        if axis.options().contains(AxisOptions::UNDERFLOW) {
            j += 1;
        }
        out.accumulate(axis.extent(), j);
        shifts[k] = shift;
        grew |= shift != 0;
    }
    if grew {
        rebuild_after_growth(axes, &shifts, storage);
    }
    out.get()
}

/// Rebuild the storage after one or more axes grew.
///
/// The old extents are recovered as `extent − |shift|`. Every old cell moves
/// to `Σ (idx + max(−shift, 0)) · new_stride`, translating indices by the
/// amount the lower edge moved; each cell lands at exactly one new offset.
fn rebuild_after_growth(axes: &[AxisVariant], shifts: &[i32], storage: &mut AdaptiveStorage) {
    let rank = axes.len();
    let mut old_extents = vec![0usize; rank];
    let mut translations = vec![0usize; rank];
    let mut new_strides = vec![0usize; rank];
    let mut new_size = 1usize;
    for k in 0..rank {
        let e = axes[k].extent() as usize;
        old_extents[k] = e - shifts[k].unsigned_abs() as usize;
        translations[k] = (-shifts[k]).max(0) as usize;
        new_strides[k] = new_size;
        new_size *= e;
    }
    debug_assert_eq!(
        old_extents.iter().product::<usize>(),
        storage.size(),
        "old shape must match current storage"
    );
    log::debug!(
        "axis growth: rebuilding storage from {} to {} bins",
        storage.size(),
        new_size
    );

    storage.rebuild(new_size, |old_flat| {
        let mut rem = old_flat;
        let mut new_flat = 0;
        for k in 0..rank {
            let idx = rem % old_extents[k];
            rem /= old_extents[k];
            new_flat += (idx + translations[k]) * new_strides[k];
        }
        new_flat
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AxisOptions, IntegerAxis, RegularAxis};

    #[test]
    fn folds_row_major_with_axis_zero_fastest() {
        let mut out = OptionalIndex::new();
        out.accumulate(3, 1);
        out.accumulate(4, 2);
        assert_eq!(out.get(), Some(1 + 2 * 3));
    }

    #[test]
    fn invalid_index_collapses_the_stride() {
        let mut out = OptionalIndex::new();
        out.accumulate(3, 3);
        out.accumulate(4, 1);
        assert_eq!(out.get(), None);
    }

    #[test]
    fn underflow_bias_is_applied() {
        let mut axes: Vec<AxisVariant> = vec![RegularAxis::new(2, 0.0, 1.0).unwrap().into()];
        let mut storage = AdaptiveStorage::new(4);
        assert_eq!(fill_index(&mut axes, &mut storage, &[-1.0]), Some(0));
        assert_eq!(fill_index(&mut axes, &mut storage, &[0.3]), Some(1));
        assert_eq!(fill_index(&mut axes, &mut storage, &[5.0]), Some(3));
    }

    #[test]
    fn out_of_range_without_flow_is_dropped() {
        let mut axes: Vec<AxisVariant> =
            vec![RegularAxis::with_options(2, 0.0, 1.0, AxisOptions::empty())
                .unwrap()
                .into()];
        let mut storage = AdaptiveStorage::new(2);
        assert_eq!(fill_index(&mut axes, &mut storage, &[1.5]), None);
        assert_eq!(fill_index(&mut axes, &mut storage, &[0.9]), Some(1));
    }

    #[test]
    fn growth_rebuild_preserves_cells() {
        let mut axes: Vec<AxisVariant> = vec![IntegerAxis::growable(0, 1).unwrap().into()];
        let mut storage = AdaptiveStorage::new(1);
        let i = fill_index(&mut axes, &mut storage, &[0.0]).unwrap();
        storage.increase(i);

        // Growing below by two bins shifts the old cell up.
        let i = fill_index(&mut axes, &mut storage, &[-2.0]).unwrap();
        assert_eq!(i, 0);
        assert_eq!(storage.size(), 3);
        storage.increase(i);
        assert_eq!(storage.value(2), 1.0);
    }
}
