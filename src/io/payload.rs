//! Payload structures for the native storage format.
//!
//! These structs are designed for serialization with Postcard and mirror the
//! runtime types: one tagged entry per axis (kind, metadata, option bits),
//! then the storage framing — bin count, depth byte, a zero-suppression
//! flag, and the cell bytes in little-endian order of the current depth.

use serde::{Deserialize, Serialize};

use super::native::DeserializeError;
use super::suppress;
use crate::axis::{Axis, AxisOptions, AxisVariant, CategoryAxis, IntegerAxis, RegularAxis};
use crate::storage::{AdaptiveStorage, CountBuffer, CountDepth, WeightedCell};
use crate::Histogram;

// ============================================================================
// Top-Level Payload
// ============================================================================

/// Version-tagged payload enum for forward compatibility.
///
/// New format versions add new variants rather than modifying existing ones;
/// older readers detect unsupported versions by the enum discriminant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Payload {
    /// Version 1 payload format.
    V1(PayloadV1),
}

/// Version 1 payload structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadV1 {
    /// Axes in histogram order.
    pub axes: Vec<AxisPayload>,
    /// The bin contents.
    pub storage: StoragePayload,
}

impl Payload {
    /// Capture a histogram as payload data, choosing the storage body
    /// encoding (zero-suppressed or raw) as a side effect.
    pub fn from_histogram(h: &Histogram) -> Self {
        Self::V1(PayloadV1 {
            axes: h.axes().iter().map(AxisPayload::from).collect(),
            storage: StoragePayload::from(h.storage()),
        })
    }

    /// Rebuild the histogram, validating axes, depth and cell counts; a
    /// failure discards the partially decoded state.
    pub fn into_histogram(self) -> Result<Histogram, DeserializeError> {
        let Payload::V1(v1) = self;
        let mut axes = Vec::with_capacity(v1.axes.len());
        for p in &v1.axes {
            axes.push(p.to_axis()?);
        }
        let storage = v1.storage.to_storage()?;
        let bincount: usize = axes.iter().map(|a| a.extent() as usize).product();
        if axes.is_empty() || bincount != storage.size() {
            return Err(DeserializeError::CorruptPayload(format!(
                "storage has {} bins but axes imply {}",
                storage.size(),
                bincount
            )));
        }
        Ok(Histogram::from_parts(axes, storage))
    }
}

// ============================================================================
// Axes
// ============================================================================

/// One axis: kind tag, metadata, and option bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AxisPayload {
    /// Uniform real-valued bins.
    Regular { bins: u32, lo: f64, hi: f64, options: u8 },
    /// Unit integer bins.
    Integer { lo: i64, hi: i64, options: u8 },
    /// Discrete labels in bin order.
    Category { labels: Vec<i64>, options: u8 },
}

impl From<&AxisVariant> for AxisPayload {
    fn from(axis: &AxisVariant) -> Self {
        match axis {
            AxisVariant::Regular(a) => Self::Regular {
                bins: a.n_bins(),
                lo: a.lo(),
                hi: a.hi(),
                options: a.options().bits(),
            },
            AxisVariant::Integer(a) => Self::Integer {
                lo: a.lo(),
                hi: a.hi(),
                options: a.options().bits(),
            },
            AxisVariant::Category(a) => Self::Category {
                labels: a.labels().to_vec(),
                options: a.options().bits(),
            },
        }
    }
}

impl AxisPayload {
    /// Rebuild the runtime axis, re-running construction validation so a
    /// corrupt stream cannot produce an invalid axis.
    fn to_axis(&self) -> Result<AxisVariant, DeserializeError> {
        let axis = match *self {
            Self::Regular { bins, lo, hi, options } => {
                RegularAxis::with_options(bins, lo, hi, AxisOptions::from_bits(options))
                    .map(AxisVariant::from)
            }
            Self::Integer { lo, hi, options } => {
                IntegerAxis::new(lo, hi, AxisOptions::from_bits(options)).map(AxisVariant::from)
            }
            Self::Category { ref labels, options } => {
                CategoryAxis::with_options(labels.clone(), AxisOptions::from_bits(options))
                    .map(AxisVariant::from)
            }
        };
        axis.map_err(|e| DeserializeError::CorruptPayload(e.to_string()))
    }
}

// ============================================================================
// Storage
// ============================================================================

/// Storage framing: bin count, depth byte, suppression flag, cell bytes.
///
/// The cell bytes are little-endian at the width the depth byte names. With
/// `zero_suppressed` set they hold the run-length stream of
/// [`suppress`](super::suppress) instead of the raw bin array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePayload {
    /// Number of bins.
    pub size: u64,
    /// Width class: 0 (unallocated), 1, 2, 4, 8, or 16 (weighted).
    pub depth: u8,
    /// Whether `cells` holds the zero-suppressed stream.
    pub zero_suppressed: bool,
    /// Cell bytes.
    pub cells: Vec<u8>,
}

impl From<&AdaptiveStorage> for StoragePayload {
    fn from(storage: &AdaptiveStorage) -> Self {
        // Zero-suppression is attempted first; raw is the fallback when the
        // suppressed stream would not be smaller.
        let (zero_suppressed, cells) = match storage.cells() {
            CountBuffer::Unallocated => (false, Vec::new()),
            CountBuffer::U8(v) => match suppress::encode_u8(v) {
                Some(s) => (true, s),
                None => (false, v.clone()),
            },
            CountBuffer::U16(v) => match suppress::encode_u16(v) {
                Some(s) => (true, u16_bytes(&s)),
                None => (false, u16_bytes(v)),
            },
            CountBuffer::U32(v) => match suppress::encode_u32(v) {
                Some(s) => (true, u32_bytes(&s)),
                None => (false, u32_bytes(v)),
            },
            CountBuffer::U64(v) => match suppress::encode_u64(v) {
                Some(s) => (true, u64_bytes(&s)),
                None => (false, u64_bytes(v)),
            },
            CountBuffer::Weighted(v) => match suppress::encode_weighted(v) {
                Some(s) => (true, weighted_bytes(&s)),
                None => (false, weighted_bytes(v)),
            },
        };
        Self {
            size: storage.size() as u64,
            depth: storage.depth() as u8,
            zero_suppressed,
            cells,
        }
    }
}

impl StoragePayload {
    fn to_storage(&self) -> Result<AdaptiveStorage, DeserializeError> {
        let size = self.size as usize;
        let depth = CountDepth::from_u8(self.depth).ok_or_else(|| {
            DeserializeError::CorruptPayload(format!("invalid storage depth {}", self.depth))
        })?;

        let corrupt = |what: &str| DeserializeError::CorruptPayload(what.to_string());

        let cells = match depth {
            CountDepth::Unallocated => {
                if self.zero_suppressed || !self.cells.is_empty() {
                    return Err(corrupt("unallocated storage carries cell bytes"));
                }
                CountBuffer::Unallocated
            }
            CountDepth::U8 => {
                let raw = self.cells.clone();
                CountBuffer::U8(self.finish(raw, size, suppress::decode_u8)?)
            }
            CountDepth::U16 => {
                let raw = u16_from_bytes(&self.cells).ok_or_else(|| corrupt("ragged u16 cells"))?;
                CountBuffer::U16(self.finish(raw, size, suppress::decode_u16)?)
            }
            CountDepth::U32 => {
                let raw = u32_from_bytes(&self.cells).ok_or_else(|| corrupt("ragged u32 cells"))?;
                CountBuffer::U32(self.finish(raw, size, suppress::decode_u32)?)
            }
            CountDepth::U64 => {
                let raw = u64_from_bytes(&self.cells).ok_or_else(|| corrupt("ragged u64 cells"))?;
                CountBuffer::U64(self.finish(raw, size, suppress::decode_u64)?)
            }
            CountDepth::Weighted => {
                let raw =
                    weighted_from_bytes(&self.cells).ok_or_else(|| corrupt("ragged weighted cells"))?;
                CountBuffer::Weighted(self.finish(raw, size, suppress::decode_weighted)?)
            }
        };
        Ok(AdaptiveStorage::from_parts(size, cells))
    }

    /// Expand a suppressed stream, or validate a raw array's length.
    fn finish<T>(
        &self,
        raw: Vec<T>,
        size: usize,
        decode: impl Fn(&[T], usize) -> Option<Vec<T>>,
    ) -> Result<Vec<T>, DeserializeError> {
        if self.zero_suppressed {
            decode(&raw, size).ok_or_else(|| {
                DeserializeError::CorruptPayload("malformed zero-suppressed stream".to_string())
            })
        } else if raw.len() == size {
            Ok(raw)
        } else {
            Err(DeserializeError::CorruptPayload(format!(
                "expected {} cells, got {}",
                size,
                raw.len()
            )))
        }
    }
}

// ============================================================================
// Little-endian cell packing
// ============================================================================

fn u16_bytes(v: &[u16]) -> Vec<u8> {
    v.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn u32_bytes(v: &[u32]) -> Vec<u8> {
    v.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn u64_bytes(v: &[u64]) -> Vec<u8> {
    v.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn weighted_bytes(v: &[WeightedCell]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 16);
    for cell in v {
        out.extend_from_slice(&cell.sum.to_le_bytes());
        out.extend_from_slice(&cell.sum2.to_le_bytes());
    }
    out
}

fn u16_from_bytes(b: &[u8]) -> Option<Vec<u16>> {
    let chunks = b.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return None;
    }
    Some(chunks.map(|c| u16::from_le_bytes([c[0], c[1]])).collect())
}

fn u32_from_bytes(b: &[u8]) -> Option<Vec<u32>> {
    let chunks = b.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return None;
    }
    Some(
        chunks
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

fn u64_from_bytes(b: &[u8]) -> Option<Vec<u64>> {
    let chunks = b.chunks_exact(8);
    if !chunks.remainder().is_empty() {
        return None;
    }
    Some(chunks.map(le_u64).collect())
}

fn weighted_from_bytes(b: &[u8]) -> Option<Vec<WeightedCell>> {
    let chunks = b.chunks_exact(16);
    if !chunks.remainder().is_empty() {
        return None;
    }
    Some(
        chunks
            .map(|c| WeightedCell {
                sum: f64::from_le_bytes(le_8(&c[0..8])),
                sum2: f64::from_le_bytes(le_8(&c[8..16])),
            })
            .collect(),
    )
}

fn le_u64(c: &[u8]) -> u64 {
    u64::from_le_bytes(le_8(c))
}

fn le_8(c: &[u8]) -> [u8; 8] {
    let mut a = [0u8; 8];
    a.copy_from_slice(&c[0..8]);
    a
}
