//! Native framed storage format for histograms.
//!
//! The format is a fixed header followed by a Postcard-encoded payload:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (24 bytes)                        │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything on the wire is little-endian regardless of host. Loads of a
//! stream with a newer major version fail explicitly; minor versions are
//! forward compatible through the version-tagged payload enum.
//!
//! # Example
//!
//! ```
//! use ndhist::axis::RegularAxis;
//! use ndhist::io::NativeCodec;
//! use ndhist::Histogram;
//!
//! let mut h = Histogram::new(vec![RegularAxis::new(4, 0.0, 1.0).unwrap().into()]);
//! h.fill(&[0.3]).unwrap();
//!
//! let codec = NativeCodec::new();
//! let bytes = codec.serialize(&h).unwrap();
//! let loaded = codec.deserialize(&bytes).unwrap();
//! assert_eq!(loaded, h);
//! ```

use std::io::{Read, Write};

use thiserror::Error;

use super::payload::Payload;
use crate::Histogram;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a histogram stream.
pub const MAGIC: &[u8; 4] = b"NDHS";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 24;

// ============================================================================
// Format Header
// ============================================================================

/// 24-byte header for the native storage format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("NDHS")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       2     Reserved
/// 8       4     Payload size (bytes)
/// 12      4     CRC32 checksum of payload
/// 16      4     Histogram rank
/// 20      4     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format version (major).
    pub version_major: u8,
    /// Format version (minor).
    pub version_minor: u8,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Number of axes of the stored histogram.
    pub rank: u32,
}

impl FormatHeader {
    /// Create a new header with the current version.
    pub fn new(rank: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            payload_size: 0,
            checksum: 0,
            rank,
        }
    }

    /// Serialize header to 24 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        // Magic (offset 0-3)
        buf[0..4].copy_from_slice(MAGIC);

        // Version (offset 4-5)
        buf[4] = self.version_major;
        buf[5] = self.version_minor;

        // Reserved (offset 6-7)
        buf[6..8].copy_from_slice(&[0, 0]);

        // Payload size (offset 8-11, little-endian)
        buf[8..12].copy_from_slice(&self.payload_size.to_le_bytes());

        // Checksum (offset 12-15, little-endian)
        buf[12..16].copy_from_slice(&self.checksum.to_le_bytes());

        // Rank (offset 16-19, little-endian)
        buf[16..20].copy_from_slice(&self.rank.to_le_bytes());

        // Reserved (offset 20-23)
        buf[20..24].copy_from_slice(&[0, 0, 0, 0]);

        buf
    }

    /// Parse header from 24 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAHistogram);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        let payload_size = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        let checksum = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        let rank = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);

        Ok(Self {
            version_major,
            version_minor,
            payload_size,
            checksum,
            rank,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur during deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// Stream is not a histogram (wrong magic).
    #[error("not a histogram stream")]
    NotAHistogram,

    /// Stream requires a newer reader.
    #[error("stream requires format {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Stream was truncated or incomplete.
    #[error("stream truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Payload is corrupt or malformed.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// CRC32 Helper
// ============================================================================

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// ============================================================================
// Native Codec
// ============================================================================

/// Codec for serializing/deserializing histograms in the native format.
#[derive(Debug, Clone, Default)]
pub struct NativeCodec;

impl NativeCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self
    }

    /// Serialize a histogram to an owned byte vector.
    pub fn serialize(&self, histogram: &Histogram) -> Result<Vec<u8>, SerializeError> {
        let mut out = Vec::new();
        self.write_to(&mut out, histogram)?;
        Ok(out)
    }

    /// Write header and payload to a writer.
    pub fn write_to<W: Write>(
        &self,
        writer: &mut W,
        histogram: &Histogram,
    ) -> Result<(), SerializeError> {
        let payload = postcard::to_allocvec(&Payload::from_histogram(histogram))?;

        let mut header = FormatHeader::new(histogram.rank() as u32);
        header.payload_size = payload.len() as u32;
        header.checksum = compute_checksum(&payload);

        writer.write_all(&header.to_bytes())?;
        writer.write_all(&payload)?;
        log::debug!(
            "serialized rank-{} histogram: {} payload bytes",
            histogram.rank(),
            payload.len()
        );
        Ok(())
    }

    /// Deserialize a histogram from a byte slice.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Histogram, DeserializeError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DeserializeError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let mut head = [0u8; HEADER_SIZE];
        head.copy_from_slice(&bytes[..HEADER_SIZE]);
        let header = FormatHeader::from_bytes(&head)?;

        let expected = HEADER_SIZE + header.payload_size as usize;
        if bytes.len() < expected {
            return Err(DeserializeError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        self.decode_payload(&header, &bytes[HEADER_SIZE..expected])
    }

    /// Read a histogram from a reader.
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<Histogram, DeserializeError> {
        let mut head = [0u8; HEADER_SIZE];
        reader.read_exact(&mut head)?;
        let header = FormatHeader::from_bytes(&head)?;

        let mut payload = vec![0u8; header.payload_size as usize];
        reader.read_exact(&mut payload)?;
        self.decode_payload(&header, &payload)
    }

    fn decode_payload(
        &self,
        header: &FormatHeader,
        payload: &[u8],
    ) -> Result<Histogram, DeserializeError> {
        let actual = compute_checksum(payload);
        if actual != header.checksum {
            return Err(DeserializeError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        let decoded: Payload = postcard::from_bytes(payload)?;
        let histogram = decoded.into_histogram()?;
        if histogram.rank() as u32 != header.rank {
            return Err(DeserializeError::CorruptPayload(format!(
                "header rank {} disagrees with payload rank {}",
                header.rank,
                histogram.rank()
            )));
        }
        log::debug!(
            "deserialized rank-{} histogram with {} bins",
            histogram.rank(),
            histogram.size()
        );
        Ok(histogram)
    }
}
