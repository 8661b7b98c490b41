//! Histogram serialization.
//!
//! The native format is a framed binary container: a fixed little-endian
//! header with magic, version and checksum, then a Postcard payload holding
//! the axes and the bin contents. Sparse bin payloads are zero-suppressed
//! when that makes the stream smaller.

pub mod native;
pub mod payload;

mod suppress;

pub use native::{
    DeserializeError, FormatHeader, NativeCodec, SerializeError, CURRENT_VERSION_MAJOR,
    CURRENT_VERSION_MINOR, HEADER_SIZE, MAGIC,
};
pub use payload::{AxisPayload, Payload, PayloadV1, StoragePayload};
