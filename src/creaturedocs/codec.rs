//! # Record Codec
//!
//! Converts a [`Record`] to and from the bytes stored in `record.bin`.
//!
//! The encoding is pretty-printed JSON:
//!
//! ```text
//! {
//!   "title": "Vampire Bat",
//!   "rating": 4.5
//! }
//! ```
//!
//! JSON keeps the file self-describing and readable with any text tool.
//! Floats are written in their shortest round-tripping form, so the rating
//! comes back bit-for-bit. JSON has no spelling for NaN or infinity, so
//! records carrying one are rejected at encode time rather than written in
//! a form that could never be read back.

use crate::error::{Result, StoreError};
use crate::model::Record;

pub fn encode(record: &Record) -> Result<Vec<u8>> {
    if !record.rating.is_finite() {
        return Err(StoreError::InvalidRecord(format!(
            "rating must be finite, got {}",
            record.rating
        )));
    }
    serde_json::to_vec_pretty(record).map_err(|e| StoreError::InvalidRecord(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<Record> {
    serde_json::from_slice(bytes).map_err(StoreError::CorruptRecord)
}
