//! Document header: the leading marker digit, the payload length and the
//! checksum digit.
//!
//! ```text
//! <marker> <varint(length)> <checksum> <body digits>...
//! ```
//!
//! Marker `0` is the small-payload path, marker `1` is chunked format
//! version 1. Every other leading digit is rejected.

use super::errors::{DecodingError, EncodingError};
use super::varint::VarIntCodec;
use serde::Serialize;

/// Leading digit of a small-payload document.
pub const SMALL_MARKER: u32 = 0;

/// Leading digit of a version-1 chunked document.
pub const CHUNKED_V1: u32 = 1;

/// Which codec produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Small,
    Chunked,
}

impl DocumentKind {
    pub fn marker(self) -> u32 {
        match self {
            DocumentKind::Small => SMALL_MARKER,
            DocumentKind::Chunked => CHUNKED_V1,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Small => write!(f, "small"),
            DocumentKind::Chunked => write!(f, "chunked"),
        }
    }
}

/// Parsed document metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: DocumentKind,
    pub length: usize,
    pub checksum: u32,
    /// Index of the first body digit.
    pub body_start: usize,
}

/// Digits taken by the header of a payload of `length` bytes.
pub fn header_len(varint: &VarIntCodec, length: usize) -> usize {
    2 + varint.encoded_len(length as u64)
}

pub fn write_header(
    out: &mut Vec<u32>,
    varint: &VarIntCodec,
    kind: DocumentKind,
    length: usize,
    checksum: u32,
) {
    out.push(kind.marker());
    varint.encode(length as u64, out);
    out.push(checksum);
}

pub fn read_header(digits: &[u32], varint: &VarIntCodec) -> Result<Header, DecodingError> {
    let kind = match digits.first() {
        None => return Err(DecodingError::EmptyInput),
        Some(&SMALL_MARKER) => DocumentKind::Small,
        Some(&CHUNKED_V1) => DocumentKind::Chunked,
        Some(&digit) => return Err(DecodingError::UnsupportedVersion { digit }),
    };

    let (length, next) = varint.decode(digits, 1)?;
    let length = usize::try_from(length)
        .map_err(|_| DecodingError::malformed("declared length does not fit in memory"))?;
    if length == 0 {
        return Err(DecodingError::malformed("declared length is zero"));
    }

    let checksum = *digits.get(next).ok_or(DecodingError::Truncated {
        field: "checksum digit",
        position: next,
    })?;

    Ok(Header {
        kind,
        length,
        checksum,
        body_start: next + 1,
    })
}

/// Allocates an empty digit buffer, reporting allocation failure instead of aborting.
pub(crate) fn digit_buffer(capacity: usize) -> Result<Vec<u32>, EncodingError> {
    let mut digits = Vec::new();
    digits
        .try_reserve_exact(capacity)
        .map_err(|_| EncodingError::OutOfMemory {
            requested: capacity,
        })?;
    Ok(digits)
}
