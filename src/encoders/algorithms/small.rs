use super::checksum::ChecksumEngine;
use super::errors::{DecodingError, EncodingError};
use super::framing::{self, DocumentKind, Header};
use super::varint::VarIntCodec;
use crate::core::wide::{MAX_SMALL_THRESHOLD, WideUint};

/// Whole-payload radix conversion for payloads up to the small threshold.
///
/// The payload is read as one little-endian integer and written most
/// significant digit first, without leading zero digits. The declared length
/// restores any high-end zero bytes.
#[derive(Debug, Clone, Copy)]
pub struct SmallPayloadCodec {
    radix: u32,
    bits_per_char: f64,
    varint: VarIntCodec,
    checksum: ChecksumEngine,
}

impl SmallPayloadCodec {
    pub fn new(radix: u32) -> Self {
        SmallPayloadCodec {
            radix,
            bits_per_char: f64::from(radix).log2(),
            varint: VarIntCodec::new(radix),
            checksum: ChecksumEngine::new(radix),
        }
    }

    /// Upper bound on body digits for a payload of `len` bytes.
    pub fn max_body_len(&self, len: usize) -> usize {
        ((len * 8) as f64 / self.bits_per_char).ceil() as usize + 1
    }

    pub fn encode(&self, bytes: &[u8]) -> Result<Vec<u32>, EncodingError> {
        let mut value = WideUint::from_le_bytes(bytes)
            .ok_or(EncodingError::CapacityExceeded { len: bytes.len() })?;

        let capacity =
            framing::header_len(&self.varint, bytes.len()) + self.max_body_len(bytes.len());
        let mut digits = framing::digit_buffer(capacity)?;
        framing::write_header(
            &mut digits,
            &self.varint,
            DocumentKind::Small,
            bytes.len(),
            self.checksum.compute(bytes),
        );

        let body_start = digits.len();
        while !value.is_zero() {
            digits.push(value.div_rem_small(self.radix));
        }
        digits[body_start..].reverse();

        Ok(digits)
    }

    pub fn decode(&self, digits: &[u32], header: &Header) -> Result<Vec<u8>, DecodingError> {
        if header.length > MAX_SMALL_THRESHOLD {
            return Err(DecodingError::malformed(format!(
                "small payload declares {} bytes, limit is {}",
                header.length, MAX_SMALL_THRESHOLD
            )));
        }

        let body = &digits[header.body_start..];
        if body.first() == Some(&0) {
            return Err(DecodingError::malformed(
                "small payload body starts with a zero digit",
            ));
        }

        let mut value = WideUint::ZERO;
        for &digit in body {
            if !value.mul_add_small(self.radix, digit) {
                return Err(DecodingError::LengthMismatch {
                    expected: header.length,
                    actual: MAX_SMALL_THRESHOLD + 1,
                });
            }
        }

        let bytes = value
            .to_le_bytes(header.length)
            .ok_or(DecodingError::LengthMismatch {
                expected: header.length,
                actual: value.byte_len(),
            })?;

        let actual = self.checksum.compute(&bytes);
        if actual != header.checksum {
            return Err(DecodingError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        Ok(bytes)
    }
}
