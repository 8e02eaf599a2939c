use super::checksum::ChecksumEngine;
use super::errors::{DecodingError, EncodingError};
use super::framing::{self, DocumentKind, Header};
use super::mixing::mix_in_place;
use super::varint::VarIntCodec;
use num_integer::Integer;

/// Widest chunk a `u64` accumulator can hold.
pub const MAX_BYTES_PER_CHUNK: usize = 8;

/// Chunk sizing derived from the radix.
///
/// `width(n)` is the number of digits a chunk of `n` bytes always occupies:
/// the smallest `w` with `radix^w >= 256^n`, i.e. `ceil(8n / log2(radix))`
/// computed without floating point. `bytes_per_chunk` is the largest `n`
/// whose full digit capacity `radix^width(n)` still fits in a `u64`, so
/// neither direction of the conversion can overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkGeometry {
    radix: u32,
    bytes_per_chunk: usize,
    widths: [usize; MAX_BYTES_PER_CHUNK + 1],
}

impl ChunkGeometry {
    pub fn new(radix: u32) -> Self {
        let mut widths = [0usize; MAX_BYTES_PER_CHUNK + 1];
        for (n, width) in widths.iter_mut().enumerate().skip(1) {
            *width = min_width(radix, n);
        }

        let u64_capacity = 1u128 << 64;
        let bytes_per_chunk = (1..=MAX_BYTES_PER_CHUNK)
            .rev()
            .find(|&n| u128::from(radix).saturating_pow(widths[n] as u32) <= u64_capacity)
            .unwrap_or(1);

        ChunkGeometry {
            radix,
            bytes_per_chunk,
            widths,
        }
    }

    pub fn radix(&self) -> u32 {
        self.radix
    }

    pub fn bytes_per_chunk(&self) -> usize {
        self.bytes_per_chunk
    }

    pub fn bits_per_char(&self) -> f64 {
        f64::from(self.radix).log2()
    }

    /// Digits occupied by a chunk of `len` bytes (`1..=bytes_per_chunk`).
    #[inline]
    pub fn width(&self, len: usize) -> usize {
        self.widths[len]
    }

    /// Digits occupied by a full chunk.
    pub fn full_width(&self) -> usize {
        self.widths[self.bytes_per_chunk]
    }

    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.bytes_per_chunk)
    }

    /// Exact body length for a payload of `len` bytes; `None` on overflow.
    pub fn body_len(&self, len: usize) -> Option<usize> {
        let (full, rem) = len.div_rem(&self.bytes_per_chunk);
        let tail = if rem > 0 { self.widths[rem] } else { 0 };
        full.checked_mul(self.full_width())?.checked_add(tail)
    }

    /// Mixes one chunk and writes its fixed-width digits, most significant first.
    ///
    /// `out.len()` must equal `width(chunk.len())`.
    pub fn encode_chunk(&self, chunk: &[u8], offset: usize, out: &mut [u32]) {
        debug_assert_eq!(out.len(), self.width(chunk.len()));

        let mut buf = [0u8; MAX_BYTES_PER_CHUNK];
        buf[..chunk.len()].copy_from_slice(chunk);
        mix_in_place(&mut buf[..chunk.len()], offset);

        let radix = u64::from(self.radix);
        let mut value = u64::from_le_bytes(buf);
        for slot in out.iter_mut().rev() {
            let (quotient, remainder) = value.div_rem(&radix);
            *slot = remainder as u32;
            value = quotient;
        }
        debug_assert_eq!(value, 0);
    }

    /// Rebuilds one chunk from its digits and un-mixes it into `out`.
    ///
    /// `digits.len()` must equal `width(out.len())`.
    pub fn decode_chunk(
        &self,
        digits: &[u32],
        offset: usize,
        out: &mut [u8],
    ) -> Result<(), DecodingError> {
        debug_assert_eq!(digits.len(), self.width(out.len()));

        let radix = u64::from(self.radix);
        let mut value = 0u64;
        for &digit in digits {
            value = value
                .checked_mul(radix)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or_else(|| chunk_overflow(offset, out.len()))?;
        }

        if out.len() < MAX_BYTES_PER_CHUNK && value >> (8 * out.len()) != 0 {
            return Err(chunk_overflow(offset, out.len()));
        }

        out.copy_from_slice(&value.to_le_bytes()[..out.len()]);
        mix_in_place(out, offset);
        Ok(())
    }

    /// Encodes every chunk of `bytes` into `body`, which must be exactly
    /// `body_len(bytes.len())` digits long.
    pub fn encode_body(&self, bytes: &[u8], body: &mut [u32]) {
        debug_assert_eq!(Some(body.len()), self.body_len(bytes.len()));
        let chunks = bytes.chunks(self.bytes_per_chunk);
        let slots = body.chunks_mut(self.full_width());
        for (index, (chunk, out)) in chunks.zip(slots).enumerate() {
            self.encode_chunk(chunk, index * self.bytes_per_chunk, out);
        }
    }
}

fn chunk_overflow(offset: usize, len: usize) -> DecodingError {
    DecodingError::malformed(format!(
        "chunk at byte offset {} does not fit in {} bytes",
        offset, len
    ))
}

fn min_width(radix: u32, bytes: usize) -> usize {
    let target = 1u128 << (8 * bytes);
    let mut capacity = 1u128;
    let mut width = 0;
    while capacity < target {
        capacity = capacity.saturating_mul(u128::from(radix));
        width += 1;
    }
    width
}

/// Sliding-window codec for payloads above the small threshold.
///
/// Chunks are processed in offset order and concatenated without separators;
/// the decoder recovers the boundaries from the declared length alone.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedPayloadCodec {
    geometry: ChunkGeometry,
    varint: VarIntCodec,
    checksum: ChecksumEngine,
}

impl ChunkedPayloadCodec {
    pub fn new(radix: u32) -> Self {
        ChunkedPayloadCodec {
            geometry: ChunkGeometry::new(radix),
            varint: VarIntCodec::new(radix),
            checksum: ChecksumEngine::new(radix),
        }
    }

    pub fn geometry(&self) -> &ChunkGeometry {
        &self.geometry
    }

    /// Total document digits for a payload of `len` bytes.
    pub fn encoded_len(&self, len: usize) -> Option<usize> {
        self.geometry
            .body_len(len)?
            .checked_add(framing::header_len(&self.varint, len))
    }

    /// Encodes sequentially on the calling thread.
    pub fn encode(&self, bytes: &[u8]) -> Result<Vec<u32>, EncodingError> {
        let total = self
            .encoded_len(bytes.len())
            .ok_or(EncodingError::CapacityExceeded { len: bytes.len() })?;

        let mut digits = framing::digit_buffer(total)?;
        self.write_header(bytes, &mut digits);
        let body_start = digits.len();
        digits.resize(total, 0);
        self.encode_body(bytes, &mut digits[body_start..]);
        Ok(digits)
    }

    /// Writes the body digits of every chunk, in offset order.
    pub fn encode_body(&self, bytes: &[u8], body: &mut [u32]) {
        self.geometry.encode_body(bytes, body);
    }

    /// Frames a body produced elsewhere (e.g. by a parallel backend).
    pub fn assemble(&self, bytes: &[u8], body: &[u32]) -> Result<Vec<u32>, EncodingError> {
        let total = framing::header_len(&self.varint, bytes.len())
            .checked_add(body.len())
            .ok_or(EncodingError::CapacityExceeded { len: bytes.len() })?;
        let mut digits = framing::digit_buffer(total)?;
        self.write_header(bytes, &mut digits);
        digits.extend_from_slice(body);
        Ok(digits)
    }

    pub fn decode(&self, digits: &[u32], header: &Header) -> Result<Vec<u8>, DecodingError> {
        let expected = self
            .geometry
            .body_len(header.length)
            .ok_or_else(|| DecodingError::malformed("declared length overflows"))?;
        let body = &digits[header.body_start..];
        if body.len() != expected {
            return Err(DecodingError::LengthMismatch {
                expected,
                actual: body.len(),
            });
        }

        let bytes_per_chunk = self.geometry.bytes_per_chunk();
        let mut out = vec![0u8; header.length];
        let pieces = body.chunks(self.geometry.full_width());
        for (index, (piece, chunk)) in pieces.zip(out.chunks_mut(bytes_per_chunk)).enumerate() {
            self.geometry
                .decode_chunk(piece, index * bytes_per_chunk, chunk)?;
        }

        let actual = self.checksum.compute(&out);
        if actual != header.checksum {
            return Err(DecodingError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        Ok(out)
    }

    fn write_header(&self, bytes: &[u8], out: &mut Vec<u32>) {
        framing::write_header(
            out,
            &self.varint,
            DocumentKind::Chunked,
            bytes.len(),
            self.checksum.compute(bytes),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(codec: &ChunkedPayloadCodec, digits: &[u32]) -> Result<Vec<u8>, DecodingError> {
        let header = framing::read_header(digits, &VarIntCodec::new(codec.geometry.radix()))?;
        codec.decode(digits, &header)
    }

    #[test]
    fn test_geometry_base64() {
        let geometry = ChunkGeometry::new(64);
        // 8 bytes would need 11 digits = 66 bits of capacity
        assert_eq!(geometry.bytes_per_chunk(), 7);
        assert_eq!(geometry.full_width(), 10);
        assert_eq!(geometry.width(1), 2);
        assert_eq!(geometry.width(5), 7);
    }

    #[test]
    fn test_geometry_matches_log_formula() {
        for radix in [3u32, 10, 36, 58, 62, 64, 85, 100, 256, 1000, 65_536] {
            let geometry = ChunkGeometry::new(radix);
            for n in 1..=geometry.bytes_per_chunk() {
                let formula = ((n * 8) as f64 / geometry.bits_per_char()).ceil() as usize;
                assert_eq!(geometry.width(n), formula, "radix {radix}, {n} bytes");
            }
            let capacity = u128::from(radix).pow(geometry.full_width() as u32);
            assert!(capacity <= 1u128 << 64, "radix {radix}");
        }
    }

    #[test]
    fn test_geometry_byte_alphabet() {
        let geometry = ChunkGeometry::new(256);
        assert_eq!(geometry.bytes_per_chunk(), 8);
        assert_eq!(geometry.full_width(), 8);
    }

    #[test]
    fn test_body_len() {
        let geometry = ChunkGeometry::new(64);
        assert_eq!(geometry.body_len(14), Some(20));
        assert_eq!(geometry.body_len(15), Some(22));
        assert_eq!(geometry.body_len(usize::MAX), None);
    }

    #[test]
    fn test_chunk_round_trip() {
        let geometry = ChunkGeometry::new(62);
        let chunk = [0xFF, 0x00, 0x10, 0x80, 0x7F];
        let mut digits = vec![0u32; geometry.width(chunk.len())];
        geometry.encode_chunk(&chunk, 35, &mut digits);
        assert!(digits.iter().all(|&d| d < 62));

        let mut out = [0u8; 5];
        geometry.decode_chunk(&digits, 35, &mut out).unwrap();
        assert_eq!(out, chunk);
    }

    #[test]
    fn test_chunk_value_too_large() {
        // 8 decimal digits reach past 2^24
        let geometry = ChunkGeometry::new(10);
        let digits = vec![9u32; geometry.width(3)];
        let mut out = [0u8; 3];
        assert!(matches!(
            geometry.decode_chunk(&digits, 0, &mut out),
            Err(DecodingError::Malformed { .. })
        ));
    }

    #[test]
    fn test_document_round_trip() {
        let codec = ChunkedPayloadCodec::new(64);
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();
        let digits = codec.encode(&data).unwrap();
        assert_eq!(Some(digits.len()), codec.encoded_len(data.len()));
        assert_eq!(decode(&codec, &digits).unwrap(), data);
    }

    #[test]
    fn test_assemble_matches_sequential() {
        let codec = ChunkedPayloadCodec::new(58);
        let data = vec![0xAB; 333];
        let sequential = codec.encode(&data).unwrap();

        let mut body = vec![0u32; codec.geometry().body_len(data.len()).unwrap()];
        codec.encode_body(&data, &mut body);
        assert_eq!(codec.assemble(&data, &body).unwrap(), sequential);
    }

    #[test]
    fn test_length_mismatch() {
        let codec = ChunkedPayloadCodec::new(64);
        let mut digits = codec.encode(&[1u8; 40]).unwrap();
        digits.pop();
        assert!(matches!(
            decode(&codec, &digits),
            Err(DecodingError::LengthMismatch { .. })
        ));
        digits.extend([0, 0]);
        assert!(matches!(
            decode(&codec, &digits),
            Err(DecodingError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_run_is_mixed() {
        let codec = ChunkedPayloadCodec::new(64);
        let digits = codec.encode(&[0u8; 70]).unwrap();
        let body = &digits[digits.len() - codec.geometry().body_len(70).unwrap()..];
        let first = &body[..10];
        assert!(body.chunks(10).skip(1).any(|chunk| chunk != first));
    }
}
