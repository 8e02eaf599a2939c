//! Offset-keyed entropy mixing.
//!
//! Each chunk is XORed with a keystream derived only from its byte offset,
//! so runs of identical input bytes do not become runs of identical output
//! symbols. XOR with a data-independent keystream is its own inverse.

const SEED_MULTIPLIER: u32 = 0x9E37_79B1;

/// 32-bit avalanche: seed multiply followed by xor-shift/multiply rounds.
#[inline]
fn avalanche(x: u32) -> u32 {
    let mut h = x.wrapping_mul(SEED_MULTIPLIER);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Folds a 64-bit offset into 32 bits so offsets past 4 GiB stay distinct
/// from their low halves.
#[inline]
fn fold_offset(offset: u64) -> u32 {
    (offset ^ (offset >> 32)) as u32
}

/// The two mixing words for the chunk starting at `offset`.
#[inline]
pub fn mixing_words(offset: usize) -> (u32, u32) {
    let offset = offset as u64;
    (
        avalanche(fold_offset(offset)),
        avalanche(fold_offset(offset.wrapping_add(1))),
    )
}

/// Keystream byte for position `index` within a chunk.
#[inline]
pub fn keystream_byte(h1: u32, h2: u32, index: usize) -> u8 {
    let i = index as u32;
    let mut k = h1 ^ h2.rotate_left(i.wrapping_mul(8) & 31) ^ i.wrapping_mul(0x27D4_EB2F);
    k ^= k >> 15;
    k = k.wrapping_mul(0x2C1B_3C6D);
    k ^= k >> 12;
    (k & 0xFF) as u8
}

/// Mixes (or un-mixes) `chunk` in place for a chunk at `offset`.
pub fn mix_in_place(chunk: &mut [u8], offset: usize) {
    let (h1, h2) = mixing_words(offset);
    for (i, byte) in chunk.iter_mut().enumerate() {
        *byte ^= keystream_byte(h1, h2, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_is_involution() {
        let original: Vec<u8> = (0..7).collect();
        let mut chunk = original.clone();
        mix_in_place(&mut chunk, 4242);
        assert_ne!(chunk, original);
        mix_in_place(&mut chunk, 4242);
        assert_eq!(chunk, original);
    }

    #[test]
    fn test_depends_on_offset() {
        let mut a = [0u8; 8];
        let mut b = [0u8; 8];
        mix_in_place(&mut a, 0);
        mix_in_place(&mut b, 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(mixing_words(123_456), mixing_words(123_456));
        assert_ne!(mixing_words(0), mixing_words(1));
    }

    #[test]
    fn test_keystream_spreads_over_bytes() {
        // A zero chunk should not come out as a constant chunk.
        let mut chunk = [0u8; 8];
        mix_in_place(&mut chunk, 56);
        assert!(chunk.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_far_offsets_stay_distinct() {
        assert_ne!(mixing_words(16), mixing_words((1usize << 32) + 16));
    }
}
