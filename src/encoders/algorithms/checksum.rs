/// Single-digit integrity check over a payload.
///
/// A position-weighted byte sum modulo the radix, with weights stepping by a
/// factor of 31. Catches accidental corruption only; it is not a MAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumEngine {
    radix: u64,
}

const WEIGHT_STEP: u64 = 31;

impl ChecksumEngine {
    pub fn new(radix: u32) -> Self {
        ChecksumEngine {
            radix: u64::from(radix),
        }
    }

    /// Computes the checksum digit of `bytes`, in `[0, radix)`.
    pub fn compute(&self, bytes: &[u8]) -> u32 {
        let mut checksum = 0u64;
        let mut multiplier = 1u64;
        for &byte in bytes {
            checksum = (checksum + u64::from(byte) * multiplier) % self.radix;
            multiplier = (multiplier * WEIGHT_STEP) % self.radix;
        }
        checksum as u32
    }

    pub fn verify(&self, bytes: &[u8], expected: u32) -> bool {
        self.compute(bytes) == expected
    }
}
