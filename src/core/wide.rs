//! Fixed-capacity unsigned integer for the small-payload path.
//!
//! Holds up to `MAX_SMALL_THRESHOLD` bytes in 32-bit limbs on the stack.
//! Only the operations needed for radix conversion are provided: division
//! by a small divisor (encode) and multiply-accumulate by a small factor
//! (decode).

/// Largest payload, in bytes, the small path can hold as one integer.
pub const MAX_SMALL_THRESHOLD: usize = 256;

const LIMBS: usize = MAX_SMALL_THRESHOLD / 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideUint {
    /// Little-endian limbs; only `limbs[..used]` may be non-zero.
    limbs: [u32; LIMBS],
    used: usize,
}

impl WideUint {
    pub const ZERO: WideUint = WideUint {
        limbs: [0; LIMBS],
        used: 0,
    };

    /// Interprets `bytes` as a little-endian integer (`bytes[0]` least significant).
    ///
    /// Returns `None` if there are more bytes than the capacity.
    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MAX_SMALL_THRESHOLD {
            return None;
        }

        let mut value = Self::ZERO;
        for (i, group) in bytes.chunks(4).enumerate() {
            let mut limb = [0u8; 4];
            limb[..group.len()].copy_from_slice(group);
            value.limbs[i] = u32::from_le_bytes(limb);
        }
        value.used = bytes.len().div_ceil(4);
        value.normalize();
        Some(value)
    }

    pub fn is_zero(&self) -> bool {
        self.used == 0
    }

    /// Divides in place by `divisor` and returns the remainder.
    pub fn div_rem_small(&mut self, divisor: u32) -> u32 {
        debug_assert!(divisor > 1);
        let divisor = u64::from(divisor);
        let mut rem = 0u64;
        for limb in self.limbs[..self.used].iter_mut().rev() {
            let acc = (rem << 32) | u64::from(*limb);
            *limb = (acc / divisor) as u32;
            rem = acc % divisor;
        }
        self.normalize();
        rem as u32
    }

    /// Computes `self * factor + addend` in place.
    ///
    /// Returns `false` (leaving `self` unspecified) if the result exceeds capacity.
    pub fn mul_add_small(&mut self, factor: u32, addend: u32) -> bool {
        let factor = u64::from(factor);
        let mut carry = u64::from(addend);
        for limb in self.limbs[..self.used].iter_mut() {
            let acc = u64::from(*limb) * factor + carry;
            *limb = acc as u32;
            carry = acc >> 32;
        }
        if carry != 0 {
            if self.used == LIMBS {
                return false;
            }
            self.limbs[self.used] = carry as u32;
            self.used += 1;
        }
        self.normalize();
        true
    }

    /// Number of significant bytes.
    pub fn byte_len(&self) -> usize {
        match self.used {
            0 => 0,
            n => (n - 1) * 4 + 4 - (self.limbs[n - 1].leading_zeros() / 8) as usize,
        }
    }

    /// Writes the value as exactly `len` little-endian bytes, zero-filling the
    /// high end.
    ///
    /// Returns `None` if the value needs more than `len` bytes.
    pub fn to_le_bytes(&self, len: usize) -> Option<Vec<u8>> {
        if self.byte_len() > len {
            return None;
        }
        let mut out = vec![0u8; len];
        for (i, limb) in self.limbs[..self.used].iter().enumerate() {
            for (j, byte) in limb.to_le_bytes().into_iter().enumerate() {
                if let Some(slot) = out.get_mut(i * 4 + j) {
                    *slot = byte;
                }
            }
        }
        Some(out)
    }

    fn normalize(&mut self) {
        while self.used > 0 && self.limbs[self.used - 1] == 0 {
            self.used -= 1;
        }
    }
}
