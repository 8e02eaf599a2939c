use super::errors::DecodingError;

/// Self-delimiting digit encoding for non-negative integers.
///
/// The highest digit (`radix - 1`) is reserved as a terminator, leaving
/// `radix - 1` data digits. Data digits are emitted least significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarIntCodec {
    base: u64,
    terminator: u32,
}

impl VarIntCodec {
    pub fn new(radix: u32) -> Self {
        VarIntCodec {
            base: u64::from(radix - 1),
            terminator: radix - 1,
        }
    }

    pub fn terminator(&self) -> u32 {
        self.terminator
    }

    /// Appends the digits of `value`, including the terminator.
    pub fn encode(&self, mut value: u64, out: &mut Vec<u32>) {
        loop {
            out.push((value % self.base) as u32);
            value /= self.base;
            if value == 0 {
                break;
            }
        }
        out.push(self.terminator);
    }

    /// Number of digits `encode(value)` produces.
    pub fn encoded_len(&self, mut value: u64) -> usize {
        let mut len = 1;
        while value >= self.base {
            value /= self.base;
            len += 1;
        }
        len + 1
    }

    /// Reads a value starting at `start`.
    ///
    /// Returns the value and the position just past the terminator.
    pub fn decode(&self, digits: &[u32], start: usize) -> Result<(u64, usize), DecodingError> {
        let mut value: u128 = 0;
        let mut multiplier: Option<u128> = Some(1);
        let mut last_data = None;

        for (pos, &digit) in digits.iter().enumerate().skip(start) {
            if digit == self.terminator {
                return match last_data {
                    None => Err(DecodingError::malformed(
                        "length field has no data digits",
                    )),
                    Some(0) if pos - start > 1 => Err(DecodingError::malformed(
                        "length field has redundant high digits",
                    )),
                    Some(_) => Ok((value as u64, pos + 1)),
                };
            }

            if digit != 0 {
                let term = multiplier
                    .and_then(|m| m.checked_mul(u128::from(digit)))
                    .ok_or_else(|| DecodingError::malformed("length field overflows"))?;
                value += term;
                if value > u128::from(u64::MAX) {
                    return Err(DecodingError::malformed("length field overflows"));
                }
            }

            multiplier = multiplier.and_then(|m| m.checked_mul(u128::from(self.base)));
            last_data = Some(digit);
        }

        Err(DecodingError::Truncated {
            field: "length field",
            position: start,
        })
    }
}
