use crate::encoders::algorithms::errors::{ConfigurationError, DecodingError};
use std::collections::HashMap;

/// Smallest usable radix: two data digits plus the varint terminator.
pub const MIN_RADIX: usize = 3;

/// The 64 URL-safe symbols `A-Z a-z 0-9 - _`.
pub const URL_SAFE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Sentinel for "not in alphabet" in the dense lookup table.
const ABSENT: u32 = u32::MAX;

/// Bidirectional mapping between output symbols and digit values.
///
/// Symbols below U+0100 resolve through a dense table; anything wider goes
/// through a hash map. The radix is the number of symbols.
#[derive(Debug, Clone)]
pub struct AlphabetTable {
    chars: Vec<char>,
    dense: [u32; 256],
    sparse: HashMap<char, u32>,
    max_utf8_len: usize,
}

impl AlphabetTable {
    /// Builds a table from an ordered list of symbols.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAlphabet` if the list is empty,
    /// contains duplicates, or has fewer than three symbols.
    pub fn new(chars: Vec<char>) -> Result<Self, ConfigurationError> {
        if chars.is_empty() {
            return Err(ConfigurationError::invalid_alphabet("alphabet cannot be empty"));
        }
        if chars.len() < MIN_RADIX {
            return Err(ConfigurationError::invalid_alphabet(format!(
                "alphabet needs at least {} symbols, got {}",
                MIN_RADIX,
                chars.len()
            )));
        }
        if u32::try_from(chars.len()).is_err() {
            return Err(ConfigurationError::invalid_alphabet("alphabet is too large"));
        }

        let mut dense = [ABSENT; 256];
        let mut sparse = HashMap::new();
        let mut seen = HashMap::with_capacity(chars.len());

        for (i, &c) in chars.iter().enumerate() {
            let digit = i as u32;
            if seen.insert(c, digit).is_some() {
                return Err(ConfigurationError::invalid_alphabet(format!(
                    "duplicate character in alphabet: {:?}",
                    c
                )));
            }
            match usize::try_from(u32::from(c)) {
                Ok(code) if code < dense.len() => dense[code] = digit,
                _ => {
                    sparse.insert(c, digit);
                }
            }
        }

        let max_utf8_len = chars.iter().map(|c| c.len_utf8()).max().unwrap_or(1);

        Ok(AlphabetTable {
            chars,
            dense,
            sparse,
            max_utf8_len,
        })
    }

    /// Builds a table from the characters of a string.
    pub fn from_str(s: &str) -> Result<Self, ConfigurationError> {
        Self::new(s.chars().collect())
    }

    /// Number of symbols, i.e. the numeral base.
    pub fn radix(&self) -> u32 {
        self.chars.len() as u32
    }

    /// `log2(radix)`: information carried by one symbol.
    pub fn bits_per_char(&self) -> f64 {
        f64::from(self.radix()).log2()
    }

    /// Widest symbol in UTF-8 bytes, used to size output strings.
    pub fn max_utf8_len(&self) -> usize {
        self.max_utf8_len
    }

    /// Digit value of a symbol.
    #[inline]
    pub fn index_of(&self, c: char) -> Option<u32> {
        let code = u32::from(c) as usize;
        if code < self.dense.len() {
            let digit = self.dense[code];
            (digit != ABSENT).then_some(digit)
        } else {
            self.sparse.get(&c).copied()
        }
    }

    /// Symbol for a digit value.
    #[inline]
    pub fn symbol_of(&self, digit: u32) -> Option<char> {
        self.chars.get(digit as usize).copied()
    }

    /// The symbols in digit order.
    pub fn symbols(&self) -> &[char] {
        &self.chars
    }

    /// Converts text to digit values, rejecting unknown symbols.
    pub fn parse(&self, text: &str) -> Result<Vec<u32>, DecodingError> {
        let mut digits = Vec::with_capacity(text.len());
        for (position, c) in text.chars().enumerate() {
            let digit = self
                .index_of(c)
                .ok_or_else(|| DecodingError::invalid_character(c, position, text))?;
            digits.push(digit);
        }
        Ok(digits)
    }

    /// Appends the symbols for `digits` to `out`.
    ///
    /// Every digit must be below the radix; the codecs only produce such digits.
    pub fn render_into(&self, digits: &[u32], out: &mut String) {
        for &digit in digits {
            out.push(self.chars[digit as usize]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_directions() {
        let table = AlphabetTable::from_str(URL_SAFE).unwrap();
        assert_eq!(table.radix(), 64);
        assert_eq!(table.index_of('A'), Some(0));
        assert_eq!(table.index_of('_'), Some(63));
        assert_eq!(table.index_of('+'), None);
        assert_eq!(table.symbol_of(26), Some('a'));
        assert_eq!(table.symbol_of(64), None);
        assert!((table.bits_per_char() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_latin_symbols() {
        let table = AlphabetTable::from_str("аб€🦀").unwrap();
        assert_eq!(table.radix(), 4);
        assert_eq!(table.index_of('€'), Some(2));
        assert_eq!(table.index_of('🦀'), Some(3));
        assert_eq!(table.max_utf8_len(), 4);
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            AlphabetTable::from_str(""),
            Err(ConfigurationError::InvalidAlphabet { .. })
        ));
    }

    #[test]
    fn test_rejects_too_small() {
        let err = AlphabetTable::from_str("01").unwrap_err();
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = AlphabetTable::from_str("abca").unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_parse_reports_position() {
        let table = AlphabetTable::from_str("abc").unwrap();
        assert_eq!(table.parse("cab").unwrap(), vec![2, 0, 1]);
        match table.parse("abxc") {
            Err(DecodingError::InvalidCharacter {
                character,
                position,
                ..
            }) => {
                assert_eq!(character, 'x');
                assert_eq!(position, 2);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_render_into() {
        let table = AlphabetTable::from_str("xyz").unwrap();
        let mut out = String::new();
        table.render_into(&[2, 0, 1, 1], &mut out);
        assert_eq!(out, "zxyy");
    }
}
