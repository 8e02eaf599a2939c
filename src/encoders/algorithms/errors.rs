use thiserror::Error;

/// Errors raised while building a codec or loading its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The alphabet is empty, has duplicates, or is too small.
    #[error("invalid alphabet: {reason}")]
    InvalidAlphabet { reason: String },

    /// The small-payload threshold exceeds the fixed-width integer capacity.
    #[error("small threshold {requested} exceeds maximum {max} bytes")]
    ThresholdTooLarge { requested: usize, max: usize },

    /// No alphabet with this name is registered.
    #[error("alphabet '{name}' not found{}", did_you_mean(.suggestion))]
    UnknownAlphabet {
        name: String,
        suggestion: Option<String>,
    },

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid { reason: String },

    /// A configuration file could not be read.
    #[error("cannot read config {path}: {message}")]
    Io { path: String, message: String },

    /// A configuration file is not valid TOML for this schema.
    #[error("cannot parse config: {message}")]
    Parse { message: String },
}

impl ConfigurationError {
    pub fn invalid_alphabet(reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidAlphabet {
            reason: reason.into(),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        ConfigurationError::Invalid {
            reason: reason.into(),
        }
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// Zero-length payloads have no representation.
    #[error("cannot encode empty payload")]
    EmptyInput,

    /// The payload is too large to address in the output document.
    #[error("payload of {len} bytes exceeds encodable capacity")]
    CapacityExceeded { len: usize },

    /// The output buffer could not be allocated.
    #[error("cannot allocate {requested} output symbols")]
    OutOfMemory { requested: usize },
}

/// Errors that can occur during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    /// The input string is empty.
    #[error("cannot decode empty input")]
    EmptyInput,

    /// The input contains a character that is not in the alphabet.
    #[error("invalid character '{character}' at position {position} in \"{input}\"")]
    InvalidCharacter {
        character: char,
        position: usize,
        input: String,
    },

    /// A metadata field ran off the end of the input.
    #[error("truncated {field} starting at position {position}")]
    Truncated {
        field: &'static str,
        position: usize,
    },

    /// The input is structurally invalid.
    #[error("malformed document: {reason}")]
    Malformed { reason: String },

    /// Reconstructed bytes do not match the stored checksum digit.
    #[error("checksum mismatch: document carries {expected}, payload computes {actual}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The amount of data does not agree with the declared length.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The leading digit names a format this codec does not speak.
    #[error("unsupported format version digit {digit}")]
    UnsupportedVersion { digit: u32 },
}

impl DecodingError {
    /// Create an InvalidCharacter error with a truncated view of the input.
    pub fn invalid_character(c: char, position: usize, input: &str) -> Self {
        let display_input = if input.chars().count() > 60 {
            format!("{}...", input.chars().take(60).collect::<String>())
        } else {
            input.to_string()
        };

        DecodingError::InvalidCharacter {
            character: c,
            position,
            input: display_input,
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        DecodingError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Failures reported by a parallel backend.
///
/// These never reach callers of `Codec::encode` while the sequential path
/// is available; the dispatcher logs them and falls back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The capability probe found the required features missing.
    #[error("backend unsupported: {reason}")]
    Unsupported { reason: String },

    /// The device or execution context went away.
    #[error("backend device lost")]
    DeviceLost,

    /// Context, pool, or buffer creation failed.
    #[error("backend resource creation failed: {reason}")]
    ResourceCreation { reason: String },

    /// The job grid is larger than the device allows.
    #[error("job grid {width}x{height} exceeds device limit {limit}")]
    LimitExceeded { width: u32, height: u32, limit: u32 },

    /// The kernel ran but produced unusable output.
    #[error("backend kernel failure: {reason}")]
    Kernel { reason: String },
}

/// Calculate Levenshtein distance between two strings
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut prev_row: Vec<usize> = (0..=len2).collect();
    let mut curr_row = vec![0; len2 + 1];

    for (i, c1) in s1.chars().enumerate() {
        curr_row[0] = i + 1;

        for (j, c2) in s2.chars().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            curr_row[j + 1] = (curr_row[j] + 1)
                .min(prev_row[j + 1] + 1)
                .min(prev_row[j] + cost);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[len2]
}

/// Find the closest matching alphabet name
pub fn find_closest_alphabet(name: &str, available: &[String]) -> Option<String> {
    let threshold = if name.len() < 5 { 2 } else { 3 };

    available
        .iter()
        .map(|candidate| (levenshtein_distance(name, candidate), candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .map(|(_, candidate)| candidate.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("url_safe", "url_safe"), 0);
        assert_eq!(levenshtein_distance("base62", "base58"), 2);
        assert_eq!(levenshtein_distance("urlsafe", "url_safe"), 1);
        assert_eq!(levenshtein_distance("", "base62"), 6);
    }

    #[test]
    fn test_find_closest_alphabet() {
        let names = vec![
            "url_safe".to_string(),
            "base62".to_string(),
            "base58".to_string(),
            "crockford32".to_string(),
        ];

        assert_eq!(
            find_closest_alphabet("urlsafe", &names),
            Some("url_safe".to_string())
        );
        assert_eq!(
            find_closest_alphabet("base63", &names),
            Some("base62".to_string())
        );
        assert_eq!(find_closest_alphabet("hieroglyphs", &names), None);
    }

    #[test]
    fn test_unknown_alphabet_display() {
        let err = ConfigurationError::UnknownAlphabet {
            name: "bas62".into(),
            suggestion: Some("base62".into()),
        };
        assert_eq!(
            err.to_string(),
            "alphabet 'bas62' not found (did you mean 'base62'?)"
        );

        let err = ConfigurationError::UnknownAlphabet {
            name: "zzz".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "alphabet 'zzz' not found");
    }

    #[test]
    fn test_invalid_character_truncates_input() {
        let long = "A".repeat(100);
        let err = DecodingError::invalid_character('!', 42, &long);
        match &err {
            DecodingError::InvalidCharacter { input, .. } => {
                assert!(input.ends_with("..."));
                assert_eq!(input.chars().count(), 63);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(err.to_string().contains("'!' at position 42"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            EncodingError::EmptyInput.to_string(),
            "cannot encode empty payload"
        );
        assert_eq!(
            DecodingError::ChecksumMismatch {
                expected: 3,
                actual: 9
            }
            .to_string(),
            "checksum mismatch: document carries 3, payload computes 9"
        );
        assert_eq!(
            BackendError::LimitExceeded {
                width: 4096,
                height: 9000,
                limit: 8192
            }
            .to_string(),
            "job grid 4096x9000 exceeds device limit 8192"
        );
    }

    #[test]
    fn test_errors_are_clone_and_eq() {
        let err = DecodingError::UnsupportedVersion { digit: 7 };
        assert_eq!(err.clone(), err);

        let err = BackendError::DeviceLost;
        assert_eq!(err.clone(), err);
    }
}
