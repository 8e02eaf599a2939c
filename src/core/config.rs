use crate::codec::{Codec, CodecBuilder, DEFAULT_ACCELERATION_THRESHOLD, DEFAULT_SMALL_THRESHOLD};
use crate::core::alphabet::AlphabetTable;
use crate::encoders::algorithms::errors::{ConfigurationError, find_closest_alphabet};
use crate::parallel::{CpuReferenceBackend, ParallelBackend};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Name of the alphabet used when no configuration layer names one.
pub const DEFAULT_ALPHABET: &str = "url_safe";

/// Which parallel backend a codec built from configuration gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The thread pool when compiled in, otherwise none.
    #[default]
    Auto,
    /// The rayon thread pool; requires the `parallel` feature.
    Threads,
    /// The single-threaded reference backend.
    Cpu,
    /// No backend; chunked payloads always encode sequentially.
    None,
}

impl BackendKind {
    /// Instantiates the backend, if this kind has one.
    pub fn create(self) -> Result<Option<Arc<dyn ParallelBackend>>, ConfigurationError> {
        match self {
            BackendKind::Auto => Ok(thread_pool()),
            BackendKind::Threads => thread_pool().map(Some).ok_or_else(|| {
                ConfigurationError::invalid(
                    "the threads backend needs bitglyph built with the `parallel` feature",
                )
            }),
            BackendKind::Cpu => Ok(Some(Arc::new(CpuReferenceBackend::new()))),
            BackendKind::None => Ok(None),
        }
    }
}

#[cfg(feature = "parallel")]
fn thread_pool() -> Option<Arc<dyn ParallelBackend>> {
    Some(Arc::new(crate::parallel::ThreadPoolBackend::new()))
}

#[cfg(not(feature = "parallel"))]
fn thread_pool() -> Option<Arc<dyn ParallelBackend>> {
    None
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "threads" => Ok(BackendKind::Threads),
            "cpu" => Ok(BackendKind::Cpu),
            "none" => Ok(BackendKind::None),
            other => Err(format!(
                "unknown backend '{}' (expected auto, threads, cpu or none)",
                other
            )),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Auto => write!(f, "auto"),
            BackendKind::Threads => write!(f, "threads"),
            BackendKind::Cpu => write!(f, "cpu"),
            BackendKind::None => write!(f, "none"),
        }
    }
}

/// Configuration for a single alphabet loaded from TOML.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct AlphabetConfig {
    /// The characters comprising the alphabet (explicit list)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chars: String,
    /// Starting character for a range-based alphabet
    /// Use with `length` to define sequential Unicode ranges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Number of characters in a range-based alphabet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AlphabetConfig {
    /// Returns the effective character set, generating it from the range if needed.
    ///
    /// Explicit `chars` win over `start` + `length`.
    pub fn effective_chars(&self) -> Result<String, ConfigurationError> {
        if !self.chars.is_empty() {
            return Ok(self.chars.clone());
        }

        if let (Some(start), Some(length)) = (&self.start, self.length) {
            let start_char = start.chars().next().ok_or_else(|| {
                ConfigurationError::invalid_alphabet("start must contain at least one character")
            })?;
            return Self::generate_range(u32::from(start_char), length);
        }

        Err(ConfigurationError::invalid_alphabet(
            "alphabet needs either chars or start + length",
        ))
    }

    /// Number of symbols without materializing a range.
    pub fn symbol_count(&self) -> usize {
        if !self.chars.is_empty() {
            self.chars.chars().count()
        } else {
            self.length.unwrap_or(0)
        }
    }

    /// Generate a string of sequential Unicode characters from a range.
    fn generate_range(start: u32, length: usize) -> Result<String, ConfigurationError> {
        const MAX_UNICODE: u32 = 0x10FFFF;
        const SURROGATE_START: u32 = 0xD800;
        const SURROGATE_END: u32 = 0xDFFF;

        if length == 0 {
            return Err(ConfigurationError::invalid_alphabet(
                "length must be greater than 0",
            ));
        }

        let end = u32::try_from(length - 1)
            .ok()
            .and_then(|span| start.checked_add(span))
            .ok_or_else(|| {
                ConfigurationError::invalid_alphabet("range exceeds maximum Unicode codepoint")
            })?;

        if end > MAX_UNICODE {
            return Err(ConfigurationError::invalid_alphabet(format!(
                "range end U+{:X} exceeds maximum Unicode codepoint U+{:X}",
                end, MAX_UNICODE
            )));
        }

        if start <= SURROGATE_END && end >= SURROGATE_START {
            return Err(ConfigurationError::invalid_alphabet(format!(
                "range U+{:X}..U+{:X} crosses surrogate gap (U+D800..U+DFFF)",
                start, end
            )));
        }

        (start..=end)
            .map(|codepoint| {
                char::from_u32(codepoint).ok_or_else(|| {
                    ConfigurationError::invalid_alphabet(format!(
                        "invalid codepoint U+{:X}",
                        codepoint
                    ))
                })
            })
            .collect()
    }
}

/// The `[codec]` table. Unset fields fall through to earlier layers.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphabet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_threshold: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration_threshold: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,
}

impl CodecConfig {
    /// Overlays the fields `other` sets.
    pub fn merge(&mut self, other: CodecConfig) {
        if other.alphabet.is_some() {
            self.alphabet = other.alphabet;
        }
        if other.small_threshold.is_some() {
            self.small_threshold = other.small_threshold;
        }
        if other.acceleration_threshold.is_some() {
            self.acceleration_threshold = other.acceleration_threshold;
        }
        if other.backend.is_some() {
            self.backend = other.backend;
        }
    }

    pub fn alphabet(&self) -> &str {
        self.alphabet.as_deref().unwrap_or(DEFAULT_ALPHABET)
    }

    pub fn small_threshold(&self) -> usize {
        self.small_threshold.unwrap_or(DEFAULT_SMALL_THRESHOLD)
    }

    pub fn acceleration_threshold(&self) -> usize {
        self.acceleration_threshold
            .unwrap_or(DEFAULT_ACCELERATION_THRESHOLD)
    }

    pub fn backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }
}

/// Named alphabets plus codec settings, layered from TOML files.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AlphabetRegistry {
    /// Map of alphabet names to their configurations
    #[serde(default)]
    pub alphabets: HashMap<String, AlphabetConfig>,
    #[serde(default)]
    pub codec: CodecConfig,
}

impl AlphabetRegistry {
    /// Parses a configuration layer from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(content).map_err(|e| ConfigurationError::Parse {
            message: e.to_string(),
        })
    }

    /// Loads the built-in alphabets bundled with the library.
    pub fn load_default() -> Result<Self, ConfigurationError> {
        Self::from_toml(include_str!("../../alphabets.toml"))
    }

    /// Loads one configuration layer from a file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Loads configuration with user overrides from standard locations.
    ///
    /// Searches in priority order:
    /// 1. Built-in alphabets (from library)
    /// 2. `~/.config/bitglyph/alphabets.toml` (user overrides)
    /// 3. `./alphabets.toml` (project-local overrides)
    ///
    /// Later layers override earlier ones for matching alphabet names and for
    /// each `[codec]` field they set. A layer that fails to load is skipped
    /// with a warning.
    pub fn load_with_overrides() -> Result<Self, ConfigurationError> {
        let mut config = Self::load_default()?;

        if let Some(config_dir) = dirs::config_dir() {
            let user_config_path = config_dir.join("bitglyph").join("alphabets.toml");
            config.merge_optional(&user_config_path);
        }

        config.merge_optional(Path::new("alphabets.toml"));

        Ok(config)
    }

    fn merge_optional(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::load_from_file(path) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "loaded configuration layer");
                self.merge(layer);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping configuration layer");
            }
        }
    }

    /// Merges another configuration into this one.
    ///
    /// Alphabets from `other` replace alphabets with the same name in `self`.
    pub fn merge(&mut self, other: AlphabetRegistry) {
        for (name, alphabet) in other.alphabets {
            self.alphabets.insert(name, alphabet);
        }
        self.codec.merge(other.codec);
    }

    pub fn get_alphabet(&self, name: &str) -> Option<&AlphabetConfig> {
        self.alphabets.get(name)
    }

    /// Alphabet names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.alphabets.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves a named alphabet to its characters.
    ///
    /// # Errors
    ///
    /// `UnknownAlphabet`, carrying the closest registered name if one is near.
    pub fn alphabet_chars(&self, name: &str) -> Result<String, ConfigurationError> {
        match self.get_alphabet(name) {
            Some(alphabet) => alphabet.effective_chars(),
            None => Err(ConfigurationError::UnknownAlphabet {
                name: name.to_string(),
                suggestion: find_closest_alphabet(name, &self.names()),
            }),
        }
    }

    pub fn alphabet_table(&self, name: &str) -> Result<AlphabetTable, ConfigurationError> {
        AlphabetTable::from_str(&self.alphabet_chars(name)?)
    }

    /// A builder carrying every `[codec]` setting.
    pub fn codec_builder(&self) -> Result<CodecBuilder, ConfigurationError> {
        let chars = self.alphabet_chars(self.codec.alphabet())?;
        let mut builder = Codec::builder(chars)
            .small_threshold(self.codec.small_threshold())
            .acceleration_threshold(self.codec.acceleration_threshold());
        if let Some(backend) = self.codec.backend().create()? {
            builder = builder.backend(backend);
        }
        Ok(builder)
    }

    pub fn build_codec(&self) -> Result<Codec, ConfigurationError> {
        self.codec_builder()?.build()
    }
}
