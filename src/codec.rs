//! The codec entry point.
//!
//! `Codec::encode` picks the small or chunked path by payload size, and for
//! large chunked payloads offers the work to the parallel backend first.
//! `Codec::decode` reads the leading marker digit and never cares which
//! backend produced the text.

use crate::core::alphabet::AlphabetTable;
use crate::core::wide::MAX_SMALL_THRESHOLD;
use crate::encoders::algorithms::chunked::ChunkedPayloadCodec;
use crate::encoders::algorithms::errors::{ConfigurationError, DecodingError, EncodingError};
use crate::encoders::algorithms::framing::{self, DocumentKind};
use crate::encoders::algorithms::small::SmallPayloadCodec;
use crate::encoders::algorithms::varint::VarIntCodec;
use crate::parallel::state::JobOutcome;
use crate::parallel::{BackendObserver, BackendState, BackendSupervisor, ChunkJob, ParallelBackend};
use serde::Serialize;
use std::sync::Arc;

/// Payloads up to this many bytes take the small path by default.
pub const DEFAULT_SMALL_THRESHOLD: usize = 32;

/// Chunked payloads below this many bytes never go to the backend by default.
pub const DEFAULT_ACCELERATION_THRESHOLD: usize = 16 * 1024;

/// How a document was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodePath {
    /// Whole-payload conversion.
    Small,
    /// Chunked, on the calling thread.
    Sequential,
    /// Chunked, by the parallel backend.
    Accelerated,
    /// Chunked on the calling thread after the backend failed.
    Fallback,
}

impl std::fmt::Display for EncodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodePath::Small => write!(f, "small"),
            EncodePath::Sequential => write!(f, "sequential"),
            EncodePath::Accelerated => write!(f, "accelerated"),
            EncodePath::Fallback => write!(f, "fallback"),
        }
    }
}

/// Encoded text together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub text: String,
    pub path: EncodePath,
}

/// Header fields of a document, read without decoding the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub kind: DocumentKind,
    /// The leading marker digit.
    pub version: u32,
    pub radix: u32,
    pub declared_length: usize,
    pub checksum: u32,
    pub symbols: usize,
    pub body_symbols: usize,
    /// Exact for chunked documents, an upper bound for small ones.
    pub expected_body_symbols: usize,
}

impl DocumentInfo {
    /// Whether the body length agrees with the declared payload length.
    pub fn body_consistent(&self) -> bool {
        match self.kind {
            DocumentKind::Small => self.body_symbols <= self.expected_body_symbols,
            DocumentKind::Chunked => self.body_symbols == self.expected_body_symbols,
        }
    }
}

/// Binary-to-text codec over a restricted alphabet.
///
/// A `Codec` is immutable apart from its backend's availability state and
/// can be shared across threads.
///
/// # Example
///
/// ```
/// use bitglyph::{Codec, URL_SAFE};
///
/// let codec = Codec::new(URL_SAFE, 32, None).unwrap();
/// let text = codec.encode(&[1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(codec.decode(&text).unwrap(), vec![1, 2, 3, 4, 5]);
/// ```
#[derive(Debug)]
pub struct Codec {
    alphabet: AlphabetTable,
    small_threshold: usize,
    acceleration_threshold: usize,
    varint: VarIntCodec,
    small: SmallPayloadCodec,
    chunked: ChunkedPayloadCodec,
    backend: Option<BackendSupervisor>,
}

impl Codec {
    /// Creates a codec over the characters of `alphabet`.
    ///
    /// # Errors
    ///
    /// `InvalidAlphabet` for an empty, duplicated or too-small alphabet, and
    /// `ThresholdTooLarge` when `small_threshold` exceeds the fixed-width
    /// integer capacity.
    pub fn new(
        alphabet: impl Into<String>,
        small_threshold: usize,
        backend: Option<Arc<dyn ParallelBackend>>,
    ) -> Result<Self, ConfigurationError> {
        let mut builder = Codec::builder(alphabet).small_threshold(small_threshold);
        if let Some(backend) = backend {
            builder = builder.backend(backend);
        }
        builder.build()
    }

    pub fn builder(alphabet: impl Into<String>) -> CodecBuilder {
        CodecBuilder::new(alphabet)
    }

    pub fn alphabet(&self) -> &AlphabetTable {
        &self.alphabet
    }

    pub fn radix(&self) -> u32 {
        self.alphabet.radix()
    }

    pub fn small_threshold(&self) -> usize {
        self.small_threshold
    }

    pub fn acceleration_threshold(&self) -> usize {
        self.acceleration_threshold
    }

    pub fn bytes_per_chunk(&self) -> usize {
        self.chunked.geometry().bytes_per_chunk()
    }

    /// Encodes `payload`, using the backend when it is eligible and ready.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for an empty payload. Backend failures are never
    /// reported here; the request is re-run sequentially.
    pub fn encode(&self, payload: &[u8]) -> Result<String, EncodingError> {
        self.encode_traced(payload).map(|outcome| outcome.text)
    }

    /// Like [`encode`](Self::encode), also reporting which path ran.
    pub fn encode_traced(&self, payload: &[u8]) -> Result<EncodeOutcome, EncodingError> {
        if payload.is_empty() {
            return Err(EncodingError::EmptyInput);
        }

        let (digits, path) = if payload.len() <= self.small_threshold {
            (self.small.encode(payload)?, EncodePath::Small)
        } else {
            self.encode_chunked(payload)?
        };

        tracing::debug!(
            bytes = payload.len(),
            symbols = digits.len(),
            %path,
            "encoded payload"
        );

        Ok(EncodeOutcome {
            text: self.render(&digits)?,
            path,
        })
    }

    /// Encodes without consulting the backend.
    pub fn encode_sequential(&self, payload: &[u8]) -> Result<String, EncodingError> {
        if payload.is_empty() {
            return Err(EncodingError::EmptyInput);
        }
        let digits = if payload.len() <= self.small_threshold {
            self.small.encode(payload)?
        } else {
            self.chunked.encode(payload)?
        };
        self.render(&digits)
    }

    /// Decodes a document produced by any codec with the same alphabet.
    ///
    /// # Errors
    ///
    /// Any `DecodingError`; no bytes are returned unless the length and
    /// checksum both verify.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>, DecodingError> {
        if text.is_empty() {
            return Err(DecodingError::EmptyInput);
        }

        let digits = self.alphabet.parse(text)?;
        let header = framing::read_header(&digits, &self.varint)?;
        let bytes = match header.kind {
            DocumentKind::Small => self.small.decode(&digits, &header)?,
            DocumentKind::Chunked => self.chunked.decode(&digits, &header)?,
        };

        tracing::debug!(kind = %header.kind, bytes = bytes.len(), "decoded document");
        Ok(bytes)
    }

    /// Parses the document header and measures the body.
    pub fn inspect(&self, text: &str) -> Result<DocumentInfo, DecodingError> {
        if text.is_empty() {
            return Err(DecodingError::EmptyInput);
        }

        let digits = self.alphabet.parse(text)?;
        let header = framing::read_header(&digits, &self.varint)?;
        let expected_body_symbols = match header.kind {
            DocumentKind::Small => self.small.max_body_len(header.length),
            DocumentKind::Chunked => self
                .chunked
                .geometry()
                .body_len(header.length)
                .ok_or_else(|| DecodingError::malformed("declared length overflows"))?,
        };

        Ok(DocumentInfo {
            kind: header.kind,
            version: header.kind.marker(),
            radix: self.radix(),
            declared_length: header.length,
            checksum: header.checksum,
            symbols: digits.len(),
            body_symbols: digits.len() - header.body_start,
            expected_body_symbols,
        })
    }

    /// Symbols `encode` produces for a payload of `len` bytes.
    ///
    /// Exact for the chunked path, an upper bound for the small path. `None`
    /// for an empty or unaddressable payload.
    pub fn encoded_len(&self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else if len <= self.small_threshold {
            Some(framing::header_len(&self.varint, len) + self.small.max_body_len(len))
        } else {
            self.chunked.encoded_len(len)
        }
    }

    /// Availability of the backend, if one is attached.
    pub fn backend_state(&self) -> Option<BackendState> {
        self.backend.as_ref().map(BackendSupervisor::state)
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(BackendSupervisor::backend_name)
    }

    /// Probes the backend again after it was lost or disabled.
    pub fn reprobe_backend(&self) -> Option<BackendState> {
        self.backend.as_ref().map(BackendSupervisor::reprobe)
    }

    fn encode_chunked(&self, payload: &[u8]) -> Result<(Vec<u32>, EncodePath), EncodingError> {
        let eligible = self
            .backend
            .as_ref()
            .filter(|_| payload.len() >= self.acceleration_threshold);

        if let Some(supervisor) = eligible {
            let job = ChunkJob::new(payload, *self.chunked.geometry());
            match supervisor.run(&job) {
                JobOutcome::Completed(body) => {
                    let digits = self.chunked.assemble(payload, &body)?;
                    return Ok((digits, EncodePath::Accelerated));
                }
                JobOutcome::Failed(_) => {
                    return Ok((self.chunked.encode(payload)?, EncodePath::Fallback));
                }
                JobOutcome::Unavailable => {}
            }
        }

        Ok((self.chunked.encode(payload)?, EncodePath::Sequential))
    }

    fn render(&self, digits: &[u32]) -> Result<String, EncodingError> {
        let capacity = digits.len().saturating_mul(self.alphabet.max_utf8_len());
        let mut text = String::new();
        text.try_reserve_exact(capacity)
            .map_err(|_| EncodingError::OutOfMemory {
                requested: capacity,
            })?;
        self.alphabet.render_into(digits, &mut text);
        Ok(text)
    }
}

impl BackendObserver for Codec {
    fn on_backend_lost(&self) {
        if let Some(supervisor) = &self.backend {
            supervisor.on_backend_lost();
        }
    }

    fn on_backend_restored(&self) {
        if let Some(supervisor) = &self.backend {
            supervisor.on_backend_restored();
        }
    }
}

/// Optional settings for [`Codec`].
#[derive(Debug, Clone)]
pub struct CodecBuilder {
    alphabet: String,
    small_threshold: usize,
    acceleration_threshold: usize,
    backend: Option<Arc<dyn ParallelBackend>>,
}

impl CodecBuilder {
    pub fn new(alphabet: impl Into<String>) -> Self {
        CodecBuilder {
            alphabet: alphabet.into(),
            small_threshold: DEFAULT_SMALL_THRESHOLD,
            acceleration_threshold: DEFAULT_ACCELERATION_THRESHOLD,
            backend: None,
        }
    }

    pub fn small_threshold(mut self, bytes: usize) -> Self {
        self.small_threshold = bytes;
        self
    }

    pub fn acceleration_threshold(mut self, bytes: usize) -> Self {
        self.acceleration_threshold = bytes;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ParallelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<Codec, ConfigurationError> {
        if self.small_threshold > MAX_SMALL_THRESHOLD {
            return Err(ConfigurationError::ThresholdTooLarge {
                requested: self.small_threshold,
                max: MAX_SMALL_THRESHOLD,
            });
        }

        let alphabet = AlphabetTable::from_str(&self.alphabet)?;
        let radix = alphabet.radix();

        let codec = Codec {
            small_threshold: self.small_threshold,
            acceleration_threshold: self.acceleration_threshold,
            varint: VarIntCodec::new(radix),
            small: SmallPayloadCodec::new(radix),
            chunked: ChunkedPayloadCodec::new(radix),
            backend: self.backend.map(BackendSupervisor::new),
            alphabet,
        };

        tracing::debug!(
            radix,
            small_threshold = codec.small_threshold,
            bytes_per_chunk = codec.bytes_per_chunk(),
            backend = codec.backend_name().unwrap_or("none"),
            "codec ready"
        );
        Ok(codec)
    }
}
