//! Binary-to-text codec over configurable restricted alphabets.
//!
//! Payloads are turned into strings drawn only from a chosen alphabet and
//! recovered exactly, with a checksum digit and length field guarding the
//! round trip. Small payloads are converted as one integer; larger ones are
//! split into fixed-width chunks with offset-keyed entropy mixing so
//! repetitive input does not read as repetitive output. Chunked encoding can
//! be offloaded to a [`ParallelBackend`], falling back to the sequential path
//! whenever the backend is unavailable.
//!
//! ```
//! use bitglyph::{Codec, URL_SAFE};
//!
//! let codec = Codec::new(URL_SAFE, 32, None).unwrap();
//! let payload = vec![0u8; 4096];
//! let text = codec.encode(&payload).unwrap();
//! assert!(text.chars().all(|c| URL_SAFE.contains(c)));
//! assert_eq!(codec.decode(&text).unwrap(), payload);
//! ```

pub mod bench;
mod codec;
mod core;
mod encoders;
pub mod parallel;
pub mod prelude;

pub use crate::codec::{
    Codec, CodecBuilder, DEFAULT_ACCELERATION_THRESHOLD, DEFAULT_SMALL_THRESHOLD, DocumentInfo,
    EncodeOutcome, EncodePath,
};
pub use crate::core::alphabet::{AlphabetTable, MIN_RADIX, URL_SAFE};
pub use crate::core::config::{
    AlphabetConfig, AlphabetRegistry, BackendKind, CodecConfig, DEFAULT_ALPHABET,
};
pub use crate::core::wide::MAX_SMALL_THRESHOLD;
pub use crate::encoders::algorithms::checksum::ChecksumEngine;
pub use crate::encoders::algorithms::chunked::{ChunkGeometry, ChunkedPayloadCodec};
pub use crate::encoders::algorithms::errors::{
    BackendError, ConfigurationError, DecodingError, EncodingError, find_closest_alphabet,
};
pub use crate::encoders::algorithms::framing::DocumentKind;
pub use crate::encoders::algorithms::mixing;
pub use crate::encoders::algorithms::small::SmallPayloadCodec;
pub use crate::encoders::algorithms::varint::VarIntCodec;
pub use crate::parallel::{
    BackendCapabilities, BackendObserver, BackendState, ChunkJob, CpuReferenceBackend,
    ParallelBackend,
};
#[cfg(feature = "parallel")]
pub use crate::parallel::ThreadPoolBackend;
