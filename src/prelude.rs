//! Convenient re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use bitglyph::prelude::*;
//!
//! let registry = AlphabetRegistry::load_default().unwrap();
//! let codec = registry.build_codec().unwrap();
//! let text = codec.encode(b"Hello").unwrap();
//! assert_eq!(codec.decode(&text).unwrap(), b"Hello");
//! ```

// Core encoding/decoding
pub use crate::{Codec, CodecBuilder, URL_SAFE};

// Configuration
pub use crate::{AlphabetRegistry, BackendKind};

// Errors
pub use crate::{ConfigurationError, DecodingError, EncodingError};

// Backends
pub use crate::{BackendObserver, BackendState, CpuReferenceBackend, ParallelBackend};

#[cfg(feature = "parallel")]
pub use crate::ThreadPoolBackend;
