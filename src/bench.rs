//! Benchmarking utilities for comparing encoding paths.
//!
//! Every chunked path must produce the same document; this module runs a
//! payload through each one available on this build, checks that the
//! outputs agree and reports timings.
//!
//! # Example
//!
//! ```
//! use bitglyph::URL_SAFE;
//! use bitglyph::bench::{compare_paths, random_payload};
//!
//! let payload = random_payload(64 * 1024, 7);
//! for report in compare_paths(URL_SAFE, &payload, 1).unwrap() {
//!     assert!(report.matches_reference);
//! }
//! ```

use crate::codec::{Codec, EncodePath};
use crate::parallel::{CpuReferenceBackend, ParallelBackend};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};

type BenchResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Available encoding paths for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingPath {
    /// Chunked codec on the calling thread, no backend
    Sequential,
    /// The single-threaded reference backend
    CpuReference,
    /// The rayon thread-pool backend
    ThreadPool,
}

impl std::fmt::Display for EncodingPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingPath::Sequential => write!(f, "Sequential"),
            EncodingPath::CpuReference => write!(f, "CPU reference"),
            EncodingPath::ThreadPool => write!(f, "Thread pool"),
        }
    }
}

/// Platform capabilities relevant to the parallel paths.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub arch: &'static str,
    pub cores: usize,
}

impl PlatformInfo {
    /// Detect current platform capabilities.
    pub fn detect() -> Self {
        PlatformInfo {
            arch: std::env::consts::ARCH,
            cores: std::thread::available_parallelism()
                .map(usize::from)
                .unwrap_or(1),
        }
    }

    /// Format as display string.
    pub fn display(&self) -> String {
        format!("{} ({} cores)", self.arch, self.cores)
    }
}

/// Detect which encoding paths this build can run.
pub fn detect_available_paths() -> Vec<EncodingPath> {
    let mut paths = vec![EncodingPath::Sequential, EncodingPath::CpuReference];
    if cfg!(feature = "parallel") {
        paths.push(EncodingPath::ThreadPool);
    }
    paths
}

fn backend_for(path: EncodingPath) -> Option<Arc<dyn ParallelBackend>> {
    match path {
        EncodingPath::Sequential => None,
        EncodingPath::CpuReference => Some(Arc::new(CpuReferenceBackend::new())),
        #[cfg(feature = "parallel")]
        EncodingPath::ThreadPool => Some(Arc::new(crate::parallel::ThreadPoolBackend::new())),
        #[cfg(not(feature = "parallel"))]
        EncodingPath::ThreadPool => None,
    }
}

/// A codec that sends every chunked payload down `path`.
pub fn codec_for_path(alphabet: &str, path: EncodingPath) -> BenchResult<Codec> {
    let mut builder = Codec::builder(alphabet).acceleration_threshold(0);
    if let Some(backend) = backend_for(path) {
        builder = builder.backend(backend);
    }
    Ok(builder.build()?)
}

/// Deterministic pseudo-random bytes.
pub fn random_payload(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut payload = vec![0u8; size];
    rng.fill_bytes(&mut payload);
    payload
}

/// Timings for one path.
#[derive(Debug, Clone)]
pub struct PathReport {
    pub path: EncodingPath,
    /// The path `Codec` actually took on the last run.
    pub taken: EncodePath,
    pub bytes: usize,
    pub symbols: usize,
    pub encode_time: Duration,
    pub decode_time: Duration,
    /// Output equals the sequential output and decodes to the input.
    pub matches_reference: bool,
}

impl PathReport {
    /// Encode throughput in MiB/s.
    pub fn encode_mib_per_sec(&self) -> f64 {
        mib_per_sec(self.bytes, self.encode_time)
    }

    pub fn decode_mib_per_sec(&self) -> f64 {
        mib_per_sec(self.bytes, self.decode_time)
    }
}

fn mib_per_sec(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return f64::INFINITY;
    }
    bytes as f64 / (1024.0 * 1024.0) / secs
}

/// Runs `payload` through every available path, `iterations` times each.
///
/// Times are the mean per iteration.
pub fn compare_paths(
    alphabet: &str,
    payload: &[u8],
    iterations: u32,
) -> BenchResult<Vec<PathReport>> {
    let iterations = iterations.max(1);
    let reference = codec_for_path(alphabet, EncodingPath::Sequential)?.encode(payload)?;

    let mut reports = Vec::new();
    for path in detect_available_paths() {
        let codec = codec_for_path(alphabet, path)?;

        let mut outcome = codec.encode_traced(payload)?;
        let start = Instant::now();
        for _ in 0..iterations {
            outcome = codec.encode_traced(payload)?;
        }
        let encode_time = start.elapsed() / iterations;

        let mut decoded = codec.decode(&outcome.text)?;
        let start = Instant::now();
        for _ in 0..iterations {
            decoded = codec.decode(&outcome.text)?;
        }
        let decode_time = start.elapsed() / iterations;

        reports.push(PathReport {
            path,
            taken: outcome.path,
            bytes: payload.len(),
            symbols: outcome.text.chars().count(),
            encode_time,
            decode_time,
            matches_reference: outcome.text == reference && decoded == payload,
        });
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alphabet::URL_SAFE;

    #[test]
    fn test_random_payload_is_seeded() {
        assert_eq!(random_payload(100, 1), random_payload(100, 1));
        assert_ne!(random_payload(100, 1), random_payload(100, 2));
        assert_eq!(random_payload(0, 1), Vec::<u8>::new());
    }

    #[test]
    fn test_paths_agree() {
        let payload = random_payload(10_000, 42);
        let reports = compare_paths(URL_SAFE, &payload, 1).unwrap();
        assert_eq!(reports.len(), detect_available_paths().len());
        for report in &reports {
            assert!(report.matches_reference, "{}", report.path);
        }
        assert_eq!(reports[0].taken, EncodePath::Sequential);
        assert!(
            reports[1..]
                .iter()
                .all(|report| report.taken == EncodePath::Accelerated)
        );
    }

    #[test]
    fn test_platform_info() {
        let info = PlatformInfo::detect();
        assert!(info.cores >= 1);
        assert!(info.display().contains(info.arch));
    }
}
