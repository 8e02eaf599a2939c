//! Accelerated execution of the chunked per-chunk transform.
//!
//! A backend takes a whole payload, runs the mixing and radix decomposition
//! for every chunk, and hands back the body digits in offset order. Framing
//! stays in the shared codec, so every backend produces documents the common
//! decoder reads.
//!
//! Backends are probed once, lazily, and supervised by
//! [`state::BackendSupervisor`], which tracks availability and routes every
//! failure to the sequential path.

use crate::encoders::algorithms::chunked::ChunkGeometry;
use crate::encoders::algorithms::errors::BackendError;

pub mod cpu;
pub mod state;
#[cfg(feature = "parallel")]
pub mod threads;

pub use cpu::CpuReferenceBackend;
pub use state::{BackendEvent, BackendObserver, BackendState, BackendSupervisor};
#[cfg(feature = "parallel")]
pub use threads::ThreadPoolBackend;

/// Bytes carried by one grid cell.
pub const CELL_BYTES: usize = 4;

/// What a successful probe found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Largest grid side the backend accepts, in cells.
    pub max_grid_dimension: u32,
    /// Number of independent lanes the backend runs at once.
    pub lanes: usize,
}

/// One accelerated encode request.
#[derive(Debug, Clone, Copy)]
pub struct ChunkJob<'a> {
    pub payload: &'a [u8],
    pub geometry: ChunkGeometry,
}

impl<'a> ChunkJob<'a> {
    pub fn new(payload: &'a [u8], geometry: ChunkGeometry) -> Self {
        ChunkJob { payload, geometry }
    }

    pub fn chunk_count(&self) -> usize {
        self.geometry.chunk_count(self.payload.len())
    }

    /// Digits the backend must return.
    pub fn body_len(&self) -> Option<usize> {
        self.geometry.body_len(self.payload.len())
    }

    /// Lays the payload out as a near-square grid of 4-byte cells.
    ///
    /// # Errors
    ///
    /// `BackendError::LimitExceeded` when either side would exceed
    /// `max_dimension`. The request is never truncated.
    pub fn grid_dimensions(&self, max_dimension: u32) -> Result<(u32, u32), BackendError> {
        let cells = self.payload.len().div_ceil(CELL_BYTES).max(1) as u64;
        let limit = u64::from(max_dimension.max(1));

        let width = cells.min(limit);
        let height = cells.div_ceil(width);
        if height > limit {
            return Err(BackendError::LimitExceeded {
                width: width as u32,
                height: u32::try_from(height).unwrap_or(u32::MAX),
                limit: max_dimension,
            });
        }

        Ok((width as u32, height as u32))
    }
}

/// An executor for the chunked per-chunk transform.
///
/// Implementations must produce exactly the digits
/// [`ChunkedPayloadCodec::encode_body`] would produce for the same job.
///
/// [`ChunkedPayloadCodec::encode_body`]: crate::encoders::algorithms::chunked::ChunkedPayloadCodec::encode_body
pub trait ParallelBackend: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Checks that the backend can run and acquires its context.
    fn probe(&self) -> Result<BackendCapabilities, BackendError>;

    /// Rebuilds the context after a device loss.
    fn recreate_resources(&self) -> Result<BackendCapabilities, BackendError> {
        self.probe()
    }

    /// Encodes every chunk of `job`, returning body digits in offset order.
    fn encode_chunks(&self, job: &ChunkJob<'_>) -> Result<Vec<u32>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_is_square_when_limited() {
        let payload = vec![0u8; 4 * 100];
        let job = ChunkJob::new(&payload, ChunkGeometry::new(64));
        assert_eq!(job.grid_dimensions(10).unwrap(), (10, 10));
        assert_eq!(job.grid_dimensions(4096).unwrap(), (100, 1));
    }

    #[test]
    fn test_grid_rounds_partial_cells_up() {
        let payload = vec![0u8; 9];
        let job = ChunkJob::new(&payload, ChunkGeometry::new(64));
        assert_eq!(job.grid_dimensions(2).unwrap(), (2, 2));
    }

    #[test]
    fn test_grid_limit_exceeded() {
        let payload = vec![0u8; 4 * 101];
        let job = ChunkJob::new(&payload, ChunkGeometry::new(64));
        assert_eq!(
            job.grid_dimensions(10),
            Err(BackendError::LimitExceeded {
                width: 10,
                height: 11,
                limit: 10
            })
        );
    }

    #[test]
    fn test_job_sizes() {
        let payload = vec![0u8; 15];
        let job = ChunkJob::new(&payload, ChunkGeometry::new(64));
        assert_eq!(job.chunk_count(), 3);
        assert_eq!(job.body_len(), Some(22));
    }
}
