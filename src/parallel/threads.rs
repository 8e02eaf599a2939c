use super::{BackendCapabilities, ChunkJob, ParallelBackend};
use crate::encoders::algorithms::errors::BackendError;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Default largest grid side, in 4-byte cells.
pub const DEFAULT_MAX_GRID_DIMENSION: u32 = 8192;

/// Runs chunks concurrently on a dedicated rayon pool.
///
/// The pool plays the role of a device context: it is built by
/// [`probe`](ParallelBackend::probe), can be torn down with
/// [`release_context`](Self::release_context), and jobs submitted without
/// one fail with `BackendError::DeviceLost`. One job runs on the pool at a
/// time.
#[derive(Debug)]
pub struct ThreadPoolBackend {
    threads: usize,
    max_grid_dimension: u32,
    pool: Mutex<Option<rayon::ThreadPool>>,
    leased_bytes: AtomicUsize,
}

impl ThreadPoolBackend {
    /// A backend sized to the machine's available parallelism.
    pub fn new() -> Self {
        Self::with_threads(0)
    }

    /// A backend with a fixed worker count; `0` lets rayon decide.
    pub fn with_threads(threads: usize) -> Self {
        ThreadPoolBackend {
            threads,
            max_grid_dimension: DEFAULT_MAX_GRID_DIMENSION,
            pool: Mutex::new(None),
            leased_bytes: AtomicUsize::new(0),
        }
    }

    pub fn with_max_grid_dimension(mut self, max_grid_dimension: u32) -> Self {
        self.max_grid_dimension = max_grid_dimension;
        self
    }

    /// Drops the worker pool. Jobs fail with `DeviceLost` until the backend
    /// is probed or its resources are recreated.
    pub fn release_context(&self) {
        let released = self.lock_pool().take().is_some();
        if released {
            tracing::debug!("thread pool context released");
        }
    }

    /// Scratch bytes held by jobs currently in flight.
    pub fn leased_bytes(&self) -> usize {
        self.leased_bytes.load(Ordering::Acquire)
    }

    fn lock_pool(&self) -> MutexGuard<'_, Option<rayon::ThreadPool>> {
        self.pool
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn capabilities(&self, pool: &rayon::ThreadPool) -> BackendCapabilities {
        BackendCapabilities {
            max_grid_dimension: self.max_grid_dimension,
            lanes: pool.current_num_threads(),
        }
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool, BackendError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|index| format!("bitglyph-{}", index))
            .build()
            .map_err(|e| BackendError::ResourceCreation {
                reason: e.to_string(),
            })
    }
}

impl Default for ThreadPoolBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelBackend for ThreadPoolBackend {
    fn name(&self) -> &str {
        "threads"
    }

    fn probe(&self) -> Result<BackendCapabilities, BackendError> {
        let mut slot = self.lock_pool();
        if let Some(pool) = slot.as_ref() {
            return Ok(self.capabilities(pool));
        }

        let pool = self.build_pool()?;
        let caps = self.capabilities(&pool);
        *slot = Some(pool);
        Ok(caps)
    }

    fn recreate_resources(&self) -> Result<BackendCapabilities, BackendError> {
        let mut slot = self.lock_pool();
        slot.take();
        let pool = self.build_pool()?;
        let caps = self.capabilities(&pool);
        *slot = Some(pool);
        Ok(caps)
    }

    fn encode_chunks(&self, job: &ChunkJob<'_>) -> Result<Vec<u32>, BackendError> {
        let len = job.body_len().ok_or_else(|| BackendError::ResourceCreation {
            reason: format!("body for {} bytes is not addressable", job.payload.len()),
        })?;
        let _lease = ScratchLease::acquire(
            &self.leased_bytes,
            len.saturating_mul(std::mem::size_of::<u32>()),
        );

        let (width, height) = job.grid_dimensions(self.max_grid_dimension)?;

        let slot = self.lock_pool();
        let pool = slot.as_ref().ok_or(BackendError::DeviceLost)?;

        let mut body = Vec::new();
        body.try_reserve_exact(len)
            .map_err(|_| BackendError::ResourceCreation {
                reason: format!("cannot allocate {} digits", len),
            })?;
        body.resize(len, 0);

        let geometry = job.geometry;
        let bytes_per_chunk = geometry.bytes_per_chunk();
        pool.install(|| {
            body.par_chunks_mut(geometry.full_width())
                .zip(job.payload.par_chunks(bytes_per_chunk))
                .enumerate()
                .for_each(|(index, (out, chunk))| {
                    geometry.encode_chunk(chunk, index * bytes_per_chunk, out);
                });
        });

        tracing::trace!(
            width,
            height,
            chunks = job.chunk_count(),
            "thread pool job complete"
        );
        Ok(body)
    }
}

/// Accounts scratch memory for one job and gives it back on drop, whichever
/// way the job ends.
struct ScratchLease<'a> {
    counter: &'a AtomicUsize,
    bytes: usize,
}

impl<'a> ScratchLease<'a> {
    fn acquire(counter: &'a AtomicUsize, bytes: usize) -> Self {
        counter.fetch_add(bytes, Ordering::AcqRel);
        ScratchLease { counter, bytes }
    }
}

impl Drop for ScratchLease<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}
