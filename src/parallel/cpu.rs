use super::{BackendCapabilities, ChunkJob, ParallelBackend};
use crate::encoders::algorithms::errors::BackendError;

/// Runs the per-chunk transform on the calling thread.
///
/// Always available. It is the behaviour every other backend is checked
/// against, and a useful stand-in where no accelerated backend exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuReferenceBackend;

impl CpuReferenceBackend {
    pub fn new() -> Self {
        CpuReferenceBackend
    }
}

impl ParallelBackend for CpuReferenceBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn probe(&self) -> Result<BackendCapabilities, BackendError> {
        Ok(BackendCapabilities {
            max_grid_dimension: u32::MAX,
            lanes: 1,
        })
    }

    fn encode_chunks(&self, job: &ChunkJob<'_>) -> Result<Vec<u32>, BackendError> {
        let len = job.body_len().ok_or_else(|| BackendError::ResourceCreation {
            reason: format!("body for {} bytes is not addressable", job.payload.len()),
        })?;

        let mut body = Vec::new();
        body.try_reserve_exact(len)
            .map_err(|_| BackendError::ResourceCreation {
                reason: format!("cannot allocate {} digits", len),
            })?;
        body.resize(len, 0);

        job.geometry.encode_body(job.payload, &mut body);
        Ok(body)
    }
}
