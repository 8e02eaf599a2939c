//! Backend availability tracking.
//!
//! ```text
//! Uninitialized --probe ok--> Ready --device lost--> Lost --recreated--> Ready
//!       |                       |                      |
//!   probe failed              fault             recreation failed
//!       v                       v                      v
//!    Disabled <-----------------+----------------------+
//! ```
//!
//! `Disabled` only leaves through an explicit re-probe. The encode path never
//! waits on the state lock: a caller that finds it held goes sequential.

use super::{ChunkJob, ParallelBackend};
use crate::encoders::algorithms::errors::BackendError;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendState {
    Uninitialized,
    Ready,
    Lost,
    Disabled,
}

impl std::fmt::Display for BackendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendState::Uninitialized => write!(f, "uninitialized"),
            BackendState::Ready => write!(f, "ready"),
            BackendState::Lost => write!(f, "lost"),
            BackendState::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    ProbeSucceeded,
    ProbeFailed,
    DeviceLost,
    /// A job failed in a way that makes the backend unusable.
    Fault,
    ResourcesRecreated,
    RecreationFailed,
    /// Caller asked for a fresh probe.
    ReprobeRequested,
}

impl BackendState {
    /// The state after `event`. Events that do not apply leave the state as is.
    pub fn on(self, event: BackendEvent) -> BackendState {
        use BackendEvent as E;
        use BackendState as S;

        match (self, event) {
            (S::Uninitialized, E::ProbeSucceeded) => S::Ready,
            (S::Uninitialized, E::ProbeFailed) => S::Disabled,
            (S::Ready, E::DeviceLost) => S::Lost,
            (S::Ready, E::Fault) => S::Disabled,
            (S::Lost, E::ResourcesRecreated) => S::Ready,
            (S::Lost, E::RecreationFailed) => S::Disabled,
            (S::Lost | S::Disabled, E::ReprobeRequested) => S::Uninitialized,
            (state, _) => state,
        }
    }

    pub fn is_ready(self) -> bool {
        self == BackendState::Ready
    }
}

impl BackendError {
    /// The state-machine event a job failure maps to, if any.
    ///
    /// `LimitExceeded` is a property of the request, not the backend, so it
    /// leaves the backend ready for smaller jobs.
    pub fn event(&self) -> Option<BackendEvent> {
        match self {
            BackendError::DeviceLost => Some(BackendEvent::DeviceLost),
            BackendError::LimitExceeded { .. } => None,
            BackendError::Unsupported { .. }
            | BackendError::ResourceCreation { .. }
            | BackendError::Kernel { .. } => Some(BackendEvent::Fault),
        }
    }
}

/// Receives device-loss and device-restoration notifications.
pub trait BackendObserver {
    fn on_backend_lost(&self);
    fn on_backend_restored(&self);
}

/// Result of offering a job to the supervised backend.
#[derive(Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(Vec<u32>),
    /// The backend was busy or not ready; nothing was attempted.
    Unavailable,
    /// The backend was tried and failed.
    Failed(BackendError),
}

/// Owns a backend and its availability state.
#[derive(Debug)]
pub struct BackendSupervisor {
    backend: Arc<dyn ParallelBackend>,
    state: Mutex<BackendState>,
    slot: Mutex<()>,
}

impl BackendSupervisor {
    pub fn new(backend: Arc<dyn ParallelBackend>) -> Self {
        BackendSupervisor {
            backend,
            state: Mutex::new(BackendState::Uninitialized),
            slot: Mutex::new(()),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn state(&self) -> BackendState {
        *self.lock_state()
    }

    /// Applies `event` and returns the resulting state.
    pub fn apply(&self, event: BackendEvent) -> BackendState {
        let mut state = self.lock_state();
        self.transition(&mut state, event)
    }

    /// Runs `job` on the backend if it is free and ready.
    ///
    /// Probes on first use. Failures are logged and folded into the state
    /// machine; the caller only has to fall back.
    pub fn run(&self, job: &ChunkJob<'_>) -> JobOutcome {
        let _slot = match self.slot.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::debug!(backend = self.backend_name(), "backend busy");
                return JobOutcome::Unavailable;
            }
        };

        if !self.ensure_ready() {
            return JobOutcome::Unavailable;
        }

        let result = self
            .backend
            .encode_chunks(job)
            .and_then(|body| validate_body(job, body));

        match result {
            Ok(body) => JobOutcome::Completed(body),
            Err(err) => {
                tracing::warn!(
                    backend = self.backend_name(),
                    error = %err,
                    bytes = job.payload.len(),
                    "accelerated encode failed, falling back to sequential"
                );
                if let Some(event) = err.event() {
                    self.apply(event);
                }
                JobOutcome::Failed(err)
            }
        }
    }

    /// Forgets a lost or disabled backend's history and probes again.
    pub fn reprobe(&self) -> BackendState {
        let mut state = self.lock_state();
        if state.is_ready() {
            return BackendState::Ready;
        }
        self.transition(&mut state, BackendEvent::ReprobeRequested);
        let event = self.probe_event();
        self.transition(&mut state, event)
    }

    fn ensure_ready(&self) -> bool {
        let mut state = match self.state.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
        };

        match *state {
            BackendState::Ready => true,
            BackendState::Uninitialized => {
                let event = self.probe_event();
                self.transition(&mut state, event).is_ready()
            }
            BackendState::Lost | BackendState::Disabled => false,
        }
    }

    fn probe_event(&self) -> BackendEvent {
        match self.backend.probe() {
            Ok(caps) => {
                tracing::debug!(
                    backend = self.backend_name(),
                    lanes = caps.lanes,
                    max_grid_dimension = caps.max_grid_dimension,
                    "backend probe succeeded"
                );
                BackendEvent::ProbeSucceeded
            }
            Err(err) => {
                tracing::warn!(backend = self.backend_name(), error = %err, "backend probe failed");
                BackendEvent::ProbeFailed
            }
        }
    }

    fn transition(&self, state: &mut BackendState, event: BackendEvent) -> BackendState {
        let next = state.on(event);
        if next != *state {
            tracing::info!(
                backend = self.backend_name(),
                from = %state,
                to = %next,
                ?event,
                "backend state changed"
            );
            *state = next;
        }
        next
    }

    fn lock_state(&self) -> MutexGuard<'_, BackendState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BackendObserver for BackendSupervisor {
    fn on_backend_lost(&self) {
        self.apply(BackendEvent::DeviceLost);
    }

    fn on_backend_restored(&self) {
        if self.state() != BackendState::Lost {
            tracing::debug!(
                backend = self.backend_name(),
                "restoration ignored, backend not lost"
            );
            return;
        }

        // Recreation can be slow; run it without holding the state lock.
        let result = self.backend.recreate_resources();

        let mut state = self.lock_state();
        if *state != BackendState::Lost {
            return;
        }
        let event = match result {
            Ok(_) => BackendEvent::ResourcesRecreated,
            Err(err) => {
                tracing::warn!(
                    backend = self.backend_name(),
                    error = %err,
                    "backend resource recreation failed"
                );
                BackendEvent::RecreationFailed
            }
        };
        self.transition(&mut state, event);
    }
}

/// Checks a backend's output before it is framed.
fn validate_body(job: &ChunkJob<'_>, body: Vec<u32>) -> Result<Vec<u32>, BackendError> {
    let expected = job.body_len();
    if Some(body.len()) != expected {
        return Err(BackendError::Kernel {
            reason: format!(
                "returned {} digits, expected {}",
                body.len(),
                expected.unwrap_or(0)
            ),
        });
    }

    let radix = job.geometry.radix();
    if let Some(position) = body.iter().position(|&digit| digit >= radix) {
        return Err(BackendError::Kernel {
            reason: format!(
                "digit {} at position {} is outside radix {}",
                body[position], position, radix
            ),
        });
    }

    Ok(body)
}
