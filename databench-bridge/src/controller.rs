//! Process lifecycle controller
//!
//! Tracks the remote computation a trigger started:
//! - `Idle` → `Active` when the trigger fires (fresh random process id)
//! - `Active` → `Idle` when `end` is reported for that id
//!
//! `start` for the active id is accepted without a transition, any other
//! status is ignored. There is no timeout; a process that never reports
//! `end` keeps its trigger active.

use crate::data::{ProcessId, ProcessStatus};
use parking_lot::RwLock;
use rand::Rng;
use tracing::debug;

/// Trigger process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessState {
    /// No process outstanding
    #[default]
    Idle,
    /// Waiting for `end` of this process
    Active { process_id: ProcessId },
}

impl ProcessState {
    pub fn is_active(&self) -> bool {
        matches!(self, ProcessState::Active { .. })
    }
}

/// Draw a process id from the full `u32` range
pub fn generate_process_id() -> ProcessId {
    ProcessId::from(rand::thread_rng().gen::<u32>())
}

/// Two-state machine owned by one trigger binding
#[derive(Debug, Default)]
pub struct ProcessController {
    state: RwLock<ProcessState>,
}

impl ProcessController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProcessState {
        *self.state.read()
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Start a process if idle
    ///
    /// Returns the new id, or `None` while a process is outstanding.
    pub fn begin(&self) -> Option<ProcessId> {
        self.begin_with(generate_process_id())
    }

    /// Start a process with a caller-chosen id if idle
    pub fn begin_with(&self, process_id: ProcessId) -> Option<ProcessId> {
        let mut state = self.state.write();
        if state.is_active() {
            debug!("Process already active, ignoring activation");
            return None;
        }
        *state = ProcessState::Active { process_id };
        Some(process_id)
    }

    /// Apply a lifecycle notification; returns whether the state changed
    pub fn notify(&self, process_id: ProcessId, status: &ProcessStatus) -> bool {
        let mut state = self.state.write();
        match (*state, status) {
            (ProcessState::Active { process_id: active }, ProcessStatus::End) if active == process_id => {
                *state = ProcessState::Idle;
                debug!("Process {} ended", process_id);
                true
            }
            (_, ProcessStatus::Start) => false,
            (_, ProcessStatus::End) => {
                debug!("Ignoring end of unrelated process {}", process_id);
                false
            }
            (_, ProcessStatus::Other(other)) => {
                debug!("Ignoring status '{}' for process {}", other, process_id);
                false
            }
        }
    }
}
