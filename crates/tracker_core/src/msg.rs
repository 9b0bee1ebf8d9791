use crate::{Job, JobId};

/// Why a reload or user action did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionFailure {
    /// The server answered with `{ "error": message }`; shown to the user.
    Server(String),
    /// Transport, HTTP or decoding problem; logged only.
    Transport(String),
}

impl ActionFailure {
    pub fn message(&self) -> &str {
        match self {
            ActionFailure::Server(message) | ActionFailure::Transport(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Tracking (re)started; the list is rebuilt from the server.
    Activated,
    /// Authoritative job list from a full reload.
    JobsReloaded(Vec<Job>),
    /// The full reload failed; the list is now "in error" rather than empty.
    JobsReloadFailed(ActionFailure),
    /// Result of one status check dispatched while the store was at `revision`.
    /// `job: None` means the server no longer reports the job.
    StatusReceived {
        revision: u64,
        id: JobId,
        job: Option<Job>,
    },
    /// A single status check failed; the job keeps its last known state.
    StatusCheckFailed { id: JobId, reason: String },
    /// The server accepted a new calculation.
    JobSubmitted(Job),
    /// The server accepted an abort request.
    JobAborted { id: JobId },
    /// The server deleted the job.
    JobDeleted { id: JobId },
    /// A user action went out; shows the busy indicator.
    ActionStarted,
    /// The user action completed.
    ActionSucceeded,
    /// The user action failed.
    ActionFailed(ActionFailure),
    NoOp,
}
