use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Server-assigned job identifier.
///
/// The server sends either a number or a string; both are kept as text so
/// equality and ordering do not depend on which one arrived.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<u64> for JobId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum JobStatus {
    #[default]
    Queued,
    Running,
    Finished,
    Failed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job status {0:?}")]
pub struct UnknownStatus(pub String);

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "Queued",
            JobStatus::Running => "Running",
            JobStatus::Finished => "Finished",
            JobStatus::Failed => "Failed",
            JobStatus::Aborted => "Aborted",
        }
    }

    /// Finished and Failed jobs are never status-checked again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }

    /// Whether `next` is a forward move in the job lifecycle.
    ///
    /// Staying in the same state is allowed; the server repeats statuses on
    /// every check.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Queued, Running | Finished | Failed | Aborted) => true,
            (Running, Finished | Failed | Aborted) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queued" => Ok(JobStatus::Queued),
            "Running" => Ok(JobStatus::Running),
            "Finished" => Ok(JobStatus::Finished),
            "Failed" => Ok(JobStatus::Failed),
            "Aborted" => Ok(JobStatus::Aborted),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One server-tracked calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Server enqueue timestamp, compared as text.
    pub enqueued: String,
    /// The raw `data` object as the server sent it.
    pub data: serde_json::Value,
}

impl Job {
    pub fn new(id: impl Into<JobId>, status: JobStatus, enqueued: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status,
            enqueued: enqueued.into(),
            data: serde_json::Value::Null,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub(crate) fn sort_key(&self) -> (&str, &JobId) {
        (self.enqueued.as_str(), &self.id)
    }
}
