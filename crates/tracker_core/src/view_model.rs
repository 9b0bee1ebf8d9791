use crate::{JobId, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelViewModel {
    /// Rows in enqueue order.
    pub jobs: Vec<JobRowView>,
    /// Set when the last full reload failed, as opposed to "no jobs yet".
    pub load_error: Option<String>,
    pub busy: bool,
    /// Server error message from the last action, if any.
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub id: JobId,
    pub status: JobStatus,
    pub enqueued: String,
    pub layer_name: String,
    /// No longer polled.
    pub terminal: bool,
    pub can_abort: bool,
    pub can_show_results: bool,
}
