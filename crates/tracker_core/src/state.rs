use crate::view_model::{JobRowView, PanelViewModel};
use crate::{layer_name, Job, JobSet, JobStatus};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    jobs: JobSet,
    load_error: Option<String>,
    revision: u64,
    busy: bool,
    message: Option<String>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &JobSet {
        &self.jobs
    }

    /// Bumped on every full reload outcome; status results tagged with an
    /// older revision are dropped.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Empty or failed lists are fetched again in full instead of status-checked.
    pub fn needs_reload(&self) -> bool {
        self.load_error.is_some() || self.jobs.is_empty()
    }

    pub fn view(&self) -> PanelViewModel {
        let jobs = self
            .jobs
            .list()
            .into_iter()
            .map(|job| JobRowView {
                id: job.id.clone(),
                status: job.status,
                enqueued: job.enqueued.clone(),
                layer_name: layer_name(&job.id),
                terminal: job.status.is_terminal(),
                can_abort: !job.status.is_terminal() && job.status != JobStatus::Aborted,
                can_show_results: job.status == JobStatus::Finished,
            })
            .collect();

        PanelViewModel {
            jobs,
            load_error: self.load_error.clone(),
            busy: self.busy,
            message: self.message.clone(),
        }
    }

    pub(crate) fn replace_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs.replace_all(jobs);
        self.load_error = None;
        self.revision += 1;
    }

    /// Starts over with an empty list for a new activation. The revision keeps
    /// counting so status checks from the previous activation stay stale.
    pub(crate) fn restart(&mut self) {
        *self = Self {
            revision: self.revision + 1,
            ..Self::default()
        };
    }

    pub(crate) fn fail_load(&mut self, reason: String) {
        self.jobs.clear();
        self.load_error = Some(reason);
        self.revision += 1;
    }

    /// Merges one job; ignored while the list is in error.
    pub(crate) fn merge_job(&mut self, job: Job) -> bool {
        if self.load_error.is_some() {
            return false;
        }
        self.jobs.upsert(job);
        true
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut JobSet {
        &mut self.jobs
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        if busy {
            self.message = None;
        }
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }
}
