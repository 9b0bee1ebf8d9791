use std::collections::BTreeMap;

use crate::{Job, JobId};

/// The panel's job collection: at most one entry per id, listed by enqueue time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobSet {
    jobs: BTreeMap<JobId, Job>,
}

impl JobSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `job`, replacing any entry with the same id.
    pub fn upsert(&mut self, job: Job) {
        self.jobs.insert(job.id.clone(), job);
    }

    /// Replaces the whole set. With repeated ids the last one wins.
    pub fn replace_all(&mut self, jobs: impl IntoIterator<Item = Job>) {
        self.jobs = jobs.into_iter().map(|job| (job.id.clone(), job)).collect();
    }

    pub fn remove(&mut self, id: &JobId) -> Option<Job> {
        self.jobs.remove(id)
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs ascending by enqueue time, ties broken by id.
    pub fn list(&self) -> Vec<&Job> {
        let mut ordered: Vec<&Job> = self.jobs.values().collect();
        ordered.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        ordered
    }

    /// Ids still worth a status check, in list order.
    pub fn pending_ids(&self) -> Vec<JobId> {
        self.list()
            .into_iter()
            .filter(|job| !job.status.is_terminal())
            .map(|job| job.id.clone())
            .collect()
    }
}

impl FromIterator<Job> for JobSet {
    fn from_iter<T: IntoIterator<Item = Job>>(iter: T) -> Self {
        let mut set = JobSet::new();
        set.replace_all(iter);
        set
    }
}
