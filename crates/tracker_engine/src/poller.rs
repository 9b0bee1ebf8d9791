use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracker_core::{Effect, JobId, JobStatus, Msg};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::tracker::{lock_panel, Context};
use crate::{decode_job, ActionError, Route};

/// Delay between the end of one cycle and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// No api key; nothing was sent.
    pub skipped: bool,
    /// Status checks sent.
    pub checked: usize,
    /// Status results handed to the store.
    pub updated: usize,
    /// Status checks that failed and left their job unchanged.
    pub failed: usize,
    /// A full reload ran during this cycle.
    pub reloaded: bool,
}

enum CheckOutcome {
    Updated,
    Gone,
    Failed,
    Discarded,
}

/// Status refresh loop.
///
/// The next cycle is scheduled only after the current one has settled, so
/// a slow server stretches the period instead of stacking cycles.
#[derive(Clone)]
pub struct Poller {
    context: Arc<Context>,
    interval: Duration,
}

impl Poller {
    pub(crate) fn new(context: Arc<Context>, interval: Duration) -> Self {
        Self { context, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs the loop on the current runtime until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> PollerHandle {
        let token = cancel.clone();
        let join = tokio::spawn(async move { self.run(token).await });
        PollerHandle { cancel, join }
    }

    /// Polls immediately, then once per interval after each cycle settles.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                report = self.poll_once(&cancel) => {
                    tracker_debug!("Poll cycle {} settled: {:?}", cycle, report);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracker_info!("Poller stopped after {} cycles", cycle);
    }

    /// One refresh cycle.
    ///
    /// An empty or failed list is reloaded in full. Otherwise every
    /// non-terminal job gets its own status check; the checks run together and
    /// each result is merged as soon as it arrives. If any check reports the
    /// job gone, one reload runs after all checks have settled.
    pub async fn poll_once(&self, cancel: &CancellationToken) -> CycleReport {
        let mut report = CycleReport::default();
        if !self.context.gate.snapshot().has_api_key() {
            report.skipped = true;
            return report;
        }

        let (needs_reload, revision, pending) = {
            let panel = lock_panel(&self.context.panel);
            let pending: Vec<(JobId, JobStatus)> = panel
                .jobs()
                .list()
                .into_iter()
                .filter(|job| !job.status.is_terminal())
                .map(|job| (job.id.clone(), job.status))
                .collect();
            (panel.needs_reload(), panel.revision(), pending)
        };

        if needs_reload {
            let _ = self.context.reload(cancel).await;
            report.reloaded = true;
            return report;
        }

        report.checked = pending.len();
        let checks = pending
            .into_iter()
            .map(|(id, previous)| self.check(id, previous, revision, cancel));
        let outcomes = join_all(checks).await;

        let mut gone = false;
        for outcome in outcomes {
            match outcome {
                CheckOutcome::Updated => report.updated += 1,
                CheckOutcome::Gone => gone = true,
                CheckOutcome::Failed => report.failed += 1,
                CheckOutcome::Discarded => {}
            }
        }

        if gone && !cancel.is_cancelled() {
            let _ = self.context.reload(cancel).await;
            report.reloaded = true;
        }
        report
    }

    async fn check(
        &self,
        id: JobId,
        previous: JobStatus,
        revision: u64,
        cancel: &CancellationToken,
    ) -> CheckOutcome {
        let body = json!({ "key": id.as_str() });
        let fetched = match self.context.client.send(Route::Status, Some(body), true).await {
            Ok(value) => decode_job(value).map_err(ActionError::from),
            Err(err) => Err(ActionError::from(err)),
        };

        let job = match fetched {
            Ok(job) => job,
            Err(err) => {
                tracker_warn!("Status check for job {} failed: {}", id, err);
                let msg = Msg::StatusCheckFailed {
                    id,
                    reason: err.to_string(),
                };
                return match self.context.dispatch(msg, cancel) {
                    Some(_) => CheckOutcome::Failed,
                    None => CheckOutcome::Discarded,
                };
            }
        };

        if let Some(job) = &job {
            if job.id != id {
                tracker_warn!("Status check for job {} answered for job {}", id, job.id);
                let msg = Msg::StatusCheckFailed {
                    reason: format!("answer for job {}", job.id),
                    id,
                };
                return match self.context.dispatch(msg, cancel) {
                    Some(_) => CheckOutcome::Failed,
                    None => CheckOutcome::Discarded,
                };
            }
            if !previous.can_transition_to(job.status) {
                tracker_debug!(
                    "Job {} reported {} after {}; taking the server's word",
                    id,
                    job.status,
                    previous
                );
            }
        } else {
            tracker_debug!("Job {} no longer reported; reload scheduled", id);
        }

        let msg = Msg::StatusReceived { revision, id, job };
        match self.context.dispatch(msg, cancel) {
            None => CheckOutcome::Discarded,
            Some(effects) if effects.contains(&Effect::ReloadJobs) => CheckOutcome::Gone,
            Some(_) => CheckOutcome::Updated,
        }
    }
}

/// Running poll loop. Dropping the handle does not stop the loop; call
/// [`PollerHandle::deactivate`] or [`PollerHandle::cancel`].
pub struct PollerHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops scheduling and discards late results, without waiting.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Stops the loop and waits until it has exited.
    pub async fn deactivate(self) {
        self.cancel.cancel();
        if let Err(err) = self.join.await {
            tracker_warn!("Poller task ended abnormally: {}", err);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
