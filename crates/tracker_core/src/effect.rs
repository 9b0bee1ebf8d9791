use crate::JobId;

/// Follow-up work requested by [`crate::update`]; executed by the engine in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the full job list and apply it with `Msg::JobsReloaded`.
    ReloadJobs,
    /// Clear the displayed layer if it belongs to this job.
    ReleaseLayer { id: JobId },
}
