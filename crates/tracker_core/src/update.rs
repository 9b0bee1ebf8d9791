use crate::{ActionFailure, Effect, Msg, PanelState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PanelState, msg: Msg) -> (PanelState, Vec<Effect>) {
    let effects = match msg {
        Msg::Activated => {
            state.restart();
            Vec::new()
        }
        Msg::JobsReloaded(jobs) => {
            state.replace_jobs(jobs);
            Vec::new()
        }
        Msg::JobsReloadFailed(failure) => {
            state.fail_load(failure.message().to_string());
            if let ActionFailure::Server(message) = failure {
                state.set_message(message);
            }
            Vec::new()
        }
        Msg::StatusReceived { revision, id, job } => {
            // A reload landed after this check went out; the snapshot wins.
            if revision != state.revision() {
                return (state, Vec::new());
            }
            match job {
                Some(job) if job.id == id => {
                    state.merge_job(job);
                    Vec::new()
                }
                // Answer for a different id: not this job's state, leave it alone.
                Some(_) => Vec::new(),
                None => vec![Effect::ReloadJobs],
            }
        }
        Msg::StatusCheckFailed { .. } => Vec::new(),
        Msg::JobSubmitted(job) => {
            state.merge_job(job);
            Vec::new()
        }
        Msg::JobAborted { .. } => vec![Effect::ReloadJobs],
        Msg::JobDeleted { id } => {
            state.jobs_mut().remove(&id);
            vec![Effect::ReloadJobs, Effect::ReleaseLayer { id }]
        }
        Msg::ActionStarted => {
            state.set_busy(true);
            Vec::new()
        }
        Msg::ActionSucceeded => {
            state.set_busy(false);
            Vec::new()
        }
        Msg::ActionFailed(failure) => {
            state.set_busy(false);
            if let ActionFailure::Server(message) = failure {
                state.set_message(message);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
