use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracker_core::{
    update, CoordinateConverter, Effect, Msg, PanelState, PanelViewModel, Passthrough,
};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::poller::{Poller, PollerHandle, POLL_INTERVAL};
use crate::{
    decode_job_list, ActionError, DisplayedLayer, LayerSink, LifecycleController, ParameterGate,
    ResultProjector, Route, RpcClient, SinglePointCalculator,
};

/// Panel state shared by the poller, the actions and the host view.
pub type SharedPanel = Arc<Mutex<PanelState>>;

/// Everything the poller and the actions share.
pub(crate) struct Context {
    pub(crate) client: Arc<dyn RpcClient>,
    pub(crate) gate: Arc<dyn ParameterGate>,
    pub(crate) panel: SharedPanel,
    pub(crate) layer: Arc<DisplayedLayer>,
    /// Cancelled when the tracker shuts down; late results are then dropped.
    pub(crate) lifetime: CancellationToken,
    /// Child of `lifetime`, replaced on every activation and deactivation.
    /// Work started under one token never applies under the next.
    activity: Mutex<CancellationToken>,
}

impl Context {
    fn new(
        client: Arc<dyn RpcClient>,
        gate: Arc<dyn ParameterGate>,
        layer: DisplayedLayer,
    ) -> Self {
        let lifetime = CancellationToken::new();
        Self {
            client,
            gate,
            panel: Arc::new(Mutex::new(PanelState::new())),
            layer: Arc::new(layer),
            activity: Mutex::new(lifetime.child_token()),
            lifetime,
        }
    }

    /// Guard for work starting now.
    pub(crate) fn activity(&self) -> CancellationToken {
        self.activity_slot().clone()
    }

    /// Cancels the current guard and installs a fresh one.
    fn renew_activity(&self) -> CancellationToken {
        let next = self.lifetime.child_token();
        let previous = std::mem::replace(&mut *self.activity_slot(), next.clone());
        previous.cancel();
        next
    }

    fn activity_slot(&self) -> MutexGuard<'_, CancellationToken> {
        match self.activity.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Applies `msg` unless `guard` was cancelled while the caller awaited.
    pub(crate) fn dispatch(&self, msg: Msg, guard: &CancellationToken) -> Option<Vec<Effect>> {
        if guard.is_cancelled() {
            tracker_debug!("Discarding {} after deactivation", msg_name(&msg));
            return None;
        }
        let mut panel = lock_panel(&self.panel);
        let state = std::mem::take(&mut *panel);
        let (state, effects) = update(state, msg);
        *panel = state;
        Some(effects)
    }

    /// Runs effects in order.
    pub(crate) async fn run_effects(&self, effects: Vec<Effect>, guard: &CancellationToken) {
        for effect in effects {
            match effect {
                Effect::ReloadJobs => {
                    // Failures are already recorded in the panel state.
                    let _ = self.reload(guard).await;
                }
                Effect::ReleaseLayer { id } => {
                    if guard.is_cancelled() {
                        return;
                    }
                    self.layer.release(&id);
                }
            }
        }
    }

    /// Wraps a user action: busy indicator on, then cleared with the outcome.
    /// Nothing is applied once `guard` is cancelled.
    pub(crate) async fn run_action<T>(
        &self,
        name: &str,
        guard: &CancellationToken,
        action: impl Future<Output = Result<T, ActionError>>,
    ) -> Result<T, ActionError> {
        self.dispatch(Msg::ActionStarted, guard);

        let result = action.await;
        match &result {
            Ok(_) => {
                tracker_info!("{} succeeded", name);
                self.dispatch(Msg::ActionSucceeded, guard);
            }
            Err(err) => {
                if err.is_structured() {
                    tracker_info!("{} rejected by server: {}", name, err);
                } else {
                    tracker_warn!("{} failed: {}", name, err);
                }
                self.dispatch(Msg::ActionFailed(err.to_failure()), guard);
            }
        }
        result
    }

    /// Replaces the job list with the server's. No-op without an api key.
    pub(crate) async fn reload(&self, guard: &CancellationToken) -> Result<usize, ActionError> {
        if !self.gate.snapshot().has_api_key() {
            return Ok(0);
        }

        let outcome = match self.client.send(Route::Jobs, None, true).await {
            Ok(value) => decode_job_list(value).map_err(ActionError::from),
            Err(err) => Err(ActionError::from(err)),
        };

        match outcome {
            Ok(jobs) => {
                let count = jobs.len();
                tracker_debug!("Reloaded {} jobs", count);
                self.dispatch(Msg::JobsReloaded(jobs), guard);
                Ok(count)
            }
            Err(err) => {
                tracker_warn!("Job list reload failed: {}", err);
                self.dispatch(Msg::JobsReloadFailed(err.to_failure()), guard);
                Err(err)
            }
        }
    }
}

pub(crate) fn lock_panel(panel: &SharedPanel) -> MutexGuard<'_, PanelState> {
    match panel.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn msg_name(msg: &Msg) -> &'static str {
    match msg {
        Msg::Activated => "Activated",
        Msg::JobsReloaded(_) => "JobsReloaded",
        Msg::JobsReloadFailed(_) => "JobsReloadFailed",
        Msg::StatusReceived { .. } => "StatusReceived",
        Msg::StatusCheckFailed { .. } => "StatusCheckFailed",
        Msg::JobSubmitted(_) => "JobSubmitted",
        Msg::JobAborted { .. } => "JobAborted",
        Msg::JobDeleted { .. } => "JobDeleted",
        Msg::ActionStarted => "ActionStarted",
        Msg::ActionSucceeded => "ActionSucceeded",
        Msg::ActionFailed(_) => "ActionFailed",
        Msg::NoOp => "NoOp",
    }
}

/// The calculation panel's job tracking, wired together.
///
/// `activate` starts polling, `deactivate` stops it. Actions and the result
/// toggle are reached through [`Tracker::controller`] and
/// [`Tracker::projector`].
pub struct Tracker {
    context: Arc<Context>,
    converter: Arc<dyn CoordinateConverter>,
    interval: Duration,
    poller: Mutex<Option<PollerHandle>>,
}

impl Tracker {
    pub fn new(
        client: Arc<dyn RpcClient>,
        gate: Arc<dyn ParameterGate>,
        sink: Arc<dyn LayerSink>,
    ) -> Self {
        let context = Context::new(client, gate, DisplayedLayer::new(sink));
        Self {
            context: Arc::new(context),
            converter: Arc::new(Passthrough),
            interval: POLL_INTERVAL,
            poller: Mutex::new(None),
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn CoordinateConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn panel(&self) -> SharedPanel {
        self.context.panel.clone()
    }

    pub fn view(&self) -> PanelViewModel {
        lock_panel(&self.context.panel).view()
    }

    pub fn layer(&self) -> Arc<DisplayedLayer> {
        self.context.layer.clone()
    }

    pub fn poller(&self) -> Poller {
        Poller::new(self.context.clone(), self.interval)
    }

    pub fn controller(&self) -> LifecycleController {
        LifecycleController::new(self.context.clone())
    }

    pub fn projector(&self) -> ResultProjector {
        ResultProjector::new(self.context.clone(), self.converter.clone())
    }

    /// Point-to-point calculations. They run beside the job list and never
    /// touch it.
    pub fn single_point(&self) -> SinglePointCalculator {
        SinglePointCalculator::new(self.context.client.clone(), self.context.gate.clone())
    }

    /// Starts the polling loop on an empty job list; the first cycle fetches
    /// the list in full. Calling it while already active does nothing.
    /// Must be called inside a tokio runtime.
    pub fn activate(&self) {
        let mut slot = self.poller_slot();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        let activity = self.context.renew_activity();
        self.context.dispatch(Msg::Activated, &activity);
        tracker_info!("Tracker activated (interval {:?})", self.interval);
        *slot = Some(self.poller().spawn(activity));
    }

    /// Stops polling and waits for the loop to exit. Requests still in flight,
    /// actions included, are discarded when they complete.
    pub async fn deactivate(&self) {
        self.context.renew_activity();
        let handle = self.poller_slot().take();
        if let Some(handle) = handle {
            handle.deactivate().await;
            tracker_info!("Tracker deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.poller_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops polling and discards the results of any action still in flight.
    pub fn shutdown(&self) {
        self.context.lifetime.cancel();
        if let Some(handle) = self.poller_slot().take() {
            handle.cancel();
        }
    }

    fn poller_slot(&self) -> MutexGuard<'_, Option<PollerHandle>> {
        match self.poller.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.context.lifetime.cancel();
    }
}
