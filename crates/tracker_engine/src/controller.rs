use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracker_core::{Job, JobId, Msg};
use tracker_logging::tracker_info;

use crate::tracker::Context;
use crate::wire::WireError;
use crate::{decode_job, ActionError, BlockReason, Route};

/// Body of a new calculation. Stations are forwarded as the host built them.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CalculationRequest {
    #[serde(rename = "baseStations")]
    pub base_stations: Vec<Value>,
}

impl CalculationRequest {
    pub fn new(base_stations: Vec<Value>) -> Self {
        Self { base_stations }
    }
}

/// User-triggered job operations.
///
/// Each action shows the busy indicator while it runs. Server `{ error }`
/// answers come back as [`ActionError::Server`] and are shown to the user;
/// everything else is logged.
#[derive(Clone)]
pub struct LifecycleController {
    context: Arc<Context>,
}

impl LifecycleController {
    pub(crate) fn new(context: Arc<Context>) -> Self {
        Self { context }
    }

    /// Starts a calculation and lists the new job right away.
    pub async fn submit(&self, request: &CalculationRequest) -> Result<Job, ActionError> {
        self.check_gate(request)?;
        let body = serde_json::to_value(request).map_err(WireError::from)?;

        let guard = self.context.activity();
        self.context
            .run_action("submit", &guard, async {
                let value = self.context.client.send(Route::Submit, Some(body), false).await?;
                let job = decode_job(value)?.ok_or(WireError::MissingJob)?;
                self.context.dispatch(Msg::JobSubmitted(job.clone()), &guard);
                Ok::<_, ActionError>(job)
            })
            .await
    }

    /// Asks the server for an offline calculation config. The job list is not touched.
    pub async fn generate_config(&self, request: &CalculationRequest) -> Result<Value, ActionError> {
        self.check_gate(request)?;
        let body = serde_json::to_value(request).map_err(WireError::from)?;

        let guard = self.context.activity();
        self.context
            .run_action("generateConfig", &guard, async {
                let config = self
                    .context
                    .client
                    .send(Route::GenerateConfig, Some(body), false)
                    .await?;
                Ok::<_, ActionError>(config)
            })
            .await
    }

    /// Requests an abort. The row stays; its new status arrives with the reload.
    pub async fn abort(&self, id: &JobId) -> Result<(), ActionError> {
        self.require_api_key()?;
        let guard = self.context.activity();
        self.context
            .run_action("abort", &guard, async {
                self.context
                    .client
                    .send(Route::Abort, Some(key_body(id)), true)
                    .await?;
                self.apply(Msg::JobAborted { id: id.clone() }, &guard).await;
                Ok::<_, ActionError>(())
            })
            .await
    }

    /// Deletes a job, resynchronises the list and drops its layer if shown.
    pub async fn delete(&self, id: &JobId) -> Result<(), ActionError> {
        self.require_api_key()?;
        let guard = self.context.activity();
        self.context
            .run_action("delete", &guard, async {
                self.context
                    .client
                    .send(Route::Delete, Some(key_body(id)), true)
                    .await?;
                self.apply(Msg::JobDeleted { id: id.clone() }, &guard).await;
                Ok::<_, ActionError>(())
            })
            .await
    }

    /// Full reload of the job list. Returns the number of jobs received.
    pub async fn reload(&self) -> Result<usize, ActionError> {
        self.context.reload(&self.context.activity()).await
    }

    fn require_api_key(&self) -> Result<(), ActionError> {
        if self.context.gate.snapshot().has_api_key() {
            Ok(())
        } else {
            Err(ActionError::Blocked(BlockReason::MissingApiKey))
        }
    }

    fn check_gate(&self, request: &CalculationRequest) -> Result<(), ActionError> {
        let params = self.context.gate.snapshot();
        let blocked = if !params.has_api_key() {
            Some(BlockReason::MissingApiKey)
        } else if !params.valid {
            Some(BlockReason::InvalidParameters)
        } else if request.base_stations.is_empty() {
            Some(BlockReason::NoStationsSelected)
        } else {
            None
        };

        match blocked {
            Some(reason) => {
                tracker_info!("Calculation not started: {}", reason);
                Err(ActionError::Blocked(reason))
            }
            None => Ok(()),
        }
    }

    async fn apply(&self, msg: Msg, guard: &CancellationToken) {
        if let Some(effects) = self.context.dispatch(msg, guard) {
            self.context.run_effects(effects, guard).await;
        }
    }
}

fn key_body(id: &JobId) -> Value {
    json!({ "key": id.as_str() })
}
