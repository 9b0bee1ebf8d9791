use std::sync::Arc;

use serde_json::json;
use tracker_core::{project_links, CoordinateConverter, FeatureCollection, Job, JobId};
use tracker_logging::tracker_debug;

use crate::tracker::Context;
use crate::{decode_results, ActionError, Route};

/// Result of [`ResultProjector::project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Shown,
    Hidden,
}

/// Turns a finished job's links into the map layer, or hides it again.
#[derive(Clone)]
pub struct ResultProjector {
    context: Arc<Context>,
    converter: Arc<dyn CoordinateConverter>,
}

impl ResultProjector {
    pub(crate) fn new(context: Arc<Context>, converter: Arc<dyn CoordinateConverter>) -> Self {
        Self { context, converter }
    }

    pub async fn project(&self, job: &Job) -> Result<Toggle, ActionError> {
        self.toggle(&job.id).await
    }

    /// Hides the layer if it is this job's (no request), otherwise fetches and
    /// shows it. On failure the current layer is left as it was.
    pub async fn toggle(&self, id: &JobId) -> Result<Toggle, ActionError> {
        let layer = &self.context.layer;
        if layer.is_showing(id) {
            tracker_debug!("Hiding results of job {}", id);
            layer.clear();
            return Ok(Toggle::Hidden);
        }

        let guard = self.context.activity();
        self.context
            .run_action("results", &guard, async {
                let collection = self.fetch_layer(id).await?;
                if guard.is_cancelled() {
                    return Ok(Toggle::Hidden);
                }
                layer.show(id.clone(), collection);
                Ok::<_, ActionError>(Toggle::Shown)
            })
            .await
    }

    async fn fetch_layer(&self, id: &JobId) -> Result<FeatureCollection, ActionError> {
        let value = self
            .context
            .client
            .send(Route::Results, Some(json!({ "key": id.as_str() })), true)
            .await?;
        let links = decode_results(value)?;
        let collection = project_links(&links, self.converter.as_ref())?;
        tracker_debug!("Job {}: {} links projected", id, collection.features.len());
        Ok(collection)
    }
}
