use std::sync::{Arc, Mutex};

use tracker_core::{layer_name, FeatureCollection, JobId};
use tracker_logging::tracker_debug;

/// Host callback receiving `(layer name, collection)`; `(None, None)` clears the map.
pub trait LayerSink: Send + Sync {
    fn set_layer(&self, name: Option<String>, collection: Option<FeatureCollection>);
}

/// Handle to the single results layer shown by the host.
///
/// Tracks which job the visible layer belongs to, so toggling and deletes
/// compare ids instead of layer name strings.
pub struct DisplayedLayer {
    current: Mutex<Option<JobId>>,
    sink: Arc<dyn LayerSink>,
}

impl DisplayedLayer {
    pub fn new(sink: Arc<dyn LayerSink>) -> Self {
        Self {
            current: Mutex::new(None),
            sink,
        }
    }

    pub fn current(&self) -> Option<JobId> {
        self.lock().clone()
    }

    pub fn is_showing(&self, id: &JobId) -> bool {
        self.lock().as_ref() == Some(id)
    }

    pub fn show(&self, id: JobId, collection: FeatureCollection) {
        let name = layer_name(&id);
        *self.lock() = Some(id);
        tracker_debug!("Showing layer {}", name);
        self.sink.set_layer(Some(name), Some(collection));
    }

    pub fn clear(&self) {
        *self.lock() = None;
        self.sink.set_layer(None, None);
    }

    /// Clears the layer only if it belongs to `id`. Returns whether it did.
    pub fn release(&self, id: &JobId) -> bool {
        let mut current = self.lock();
        if current.as_ref() != Some(id) {
            return false;
        }
        *current = None;
        drop(current);
        tracker_debug!("Releasing layer of job {}", id);
        self.sink.set_layer(None, None);
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<JobId>> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
