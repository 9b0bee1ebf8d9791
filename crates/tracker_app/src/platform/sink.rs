use std::sync::{Mutex, MutexGuard};

use tracker_core::FeatureCollection;
use tracker_engine::LayerSink;
use tracker_logging::tracker_info;

/// Stands in for the map: keeps the layer last handed over.
#[derive(Default)]
pub struct LatestLayer {
    shown: Mutex<Option<(String, FeatureCollection)>>,
}

impl LatestLayer {
    pub fn latest(&self) -> Option<(String, FeatureCollection)> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<(String, FeatureCollection)>> {
        match self.shown.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LayerSink for LatestLayer {
    fn set_layer(&self, name: Option<String>, collection: Option<FeatureCollection>) {
        let mut shown = self.lock();
        match (name, collection) {
            (Some(name), Some(collection)) => {
                tracker_info!("Layer {} ready ({} links)", name, collection.features.len());
                *shown = Some((name, collection));
            }
            _ => {
                tracker_info!("Layer cleared");
                *shown = None;
            }
        }
    }
}
