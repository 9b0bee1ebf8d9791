use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracker_logging::tracker_info;

use crate::wire::WireError;
use crate::{ActionError, BlockReason, ParameterGate, Route, RpcClient};

/// One station-to-target link calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePointRequest {
    #[serde(rename = "baseStation")]
    pub base_station: Value,
    /// Target position in the server's projected coordinates.
    #[serde(rename = "targetCoordinates")]
    pub target_coordinates: Value,
}

impl SinglePointRequest {
    pub fn new(base_station: Value, target: [f64; 2]) -> Self {
        Self {
            base_station,
            target_coordinates: Value::from(target.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProfilePoint {
    pub z: f64,
}

/// Signal along the path from the station to the target, one sample per step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkProfile {
    /// Metres between station and target.
    pub distance: f64,
    #[serde(default)]
    pub loss: Vec<f64>,
    pub rsrp: Vec<f64>,
    /// Terrain samples; only the height is used.
    #[serde(default)]
    pub vector: Vec<ProfilePoint>,
    /// Server-side diagnostics, passed through untouched.
    #[serde(default)]
    pub snapshot: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRow {
    pub step: usize,
    pub terrain_height: f64,
    pub path_loss: f64,
    pub rsrp: f64,
}

impl LinkProfile {
    /// Received power at the target.
    pub fn final_rsrp(&self) -> Option<f64> {
        self.rsrp.last().copied()
    }

    /// Steps present in all three series.
    pub fn rows(&self) -> Vec<ProfileRow> {
        self.rsrp
            .iter()
            .zip(&self.loss)
            .zip(&self.vector)
            .enumerate()
            .map(|(step, ((rsrp, loss), point))| ProfileRow {
                step,
                terrain_height: point.z,
                path_loss: *loss,
                rsrp: *rsrp,
            })
            .collect()
    }
}

pub fn decode_profile(value: Value) -> Result<LinkProfile, WireError> {
    if !value.is_object() {
        return Err(WireError::MissingProfile);
    }
    Ok(serde_json::from_value(value)?)
}

/// Runs point-to-point calculations with the current parameters.
#[derive(Clone)]
pub struct SinglePointCalculator {
    client: Arc<dyn RpcClient>,
    gate: Arc<dyn ParameterGate>,
}

impl SinglePointCalculator {
    pub fn new(client: Arc<dyn RpcClient>, gate: Arc<dyn ParameterGate>) -> Self {
        Self { client, gate }
    }

    pub async fn calculate(&self, request: &SinglePointRequest) -> Result<LinkProfile, ActionError> {
        let params = self.gate.snapshot();
        if !params.has_api_key() {
            return Err(ActionError::Blocked(BlockReason::MissingApiKey));
        }
        if !params.valid {
            return Err(ActionError::Blocked(BlockReason::InvalidParameters));
        }

        let body = serde_json::to_value(request).map_err(WireError::from)?;
        let value = self.client.send(Route::SinglePoint, Some(body), false).await?;
        let profile = decode_profile(value)?;
        tracker_info!(
            "Single point: {} m, {} samples, final rsrp {:?}",
            profile.distance,
            profile.rsrp.len(),
            profile.final_rsrp()
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_stop_at_the_shortest_series() {
        let profile = decode_profile(json!({
            "distance": 250,
            "loss": [80.5, 95.0, 101.25],
            "rsrp": [-60.0, -75.5],
            "vector": [{ "x": 1, "y": 2, "z": 120.0 }, { "x": 2, "y": 2, "z": 118.5 }, { "z": 117 }]
        }))
        .unwrap();

        let rows = profile.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            ProfileRow {
                step: 1,
                terrain_height: 118.5,
                path_loss: 95.0,
                rsrp: -75.5
            }
        );
        assert_eq!(profile.final_rsrp(), Some(-75.5));
        assert_eq!(profile.distance, 250.0);
    }

    #[test]
    fn null_answer_is_missing_profile() {
        assert_eq!(decode_profile(Value::Null), Err(WireError::MissingProfile));
        assert!(matches!(
            decode_profile(json!({ "distance": 1 })),
            Err(WireError::Json(_))
        ));
    }

    #[test]
    fn request_uses_server_field_names() {
        let request = SinglePointRequest::new(json!({ "id": "bs-1" }), [597000.0, 6643000.5]);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "baseStation": { "id": "bs-1" },
                "targetCoordinates": [597000.0, 6643000.5]
            })
        );
    }
}
