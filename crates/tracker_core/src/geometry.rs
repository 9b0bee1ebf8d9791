//! GeoJSON output for finished calculations.
//!
//! Each link in a result becomes one `LineString` feature. Raw points are in
//! the server's projected system and go through a [`CoordinateConverter`]
//! before they reach the map.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::JobId;

pub const LAYER_PREFIX: &str = "results-geojson-";

/// Deterministic map layer name for a job's results.
pub fn layer_name(id: &JobId) -> String {
    format!("{LAYER_PREFIX}{id}")
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("link {link} has no Points array")]
    MissingPoints { link: usize },
    #[error("link {link} point {point} is not a coordinate pair")]
    ShortPoint { link: usize, point: usize },
    #[error("coordinate conversion failed: {0}")]
    Conversion(String),
}

/// Projected `[x, y]` to geographic `[lon, lat]`.
pub trait CoordinateConverter: Send + Sync {
    fn to_geographic(&self, x: f64, y: f64) -> Result<[f64; 2], ProjectionError>;
}

/// For servers that already answer in geographic coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl CoordinateConverter for Passthrough {
    fn to_geographic(&self, x: f64, y: f64) -> Result<[f64; 2], ProjectionError> {
        Ok([x, y])
    }
}

/// One link from a results payload, with every field the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub points: Vec<Vec<f64>>,
    pub properties: Map<String, Value>,
}

impl LinkRecord {
    /// Reads `Points` out of a raw link object. `link` is the position in the
    /// payload, used for error reporting.
    pub fn from_properties(link: usize, properties: Map<String, Value>) -> Result<Self, ProjectionError> {
        let raw_points = properties
            .get("Points")
            .and_then(Value::as_array)
            .ok_or(ProjectionError::MissingPoints { link })?;

        let points = raw_points
            .iter()
            .enumerate()
            .map(|(point, raw)| {
                raw.as_array()
                    .map(|coords| coords.iter().filter_map(Value::as_f64).collect::<Vec<_>>())
                    .filter(|coords| coords.len() >= 2)
                    .ok_or(ProjectionError::ShortPoint { link, point })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { points, properties })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
}

/// Builds the feature collection for a job's links. Any `z` component is dropped.
pub fn project_links(
    links: &[LinkRecord],
    converter: &dyn CoordinateConverter,
) -> Result<FeatureCollection, ProjectionError> {
    let features = links
        .iter()
        .enumerate()
        .map(|(link, record)| -> Result<Feature, ProjectionError> {
            let coordinates = record
                .points
                .iter()
                .enumerate()
                .map(|(point, coords)| match coords.as_slice() {
                    [x, y, ..] => converter.to_geographic(*x, *y),
                    _ => Err(ProjectionError::ShortPoint { link, point }),
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut properties = record.properties.clone();
            properties.insert("isLink".to_string(), Value::Bool(true));

            Ok(Feature {
                properties,
                geometry: Geometry::LineString { coordinates },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FeatureCollection { features })
}
