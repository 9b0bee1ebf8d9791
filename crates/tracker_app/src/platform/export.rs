use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracker_core::FeatureCollection;
use tracker_engine::ProfileRow;

/// Column titles of the link profile export.
pub const PROFILE_HEADER: [&str; 4] = [
    "distance from antenna",
    "terrain height",
    "path loss",
    "rsrp",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("target has no file name: {0:?}")]
    NoFileName(PathBuf),
    #[error("cannot serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cannot write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes a results layer as a GeoJSON file.
pub fn write_geojson(target: &Path, collection: &FeatureCollection) -> Result<PathBuf, ExportError> {
    write_json(target, collection)
}

/// Pretty-prints `document` to `target`, replacing any existing file atomically.
pub fn write_json<T: Serialize + ?Sized>(target: &Path, document: &T) -> Result<PathBuf, ExportError> {
    let mut content = serde_json::to_vec_pretty(document)?;
    content.push(b'\n');
    write_atomically(target, &content)
}

/// Writes a link profile as `;`-separated rows under [`PROFILE_HEADER`].
pub fn write_profile_csv(target: &Path, rows: &[ProfileRow]) -> Result<PathBuf, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    writer.write_record(PROFILE_HEADER)?;
    for row in rows {
        writer.write_record([
            row.step.to_string(),
            row.terrain_height.to_string(),
            row.path_loss.to_string(),
            row.rsrp.to_string(),
        ])?;
    }
    let content = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    write_atomically(target, &content)
}

fn write_atomically(target: &Path, content: &[u8]) -> Result<PathBuf, ExportError> {
    if target.file_name().is_none() {
        return Err(ExportError::NoFileName(target.to_path_buf()));
    }

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|err| ExportError::Io(err.error))?;
    Ok(target.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use tracker_core::{Feature, Geometry};

    fn collection() -> FeatureCollection {
        let mut properties = Map::new();
        properties.insert("isLink".to_string(), Value::Bool(true));
        FeatureCollection {
            features: vec![Feature {
                properties,
                geometry: Geometry::LineString {
                    coordinates: vec![[10.0, 59.0], [10.5, 59.5]],
                },
            }],
        }
    }

    #[test]
    fn geojson_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("layers").join("job-1.geojson");

        let written = write_geojson(&target, &collection()).unwrap();

        assert_eq!(written, target);
        let text = fs::read_to_string(&target).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["type"], json!("FeatureCollection"));
        assert_eq!(
            parsed["features"][0]["geometry"],
            json!({ "type": "LineString", "coordinates": [[10.0, 59.0], [10.5, 59.5]] })
        );
        assert_eq!(parsed["features"][0]["properties"]["isLink"], json!(true));
    }

    #[test]
    fn existing_file_is_replaced_and_no_temp_left() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config.json");
        fs::write(&target, "old").unwrap();

        write_json(&target, &json!({ "version": 2 })).unwrap();

        let parsed: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(parsed, json!({ "version": 2 }));
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn directory_target_is_rejected() {
        let result = write_json(Path::new("/"), &json!({}));
        assert!(matches!(result, Err(ExportError::NoFileName(_))));
    }

    #[test]
    fn profile_rows_are_semicolon_separated() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("profile.csv");
        let rows = [
            ProfileRow {
                step: 0,
                terrain_height: 120.0,
                path_loss: 80.5,
                rsrp: -60.0,
            },
            ProfileRow {
                step: 1,
                terrain_height: 118.5,
                path_loss: 95.0,
                rsrp: -75.25,
            },
        ];

        write_profile_csv(&target, &rows).unwrap();

        let text = fs::read_to_string(&target).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "distance from antenna;terrain height;path loss;rsrp",
                "0;120;80.5;-60",
                "1;118.5;95;-75.25",
            ]
        );
    }
}
