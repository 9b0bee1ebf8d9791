mod common;

use std::sync::Arc;

use common::{harness, harness_with, params, record};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tracker_core::{CoordinateConverter, JobId, ProjectionError};
use tracker_engine::{ActionError, RpcError, Route, Toggle, Tracker};

fn two_links() -> Value {
    json!({
        "links": [
            { "Points": [[1000.0, 2000.0, 5.0], [3000.0, 4000.0, 6.0]], "Quality": 0.9 },
            { "Points": [[0.0, 0.0], [10.0, 10.0]], "Quality": 0.4 }
        ]
    })
}

struct Kilometres;

impl CoordinateConverter for Kilometres {
    fn to_geographic(&self, x: f64, y: f64) -> Result<[f64; 2], ProjectionError> {
        Ok([x / 1000.0, y / 1000.0])
    }
}

#[tokio::test]
async fn toggling_shows_then_hides_with_one_request() {
    let h = harness();
    h.server.reply(Route::Results, Some("1"), Ok(two_links()));
    let projector = h.tracker.projector();
    let id = JobId::from(1u64);

    assert_eq!(projector.toggle(&id).await.unwrap(), Toggle::Shown);
    let (name, collection) = h.sink.last().unwrap();
    assert_eq!(name.as_deref(), Some("results-geojson-1"));
    let collection = collection.unwrap();
    assert_eq!(collection.features.len(), 2);
    assert_eq!(collection.features[0].properties["isLink"], json!(true));
    assert_eq!(collection.features[0].properties["Quality"], json!(0.9));

    assert_eq!(projector.toggle(&id).await.unwrap(), Toggle::Hidden);
    assert_eq!(h.sink.last(), Some((None, None)));
    assert_eq!(h.tracker.layer().current(), None);

    let results = h.server.calls_to(Route::Results);
    assert_eq!(results.len(), 1);
    assert!(results[0].api_key_only);
    assert_eq!(results[0].body, Some(json!({ "key": "1" })));
}

#[tokio::test]
async fn coordinates_go_through_the_converter() {
    let h = harness();
    let tracker = Tracker::new(
        h.server.clone(),
        Arc::new(params(Some("key-1"), true)),
        h.sink.clone(),
    )
    .with_converter(Arc::new(Kilometres));
    h.server.reply(Route::Results, None, Ok(two_links()));

    tracker.projector().toggle(&JobId::from(4u64)).await.unwrap();

    let collection = h.sink.last().and_then(|(_, fc)| fc).unwrap();
    let geojson = serde_json::to_value(&collection).unwrap();
    assert_eq!(geojson["type"], json!("FeatureCollection"));
    assert_eq!(geojson["features"][0]["type"], json!("Feature"));
    assert_eq!(geojson["features"][0]["geometry"]["type"], json!("LineString"));
    assert_eq!(
        geojson["features"][0]["geometry"]["coordinates"],
        json!([[1.0, 2.0], [3.0, 4.0]])
    );
}

#[tokio::test]
async fn showing_another_job_replaces_the_layer() {
    let h = harness();
    h.server.reply(Route::Results, None, Ok(two_links()));
    let projector = h.tracker.projector();

    projector.toggle(&JobId::from(1u64)).await.unwrap();
    projector.toggle(&JobId::from(2u64)).await.unwrap();

    assert_eq!(h.tracker.layer().current(), Some(JobId::from(2u64)));
    let names: Vec<_> = h.sink.updates().into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![
            Some("results-geojson-1".to_string()),
            Some("results-geojson-2".to_string())
        ]
    );
}

#[tokio::test]
async fn failed_fetch_leaves_previous_layer() {
    let h = harness();
    h.server.reply(Route::Results, Some("1"), Ok(two_links()));
    h.server.reply(
        Route::Results,
        Some("2"),
        Err(RpcError::Server("no results yet".to_string())),
    );
    let projector = h.tracker.projector();
    projector.toggle(&JobId::from(1u64)).await.unwrap();

    let err = projector.toggle(&JobId::from(2u64)).await.unwrap_err();

    assert_eq!(err, ActionError::Server("no results yet".to_string()));
    assert_eq!(h.tracker.layer().current(), Some(JobId::from(1u64)));
    assert_eq!(h.sink.updates().len(), 1);
    assert_eq!(h.tracker.view().message.as_deref(), Some("no results yet"));
}

#[tokio::test]
async fn malformed_links_are_rejected() {
    let h = harness();
    h.server.reply(
        Route::Results,
        None,
        Ok(json!({ "links": [{ "Points": [[1.0]] }] })),
    );

    let err = h
        .tracker
        .projector()
        .toggle(&JobId::from(3u64))
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Decode(_)));
    assert!(h.sink.updates().is_empty());
}

#[tokio::test]
async fn project_uses_the_job_id() {
    let h = harness_with(params(Some("key-1"), true));
    h.server.jobs(vec![record(9, "Finished", "t0")]);
    h.tracker.controller().reload().await.unwrap();
    h.server.reply(Route::Results, None, Ok(two_links()));

    let job = h.tracker.panel().lock().unwrap().jobs().list()[0].clone();
    let shown = h.tracker.projector().project(&job).await.unwrap();

    assert_eq!(shown, Toggle::Shown);
    assert_eq!(h.tracker.layer().current(), Some(JobId::from(9u64)));
}
