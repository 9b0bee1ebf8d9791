mod common;

use common::{harness, harness_with, params};
use pretty_assertions::assert_eq;
use serde_json::json;
use tracker_engine::{ActionError, BlockReason, Route, RpcError, SinglePointRequest};

fn request() -> SinglePointRequest {
    SinglePointRequest::new(json!({ "id": "bs-1", "height": 30 }), [597000.0, 6643000.0])
}

#[tokio::test]
async fn profile_is_returned_and_job_list_untouched() {
    let h = harness();
    h.server.reply(
        Route::SinglePoint,
        None,
        Ok(json!({
            "distance": 420,
            "loss": [70.0, 88.5],
            "rsrp": [-55.0, -81.25],
            "vector": [{ "z": 101.0 }, { "z": 96.5 }]
        })),
    );

    let profile = h.tracker.single_point().calculate(&request()).await.unwrap();

    assert_eq!(profile.rows().len(), 2);
    assert_eq!(profile.final_rsrp(), Some(-81.25));
    assert!(h.tracker.view().jobs.is_empty());
    assert!(!h.tracker.view().busy);

    let calls = h.server.calls_to(Route::SinglePoint);
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].api_key_only);
    assert_eq!(
        calls[0].body,
        Some(json!({
            "baseStation": { "id": "bs-1", "height": 30 },
            "targetCoordinates": [597000.0, 6643000.0]
        }))
    );
}

#[tokio::test]
async fn server_error_comes_back_as_message() {
    let h = harness();
    h.server.reply(
        Route::SinglePoint,
        None,
        Err(RpcError::Server("target outside coverage".to_string())),
    );

    let err = h.tracker.single_point().calculate(&request()).await.unwrap_err();

    assert_eq!(err, ActionError::Server("target outside coverage".to_string()));
}

#[tokio::test]
async fn blocked_without_key_or_with_invalid_parameters() {
    for (params, reason) in [
        (params(None, true), BlockReason::MissingApiKey),
        (params(Some("key-1"), false), BlockReason::InvalidParameters),
    ] {
        let h = harness_with(params);
        let err = h.tracker.single_point().calculate(&request()).await.unwrap_err();
        assert_eq!(err, ActionError::Blocked(reason));
        assert!(h.server.calls().is_empty());
    }
}
