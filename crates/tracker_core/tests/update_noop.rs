use tracker_core::{update, Msg, PanelState};

#[test]
fn update_is_noop() {
    let state = PanelState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn failed_status_check_leaves_state_untouched() {
    let (state, _) = update(
        PanelState::new(),
        Msg::JobsReloaded(vec![tracker_core::Job::new(
            "1",
            tracker_core::JobStatus::Running,
            "t0",
        )]),
    );
    let (next, effects) = update(
        state.clone(),
        Msg::StatusCheckFailed {
            id: "1".into(),
            reason: "connection reset".to_string(),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
