use panel_core::{update, AppState, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn reload_due_only_requests_reload() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::ReloadDue);

    assert_eq!(state, next);
    assert_eq!(effects, vec![panel_core::Effect::Reload]);
}
