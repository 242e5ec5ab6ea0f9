use std::time::Duration;

use panel_core::{update, AppState, Effect, Msg, ToastKind};

fn notify(state: AppState, title: &str, message: &str, kind: ToastKind) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::Notify {
            title: title.to_string(),
            message: message.to_string(),
            kind,
        },
    )
}

#[test]
fn notify_adds_toast_and_schedules_expiry() {
    let (state, effects) = notify(AppState::new(), "Done", "Saved", ToastKind::Success);
    let view = state.view();

    assert_eq!(view.toasts.len(), 1);
    let toast = &view.toasts[0];
    assert_eq!(toast.title, "Done");
    assert_eq!(toast.message, "Saved");
    assert!(!toast.fading);
    assert_eq!(
        effects,
        vec![Effect::ScheduleToastExpiry {
            id: toast.id,
            after: Duration::from_secs(5),
        }]
    );
}

#[test]
fn expiry_fades_then_removes() {
    let (state, _) = notify(AppState::new(), "Done", "Saved", ToastKind::Success);
    let id = state.view().toasts[0].id;

    let (state, effects) = update(state, Msg::ToastExpired { id });
    assert!(state.view().toasts[0].fading);
    assert_eq!(
        effects,
        vec![Effect::ScheduleToastRemoval {
            id,
            after: Duration::from_millis(500),
        }]
    );

    let (state, effects) = update(state, Msg::ToastFaded { id });
    assert!(effects.is_empty());
    assert_eq!(state.toast_count(), 0);
}

#[test]
fn dismissal_wins_and_later_timers_are_noops() {
    let (state, _) = notify(AppState::new(), "Error", "boom", ToastKind::Danger);
    let id = state.view().toasts[0].id;

    let (state, effects) = update(state, Msg::ToastDismissed { id });
    assert_eq!(effects, vec![Effect::CancelToastTimers { id }]);
    assert_eq!(state.toast_count(), 0);

    let (state, effects) = update(state.clone(), Msg::ToastExpired { id });
    assert!(effects.is_empty());
    let (mut state, effects) = update(state, Msg::ToastDismissed { id });
    assert!(effects.is_empty());
    let _ = state.consume_dirty();
    let (mut state, _) = update(state, Msg::ToastFaded { id });
    assert!(!state.consume_dirty());
}

#[test]
fn toasts_stack_without_cap() {
    let mut state = AppState::new();
    for n in 0..25 {
        let (next, _) = notify(state, "Info", &format!("message {n}"), ToastKind::Info);
        state = next;
    }
    let view = state.view();
    assert_eq!(view.toasts.len(), 25);
    let ids: Vec<_> = view.toasts.iter().map(|toast| toast.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(ids, sorted);
}
