use std::time::Duration;

use panel_core::{
    update, AppState, Effect, IpDetails, IpMutation, Modal, Msg, ProxySettings, Reply, ToastKind,
};

fn details() -> IpDetails {
    IpDetails {
        server: "10.0.0.1:8080".to_string(),
        country: "CN".to_string(),
        city: "Hangzhou".to_string(),
        isp: "Aliyun".to_string(),
        score: Some(87.5),
        ping_ms: Some(120.0),
        speed_mbps: Some(2.5),
        updated_at: "2024-03-21 10:00".to_string(),
    }
}

#[test]
fn details_request_trims_server() {
    let (_, effects) = update(
        AppState::new(),
        Msg::ShowIpDetails {
            server: " 10.0.0.1:8080 ".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::FetchIpDetails {
            server: "10.0.0.1:8080".to_string()
        }]
    );
}

#[test]
fn empty_server_is_rejected_locally() {
    let (state, effects) = update(
        AppState::new(),
        Msg::MutateIp {
            mutation: IpMutation::Delete,
            server: "".to_string(),
        },
    );
    assert!(matches!(effects.as_slice(), [Effect::ScheduleToastExpiry { .. }]));
    assert_eq!(state.view().toasts[0].kind, ToastKind::Warning);
}

#[test]
fn details_open_modal_and_errors_toast() {
    let (state, effects) = update(
        AppState::new(),
        Msg::IpDetailsReceived {
            server: "10.0.0.1:8080".to_string(),
            reply: Reply::Accepted(details()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().modal, Some(Modal::IpDetails(details())));

    let (state, _) = update(state, Msg::ModalClosed);
    assert_eq!(state.view().modal, None);

    let (state, _) = update(
        state,
        Msg::IpDetailsReceived {
            server: "x".to_string(),
            reply: Reply::Rejected(None),
        },
    );
    assert_eq!(state.view().toasts[0].message, "Failed to load details");
}

#[test]
fn successful_mutation_reloads_after_short_delay() {
    let (state, effects) = update(
        AppState::new(),
        Msg::IpMutated {
            mutation: IpMutation::Update,
            server: "10.0.0.1:8080".to_string(),
            reply: Reply::Accepted(()),
        },
    );
    assert_eq!(state.view().toasts[0].message, "IP 10.0.0.1:8080 updated");
    assert_eq!(
        effects.last(),
        Some(&Effect::ScheduleReload {
            after: Duration::from_secs(2)
        })
    );
}

#[test]
fn failed_mutation_uses_backend_error_or_fallback() {
    let (state, effects) = update(
        AppState::new(),
        Msg::IpMutated {
            mutation: IpMutation::Delete,
            server: "10.0.0.1:8080".to_string(),
            reply: Reply::Rejected(None),
        },
    );
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().toasts[0].message, "Delete failed");

    let (state, _) = update(
        state,
        Msg::IpMutated {
            mutation: IpMutation::Delete,
            server: "10.0.0.1:8080".to_string(),
            reply: Reply::Unreachable("timeout".to_string()),
        },
    );
    assert!(state.view().toasts[1].message.starts_with("Network request failed"));
    assert!(!state.view().reload_pending);
}

#[test]
fn invalid_settings_never_reach_backend() {
    let settings = ProxySettings {
        min_score: 150,
        ..ProxySettings::default()
    };
    let (state, effects) = update(AppState::new(), Msg::SaveSettings { settings });
    assert!(matches!(effects.as_slice(), [Effect::ScheduleToastExpiry { .. }]));
    let toast = &state.view().toasts[0];
    assert_eq!(toast.kind, ToastKind::Warning);
    assert!(toast.message.contains("min_score"));
}

#[test]
fn settings_round_trip_through_modal() {
    let (state, effects) = update(AppState::new(), Msg::LoadSettings);
    assert_eq!(effects, vec![Effect::FetchSettings]);

    let loaded = ProxySettings::default();
    let (state, _) = update(
        state,
        Msg::SettingsLoaded {
            reply: Reply::Accepted(loaded.clone()),
        },
    );
    assert_eq!(state.view().modal, Some(Modal::Settings(loaded.clone())));

    let (state, effects) = update(
        state,
        Msg::SaveSettings {
            settings: loaded.clone(),
        },
    );
    assert_eq!(effects, vec![Effect::SaveSettings(loaded)]);

    let (state, _) = update(
        state,
        Msg::SettingsSaved {
            reply: Reply::Accepted(()),
        },
    );
    let view = state.view();
    assert_eq!(view.modal, None);
    assert_eq!(view.toasts[0].message, "Proxy settings saved");
}

#[test]
fn settings_save_rejection_keeps_modal_open() {
    let (state, _) = update(
        AppState::new(),
        Msg::SettingsLoaded {
            reply: Reply::Accepted(ProxySettings::default()),
        },
    );
    let (state, _) = update(
        state,
        Msg::SettingsSaved {
            reply: Reply::Rejected(Some("permission denied".to_string())),
        },
    );
    let view = state.view();
    assert!(view.modal.is_some());
    assert_eq!(view.toasts[0].message, "Save failed: permission denied");
}
