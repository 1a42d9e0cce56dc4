//! Scripted user-list session against an in-process engine.
//!
//! Usage: `roomkit-sim [DATA_DIR] [SEAT_INVITE_TIMEOUT_SECS]`
//!
//! Settings are loaded from `DATA_DIR/settings.json`; a timeout given on
//! the command line is persisted there.

mod console;
mod engine;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use roomkit_core::{
    Attendee, EnglishStrings, EventBus, Localizer, Role, RoomInfo, RoomServices, RoomStore,
    SettingsStore, StringTable, UiEvent, UiEventKey, UserListCoordinator,
};
use serde_json::json;

use crate::console::ConsoleResponder;
use crate::engine::{Answer, ScriptedEngine};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("roomkit_core=debug,roomkit_sim=info")
            }),
        )
        .init();
}

fn demo_attendees() -> Vec<Attendee> {
    vec![
        Attendee::new("host", "Hana", Role::RoomOwner),
        Attendee::new("mod", "Milo", Role::Administrator),
        Attendee::new("ana", "Ana", Role::GeneralUser),
        Attendee::new("ben", "Ben", Role::GeneralUser),
        Attendee::new("cy", "Cy", Role::GeneralUser),
        Attendee::new("dee", "Dee", Role::GeneralUser),
    ]
}

/// Strings for the configured language: `DATA_DIR/strings.<lang>.json`
/// when present, English otherwise.
fn load_strings(data_dir: &std::path::Path, language: Option<&str>) -> Arc<dyn Localizer> {
    let Some(lang) = language else {
        return Arc::new(EnglishStrings);
    };
    let path = data_dir.join(format!("strings.{lang}.json"));
    match std::fs::read_to_string(&path).map(|json| StringTable::from_json(&json)) {
        Ok(Ok(table)) => {
            let missing = table.missing_keys();
            if !missing.is_empty() {
                tracing::warn!("{} untranslated string(s) for {lang}", missing.len());
            }
            Arc::new(table)
        }
        Ok(Err(e)) => {
            tracing::warn!("{}: {e}", path.display());
            Arc::new(EnglishStrings)
        }
        Err(_) => Arc::new(EnglishStrings),
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("roomkit-sim"));
    let settings_store = SettingsStore::new(&data_dir);
    if let Some(secs) = args.next() {
        match secs.parse::<f64>() {
            Ok(secs) => settings_store.set_seat_invite_timeout_secs(secs),
            Err(e) => tracing::warn!("ignoring timeout {secs:?}: {e}"),
        }
    }
    let settings = settings_store.get();
    tracing::info!(
        "settings from {}: seat invite timeout {:?}",
        data_dir.display(),
        settings.seat_invite_timeout()
    );

    let attendees = demo_attendees();
    let store = RoomStore::new(
        RoomInfo {
            room_id: "demo-room".into(),
            name: "Weekly sync".into(),
            owner_id: "host".into(),
            ..Default::default()
        },
        attendees[0].clone(),
    );
    store.set_attendees(attendees);

    let bus = EventBus::new();
    let engine = ScriptedEngine::new(bus.clone(), store.clone(), Duration::from_millis(200))
        .with_answer("ana", Answer::Accept)
        .with_answer("ben", Answer::Reject)
        .with_answer("cy", Answer::Ignore)
        .with_answer("dee", Answer::Fail);

    let responder = Arc::new(ConsoleResponder::new());
    let services = RoomServices {
        bus: bus.clone(),
        store: store.clone(),
        engine: Arc::new(engine),
        strings: load_strings(&data_dir, settings.language.as_deref()),
        settings,
    };
    let mut coordinator = UserListCoordinator::new(services, &responder);

    tracing::info!("== seat invitations");
    for (user_id, user_name) in [("ana", "Ana"), ("ben", "Ben"), ("cy", "Cy"), ("dee", "Dee")] {
        coordinator.show_user_management(user_id, user_name);
        let dispatch = coordinator.invite_selected_to_seat();
        tracing::info!("invite {user_id}: {dispatch:?}");
    }
    // Second invite for cy while the first is still outstanding.
    coordinator.show_user_management("cy", "Cy");
    coordinator.invite_selected_to_seat();
    coordinator.settle().await;

    tracing::info!("== mute all");
    coordinator.request_mute_all_audio(responder.audio_selected());
    coordinator.settle().await;
    coordinator.request_mute_all_audio(responder.audio_selected());
    coordinator.settle().await;
    responder.set_auto_confirm(false);
    coordinator.request_mute_all_video(responder.video_selected());
    responder.set_auto_confirm(true);
    coordinator.request_mute_all_video(responder.video_selected());
    coordinator.settle().await;

    tracing::info!("== roster and role changes");
    store.set_attendees(demo_attendees().into_iter().filter(|a| a.user_id != "dee").collect());
    bus.publish_ui(UiEvent::RenewUserList);
    tracing::info!("roster now has {} attendee(s)", coordinator.attendees().len());
    bus.publish_ui_payload(UiEventKey::RoomOwnerChanged, &json!({ "userId": "host" }));
    bus.publish_engine_payload("onAllUserCameraDisableChanged", &json!({ "flag": true }));

    store.set_user_role("host", Role::GeneralUser);
    bus.publish_ui(UiEvent::CurrentUserRoleChanged {
        user_role: Role::GeneralUser,
    });
    coordinator.show_user_management("ana", "Ana");
    coordinator.request_mute_all_audio(responder.audio_selected());
    coordinator.settle().await;

    coordinator.teardown();
    bus.publish_ui(UiEvent::RenewSeatList);
    tracing::info!("session finished");
}
