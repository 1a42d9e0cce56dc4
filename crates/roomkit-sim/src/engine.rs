use std::collections::HashMap;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use roomkit_core::{
    EngineEventKey, EventBus, Role, RoomEngine, RoomKitError, RoomStore, SeatInviteOutcome,
    UiEvent,
};
use serde_json::json;
use uuid::Uuid;

/// How a simulated attendee answers a seat invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Accept,
    Reject,
    /// Never answers; the engine reports a timeout.
    Ignore,
    /// The engine fails the request.
    Fail,
}

/// In-process stand-in for the conferencing engine.
///
/// Keeps the store's pending-invitation set and room flags up to date and
/// publishes the same notifications a real SDK would.
pub struct ScriptedEngine {
    bus: EventBus,
    store: RoomStore,
    answers: HashMap<String, Answer>,
    answer_delay: Duration,
}

impl ScriptedEngine {
    pub fn new(bus: EventBus, store: RoomStore, answer_delay: Duration) -> Self {
        Self {
            bus,
            store,
            answers: HashMap::new(),
            answer_delay,
        }
    }

    pub fn with_answer(mut self, user_id: &str, answer: Answer) -> Self {
        self.answers.insert(user_id.to_string(), answer);
        self
    }

    fn apply_mute(
        &self,
        key: EngineEventKey,
        mute: bool,
    ) -> BoxFuture<'static, Result<(), RoomKitError>> {
        let bus = self.bus.clone();
        let store = self.store.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if store.current_user().user_role == Role::GeneralUser {
                return Err(RoomKitError::Engine {
                    code: -2300,
                    message: "Only the host or an administrator can do that".into(),
                });
            }

            let mut info = store.room_info();
            match key {
                EngineEventKey::AllUserMicrophoneDisableChanged => {
                    info.microphone_disabled_for_all = mute;
                }
                EngineEventKey::AllUserCameraDisableChanged => info.camera_disabled_for_all = mute,
            }
            store.set_room_info(info);
            bus.publish_engine_payload(key.name(), &json!({ "isDisable": mute }));
            Ok(())
        }
        .boxed()
    }
}

impl RoomEngine for ScriptedEngine {
    fn set_all_audio_muted(&self, mute: bool) -> BoxFuture<'static, Result<(), RoomKitError>> {
        self.apply_mute(EngineEventKey::AllUserMicrophoneDisableChanged, mute)
    }

    fn set_all_video_muted(&self, mute: bool) -> BoxFuture<'static, Result<(), RoomKitError>> {
        self.apply_mute(EngineEventKey::AllUserCameraDisableChanged, mute)
    }

    fn invite_to_seat(
        &self,
        user_id: &str,
        timeout: Duration,
    ) -> BoxFuture<'static, SeatInviteOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let user_id = user_id.to_string();
        let answer = self.answers.get(&user_id).copied().unwrap_or(Answer::Ignore);
        let delay = self.answer_delay;
        let bus = self.bus.clone();
        let store = self.store.clone();

        store.insert_pending_invitation(&user_id);
        tracing::debug!("engine: seat request {request_id} for {user_id}");

        async move {
            let reply = async move {
                if answer == Answer::Ignore {
                    std::future::pending::<()>().await;
                }
                tokio::time::sleep(delay).await;
                answer
            };
            let outcome = match tokio::time::timeout(timeout, reply).await {
                Ok(Answer::Accept) => SeatInviteOutcome::Accepted {
                    request_id,
                    user_id: user_id.clone(),
                },
                Ok(Answer::Reject) => SeatInviteOutcome::Rejected {
                    request_id,
                    user_id: user_id.clone(),
                    message: "not now".into(),
                },
                Ok(Answer::Fail) => SeatInviteOutcome::Errored {
                    request_id,
                    user_id: user_id.clone(),
                    code: -2344,
                    message: format!("No free seat for {user_id}"),
                },
                Ok(Answer::Ignore) | Err(_) => SeatInviteOutcome::TimedOut {
                    request_id,
                    user_id: user_id.clone(),
                },
            };

            store.remove_pending_invitation(&user_id);
            if matches!(outcome, SeatInviteOutcome::Accepted { .. }) {
                bus.publish_ui(UiEvent::RenewSeatList);
            }
            outcome
        }
        .boxed()
    }
}
