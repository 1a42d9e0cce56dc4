use std::sync::{Arc, Weak};

use crate::responder::ConfirmPrompt;
use crate::strings::{Localizer, StringKey};
use crate::user_list::{CoordinatorState, UserListCoordinator};

/// Which media the mute-all control acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteAllKind {
    Audio,
    Video,
}

/// Copy for the mute-all confirmation.
///
/// `button_selected` is the control's state when pressed: selected means
/// everyone is already muted, so the prompt offers to release them.
pub fn confirm_prompt(
    kind: MuteAllKind,
    button_selected: bool,
    strings: &dyn Localizer,
) -> ConfirmPrompt {
    let (title, message, confirm) = match (kind, button_selected) {
        (MuteAllKind::Audio, true) => (
            StringKey::UnmuteAllAudioTitle,
            StringKey::UnmuteAllAudioMessage,
            StringKey::ConfirmRelease,
        ),
        (MuteAllKind::Audio, false) => (
            StringKey::MuteAllAudioTitle,
            StringKey::MuteAllAudioMessage,
            StringKey::MuteAllAudioAction,
        ),
        (MuteAllKind::Video, true) => (
            StringKey::UnmuteAllVideoTitle,
            StringKey::UnmuteAllVideoMessage,
            StringKey::ConfirmRelease,
        ),
        (MuteAllKind::Video, false) => (
            StringKey::MuteAllVideoTitle,
            StringKey::MuteAllVideoMessage,
            StringKey::MuteAllVideoAction,
        ),
    };
    ConfirmPrompt {
        title: strings.text(title),
        message: strings.text(message),
        confirm_label: strings.text(confirm),
        decline_label: strings.text(StringKey::Cancel),
    }
}

impl UserListCoordinator {
    /// The operator pressed the mute-all-audio control.
    pub fn request_mute_all_audio(&self, button_selected: bool) {
        self.request_mute_all(MuteAllKind::Audio, button_selected);
    }

    /// The operator pressed the mute-all-video control.
    pub fn request_mute_all_video(&self, button_selected: bool) {
        self.request_mute_all(MuteAllKind::Video, button_selected);
    }

    /// Ask the operator to confirm, then flip the room-wide mute.
    ///
    /// Only engine failures produce feedback; success is reflected later
    /// by the engine's own disable-changed push.
    pub fn request_mute_all(&self, kind: MuteAllKind, button_selected: bool) {
        let Some(responder) = self.state.responder() else {
            return;
        };
        let prompt = confirm_prompt(kind, button_selected, self.state.services.strings.as_ref());
        let weak = Arc::downgrade(&self.state);
        let mute = !button_selected;
        responder.confirm(
            prompt,
            Box::new(move || apply_mute_all(weak, kind, mute)),
            None,
        );
    }
}

fn apply_mute_all(state: Weak<CoordinatorState>, kind: MuteAllKind, mute: bool) {
    let Some(this) = state.upgrade().filter(|s| s.is_active()) else {
        return;
    };
    tracing::info!("mute all {kind:?}: mute={mute}");
    let request = match kind {
        MuteAllKind::Audio => this.services.engine.set_all_audio_muted(mute),
        MuteAllKind::Video => this.services.engine.set_all_video_muted(mute),
    };
    this.spawn(async move {
        match request.await {
            Ok(()) => tracing::debug!("mute all {kind:?} applied"),
            Err(e) => {
                tracing::warn!("mute all {kind:?} failed: {e}");
                if let Some(this) = state.upgrade() {
                    this.toast(&e.user_message());
                }
            }
        }
    });
}
