use std::sync::atomic::{AtomicBool, Ordering};

use roomkit_core::{ConfirmAction, ConfirmPrompt, UserListResponder};

/// Responder that logs every view update and answers confirmations itself.
pub struct ConsoleResponder {
    auto_confirm: AtomicBool,
    audio_selected: AtomicBool,
    video_selected: AtomicBool,
}

impl Default for ConsoleResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleResponder {
    pub fn new() -> Self {
        Self {
            auto_confirm: AtomicBool::new(true),
            audio_selected: AtomicBool::new(false),
            video_selected: AtomicBool::new(false),
        }
    }

    pub fn set_auto_confirm(&self, confirm: bool) {
        self.auto_confirm.store(confirm, Ordering::SeqCst);
    }

    /// Current state of the mute-all-audio button.
    pub fn audio_selected(&self) -> bool {
        self.audio_selected.load(Ordering::SeqCst)
    }

    pub fn video_selected(&self) -> bool {
        self.video_selected.load(Ordering::SeqCst)
    }
}

impl UserListResponder for ConsoleResponder {
    fn set_action_buttons_hidden(&self, hidden: bool) {
        tracing::info!("view: action buttons hidden={hidden}");
    }

    fn reload_user_list(&self) {
        tracing::info!("view: reload user list");
    }

    fn show_toast(&self, text: &str) {
        tracing::info!("view: toast \"{text}\"");
    }

    fn set_management_panel_hidden(&self, hidden: bool) {
        tracing::info!("view: management panel hidden={hidden}");
    }

    fn set_mute_all_audio_selected(&self, selected: bool) {
        self.audio_selected.store(selected, Ordering::SeqCst);
        tracing::info!("view: mute-all-audio selected={selected}");
    }

    fn set_mute_all_video_selected(&self, selected: bool) {
        self.video_selected.store(selected, Ordering::SeqCst);
        tracing::info!("view: mute-all-video selected={selected}");
    }

    fn confirm(
        &self,
        prompt: ConfirmPrompt,
        on_confirm: ConfirmAction,
        on_decline: Option<ConfirmAction>,
    ) {
        let accept = self.auto_confirm.load(Ordering::SeqCst);
        tracing::info!(
            "view: confirm \"{}\" ({}) [{}] / [{}] -> {}",
            prompt.title,
            prompt.message,
            prompt.confirm_label,
            prompt.decline_label,
            if accept { "confirm" } else { "decline" }
        );
        if accept {
            on_confirm();
        } else if let Some(on_decline) = on_decline {
            on_decline();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_starts_unselected_and_confirming() {
        let responder = ConsoleResponder::default();
        assert!(!responder.audio_selected());
        assert!(!responder.video_selected());
        assert!(responder.auto_confirm.load(Ordering::SeqCst));

        responder.set_mute_all_audio_selected(true);
        assert!(responder.audio_selected());
    }
}
