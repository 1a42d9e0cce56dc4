/// Callback run when the operator answers a confirmation prompt.
pub type ConfirmAction = Box<dyn FnOnce() + Send + 'static>;

/// Copy shown by a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub decline_label: String,
}

/// Outcome sink implemented by the user-list UI.
///
/// The coordinator only ever talks to the view through this trait.
pub trait UserListResponder: Send + Sync {
    /// Show or hide the moderation buttons (mute all, invite).
    fn set_action_buttons_hidden(&self, hidden: bool);

    fn reload_user_list(&self);

    fn show_toast(&self, text: &str);

    fn set_management_panel_hidden(&self, hidden: bool);

    fn set_mute_all_audio_selected(&self, selected: bool);

    fn set_mute_all_video_selected(&self, selected: bool);

    /// Present a confirmation dialog. Exactly one of the actions is run
    /// when the operator answers; `on_decline` may be absent.
    fn confirm(
        &self,
        prompt: ConfirmPrompt,
        on_confirm: ConfirmAction,
        on_decline: Option<ConfirmAction>,
    );
}
