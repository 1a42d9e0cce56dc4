use std::collections::HashMap;

use crate::errors::RoomKitError;

/// User-facing strings the coordinator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKey {
    SeatInviteSent,
    SeatInviteDeclinedSuffix,
    SeatInviteTimedOut,
    MuteAllAudioTitle,
    MuteAllAudioMessage,
    MuteAllAudioAction,
    UnmuteAllAudioTitle,
    UnmuteAllAudioMessage,
    MuteAllVideoTitle,
    MuteAllVideoMessage,
    MuteAllVideoAction,
    UnmuteAllVideoTitle,
    UnmuteAllVideoMessage,
    ConfirmRelease,
    Cancel,
}

impl StringKey {
    pub const ALL: [StringKey; 15] = [
        StringKey::SeatInviteSent,
        StringKey::SeatInviteDeclinedSuffix,
        StringKey::SeatInviteTimedOut,
        StringKey::MuteAllAudioTitle,
        StringKey::MuteAllAudioMessage,
        StringKey::MuteAllAudioAction,
        StringKey::UnmuteAllAudioTitle,
        StringKey::UnmuteAllAudioMessage,
        StringKey::MuteAllVideoTitle,
        StringKey::MuteAllVideoMessage,
        StringKey::MuteAllVideoAction,
        StringKey::UnmuteAllVideoTitle,
        StringKey::UnmuteAllVideoMessage,
        StringKey::ConfirmRelease,
        StringKey::Cancel,
    ];

    /// Stable identifier used in translation tables.
    pub fn id(self) -> &'static str {
        match self {
            Self::SeatInviteSent => "seat.invite.sent",
            Self::SeatInviteDeclinedSuffix => "seat.invite.declined",
            Self::SeatInviteTimedOut => "seat.invite.timeout",
            Self::MuteAllAudioTitle => "mute_all.audio.title",
            Self::MuteAllAudioMessage => "mute_all.audio.message",
            Self::MuteAllAudioAction => "mute_all.audio.action",
            Self::UnmuteAllAudioTitle => "unmute_all.audio.title",
            Self::UnmuteAllAudioMessage => "unmute_all.audio.message",
            Self::MuteAllVideoTitle => "mute_all.video.title",
            Self::MuteAllVideoMessage => "mute_all.video.message",
            Self::MuteAllVideoAction => "mute_all.video.action",
            Self::UnmuteAllVideoTitle => "unmute_all.video.title",
            Self::UnmuteAllVideoMessage => "unmute_all.video.message",
            Self::ConfirmRelease => "confirm.release",
            Self::Cancel => "cancel",
        }
    }
}

/// Localized string lookup, provided by the host.
pub trait Localizer: Send + Sync {
    fn text(&self, key: StringKey) -> String;
}

/// Built-in English copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishStrings;

impl EnglishStrings {
    fn lookup(key: StringKey) -> &'static str {
        match key {
            StringKey::SeatInviteSent => "Invitation to take a seat sent",
            StringKey::SeatInviteDeclinedSuffix => " declined the invitation to take a seat",
            StringKey::SeatInviteTimedOut => "The invitation to take a seat timed out",
            StringKey::MuteAllAudioTitle => "Mute all members?",
            StringKey::MuteAllAudioMessage => "All current and new members will be muted",
            StringKey::MuteAllAudioAction => "Mute all",
            StringKey::UnmuteAllAudioTitle => "Enable all audio?",
            StringKey::UnmuteAllAudioMessage => "Members will be able to unmute themselves",
            StringKey::MuteAllVideoTitle => "Disable all video?",
            StringKey::MuteAllVideoMessage => {
                "All current and new members will have their cameras disabled"
            }
            StringKey::MuteAllVideoAction => "Disable all video",
            StringKey::UnmuteAllVideoTitle => "Enable all video?",
            StringKey::UnmuteAllVideoMessage => "Members will be able to turn on their cameras",
            StringKey::ConfirmRelease => "Confirm release",
            StringKey::Cancel => "Cancel",
        }
    }
}

impl Localizer for EnglishStrings {
    fn text(&self, key: StringKey) -> String {
        Self::lookup(key).to_string()
    }
}

/// Translation table keyed by [`StringKey::id`], loaded from a flat JSON
/// object. Missing entries fall back to English.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    entries: HashMap<String, String>,
}

impl StringTable {
    pub fn from_json(json: &str) -> Result<Self, RoomKitError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| RoomKitError::Settings(format!("invalid string table: {e}")))?;
        Ok(Self { entries })
    }

    /// Keys the table does not translate.
    pub fn missing_keys(&self) -> Vec<StringKey> {
        StringKey::ALL
            .into_iter()
            .filter(|k| !self.entries.contains_key(k.id()))
            .collect()
    }
}

impl Localizer for StringTable {
    fn text(&self, key: StringKey) -> String {
        match self.entries.get(key.id()) {
            Some(text) => text.clone(),
            None => EnglishStrings.text(key),
        }
    }
}
