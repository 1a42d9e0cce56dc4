use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::errors::RoomKitError;

/// Terminal outcome of one seat invitation.
///
/// The engine resolves each request exactly once, so the variants are
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatInviteOutcome {
    Accepted {
        request_id: String,
        user_id: String,
    },
    Rejected {
        request_id: String,
        user_id: String,
        message: String,
    },
    TimedOut {
        request_id: String,
        user_id: String,
    },
    Errored {
        request_id: String,
        user_id: String,
        code: i32,
        message: String,
    },
}

impl SeatInviteOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            Self::Accepted { user_id, .. }
            | Self::Rejected { user_id, .. }
            | Self::TimedOut { user_id, .. }
            | Self::Errored { user_id, .. } => user_id,
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            Self::Accepted { request_id, .. }
            | Self::Rejected { request_id, .. }
            | Self::TimedOut { request_id, .. }
            | Self::Errored { request_id, .. } => request_id,
        }
    }
}

/// Moderation actions of the conferencing engine.
///
/// Calls return immediately; the returned futures resolve when the engine
/// reports back. Timeout detection belongs to the engine.
pub trait RoomEngine: Send + Sync {
    /// Disable (`true`) or re-enable (`false`) every attendee's microphone.
    fn set_all_audio_muted(&self, mute: bool) -> BoxFuture<'static, Result<(), RoomKitError>>;

    /// Disable (`true`) or re-enable (`false`) every attendee's camera.
    fn set_all_video_muted(&self, mute: bool) -> BoxFuture<'static, Result<(), RoomKitError>>;

    /// Ask `user_id` to take a seat. The engine surfaces
    /// [`SeatInviteOutcome::TimedOut`] once `timeout` elapses without an answer.
    fn invite_to_seat(
        &self,
        user_id: &str,
        timeout: Duration,
    ) -> BoxFuture<'static, SeatInviteOutcome>;
}
