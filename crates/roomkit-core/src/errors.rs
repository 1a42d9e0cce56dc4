use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomKitError {
    #[error("engine error {code}: {message}")]
    Engine { code: i32, message: String },
    #[error("settings error: {0}")]
    Settings(String),
}

impl RoomKitError {
    /// Text suitable for a toast: engine failures surface the engine's
    /// own message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Engine { message, .. } => message.clone(),
            Self::Settings(msg) => msg.clone(),
        }
    }
}
