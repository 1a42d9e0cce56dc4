//! Roomkit core: the user-list view-model of a conferencing client.
//!
//! Pure Rust crate with no platform dependencies. The conferencing engine,
//! the view and localization are reached through traits; native shells
//! implement them and feed engine notifications into the [`EventBus`].

pub mod controls;
pub mod engine;
pub mod errors;
pub mod events;
pub mod participants;
pub mod permissions;
pub mod responder;
pub mod seat_invite;
pub mod settings;
pub mod store;
pub mod strings;
pub mod user_list;

pub use controls::MuteAllKind;
pub use engine::{RoomEngine, SeatInviteOutcome};
pub use errors::RoomKitError;
pub use events::{
    EngineEvent, EngineEventKey, EventBus, EventChannel, EventObserver, Subscription, UiEvent,
    UiEventKey,
};
pub use participants::{Attendee, Role, RosterSnapshot, SelectedTarget};
pub use responder::{ConfirmAction, ConfirmPrompt, UserListResponder};
pub use seat_invite::InviteDispatch;
pub use settings::{Settings, SettingsStore};
pub use store::{RoomInfo, RoomStore};
pub use strings::{EnglishStrings, Localizer, StringKey, StringTable};
pub use user_list::{RoomServices, UserListCoordinator};
