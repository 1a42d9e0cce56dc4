use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde_json::Value;

use crate::participants::Role;

/// Keys of the application-level (UI domain) channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKey {
    CurrentUserRoleChanged,
    RenewUserList,
    RenewSeatList,
    RoomOwnerChanged,
}

/// Events published on the UI-domain channel by the room service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The local user's role changed.
    CurrentUserRoleChanged { user_role: Role },
    /// The store's attendee list was rebuilt.
    RenewUserList,
    /// The store's seat list was rebuilt.
    RenewSeatList,
    /// Ownership moved. Shells that do not report the new owner still
    /// deliver the event.
    RoomOwnerChanged { owner_id: Option<String> },
}

impl UiEvent {
    /// Decode an untyped payload as delivered by a native shell.
    ///
    /// Returns `None` when an expected field is missing or has the wrong type.
    pub fn from_payload(key: UiEventKey, payload: &Value) -> Option<Self> {
        match key {
            UiEventKey::CurrentUserRoleChanged => {
                let user_role = serde_json::from_value(payload.get("userRole")?.clone()).ok()?;
                Some(Self::CurrentUserRoleChanged { user_role })
            }
            UiEventKey::RenewUserList => Some(Self::RenewUserList),
            UiEventKey::RenewSeatList => Some(Self::RenewSeatList),
            UiEventKey::RoomOwnerChanged => {
                let owner_id = payload
                    .get("userId")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(Self::RoomOwnerChanged { owner_id })
            }
        }
    }
}

/// Keys of the SDK-level (engine domain) channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEventKey {
    AllUserMicrophoneDisableChanged,
    AllUserCameraDisableChanged,
}

impl EngineEventKey {
    /// Name the engine SDK uses for this notification.
    pub fn name(self) -> &'static str {
        match self {
            Self::AllUserMicrophoneDisableChanged => "onAllUserMicrophoneDisableChanged",
            Self::AllUserCameraDisableChanged => "onAllUserCameraDisableChanged",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "onAllUserMicrophoneDisableChanged" => Some(Self::AllUserMicrophoneDisableChanged),
            "onAllUserCameraDisableChanged" => Some(Self::AllUserCameraDisableChanged),
            _ => None,
        }
    }
}

/// State-change notifications pushed by the conferencing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AllUserMicrophoneDisableChanged { disabled: bool },
    AllUserCameraDisableChanged { disabled: bool },
}

impl EngineEvent {
    /// Decode a raw engine notification. Unknown names and payloads
    /// without an `isDisable` boolean yield `None`.
    pub fn from_payload(name: &str, payload: &Value) -> Option<Self> {
        let key = EngineEventKey::from_name(name)?;
        let disabled = payload.get("isDisable")?.as_bool()?;
        Some(match key {
            EngineEventKey::AllUserMicrophoneDisableChanged => {
                Self::AllUserMicrophoneDisableChanged { disabled }
            }
            EngineEventKey::AllUserCameraDisableChanged => {
                Self::AllUserCameraDisableChanged { disabled }
            }
        })
    }
}

/// An event type that can travel on an [`EventChannel`].
pub trait BusEvent: Clone + Debug + Send + Sync + 'static {
    type Key: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;
}

impl BusEvent for UiEvent {
    type Key = UiEventKey;

    fn key(&self) -> UiEventKey {
        match self {
            Self::CurrentUserRoleChanged { .. } => UiEventKey::CurrentUserRoleChanged,
            Self::RenewUserList => UiEventKey::RenewUserList,
            Self::RenewSeatList => UiEventKey::RenewSeatList,
            Self::RoomOwnerChanged { .. } => UiEventKey::RoomOwnerChanged,
        }
    }
}

impl BusEvent for EngineEvent {
    type Key = EngineEventKey;

    fn key(&self) -> EngineEventKey {
        match self {
            Self::AllUserMicrophoneDisableChanged { .. } => {
                EngineEventKey::AllUserMicrophoneDisableChanged
            }
            Self::AllUserCameraDisableChanged { .. } => EngineEventKey::AllUserCameraDisableChanged,
        }
    }
}

/// Trait for receiving events from a channel.
/// Implementations must be Send + Sync (publishers may live on any thread).
pub trait EventObserver<E>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// Handle for one (key, observer) registration. Pass it back to
/// [`EventChannel::unsubscribe`] to remove the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription<K> {
    id: u64,
    key: K,
}

impl<K: Copy> Subscription<K> {
    pub fn key(&self) -> K {
        self.key
    }
}

struct Registration<E: BusEvent> {
    id: u64,
    key: E::Key,
    observer: Weak<dyn EventObserver<E>>,
}

/// One publish/subscribe channel.
///
/// Observers are held weakly: the channel never keeps an observer alive,
/// and registrations whose observer was dropped are skipped and pruned.
/// Dispatch is synchronous on the publisher's thread.
pub struct EventChannel<E: BusEvent> {
    registrations: Arc<RwLock<Vec<Registration<E>>>>,
    next_id: Arc<AtomicU64>,
}

impl<E: BusEvent> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            registrations: self.registrations.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<E: BusEvent> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> EventChannel<E> {
    pub fn new() -> Self {
        Self {
            registrations: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register `observer` for `key`.
    ///
    /// Subscribing the same observer to the same key again returns the
    /// existing handle instead of adding a second registration.
    pub fn subscribe(
        &self,
        key: E::Key,
        observer: Weak<dyn EventObserver<E>>,
    ) -> Subscription<E::Key> {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registrations.retain(|r| r.observer.strong_count() > 0);

        if let Some(existing) = registrations
            .iter()
            .find(|r| r.key == key && Weak::ptr_eq(&r.observer, &observer))
        {
            return Subscription {
                id: existing.id,
                key,
            };
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        registrations.push(Registration { id, key, observer });
        tracing::debug!("subscribed to {key:?} (id={id})");
        Subscription { id, key }
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: &Subscription<E::Key>) -> bool {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = registrations.len();
        registrations.retain(|r| r.id != subscription.id);
        let removed = registrations.len() != before;
        if removed {
            tracing::debug!(
                "unsubscribed from {:?} (id={})",
                subscription.key,
                subscription.id
            );
        }
        removed
    }

    /// Deliver `event` to every live observer registered for its key.
    pub fn publish(&self, event: E) {
        let key = event.key();
        // Observers run after the lock is released so they may
        // subscribe or unsubscribe from inside `on_event`.
        let observers: Vec<Arc<dyn EventObserver<E>>> = {
            let registrations = self
                .registrations
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            registrations
                .iter()
                .filter(|r| r.key == key)
                .filter_map(|r| r.observer.upgrade())
                .collect()
        };
        tracing::debug!("dispatching {key:?} to {} observer(s)", observers.len());
        for observer in observers {
            observer.on_event(&event);
        }
    }

    /// Number of live registrations for `key`.
    pub fn subscriber_count(&self, key: E::Key) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.key == key && r.observer.strong_count() > 0)
            .count()
    }
}

/// Process-wide event bus with independent UI and engine channels.
#[derive(Clone, Default)]
pub struct EventBus {
    ui: EventChannel<UiEvent>,
    engine: EventChannel<EngineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ui(&self) -> &EventChannel<UiEvent> {
        &self.ui
    }

    pub fn engine(&self) -> &EventChannel<EngineEvent> {
        &self.engine
    }

    pub fn publish_ui(&self, event: UiEvent) {
        self.ui.publish(event);
    }

    pub fn publish_engine(&self, event: EngineEvent) {
        self.engine.publish(event);
    }

    /// Publish a raw engine notification. Payloads that do not decode are
    /// dropped without reaching any observer.
    pub fn publish_engine_payload(&self, name: &str, payload: &Value) {
        match EngineEvent::from_payload(name, payload) {
            Some(event) => self.engine.publish(event),
            None => tracing::debug!("dropping undecodable engine event {name}: {payload}"),
        }
    }

    /// Publish a raw UI notification; see [`UiEvent::from_payload`].
    pub fn publish_ui_payload(&self, key: UiEventKey, payload: &Value) {
        match UiEvent::from_payload(key, payload) {
            Some(event) => self.ui.publish(event),
            None => tracing::debug!("dropping undecodable ui event {key:?}: {payload}"),
        }
    }
}
