use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::task::JoinHandle;

use crate::engine::RoomEngine;
use crate::events::{
    EngineEvent, EngineEventKey, EventBus, EventObserver, Subscription, UiEvent, UiEventKey,
};
use crate::participants::{Attendee, RosterSnapshot, SelectedTarget};
use crate::permissions;
use crate::responder::UserListResponder;
use crate::settings::Settings;
use crate::store::{RoomInfo, RoomStore};
use crate::strings::{Localizer, StringKey};

const UI_KEYS: [UiEventKey; 4] = [
    UiEventKey::CurrentUserRoleChanged,
    UiEventKey::RenewUserList,
    UiEventKey::RenewSeatList,
    UiEventKey::RoomOwnerChanged,
];

const ENGINE_KEYS: [EngineEventKey; 2] = [
    EngineEventKey::AllUserMicrophoneDisableChanged,
    EngineEventKey::AllUserCameraDisableChanged,
];

/// Collaborators a coordinator is wired to.
#[derive(Clone)]
pub struct RoomServices {
    pub bus: EventBus,
    pub store: RoomStore,
    pub engine: Arc<dyn RoomEngine>,
    pub strings: Arc<dyn Localizer>,
    pub settings: Settings,
}

/// State shared between the coordinator, its bus registrations and its
/// in-flight engine continuations. Everything outside the coordinator
/// holds it weakly.
pub(crate) struct CoordinatorState {
    pub(crate) services: RoomServices,
    responder: Weak<dyn UserListResponder>,
    roster: Mutex<RosterSnapshot>,
    selected: Mutex<Option<SelectedTarget>>,
    active: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl CoordinatorState {
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The view, if it is still alive and the coordinator not torn down.
    pub(crate) fn responder(&self) -> Option<Arc<dyn UserListResponder>> {
        if !self.is_active() {
            return None;
        }
        self.responder.upgrade()
    }

    pub(crate) fn text(&self, key: StringKey) -> String {
        self.services.strings.text(key)
    }

    pub(crate) fn toast(&self, text: &str) {
        if let Some(responder) = self.responder() {
            responder.show_toast(text);
        }
    }

    pub(crate) fn roster(&self) -> MutexGuard<'_, RosterSnapshot> {
        lock(&self.roster)
    }

    pub(crate) fn selected(&self) -> Option<SelectedTarget> {
        lock(&self.selected).clone()
    }

    /// Run an engine continuation on the ambient tokio runtime and keep
    /// its handle so teardown can cancel it.
    pub(crate) fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(rt) => rt.spawn(fut),
            Err(e) => {
                tracing::warn!("no runtime to drive engine request: {e}");
                return;
            }
        };
        let mut tasks = lock(&self.tasks);
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    fn sync_roster(&self) {
        let attendees = self.services.store.attendee_list();
        tracing::debug!("roster synced: {} attendee(s)", attendees.len());
        self.roster().replace_all(attendees);
    }

    fn reload(&self) {
        if let Some(responder) = self.responder() {
            responder.reload_user_list();
        }
    }
}

impl EventObserver<UiEvent> for CoordinatorState {
    fn on_event(&self, event: &UiEvent) {
        if !self.is_active() {
            return;
        }
        match event {
            UiEvent::RenewUserList | UiEvent::RenewSeatList => {
                self.sync_roster();
                self.reload();
            }
            UiEvent::RoomOwnerChanged { owner_id } => {
                tracing::info!("room owner changed to {owner_id:?}");
                self.reload();
            }
            UiEvent::CurrentUserRoleChanged { user_role } => {
                if let Some(responder) = self.responder() {
                    responder.set_action_buttons_hidden(user_role.is_lowest_privilege());
                }
            }
        }
    }
}

impl EventObserver<EngineEvent> for CoordinatorState {
    fn on_event(&self, event: &EngineEvent) {
        let Some(responder) = self.responder() else {
            return;
        };
        match *event {
            EngineEvent::AllUserMicrophoneDisableChanged { disabled } => {
                responder.set_mute_all_audio_selected(disabled);
            }
            EngineEvent::AllUserCameraDisableChanged { disabled } => {
                responder.set_mute_all_video_selected(disabled);
            }
        }
    }
}

/// View-model behind the user list.
///
/// Keeps a local roster in step with the shared store, forwards engine
/// moderation pushes to the view, and runs the mute-all and seat
/// invitation workflows (see `controls` and `seat_invite`).
/// Dropping the coordinator tears it down.
pub struct UserListCoordinator {
    pub(crate) state: Arc<CoordinatorState>,
    ui_subscriptions: Vec<Subscription<UiEventKey>>,
    engine_subscriptions: Vec<Subscription<EngineEventKey>>,
}

impl UserListCoordinator {
    pub fn new<R>(services: RoomServices, responder: &Arc<R>) -> Self
    where
        R: UserListResponder + 'static,
    {
        let responder: Weak<R> = Arc::downgrade(responder);
        Self::with_responder(services, responder)
    }

    /// Build a coordinator reporting to `responder`, which may already be
    /// gone (calls are then skipped).
    pub fn with_responder(services: RoomServices, responder: Weak<dyn UserListResponder>) -> Self {
        let roster = RosterSnapshot::from_attendees(services.store.attendee_list());
        let bus = services.bus.clone();
        let state = Arc::new(CoordinatorState {
            services,
            responder,
            roster: Mutex::new(roster),
            selected: Mutex::new(None),
            active: AtomicBool::new(true),
            tasks: Mutex::new(Vec::new()),
        });

        let weak: Weak<CoordinatorState> = Arc::downgrade(&state);
        let ui_observer: Weak<dyn EventObserver<UiEvent>> = weak.clone();
        let engine_observer: Weak<dyn EventObserver<EngineEvent>> = weak;
        let ui_subscriptions = UI_KEYS
            .iter()
            .map(|key| bus.ui().subscribe(*key, ui_observer.clone()))
            .collect();
        let engine_subscriptions = ENGINE_KEYS
            .iter()
            .map(|key| bus.engine().subscribe(*key, engine_observer.clone()))
            .collect();

        tracing::info!(
            "user list coordinator ready with {} attendee(s)",
            state.roster().len()
        );
        Self {
            state,
            ui_subscriptions,
            engine_subscriptions,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Copy of the local roster.
    pub fn roster(&self) -> RosterSnapshot {
        self.state.roster().clone()
    }

    pub fn attendees(&self) -> Vec<Attendee> {
        self.state.roster().attendees().to_vec()
    }

    /// Always read through to the store.
    pub fn current_user(&self) -> Attendee {
        self.state.services.store.current_user()
    }

    pub fn room_info(&self) -> RoomInfo {
        self.state.services.store.room_info()
    }

    pub fn selected_target(&self) -> Option<SelectedTarget> {
        self.state.selected()
    }

    pub fn can_open_management_view(&self, target_id: &str) -> bool {
        let actor = self.current_user();
        permissions::can_open_management_view(&actor, target_id, &self.state.roster())
    }

    pub fn can_invite(&self, target: &Attendee) -> bool {
        permissions::can_invite(&self.current_user(), target)
    }

    /// Remember `user_id` as the target of the next management action and
    /// open the management panel if the local user may act on them.
    pub fn show_user_management(&self, user_id: &str, user_name: &str) {
        if !self.is_active() {
            return;
        }
        *lock(&self.state.selected) = Some(SelectedTarget {
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        });
        if !self.can_open_management_view(user_id) {
            tracing::debug!("management panel not allowed for {user_id}");
            return;
        }
        if let Some(responder) = self.state.responder() {
            responder.set_management_panel_hidden(false);
        }
    }

    /// Wait for every in-flight engine request started by this coordinator.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = lock(&self.state.tasks).drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!("engine continuation failed: {e}");
                }
            }
        }
    }

    /// Remove every bus registration and cancel in-flight engine requests.
    /// Safe to call more than once.
    pub fn teardown(&mut self) {
        if !self.state.active.swap(false, Ordering::AcqRel) {
            return;
        }
        let bus = &self.state.services.bus;
        for sub in self.ui_subscriptions.drain(..) {
            bus.ui().unsubscribe(&sub);
        }
        for sub in self.engine_subscriptions.drain(..) {
            bus.engine().unsubscribe(&sub);
        }
        for handle in lock(&self.state.tasks).drain(..) {
            handle.abort();
        }
        tracing::info!("user list coordinator torn down");
    }
}

impl Drop for UserListCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::test_support::{ViewCall, harness, roster};
    use super::*;
    use crate::participants::Role;

    fn total_subscriptions(bus: &EventBus) -> usize {
        UI_KEYS
            .iter()
            .map(|k| bus.ui().subscriber_count(*k))
            .sum::<usize>()
            + ENGINE_KEYS
                .iter()
                .map(|k| bus.engine().subscriber_count(*k))
                .sum::<usize>()
    }

    #[test]
    fn construction_copies_store_roster_without_reload() {
        let h = harness("owner");
        assert_eq!(h.coordinator.attendees(), roster());
        assert!(h.responder.calls().is_empty());
    }

    #[test]
    fn construction_registers_one_subscription_per_key() {
        let h = harness("owner");
        for key in UI_KEYS {
            assert_eq!(h.bus.ui().subscriber_count(key), 1, "{key:?}");
        }
        for key in ENGINE_KEYS {
            assert_eq!(h.bus.engine().subscriber_count(key), 1, "{key:?}");
        }
        assert_eq!(total_subscriptions(&h.bus), 6);
    }

    #[test]
    fn renew_events_replace_roster_and_reload() {
        let h = harness("owner");

        h.store.set_attendees(vec![Attendee::new("owner", "Olivia", Role::RoomOwner)]);
        h.bus.publish_ui(UiEvent::RenewUserList);
        assert_eq!(h.coordinator.attendees().len(), 1);

        h.store.set_attendees(vec![
            Attendee::new("carol", "Carol", Role::GeneralUser),
            Attendee::new("owner", "Olivia", Role::RoomOwner),
        ]);
        h.bus.publish_ui(UiEvent::RenewSeatList);
        let ids: Vec<_> = h
            .coordinator
            .attendees()
            .into_iter()
            .map(|a| a.user_id)
            .collect();
        assert_eq!(ids, vec!["carol", "owner"]);

        assert_eq!(h.responder.calls(), vec![ViewCall::Reload, ViewCall::Reload]);
    }

    #[test]
    fn owner_change_reloads_without_resync() {
        let h = harness("owner");
        h.store.set_attendees(Vec::new());
        h.bus.publish_ui(UiEvent::RoomOwnerChanged {
            owner_id: Some("admin".into()),
        });
        assert_eq!(h.coordinator.attendees(), roster());
        assert_eq!(h.responder.calls(), vec![ViewCall::Reload]);
    }

    #[test]
    fn role_change_toggles_action_buttons() {
        let h = harness("admin");
        h.bus.publish_ui(UiEvent::CurrentUserRoleChanged {
            user_role: Role::GeneralUser,
        });
        h.bus.publish_ui(UiEvent::CurrentUserRoleChanged {
            user_role: Role::Administrator,
        });
        assert_eq!(
            h.responder.calls(),
            vec![
                ViewCall::ActionButtonsHidden(true),
                ViewCall::ActionButtonsHidden(false)
            ]
        );
        assert_eq!(h.coordinator.attendees(), roster());
    }

    #[test]
    fn engine_pushes_forward_button_state() {
        let h = harness("owner");
        h.bus
            .publish_engine(EngineEvent::AllUserMicrophoneDisableChanged { disabled: true });
        h.bus.publish_engine_payload(
            "onAllUserCameraDisableChanged",
            &json!({"isDisable": false}),
        );
        assert_eq!(
            h.responder.calls(),
            vec![ViewCall::AudioSelected(true), ViewCall::VideoSelected(false)]
        );
    }

    #[test]
    fn malformed_engine_payloads_reach_nobody() {
        let h = harness("owner");
        h.bus
            .publish_engine_payload("onAllUserMicrophoneDisableChanged", &json!({}));
        h.bus.publish_engine_payload(
            "onAllUserCameraDisableChanged",
            &json!({"isDisable": 1}),
        );
        h.bus
            .publish_ui_payload(UiEventKey::CurrentUserRoleChanged, &json!({"role": "x"}));
        assert!(h.responder.calls().is_empty());
    }

    #[test]
    fn owner_change_without_owner_id_still_reloads() {
        let h = harness("owner");
        h.bus.publish_ui_payload(UiEventKey::RoomOwnerChanged, &json!({}));
        assert_eq!(h.responder.calls(), vec![ViewCall::Reload]);
    }

    #[test]
    fn current_user_reads_through_to_store() {
        let h = harness("admin");
        assert_eq!(h.coordinator.current_user().user_role, Role::Administrator);
        h.store.set_user_role("admin", Role::RoomOwner);
        assert_eq!(h.coordinator.current_user().user_role, Role::RoomOwner);
        assert_eq!(h.coordinator.room_info().room_id, "room-1");
    }

    #[test]
    fn management_panel_opens_only_for_eligible_targets() {
        let h = harness("admin");

        h.coordinator.show_user_management("owner", "Olivia");
        h.coordinator.show_user_management("admin", "Adam");
        h.coordinator.show_user_management("ghost", "Nobody");
        assert!(h.responder.calls().is_empty());

        h.coordinator.show_user_management("alice", "Alice");
        assert_eq!(
            h.responder.calls(),
            vec![ViewCall::ManagementPanelHidden(false)]
        );
        assert_eq!(h.coordinator.selected_target().unwrap().user_id, "alice");
    }

    #[test]
    fn eligibility_follows_current_role() {
        let h = harness("admin");
        let bob = h.coordinator.roster().attendee("bob").cloned().unwrap();
        let owner = h.coordinator.roster().attendee("owner").cloned().unwrap();
        assert!(h.coordinator.can_invite(&bob));
        assert!(!h.coordinator.can_invite(&owner));

        h.store.set_user_role("admin", Role::GeneralUser);
        assert!(!h.coordinator.can_invite(&bob));
        assert!(!h.coordinator.can_open_management_view("bob"));
    }

    #[test]
    fn teardown_removes_every_subscription() {
        let mut h = harness("owner");
        h.coordinator.teardown();
        assert_eq!(total_subscriptions(&h.bus), 0);
        assert!(!h.coordinator.is_active());

        h.bus.publish_ui(UiEvent::RenewUserList);
        h.bus
            .publish_engine(EngineEvent::AllUserCameraDisableChanged { disabled: true });
        assert!(h.responder.calls().is_empty());

        h.coordinator.teardown();
    }

    #[test]
    fn selection_is_ignored_after_teardown() {
        let mut h = harness("owner");
        h.coordinator.teardown();
        h.coordinator.show_user_management("alice", "Alice");
        assert_eq!(h.coordinator.selected_target(), None);
        assert!(h.responder.calls().is_empty());
    }

    #[test]
    fn drop_tears_down() {
        let h = harness("owner");
        let bus = h.bus.clone();
        drop(h);
        assert_eq!(total_subscriptions(&bus), 0);
    }

    #[test]
    fn missing_responder_is_tolerated() {
        let h = harness("owner");
        let bus = h.bus.clone();
        let coordinator = h.coordinator;
        drop(h.responder);
        bus.publish_ui(UiEvent::RenewUserList);
        assert_eq!(coordinator.attendees(), roster());
    }
}
