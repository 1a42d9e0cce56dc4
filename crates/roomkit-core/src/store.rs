use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::participants::{Attendee, Role};

/// Room metadata mirrored from the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: String,
    pub name: String,
    pub owner_id: String,
    pub microphone_disabled_for_all: bool,
    pub camera_disabled_for_all: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    current_user: Option<Attendee>,
    room_info: RoomInfo,
    attendees: Vec<Attendee>,
    pending_invitations: HashSet<String>,
}

/// Shared room state, the authoritative source the coordinator reads from.
///
/// Cloning yields another handle to the same state. The host (engine glue)
/// mutates it; coordinators only read.
#[derive(Debug, Clone, Default)]
pub struct RoomStore {
    state: Arc<RwLock<StoreState>>,
}

impl RoomStore {
    pub fn new(room_info: RoomInfo, current_user: Attendee) -> Self {
        let store = Self::default();
        {
            let mut state = store.write();
            state.room_info = room_info;
            state.current_user = Some(current_user);
        }
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The local user. Before a user is set this is an anonymous general user,
    /// which has authority over nobody.
    pub fn current_user(&self) -> Attendee {
        self.read()
            .current_user
            .clone()
            .unwrap_or_else(|| Attendee::new("", "", Role::GeneralUser))
    }

    pub fn room_info(&self) -> RoomInfo {
        self.read().room_info.clone()
    }

    pub fn attendee_list(&self) -> Vec<Attendee> {
        self.read().attendees.clone()
    }

    pub fn pending_invitations(&self) -> HashSet<String> {
        self.read().pending_invitations.clone()
    }

    pub fn has_pending_invitation(&self, user_id: &str) -> bool {
        self.read().pending_invitations.contains(user_id)
    }

    pub fn set_current_user(&self, user: Attendee) {
        self.write().current_user = Some(user);
    }

    pub fn set_room_info(&self, info: RoomInfo) {
        self.write().room_info = info;
    }

    pub fn set_attendees(&self, attendees: Vec<Attendee>) {
        self.write().attendees = attendees;
    }

    /// Update a user's role in the attendee list, and in the current user
    /// if it is the same person.
    pub fn set_user_role(&self, user_id: &str, role: Role) {
        let mut state = self.write();
        if let Some(a) = state.attendees.iter_mut().find(|a| a.user_id == user_id) {
            a.user_role = role;
        }
        if let Some(me) = state.current_user.as_mut().filter(|u| u.user_id == user_id) {
            me.user_role = role;
        }
    }

    /// Returns `false` if an invitation for `user_id` was already pending.
    pub fn insert_pending_invitation(&self, user_id: &str) -> bool {
        self.write().pending_invitations.insert(user_id.to_string())
    }

    pub fn remove_pending_invitation(&self, user_id: &str) -> bool {
        self.write().pending_invitations.remove(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Attendee {
        Attendee::new("owner", "Olivia", Role::RoomOwner)
    }

    #[test]
    fn clones_share_state() {
        let store = RoomStore::new(RoomInfo::default(), owner());
        let other = store.clone();
        other.set_attendees(vec![owner(), Attendee::new("u1", "Alice", Role::GeneralUser)]);
        assert_eq!(store.attendee_list().len(), 2);
    }

    #[test]
    fn current_user_defaults_to_general_user() {
        let store = RoomStore::default();
        assert_eq!(store.current_user().user_role, Role::GeneralUser);
        store.set_current_user(owner());
        assert_eq!(store.current_user().user_id, "owner");
    }

    #[test]
    fn pending_invitations_insert_and_remove() {
        let store = RoomStore::default();
        assert!(store.insert_pending_invitation("u1"));
        assert!(!store.insert_pending_invitation("u1"));
        assert!(store.has_pending_invitation("u1"));
        assert!(store.remove_pending_invitation("u1"));
        assert!(store.pending_invitations().is_empty());
    }

    #[test]
    fn set_user_role_updates_attendee_and_current_user() {
        let store = RoomStore::new(RoomInfo::default(), owner());
        store.set_attendees(vec![owner(), Attendee::new("u1", "Alice", Role::GeneralUser)]);

        store.set_user_role("u1", Role::Administrator);
        store.set_user_role("owner", Role::GeneralUser);

        let list = store.attendee_list();
        assert_eq!(list[1].user_role, Role::Administrator);
        assert_eq!(list[0].user_role, Role::GeneralUser);
        assert_eq!(store.current_user().user_role, Role::GeneralUser);
    }
}
