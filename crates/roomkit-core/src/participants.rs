use serde::{Deserialize, Serialize};

/// Role of a user inside a room, from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    RoomOwner,
    Administrator,
    GeneralUser,
}

impl Role {
    /// The lowest-privilege role never sees moderation controls.
    pub fn is_lowest_privilege(self) -> bool {
        self == Role::GeneralUser
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub user_id: String,
    pub user_name: String,
    pub user_role: Role,
}

impl Attendee {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>, user_role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_role,
        }
    }
}

/// Attendee the operator last opened the management panel for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedTarget {
    pub user_id: String,
    pub user_name: String,
}

/// Local copy of the room's attendee list.
///
/// Replaced wholesale from the shared store, never patched in place.
/// Read by the eligibility checks and the seat invitation workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    attendees: Vec<Attendee>,
}

impl RosterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attendees(attendees: Vec<Attendee>) -> Self {
        Self { attendees }
    }

    pub fn replace_all(&mut self, attendees: Vec<Attendee>) {
        self.attendees = attendees;
    }

    pub fn attendees(&self) -> &[Attendee] {
        &self.attendees
    }

    pub fn attendee(&self, user_id: &str) -> Option<&Attendee> {
        self.attendees.iter().find(|a| a.user_id == user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.attendee(user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }
}
