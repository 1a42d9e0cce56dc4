//! Who may act on whom in the user list.
//!
//! Owners have authority over everyone but themselves. Administrators
//! only over general users.

use crate::participants::{Attendee, Role, RosterSnapshot};

/// Whether `actor` may open the management panel for `target_id`.
///
/// The target must be present in `roster`; nobody manages themselves.
pub fn can_open_management_view(
    actor: &Attendee,
    target_id: &str,
    roster: &RosterSnapshot,
) -> bool {
    let Some(target) = roster.attendee(target_id) else {
        return false;
    };
    if target.user_id == actor.user_id {
        return false;
    }
    match actor.user_role {
        Role::RoomOwner => true,
        Role::Administrator => target.user_role == Role::GeneralUser,
        Role::GeneralUser => false,
    }
}

/// Whether `actor` may invite `target` onto a seat.
///
/// Callers pass a target they already resolved: presence in the roster
/// is not checked here, and neither is self-invitation.
pub fn can_invite(actor: &Attendee, target: &Attendee) -> bool {
    match actor.user_role {
        Role::RoomOwner => true,
        Role::Administrator => target.user_role == Role::GeneralUser,
        Role::GeneralUser => false,
    }
}
