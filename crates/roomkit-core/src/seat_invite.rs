use std::sync::{Arc, Weak};

use crate::engine::SeatInviteOutcome;
use crate::strings::StringKey;
use crate::user_list::{CoordinatorState, UserListCoordinator};

/// What [`UserListCoordinator::invite_selected_to_seat`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteDispatch {
    /// A new request went to the engine.
    Issued { user_id: String },
    /// The user already has an outstanding invitation; nothing was sent.
    AlreadyPending { user_id: String },
    /// No selected target, it is no longer in the roster, or the
    /// coordinator was torn down.
    NoTarget,
}

impl UserListCoordinator {
    /// Invite the selected attendee onto a seat.
    ///
    /// Skips the engine call when the store already lists an outstanding
    /// invitation for the user, but the "invitation sent" toast is shown
    /// either way. The pending set itself is maintained by the store.
    pub fn invite_selected_to_seat(&self) -> InviteDispatch {
        if !self.state.is_active() {
            return InviteDispatch::NoTarget;
        }
        let Some(selected) = self.state.selected() else {
            return InviteDispatch::NoTarget;
        };
        let Some(target) = self.state.roster().attendee(&selected.user_id).cloned() else {
            tracing::debug!("seat invite target {} left the roster", selected.user_id);
            return InviteDispatch::NoTarget;
        };

        let services = &self.state.services;
        let dispatch = if services.store.has_pending_invitation(&target.user_id) {
            tracing::info!("seat invite for {} already pending", target.user_id);
            InviteDispatch::AlreadyPending {
                user_id: target.user_id,
            }
        } else {
            let timeout = services.settings.seat_invite_timeout();
            tracing::info!("inviting {} to a seat (timeout {timeout:?})", target.user_id);
            let request = services.engine.invite_to_seat(&target.user_id, timeout);
            let weak = Arc::downgrade(&self.state);
            let user_name = target.user_name;
            self.state.spawn(async move {
                let outcome = request.await;
                report_outcome(weak, &user_name, outcome);
            });
            InviteDispatch::Issued {
                user_id: target.user_id,
            }
        };

        self.state.toast(&self.state.text(StringKey::SeatInviteSent));
        dispatch
    }
}

/// Route a terminal outcome to the view. `user_name` is the name cached
/// in the roster when the request was issued.
fn report_outcome(state: Weak<CoordinatorState>, user_name: &str, outcome: SeatInviteOutcome) {
    let Some(this) = state.upgrade() else {
        return;
    };
    match outcome {
        SeatInviteOutcome::Accepted { request_id, user_id } => {
            tracing::info!("seat invite {request_id} accepted by {user_id}");
        }
        SeatInviteOutcome::Rejected {
            request_id,
            user_id,
            message,
        } => {
            tracing::info!("seat invite {request_id} rejected by {user_id}: {message}");
            let suffix = this.text(StringKey::SeatInviteDeclinedSuffix);
            this.toast(&format!("{user_name}{suffix}"));
        }
        SeatInviteOutcome::TimedOut {
            request_id,
            user_id,
        } => {
            tracing::info!("seat invite {request_id} to {user_id} timed out");
            this.toast(&this.text(StringKey::SeatInviteTimedOut));
        }
        SeatInviteOutcome::Errored {
            request_id,
            user_id,
            code,
            message,
        } => {
            tracing::warn!("seat invite {request_id} to {user_id} failed ({code}): {message}");
            this.toast(&message);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::strings::{EnglishStrings, Localizer};
    use crate::user_list::test_support::{Harness, ViewCall, harness};

    fn sent_toast() -> ViewCall {
        ViewCall::Toast(EnglishStrings.text(StringKey::SeatInviteSent))
    }

    /// Owner selects Alice and invites her; recorded calls are cleared.
    fn invite_alice(h: &Harness) {
        h.coordinator.show_user_management("alice", "Alice");
        assert_eq!(
            h.coordinator.invite_selected_to_seat(),
            InviteDispatch::Issued {
                user_id: "alice".into()
            }
        );
        h.responder.clear();
    }

    #[tokio::test]
    async fn invite_issues_request_and_acknowledges() {
        let h = harness("owner");
        h.coordinator.show_user_management("alice", "Alice");
        h.responder.clear();

        h.coordinator.invite_selected_to_seat();

        assert_eq!(
            *h.engine.invites.lock().unwrap(),
            vec![("alice".to_string(), Duration::ZERO)]
        );
        assert_eq!(h.responder.calls(), vec![sent_toast()]);
    }

    #[tokio::test]
    async fn pending_invitation_suppresses_request_but_still_toasts() {
        let h = harness("owner");
        h.store.insert_pending_invitation("bob");
        h.coordinator.show_user_management("bob", "Bob");
        h.responder.clear();

        assert_eq!(
            h.coordinator.invite_selected_to_seat(),
            InviteDispatch::AlreadyPending {
                user_id: "bob".into()
            }
        );
        assert_eq!(h.engine.invite_count(), 0);
        assert_eq!(h.responder.calls(), vec![sent_toast()]);
    }

    #[tokio::test]
    async fn invite_without_target_is_silent() {
        let h = harness("owner");
        assert_eq!(h.coordinator.invite_selected_to_seat(), InviteDispatch::NoTarget);

        h.coordinator.show_user_management("ghost", "Ghost");
        assert_eq!(h.coordinator.invite_selected_to_seat(), InviteDispatch::NoTarget);

        assert_eq!(h.engine.invite_count(), 0);
        assert!(h.responder.calls().is_empty());
    }

    #[tokio::test]
    async fn accepted_produces_no_view_call() {
        let h = harness("owner");
        invite_alice(&h);
        h.engine.resolve_invite(SeatInviteOutcome::Accepted {
            request_id: "r1".into(),
            user_id: "alice".into(),
        });
        h.coordinator.settle().await;
        assert!(h.responder.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_uses_cached_name() {
        let h = harness("owner");
        invite_alice(&h);
        h.engine.resolve_invite(SeatInviteOutcome::Rejected {
            request_id: "r1".into(),
            user_id: "someone-else".into(),
            message: "busy".into(),
        });
        h.coordinator.settle().await;

        let suffix = EnglishStrings.text(StringKey::SeatInviteDeclinedSuffix);
        assert_eq!(
            h.responder.calls(),
            vec![ViewCall::Toast(format!("Alice{suffix}"))]
        );
    }

    #[tokio::test]
    async fn timed_out_uses_fixed_text() {
        let h = harness("owner");
        invite_alice(&h);
        h.engine.resolve_invite(SeatInviteOutcome::TimedOut {
            request_id: "r1".into(),
            user_id: "alice".into(),
        });
        h.coordinator.settle().await;
        assert_eq!(
            h.responder.calls(),
            vec![ViewCall::Toast(
                EnglishStrings.text(StringKey::SeatInviteTimedOut)
            )]
        );
    }

    #[tokio::test]
    async fn errored_toasts_engine_message() {
        let h = harness("owner");
        invite_alice(&h);
        h.engine.resolve_invite(SeatInviteOutcome::Errored {
            request_id: "r1".into(),
            user_id: "alice".into(),
            code: -2340,
            message: "seat list full".into(),
        });
        h.coordinator.settle().await;
        assert_eq!(
            h.responder.calls(),
            vec![ViewCall::Toast("seat list full".into())]
        );
    }

    #[tokio::test]
    async fn coordinator_never_clears_pending_set() {
        let h = harness("owner");
        h.store.insert_pending_invitation("alice");
        h.store.remove_pending_invitation("alice");
        invite_alice(&h);
        h.store.insert_pending_invitation("alice");
        h.engine.resolve_invite(SeatInviteOutcome::TimedOut {
            request_id: "r1".into(),
            user_id: "alice".into(),
        });
        h.coordinator.settle().await;
        assert!(h.store.has_pending_invitation("alice"));
    }

    #[tokio::test]
    async fn outcome_after_teardown_is_dropped() {
        let mut h = harness("owner");
        invite_alice(&h);
        h.coordinator.teardown();

        let _ = h
            .engine
            .invite_results
            .lock()
            .unwrap()
            .remove(0)
            .send(SeatInviteOutcome::TimedOut {
                request_id: "r1".into(),
                user_id: "alice".into(),
            });
        tokio::task::yield_now().await;
        assert!(h.responder.calls().is_empty());
    }

    #[tokio::test]
    async fn invite_after_teardown_issues_nothing() {
        let mut h = harness("owner");
        h.coordinator.show_user_management("alice", "Alice");
        h.responder.clear();
        h.coordinator.teardown();

        assert_eq!(h.coordinator.invite_selected_to_seat(), InviteDispatch::NoTarget);
        assert_eq!(h.engine.invite_count(), 0);
        assert!(h.responder.calls().is_empty());
    }

    #[tokio::test]
    async fn configured_timeout_reaches_engine() {
        let h = harness("owner");
        drop(h.coordinator);

        let mut settings = crate::settings::Settings::default();
        settings.seat_invite_timeout_secs = 15.0;
        let services = crate::user_list::RoomServices {
            bus: h.bus.clone(),
            store: h.store.clone(),
            engine: h.engine.clone(),
            strings: Arc::new(EnglishStrings),
            settings,
        };
        let coordinator = UserListCoordinator::new(services, &h.responder);
        coordinator.show_user_management("bob", "Bob");
        coordinator.invite_selected_to_seat();

        assert_eq!(
            h.engine.invites.lock().unwrap()[0],
            ("bob".to_string(), Duration::from_secs(15))
        );
    }
}
