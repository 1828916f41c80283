//! Who may do what to a meeting, and why not.
//!
//! Every gate is a pure function of a meeting, a user and the current time.
//! A gate always carries a reason so a disabled control can explain itself.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use super::Meeting;
use crate::model::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum MeetingAction {
    Rsvp,
    CancelRsvp,
    Start,
    End,
    Cancel,
    Withdraw,
}

impl MeetingAction {
    pub const ALL: [MeetingAction; 6] = [
        MeetingAction::Rsvp,
        MeetingAction::CancelRsvp,
        MeetingAction::Start,
        MeetingAction::End,
        MeetingAction::Cancel,
        MeetingAction::Withdraw,
    ];

    /// Leading text of a notification about a failed attempt.
    pub fn failure_prefix(self) -> &'static str {
        match self {
            Self::Rsvp => "Failed to RSVP",
            Self::CancelRsvp => "There was an error cancelling RSVP to this event",
            Self::Start => "There was an error starting this event",
            Self::End => "There was an error ending this event",
            Self::Cancel => "There was an error cancelling this event",
            Self::Withdraw => "There was an error withdrawing from this event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGate {
    pub action: MeetingAction,
    pub allowed: bool,
    pub visible: bool,
    pub reason: String,
}

impl ActionGate {
    fn allow(action: MeetingAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            allowed: true,
            visible: true,
            reason: reason.into(),
        }
    }

    fn deny(action: MeetingAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            allowed: false,
            visible: true,
            reason: reason.into(),
        }
    }

    fn shown_if(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

pub fn evaluate(
    action: MeetingAction,
    meeting: &Meeting,
    user: &User,
    now: DateTime<Utc>,
) -> ActionGate {
    match action {
        MeetingAction::Rsvp => rsvp(meeting, user),
        MeetingAction::CancelRsvp => cancel_rsvp(meeting, user),
        MeetingAction::Start => start(meeting, user, now),
        MeetingAction::End => end(meeting, user, now),
        MeetingAction::Cancel => cancel(meeting, user),
        MeetingAction::Withdraw => withdraw(meeting, user),
    }
}

pub fn evaluate_all(meeting: &Meeting, user: &User, now: DateTime<Utc>) -> Vec<ActionGate> {
    MeetingAction::ALL
        .iter()
        .map(|action| evaluate(*action, meeting, user, now))
        .collect()
}

fn rsvp(meeting: &Meeting, user: &User) -> ActionGate {
    use MeetingAction::Rsvp;
    let state = meeting.state;

    if user.is_participant(&meeting.id) {
        return ActionGate::deny(Rsvp, "You have already registered for this event");
    }
    if state.is_ended() {
        return ActionGate::deny(Rsvp, "You can't RSVP to an ended event.");
    }
    if state.is_cancelled() {
        return ActionGate::deny(Rsvp, "You can't RSVP to a cancelled event.");
    }
    if meeting.is_full() {
        return ActionGate::deny(Rsvp, "This event is already full.");
    }
    if user.is_anonymous() {
        return ActionGate::deny(Rsvp, "Please login to MetaMask first.");
    }
    ActionGate::allow(Rsvp, format!("Stake required: {} ETH", meeting.stake))
}

fn cancel_rsvp(meeting: &Meeting, user: &User) -> ActionGate {
    use MeetingAction::CancelRsvp;
    let state = meeting.state;
    let visible = user.is_participant(&meeting.id);

    let gate = if state.is_ended() {
        ActionGate::deny(CancelRsvp, "Cannot cancel RSVP of the ended event.")
    } else if state.is_cancelled() {
        ActionGate::deny(CancelRsvp, "Cannot cancel RSVP of the cancelled event.")
    } else if state.is_started() {
        ActionGate::deny(CancelRsvp, "Cannot cancel RSVP of the started event.")
    } else if user.has_cancelled(&meeting.id) {
        ActionGate::deny(CancelRsvp, "You've already cancelled your RSVP.")
    } else {
        ActionGate::allow(CancelRsvp, "Sorry to see you go!")
    };
    gate.shown_if(visible)
}

fn start(meeting: &Meeting, user: &User, now: DateTime<Utc>) -> ActionGate {
    use MeetingAction::Start;
    let state = meeting.state;
    let organizer = meeting.is_organized_by(user);

    let gate = if !organizer {
        ActionGate::deny(Start, "Only the organizer can start this event.")
    } else if state.is_started() && !state.is_ended() {
        ActionGate::deny(Start, "The event was already started.")
    } else if state.is_ended() {
        ActionGate::deny(Start, "You can't start an ended event.")
    } else if state.is_cancelled() {
        ActionGate::deny(Start, "You can't start a cancelled event.")
    } else if now < meeting.start_date_time {
        ActionGate::deny(Start, "You can't start an event before its official Start time.")
    } else if now > meeting.end_date_time {
        ActionGate::deny(Start, "You can't start an event after its official End time.")
    } else if meeting.roster.rsvp.is_empty() {
        ActionGate::deny(Start, "You can't start an event with no participants!")
    } else {
        ActionGate::allow(Start, "Ready to start?")
    };
    gate.shown_if(organizer)
}

fn end(meeting: &Meeting, user: &User, now: DateTime<Utc>) -> ActionGate {
    use MeetingAction::End;
    let state = meeting.state;
    let organizer = meeting.is_organized_by(user);

    let gate = if !organizer {
        ActionGate::deny(End, "Only the organizer can end this event.")
    } else if state.is_ended() {
        ActionGate::deny(End, "The event was already ended.")
    } else if !state.is_started() {
        ActionGate::deny(End, "You can't end an event that hasn't started yet.")
    } else if state.is_cancelled() {
        ActionGate::deny(End, "You can't end a cancelled event.")
    } else if meeting.roster.attend.is_empty() {
        ActionGate::deny(End, "You can't end an event without attendees.")
    } else if now < meeting.end_date_time {
        ActionGate::deny(End, "You can't end an event before its official End time.")
    } else if !meeting.roster.rsvp.is_empty() {
        ActionGate::allow(End, "Ready to end? Don't forget to mark all attendees first!")
    } else {
        ActionGate::allow(End, "Ready to end?")
    };
    gate.shown_if(organizer)
}

fn cancel(meeting: &Meeting, user: &User) -> ActionGate {
    use MeetingAction::Cancel;
    let state = meeting.state;
    let organizer = meeting.is_organized_by(user);

    let gate = if !organizer {
        ActionGate::deny(Cancel, "Only the organizer can cancel this event.")
    } else if state.is_cancelled() {
        ActionGate::deny(Cancel, "The event was already cancelled.")
    } else if state.is_ended() {
        ActionGate::deny(Cancel, "You can't cancel an ended event.")
    } else if state.is_started() {
        ActionGate::deny(Cancel, "You can't cancel a started event.")
    } else {
        ActionGate::allow(Cancel, "Good luck next time!")
    };
    gate.shown_if(organizer)
}

fn withdraw(meeting: &Meeting, user: &User) -> ActionGate {
    use MeetingAction::Withdraw;
    let state = meeting.state;
    let closed = state.is_cancelled() || state.is_ended();

    let gate = if user.has_withdrawn(&meeting.id) {
        ActionGate::deny(Withdraw, "You have already withdrawn.")
    } else if !closed {
        ActionGate::deny(Withdraw, "You can only withdraw from cancelled or ended events.")
    } else if state.is_ended() && meeting.parent.is_none() {
        ActionGate::deny(
            Withdraw,
            "You cannot withdraw from the very first (ended) event in the series.",
        )
    } else {
        ActionGate::allow(Withdraw, "You've earned it!")
    };
    gate.shown_if(closed && user.is_participant(&meeting.id))
}
