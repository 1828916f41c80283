use crate::model::id::{MeetingId, UserId};

/// A wallet and the meetings it has touched, one list per stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub rsvp: Vec<MeetingId>,
    pub cancel: Vec<MeetingId>,
    pub attend: Vec<MeetingId>,
    pub withdraw: Vec<MeetingId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    None,
    Registered,
    Cancelled,
    Attended,
    Withdrawn,
}

impl User {
    /// No wallet connected.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A connected wallet with no history yet.
    pub fn unregistered(id: UserId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_empty()
    }

    pub fn participation(&self, meeting: &MeetingId) -> Participation {
        if self.withdraw.contains(meeting) {
            Participation::Withdrawn
        } else if self.attend.contains(meeting) {
            Participation::Attended
        } else if self.rsvp.contains(meeting) {
            Participation::Registered
        } else if self.cancel.contains(meeting) {
            Participation::Cancelled
        } else {
            Participation::None
        }
    }

    /// Registered, attended or withdrawn.
    pub fn is_participant(&self, meeting: &MeetingId) -> bool {
        matches!(
            self.participation(meeting),
            Participation::Registered | Participation::Attended | Participation::Withdrawn
        )
    }

    pub fn has_cancelled(&self, meeting: &MeetingId) -> bool {
        self.cancel.contains(meeting)
    }

    pub fn has_withdrawn(&self, meeting: &MeetingId) -> bool {
        self.withdraw.contains(meeting)
    }

    pub fn record_registration(&mut self, meeting: &MeetingId) {
        self.forget(meeting);
        self.rsvp.push(meeting.clone());
    }

    pub fn record_cancellation(&mut self, meeting: &MeetingId) {
        self.forget(meeting);
        self.cancel.push(meeting.clone());
    }

    pub fn record_attendance(&mut self, meeting: &MeetingId) {
        self.forget(meeting);
        self.attend.push(meeting.clone());
    }

    pub fn record_withdrawal(&mut self, meeting: &MeetingId) {
        self.forget(meeting);
        self.withdraw.push(meeting.clone());
    }

    fn forget(&mut self, meeting: &MeetingId) {
        for list in [
            &mut self.rsvp,
            &mut self.cancel,
            &mut self.attend,
            &mut self.withdraw,
        ] {
            list.retain(|m| m != meeting);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_sits_in_one_list_at_a_time() {
        let meeting = MeetingId::from("0xm");
        let mut user = User::unregistered(UserId::from("0xa"));
        assert_eq!(user.participation(&meeting), Participation::None);

        user.record_registration(&meeting);
        assert!(user.is_participant(&meeting));

        user.record_cancellation(&meeting);
        assert_eq!(user.participation(&meeting), Participation::Cancelled);
        assert!(user.rsvp.is_empty());
        assert!(!user.is_participant(&meeting));

        user.record_registration(&meeting);
        user.record_attendance(&meeting);
        user.record_withdrawal(&meeting);
        assert_eq!(user.participation(&meeting), Participation::Withdrawn);
        assert_eq!(
            user.rsvp.len() + user.cancel.len() + user.attend.len() + user.withdraw.len(),
            1
        );
    }

    #[test]
    fn anonymous_user_has_empty_id() {
        assert!(User::anonymous().is_anonymous());
        assert!(!User::unregistered(UserId::from("0xa")).is_anonymous());
    }
}
