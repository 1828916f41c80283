use chrono::{DateTime, Utc};

use crate::model::{
    id::{MeetingId, UserId},
    user::User,
};

use self::lifecycle::LifecycleState;

pub mod event;
pub mod lifecycle;
pub mod payout;
pub mod policy;

#[derive(Debug, Clone, PartialEq)]
pub struct Meeting {
    pub id: MeetingId,
    pub state: LifecycleState,
    pub is_deployed: bool,
    pub name: String,
    pub location: String,
    pub description: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub stake: f64,
    pub max_participants: i32,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub organizer: UserId,
    pub deployer_contract_address: String,
    pub parent: Option<MeetingId>,
    pub child: Option<MeetingId>,
    pub roster: Roster,
}

impl Meeting {
    pub fn is_organized_by(&self, user: &User) -> bool {
        !user.id.is_empty() && self.organizer == user.id
    }

    pub fn is_full(&self) -> bool {
        self.roster.rsvp.len() >= self.capacity()
    }

    pub fn capacity(&self) -> usize {
        usize::try_from(self.max_participants).unwrap_or(0)
    }
}

/// Participants of a meeting by stage. A user moves `rsvp -> attend ->
/// withdraw` (or `rsvp -> withdraw` for a cancelled meeting) and sits in at
/// most one list at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub rsvp: Vec<UserId>,
    pub attend: Vec<UserId>,
    pub withdraw: Vec<UserId>,
}

impl Roster {
    pub fn total_registered(&self) -> usize {
        self.rsvp.len() + self.attend.len() + self.withdraw.len()
    }

    /// Participants entitled to a share of the pool.
    pub fn eligible(&self) -> usize {
        self.attend.len() + self.withdraw.len()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.rsvp.contains(user) || self.attend.contains(user) || self.withdraw.contains(user)
    }

    pub fn register(&mut self, user: &UserId) {
        if !self.contains(user) {
            self.rsvp.push(user.clone());
        }
    }

    pub fn cancel(&mut self, user: &UserId) {
        self.rsvp.retain(|u| u != user);
    }

    pub fn attend(&mut self, user: &UserId) {
        if self.rsvp.contains(user) {
            self.rsvp.retain(|u| u != user);
            self.attend.push(user.clone());
        }
    }

    pub fn withdraw(&mut self, user: &UserId) {
        if self.withdraw.contains(user) {
            return;
        }
        self.rsvp.retain(|u| u != user);
        self.attend.retain(|u| u != user);
        self.withdraw.push(user.clone());
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn roster_moves_user_between_stages() {
        let alice = UserId::from("0xa");
        let mut roster = Roster::default();
        roster.register(&alice);
        roster.register(&alice);
        assert_eq!(roster.rsvp, vec![alice.clone()]);

        roster.attend(&alice);
        assert!(roster.rsvp.is_empty());
        assert_eq!(roster.attend, vec![alice.clone()]);

        roster.withdraw(&alice);
        roster.withdraw(&alice);
        assert!(roster.attend.is_empty());
        assert_eq!(roster.withdraw, vec![alice.clone()]);
        assert_eq!(roster.total_registered(), 1);
        assert_eq!(roster.eligible(), 1);
    }

    #[test]
    fn attending_requires_registration() {
        let mut roster = Roster::default();
        roster.attend(&UserId::from("0xa"));
        assert_eq!(roster, Roster::default());
    }

    #[test]
    fn capacity_counts_registrations_only() {
        let mut m = meeting("0xm");
        m.roster.rsvp = user_ids(&["a", "b"]);
        m.roster.attend = user_ids(&["c"]);
        assert!(!m.is_full());
        m.roster.rsvp.push(UserId::from("d"));
        assert!(m.is_full());
    }

    #[test]
    fn anonymous_user_is_never_the_organizer() {
        let mut m = meeting("0xm");
        m.organizer = UserId::default();
        assert!(!m.is_organized_by(&User::anonymous()));
    }
}
