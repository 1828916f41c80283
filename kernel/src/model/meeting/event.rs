use chrono::{DateTime, Utc};
use derive_new::new;
use shared::error::{AppError, AppResult};

use super::lifecycle::Transition;
use crate::model::id::{MeetingId, UserId};

#[derive(Debug, new)]
pub struct CreateMeeting {
    pub tx_hash: MeetingId,
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
}

impl CreateMeeting {
    pub fn check(&self) -> AppResult<()> {
        if self.tx_hash.is_empty() {
            return Err(AppError::UnprocessableEntity(
                "a pending transaction hash is required".into(),
            ));
        }
        if !self.stake.is_finite() || self.stake < 0.0 {
            return Err(AppError::UnprocessableEntity(format!(
                "stake must be a non-negative amount, got {}",
                self.stake
            )));
        }
        if self.max_participants < 1 {
            return Err(AppError::UnprocessableEntity(
                "at least one participant must be allowed".into(),
            ));
        }
        if self.end_date_time <= self.start_date_time {
            return Err(AppError::UnprocessableEntity(
                "the meeting must end after it starts".into(),
            ));
        }
        if self.parent.as_ref() == Some(&self.tx_hash) {
            return Err(AppError::UnprocessableEntity(
                "a meeting cannot continue itself".into(),
            ));
        }
        Ok(())
    }
}

/// Moves a meeting from its pending transaction hash to the mined contract
/// address.
#[derive(Debug, new)]
pub struct DeployMeeting {
    pub tx_hash: MeetingId,
    pub meeting_address: MeetingId,
}

#[derive(Debug, Clone, new)]
pub struct UpdateParticipant {
    pub meeting_id: MeetingId,
    pub user_id: UserId,
}

#[derive(Debug, new)]
pub struct TransitionMeeting {
    pub meeting_id: MeetingId,
    pub transition: Transition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create() -> CreateMeeting {
        let start = Utc::now();
        CreateMeeting::new(
            MeetingId::from("0xtx"),
            "Rust meetup".into(),
            "Tokyo".into(),
            String::new(),
            vec![],
            vec![],
            0.5,
            10,
            start,
            start + Duration::hours(2),
            UserId::from("0xorganizer"),
            String::new(),
            None,
        )
    }

    #[test]
    fn accepts_a_well_formed_meeting() {
        assert!(create().check().is_ok());
    }

    #[test]
    fn rejects_bad_schedule_and_amounts() {
        let mut event = create();
        event.end_date_time = event.start_date_time;
        assert!(matches!(event.check(), Err(AppError::UnprocessableEntity(_))));

        let mut event = create();
        event.stake = f64::NAN;
        assert!(event.check().is_err());

        let mut event = create();
        event.max_participants = 0;
        assert!(event.check().is_err());

        let mut event = create();
        event.parent = Some(event.tx_hash.clone());
        assert!(event.check().is_err());
    }
}
