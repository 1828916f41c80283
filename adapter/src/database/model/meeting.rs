use std::str::FromStr;

use kernel::model::{
    id::{MeetingId, UserId},
    meeting::{lifecycle::LifecycleState, Meeting, Roster},
};
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, Utc};

// Columns selected by every meeting query.
pub const MEETING_COLUMNS: &str = r#"
    meeting_id, state, is_deployed, name, location, description,
    images, videos, stake, max_participants, start_date_time, end_date_time,
    organizer, deployer_contract_address, parent_id, child_id,
    rsvp, attend, withdraw
"#;

#[derive(sqlx::FromRow)]
pub struct MeetingRow {
    pub meeting_id: String,
    pub state: String,
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
    pub organizer: String,
    pub deployer_contract_address: String,
    pub parent_id: Option<String>,
    pub child_id: Option<String>,
    pub rsvp: Vec<String>,
    pub attend: Vec<String>,
    pub withdraw: Vec<String>,
}

impl MeetingRow {
    pub fn into_meeting(self) -> AppResult<Meeting> {
        let MeetingRow {
            meeting_id,
            state,
            is_deployed,
            name,
            location,
            description,
            images,
            videos,
            stake,
            max_participants,
            start_date_time,
            end_date_time,
            organizer,
            deployer_contract_address,
            parent_id,
            child_id,
            rsvp,
            attend,
            withdraw,
        } = self;
        let state = LifecycleState::from_str(&state).map_err(|_| {
            AppError::UnprocessableEntity(format!(
                "meeting {meeting_id} has an unknown state {state}"
            ))
        })?;
        Ok(Meeting {
            id: MeetingId::new(meeting_id),
            state,
            is_deployed,
            name,
            location,
            description,
            images,
            videos,
            stake,
            max_participants,
            start_date_time,
            end_date_time,
            organizer: UserId::new(organizer),
            deployer_contract_address,
            parent: parent_id.map(MeetingId::new),
            child: child_id.map(MeetingId::new),
            roster: Roster {
                rsvp: rsvp.into_iter().map(UserId::new).collect(),
                attend: attend.into_iter().map(UserId::new).collect(),
                withdraw: withdraw.into_iter().map(UserId::new).collect(),
            },
        })
    }
}

// Just enough of a meeting to explain why a conditional update matched no row.
#[derive(sqlx::FromRow)]
pub struct MeetingStateRow {
    pub state: String,
    pub max_participants: i32,
    pub rsvp: Vec<String>,
    pub attend: Vec<String>,
    pub withdraw: Vec<String>,
}

impl MeetingStateRow {
    pub fn lifecycle(&self) -> AppResult<LifecycleState> {
        LifecycleState::from_str(&self.state).map_err(|_| {
            AppError::UnprocessableEntity(format!("unknown meeting state {}", self.state))
        })
    }

    pub fn is_full(&self) -> bool {
        i32::try_from(self.rsvp.len()).unwrap_or(i32::MAX) >= self.max_participants
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::chrono::TimeZone;

    fn row(state: &str) -> MeetingRow {
        MeetingRow {
            meeting_id: "0xm".into(),
            state: state.into(),
            is_deployed: true,
            name: "Rust meetup".into(),
            location: "Tokyo".into(),
            description: "".into(),
            images: vec![],
            videos: vec![],
            stake: 0.5,
            max_participants: 2,
            start_date_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
            end_date_time: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            organizer: "0xorganizer".into(),
            deployer_contract_address: "0xdeployer".into(),
            parent_id: Some("0xparent".into()),
            child_id: None,
            rsvp: vec!["0xalice".into()],
            attend: vec![],
            withdraw: vec![],
        }
    }

    #[test]
    fn row_becomes_meeting() {
        let meeting = row("STARTED").into_meeting().unwrap();
        assert_eq!(meeting.state, LifecycleState::Started);
        assert_eq!(meeting.parent, Some(MeetingId::from("0xparent")));
        assert_eq!(meeting.roster.rsvp, vec![UserId::from("0xalice")]);
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!(matches!(
            row("PAUSED").into_meeting(),
            Err(AppError::UnprocessableEntity(_))
        ));
    }
}
