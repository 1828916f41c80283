use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{MeetingId, UserId},
    meeting::{
        event::{CreateMeeting, DeployMeeting, UpdateParticipant},
        lifecycle::LifecycleState,
        Meeting, Roster,
    },
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Pending,
    Meeting,
}

/// A meeting in the document shape clients already read.
#[derive(Debug, Serialize)]
pub struct MeetingResponse {
    #[serde(rename = "_id")]
    pub id: MeetingId,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub rsvp: Vec<UserId>,
    pub attend: Vec<UserId>,
    pub withdraw: Vec<UserId>,
    pub data: MeetingDataResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDataResponse {
    pub name: String,
    pub location: String,
    pub description: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub stake: f64,
    pub max_participants: i32,
    pub start_date_time: i64,
    pub end_date_time: i64,
    pub organizer_address: UserId,
    pub deployer_contract_address: String,
    pub is_started: bool,
    pub is_ended: bool,
    pub is_cancelled: bool,
    pub is_deployed: bool,
    pub state: LifecycleState,
    pub parent: Option<MeetingId>,
    pub child: Option<MeetingId>,
}

impl From<Meeting> for MeetingResponse {
    fn from(value: Meeting) -> Self {
        let Meeting {
            id,
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
            parent,
            child,
            roster: Roster {
                rsvp,
                attend,
                withdraw,
            },
        } = value;
        let flags = state.flags();
        Self {
            id,
            document_type: if is_deployed {
                DocumentType::Meeting
            } else {
                DocumentType::Pending
            },
            rsvp,
            attend,
            withdraw,
            data: MeetingDataResponse {
                name,
                location,
                description,
                images,
                videos,
                stake,
                max_participants,
                start_date_time: start_date_time.timestamp(),
                end_date_time: end_date_time.timestamp(),
                organizer_address: organizer,
                deployer_contract_address,
                is_started: flags.started,
                is_ended: flags.ended,
                is_cancelled: flags.cancelled,
                is_deployed,
                state,
                parent,
                child,
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMeetingRequest {
    #[serde(rename = "_id")]
    #[garde(length(min = 1))]
    pub tx_hash: String,
    #[garde(dive)]
    pub data: CreateMeetingDataRequest,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingDataRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub location: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: String,
    #[garde(skip)]
    #[serde(default)]
    pub images: Vec<String>,
    #[garde(skip)]
    #[serde(default)]
    pub videos: Vec<String>,
    #[garde(range(min = 0.0))]
    pub stake: f64,
    #[garde(range(min = 1))]
    pub max_participants: i32,
    #[garde(skip)]
    pub start_date_time: i64,
    #[garde(skip)]
    pub end_date_time: i64,
    #[garde(length(min = 1))]
    pub organizer_address: String,
    #[garde(skip)]
    #[serde(default)]
    pub deployer_contract_address: String,
    #[garde(skip)]
    #[serde(default)]
    pub parent: Option<String>,
}

fn from_unix(seconds: i64, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::UnprocessableEntity(format!("{field} is out of range")))
}

impl TryFrom<CreateMeetingRequest> for CreateMeeting {
    type Error = AppError;

    fn try_from(value: CreateMeetingRequest) -> Result<Self, Self::Error> {
        let CreateMeetingRequest { tx_hash, data } = value;
        let CreateMeetingDataRequest {
            name,
            location,
            description,
            images,
            videos,
            stake,
            max_participants,
            start_date_time,
            end_date_time,
            organizer_address,
            deployer_contract_address,
            parent,
        } = data;
        let event = CreateMeeting::new(
            MeetingId::new(tx_hash),
            name,
            location,
            description,
            images,
            videos,
            stake,
            max_participants,
            from_unix(start_date_time, "startDateTime")?,
            from_unix(end_date_time, "endDateTime")?,
            UserId::new(organizer_address),
            deployer_contract_address,
            // Clients send an empty string for the first meeting of a series.
            parent.filter(|p| !p.is_empty()).map(MeetingId::new),
        );
        event.check()?;
        Ok(event)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingRequest {
    #[garde(length(min = 1))]
    pub tx_hash: String,
    #[garde(length(min = 1))]
    pub meeting_address: String,
}

impl From<UpdateMeetingRequest> for DeployMeeting {
    fn from(value: UpdateMeetingRequest) -> Self {
        let UpdateMeetingRequest {
            tx_hash,
            meeting_address,
        } = value;
        DeployMeeting::new(MeetingId::new(tx_hash), MeetingId::new(meeting_address))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRequest {
    #[garde(length(min = 1))]
    pub meeting_address: String,
    #[garde(length(min = 1))]
    pub user_address: String,
}

impl From<ParticipantRequest> for UpdateParticipant {
    fn from(value: ParticipantRequest) -> Self {
        let ParticipantRequest {
            meeting_address,
            user_address,
        } = value;
        UpdateParticipant::new(MeetingId::new(meeting_address), UserId::new(user_address))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MeetingAddressRequest {
    #[garde(length(min = 1))]
    pub meeting_address: String,
}
