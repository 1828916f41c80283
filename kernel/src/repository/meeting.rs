use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::MeetingId,
    meeting::{
        event::{CreateMeeting, DeployMeeting, TransitionMeeting, UpdateParticipant},
        Meeting,
    },
};

/// Storage of meetings and of the per-user lists that mirror their rosters.
///
/// Every write touches the meeting and the user record together and either
/// both change or neither does.
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    // All meetings, pending ones included
    async fn find_all(&self) -> AppResult<Vec<Meeting>>;
    async fn find_by_id(&self, meeting_id: &MeetingId) -> AppResult<Option<Meeting>>;
    // Stores a meeting under its pending transaction hash
    async fn create(&self, event: CreateMeeting) -> AppResult<Meeting>;
    // Rekeys a pending meeting to its contract address
    async fn deploy(&self, event: DeployMeeting) -> AppResult<Meeting>;
    // Fails once the meeting is full
    async fn register(&self, event: UpdateParticipant) -> AppResult<Meeting>;
    async fn cancel_registration(&self, event: UpdateParticipant) -> AppResult<Meeting>;
    async fn mark_attendance(&self, event: UpdateParticipant) -> AppResult<Meeting>;
    async fn withdraw(&self, event: UpdateParticipant) -> AppResult<Meeting>;
    async fn transition(&self, event: TransitionMeeting) -> AppResult<Meeting>;
}
