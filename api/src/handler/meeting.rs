use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    id::{MeetingId, UserId},
    meeting::{
        event::{CreateMeeting, TransitionMeeting},
        lifecycle::Transition,
        payout,
        policy, Meeting,
    },
    user::User,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::{
    meeting::{
        CreateMeetingRequest, MeetingAddressRequest, MeetingResponse, ParticipantRequest,
        UpdateMeetingRequest,
    },
    view::{MeetingViewQuery, MeetingViewResponse},
};

async fn find_meeting(registry: &AppRegistry, meeting_id: &MeetingId) -> AppResult<Meeting> {
    registry
        .meeting_repository()
        .find_by_id(meeting_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("meeting {meeting_id} was not found")))
}

pub async fn show_meeting_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<MeetingResponse>>> {
    registry
        .meeting_repository()
        .find_all()
        .await
        .map(|meetings| meetings.into_iter().map(MeetingResponse::from).collect())
        .map(Json)
}

pub async fn show_meeting(
    Path(meeting_id): Path<MeetingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<MeetingResponse>> {
    find_meeting(&registry, &meeting_id)
        .await
        .map(MeetingResponse::from)
        .map(Json)
}

pub async fn show_meeting_view(
    Path(meeting_id): Path<MeetingId>,
    Query(query): Query<MeetingViewQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<MeetingViewResponse>> {
    let meeting = find_meeting(&registry, &meeting_id).await?;

    let parent = match &meeting.parent {
        Some(parent_id) => registry.meeting_repository().find_by_id(parent_id).await?,
        None => None,
    };
    let user = match query.user.filter(|u| !u.is_empty()) {
        Some(user_id) => {
            let user_id = UserId::new(user_id);
            registry
                .user_repository()
                .find_by_id(&user_id)
                .await?
                .unwrap_or_else(|| User::unregistered(user_id))
        }
        None => User::anonymous(),
    };

    let deploying = !meeting.is_deployed || query.deploying;
    let response = MeetingViewResponse {
        status: meeting.state.status(deploying),
        gates: policy::evaluate_all(&meeting, &user, Utc::now()),
        payout: payout::compute(&meeting, parent.as_ref()).into(),
        registered: meeting.roster.total_registered(),
        max_participants: meeting.max_participants,
        meeting: meeting.into(),
    };
    Ok(Json(response))
}

pub async fn create_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateMeetingRequest>,
) -> AppResult<(StatusCode, Json<MeetingResponse>)> {
    req.validate(&())?;
    let event = CreateMeeting::try_from(req)?;

    registry
        .meeting_repository()
        .create(event)
        .await
        .map(|meeting| (StatusCode::CREATED, Json(meeting.into())))
}

pub async fn update_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateMeetingRequest>,
) -> AppResult<(StatusCode, Json<MeetingResponse>)> {
    req.validate(&())?;

    registry
        .meeting_repository()
        .deploy(req.into())
        .await
        .map(|meeting| (StatusCode::CREATED, Json(meeting.into())))
}

pub async fn rsvp_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<ParticipantRequest>,
) -> AppResult<Json<MeetingResponse>> {
    req.validate(&())?;

    registry
        .meeting_repository()
        .register(req.into())
        .await
        .map(MeetingResponse::from)
        .map(Json)
}

pub async fn cancel_rsvp_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<ParticipantRequest>,
) -> AppResult<Json<MeetingResponse>> {
    req.validate(&())?;

    registry
        .meeting_repository()
        .cancel_registration(req.into())
        .await
        .map(MeetingResponse::from)
        .map(Json)
}

pub async fn mark_attendance(
    State(registry): State<AppRegistry>,
    Json(req): Json<ParticipantRequest>,
) -> AppResult<Json<MeetingResponse>> {
    req.validate(&())?;

    registry
        .meeting_repository()
        .mark_attendance(req.into())
        .await
        .map(MeetingResponse::from)
        .map(Json)
}

pub async fn withdraw_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<ParticipantRequest>,
) -> AppResult<Json<MeetingResponse>> {
    req.validate(&())?;

    registry
        .meeting_repository()
        .withdraw(req.into())
        .await
        .map(MeetingResponse::from)
        .map(Json)
}

async fn transition_meeting(
    registry: AppRegistry,
    req: MeetingAddressRequest,
    transition: Transition,
) -> AppResult<Json<MeetingResponse>> {
    req.validate(&())?;

    registry
        .meeting_repository()
        .transition(TransitionMeeting::new(
            MeetingId::new(req.meeting_address),
            transition,
        ))
        .await
        .map(MeetingResponse::from)
        .map(Json)
}

pub async fn start_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<MeetingAddressRequest>,
) -> AppResult<Json<MeetingResponse>> {
    transition_meeting(registry, req, Transition::Start).await
}

pub async fn end_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<MeetingAddressRequest>,
) -> AppResult<Json<MeetingResponse>> {
    transition_meeting(registry, req, Transition::End).await
}

pub async fn cancel_meeting(
    State(registry): State<AppRegistry>,
    Json(req): Json<MeetingAddressRequest>,
) -> AppResult<Json<MeetingResponse>> {
    transition_meeting(registry, req, Transition::Cancel).await
}
