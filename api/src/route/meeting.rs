use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::meeting::{
    cancel_meeting, cancel_rsvp_meeting, create_meeting, end_meeting, mark_attendance,
    rsvp_meeting, show_meeting, show_meeting_list, show_meeting_view, start_meeting,
    update_meeting, withdraw_meeting,
};

pub fn build_meeting_routers() -> Router<AppRegistry> {
    let meetings_routers = Router::new()
        .route("/all", get(show_meeting_list))
        .route("/id/:meeting_id", get(show_meeting))
        .route("/id/:meeting_id/view", get(show_meeting_view))
        .route("/create", post(create_meeting))
        .route("/update", put(update_meeting))
        .route("/rsvp", put(rsvp_meeting))
        .route("/cancel-rsvp", put(cancel_rsvp_meeting))
        .route("/attendance", put(mark_attendance))
        .route("/start", put(start_meeting))
        .route("/end", put(end_meeting))
        .route("/cancel", put(cancel_meeting))
        .route("/withdraw", put(withdraw_meeting));

    Router::new().nest("/meeting", meetings_routers)
}
