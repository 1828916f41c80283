use kernel::model::{
    id::{MeetingId, UserId},
    user::User,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(rename = "type")]
    pub document_type: &'static str,
    pub rsvp: Vec<MeetingId>,
    pub cancel: Vec<MeetingId>,
    pub attend: Vec<MeetingId>,
    pub withdraw: Vec<MeetingId>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            id,
            rsvp,
            cancel,
            attend,
            withdraw,
        } = value;
        Self {
            id,
            document_type: "USER",
            rsvp,
            cancel,
            attend,
            withdraw,
        }
    }
}
