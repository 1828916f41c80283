use kernel::model::{
    id::{MeetingId, UserId},
    user::User,
};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub rsvp: Vec<String>,
    pub cancel: Vec<String>,
    pub attend: Vec<String>,
    pub withdraw: Vec<String>,
}

fn meeting_ids(ids: Vec<String>) -> Vec<MeetingId> {
    ids.into_iter().map(MeetingId::new).collect()
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            rsvp,
            cancel,
            attend,
            withdraw,
        } = value;
        User {
            id: UserId::new(user_id),
            rsvp: meeting_ids(rsvp),
            cancel: meeting_ids(cancel),
            attend: meeting_ids(attend),
            withdraw: meeting_ids(withdraw),
        }
    }
}
