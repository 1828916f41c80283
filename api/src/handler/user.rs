use axum::{
    extract::{Path, State},
    Json,
};
use kernel::model::{id::UserId, user::User};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::model::user::UserResponse;

// A wallet the store has never seen is a user with empty lists.
pub async fn show_user(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    registry
        .user_repository()
        .find_by_id(&user_id)
        .await
        .map(|user| user.unwrap_or_else(|| User::unregistered(user_id)))
        .map(UserResponse::from)
        .map(Json)
}
