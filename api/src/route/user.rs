use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::user::show_user;

pub fn build_user_routers() -> Router<AppRegistry> {
    let users_routers = Router::new().route("/id/:user_id", get(show_user));

    Router::new().nest("/user", users_routers)
}
