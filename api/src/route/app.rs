use axum::Router;
use registry::AppRegistry;

use super::{
    health::build_health_check_routers, meeting::build_meeting_routers, user::build_user_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_meeting_routers())
        .merge(build_user_routers());
    Router::new().nest("/api", router)
}
