use std::sync::Arc;

use adapter::{
    database::ConnectionPool,
    repository::{
        health::HealthCheckRepositoryImpl, meeting::MeetingRepositoryImpl,
        user::UserRepositoryImpl,
    },
};
use kernel::repository::{
    health::HealthCheckRepository, meeting::MeetingRepository, user::UserRepository,
};

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    meeting_repository: Arc<dyn MeetingRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let meeting_repository = Arc::new(MeetingRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        Self {
            health_check_repository,
            meeting_repository,
            user_repository,
        }
    }

    /// Wires arbitrary implementations, e.g. in-memory fakes in tests.
    pub fn from_repositories(
        health_check_repository: Arc<dyn HealthCheckRepository>,
        meeting_repository: Arc<dyn MeetingRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            health_check_repository,
            meeting_repository,
            user_repository,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn meeting_repository(&self) -> Arc<dyn MeetingRepository> {
        self.meeting_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }
}
