use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, telemetry, utils, web};

use crate::{
    db::postgres::{create_pool, run_migrations},
    errors::AppError,
    repositories::{
        experience::ExperienceRepository, memory::InMemoryExperienceRepo, sqlx_repo::SqlxExperienceRepo,
    },
    settings::{AppConfig, StorageBackend},
    use_cases::experience::ExperienceHandler,
};

pub struct AppState {
    pub experience_handler: AppExperienceHandler,
}

pub type AppExperienceHandler = ExperienceHandler<Arc<dyn ExperienceRepository>>;

impl AppState {
    pub fn new(config: &AppConfig, experience_repo: Arc<dyn ExperienceRepository>) -> Self {
        let experience_handler = ExperienceHandler::new(experience_repo)
            .with_fault_details(config.expose_fault_details);

        AppState { experience_handler }
    }

    /// Opens the configured store and builds the state around it.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let experience_repo = build_repository(config).await?;
        Ok(AppState::new(config, experience_repo))
    }
}

pub async fn build_repository(config: &AppConfig) -> Result<Arc<dyn ExperienceRepository>, AppError> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url, config.max_connections).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(SqlxExperienceRepo::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; records are lost on shutdown");
            Ok(Arc::new(InMemoryExperienceRepo::new()))
        }
    }
}
