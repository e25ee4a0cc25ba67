//! Dependency initialization and wiring for the board API.
use std::sync::Arc;

use board_core::BoardService;
use board_repository::{InMemoryRepository, PostgresRepository};
use tracing::info;

use crate::config::{Settings, StorageBackend};
use crate::errors::StartupError;

/// `Dependencies` holds the components the HTTP server needs.
pub struct Dependencies {
    pub service: Arc<BoardService>,
}

impl Dependencies {
    /// Builds the repository selected by `settings` and the service on top of it.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Ready to serve
    /// * `Err(StartupError)` - Missing `DATABASE_URL`, unreachable database or failed migration
    pub async fn new(settings: &Settings) -> Result<Self, StartupError> {
        info!(
            storage = ?settings.storage,
            vote_retry_attempts = settings.service.vote_retry_attempts,
            report_flag_threshold = settings.service.report_flag_threshold,
            "Initializing dependencies"
        );

        let service = match settings.storage {
            StorageBackend::Memory => BoardService::from_repository(
                Arc::new(InMemoryRepository::new()),
                settings.service.clone(),
            ),
            StorageBackend::Postgres => {
                let database_url = settings.database_url.as_deref().ok_or_else(|| {
                    StartupError::config("DATABASE_URL must be set for the postgres backend")
                })?;

                let repository = PostgresRepository::connect(database_url).await?;
                info!("PostgreSQL connection established");

                if settings.run_migrations {
                    repository.migrate().await?;
                    info!("Migrations applied");
                }

                BoardService::from_repository(Arc::new(repository), settings.service.clone())
            }
        };

        Ok(Self {
            service: Arc::new(service),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_needs_no_database() {
        let deps = Dependencies::new(&Settings::default()).await.unwrap();
        assert_eq!(deps.service.settings().vote_retry_attempts, 3);
    }

    #[tokio::test]
    async fn test_postgres_backend_requires_database_url() {
        let settings = Settings {
            storage: StorageBackend::Postgres,
            database_url: None,
            ..Settings::default()
        };
        let result = Dependencies::new(&settings).await;
        assert!(matches!(result, Err(StartupError::Config(_))));
    }

    #[tokio::test]
    async fn test_postgres_backend_invalid_url() {
        let settings = Settings {
            storage: StorageBackend::Postgres,
            database_url: Some("invalid-database-url".to_string()),
            ..Settings::default()
        };
        let result = Dependencies::new(&settings).await;
        assert!(matches!(result, Err(StartupError::Repository(_))));
    }
}
