use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod gateways;
mod models;
mod providers;
mod routes;
mod state;
mod use_cases;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;

use crate::{
    config::{ServiceConfig, StorageBackend},
    gateways::{
        memory::{InMemoryAppointmentGateway, InMemoryScheduleGateway, InMemoryUserGateway},
        postgres::{PgAppointmentGateway, PgScheduleGateway, PgUserGateway},
    },
    state::AppState,
    use_cases::CreateAppointmentUseCase,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting scheduling service");

    let config = ServiceConfig::from_env()?;
    let policy = config.booking_policy()?;

    let use_case = build_use_case(&config).await?.with_policy(policy);
    let app = routes::create_router(AppState::new(use_case, policy.utc_offset));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Scheduling service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire the use case to the configured storage backend
async fn build_use_case(config: &ServiceConfig) -> Result<CreateAppointmentUseCase> {
    match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;

            Ok(CreateAppointmentUseCase::new(
                Arc::new(PgUserGateway::new(pool.clone())),
                Arc::new(PgScheduleGateway::new(pool.clone())),
                Arc::new(PgAppointmentGateway::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; appointments are lost on restart");

            let users = config
                .seeded_users()?
                .into_iter()
                .fold(InMemoryUserGateway::new(), |users, (id, telefone)| {
                    users.with_user(id, telefone)
                });
            let schedule = InMemoryScheduleGateway::new().business_hours(9, 18, 30);
            info!("Memory schedule offers {} weekly slots", schedule.slot_count());

            Ok(CreateAppointmentUseCase::new(
                Arc::new(users),
                Arc::new(schedule),
                Arc::new(InMemoryAppointmentGateway::new()),
            ))
        }
    }
}
