//! Gateways to the resources the scheduling use case depends on

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Appointment, ScheduleSlot, User};

pub mod memory;
pub mod postgres;

/// Failure of a gateway call, outside of business rules
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Storage or transport failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("Conflicting record: {0}")]
    Conflict(String),
}

/// Type alias for gateway results
pub type GatewayResult<T> = Result<T, GatewayError>;

/// User lookup
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Find the user owning `telefone`.
    ///
    /// Never fails for "not found": returns [`User::not_found`] instead.
    async fn find_by_phone(&self, telefone: &str) -> GatewayResult<User>;
}

/// Weekly schedule templates
#[async_trait]
pub trait ScheduleGateway: Send + Sync {
    /// True iff bookings are accepted at the slot's day, hour and minute
    async fn is_slot_offered(&self, slot: &ScheduleSlot) -> GatewayResult<bool>;
}

/// Appointment persistence
#[async_trait]
pub trait AppointmentGateway: Send + Sync {
    /// True iff no appointment occupies exactly `data_marcada`
    async fn is_slot_free(&self, data_marcada: DateTime<Utc>) -> GatewayResult<bool>;

    /// Persist `appointment` and return the stored representation.
    ///
    /// Returns [`GatewayError::Conflict`] when another appointment already
    /// holds the same instant.
    async fn create(&self, appointment: &Appointment) -> GatewayResult<Appointment>;
}
