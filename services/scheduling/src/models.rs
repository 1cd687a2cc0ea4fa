//! Scheduling domain models and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Customer, identified by phone number
///
/// A lookup that finds nobody yields a `User` without `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<String>,
    pub telefone: String,
}

impl User {
    pub fn new(id: impl Into<String>, telefone: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            telefone: telefone.into(),
        }
    }

    /// Sentinel returned when no user matches the phone number
    pub fn not_found(telefone: impl Into<String>) -> Self {
        Self {
            id: None,
            telefone: telefone.into(),
        }
    }
}

/// Recurring weekly template: bookings are accepted at this day, hour and minute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub id: Option<String>,
    /// Day of week, 0 = Sunday
    pub dia_semana: u8,
    pub hora: u8,
    pub minuto: u8,
}

impl ScheduleSlot {
    /// Slot without identity, used to ask whether a time is offered
    pub fn at(dia_semana: u8, hora: u8, minuto: u8) -> Self {
        Self {
            id: None,
            dia_semana,
            hora,
            minuto,
        }
    }
}

/// Concrete booking of a user at an absolute date-time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub usuario_id: String,
    pub data_marcada: DateTime<Utc>,
}

impl Appointment {
    pub fn new(
        id: impl Into<String>,
        usuario_id: impl Into<String>,
        data_marcada: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            usuario_id: usuario_id.into(),
            data_marcada,
        }
    }
}

/// Request body for appointment creation
///
/// Both fields are optional at the wire level so that missing values reach
/// the use case and are reported like any other business failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub telefone: Option<String>,
    pub data_marcada: Option<String>,
}
