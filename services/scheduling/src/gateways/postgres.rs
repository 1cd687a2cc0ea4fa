//! PostgreSQL gateways

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{info, warn};

use super::{AppointmentGateway, GatewayError, GatewayResult, ScheduleGateway, UserGateway};
use crate::models::{Appointment, ScheduleSlot, User};

/// User gateway backed by the `users` table
#[derive(Clone)]
pub struct PgUserGateway {
    pool: PgPool,
}

impl PgUserGateway {
    /// Create a new user gateway
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserGateway for PgUserGateway {
    async fn find_by_phone(&self, telefone: &str) -> GatewayResult<User> {
        let row = sqlx::query(
            r#"
            SELECT id, telefone
            FROM users
            WHERE telefone = $1
            "#,
        )
        .bind(telefone)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(User {
                id: row.get("id"),
                telefone: row.get("telefone"),
            }),
            None => Ok(User::not_found(telefone)),
        }
    }
}

/// Schedule gateway backed by the `schedule_slots` table
#[derive(Clone)]
pub struct PgScheduleGateway {
    pool: PgPool,
}

impl PgScheduleGateway {
    /// Create a new schedule gateway
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleGateway for PgScheduleGateway {
    async fn is_slot_offered(&self, slot: &ScheduleSlot) -> GatewayResult<bool> {
        let offered: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM schedule_slots
                WHERE dia_semana = $1 AND hora = $2 AND minuto = $3
            )
            "#,
        )
        .bind(i16::from(slot.dia_semana))
        .bind(i16::from(slot.hora))
        .bind(i16::from(slot.minuto))
        .fetch_one(&self.pool)
        .await?;

        Ok(offered)
    }
}

/// Appointment gateway backed by the `appointments` table
#[derive(Clone)]
pub struct PgAppointmentGateway {
    pool: PgPool,
}

impl PgAppointmentGateway {
    /// Create a new appointment gateway
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentGateway for PgAppointmentGateway {
    async fn is_slot_free(&self, data_marcada: DateTime<Utc>) -> GatewayResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM appointments WHERE data_marcada = $1)",
        )
        .bind(data_marcada)
        .fetch_one(&self.pool)
        .await?;

        Ok(!taken)
    }

    async fn create(&self, appointment: &Appointment) -> GatewayResult<Appointment> {
        info!("Creating appointment: {}", appointment.id);

        let row = sqlx::query(
            r#"
            INSERT INTO appointments (id, usuario_id, data_marcada)
            VALUES ($1, $2, $3)
            RETURNING id, usuario_id, data_marcada
            "#,
        )
        .bind(&appointment.id)
        .bind(&appointment.usuario_id)
        .bind(appointment.data_marcada)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                warn!("Appointment insert hit a unique constraint: {}", db);
                GatewayError::Conflict(db.message().to_string())
            }
            other => GatewayError::Database(other),
        })?;

        Ok(Appointment {
            id: row.get("id"),
            usuario_id: row.get("usuario_id"),
            data_marcada: row.get("data_marcada"),
        })
    }
}
