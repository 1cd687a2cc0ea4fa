//! Appointment creation
//!
//! A request goes through presence validation, user resolution, the booking
//! window, the conflict check and the weekly template check, in that order.
//! The first failing gate ends the request; the appointment is written only
//! after every gate has passed.

use chrono::{DateTime, Datelike, FixedOffset, Offset, TimeDelta, Timelike, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::SchedulingError;
use crate::{
    gateways::{AppointmentGateway, GatewayError, ScheduleGateway, UserGateway},
    models::{Appointment, ScheduleSlot},
    providers::{Clock, IdGenerator, SystemClock, UuidGenerator},
};

/// User part of the request
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub telefone: Option<String>,
}

/// Appointment part of the request
#[derive(Debug, Clone, Default)]
pub struct AppointmentInput {
    pub data_marcada: Option<DateTime<Utc>>,
}

/// Booking rules that are not stored in the gateways
#[derive(Debug, Clone, Copy)]
pub struct BookingPolicy {
    /// Requests at or beyond `now + horizon` are refused
    pub horizon: TimeDelta,
    /// Offset in which the weekly templates are expressed
    pub utc_offset: FixedOffset,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            horizon: TimeDelta::days(14),
            utc_offset: Utc.fix(),
        }
    }
}

impl BookingPolicy {
    /// Weekly template a date-time falls on, in the business offset
    pub fn slot_for(&self, data_marcada: DateTime<Utc>) -> ScheduleSlot {
        let local = data_marcada.with_timezone(&self.utc_offset);
        ScheduleSlot::at(
            local.weekday().num_days_from_sunday() as u8,
            local.hour() as u8,
            local.minute() as u8,
        )
    }

    fn within_window(&self, now: DateTime<Utc>, data_marcada: DateTime<Utc>) -> bool {
        data_marcada >= now && data_marcada - now < self.horizon
    }
}

/// Books an appointment for the user owning a phone number
pub struct CreateAppointmentUseCase {
    user_gateway: Arc<dyn UserGateway>,
    schedule_gateway: Arc<dyn ScheduleGateway>,
    appointment_gateway: Arc<dyn AppointmentGateway>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    policy: BookingPolicy,
}

impl CreateAppointmentUseCase {
    pub fn new(
        user_gateway: Arc<dyn UserGateway>,
        schedule_gateway: Arc<dyn ScheduleGateway>,
        appointment_gateway: Arc<dyn AppointmentGateway>,
    ) -> Self {
        Self {
            user_gateway,
            schedule_gateway,
            appointment_gateway,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            policy: BookingPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn execute(
        &self,
        user: UserInput,
        appointment: AppointmentInput,
    ) -> Result<Appointment, SchedulingError> {
        let (telefone, data_marcada) = match (user.telefone, appointment.data_marcada) {
            (Some(telefone), Some(data_marcada)) if !telefone.is_empty() => {
                (telefone, data_marcada)
            }
            _ => {
                warn!("create_appointment: missing phone number or date");
                return Err(SchedulingError::Validation);
            }
        };

        let found = self
            .user_gateway
            .find_by_phone(&telefone)
            .await
            .map_err(|e| {
                error!(telefone = %telefone, error = %e, "create_appointment: user lookup failed");
                e
            })?;

        let Some(usuario_id) = found.id else {
            warn!(telefone = %found.telefone, "create_appointment: no user for phone number");
            return Err(SchedulingError::UserNotResolvable);
        };

        let now = self.clock.now();
        if !self.policy.within_window(now, data_marcada) {
            warn!(
                telefone = %telefone,
                data_marcada = %data_marcada,
                now = %now,
                "create_appointment: date outside booking window"
            );
            return Err(SchedulingError::UnavailableDate);
        }

        let free = self
            .appointment_gateway
            .is_slot_free(data_marcada)
            .await
            .map_err(|e| {
                error!(data_marcada = %data_marcada, error = %e, "create_appointment: conflict check failed");
                e
            })?;

        if !free {
            warn!(data_marcada = %data_marcada, "create_appointment: date already booked");
            return Err(SchedulingError::SlotConflict);
        }

        let template = self.policy.slot_for(data_marcada);
        let offered = self
            .schedule_gateway
            .is_slot_offered(&template)
            .await
            .map_err(|e| {
                error!(data_marcada = %data_marcada, error = %e, "create_appointment: template check failed");
                e
            })?;

        if !offered {
            warn!(
                data_marcada = %data_marcada,
                dia_semana = template.dia_semana,
                hora = template.hora,
                minuto = template.minuto,
                "create_appointment: time not offered by the weekly schedule"
            );
            return Err(SchedulingError::UnavailableDate);
        }

        let appointment = Appointment::new(self.ids.generate(), usuario_id, data_marcada);

        let created = self
            .appointment_gateway
            .create(&appointment)
            .await
            .map_err(|e| match e {
                GatewayError::Conflict(reason) => {
                    warn!(data_marcada = %data_marcada, reason = %reason, "create_appointment: lost booking race");
                    SchedulingError::SlotConflict
                }
                other => {
                    error!(data_marcada = %data_marcada, error = %other, "create_appointment: persistence failed");
                    SchedulingError::Infrastructure(other)
                }
            })?;

        info!(
            appointment_id = %created.id,
            usuario_id = %created.usuario_id,
            data_marcada = %created.data_marcada,
            "create_appointment: success"
        );

        Ok(created)
    }
}
