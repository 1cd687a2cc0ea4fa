//! In-memory gateways for local development and testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use super::{AppointmentGateway, GatewayError, GatewayResult, ScheduleGateway, UserGateway};
use crate::models::{Appointment, ScheduleSlot, User};

/// Users keyed by phone number
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserGateway {
    users: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user, replacing any previous owner of the phone number
    pub fn with_user(self, id: impl Into<String>, telefone: impl Into<String>) -> Self {
        self.users.write().insert(telefone.into(), id.into());
        self
    }
}

#[async_trait]
impl UserGateway for InMemoryUserGateway {
    async fn find_by_phone(&self, telefone: &str) -> GatewayResult<User> {
        let users = self.users.read();
        Ok(match users.get(telefone) {
            Some(id) => User::new(id.clone(), telefone),
            None => User::not_found(telefone),
        })
    }
}

/// Offered (day of week, hour, minute) triples
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleGateway {
    slots: Arc<RwLock<HashSet<(u8, u8, u8)>>>,
}

impl InMemoryScheduleGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept bookings at one weekly time
    pub fn offer(self, dia_semana: u8, hora: u8, minuto: u8) -> Self {
        self.slots.write().insert((dia_semana, hora, minuto));
        self
    }

    /// Accept bookings every `step_minutes` from `open` (inclusive) to
    /// `close` (exclusive) hours, Monday to Friday
    pub fn business_hours(self, open: u8, close: u8, step_minutes: u8) -> Self {
        let step = step_minutes.clamp(1, 60);
        {
            let mut slots = self.slots.write();
            for dia_semana in 1..=5 {
                for hora in open..close.min(24) {
                    for minuto in (0..60).step_by(step as usize) {
                        slots.insert((dia_semana, hora, minuto));
                    }
                }
            }
        }
        self
    }

    /// Number of offered weekly times
    pub fn slot_count(&self) -> usize {
        self.slots.read().len()
    }
}

#[async_trait]
impl ScheduleGateway for InMemoryScheduleGateway {
    async fn is_slot_offered(&self, slot: &ScheduleSlot) -> GatewayResult<bool> {
        Ok(self
            .slots
            .read()
            .contains(&(slot.dia_semana, slot.hora, slot.minuto)))
    }
}

/// Appointments keyed by their instant
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentGateway {
    appointments: Arc<RwLock<BTreeMap<DateTime<Utc>, Appointment>>>,
}

impl InMemoryAppointmentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored appointments, ordered by date
    #[cfg(test)]
    pub fn appointments(&self) -> Vec<Appointment> {
        self.appointments.read().values().cloned().collect()
    }
}

#[async_trait]
impl AppointmentGateway for InMemoryAppointmentGateway {
    async fn is_slot_free(&self, data_marcada: DateTime<Utc>) -> GatewayResult<bool> {
        Ok(!self.appointments.read().contains_key(&data_marcada))
    }

    async fn create(&self, appointment: &Appointment) -> GatewayResult<Appointment> {
        let mut appointments = self.appointments.write();
        if appointments.contains_key(&appointment.data_marcada) {
            return Err(GatewayError::Conflict(format!(
                "appointment already exists at {}",
                appointment.data_marcada
            )));
        }

        appointments.insert(appointment.data_marcada, appointment.clone());
        Ok(appointment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_unknown_phone_yields_sentinel() {
        let gateway = InMemoryUserGateway::new().with_user("u1", "+5511999990000");

        let known = gateway.find_by_phone("+5511999990000").await.unwrap();
        assert_eq!(known.id.as_deref(), Some("u1"));

        let unknown = gateway.find_by_phone("+5511000000000").await.unwrap();
        assert!(unknown.id.is_none());
    }

    #[tokio::test]
    async fn test_business_hours_cover_weekdays_only() {
        let gateway = InMemoryScheduleGateway::new().business_hours(9, 18, 30);
        assert_eq!(gateway.slot_count(), 5 * 9 * 2);

        let monday = ScheduleSlot::at(1, 9, 30);
        let sunday = ScheduleSlot::at(0, 9, 30);
        let off_step = ScheduleSlot::at(1, 9, 15);

        assert!(gateway.is_slot_offered(&monday).await.unwrap());
        assert!(!gateway.is_slot_offered(&sunday).await.unwrap());
        assert!(!gateway.is_slot_offered(&off_step).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_second_booking_at_same_instant() {
        let gateway = InMemoryAppointmentGateway::new();
        let at = Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap();

        assert!(gateway.is_slot_free(at).await.unwrap());
        gateway
            .create(&Appointment::new("a1", "u1", at))
            .await
            .unwrap();
        assert!(!gateway.is_slot_free(at).await.unwrap());

        let second = gateway.create(&Appointment::new("a2", "u2", at)).await;
        assert!(matches!(second, Err(GatewayError::Conflict(_))));
        assert_eq!(gateway.appointments().len(), 1);
    }
}
