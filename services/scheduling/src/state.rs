//! Application state shared across handlers

use chrono::FixedOffset;
use std::sync::Arc;

use crate::use_cases::CreateAppointmentUseCase;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub create_appointment: Arc<CreateAppointmentUseCase>,
    /// Offset applied to request dates written without one
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(create_appointment: CreateAppointmentUseCase, utc_offset: FixedOffset) -> Self {
        Self {
            create_appointment: Arc::new(create_appointment),
            utc_offset,
        }
    }
}
