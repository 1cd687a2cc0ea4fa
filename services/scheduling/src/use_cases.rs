//! Scheduling use cases and their failure taxonomy

use thiserror::Error;

use crate::gateways::GatewayError;

pub mod create_appointment;

pub use create_appointment::{
    AppointmentInput, BookingPolicy, CreateAppointmentUseCase, UserInput,
};

/// Reasons a scheduling request is refused
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Phone number or date missing
    #[error("null parameter(s)")]
    Validation,

    /// The phone number does not belong to a known user
    #[error("cannot create appointment for this user")]
    UserNotResolvable,

    /// Past date, beyond the booking horizon, or outside the weekly schedule
    #[error("date unavailable")]
    UnavailableDate,

    /// Another appointment holds the same instant
    #[error("date already booked by another customer")]
    SlotConflict,

    /// A gateway failed for reasons unrelated to the request
    #[error(transparent)]
    Infrastructure(#[from] GatewayError),
}

impl SchedulingError {
    /// True for refusals caused by the request itself, as opposed to
    /// failures of the underlying storage
    pub fn is_business(&self) -> bool {
        !matches!(self, SchedulingError::Infrastructure(_))
    }
}
