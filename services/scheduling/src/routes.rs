//! Scheduling service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde_json::json;
use tracing::warn;

use crate::{
    error::{ApiError, ApiResult},
    models::CreateAppointmentRequest,
    state::AppState,
    use_cases::{AppointmentInput, UserInput},
};

/// Create the router for the scheduling service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_appointment))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "scheduling-service"
    }))
}

/// Book an appointment for the user owning `telefone`
pub async fn create_appointment(
    State(state): State<AppState>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Rejected appointment payload: {}", e);
        ApiError::BadRequest(e.body_text())
    })?;

    // Empty values count as missing; the date is only parsed once a phone
    // number is present, so absent parameters always report as such
    let telefone = payload.telefone.filter(|telefone| !telefone.is_empty());
    let data_marcada = match (&telefone, payload.data_marcada.as_deref().map(str::trim)) {
        (Some(_), Some(raw)) if !raw.is_empty() => {
            Some(parse_data_marcada(raw, state.utc_offset)?)
        }
        _ => None,
    };

    let appointment = state
        .create_appointment
        .execute(UserInput { telefone }, AppointmentInput { data_marcada })
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Parse an RFC 3339 date-time; dates written without an offset are read in
/// the business offset
fn parse_data_marcada(raw: &str, utc_offset: FixedOffset) -> ApiResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| naive.and_local_timezone(utc_offset).single())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            warn!("Unparsable dataMarcada: {}", raw);
            ApiError::BadRequest(format!("invalid dataMarcada: {}", raw))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateways::memory::{
            InMemoryAppointmentGateway, InMemoryScheduleGateway, InMemoryUserGateway,
        },
        use_cases::{BookingPolicy, CreateAppointmentUseCase},
    };
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeDelta, TimeZone, Timelike};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const PHONE: &str = "+5511999990000";

    struct TestApp {
        router: Router,
        appointments: InMemoryAppointmentGateway,
        at: DateTime<Utc>,
    }

    /// Router over in-memory gateways offering a single weekly time two days from now
    fn test_app() -> TestApp {
        let policy = BookingPolicy::default();
        let at = (Utc::now() + TimeDelta::days(2))
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap();
        let slot = policy.slot_for(at);

        let users = InMemoryUserGateway::new().with_user("u1", PHONE);
        let schedule = InMemoryScheduleGateway::new().offer(slot.dia_semana, slot.hora, slot.minuto);
        let appointments = InMemoryAppointmentGateway::new();

        let use_case = CreateAppointmentUseCase::new(
            Arc::new(users),
            Arc::new(schedule),
            Arc::new(appointments.clone()),
        )
        .with_policy(policy);

        TestApp {
            router: create_router(AppState::new(use_case, policy.utc_offset)),
            appointments,
            at,
        }
    }

    async fn post_json(router: Router, body: String) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_created_appointment_is_returned() {
        let app = test_app();
        let body = json!({ "telefone": PHONE, "dataMarcada": app.at.to_rfc3339() }).to_string();

        let (status, value) = post_json(app.router, body).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(value["usuarioId"], "u1");
        assert!(!value["id"].as_str().unwrap().is_empty());
        assert_eq!(app.appointments.appointments().len(), 1);
        assert_eq!(app.appointments.appointments()[0].data_marcada, app.at);
    }

    #[tokio::test]
    async fn test_second_booking_of_same_instant_is_refused() {
        let app = test_app();
        let body = json!({ "telefone": PHONE, "dataMarcada": app.at.to_rfc3339() }).to_string();

        let (first, _) = post_json(app.router.clone(), body.clone()).await;
        let (second, value) = post_json(app.router, body).await;

        assert_eq!(first, StatusCode::CREATED);
        assert_eq!(second, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "date already booked by another customer");
    }

    #[tokio::test]
    async fn test_missing_phone_is_bad_request() {
        let app = test_app();
        let body = json!({ "dataMarcada": app.at.to_rfc3339() }).to_string();

        let (status, value) = post_json(app.router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "null parameter(s)");
        assert!(app.appointments.appointments().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_phone_is_bad_request() {
        let app = test_app();
        let body =
            json!({ "telefone": "+5511000000000", "dataMarcada": app.at.to_rfc3339() }).to_string();

        let (status, value) = post_json(app.router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "cannot create appointment for this user");
    }

    #[tokio::test]
    async fn test_empty_date_is_missing_parameter() {
        let app = test_app();
        let body = json!({ "telefone": PHONE, "dataMarcada": "" }).to_string();

        let (status, value) = post_json(app.router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "null parameter(s)");
        assert!(app.appointments.appointments().is_empty());
    }

    #[tokio::test]
    async fn test_empty_phone_wins_over_bad_date() {
        let app = test_app();
        let body = json!({ "telefone": "", "dataMarcada": "garbage" }).to_string();

        let (status, value) = post_json(app.router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"], "null parameter(s)");
    }

    #[tokio::test]
    async fn test_unparsable_date_is_bad_request() {
        let app = test_app();
        let body = json!({ "telefone": PHONE, "dataMarcada": "next tuesday" }).to_string();

        let (status, value) = post_json(app.router, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].as_str().unwrap().contains("dataMarcada"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = test_app();

        let (status, value) = post_json(app.router, "{\"telefone\":".to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].is_string());
    }

    #[test]
    fn test_date_without_offset_uses_business_offset() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();

        let parsed = parse_data_marcada("2030-01-07T10:00:00", offset).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2030, 1, 7, 13, 0, 0).unwrap());

        let explicit = parse_data_marcada("2030-01-07T10:00:00Z", offset).unwrap();
        assert_eq!(explicit, Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap());
    }
}
