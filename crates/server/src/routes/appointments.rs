//! Grooming and boarding appointment handlers.
//!
//! Every response carries the derived `status`. Canceled bookings are frozen.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use tracing::instrument;

use pawtopia_core::{AppointmentId, AppointmentStatus, Email};

use crate::db::{AppointmentRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::appointment::{
    Appointment, AppointmentInput, AppointmentUpdate, AppointmentView,
};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<AppointmentView>>> {
    let appointments = AppointmentRepository::new(state.pool()).list().await?;
    Ok(Json(views(appointments)))
}

/// Book an appointment for the caller.
#[instrument(skip_all, fields(service = ?input.groom_service, date = %input.date))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<AppointmentView>)> {
    let user_id = principal.require_customer()?;
    let booking = input.validate(today())?;

    let appointment = AppointmentRepository::new(state.pool())
        .create(user_id, &booking)
        .await?;

    add_breadcrumb(
        "appointment",
        "Appointment booked",
        &[("appointment_id", &appointment.id.to_string())],
    );
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

#[instrument(skip_all, fields(appointment_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<AppointmentId>,
    Json(update): Json<AppointmentUpdate>,
) -> Result<Json<AppointmentView>> {
    let current = find(&state, id).await?;
    principal.ensure_owner_or_admin(current.user_id)?;
    ensure_editable(current.status())?;
    let changes = update.validate(today())?;

    let Some(appointment) = AppointmentRepository::new(state.pool())
        .update(id, &changes)
        .await?
    else {
        return Err(rejected(&state, id, ensure_editable).await);
    };
    Ok(Json(appointment.into()))
}

#[instrument(skip_all, fields(appointment_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<AppointmentId>,
) -> Result<StatusCode> {
    let current = find(&state, id).await?;
    principal.ensure_owner_or_admin(current.user_id)?;
    AppointmentRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(appointment_id = %id))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(id): Path<AppointmentId>,
) -> Result<Json<AppointmentView>> {
    let current = find(&state, id).await?;
    principal.ensure_owner_or_admin(current.user_id)?;
    ensure_cancelable(current.status())?;

    let Some(appointment) = AppointmentRepository::new(state.pool()).cancel(id).await? else {
        return Err(rejected(&state, id, ensure_cancelable).await);
    };
    tracing::info!(appointment_id = %id, "Appointment canceled");
    Ok(Json(appointment.into()))
}

#[instrument(skip_all, fields(appointment_id = %id))]
pub async fn confirm(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<AppointmentId>,
) -> Result<Json<AppointmentView>> {
    let current = find(&state, id).await?;
    ensure_confirmable(current.status())?;

    let Some(appointment) = AppointmentRepository::new(state.pool()).confirm(id).await? else {
        return Err(rejected(&state, id, ensure_confirmable).await);
    };
    tracing::info!(appointment_id = %id, "Appointment confirmed");
    Ok(Json(appointment.into()))
}

/// Bookings made with `email`. Customers may only list their own address.
pub async fn by_email(
    State(state): State<AppState>,
    RequireAuth(principal): RequireAuth,
    Path(email): Path<String>,
) -> Result<Json<Vec<AppointmentView>>> {
    let email = Email::parse(&email)
        .map_err(|e| AppError::BadRequest(format!("Invalid email address: {e}")))?;

    if let Some(user_id) = principal.user_id() {
        let user = UserRepository::new(state.pool())
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if !user.email.matches(email.as_str()) {
            return Err(AppError::Forbidden(
                "You can only view your own appointments".to_string(),
            ));
        }
    }

    let appointments = AppointmentRepository::new(state.pool())
        .list_by_email(&email)
        .await?;
    Ok(Json(views(appointments)))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn views(appointments: Vec<Appointment>) -> Vec<AppointmentView> {
    appointments.into_iter().map(AppointmentView::from).collect()
}

async fn find(state: &AppState, id: AppointmentId) -> Result<Appointment> {
    AppointmentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
}

/// Why a guarded write matched no row: the appointment is gone, or another
/// request changed its status after `check` first passed.
async fn rejected(
    state: &AppState,
    id: AppointmentId,
    check: fn(AppointmentStatus) -> Result<()>,
) -> AppError {
    match find(state, id).await {
        Ok(current) => check(current.status()).err().unwrap_or_else(|| {
            AppError::Conflict("Appointment was changed by another request".to_string())
        }),
        Err(err) => err,
    }
}

fn ensure_editable(status: AppointmentStatus) -> Result<()> {
    if status == AppointmentStatus::Canceled {
        return Err(AppError::BadRequest(
            "Canceled appointments cannot be edited".to_string(),
        ));
    }
    Ok(())
}

fn ensure_cancelable(status: AppointmentStatus) -> Result<()> {
    if status == AppointmentStatus::Canceled {
        return Err(AppError::BadRequest(
            "Appointment is already canceled".to_string(),
        ));
    }
    Ok(())
}

fn ensure_confirmable(status: AppointmentStatus) -> Result<()> {
    match status {
        AppointmentStatus::Pending => Ok(()),
        AppointmentStatus::Confirmed => Err(AppError::BadRequest(
            "Appointment is already confirmed".to_string(),
        )),
        AppointmentStatus::Canceled => Err(AppError::BadRequest(
            "Canceled appointments cannot be confirmed".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canceled_appointments_are_frozen() {
        assert!(ensure_editable(AppointmentStatus::Canceled).is_err());
        assert!(ensure_cancelable(AppointmentStatus::Canceled).is_err());
        assert!(ensure_confirmable(AppointmentStatus::Canceled).is_err());
    }

    #[test]
    fn test_confirmed_appointments_can_still_change() {
        assert!(ensure_editable(AppointmentStatus::Confirmed).is_ok());
        assert!(ensure_cancelable(AppointmentStatus::Confirmed).is_ok());
        assert!(ensure_confirmable(AppointmentStatus::Confirmed).is_err());
    }

    #[test]
    fn test_pending_appointments_accept_every_action() {
        assert!(ensure_editable(AppointmentStatus::Pending).is_ok());
        assert!(ensure_cancelable(AppointmentStatus::Pending).is_ok());
        assert!(ensure_confirmable(AppointmentStatus::Pending).is_ok());
    }
}
