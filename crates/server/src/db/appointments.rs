//! Grooming and boarding appointment repository.

use sqlx::PgPool;

use pawtopia_core::{AppointmentId, Email, UserId};

use super::RepositoryError;
use crate::models::appointment::{Appointment, ValidAppointment, ValidAppointmentUpdate};

const APPOINTMENT_COLUMNS: &str =
    "id, user_id, date, time, email, contact_no, service, price, canceled, confirmed, created_at";

pub struct AppointmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppointmentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        appointment: &ValidAppointment,
    ) -> Result<Appointment, RepositoryError> {
        let created = sqlx::query_as::<_, Appointment>(&format!(
            "INSERT INTO appointments (user_id, date, time, email, contact_no, service, price)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(appointment.date)
        .bind(appointment.time)
        .bind(&appointment.email)
        .bind(&appointment.contact_no)
        .bind(appointment.service)
        .bind(appointment.price)
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(appointment)
    }

    /// All appointments in schedule order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY date, time, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(appointments)
    }

    /// Appointments booked under `email`, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_email(&self, email: &Email) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE lower(email) = lower($1)
             ORDER BY date, time, id"
        ))
        .bind(email)
        .fetch_all(self.pool)
        .await?;
        Ok(appointments)
    }

    /// Apply a partial edit.
    ///
    /// Returns `None` if the appointment does not exist or is canceled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: AppointmentId,
        changes: &ValidAppointmentUpdate,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments SET
                 date = COALESCE($2, date),
                 time = COALESCE($3, time),
                 email = COALESCE($4, email),
                 contact_no = COALESCE($5, contact_no)
             WHERE id = $1 AND NOT canceled
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.date)
        .bind(changes.time)
        .bind(changes.email.as_ref())
        .bind(changes.contact_no.as_deref())
        .fetch_optional(self.pool)
        .await?;
        Ok(appointment)
    }

    /// Mark an appointment canceled.
    ///
    /// Returns `None` if the appointment does not exist or is already canceled.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cancel(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        self.set_flags(id, "canceled = TRUE", "NOT canceled").await
    }

    /// Mark a pending appointment confirmed.
    ///
    /// Returns `None` if the appointment does not exist or is no longer pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn confirm(&self, id: AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        self.set_flags(id, "confirmed = TRUE", "NOT canceled AND NOT confirmed")
            .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the appointment does not exist.
    pub async fn delete(&self, id: AppointmentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Appointments that are neither canceled nor confirmed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_pending(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE NOT canceled AND NOT confirmed",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    async fn set_flags(
        &self,
        id: AppointmentId,
        assignment: &'static str,
        guard: &'static str,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments SET {assignment}
             WHERE id = $1 AND {guard}
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(appointment)
    }
}
