use sqlx::PgConnection;

use crate::pkg::internal::adaptors::registrations::spec::{NewRegistration, RegistrationEntry};
use crate::pkg::internal::uploads::StoredFile;
use crate::pkg::internal::validate::Weekday;
use crate::{errors::Error, prelude::Result};

pub struct RegistrationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> RegistrationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        RegistrationMutator { pool }
    }

    /// Inserts the registration row. The unique constraint on email is
    /// the authoritative duplicate check; a violation surfaces as the
    /// duplicate-email error rather than a generic database failure.
    pub async fn create(&mut self, data: NewRegistration<'_>) -> Result<RegistrationEntry> {
        let row = sqlx::query_as::<_, RegistrationEntry>(
            r#"
            INSERT INTO registrations (
                name, email, contact, birthday, address, university_id, program_id,
                ojt_hours, cv_file, picture_file, endorsement_file, moa_file,
                terms_accepted, terms_accepted_at, terms_ip
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, CASE WHEN $13 THEN now() END, $14
            )
            RETURNING id, name, email, contact, birthday, address, university_id,
                      program_id, ojt_hours, cv_file, picture_file, endorsement_file,
                      moa_file, status, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.contact)
        .bind(data.birthday)
        .bind(data.address)
        .bind(data.university_id)
        .bind(data.program_id)
        .bind(data.ojt_hours)
        .bind(data.cv_file)
        .bind(data.picture_file)
        .bind(data.endorsement_file)
        .bind(data.moa_file)
        .bind(data.terms_accepted)
        .bind(data.terms_ip)
        .fetch_one(&mut *self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateEmail,
            _ => Error::from(e),
        })?;
        Ok(row)
    }

    pub async fn add_available_days(
        &mut self,
        registration_id: i32,
        days: &[Weekday],
    ) -> Result<()> {
        if days.is_empty() {
            return Ok(());
        }
        let mut query_builder =
            sqlx::QueryBuilder::new("INSERT INTO available_days (registration_id, day) ");
        query_builder.push_values(days, |mut b, day| {
            b.push_bind(registration_id).push_bind(day.as_str());
        });
        query_builder.build().execute(&mut *self.pool).await?;
        Ok(())
    }

    pub async fn record_file_audit(
        &mut self,
        registration_id: i32,
        files: &[StoredFile],
    ) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO file_uploads_audit (registration_id, slot, original_name, stored_path, file_size, mime_type) ",
        );
        query_builder.push_values(files, |mut b, file| {
            b.push_bind(registration_id)
                .push_bind(file.slot.field_name())
                .push_bind(file.original_name.as_str())
                .push_bind(file.path.to_string_lossy().into_owned())
                .push_bind(file.size)
                .push_bind(file.mime_type.as_str());
        });
        query_builder.build().execute(&mut *self.pool).await?;
        Ok(())
    }
}
