use sqlx::PgConnection;

use crate::prelude::Result;

pub struct RegistrationSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> RegistrationSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        RegistrationSelector { pool }
    }

    pub async fn email_exists(&mut self, email: &str) -> Result<bool> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM registrations WHERE email = $1 LIMIT 1")
                .bind(email)
                .fetch_optional(&mut *self.pool)
                .await?;
        Ok(row.is_some())
    }
}
