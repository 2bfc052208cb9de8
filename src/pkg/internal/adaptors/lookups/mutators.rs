//! Get-or-create for the university and program lookup tables.
//!
//! Both use a unique constraint plus an upsert instead of
//! read-then-insert, so two concurrent submissions naming the same
//! brand-new university end up sharing one row. The no-op `DO UPDATE`
//! makes `RETURNING id` yield the existing row on conflict.

use sqlx::PgConnection;

use crate::prelude::Result;

pub struct UniversityMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> UniversityMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        UniversityMutator { pool }
    }

    pub async fn get_or_create(&mut self, name: &str, address: &str) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO universities (name, address)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(address)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(id)
    }
}

pub struct ProgramMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ProgramMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ProgramMutator { pool }
    }

    pub async fn get_or_create(&mut self, name: &str) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO programs (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(id)
    }
}
