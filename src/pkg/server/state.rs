use std::sync::Arc;

use sqlx::{PgPool, Pool, Postgres, Transaction, postgres::PgPoolOptions};

use crate::conf::Settings;
use crate::pkg::internal::registration::RegistrationService;
use crate::pkg::internal::uploads::UploadStore;
use crate::prelude::Result;

pub fn db_pool(settings: &Settings) -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_pool_max_connections)
        .connect_lazy(&settings.database_url)?;
    Ok(pool)
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<PgPool>,
    pub registrations: Arc<RegistrationService>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<AppState> {
        let db_pool = Arc::new(db_pool(settings)?);
        let uploads = UploadStore::new(&settings.upload_dir);
        Ok(AppState {
            registrations: Arc::new(RegistrationService::new(db_pool.clone(), uploads)),
            db_pool,
        })
    }
}

pub trait GetTxn {
    fn begin_txn(
        &self,
    ) -> impl std::future::Future<Output = Result<Transaction<'static, Postgres>>> + Send;
}

impl GetTxn for Arc<PgPool> {
    async fn begin_txn(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.begin().await?)
    }
}
