//! The registration writer: one component, one contract.
//!
//! Files are written to disk before the database transaction commits.
//! If persistence fails, the already-written files are removed. The
//! window between a committed write and a process crash can still
//! orphan files on disk; that is a known, logged gap.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;

use crate::pkg::internal::adaptors::lookups::mutators::{ProgramMutator, UniversityMutator};
use crate::pkg::internal::adaptors::registrations::mutators::RegistrationMutator;
use crate::pkg::internal::adaptors::registrations::selectors::RegistrationSelector;
use crate::pkg::internal::adaptors::registrations::spec::NewRegistration;
use crate::pkg::internal::uploads::{IncomingFile, StoredFile, UploadSlot, UploadStore};
use crate::pkg::internal::validate::RegistrationForm;
use crate::pkg::server::state::GetTxn;
use crate::{errors::Error, prelude::Result};

/// Returned to the client inside the success envelope.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub files_uploaded: BTreeMap<&'static str, String>,
}

pub struct RegistrationService {
    pool: Arc<PgPool>,
    uploads: UploadStore,
}

impl RegistrationService {
    pub fn new(pool: Arc<PgPool>, uploads: UploadStore) -> Self {
        RegistrationService { pool, uploads }
    }

    pub async fn submit(
        &self,
        form: RegistrationForm,
        files: Vec<(UploadSlot, IncomingFile)>,
        client_ip: Option<String>,
    ) -> Result<SubmissionReceipt> {
        // cheap duplicate rejection before any disk writes
        {
            let mut conn = self.pool.acquire().await?;
            if RegistrationSelector::new(&mut conn).email_exists(&form.email).await? {
                return Err(Error::DuplicateEmail);
            }
        }

        let stored = self.uploads.store_all(files).await?;
        match self.persist(&form, &stored, client_ip.as_deref()).await {
            Ok(id) => {
                tracing::info!("new registration: id {}, email: {}", id, &form.email);
                Ok(SubmissionReceipt {
                    id,
                    name: form.name,
                    email: form.email,
                    files_uploaded: stored
                        .iter()
                        .map(|f| (f.slot.field_name(), f.filename.clone()))
                        .collect(),
                })
            }
            Err(err) => {
                self.uploads.discard(&stored).await;
                Err(err)
            }
        }
    }

    /// All rows for one registration land in a single transaction:
    /// either everything exists afterwards or nothing does.
    async fn persist(
        &self,
        form: &RegistrationForm,
        stored: &[StoredFile],
        client_ip: Option<&str>,
    ) -> Result<i32> {
        let mut tx = self.pool.begin_txn().await?;

        // re-check inside the transaction; the unique constraint on
        // the insert below closes the remaining race
        if RegistrationSelector::new(&mut tx).email_exists(&form.email).await? {
            return Err(Error::DuplicateEmail);
        }

        let university_id = UniversityMutator::new(&mut tx)
            .get_or_create(&form.school, &form.school_address)
            .await?;
        let program_id = ProgramMutator::new(&mut tx).get_or_create(&form.program).await?;

        let entry = RegistrationMutator::new(&mut tx)
            .create(NewRegistration {
                name: &form.name,
                email: &form.email,
                contact: &form.contact,
                birthday: form.birthday,
                address: &form.address,
                university_id,
                program_id,
                ojt_hours: form.ojt_hours,
                cv_file: filename_for(stored, UploadSlot::Cv)?,
                picture_file: filename_for(stored, UploadSlot::Picture)?,
                endorsement_file: optional_filename_for(stored, UploadSlot::Endorsement),
                moa_file: optional_filename_for(stored, UploadSlot::Moa),
                terms_accepted: form.terms_accepted,
                terms_ip: if form.terms_accepted { client_ip } else { None },
            })
            .await?;

        RegistrationMutator::new(&mut tx)
            .add_available_days(entry.id, &form.days)
            .await?;
        RegistrationMutator::new(&mut tx)
            .record_file_audit(entry.id, stored)
            .await?;

        tx.commit().await?;
        Ok(entry.id)
    }
}

fn filename_for(stored: &[StoredFile], slot: UploadSlot) -> Result<&str> {
    optional_filename_for(stored, slot)
        .ok_or_else(|| Error::File(vec![format!("{} upload is required", slot.label())]))
}

fn optional_filename_for(stored: &[StoredFile], slot: UploadSlot) -> Option<&str> {
    stored
        .iter()
        .find(|f| f.slot == slot)
        .map(|f| f.filename.as_str())
}
