use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::prelude::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Type)]
#[sqlx(type_name = "registration_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationEntry {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub birthday: NaiveDate,
    pub address: String,
    pub university_id: i32,
    pub program_id: i32,
    pub ojt_hours: i32,
    pub cv_file: String,
    pub picture_file: String,
    pub endorsement_file: Option<String>,
    pub moa_file: Option<String>,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for a fresh registration row. File columns hold the
/// generated filenames, not the originals.
#[derive(Debug)]
pub struct NewRegistration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub contact: &'a str,
    pub birthday: NaiveDate,
    pub address: &'a str,
    pub university_id: i32,
    pub program_id: i32,
    pub ojt_hours: i32,
    pub cv_file: &'a str,
    pub picture_file: &'a str,
    pub endorsement_file: Option<&'a str>,
    pub moa_file: Option<&'a str>,
    pub terms_accepted: bool,
    pub terms_ip: Option<&'a str>,
}
