//! `POST /submit-incoming`: the internship registration endpoint.
//!
//! One submission walks Received → Validated → FilesAccepted →
//! Persisted → Responded; any gate can reject it with the shared
//! envelope.

use axum::{
    Json,
    extract::{Multipart, State},
    http::HeaderMap,
};

use crate::pkg::internal::registration::SubmissionReceipt;
use crate::pkg::internal::uploads::{IncomingFile, UploadSlot};
use crate::pkg::internal::validate::{self, RawSubmission};
use crate::pkg::server::response::Envelope;
use crate::{pkg::server::state::AppState, prelude::Result};

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Envelope<SubmissionReceipt>>> {
    let (raw, files) = collect_submission(multipart).await?;
    let form = validate::validate_and_sanitize(raw)?;
    let receipt = state
        .registrations
        .submit(form, files, client_ip(&headers))
        .await?;
    Ok(Json(Envelope::ok(
        "Registration submitted successfully! We will contact you soon.",
        receipt,
    )))
}

async fn collect_submission(
    mut multipart: Multipart,
) -> Result<(RawSubmission, Vec<(UploadSlot, IncomingFile)>)> {
    let mut raw = RawSubmission::default();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => raw.name = field.text().await?,
            "email" => raw.email = field.text().await?,
            "contact" => raw.contact = field.text().await?,
            "birthday" => raw.birthday = field.text().await?,
            "address" => raw.address = field.text().await?,
            "school" => raw.school = field.text().await?,
            "program" => raw.program = field.text().await?,
            "school_address" => raw.school_address = field.text().await?,
            "ojt_hours" => raw.ojt_hours = field.text().await?,
            "days" | "days[]" => raw.days.push(field.text().await?),
            "terms" => raw.terms = Some(field.text().await?),
            "cv" | "picture" | "endorsement" | "moa" => {
                let slot = match UploadSlot::from_field(&field_name) {
                    Some(slot) => slot,
                    None => continue,
                };
                let original_name = field.file_name().unwrap_or("").to_string();
                let declared_mime = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                // browsers send an empty part for an untouched file input
                if original_name.is_empty() && data.is_empty() {
                    continue;
                }
                push_file(
                    &mut files,
                    slot,
                    IncomingFile {
                        original_name,
                        declared_mime,
                        data,
                    },
                );
            }
            _ => {
                let _ = field.bytes().await?;
            }
        }
    }
    Ok((raw, files))
}

/// First part per slot wins; a repeated part would be written to disk
/// but never referenced by the registration row.
fn push_file(
    files: &mut Vec<(UploadSlot, IncomingFile)>,
    slot: UploadSlot,
    file: IncomingFile,
) {
    if files.iter().any(|(s, _)| *s == slot) {
        tracing::warn!("ignoring repeated {} part", slot.field_name());
        return;
    }
    files.push((slot, file));
}

/// The service runs behind a reverse proxy; the peer address is the
/// proxy's, so the client IP comes from the forwarding header.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
