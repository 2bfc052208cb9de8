//! File intake for the four registration upload slots.
//!
//! Every slot is validated (size, extension, declared type, magic
//! bytes) before anything touches the disk, so a rejected submission
//! never leaves partial files behind.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::{errors::Error, prelude::Result};

pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    Cv,
    Picture,
    Endorsement,
    Moa,
}

impl UploadSlot {
    pub const ALL: [UploadSlot; 4] = [
        UploadSlot::Cv,
        UploadSlot::Picture,
        UploadSlot::Endorsement,
        UploadSlot::Moa,
    ];

    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "cv" => Some(UploadSlot::Cv),
            "picture" => Some(UploadSlot::Picture),
            "endorsement" => Some(UploadSlot::Endorsement),
            "moa" => Some(UploadSlot::Moa),
            _ => None,
        }
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            UploadSlot::Cv => "cv",
            UploadSlot::Picture => "picture",
            UploadSlot::Endorsement => "endorsement",
            UploadSlot::Moa => "moa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UploadSlot::Cv => "CV/Resume",
            UploadSlot::Picture => "2x2 Picture",
            UploadSlot::Endorsement => "Endorsement Letter",
            UploadSlot::Moa => "MOA",
        }
    }

    pub fn required(&self) -> bool {
        matches!(self, UploadSlot::Cv | UploadSlot::Picture)
    }

    fn subdir(&self) -> &'static str {
        match self {
            UploadSlot::Cv => "cv",
            UploadSlot::Picture => "pictures",
            UploadSlot::Endorsement => "endorsements",
            UploadSlot::Moa => "moa",
        }
    }

    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadSlot::Cv => &["pdf"],
            UploadSlot::Picture => &["jpg", "jpeg", "png"],
            UploadSlot::Endorsement | UploadSlot::Moa => {
                &["pdf", "doc", "docx", "jpg", "jpeg", "png"]
            }
        }
    }

    fn allowed_mimes(&self) -> &'static [&'static str] {
        match self {
            UploadSlot::Cv => &["application/pdf"],
            UploadSlot::Picture => &["image/jpeg", "image/jpg", "image/png"],
            UploadSlot::Endorsement | UploadSlot::Moa => &[
                "application/pdf",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "image/jpeg",
                "image/jpg",
                "image/png",
            ],
        }
    }
}

/// One file as received from the multipart body.
#[derive(Debug)]
pub struct IncomingFile {
    pub original_name: String,
    pub declared_mime: Option<String>,
    pub data: Bytes,
}

/// One file after it has been written under the upload root.
#[derive(Debug)]
pub struct StoredFile {
    pub slot: UploadSlot,
    pub original_name: String,
    pub filename: String,
    pub path: PathBuf,
    pub size: i64,
    pub mime_type: String,
}

/// Writes validated uploads into per-slot subdirectories under a
/// configured root. Directories are created on demand.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        UploadStore { root: root.into() }
    }

    /// Validates every slot first, then writes. Validation problems
    /// for all slots are reported together.
    pub async fn store_all(
        &self,
        files: Vec<(UploadSlot, IncomingFile)>,
    ) -> Result<Vec<StoredFile>> {
        let mut errors = Vec::new();
        for slot in UploadSlot::ALL {
            let present = files.iter().any(|(s, _)| *s == slot);
            if slot.required() && !present {
                errors.push(format!("{} upload is required", slot.label()));
            }
        }
        let mut accepted = Vec::new();
        for (slot, file) in files {
            match validate_file(slot, &file) {
                Ok(mime) => accepted.push((slot, file, mime)),
                Err(message) => errors.push(message),
            }
        }
        if !errors.is_empty() {
            return Err(Error::File(errors));
        }

        let mut stored = Vec::new();
        for (slot, file, mime) in accepted {
            match self.write(slot, &file, mime).await {
                Ok(entry) => stored.push(entry),
                Err(err) => {
                    self.discard(&stored).await;
                    return Err(err);
                }
            }
        }
        Ok(stored)
    }

    /// Best-effort compensating cleanup after a failed persistence
    /// step. A crash between write and commit can still orphan files;
    /// that gap is accepted and surfaced in the logs, not hidden.
    pub async fn discard(&self, stored: &[StoredFile]) {
        for file in stored {
            if let Err(err) = tokio::fs::remove_file(&file.path).await {
                tracing::warn!("could not remove {}: {}", file.path.display(), err);
            }
        }
    }

    async fn write(
        &self,
        slot: UploadSlot,
        file: &IncomingFile,
        mime: &'static str,
    ) -> Result<StoredFile> {
        let dir = self.root.join(slot.subdir());
        tokio::fs::create_dir_all(&dir).await?;
        let filename = unique_filename(&file.original_name);
        let path = dir.join(&filename);
        tokio::fs::write(&path, &file.data).await?;
        tracing::debug!("stored {} upload at {}", slot.field_name(), path.display());
        Ok(StoredFile {
            slot,
            original_name: file.original_name.clone(),
            filename,
            path,
            size: file.data.len() as i64,
            mime_type: mime.to_string(),
        })
    }
}

/// Returns the sniffed mime type on success, a client-facing message
/// on rejection.
fn validate_file(
    slot: UploadSlot,
    file: &IncomingFile,
) -> std::result::Result<&'static str, String> {
    if file.data.len() > MAX_FILE_BYTES {
        return Err(format!("{} file is too large (max 10MB)", slot.label()));
    }
    let extension = extension_of(&file.original_name);
    if !slot.allowed_extensions().contains(&extension.as_str()) {
        return Err(format!("{} file type not allowed", slot.label()));
    }
    if let Some(declared) = file.declared_mime.as_deref() {
        if !slot.allowed_mimes().contains(&declared) {
            return Err(format!("{} file type not allowed", slot.label()));
        }
    }
    // Never trust the declared type alone; check the magic bytes.
    match sniff_mime(&file.data) {
        Some(mime) if slot.allowed_mimes().contains(&mime) => Ok(mime),
        _ => Err(format!("{} file content does not match an allowed type", slot.label())),
    }
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// `<uuid>_<YYYYmmddHHMMSS>.<ext>`, collision-resistant and free of
/// anything client-controlled beyond the extension.
fn unique_filename(original_name: &str) -> String {
    format!(
        "{}_{}.{}",
        Uuid::new_v4().simple(),
        Utc::now().format("%Y%m%d%H%M%S"),
        extension_of(original_name)
    )
}

fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(b"%PDF-") {
        Some("application/pdf")
    } else if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]) {
        Some("image/png")
    } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
        Some("image/jpeg")
    } else if data.starts_with(&[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1]) {
        Some("application/msword")
    } else if data.starts_with(b"PK\x03\x04") {
        // docx is a zip container
        Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00];

    fn pdf_file(name: &str) -> IncomingFile {
        IncomingFile {
            original_name: name.into(),
            declared_mime: Some("application/pdf".into()),
            data: Bytes::from_static(b"%PDF-1.7 minimal"),
        }
    }

    fn png_file(name: &str) -> IncomingFile {
        IncomingFile {
            original_name: name.into(),
            declared_mime: Some("image/png".into()),
            data: Bytes::from_static(PNG_HEADER),
        }
    }

    #[tokio::test]
    async fn stores_required_slots() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let stored = store
            .store_all(vec![
                (UploadSlot::Cv, pdf_file("resume.pdf")),
                (UploadSlot::Picture, png_file("me.png")),
            ])
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        for file in &stored {
            assert!(file.path.exists());
            assert!(file.filename.ends_with(&format!(".{}", extension_of(&file.original_name))));
        }
        assert!(dir.path().join("cv").is_dir());
        assert!(dir.path().join("pictures").is_dir());
    }

    #[tokio::test]
    async fn missing_required_slot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let err = store
            .store_all(vec![(UploadSlot::Cv, pdf_file("resume.pdf"))])
            .await
            .unwrap_err();
        match err {
            Error::File(errors) => {
                assert!(errors.contains(&"2x2 Picture upload is required".to_string()));
            }
            other => panic!("expected file error, got {:?}", other),
        }
        // rejection happens before anything is written
        assert!(!dir.path().join("cv").exists());
    }

    #[traced_test]
    #[tokio::test]
    async fn oversized_file_leaves_no_partial_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let mut big = b"%PDF-1.7 ".to_vec();
        big.resize(MAX_FILE_BYTES + 1, 0);
        let err = store
            .store_all(vec![
                (
                    UploadSlot::Cv,
                    IncomingFile {
                        original_name: "huge.pdf".into(),
                        declared_mime: Some("application/pdf".into()),
                        data: Bytes::from(big),
                    },
                ),
                (UploadSlot::Picture, png_file("me.png")),
            ])
            .await
            .unwrap_err();
        match err {
            Error::File(errors) => {
                assert!(errors.contains(&"CV/Resume file is too large (max 10MB)".to_string()));
            }
            other => panic!("expected file error, got {:?}", other),
        }
        assert!(!dir.path().join("pictures").exists());
    }

    #[tokio::test]
    async fn sniff_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        // png bytes smuggled under a pdf name and declared type
        let err = store
            .store_all(vec![
                (
                    UploadSlot::Cv,
                    IncomingFile {
                        original_name: "resume.pdf".into(),
                        declared_mime: Some("application/pdf".into()),
                        data: Bytes::from_static(PNG_HEADER),
                    },
                ),
                (UploadSlot::Picture, png_file("me.png")),
            ])
            .await
            .unwrap_err();
        match err {
            Error::File(errors) => {
                assert!(errors
                    .contains(&"CV/Resume file content does not match an allowed type".to_string()));
            }
            other => panic!("expected file error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let err = store
            .store_all(vec![
                (UploadSlot::Cv, pdf_file("resume.exe")),
                (UploadSlot::Picture, png_file("me.png")),
            ])
            .await
            .unwrap_err();
        match err {
            Error::File(errors) => {
                assert!(errors.contains(&"CV/Resume file type not allowed".to_string()));
            }
            other => panic!("expected file error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn discard_removes_stored_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let stored = store
            .store_all(vec![
                (UploadSlot::Cv, pdf_file("resume.pdf")),
                (UploadSlot::Picture, png_file("me.png")),
            ])
            .await
            .unwrap();
        store.discard(&stored).await;
        for file in &stored {
            assert!(!file.path.exists());
        }
    }

    #[test]
    fn sniffs_known_magic_bytes() {
        assert_eq!(sniff_mime(b"%PDF-1.4"), Some("application/pdf"));
        assert_eq!(sniff_mime(&[0xff, 0xd8, 0xff, 0xe0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"PK\x03\x04rest"), Some(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert_eq!(sniff_mime(b"plain text"), None);
    }
}
