//! The held file and the picker that produces it.
//!
//! [`pick_file`] plays the part of the browser's file input: it applies the
//! advisory extension filter, reads the bytes and guesses a MIME type. The
//! filter is a convenience for the user, not a security boundary; the
//! analysis service does its own checking.

use crate::config::ScannerConfig;
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A document chosen by the user: name, MIME type and byte content.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    /// Build a file handle from parts already in memory.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build a file handle, guessing the MIME type from the name's extension.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self::new(name, mime_type, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the file is an image and therefore gets a preview.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Pick a document from the local filesystem.
///
/// Fails when the path is missing or unreadable, or when its extension is
/// outside `config.accepted_extensions`.
pub async fn pick_file(path: impl AsRef<Path>, config: &ScannerConfig) -> Result<SelectedFile, ScanError> {
    let path = path.as_ref();
    check_extension(path, config)?;

    let bytes = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let file = SelectedFile::from_bytes(name, bytes);
    debug!(
        "Picked '{}' ({}, {} bytes)",
        file.name(),
        file.mime_type(),
        file.len()
    );
    Ok(file)
}

fn check_extension(path: &Path, config: &ScannerConfig) -> Result<(), ScanError> {
    let accepted = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| config.accepts_extension(e));

    if accepted {
        Ok(())
    } else {
        Err(ScanError::UnsupportedFileType {
            path: path.to_path_buf(),
            accepted: config.accept_list(),
        })
    }
}

fn read_error(path: &Path, e: std::io::Error) -> ScanError {
    let path: PathBuf = path.to_path_buf();
    match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path },
        _ => ScanError::ReadFailed { path, source: e },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_type_guessed_from_extension() {
        assert_eq!(SelectedFile::from_bytes("scan.PNG", vec![1]).mime_type(), "image/png");
        assert_eq!(SelectedFile::from_bytes("scan.jpeg", vec![1]).mime_type(), "image/jpeg");
        assert_eq!(
            SelectedFile::from_bytes("report.pdf", vec![1]).mime_type(),
            "application/pdf"
        );
        assert_eq!(
            SelectedFile::from_bytes("blob", vec![1]).mime_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn only_images_get_previews() {
        assert!(SelectedFile::from_bytes("a.jpg", vec![]).is_image());
        assert!(!SelectedFile::from_bytes("a.pdf", vec![]).is_image());
    }

    #[test]
    fn debug_hides_contents() {
        let f = SelectedFile::from_bytes("a.pdf", b"%PDF-1.7 secret".to_vec());
        let dbg = format!("{f:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("len: 15"));
    }

    #[tokio::test]
    async fn pick_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intake.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();

        let file = pick_file(&path, &ScannerConfig::default()).await.unwrap();
        assert_eq!(file.name(), "intake.pdf");
        assert_eq!(file.mime_type(), "application/pdf");
        assert_eq!(file.bytes(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn pick_rejects_unlisted_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");
        std::fs::write(&path, b"x").unwrap();

        let err = pick_file(&path, &ScannerConfig::default()).await.unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedFileType { .. }));
    }

    #[tokio::test]
    async fn pick_missing_file() {
        let err = pick_file("/definitely/not/here.png", &ScannerConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::FileNotFound { .. }));
    }
}
