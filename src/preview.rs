//! Image preview handles.
//!
//! A preview is an addressable copy of the held image: the bytes are staged
//! into a temporary file and exposed as a `file://` URL, with the pixel
//! dimensions probed once up front. One handle is acquired per file
//! selection and released when the selection changes or the scanner is
//! dropped; rendering only borrows it.

use crate::file::SelectedFile;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// A live preview of the held image. Dropping it deletes the staged file.
#[derive(Debug)]
pub struct PreviewHandle {
    staged: NamedTempFile,
    url: String,
    mime_type: String,
    dimensions: Option<(u32, u32)>,
}

impl PreviewHandle {
    /// Acquire a preview for `file`.
    ///
    /// Returns `None` for non-image files, and when staging fails (selection
    /// must still succeed, so the failure is only logged).
    pub fn acquire(file: &SelectedFile) -> Option<Self> {
        if !file.is_image() {
            return None;
        }

        let suffix = Path::new(file.name())
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let staged = match stage(file.bytes(), &suffix) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not stage preview for '{}': {}", file.name(), e);
                return None;
            }
        };

        let dimensions = probe_dimensions(file.bytes());
        let url = format!("file://{}", staged.path().display());
        debug!("Preview acquired: {} ({:?})", url, dimensions);

        Some(Self {
            staged,
            url,
            mime_type: file.mime_type().to_string(),
            dimensions,
        })
    }

    /// `file://` URL of the staged image.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &Path {
        self.staged.path()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// `(width, height)` in pixels, if the image header could be read.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Release the handle now instead of waiting for drop.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        debug!("Preview released: {}", self.url);
    }
}

fn stage(bytes: &[u8], suffix: &str) -> std::io::Result<NamedTempFile> {
    let mut f = tempfile::Builder::new()
        .prefix("docscan-preview-")
        .suffix(suffix)
        .tempfile()?;
    f.write_all(bytes)?;
    f.flush()?;
    Ok(f)
}

fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn image_gets_staged_preview_with_dimensions() {
        let file = SelectedFile::from_bytes("scan.png", png(12, 7));
        let preview = PreviewHandle::acquire(&file).expect("png gets a preview");

        assert!(preview.url().starts_with("file://"));
        assert!(preview.path().exists());
        assert_eq!(preview.mime_type(), "image/png");
        assert_eq!(preview.dimensions(), Some((12, 7)));
        assert_eq!(std::fs::read(preview.path()).unwrap(), file.bytes());
    }

    #[test]
    fn pdf_gets_no_preview() {
        let file = SelectedFile::from_bytes("report.pdf", b"%PDF-1.7".to_vec());
        assert!(PreviewHandle::acquire(&file).is_none());
    }

    #[test]
    fn undecodable_image_still_previews_without_dimensions() {
        let file = SelectedFile::from_bytes("broken.jpg", vec![1, 2, 3]);
        let preview = PreviewHandle::acquire(&file).expect("staged anyway");
        assert_eq!(preview.dimensions(), None);
    }

    #[test]
    fn release_deletes_staged_file() {
        let file = SelectedFile::from_bytes("scan.png", png(2, 2));
        let preview = PreviewHandle::acquire(&file).unwrap();
        let path = preview.path().to_path_buf();
        assert!(path.exists());

        preview.release();
        assert!(!path.exists());
    }
}
