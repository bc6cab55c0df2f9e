//! services/api/src/extract.rs
//!
//! Text extraction for uploaded study documents. PDFs go through `pdf-extract`;
//! DOCX files are unpacked from their zip container and the text runs are read
//! straight out of `word/document.xml`. Anything else is rejected.
//!
//! Also provides the upload spool: the raw upload lands in a uniquely named
//! file that is removed again when the guard drops, whether or not extraction
//! succeeded.

use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use study_buddy_core::error::CoreError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

//=========================================================================================
// Upload Spool
//=========================================================================================

/// A spooled upload on disk. The file is deleted when this guard drops.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Writes the upload bytes to a uniquely named file under `dir`,
    /// creating the directory if needed.
    pub async fn write(dir: &Path, data: &[u8]) -> Result<Self, ApiError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(Uuid::new_v4().to_string());
        tokio::fs::write(&path, data).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove spooled upload {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

//=========================================================================================
// Extraction
//=========================================================================================

/// Extracts the full text of the file at `path`, dispatching on the upload's
/// declared content type. Unknown types fail with `UnsupportedFormat`.
pub async fn extract_text(path: &Path, content_type: &str) -> Result<String, ApiError> {
    match content_type {
        PDF_CONTENT_TYPE => extract_pdf(path).await,
        DOCX_CONTENT_TYPE => extract_docx(path).await,
        other => Err(ApiError::Core(CoreError::UnsupportedFormat(
            other.to_string(),
        ))),
    }
}

async fn extract_pdf(path: &Path) -> Result<String, ApiError> {
    let path = path.to_owned();
    // PDF parsing is CPU-bound; keep it off the async workers.
    tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("PDF extraction task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("Failed to extract PDF text: {}", e)))
}

async fn extract_docx(path: &Path) -> Result<String, ApiError> {
    let path = path.to_owned();
    tokio::task::spawn_blocking(move || docx_text(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("DOCX extraction task failed: {}", e)))?
}

/// Reads `word/document.xml` out of the DOCX container and concatenates its
/// `<w:t>` text runs, with a line break at every paragraph (`</w:p>`).
fn docx_text(path: &Path) -> Result<String, ApiError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ApiError::Internal(format!("Failed to open DOCX container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ApiError::Internal(format!("DOCX has no word/document.xml: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ApiError::Internal(format!("Failed to read DOCX document body: {}", e)))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run => {
                let run = t
                    .unescape()
                    .map_err(|e| ApiError::Internal(format!("Bad DOCX text run: {}", e)))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ApiError::Internal(format!(
                    "Failed to parse DOCX XML: {}",
                    e
                )))
            }
        }
    }

    Ok(text)
}
