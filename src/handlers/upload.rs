//! Upload pipeline controller.
//!
//! Orchestrates one request end to end: validate the multipart upload,
//! stage it in scratch storage, extract text, request structured data,
//! and assemble the response envelope. The scratch copy is removed on
//! every exit path, so no uploaded bytes outlive the request.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{UploadResponse, UploadedFile};
use crate::services::{PdfExtractor, Structurer};
use crate::state::AppState;

/// Scratch copy of an uploaded document.
///
/// Named by the request's own token rather than the user-supplied filename,
/// so two concurrent uploads sharing a filename cannot race on the same
/// path. The file is deleted when this guard drops, which covers early
/// returns and panics alike.
struct ScratchFile {
    inner: NamedTempFile,
}

impl ScratchFile {
    fn create(dir: &Path, request_id: &str, content: &[u8]) -> AppResult<Self> {
        let mut inner = tempfile::Builder::new()
            .prefix(&format!("{}-", request_id))
            .suffix(".pdf")
            .tempfile_in(dir)
            .map_err(|e| AppError::internal(format!("Failed to create scratch file: {}", e)))?;

        inner.write_all(content)?;
        inner.flush()?;

        Ok(Self { inner })
    }

    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn remove(self) -> AppResult<()> {
        self.inner
            .close()
            .map_err(|e| AppError::internal(format!("Failed to remove scratch file: {}", e)))
    }
}

pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting upload request");

    let file = read_file_from_multipart(&mut multipart).await?;

    if file.name.is_empty() || file.content.is_empty() {
        warn!(request_id = %request_id, file_name = %file.name, "Rejected invalid upload");
        return Err(AppError::InvalidFile);
    }

    if !file.has_pdf_extension() {
        warn!(request_id = %request_id, file_name = %file.name, "Rejected non-PDF upload");
        return Err(AppError::InvalidFileType);
    }

    info!(
        request_id = %request_id,
        file_name = %file.name,
        file_size = file.size,
        "Upload validated"
    );

    let scratch = ScratchFile::create(&state.config.upload_dir, &request_id, &file.content)?;
    debug!(request_id = %request_id, path = %scratch.path().display(), "Scratch file written");

    let extracted_text = PdfExtractor::new().extract_text(scratch.path());

    if extracted_text.is_empty() {
        warn!(request_id = %request_id, "No text found in PDF");
        scratch.remove()?;
        return Err(AppError::NoTextFound);
    }

    info!(
        request_id = %request_id,
        text_length = extracted_text.len(),
        "Text extracted, requesting structured data"
    );

    let structurer = Structurer::new(state.backend.clone(), state.config.max_prompt_chars);
    let data = structurer.structure(&extracted_text).await;

    scratch.remove()?;

    let total_time = start.elapsed().as_millis() as u64;
    info!(
        request_id = %request_id,
        total_time_ms = total_time,
        "Request completed successfully"
    );

    Ok(Json(UploadResponse::new(data, extracted_text)))
}

/// Preflight requests carry no payload and trigger no processing; the CORS
/// layer attaches the permissive headers.
pub async fn upload_preflight() -> StatusCode {
    StatusCode::OK
}

async fn read_file_from_multipart(multipart: &mut Multipart) -> AppResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await?;

        debug!(
            file_name = %file_name,
            file_size = data.len(),
            "File extracted from multipart form"
        );

        return Ok(UploadedFile::new(file_name, data.to_vec()));
    }

    Err(AppError::MissingFile)
}
