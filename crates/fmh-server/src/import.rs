//! `POST /api/import`: upload a logbook PDF and import it for the caller.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use fmh_core::model::{ImportOptions, ImportSource};
use fmh_core::{import_pdf, PdfUpload, SessionContext};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub data: ImportData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportData {
    pub modules_processed: usize,
    pub procedures_imported: usize,
    pub user_info: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: Option<String>,
}

pub async fn import(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>, ApiError> {
    let identity = authenticate(Arc::clone(&state.store), &headers).await?;

    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "rejected non-multipart upload");
        ApiError::BadRequest("Expected a multipart/form-data body".into())
    })?;
    let upload = read_pdf_field(&mut multipart).await?;
    tracing::info!(
        user_id = %identity.user_id,
        file = %upload.filename,
        bytes = upload.bytes.len(),
        "received logbook upload"
    );

    let options = ImportOptions {
        hospital: state.hospital.clone(),
        ..ImportOptions::default()
    };
    let session = SessionContext::signed_in(identity.clone());
    let result = import_pdf(
        Arc::clone(&state.store),
        Arc::clone(&state.extractor),
        &session,
        upload,
        options,
    )
    .await;
    session.sign_out();
    let summary = result?;

    Ok(Json(ImportResponse {
        success: true,
        message: format!(
            "Imported {} procedures from {} modules",
            summary.procedures_imported, summary.modules_processed
        ),
        data: ImportData {
            modules_processed: summary.modules_processed,
            procedures_imported: summary.procedures_imported,
            user_info: UserInfo {
                id: identity.user_id,
                email: identity.email,
            },
        },
    }))
}

/// Read the `file` field, which must be a non-empty PDF.
async fn read_pdf_field(multipart: &mut Multipart) -> Result<PdfUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_pdf = field
            .content_type()
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE));
        if !is_pdf {
            return Err(ApiError::BadRequest("Only PDF files are accepted".into()));
        }

        let filename = field.file_name().unwrap_or("logbook.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".into()));
        }

        return Ok(PdfUpload {
            bytes: bytes.to_vec(),
            filename,
            source: ImportSource::ServerUpload,
        });
    }

    Err(ApiError::BadRequest("No file provided".into()))
}
