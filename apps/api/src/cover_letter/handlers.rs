//! Axum route handlers for the Cover Letter API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::cover_letter::generator::{
    generate_cover_letter, render_cover_letter_docx, render_cover_letter_pdf,
};
use crate::document::convert::extract_plain_text;
use crate::document::docx::DOCX_MIME;
use crate::document::pdf::PDF_MIME;
use crate::document::{DocumentError, SourceDocument};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_text: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterDownloadRequest {
    pub cover_text: String,
}

/// POST /api/v1/cover-letters
///
/// Multipart form: `job_description` and an optional `resume` (PDF or DOCX).
/// Returns the generated letter text.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let mut job_text = String::new();
    let mut resume: Option<SourceDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                job_text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid job_description: {e}"))
                })?;
            }
            "resume" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                // Browsers send an empty part when the optional file is left out.
                if !bytes.is_empty() {
                    resume = Some(SourceDocument::new(file_name, bytes));
                }
            }
            _ => {}
        }
    }

    if job_text.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let resume_text = match resume {
        Some(source) => tokio::task::spawn_blocking(move || extract_plain_text(&source))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("text extraction panicked: {e}")))??,
        None => String::new(),
    };

    let cover_text = generate_cover_letter(
        state.llm.as_ref(),
        &state.config.llm_model,
        &job_text,
        &resume_text,
    )
    .await
    .map_err(|e| AppError::Llm(format!("Cover letter generation failed: {e}")))?;

    Ok(Json(CoverLetterResponse { cover_text }))
}

fn require_cover_text(request: &CoverLetterDownloadRequest) -> Result<(), AppError> {
    if request.cover_text.trim().is_empty() {
        return Err(AppError::Validation(
            "cover_text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn attachment(content_type: &'static str, disposition: &'static str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// POST /api/v1/cover-letters/docx
///
/// Renders previously generated letter text as a DOCX download.
pub async fn handle_cover_letter_docx(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterDownloadRequest>,
) -> Result<Response, AppError> {
    require_cover_text(&request)?;

    let template = match &state.config.cover_letter_template {
        Some(path) => Some(tokio::fs::read(path).await.map_err(DocumentError::from)?),
        None => None,
    };

    let bytes = tokio::task::spawn_blocking(move || {
        render_cover_letter_docx(&request.cover_text, template.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("cover letter rendering panicked: {e}")))??;

    Ok(attachment(
        DOCX_MIME,
        "attachment; filename=\"CoverLetter.docx\"",
        bytes,
    ))
}

/// POST /api/v1/cover-letters/pdf
///
/// Renders previously generated letter text as a PDF download.
pub async fn handle_cover_letter_pdf(
    Json(request): Json<CoverLetterDownloadRequest>,
) -> Result<Response, AppError> {
    require_cover_text(&request)?;

    let bytes = tokio::task::spawn_blocking(move || render_cover_letter_pdf(&request.cover_text))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("cover letter rendering panicked: {e}")))??;

    Ok(attachment(
        PDF_MIME,
        "attachment; filename=\"CoverLetter.pdf\"",
        bytes,
    ))
}
