//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;

use crate::document::docx::DOCX_MIME;
use crate::document::SourceDocument;
use crate::errors::AppError;
use crate::resume::pipeline::build_customized_resume;
use crate::state::AppState;

const SKILL_SOURCE_HEADER: &str = "x-skill-source";

/// POST /api/v1/resumes/customize
///
/// Multipart form: `resume_file` (PDF or DOCX) and `job_desc_text`.
/// Responds with the customized DOCX as an attachment.
pub async fn handle_customize_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut resume: Option<SourceDocument> = None;
    let mut job_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume_file" => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                resume = Some(SourceDocument::new(file_name, bytes));
            }
            "job_desc_text" => {
                job_text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Invalid job_desc_text: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let resume = resume.ok_or_else(|| AppError::Validation("resume_file is required".to_string()))?;
    let job_text = job_text.unwrap_or_default();
    if job_text.trim().is_empty() {
        return Err(AppError::Validation(
            "job_desc_text cannot be empty".to_string(),
        ));
    }

    let customized =
        build_customized_resume(resume, &job_text, &state.skills, state.converter.clone()).await?;
    info!(
        "Customized resume: inserted {} skills (heading created: {})",
        customized.skills.len(),
        customized.created_heading
    );

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"custom_resume.docx\"",
            ),
            (
                HeaderName::from_static(SKILL_SOURCE_HEADER),
                customized.skill_source.as_str(),
            ),
        ],
        customized.bytes,
    )
        .into_response())
}
