//! Cover letter generation and DOCX/PDF rendering.
//!
//! Unlike skill extraction there is no fallback: a failed call is surfaced.

use crate::cover_letter::prompts::{cover_letter_prompt, COVER_LETTER_SYSTEM};
use crate::document::pdf::write_text_pdf;
use crate::document::{Block, DocumentError, ParsedDocument, Run};
use crate::llm_client::{ChatMessage, ChatModel, ChatRequest, LlmError};

/// Sampling temperature for letters; some variety is wanted here.
pub const COVER_LETTER_TEMPERATURE: f32 = 0.7;

/// Asks the model for a cover letter. `resume_text` may be empty.
pub async fn generate_cover_letter(
    llm: &dyn ChatModel,
    model: &str,
    job_text: &str,
    resume_text: &str,
) -> Result<String, LlmError> {
    let prompt = cover_letter_prompt(job_text, resume_text);

    let letter = llm
        .complete(ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(COVER_LETTER_SYSTEM),
                ChatMessage::user(prompt),
            ],
            temperature: COVER_LETTER_TEMPERATURE,
        })
        .await?;

    if letter.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(letter)
}

/// Appends one paragraph per line of `cover_text` to `template` (a DOCX), or
/// to a blank document when no template is configured.
pub fn render_cover_letter_docx(
    cover_text: &str,
    template: Option<&[u8]>,
) -> Result<Vec<u8>, DocumentError> {
    let mut doc = match template {
        Some(bytes) => ParsedDocument::from_docx(bytes)?,
        None => ParsedDocument::blank(),
    };
    for line in cover_text.lines() {
        doc.push(Block::paragraph(None, vec![Run::plain(line)]));
    }
    doc.to_docx()
}

/// Lays out `cover_text` as a PDF, one paragraph per line.
pub fn render_cover_letter_pdf(cover_text: &str) -> Result<Vec<u8>, DocumentError> {
    write_text_pdf(cover_text.lines())
}
