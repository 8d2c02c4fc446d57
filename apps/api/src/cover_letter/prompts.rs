// Prompts for cover letter generation.

pub const COVER_LETTER_SYSTEM: &str = "You write cover letters.";

/// Builds the cover letter prompt. Both texts are inserted verbatim in one
/// pass, so placeholder-like text inside either is never expanded.
pub fn cover_letter_prompt(job_text: &str, resume_text: &str) -> String {
    format!(
        r#"Write a professional cover letter for the job below.

Job:
{job_text}

Resume highlights:
{resume_text}

Begin with "Dear Hiring Manager" and close with "Sincerely"."#
    )
}
