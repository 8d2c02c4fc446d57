// Prompt constants for skill extraction.
// Reuses the JSON-only fragment from llm_client::prompts.

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System prompt for skill extraction.
pub fn skill_extraction_system() -> String {
    format!(
        "You extract ONLY real skills from job descriptions: technical skills \
        (languages, tools, platforms) and soft skills. Return a single JSON array \
        of strings. Never include company names, job titles, or vague phrases. {JSON_ONLY_SYSTEM}"
    )
}

/// User prompt template. Replace `{jd_text}` before sending.
pub const SKILL_EXTRACTION_PROMPT_TEMPLATE: &str = r#"You are a resume assistant. From the job description below, extract a flat list of relevant skills.

Include:
- technical skills (e.g. Python, AWS, Docker)
- soft and role-related skills (e.g. Leadership, Communication, Problem-Solving)

Exclude:
- company names and job titles
- vague phrases such as "looking for", "expertise", "passion"

Return the result as a strict JSON array of strings, for example:
["Python", "AWS", "Leadership", "Communication"]

Job Description:
{jd_text}"#;
