// Cover letters: LLM-written letter text and its DOCX rendering.
// All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
