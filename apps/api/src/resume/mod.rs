// Resume customization: the skills merge pipeline and its upload endpoint.
// Skill extraction goes through skills::SkillExtractor; no direct LLM calls here.

pub mod handlers;
pub mod pipeline;

pub use pipeline::ResumeError;
