// Skill extraction: semantic extraction through the LLM client with a
// term-frequency fallback, plus the normalization both paths share.

pub mod extractor;
pub mod handlers;
pub mod keywords;
pub mod normalize;
pub mod prompts;

pub use extractor::{SkillExtractor, SkillSource};
pub use normalize::{normalize_and_dedupe, SkillList};
