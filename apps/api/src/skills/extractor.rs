//! Skill extraction: semantic extraction via the language model, with a
//! statistical fallback that takes over on any service or parse failure.
//!
//! The outcome records which path produced the list; callers that only need
//! the skills use `SkillExtractor::extract_skills`, which never fails.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::{complete_json, ChatMessage, ChatModel, ChatRequest, LlmError};
use crate::skills::keywords::extract_top_terms;
use crate::skills::normalize::{normalize_and_dedupe, SkillList};
use crate::skills::prompts::{skill_extraction_system, SKILL_EXTRACTION_PROMPT_TEMPLATE};

/// Number of terms requested from the statistical extractor on fallback.
pub const FALLBACK_TERM_COUNT: usize = 10;

/// Which strategy produced a skill list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Semantic,
    Statistical,
}

impl SkillSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillSource::Semantic => "semantic",
            SkillSource::Statistical => "statistical",
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub enum SkillExtraction {
    Semantic(SkillList),
    Statistical { skills: SkillList, reason: String },
}

impl SkillExtraction {
    pub fn skills(&self) -> &SkillList {
        match self {
            SkillExtraction::Semantic(skills) => skills,
            SkillExtraction::Statistical { skills, .. } => skills,
        }
    }

    pub fn into_skills(self) -> SkillList {
        match self {
            SkillExtraction::Semantic(skills) => skills,
            SkillExtraction::Statistical { skills, .. } => skills,
        }
    }

    pub fn source(&self) -> SkillSource {
        match self {
            SkillExtraction::Semantic(_) => SkillSource::Semantic,
            SkillExtraction::Statistical { .. } => SkillSource::Statistical,
        }
    }
}

/// Extracts skills from job descriptions. Cheap to clone.
#[derive(Clone)]
pub struct SkillExtractor {
    llm: Arc<dyn ChatModel>,
    model: String,
}

impl SkillExtractor {
    pub fn new(llm: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Runs semantic extraction, falling back to term-frequency scoring.
    pub async fn extract(&self, job_text: &str) -> SkillExtraction {
        match self.extract_semantic(job_text).await {
            Ok(skills) => {
                info!("Semantic extraction returned {} skills", skills.len());
                SkillExtraction::Semantic(skills)
            }
            Err(e) => {
                warn!("Semantic skill extraction failed, using statistical fallback: {e}");
                SkillExtraction::Statistical {
                    skills: statistical_skills(job_text),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Same as `extract`, discarding which path was taken.
    pub async fn extract_skills(&self, job_text: &str) -> SkillList {
        self.extract(job_text).await.into_skills()
    }

    async fn extract_semantic(&self, job_text: &str) -> Result<SkillList, LlmError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(skill_extraction_system()),
                ChatMessage::user(SKILL_EXTRACTION_PROMPT_TEMPLATE.replace("{jd_text}", job_text)),
            ],
            temperature: 0.0,
        };

        // Anything other than a JSON array fails deserialization here.
        let entries: Vec<Value> = complete_json(self.llm.as_ref(), request).await?;

        let candidates = entries
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty());
        Ok(normalize_and_dedupe(candidates))
    }
}

/// The statistical path: top terms, normalized the same way as semantic output.
pub fn statistical_skills(job_text: &str) -> SkillList {
    normalize_and_dedupe(extract_top_terms(job_text, FALLBACK_TERM_COUNT))
}
