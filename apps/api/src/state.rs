use std::sync::Arc;

use crate::config::Config;
use crate::document::FormatConverter;
use crate::llm_client::ChatModel;
use crate::skills::SkillExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Chat completion backend. Production: LlmClient. Tests: a scripted fake.
    pub llm: Arc<dyn ChatModel>,
    pub skills: SkillExtractor,
    /// PDF → DOCX converter for legacy uploads.
    pub converter: Arc<dyn FormatConverter>,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: Arc<dyn ChatModel>,
        converter: Arc<dyn FormatConverter>,
    ) -> Self {
        let skills = SkillExtractor::new(llm.clone(), &config.llm_model);
        Self {
            config,
            llm,
            skills,
            converter,
        }
    }
}
