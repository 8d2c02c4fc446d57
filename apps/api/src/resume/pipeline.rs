//! Resume customization: merges job-relevant skills into an uploaded résumé.
//!
//! Flow: load (converting PDF → DOCX) → extract skills → normalize →
//!       locate skills heading → insert one bullet per skill → serialize.
//!
//! New bullets go directly under the heading, in skill order, ahead of any
//! bullets already there. Any load or conversion failure aborts the whole
//! call; no partially built document is ever returned.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::document::convert::load_document;
use crate::document::{insert_after, locate_anchor, DocumentError, FormatConverter, SourceDocument};
use crate::skills::{normalize_and_dedupe, SkillExtractor, SkillList, SkillSource};

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("job description cannot be empty")]
    EmptyJobDescription,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Output of a successful customization.
#[derive(Debug, Clone)]
pub struct CustomizedResume {
    /// The customized DOCX.
    pub bytes: Vec<u8>,
    /// Skills inserted, in document order.
    pub skills: SkillList,
    pub skill_source: SkillSource,
    /// Whether a "Skills" heading had to be appended.
    pub created_heading: bool,
}

/// Runs the full customization pipeline.
///
/// Steps:
/// 1. load_document() → ParsedDocument (PDF converted through a temp file)
/// 2. SkillExtractor::extract() → SkillExtraction (semantic or statistical)
/// 3. normalize_and_dedupe() → SkillList
/// 4. locate_anchor() → AnchorContext (may append a heading)
/// 5. insert_after() once per skill, chaining from the heading
/// 6. to_docx() → bytes
pub async fn build_customized_resume(
    source: SourceDocument,
    job_text: &str,
    extractor: &SkillExtractor,
    converter: Arc<dyn FormatConverter>,
) -> Result<CustomizedResume, ResumeError> {
    if job_text.trim().is_empty() {
        return Err(ResumeError::EmptyJobDescription);
    }

    // Step 1: Load, off the async runtime
    info!("Loading resume '{}'", source.file_name);
    let mut doc = tokio::task::spawn_blocking(move || load_document(&source, converter.as_ref()))
        .await
        .map_err(|e| DocumentError::Conversion(format!("document loader panicked: {e}")))??;

    // Step 2: Extract
    let extraction = extractor.extract(job_text).await;
    let skill_source = extraction.source();

    // Step 3: Normalize again so both extraction paths end in the same shape
    let skills = normalize_and_dedupe(extraction.skills());
    info!(
        "Extracted {} skills via {} extraction",
        skills.len(),
        skill_source.as_str()
    );

    // Step 4: Anchor
    let anchor = locate_anchor(&mut doc);
    let template = anchor.template.and_then(|i| doc.block(i)).cloned();
    info!(
        "Skills heading at block {} (created: {}, template: {})",
        anchor.heading,
        anchor.created_heading,
        template.is_some()
    );

    // Step 5: Insert
    let mut cursor = anchor.heading;
    for skill in &skills {
        cursor = insert_after(&mut doc, cursor, skill, template.as_ref())?;
    }

    // Step 6: Serialize
    let bytes = doc.to_docx()?;

    Ok(CustomizedResume {
        bytes,
        skills,
        skill_source,
        created_heading: anchor.created_heading,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::document::docx::fixtures::{docx_with_body, paragraph};
    use crate::document::{ParsedDocument, PdfTextConverter};
    use crate::llm_client::testing::{Script, ScriptedModel};

    const JD: &str = "Backend engineer with Python and AWS. Python services, AWS Lambda.";

    fn extractor(script: Script) -> SkillExtractor {
        SkillExtractor::new(Arc::new(ScriptedModel::new(script)), "test-model")
    }

    fn converter() -> Arc<dyn FormatConverter> {
        Arc::new(PdfTextConverter)
    }

    fn bullet_run(text: &str) -> String {
        format!(
            r#"<w:p><w:pPr><w:pStyle w:val="ListBullet"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Calibri"/><w:b/><w:sz w:val="24"/></w:rPr><w:t>{text}</w:t></w:r></w:p>"#
        )
    }

    #[tokio::test]
    async fn test_skills_land_under_heading_before_existing_bullets() {
        let body = format!("{}{}", paragraph("Heading1", "Skills"), bullet_run("Existing Bullet"));
        let source = SourceDocument::new("resume.docx", docx_with_body(&body));

        let result = build_customized_resume(
            source,
            JD,
            &extractor(Script::Reply(r#"["python", "AWS"]"#.to_string())),
            converter(),
        )
        .await
        .unwrap();

        assert_eq!(result.skills.as_slice(), ["Python", "Aws"]);
        assert_eq!(result.skill_source, SkillSource::Semantic);
        assert!(!result.created_heading);

        let doc = ParsedDocument::from_docx(&result.bytes).unwrap();
        assert_eq!(
            doc.paragraph_texts(),
            vec!["Skills", "Python", "Aws", "Existing Bullet"]
        );
        for block in &doc.blocks()[1..3] {
            assert_eq!(block.style(), Some("ListBullet"));
            let format = &block.runs()[0].format;
            assert_eq!(format.font_name.as_deref(), Some("Calibri"));
            assert_eq!(format.bold, Some(true));
            assert_eq!(format.size_half_points, Some(24));
        }
    }

    #[tokio::test]
    async fn test_missing_heading_is_created_with_default_bullets() {
        let body = format!("{}{}", paragraph("Heading1", "Experience"), bullet_run("Did things"));
        let source = SourceDocument::new("resume.docx", docx_with_body(&body));

        let result = build_customized_resume(
            source,
            JD,
            &extractor(Script::Reply(r#"["Docker"]"#.to_string())),
            converter(),
        )
        .await
        .unwrap();

        assert!(result.created_heading);
        let doc = ParsedDocument::from_docx(&result.bytes).unwrap();
        assert_eq!(
            doc.paragraph_texts(),
            vec!["Experience", "Did things", "Skills", "Docker"]
        );
        assert_eq!(doc.blocks()[2].style(), Some("Heading1"));
        assert_eq!(doc.blocks()[3].style(), Some("ListBullet"));
        assert!(doc.blocks()[3].runs()[0].format.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_path_produces_same_contract() {
        let body = paragraph("Heading1", "Technical Skills");
        let source = SourceDocument::new("resume.docx", docx_with_body(&body));

        let result = build_customized_resume(
            source,
            JD,
            &extractor(Script::ConnectionRefused),
            converter(),
        )
        .await
        .unwrap();

        assert_eq!(result.skill_source, SkillSource::Statistical);
        assert_eq!(result.skills.as_slice()[..2], ["Python", "Aws"]);

        let doc = ParsedDocument::from_docx(&result.bytes).unwrap();
        let texts = doc.paragraph_texts();
        assert_eq!(texts[0], "Technical Skills");
        assert_eq!(&texts[1..], result.skills.as_slice());
    }

    #[tokio::test]
    async fn test_output_reloads_and_saves_stably() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}{}",
            paragraph("Title", "Jane Doe"),
            paragraph("Normal", "cell"),
            paragraph("Heading1", "Skills"),
            bullet_run("Rust")
        );
        let source = SourceDocument::new("resume.docx", docx_with_body(&body));

        let result = build_customized_resume(
            source,
            JD,
            &extractor(Script::Reply(r#"["Go"]"#.to_string())),
            converter(),
        )
        .await
        .unwrap();

        let first = ParsedDocument::from_docx(&result.bytes).unwrap();
        let second = ParsedDocument::from_docx(&first.to_docx().unwrap()).unwrap();
        assert_eq!(first.paragraph_texts(), vec!["Jane Doe", "Skills", "Go", "Rust"]);
        assert_eq!(first.paragraph_texts(), second.paragraph_texts());
        assert_eq!(first.len(), second.len());
    }

    #[tokio::test]
    async fn test_corrupt_document_fails_without_calling_the_model() {
        let model = Arc::new(ScriptedModel::replying(r#"["Rust"]"#));
        let extractor = SkillExtractor::new(model.clone(), "test-model");
        let source = SourceDocument::new("resume.docx", b"not a zip".to_vec());

        let err = build_customized_resume(source, JD, &extractor, converter())
            .await
            .unwrap_err();

        assert!(matches!(err, ResumeError::Document(DocumentError::Archive(_))));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_job_description_is_rejected() {
        let source = SourceDocument::new("resume.docx", docx_with_body(""));
        let err = build_customized_resume(
            source,
            "   ",
            &extractor(Script::Reply("[]".to_string())),
            converter(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ResumeError::EmptyJobDescription));
    }

    struct FailingConverter;

    impl FormatConverter for FailingConverter {
        fn convert(&self, _path: &Path) -> Result<Vec<u8>, DocumentError> {
            Err(DocumentError::Conversion("unreadable pdf".to_string()))
        }
    }

    #[tokio::test]
    async fn test_conversion_failure_is_surfaced() {
        let source = SourceDocument::new("resume.pdf", b"%PDF-1.4".to_vec());
        let err = build_customized_resume(
            source,
            JD,
            &extractor(Script::Reply("[]".to_string())),
            Arc::new(FailingConverter),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ResumeError::Document(DocumentError::Conversion(_))));
    }
}
