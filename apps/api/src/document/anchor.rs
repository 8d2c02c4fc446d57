//! Skills anchor: finds (or creates) the "Skills" heading and the first bullet
//! under it whose formatting new bullets should copy.

use tracing::debug;

use crate::document::model::{Block, ParsedDocument};

/// Heading texts recognised as the skills section, compared trimmed and lower-cased.
pub const SKILLS_HEADINGS: [&str; 2] = ["skills", "technical skills"];

/// Text of the heading appended when a document has no skills section.
pub const DEFAULT_SKILLS_HEADING: &str = "Skills";

/// Indices into the document the anchor was located in.
/// Only valid until the next insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorContext {
    pub heading: usize,
    /// First list-styled block after the heading, used as a style donor.
    pub template: Option<usize>,
    /// Whether the heading was appended by `locate_anchor`.
    pub created_heading: bool,
}

fn is_skills_heading(block: &Block) -> bool {
    block.is_paragraph() && SKILLS_HEADINGS.contains(&block.text().trim().to_lowercase().as_str())
}

fn is_heading_style(style: &str) -> bool {
    style.starts_with("Heading")
}

fn is_list_style(style: &str) -> bool {
    style.starts_with("List") || style.to_lowercase().starts_with("bullet")
}

/// Locates the skills heading, appending a "Skills" heading when none exists.
///
/// The template walk starts right after the heading and stops at the first
/// list-styled paragraph (template found), the next heading-styled paragraph
/// (no template), or the end of the document.
pub fn locate_anchor(doc: &mut ParsedDocument) -> AnchorContext {
    let (heading, created_heading) = match doc.blocks().iter().position(is_skills_heading) {
        Some(index) => (index, false),
        None => {
            debug!("No skills heading found, appending one");
            (doc.push_heading(DEFAULT_SKILLS_HEADING), true)
        }
    };

    let mut template = None;
    for (index, block) in doc.blocks().iter().enumerate().skip(heading + 1) {
        let Some(style) = block.style() else {
            continue;
        };
        if is_heading_style(style) {
            break;
        }
        if is_list_style(style) {
            template = Some(index);
            break;
        }
    }

    AnchorContext {
        heading,
        template,
        created_heading,
    }
}
