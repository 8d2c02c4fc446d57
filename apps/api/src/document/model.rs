//! Block-sequence view of a word-processing document.
//!
//! A `ParsedDocument` exclusively owns an ordered `Vec<Block>`. Blocks loaded
//! from a file keep their original XML and are never mutated; edits happen by
//! inserting new blocks, which keeps the "existing order is preserved"
//! invariant checkable by comparing block sequences.

use crate::document::docx::PackageParts;
use crate::document::DocumentError;

/// Style id of the default bullet list paragraph style.
pub const DEFAULT_LIST_STYLE: &str = "ListBullet";
/// Style id used for headings this service creates.
pub const DEFAULT_HEADING_STYLE: &str = "Heading1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    /// Trailing `w:sectPr`; must remain the last body child.
    SectionProperties,
    /// Tables, content controls and anything else carried through untouched.
    Other,
}

/// Run-level font attributes. `None` means "inherit from style".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub font_name: Option<String>,
    /// Size in half-points, as stored in `w:sz`.
    pub size_half_points: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// `w:u` value, e.g. "single".
    pub underline: Option<String>,
}

impl RunFormat {
    pub fn is_empty(&self) -> bool {
        *self == RunFormat::default()
    }
}

/// A styled text fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub format: RunFormat,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
        }
    }
}

/// One direct child of the document body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    kind: BlockKind,
    style: Option<String>,
    runs: Vec<Run>,
    /// Original XML for blocks read from a package.
    source_xml: Option<String>,
}

impl Block {
    /// A new paragraph block that will be rendered on save.
    pub fn paragraph(style: Option<&str>, runs: Vec<Run>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            style: style.map(str::to_string),
            runs,
            source_xml: None,
        }
    }

    pub(crate) fn loaded(
        kind: BlockKind,
        style: Option<String>,
        runs: Vec<Run>,
        source_xml: String,
    ) -> Self {
        Self {
            kind,
            style,
            runs,
            source_xml: Some(source_xml),
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_paragraph(&self) -> bool {
        self.kind == BlockKind::Paragraph
    }

    /// Paragraph style id, e.g. "ListBullet" or "Heading1".
    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub(crate) fn source_xml(&self) -> Option<&str> {
        self.source_xml.as_deref()
    }
}

/// An ordered sequence of blocks plus the package they were read from.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    blocks: Vec<Block>,
    pub(crate) parts: PackageParts,
}

impl ParsedDocument {
    pub(crate) fn from_parts(blocks: Vec<Block>, parts: PackageParts) -> Self {
        Self { blocks, parts }
    }

    /// An empty document backed by a minimal package.
    pub fn blank() -> Self {
        Self::from_parts(Vec::new(), PackageParts::blank())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Texts of the paragraph blocks, in document order.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.is_paragraph())
            .map(Block::text)
            .collect()
    }

    /// Appends a block at the end of the body, before a trailing `w:sectPr`.
    /// Returns the index it landed at.
    pub fn push(&mut self, block: Block) -> usize {
        let index = match self.blocks.last() {
            Some(last) if last.kind() == BlockKind::SectionProperties => self.blocks.len() - 1,
            _ => self.blocks.len(),
        };
        self.blocks.insert(index, block);
        index
    }

    /// Appends a heading paragraph and returns its index.
    pub fn push_heading(&mut self, text: &str) -> usize {
        self.push(Block::paragraph(
            Some(DEFAULT_HEADING_STYLE),
            vec![Run::plain(text)],
        ))
    }

    /// Inserts `block` at `index`, shifting later blocks back.
    pub fn insert(&mut self, index: usize, block: Block) -> Result<(), DocumentError> {
        if index > self.blocks.len() {
            return Err(DocumentError::BlockOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        self.blocks.insert(index, block);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section_properties() -> Block {
        Block::loaded(
            BlockKind::SectionProperties,
            None,
            Vec::new(),
            "<w:sectPr/>".to_string(),
        )
    }

    #[test]
    fn test_block_text_concatenates_runs() {
        let block = Block::paragraph(None, vec![Run::plain("Rust "), Run::plain("Engineer")]);
        assert_eq!(block.text(), "Rust Engineer");
    }

    #[test]
    fn test_push_lands_before_trailing_section_properties() {
        let mut doc = ParsedDocument::blank();
        doc.push(section_properties());
        let index = doc.push_heading("Skills");
        assert_eq!(index, 0);
        assert_eq!(doc.blocks()[1].kind(), BlockKind::SectionProperties);
        assert_eq!(doc.blocks()[0].style(), Some(DEFAULT_HEADING_STYLE));
    }

    #[test]
    fn test_insert_out_of_range_is_an_error() {
        let mut doc = ParsedDocument::blank();
        let err = doc.insert(3, Block::paragraph(None, vec![])).unwrap_err();
        assert!(matches!(err, DocumentError::BlockOutOfRange { index: 3, len: 0 }));
    }

    #[test]
    fn test_paragraph_texts_skip_opaque_blocks() {
        let mut doc = ParsedDocument::blank();
        doc.push(Block::paragraph(None, vec![Run::plain("Summary")]));
        doc.push(section_properties());
        assert_eq!(doc.paragraph_texts(), vec!["Summary"]);
    }

    #[test]
    fn test_run_format_with_any_attribute_is_not_empty() {
        let format = RunFormat {
            size_half_points: Some(24),
            ..RunFormat::default()
        };
        assert!(!format.is_empty());
        assert!(RunFormat::default().is_empty());
    }
}
