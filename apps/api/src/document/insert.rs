//! Styled block insertion.

use crate::document::model::{Block, ParsedDocument, Run, DEFAULT_LIST_STYLE};
use crate::document::DocumentError;

/// Builds a paragraph for `text` styled like `template`.
///
/// With a template, the paragraph style and the first run's font attributes
/// are copied. Without one, the default list style is used with a plain run.
pub fn styled_block(text: &str, template: Option<&Block>) -> Block {
    match template {
        Some(template) => {
            let format = template
                .runs()
                .first()
                .map(|run| run.format.clone())
                .unwrap_or_default();
            Block::paragraph(
                template.style(),
                vec![Run {
                    text: text.to_string(),
                    format,
                }],
            )
        }
        None => Block::paragraph(Some(DEFAULT_LIST_STYLE), vec![Run::plain(text)]),
    }
}

/// Inserts a styled block immediately after the block at `anchor` and
/// returns the new block's index.
///
/// To insert several blocks in order, pass the returned index as the next
/// `anchor`.
pub fn insert_after(
    doc: &mut ParsedDocument,
    anchor: usize,
    text: &str,
    template: Option<&Block>,
) -> Result<usize, DocumentError> {
    if anchor >= doc.len() {
        return Err(DocumentError::BlockOutOfRange {
            index: anchor,
            len: doc.len(),
        });
    }
    let index = anchor + 1;
    doc.insert(index, styled_block(text, template))?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::RunFormat;

    fn calibri_bold_12() -> RunFormat {
        RunFormat {
            font_name: Some("Calibri".to_string()),
            size_half_points: Some(24),
            bold: Some(true),
            italic: None,
            underline: None,
        }
    }

    fn heading_doc() -> ParsedDocument {
        let mut doc = ParsedDocument::blank();
        doc.push_heading("Skills");
        doc
    }

    #[test]
    fn test_template_style_and_font_are_copied() {
        let template = Block::paragraph(
            Some("ListBullet2"),
            vec![
                Run {
                    text: "Existing".to_string(),
                    format: calibri_bold_12(),
                },
                Run::plain(" tail"),
            ],
        );
        let mut doc = heading_doc();
        let index = insert_after(&mut doc, 0, "Python", Some(&template)).unwrap();

        let block = doc.block(index).unwrap();
        assert_eq!(block.style(), Some("ListBullet2"));
        assert_eq!(block.runs().len(), 1);
        assert_eq!(block.text(), "Python");
        let format = &block.runs()[0].format;
        assert_eq!(format.bold, Some(true));
        assert_eq!(format.size_half_points, Some(24));
        assert_eq!(format.font_name.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_template_without_runs_copies_style_only() {
        let template = Block::paragraph(Some("ListBullet"), Vec::new());
        let block = styled_block("Go", Some(&template));
        assert_eq!(block.style(), Some("ListBullet"));
        assert!(block.runs()[0].format.is_empty());
    }

    #[test]
    fn test_no_template_uses_default_list_style() {
        let block = styled_block("Leadership", None);
        assert_eq!(block.style(), Some(DEFAULT_LIST_STYLE));
        assert_eq!(block.runs(), &[Run::plain("Leadership")]);
    }

    #[test]
    fn test_chained_inserts_keep_submission_order() {
        let mut doc = heading_doc();
        doc.push(Block::paragraph(Some("ListBullet"), vec![Run::plain("Existing")]));

        let mut cursor = 0;
        for skill in ["Python", "Aws", "Docker"] {
            cursor = insert_after(&mut doc, cursor, skill, None).unwrap();
        }
        assert_eq!(
            doc.paragraph_texts(),
            vec!["Skills", "Python", "Aws", "Docker", "Existing"]
        );
    }

    #[test]
    fn test_anchor_out_of_range_is_not_swallowed() {
        let mut doc = heading_doc();
        let err = insert_after(&mut doc, 5, "Rust", None).unwrap_err();
        assert!(matches!(err, DocumentError::BlockOutOfRange { index: 5, len: 1 }));
        assert_eq!(doc.len(), 1);
    }
}
