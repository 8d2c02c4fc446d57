//! Source documents: format detection, PDF → DOCX conversion and plain-text
//! extraction.
//!
//! PDFs carry no paragraph styles, so conversion keeps line text and turns
//! glyph-prefixed lines into list paragraphs; everything else is unstyled.

use std::io::Write;
use std::path::Path;

use bytes::Bytes;
use tracing::info;

use crate::document::model::{Block, ParsedDocument, Run, DEFAULT_LIST_STYLE};
use crate::document::DocumentError;

const BULLET_GLYPHS: [char; 6] = ['•', '▪', '●', '-', '*', '–'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Legacy input that must be converted before editing.
    Pdf,
    Docx,
}

/// An uploaded document as received.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl SourceDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Detects the format from the file extension, then from magic bytes.
    pub fn format(&self) -> Result<SourceFormat, DocumentError> {
        let name = self.file_name.to_lowercase();
        if name.ends_with(".pdf") {
            return Ok(SourceFormat::Pdf);
        }
        if name.ends_with(".docx") {
            return Ok(SourceFormat::Docx);
        }
        if self.bytes.starts_with(b"%PDF") {
            Ok(SourceFormat::Pdf)
        } else if self.bytes.starts_with(b"PK\x03\x04") {
            Ok(SourceFormat::Docx)
        } else {
            Err(DocumentError::UnsupportedFormat(self.file_name.clone()))
        }
    }
}

/// Converts a legacy-format file on disk to DOCX bytes.
pub trait FormatConverter: Send + Sync {
    fn convert(&self, path: &Path) -> Result<Vec<u8>, DocumentError>;
}

/// PDF → DOCX by text extraction, one paragraph per non-empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextConverter;

impl FormatConverter for PdfTextConverter {
    fn convert(&self, path: &Path) -> Result<Vec<u8>, DocumentError> {
        let text = pdf_extract::extract_text(path)
            .map_err(|e| DocumentError::Conversion(format!("{e:?}")))?;
        let doc = document_from_text(&text);
        // Scanned PDFs without a text layer end up here.
        if doc.is_empty() {
            return Err(DocumentError::Conversion(
                "PDF has no extractable text".to_string(),
            ));
        }
        info!("Converted PDF into {} paragraphs", doc.len());
        doc.to_docx()
    }
}

/// Builds a document with one paragraph per non-empty line of `text`.
pub fn document_from_text(text: &str) -> ParsedDocument {
    let mut doc = ParsedDocument::blank();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let block = match line.strip_prefix(|c: char| BULLET_GLYPHS.contains(&c)) {
            Some(rest) if !rest.trim().is_empty() => {
                Block::paragraph(Some(DEFAULT_LIST_STYLE), vec![Run::plain(rest.trim())])
            }
            _ => Block::paragraph(None, vec![Run::plain(line)]),
        };
        doc.push(block);
    }
    doc
}

/// Loads `source` as an editable document, converting legacy input first.
///
/// Legacy bytes go through a named temporary file that is removed when this
/// function returns, whether conversion succeeded or not.
pub fn load_document(
    source: &SourceDocument,
    converter: &dyn FormatConverter,
) -> Result<ParsedDocument, DocumentError> {
    match source.format()? {
        SourceFormat::Docx => ParsedDocument::from_docx(&source.bytes),
        SourceFormat::Pdf => {
            let mut tmp = tempfile::Builder::new()
                .prefix("resume-")
                .suffix(".pdf")
                .tempfile()?;
            tmp.write_all(&source.bytes)?;
            tmp.flush()?;
            let converted = converter.convert(tmp.path())?;
            ParsedDocument::from_docx(&converted)
        }
    }
}

/// Plain text of `source`: page-concatenated for PDFs, one line per paragraph
/// for DOCX.
pub fn extract_plain_text(source: &SourceDocument) -> Result<String, DocumentError> {
    match source.format()? {
        SourceFormat::Pdf => pdf_extract::extract_text_from_mem(&source.bytes)
            .map_err(|e| DocumentError::Conversion(format!("{e:?}"))),
        SourceFormat::Docx => {
            Ok(ParsedDocument::from_docx(&source.bytes)?.paragraph_texts().join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::document::docx::fixtures::{docx_with_body, paragraph};
    use crate::document::pdf::write_text_pdf;

    /// Records the path it was handed and answers with a fixed result.
    struct RecordingConverter {
        seen: Mutex<Option<PathBuf>>,
        fail: bool,
    }

    impl RecordingConverter {
        fn new(fail: bool) -> Self {
            Self {
                seen: Mutex::new(None),
                fail,
            }
        }

        fn seen_path(&self) -> PathBuf {
            self.seen.lock().unwrap().clone().unwrap()
        }
    }

    impl FormatConverter for RecordingConverter {
        fn convert(&self, path: &Path) -> Result<Vec<u8>, DocumentError> {
            assert!(path.exists());
            assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4 fake");
            *self.seen.lock().unwrap() = Some(path.to_path_buf());
            if self.fail {
                return Err(DocumentError::Conversion("boom".to_string()));
            }
            Ok(docx_with_body(&paragraph("Heading1", "Skills")))
        }
    }

    #[test]
    fn test_format_from_extension_then_magic_bytes() {
        assert_eq!(
            SourceDocument::new("CV.PDF", Bytes::new()).format().unwrap(),
            SourceFormat::Pdf
        );
        assert_eq!(
            SourceDocument::new("cv.docx", Bytes::new()).format().unwrap(),
            SourceFormat::Docx
        );
        assert_eq!(
            SourceDocument::new("upload", Bytes::from_static(b"%PDF-1.7")).format().unwrap(),
            SourceFormat::Pdf
        );
        assert_eq!(
            SourceDocument::new("upload", Bytes::from_static(b"PK\x03\x04rest"))
                .format()
                .unwrap(),
            SourceFormat::Docx
        );
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = SourceDocument::new("cv.txt", Bytes::from_static(b"plain"))
            .format()
            .unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(name) if name == "cv.txt"));
    }

    #[test]
    fn test_document_from_text_marks_bullets() {
        let doc = document_from_text("Jane Doe\n\n  Skills \n• Rust\n- Go\n-\nPlain line");
        let blocks = doc.blocks();
        assert_eq!(doc.paragraph_texts(), vec!["Jane Doe", "Skills", "Rust", "Go", "-", "Plain line"]);
        assert_eq!(blocks[2].style(), Some(DEFAULT_LIST_STYLE));
        assert_eq!(blocks[3].style(), Some(DEFAULT_LIST_STYLE));
        assert_eq!(blocks[4].style(), None);
        assert_eq!(blocks[1].style(), None);
    }

    #[test]
    fn test_pdf_temp_file_is_removed_after_conversion() {
        let converter = RecordingConverter::new(false);
        let source = SourceDocument::new("resume.pdf", Bytes::from_static(b"%PDF-1.4 fake"));

        let doc = load_document(&source, &converter).unwrap();
        assert_eq!(doc.paragraph_texts(), vec!["Skills"]);
        assert!(!converter.seen_path().exists());
    }

    #[test]
    fn test_pdf_temp_file_is_removed_after_failed_conversion() {
        let converter = RecordingConverter::new(true);
        let source = SourceDocument::new("resume.pdf", Bytes::from_static(b"%PDF-1.4 fake"));

        let err = load_document(&source, &converter).unwrap_err();
        assert!(matches!(err, DocumentError::Conversion(_)));
        assert!(!converter.seen_path().exists());
    }

    #[test]
    fn test_docx_is_loaded_without_conversion() {
        let converter = RecordingConverter::new(true);
        let bytes = docx_with_body(&paragraph("Normal", "Summary"));
        let source = SourceDocument::new("resume.docx", bytes);

        let doc = load_document(&source, &converter).unwrap();
        assert_eq!(doc.paragraph_texts(), vec!["Summary"]);
        assert!(converter.seen.lock().unwrap().is_none());
    }

    fn pdf_file(paragraphs: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(&write_text_pdf(paragraphs.iter().copied()).unwrap())
            .unwrap();
        file
    }

    #[test]
    fn test_pdf_converter_keeps_lines_and_bullets() {
        let file = pdf_file(&["Jane Doe", "Skills", "- Rust"]);
        let bytes = PdfTextConverter.convert(file.path()).unwrap();
        let doc = ParsedDocument::from_docx(&bytes).unwrap();
        assert_eq!(doc.paragraph_texts(), vec!["Jane Doe", "Skills", "Rust"]);
        assert_eq!(doc.blocks()[2].style(), Some(DEFAULT_LIST_STYLE));
    }

    #[test]
    fn test_pdf_without_text_fails_conversion() {
        let file = pdf_file(&[]);
        let err = PdfTextConverter.convert(file.path()).unwrap_err();
        assert!(matches!(err, DocumentError::Conversion(_)));
    }

    #[test]
    fn test_plain_text_of_docx_joins_paragraphs() {
        let body = format!("{}{}", paragraph("Heading1", "Experience"), paragraph("Normal", "Rust dev"));
        let source = SourceDocument::new("resume.docx", docx_with_body(&body));
        assert_eq!(extract_plain_text(&source).unwrap(), "Experience\nRust dev");
    }
}
