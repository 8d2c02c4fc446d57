// Document surgery: a block-sequence model over DOCX packages, the skills
// anchor locator, the styled block inserter, source-format conversion and
// text-only PDF output.
// Parsing and conversion are blocking; run them inside spawn_blocking.

pub mod anchor;
pub mod convert;
pub mod docx;
pub mod insert;
pub mod model;
pub mod pdf;

use thiserror::Error;

pub use anchor::locate_anchor;
pub use convert::{FormatConverter, PdfTextConverter, SourceDocument};
pub use insert::insert_after;
pub use model::{Block, ParsedDocument, Run};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("document archive is unreadable: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("document is missing part '{0}'")]
    MissingPart(&'static str),

    #[error("malformed document XML: {0}")]
    Xml(String),

    #[error("document has no body")]
    MissingBody,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("PDF output failed: {0}")]
    PdfWrite(String),

    #[error("block index {index} is out of range for a document of {len} blocks")]
    BlockOutOfRange { index: usize, len: usize },
}
