//! DOCX load/save.
//!
//! Only `word/document.xml` is interpreted. The body's direct children are
//! sliced out by byte offset, so unmodified blocks are written back exactly as
//! read; every other package part is copied through raw.

use std::io::{Cursor, Read, Write};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::model::{Block, BlockKind, ParsedDocument, Run, RunFormat};
use crate::document::DocumentError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DOCUMENT_PART: &str = "word/document.xml";

const BLANK_DOCUMENT_HEAD: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    "<w:body>"
);

const BLANK_DOCUMENT_TAIL: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
    r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
    "</w:sectPr></w:body></w:document>"
);

const BLANK_PARTS: [(&str, &str); 4] = [
    (
        "[Content_Types].xml",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            "</Types>"
        ),
    ),
    (
        "_rels/.rels",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
            "</Relationships>"
        ),
    ),
    (
        "word/_rels/document.xml.rels",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            "</Relationships>"
        ),
    ),
    (
        "word/styles.xml",
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/>"#,
            r#"<w:rPr><w:sz w:val="22"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/>"#,
            r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:spacing w:before="240" w:after="60"/><w:outlineLvl w:val="0"/></w:pPr>"#,
            r#"<w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>"#,
            r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/>"#,
            r#"<w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style>"#,
            "</w:styles>"
        ),
    ),
];

/// Everything of the package except the body's children.
#[derive(Debug, Clone)]
pub(crate) struct PackageParts {
    /// Original archive, or `None` for a document created from scratch.
    archive: Option<Vec<u8>>,
    /// `document.xml` up to and including the `<w:body>` start tag.
    head: String,
    /// `document.xml` from the `</w:body>` end tag on.
    tail: String,
}

impl PackageParts {
    pub(crate) fn blank() -> Self {
        Self {
            archive: None,
            head: BLANK_DOCUMENT_HEAD.to_string(),
            tail: "</w:body></w:document>".to_string(),
        }
    }
}

impl ParsedDocument {
    /// Parses a DOCX package.
    pub fn from_docx(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut xml = String::new();
        match archive.by_name(DOCUMENT_PART) {
            Ok(mut part) => {
                part.read_to_string(&mut xml)?;
            }
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(DocumentError::MissingPart(DOCUMENT_PART))
            }
            Err(e) => return Err(e.into()),
        }

        let (head, tail, blocks) = split_body(&xml)?;
        Ok(ParsedDocument::from_parts(
            blocks,
            PackageParts {
                archive: Some(bytes.to_vec()),
                head,
                tail,
            },
        ))
    }

    /// Serializes the document to DOCX bytes.
    pub fn to_docx(&self) -> Result<Vec<u8>, DocumentError> {
        let mut body = String::new();
        for block in self.blocks() {
            match block.source_xml() {
                Some(xml) => body.push_str(xml),
                None => body.push_str(&render_paragraph(block)?),
            }
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let tail = match &self.parts.archive {
            Some(bytes) => {
                let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;
                for i in 0..archive.len() {
                    let part = archive.by_index(i)?;
                    if part.name() == DOCUMENT_PART {
                        continue;
                    }
                    writer.raw_copy_file(part)?;
                }
                self.parts.tail.clone()
            }
            None => {
                for (name, content) in BLANK_PARTS {
                    writer.start_file(name, options)?;
                    writer.write_all(content.as_bytes())?;
                }
                // A from-scratch body only gets its section properties on save.
                if self.blocks().iter().any(|b| b.kind() == BlockKind::SectionProperties) {
                    self.parts.tail.clone()
                } else {
                    BLANK_DOCUMENT_TAIL.to_string()
                }
            }
        };

        writer.start_file(DOCUMENT_PART, options)?;
        writer.write_all(self.parts.head.as_bytes())?;
        writer.write_all(body.as_bytes())?;
        writer.write_all(tail.as_bytes())?;

        Ok(writer.finish()?.into_inner())
    }
}

fn xml_error(e: impl std::fmt::Display) -> DocumentError {
    DocumentError::Xml(e.to_string())
}

/// Splits `document.xml` into the text before the body's children, the body's
/// children as blocks, and the text after them.
fn split_body(xml: &str) -> Result<(String, String, Vec<Block>), DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    let mut head_end: Option<usize> = None;
    let mut child_start: Option<usize> = None;
    let mut blocks = Vec::new();

    loop {
        let before = reader.buffer_position();
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                depth += 1;
                match body_depth {
                    None if e.name().as_ref() == b"w:body" => {
                        body_depth = Some(depth);
                        head_end = Some(reader.buffer_position());
                    }
                    Some(body) if depth == body + 1 => child_start = Some(before),
                    _ => {}
                }
            }
            Event::End(e) => {
                match body_depth {
                    Some(body) if depth == body => {
                        let head_end = head_end.ok_or(DocumentError::MissingBody)?;
                        return Ok((xml[..head_end].to_string(), xml[before..].to_string(), blocks));
                    }
                    Some(body) if depth == body + 1 => {
                        let start = child_start.take().ok_or_else(|| {
                            xml_error("unbalanced body element")
                        })?;
                        let slice = &xml[start..reader.buffer_position()];
                        blocks.push(parse_block(e.name().as_ref(), slice)?);
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Empty(e) => match body_depth {
                None if e.name().as_ref() == b"w:body" => {
                    let after = reader.buffer_position();
                    let head = format!("{}<w:body>", &xml[..before]);
                    let tail = format!("</w:body>{}", &xml[after..]);
                    return Ok((head, tail, Vec::new()));
                }
                Some(body) if depth == body => {
                    let slice = &xml[before..reader.buffer_position()];
                    blocks.push(parse_block(e.name().as_ref(), slice)?);
                }
                _ => {}
            },
            Event::Eof => return Err(DocumentError::MissingBody),
            _ => {}
        }
    }
}

fn parse_block(name: &[u8], xml: &str) -> Result<Block, DocumentError> {
    match name {
        b"w:p" => {
            let (style, runs) = parse_paragraph(xml)?;
            Ok(Block::loaded(BlockKind::Paragraph, style, runs, xml.to_string()))
        }
        b"w:sectPr" => Ok(Block::loaded(
            BlockKind::SectionProperties,
            None,
            Vec::new(),
            xml.to_string(),
        )),
        _ => Ok(Block::loaded(BlockKind::Other, None, Vec::new(), xml.to_string())),
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>, DocumentError> {
    match e.try_get_attribute(name).map_err(xml_error)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned())),
        None => Ok(None),
    }
}

/// `w:b`, `w:i` and friends are on unless `w:val` says otherwise.
fn toggle(e: &BytesStart<'_>) -> Result<bool, DocumentError> {
    Ok(!matches!(
        attribute(e, "w:val")?.as_deref(),
        Some("0") | Some("false") | Some("off")
    ))
}

fn parse_paragraph(xml: &str) -> Result<(Option<String>, Vec<Run>), DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut style = None;
    let mut runs = Vec::new();
    let mut in_paragraph_props = false;
    let mut in_run_props = false;
    let mut in_text = false;
    let mut run: Option<Run> = None;
    // The outer `w:p` is depth 1. Paragraphs nested inside it (text boxes)
    // are skipped whole, from `skip_from` down.
    let mut depth = 0usize;
    let mut skip_from: Option<usize> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        match &event {
            Event::Start(e) => {
                depth += 1;
                if skip_from.is_none()
                    && depth > 1
                    && matches!(e.name().as_ref(), b"w:p" | b"w:txbxContent")
                {
                    skip_from = Some(depth);
                }
            }
            Event::End(_) if skip_from.is_some() => {
                if skip_from == Some(depth) {
                    skip_from = None;
                }
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            _ => {}
        }
        if skip_from.is_some() {
            continue;
        }

        let is_start = matches!(event, Event::Start(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                b"w:pPr" if is_start && depth == 2 => in_paragraph_props = true,
                b"w:pStyle" if in_paragraph_props => style = attribute(e, "w:val")?,
                _ if in_paragraph_props => {}
                b"w:r" if is_start => run = Some(Run::default()),
                b"w:rPr" if is_start && run.is_some() => in_run_props = true,
                b"w:t" if is_start && run.is_some() => in_text = true,
                name => {
                    if let Some(run) = run.as_mut() {
                        if in_run_props {
                            apply_run_property(&mut run.format, name, e)?;
                        } else {
                            match name {
                                b"w:tab" => run.text.push('\t'),
                                b"w:br" | b"w:cr" => run.text.push('\n'),
                                _ => {}
                            }
                        }
                    }
                }
            },
            Event::End(ref e) => {
                match e.name().as_ref() {
                    b"w:pPr" if depth == 2 => in_paragraph_props = false,
                    b"w:rPr" => in_run_props = false,
                    b"w:t" => in_text = false,
                    b"w:r" => {
                        if let Some(done) = run.take() {
                            runs.push(done);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(ref t) if in_text => {
                if let Some(run) = run.as_mut() {
                    run.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(ref t) if in_text => {
                if let Some(run) = run.as_mut() {
                    run.text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((style, runs))
}

fn apply_run_property(
    format: &mut RunFormat,
    name: &[u8],
    e: &BytesStart<'_>,
) -> Result<(), DocumentError> {
    match name {
        b"w:rFonts" => {
            format.font_name = match attribute(e, "w:ascii")? {
                Some(font) => Some(font),
                None => attribute(e, "w:hAnsi")?,
            }
        }
        b"w:sz" => {
            format.size_half_points = attribute(e, "w:val")?.and_then(|v| v.parse().ok())
        }
        b"w:b" => format.bold = Some(toggle(e)?),
        b"w:i" => format.italic = Some(toggle(e)?),
        b"w:u" => {
            format.underline = Some(attribute(e, "w:val")?.unwrap_or_else(|| "single".to_string()))
        }
        _ => {}
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Renders a new paragraph block as `w:p` XML.
pub(crate) fn render_paragraph(block: &Block) -> Result<String, DocumentError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Start(BytesStart::new("w:p")))
        .map_err(xml_error)?;

    if let Some(style) = block.style() {
        writer
            .write_event(Event::Start(BytesStart::new("w:pPr")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Empty(
                BytesStart::new("w:pStyle").with_attributes([("w:val", style)]),
            ))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:pPr")))
            .map_err(xml_error)?;
    }

    for run in block.runs() {
        writer
            .write_event(Event::Start(BytesStart::new("w:r")))
            .map_err(xml_error)?;

        let format = &run.format;
        if !format.is_empty() {
            let size = format.size_half_points.map(|s| s.to_string());
            let mut props: Vec<BytesStart<'_>> = Vec::new();
            if let Some(font) = &format.font_name {
                props.push(BytesStart::new("w:rFonts").with_attributes([
                    ("w:ascii", font.as_str()),
                    ("w:hAnsi", font.as_str()),
                    ("w:cs", font.as_str()),
                ]));
            }
            if let Some(bold) = format.bold {
                props.push(BytesStart::new("w:b").with_attributes([("w:val", on_off(bold))]));
            }
            if let Some(italic) = format.italic {
                props.push(BytesStart::new("w:i").with_attributes([("w:val", on_off(italic))]));
            }
            if let Some(size) = &size {
                props.push(BytesStart::new("w:sz").with_attributes([("w:val", size.as_str())]));
            }
            if let Some(underline) = &format.underline {
                props.push(BytesStart::new("w:u").with_attributes([("w:val", underline.as_str())]));
            }

            writer
                .write_event(Event::Start(BytesStart::new("w:rPr")))
                .map_err(xml_error)?;
            for prop in props {
                writer.write_event(Event::Empty(prop)).map_err(xml_error)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("w:rPr")))
                .map_err(xml_error)?;
        }

        writer
            .write_event(Event::Start(
                BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
            ))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&run.text)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:t")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:r")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("w:p")))
        .map_err(xml_error)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}
