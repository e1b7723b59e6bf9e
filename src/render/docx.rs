//! Rich-document emitter: an OOXML package with embedded screenshots.
//!
//! A `.docx` file is a zip archive of XML parts. The pack written here is
//! the minimal set Word and LibreOffice accept: content types, package
//! relationships, `word/document.xml`, a small style sheet, and one
//! `word/media/` entry per embedded screenshot. Screenshot files that are
//! missing or unreadable at render time degrade to a placeholder line so
//! one lost image never sinks the whole document.

use crate::bundle::{ApiEvent, DbEvent, EvidenceBundle, UiEvent};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const EMU_PER_INCH: u64 = 914_400;

/// Images render at a fixed 6-inch display width, matching the page body.
const DISPLAY_WIDTH_EMU: u64 = 6 * EMU_PER_INCH;

/// Height used when the image dimensions cannot be read (4:3 box).
const FALLBACK_HEIGHT_EMU: u64 = DISPLAY_WIDTH_EMU * 3 / 4;

/// Raster formats the package declares content types for.
const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

struct EmbeddedImage {
    /// Part name under `word/media/`.
    file_name: String,
    rel_id: String,
    bytes: Vec<u8>,
    width_emu: u64,
    height_emu: u64,
}

/// Render the bundle to `<dir>/<file_stem>.docx` and return the path.
pub fn write_bundle(dir: &Path, file_stem: &str, bundle: &EvidenceBundle) -> Result<PathBuf> {
    let path = dir.join(format!("{file_stem}.docx"));

    let mut images = Vec::new();
    let document_xml = build_document_xml(bundle, &mut images);

    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let parts: [(&str, String); 4] = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", package_rels_xml()),
        ("word/_rels/document.xml.rels", document_rels_xml(&images)),
        ("word/styles.xml", styles_xml()),
    ];
    for (name, content) in parts {
        archive
            .start_file(name, options)
            .with_context(|| format!("start zip entry {name}"))?;
        archive
            .write_all(content.as_bytes())
            .with_context(|| format!("write zip entry {name}"))?;
    }

    archive
        .start_file("word/document.xml", options)
        .context("start zip entry word/document.xml")?;
    archive
        .write_all(document_xml.as_bytes())
        .context("write zip entry word/document.xml")?;

    for image in &images {
        let name = format!("word/media/{}", image.file_name);
        archive
            .start_file(name.as_str(), options)
            .with_context(|| format!("start zip entry {name}"))?;
        archive
            .write_all(&image.bytes)
            .with_context(|| format!("write zip entry {name}"))?;
    }

    archive.finish().context("finalize docx package")?;
    Ok(path)
}

fn build_document_xml(bundle: &EvidenceBundle, images: &mut Vec<EmbeddedImage>) -> String {
    let mut body = String::new();

    let title = format!("{} - {}", bundle.feature, bundle.scenario);
    push_styled(&mut body, "Title", true, &title);
    push_paragraph(&mut body, &format!("Feature: {}", bundle.feature));
    push_paragraph(&mut body, &format!("Scenario: {}", bundle.scenario));
    push_paragraph(&mut body, &format!("Timestamp: {}", bundle.timestamp));
    push_paragraph(&mut body, "");

    if !bundle.ui_screenshots.is_empty() {
        push_styled(&mut body, "Heading1", false, "Screenshots");
        for (idx, shot) in bundle.ui_screenshots.iter().enumerate() {
            push_screenshot_section(&mut body, idx + 1, shot, images);
        }
    }

    if !bundle.api_requests.is_empty() {
        push_styled(&mut body, "Heading1", false, "API Requests");
        for (idx, event) in bundle.api_requests.iter().enumerate() {
            push_api_section(&mut body, idx + 1, event);
        }
    }

    if !bundle.database_queries.is_empty() {
        push_styled(&mut body, "Heading1", false, "Database Queries");
        for (idx, event) in bundle.database_queries.iter().enumerate() {
            push_db_section(&mut body, idx + 1, event);
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
            "<w:body>{body}",
            r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>"#,
            "</w:body></w:document>"
        ),
        body = body
    )
}

fn push_screenshot_section(
    body: &mut String,
    index: usize,
    shot: &UiEvent,
    images: &mut Vec<EmbeddedImage>,
) {
    push_styled(body, "Heading2", false, &format!("Screenshot {index}"));
    if !shot.description.is_empty() {
        push_paragraph(body, &format!("Description: {}", shot.description));
    }
    if !shot.page_url.is_empty() {
        push_paragraph(body, &format!("Page URL: {}", shot.page_url));
    }
    if !shot.timestamp.is_empty() {
        push_paragraph(body, &format!("Time: {}", shot.timestamp));
    }

    let path = Path::new(&shot.path);
    if !path.exists() {
        push_paragraph(body, &format!("[Screenshot file not found: {}]", shot.path));
        return;
    }
    match load_image(path, images.len() + 1) {
        Some(image) => {
            push_image(body, &image, images.len() + 1);
            images.push(image);
            push_paragraph(body, "");
        }
        None => {
            tracing::warn!(path = %shot.path, "failed to embed screenshot");
            push_paragraph(body, &format!("[Screenshot not available: {}]", shot.path));
        }
    }
}

fn push_api_section(body: &mut String, index: usize, event: &ApiEvent) {
    push_styled(body, "Heading2", false, &format!("Request {index}"));
    push_paragraph(body, &format!("Method: {}", event.request.method));
    push_paragraph(body, &format!("URL: {}", event.request.url));
    if !event.request.headers.is_empty() {
        let headers = serde_json::to_string_pretty(&event.request.headers)
            .unwrap_or_else(|_| format!("{:?}", event.request.headers));
        push_multiline(body, &format!("Headers: {headers}"));
    }
    if !event.request.body.is_null() {
        push_multiline(body, &format!("Body: {}", pretty_value(&event.request.body)));
    }
    let status = match event.response.status_code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    };
    push_paragraph(body, &format!("Response Status: {status}"));
    if !event.response.body.is_null() {
        push_multiline(body, &format!("Response: {}", pretty_value(&event.response.body)));
    }
    push_paragraph(body, "");
}

fn push_db_section(body: &mut String, index: usize, event: &DbEvent) {
    push_styled(body, "Heading2", false, &format!("Query {index}"));
    push_paragraph(body, &format!("SQL: {}", event.query));
    if let Some(error) = &event.error {
        push_paragraph(body, &format!("Error: {error}"));
    } else {
        push_paragraph(body, &format!("Rows: {}", event.row_count));
        if !event.result.is_empty() {
            let result = Value::Array(event.result.iter().cloned().map(Value::Object).collect());
            push_multiline(body, &format!("Result: {}", pretty_value(&result)));
        }
    }
    push_paragraph(body, "");
}

fn pretty_value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn push_paragraph(body: &mut String, text: &str) {
    if text.is_empty() {
        body.push_str("<w:p/>");
        return;
    }
    body.push_str(&format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    ));
}

fn push_styled(body: &mut String, style: &str, centered: bool, text: &str) {
    let justify = if centered { r#"<w:jc w:val="center"/>"# } else { "" };
    body.push_str(&format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style}"/>{justify}</w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    ));
}

/// Paragraph with line breaks preserved; `w:t` swallows newlines, so each
/// line becomes its own run behind a `<w:br/>`.
fn push_multiline(body: &mut String, text: &str) {
    body.push_str("<w:p>");
    for (idx, line) in text.lines().enumerate() {
        body.push_str("<w:r>");
        if idx > 0 {
            body.push_str("<w:br/>");
        }
        body.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape_xml(line)
        ));
        body.push_str("</w:r>");
    }
    body.push_str("</w:p>");
}

fn push_image(body: &mut String, image: &EmbeddedImage, index: usize) {
    body.push_str(&format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Screenshot {id}"/>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="Screenshot {id}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ),
        cx = image.width_emu,
        cy = image.height_emu,
        id = index,
        rel = image.rel_id,
    ));
}

fn load_image(path: &Path, index: usize) -> Option<EmbeddedImage> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    let bytes = fs::read(path).ok()?;

    let (width_emu, height_emu) = match png_dimensions(&bytes) {
        Some((width, height)) => {
            let scaled = DISPLAY_WIDTH_EMU * u64::from(height) / u64::from(width);
            (DISPLAY_WIDTH_EMU, scaled)
        }
        None => (DISPLAY_WIDTH_EMU, FALLBACK_HEIGHT_EMU),
    };

    Some(EmbeddedImage {
        file_name: format!("image{index}.{extension}"),
        rel_id: format!("rId{}", index + 1),
        bytes,
        width_emu,
        height_emu,
    })
}

/// Read width and height from a PNG IHDR header. Returns `None` for
/// non-PNG bytes; those images fall back to the 4:3 display box.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    if bytes.len() < 24 || bytes[..8] != SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(bytes[20..24].try_into().ok()?);
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn content_types_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Default Extension="jpg" ContentType="image/jpeg"/>"#,
        r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#,
        r#"<Default Extension="gif" ContentType="image/gif"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        "</Types>"
    )
    .to_string()
}

fn package_rels_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
        "</Relationships>"
    )
    .to_string()
}

fn document_rels_xml(images: &[EmbeddedImage]) -> String {
    let mut rels = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#
    ));
    for image in images {
        rels.push_str(&format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/{}"/>"#,
            image.rel_id, image.file_name
        ));
    }
    rels.push_str("</Relationships>");
    rels
}

fn styles_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/>"#,
        r#"<w:rPr><w:b/><w:sz w:val="56"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/>"#,
        r#"<w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/>"#,
        r#"<w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style>"#,
        "</w:styles>"
    )
    .to_string()
}
