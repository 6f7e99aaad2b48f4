//! Word-processor and slide-deck extraction.
//!
//! Both formats are ZIP containers holding XML parts. Text lives in
//! leaf run elements (`w:t` for documents, `a:t` for slides); paragraph
//! close tags become newlines. A full XML parse buys nothing here, so the
//! text is pulled out with a small tag scanner.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::core::errors::ExtractError;

/// Paragraph texts of a `.docx`, in document order, newline separated.
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let xml = read_zip_entry(bytes, "word/document.xml")?;
    Ok(collect_xml_text(&xml, "w:t", "w:p"))
}

/// Slide texts of a `.pptx`: slides in numeric order, every text-bearing
/// shape's runs newline separated.
pub fn extract_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ExtractError::parse)?;

    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort();

    let mut out = String::new();
    for (_, name) in slides {
        let mut entry = archive.by_name(&name).map_err(ExtractError::parse)?;
        let mut xml = String::new();
        entry.read_to_string(&mut xml).map_err(ExtractError::parse)?;

        let slide_text = collect_xml_text(&xml, "a:t", "a:p");
        if !slide_text.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&slide_text);
        }
    }
    Ok(out)
}

pub(crate) fn read_zip_entry(bytes: &[u8], entry: &str) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ExtractError::parse)?;
    let mut file = archive.by_name(entry).map_err(ExtractError::parse)?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(ExtractError::parse)?;
    Ok(content)
}

/// Pull character data out of `text_tag` runs, inserting a newline at
/// every closing `paragraph_tag`. Tags may carry attributes or be
/// self-closing.
pub(crate) fn collect_xml_text(xml: &str, text_tag: &str, paragraph_tag: &str) -> String {
    let mut out = String::new();
    let mut cursor = 0usize;
    let mut in_text_run = false;

    while let Some(open_rel) = xml[cursor..].find('<') {
        let open = cursor + open_rel;
        if in_text_run {
            out.push_str(&decode_xml_entities(&xml[cursor..open]));
        }
        let Some(close_rel) = xml[open..].find('>') else {
            break;
        };
        let close = open + close_rel;
        let tag_body = &xml[open + 1..close];

        let (closing, name) = match tag_body.strip_prefix('/') {
            Some(rest) => (true, rest.trim_end()),
            None => (
                false,
                tag_body
                    .split(|c| c == ' ' || c == '/')
                    .next()
                    .unwrap_or(tag_body),
            ),
        };

        if name == text_tag {
            in_text_run = !closing && !tag_body.ends_with('/');
        } else if closing && name == paragraph_tag && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }

        cursor = close + 1;
    }

    out.trim_end().to_string()
}

pub(crate) fn decode_xml_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
