//! Tabular document extraction.
//!
//! Spreadsheets and delimited text are rendered as a plain textual
//! matrix: one line per row, cells tab-separated, values verbatim. No
//! numeric reinterpretation happens here; whatever the file stores is
//! what the language model sees.

use std::sync::OnceLock;

use regex::Regex;

use crate::core::errors::ExtractError;

use super::office::{decode_xml_entities, read_zip_entry};

/// Render a `.xlsx` workbook as a textual matrix.
///
/// Shared strings are resolved, inline strings and raw cell values are
/// taken verbatim, and cell-reference letters place each value in its
/// column so gaps survive the round trip.
pub fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractError> {
    let shared = match read_zip_entry(bytes, "xl/sharedStrings.xml") {
        Ok(xml) => parse_shared_strings(&xml),
        Err(_) => Vec::new(),
    };

    let mut sheets: Vec<(u32, String)> = {
        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(ExtractError::parse)?;
        archive
            .file_names()
            .filter_map(|name| {
                let number = name
                    .strip_prefix("xl/worksheets/sheet")?
                    .strip_suffix(".xml")?
                    .parse()
                    .ok()?;
                Some((number, name.to_string()))
            })
            .collect()
    };
    sheets.sort();

    if sheets.is_empty() {
        return Err(ExtractError::Parse("workbook has no worksheets".into()));
    }

    let mut tables = Vec::new();
    for (_, name) in sheets {
        let xml = read_zip_entry(bytes, &name)?;
        let table = render_sheet(&xml, &shared);
        if !table.is_empty() {
            tables.push(table);
        }
    }
    Ok(tables.join("\n\n"))
}

/// Render delimited text (`.csv`/`.tsv`) as a textual matrix.
pub fn extract_delimited(bytes: &[u8], delimiter: char) -> Result<String, ExtractError> {
    let raw = String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Decode(e.to_string()))?;
    let rows = parse_delimited(&raw, delimiter);
    Ok(rows
        .into_iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn shared_string_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<si>(.*?)</si>").unwrap())
}

fn text_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<t[^>]*>(.*?)</t>").unwrap())
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<row[^>]*>(.*?)</row>").unwrap())
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)<c\s+([^>/]*)(?:/>|>(.*?)</c>)"#).unwrap())
}

fn cell_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<v>(.*?)</v>").unwrap())
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(\w+)="([^"]*)""#).unwrap())
}

fn parse_shared_strings(xml: &str) -> Vec<String> {
    shared_string_item_re()
        .captures_iter(xml)
        .map(|si| {
            text_run_re()
                .captures_iter(&si[1])
                .map(|t| decode_xml_entities(&t[1]))
                .collect::<Vec<_>>()
                .join("")
        })
        .collect()
}

fn render_sheet(xml: &str, shared: &[String]) -> String {
    let mut lines = Vec::new();

    for row in row_re().captures_iter(xml) {
        let mut cells: Vec<String> = Vec::new();

        for cell in cell_re().captures_iter(&row[1]) {
            let attrs = &cell[1];
            let body = cell.get(2).map_or("", |m| m.as_str());

            let mut cell_type = None;
            let mut column = None;
            for attr in attr_re().captures_iter(attrs) {
                match &attr[1] {
                    "t" => cell_type = Some(attr[2].to_string()),
                    "r" => column = column_index(&attr[2]),
                    _ => {}
                }
            }

            let value = match cell_type.as_deref() {
                Some("s") => cell_value_re()
                    .captures(body)
                    .and_then(|v| v[1].parse::<usize>().ok())
                    .and_then(|i| shared.get(i).cloned())
                    .unwrap_or_default(),
                Some("inlineStr") => text_run_re()
                    .captures_iter(body)
                    .map(|t| decode_xml_entities(&t[1]))
                    .collect(),
                _ => cell_value_re()
                    .captures(body)
                    .map(|v| decode_xml_entities(&v[1]))
                    .unwrap_or_default(),
            };

            match column {
                Some(at) => {
                    if cells.len() <= at {
                        cells.resize(at + 1, String::new());
                    }
                    cells[at] = value;
                }
                None => cells.push(value),
            }
        }

        lines.push(cells.join("\t"));
    }

    lines.join("\n")
}

/// `"A"` → 0, `"Z"` → 25, `"AA"` → 26; digits in the reference are the
/// row number and are ignored.
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for c in letters.chars() {
        index = index * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

/// Quote-aware field splitting: quoted fields may contain the delimiter
/// and newlines, a doubled quote inside a quoted field is a literal
/// quote.
fn parse_delimited(raw: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            c if c == delimiter => row.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
