//! Uploaded-document text extraction.
//!
//! Turns an uploaded file into plain text for context assembly. The
//! public entry point never fails: whatever goes wrong inside a format
//! handler is downgraded to a descriptive placeholder string, because the
//! rest of the pipeline must proceed even with partial information.

mod image;
mod office;
mod pdf;
mod tabular;
mod text;

use std::path::Path;

/// Closed set of recognized upload formats.
///
/// Derived from the filename extension; anything else lands in
/// `Unsupported` carrying the original extension for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    WordDocument,
    Spreadsheet,
    DelimitedText,
    SlideDeck,
    RasterImage,
    Media,
    Unsupported(String),
}

impl DocumentFormat {
    pub fn from_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" | "text" | "log" => DocumentFormat::PlainText,
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::WordDocument,
            "xlsx" => DocumentFormat::Spreadsheet,
            "csv" | "tsv" => DocumentFormat::DelimitedText,
            "pptx" => DocumentFormat::SlideDeck,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => DocumentFormat::RasterImage,
            "mp3" | "wav" | "ogg" | "mp4" | "avi" | "mov" | "mkv" => DocumentFormat::Media,
            _ => DocumentFormat::Unsupported(ext),
        }
    }
}

/// One uploaded file: raw bytes plus the format tag derived from its name.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub name: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let format = DocumentFormat::from_name(&name);
        UploadedDocument {
            name,
            format,
            bytes,
        }
    }
}

/// Extract plain text from an uploaded document.
///
/// Always returns a string: real content where a handler succeeds, a
/// placeholder naming the file and the problem where it does not.
pub fn extract(doc: &UploadedDocument) -> String {
    let result = match &doc.format {
        DocumentFormat::PlainText => text::extract(&doc.bytes),
        DocumentFormat::Pdf => pdf::extract(&doc.bytes),
        DocumentFormat::WordDocument => office::extract_docx(&doc.bytes),
        DocumentFormat::SlideDeck => office::extract_pptx(&doc.bytes),
        DocumentFormat::Spreadsheet => tabular::extract_xlsx(&doc.bytes),
        DocumentFormat::DelimitedText => {
            let delimiter = if doc.name.to_ascii_lowercase().ends_with(".tsv") {
                '\t'
            } else {
                ','
            };
            tabular::extract_delimited(&doc.bytes, delimiter)
        }
        DocumentFormat::RasterImage => image::describe(&doc.name, &doc.bytes),
        DocumentFormat::Media => {
            return format!("[media file {} attached; content not analyzed]", doc.name);
        }
        DocumentFormat::Unsupported(ext) => {
            return if ext.is_empty() {
                format!("[unsupported file type for {}]", doc.name)
            } else {
                format!("[unsupported file type .{} for {}]", ext, doc.name)
            };
        }
    };

    match result {
        Ok(content) if !content.trim().is_empty() => content,
        Ok(_) => format!("[no text content in {}]", doc.name),
        Err(err) => {
            tracing::warn!("extraction failed for {}: {}", doc.name, err);
            format!("[could not read {}: {}]", doc.name, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_covers_known_extensions() {
        assert_eq!(
            DocumentFormat::from_name("notes.txt"),
            DocumentFormat::PlainText
        );
        assert_eq!(
            DocumentFormat::from_name("Paper.PDF"),
            DocumentFormat::Pdf
        );
        assert_eq!(
            DocumentFormat::from_name("report.docx"),
            DocumentFormat::WordDocument
        );
        assert_eq!(
            DocumentFormat::from_name("grades.xlsx"),
            DocumentFormat::Spreadsheet
        );
        assert_eq!(
            DocumentFormat::from_name("data.csv"),
            DocumentFormat::DelimitedText
        );
        assert_eq!(
            DocumentFormat::from_name("deck.pptx"),
            DocumentFormat::SlideDeck
        );
        assert_eq!(
            DocumentFormat::from_name("photo.jpeg"),
            DocumentFormat::RasterImage
        );
        assert_eq!(
            DocumentFormat::from_name("lecture.mp4"),
            DocumentFormat::Media
        );
    }

    #[test]
    fn unknown_extension_is_carried_for_diagnostics() {
        match DocumentFormat::from_name("archive.xyz") {
            DocumentFormat::Unsupported(ext) => assert_eq!(ext, "xyz"),
            other => panic!("expected Unsupported, got {:?}", other),
        }
    }

    #[test]
    fn plain_text_is_passed_through_verbatim() {
        let doc = UploadedDocument::from_bytes("hello.txt", b"hello\nworld".to_vec());
        assert_eq!(extract(&doc), "hello\nworld");
    }

    #[test]
    fn plain_text_extraction_is_idempotent() {
        let doc = UploadedDocument::from_bytes("notes.md", b"# Title\n\nBody text.".to_vec());
        let first = extract(&doc);
        let second = extract(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_utf8_becomes_a_placeholder() {
        let doc = UploadedDocument::from_bytes("broken.txt", vec![0xff, 0xfe, 0x00]);
        let out = extract(&doc);
        assert!(out.starts_with("[could not read broken.txt"));
    }

    #[test]
    fn media_files_are_named_but_not_analyzed() {
        let doc = UploadedDocument::from_bytes("lecture.mp4", vec![0, 1, 2, 3]);
        let out = extract(&doc);
        assert!(out.contains("lecture.mp4"));
        assert!(out.contains("not analyzed"));
    }

    #[test]
    fn unsupported_extension_names_the_extension() {
        let doc = UploadedDocument::from_bytes("blob.xyz", vec![1, 2, 3]);
        let out = extract(&doc);
        assert!(out.contains(".xyz"));
    }

    #[test]
    fn corrupt_container_never_panics() {
        for name in ["a.pdf", "a.docx", "a.pptx", "a.xlsx", "a.png"] {
            let doc = UploadedDocument::from_bytes(name, b"definitely not a real file".to_vec());
            let out = extract(&doc);
            assert!(!out.is_empty(), "placeholder expected for {}", name);
        }
    }

    #[test]
    fn empty_document_yields_a_placeholder() {
        let doc = UploadedDocument::from_bytes("empty.txt", Vec::new());
        let out = extract(&doc);
        assert!(out.contains("empty.txt"));
    }
}
