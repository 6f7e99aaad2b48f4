//! Page-structured document extraction.
//!
//! `pdf-extract` walks the page tree and concatenates page text in
//! document order, which is exactly the shape context assembly wants.

use crate::core::errors::ExtractError;

pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(ExtractError::parse)
}
