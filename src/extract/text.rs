//! Plain-text extraction: a strict UTF-8 decode, nothing else.

use crate::core::errors::ExtractError;

pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_round_trips_exactly() {
        let input = "hello\nworld";
        assert_eq!(extract(input.as_bytes()).unwrap(), input);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let err = extract(&[0xc3, 0x28]).unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }
}
