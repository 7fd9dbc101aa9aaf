//! PDF text extraction.

/// Extract plain text from PDF bytes.
///
/// Failures are returned as plain strings: the caller records them as
/// diagnostic notes rather than propagating them.
pub fn extract_text(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_error() {
        assert!(extract_text(b"this is not a pdf").is_err());
    }
}
