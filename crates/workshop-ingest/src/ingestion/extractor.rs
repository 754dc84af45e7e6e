//! Text extraction from fetched asset bytes

use crate::error::{Error, Result};

/// Normalize extracted PDF text: drop NUL bytes, trim lines, remove blanks
fn normalize_pdf_text(text: &str) -> String {
    text.replace('\0', "")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts plain text from raw asset bytes
pub struct TextExtractor;

impl TextExtractor {
    /// Extract text from the given bytes, routing on the filename extension.
    ///
    /// PDFs go through a text extraction library with a structural fallback.
    /// Everything else is decoded as UTF-8, replacing invalid sequences.
    pub fn extract(filename: &str, data: &[u8]) -> Result<String> {
        if filename.to_lowercase().ends_with(".pdf") {
            Self::extract_pdf(filename, data)
        } else {
            Ok(String::from_utf8_lossy(data).into_owned())
        }
    }

    /// Extract PDF text, falling back to page-level extraction when the
    /// primary extractor cannot handle the file
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<String> {
        let raw = match pdf_extract::extract_text_from_mem(data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("pdf-extract failed for '{}': {}, trying fallback", filename, e);
                Self::extract_pdf_fallback(filename, data)?
            }
        };

        let content = normalize_pdf_text(&raw);
        if content.is_empty() {
            return Err(Error::extraction(
                filename,
                "no text content could be extracted",
            ));
        }

        Ok(content)
    }

    /// Fallback extraction using lopdf page by page
    fn extract_pdf_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::extraction(filename, format!("failed to load PDF: {}", e)))?;

        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        doc.extract_text(&page_numbers)
            .map_err(|e| Error::extraction(filename, format!("failed to extract text: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through_verbatim() {
        let data = b"line one\n\nline two with    spaces";
        let text = TextExtractor::extract("notes.txt", data).unwrap();
        assert_eq!(text, "line one\n\nline two with    spaces");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let data = vec![b'o', b'k', 0xFF, 0xFE, b'!'];
        let text = TextExtractor::extract("export.csv", &data).unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_pdf_extension_is_case_insensitive() {
        // Garbage bytes routed to the PDF path must fail extraction rather
        // than decode as text.
        let err = TextExtractor::extract("Slides.PDF", b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_corrupt_pdf_reports_extraction_error() {
        let err = TextExtractor::extract("deck.pdf", &[0u8; 64]).unwrap_err();
        match err {
            Error::Extraction { filename, .. } => assert_eq!(filename, "deck.pdf"),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_strips_nul_and_blank_lines() {
        let raw = "  Title  \n\0\n\n  body line \n\n";
        assert_eq!(normalize_pdf_text(raw), "Title\nbody line");
    }
}
