pub mod pdftotext;

use crate::error::LogbookError;

/// Text extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page
    /// in document order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, LogbookError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Concatenate extracted pages into one newline-separated text, page by page.
pub fn join_pages(pages: &[PageContent]) -> String {
    pages
        .iter()
        .flat_map(|p| p.lines.iter().map(|s| s.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_keeps_page_order() {
        let pages = vec![
            PageContent {
                page_number: 1,
                lines: vec!["Basis Chirurgie".into(), "Appendektomie".into()],
            },
            PageContent {
                page_number: 2,
                lines: vec!["10".into()],
            },
        ];
        assert_eq!(join_pages(&pages), "Basis Chirurgie\nAppendektomie\n10");
    }

    #[test]
    fn test_join_pages_empty() {
        assert_eq!(join_pages(&[]), "");
    }
}
