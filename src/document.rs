use crate::error::Result;
use crate::schema::Table;

/// A file handed over by the application shell.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Text and tables delivered by a document extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    pub tables: Vec<Table>,
}

impl ExtractedDocument {
    /// Builds a document from per-page cell grids `(page, grid)`.
    /// Grids with fewer than two rows are dropped.
    pub fn new(text: String, grids: Vec<(u32, Vec<Vec<String>>)>) -> Self {
        let tables = grids
            .into_iter()
            .filter_map(|(page, grid)| Table::from_grid(page, grid))
            .collect();
        Self { text, tables }
    }

    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tables: Vec::new(),
        }
    }
}

/// Seam for the component that turns document bytes into text and tables.
pub trait DocumentExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument>;

    fn name(&self) -> &'static str;
}

/// Treats the bytes as (lossy) UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        Ok(ExtractedDocument::text_only(
            String::from_utf8_lossy(bytes).into_owned(),
        ))
    }

    fn name(&self) -> &'static str {
        "plain-text"
    }
}

/// Text extraction through `pdf-extract`. Tables are not detected.
#[cfg(feature = "pdf")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[cfg(feature = "pdf")]
impl DocumentExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            crate::error::AnalysisError::DocumentExtraction(format!(
                "Failed to extract text from PDF: {}",
                e
            ))
        })?;
        Ok(ExtractedDocument::text_only(text))
    }

    fn name(&self) -> &'static str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_plain_text_extractor() {
        let doc = PlainTextExtractor
            .extract("ATIVO TOTAL 1.000,00".as_bytes())
            .unwrap();
        assert_eq!(doc.text, "ATIVO TOTAL 1.000,00");
        assert!(doc.tables.is_empty());
    }

    #[test]
    fn test_plain_text_extractor_is_lossy() {
        let doc = PlainTextExtractor.extract(&[0x41, 0xff, 0x42]).unwrap();
        assert_eq!(doc.text, "A\u{fffd}B");
    }

    #[test]
    fn test_short_grids_are_dropped() {
        let doc = ExtractedDocument::new(
            String::new(),
            vec![
                (1, vec![row(&["Conta", "2023"]), row(&["Estoques", "10,00"])]),
                (2, vec![row(&["cabeçalho solto"])]),
                (3, vec![]),
            ],
        );
        assert_eq!(doc.tables.len(), 1);
        assert_eq!(doc.tables[0].page, 1);
        assert_eq!(doc.tables[0].header, row(&["Conta", "2023"]));
    }

    #[test]
    fn test_uploaded_document_size() {
        let doc = UploadedDocument::new("balanco.pdf", vec![0u8; 2048]);
        assert_eq!(doc.size_bytes(), 2048);
        assert_eq!(doc.filename, "balanco.pdf");
    }
}
