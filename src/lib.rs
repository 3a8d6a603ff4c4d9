//! # Balance Sheet Analyzer
//!
//! A library for reading Brazilian financial statements (text extracted from PDFs)
//! and turning them into a fixed set of line items, ratios, health ratings and insights.
//!
//! ## Core Concepts
//!
//! - **Fields**: Line items such as `ativo_total` or `lucro_liquido`, found with ordered regex alternatives
//! - **Derived Fields**: Ratios computed right after extraction (liquidez corrente, ROE, ...)
//! - **Ratios**: Labeled indicators ("ROE (%)", "Endividamento Geral") for presentation
//! - **Assessment**: Each ratio rated BOM / REGULAR / ATENÇÃO against a threshold table
//! - **Insights**: Fixed rules that produce short alerts and recommendations
//!
//! Missing data is never an error: a field that is not found is absent, and every
//! ratio that depends on it is absent too. A zero denominator yields `0`, flagged
//! as `guarded` on the ratio.
//!
//! ## Example
//!
//! ```rust
//! use balance_sheet_analyzer::*;
//!
//! let text = "ATIVO TOTAL R$ 1.000.000,00\n\
//!             PASSIVO TOTAL R$ 400.000,00\n\
//!             PATRIMÔNIO LÍQUIDO R$ 600.000,00";
//!
//! let result = analyze_text("balanco.pdf", text.len() as u64, text, Vec::new());
//!
//! assert_eq!(result.data.get(Field::AtivoTotal), Some(1_000_000.0));
//! assert_eq!(result.ratio(RatioKind::EndividamentoGeral), Some(0.4));
//! ```

pub mod assessment;
pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod insights;
pub mod ratios;
pub mod schema;
pub mod session;
pub mod utils;

pub use assessment::{assess, default_criteria, AssessmentCriterion, HealthAssessor};
pub use config::AnalyzerConfig;
pub use document::{DocumentExtractor, ExtractedDocument, PlainTextExtractor, UploadedDocument};
pub use error::{AnalysisError, Result};
pub use extraction::{extract, extract_company_info, FieldExtractor};
pub use insights::{generate_insights, InsightGenerator};
pub use ratios::{compute_ratios, RatioEngine};
pub use schema::*;
pub use session::ResultStore;
pub use utils::*;

#[cfg(feature = "pdf")]
pub use document::PdfTextExtractor;

use chrono::Utc;
use log::{debug, info, warn};

pub struct FinancialAnalyzer {
    config: AnalyzerConfig,
    extractor: FieldExtractor,
}

impl Default for FinancialAnalyzer {
    fn default() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            extractor: FieldExtractor::new(),
        }
    }
}

impl FinancialAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let extractor = FieldExtractor::with_extra_patterns(&config.extra_patterns)?;

        debug!(
            "Analyzer configured with {} criteria and extra patterns for {} fields",
            config.criteria.len(),
            config.extra_patterns.len()
        );

        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs the whole pipeline on already extracted text. Never fails: missing
    /// data shows up as absent fields and the matching `status`.
    pub fn analyze_text(
        &self,
        filename: &str,
        size_bytes: u64,
        text: &str,
        tables: Vec<Table>,
    ) -> AnalysisResult {
        info!("Analyzing {} ({} bytes)", filename, size_bytes);

        let (company, data) = if text.trim().is_empty() {
            (CompanyInfo::default(), FinancialData::default())
        } else {
            self.extractor.extract(text)
        };

        let status = if text.trim().is_empty() {
            ExtractionStatus::NoText
        } else if data.is_empty() {
            ExtractionStatus::NoFinancialData
        } else {
            ExtractionStatus::Extracted
        };

        let ratios = compute_ratios(&data);
        let assessment = assess(&ratios, &self.config.criteria);
        let insights = generate_insights(&ratios, &data);

        debug!(
            "{}: {:?}, {} ratios, {} assessed, {} insights",
            filename,
            status,
            ratios.len(),
            assessment.len(),
            insights.len()
        );

        AnalysisResult {
            filename: filename.to_string(),
            size_bytes,
            processed_at: Utc::now(),
            status,
            text_preview: text_preview(text, self.config.preview_chars),
            company,
            data,
            tables,
            ratios,
            assessment,
            insights,
        }
    }

    /// Extracts the document and analyzes it. Extractor failures degrade to an
    /// empty result with status `NoText`.
    pub fn analyze_document(
        &self,
        document: &UploadedDocument,
        extractor: &dyn DocumentExtractor,
    ) -> AnalysisResult {
        let extracted = match extractor.extract(&document.bytes) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(
                    "{} could not read {}: {}",
                    extractor.name(),
                    document.filename,
                    e
                );
                ExtractedDocument::default()
            }
        };

        self.analyze_text(
            &document.filename,
            document.size_bytes(),
            &extracted.text,
            extracted.tables,
        )
    }

    /// Processes documents one after another. One bad document never aborts the batch.
    pub fn process_batch(
        &self,
        documents: &[UploadedDocument],
        extractor: &dyn DocumentExtractor,
    ) -> Vec<AnalysisResult> {
        info!("Processing batch of {} documents", documents.len());

        let results: Vec<AnalysisResult> = documents
            .iter()
            .map(|doc| self.analyze_document(doc, extractor))
            .collect();

        let extracted = results
            .iter()
            .filter(|r| r.status == ExtractionStatus::Extracted)
            .count();
        info!(
            "Batch finished: {} of {} documents with financial data",
            extracted,
            results.len()
        );

        results
    }
}

pub fn analyze_text(
    filename: &str,
    size_bytes: u64,
    text: &str,
    tables: Vec<Table>,
) -> AnalysisResult {
    FinancialAnalyzer::default().analyze_text(filename, size_bytes, text, tables)
}

pub fn process_batch(
    documents: &[UploadedDocument],
    extractor: &dyn DocumentExtractor,
) -> Vec<AnalysisResult> {
    FinancialAnalyzer::default().process_batch(documents, extractor)
}
