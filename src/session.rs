use crate::schema::AnalysisResult;
use log::debug;

/// Caller-owned holder for the latest batch of results.
///
/// The analysis pipeline never touches this store; the application shell
/// decides when to fill it and when to clear it.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: Vec<AnalysisResult>,
    processing_requested: bool,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the previous batch.
    pub fn set(&mut self, results: Vec<AnalysisResult>) {
        debug!(
            "Storing {} results (replacing {})",
            results.len(),
            self.results.len()
        );
        self.results = results;
    }

    pub fn get(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
        self.processing_requested = false;
    }

    pub fn request_processing(&mut self) {
        self.processing_requested = true;
    }

    /// Returns whether processing was requested and resets the flag.
    pub fn take_processing_request(&mut self) -> bool {
        std::mem::take(&mut self.processing_requested)
    }
}
