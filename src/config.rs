use crate::assessment::{default_criteria, AssessmentCriterion};
use crate::error::{AnalysisError, Result};
use crate::schema::Field;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Characters of extracted text kept on each result for display.
pub const DEFAULT_PREVIEW_CHARS: usize = 2000;

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzerConfig {
    #[schemars(
        description = "Threshold table used to classify ratios. Ratios without an entry are not assessed."
    )]
    #[serde(default = "default_criteria")]
    pub criteria: Vec<AssessmentCriterion>,

    #[schemars(
        description = "Additional regex patterns per field, tried after the built-in ones. Group 1 must capture the numeric value."
    )]
    #[serde(default)]
    pub extra_patterns: BTreeMap<Field, Vec<String>>,

    #[schemars(description = "Number of characters of raw text kept as a preview on each result")]
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            criteria: default_criteria(),
            extra_patterns: BTreeMap::new(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for criterion in &self.criteria {
            criterion.validate()?;
            if !seen.insert(criterion.ratio) {
                return Err(AnalysisError::InvalidCriterion {
                    ratio: criterion.ratio.label().to_string(),
                    details: "criterion defined more than once".to_string(),
                });
            }
        }

        for (field, patterns) in &self.extra_patterns {
            if patterns.iter().any(|p| p.trim().is_empty()) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "empty extra pattern for field {}",
                    field
                )));
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyzerConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RatioKind;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.preview_chars, 2000);
        assert_eq!(config.criteria.len(), 10);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = AnalyzerConfig::from_json_str("{}").unwrap();
        assert_eq!(config.criteria, default_criteria());
        assert!(config.extra_patterns.is_empty());
        assert_eq!(config.preview_chars, DEFAULT_PREVIEW_CHARS);
    }

    #[test]
    fn test_json_overrides() {
        let json = r#"{
            "criteria": [
                {"ratio": "Liquidez Corrente", "good": 2.0, "regular": 1.2, "description": "LC"}
            ],
            "extra_patterns": {
                "ebitda": ["LAJIDA AJUSTADO[\\s:]*([\\d.,]+)"]
            },
            "preview_chars": 500
        }"#;

        let config = AnalyzerConfig::from_json_str(json).unwrap();
        assert_eq!(config.criteria.len(), 1);
        assert_eq!(config.criteria[0].ratio, RatioKind::LiquidezCorrente);
        assert!(!config.criteria[0].inverse);
        assert_eq!(config.extra_patterns[&Field::Ebitda].len(), 1);
        assert_eq!(config.preview_chars, 500);
    }

    #[test]
    fn test_duplicate_criteria_rejected() {
        let mut config = AnalyzerConfig::default();
        config.criteria.push(config.criteria[0].clone());
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidCriterion { .. })
        ));
    }

    #[test]
    fn test_unknown_ratio_label_rejected() {
        let json = r#"{"criteria": [{"ratio": "P/L", "good": 1.0, "regular": 2.0, "description": "x"}]}"#;
        assert!(matches!(
            AnalyzerConfig::from_json_str(json),
            Err(AnalysisError::SerializationError(_))
        ));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = AnalyzerConfig::default();
        let json = config.to_json().unwrap();
        let back = AnalyzerConfig::from_json_str(&json).unwrap();
        assert_eq!(back.criteria, config.criteria);
    }
}
