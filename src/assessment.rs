use crate::error::{AnalysisError, Result};
use crate::schema::{Assessment, AssessmentEntry, HealthStatus, RatioKind, Ratios};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Two-threshold rule for one ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentCriterion {
    pub ratio: RatioKind,

    #[schemars(description = "Boundary of the GOOD band (inclusive)")]
    pub good: f64,

    #[schemars(description = "Boundary of the REGULAR band (inclusive)")]
    pub regular: f64,

    pub description: String,

    #[schemars(
        description = "Lower is better (leverage ratios). GOOD when value <= good, REGULAR when value <= regular."
    )]
    #[serde(default)]
    pub inverse: bool,
}

impl AssessmentCriterion {
    pub fn new(
        ratio: RatioKind,
        good: f64,
        regular: f64,
        description: impl Into<String>,
        inverse: bool,
    ) -> Self {
        Self {
            ratio,
            good,
            regular,
            description: description.into(),
            inverse,
        }
    }

    pub fn classify(&self, value: f64) -> HealthStatus {
        if self.inverse {
            if value <= self.good {
                HealthStatus::Good
            } else if value <= self.regular {
                HealthStatus::Regular
            } else {
                HealthStatus::Warning
            }
        } else if value >= self.good {
            HealthStatus::Good
        } else if value >= self.regular {
            HealthStatus::Regular
        } else {
            HealthStatus::Warning
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.good.is_finite() || !self.regular.is_finite() {
            return Err(AnalysisError::InvalidCriterion {
                ratio: self.ratio.label().to_string(),
                details: format!(
                    "thresholds must be finite (good={}, regular={})",
                    self.good, self.regular
                ),
            });
        }

        let ordered = if self.inverse {
            self.regular >= self.good
        } else {
            self.regular <= self.good
        };

        if !ordered {
            return Err(AnalysisError::InvalidCriterion {
                ratio: self.ratio.label().to_string(),
                details: format!(
                    "regular threshold {} is on the wrong side of good threshold {} (inverse={})",
                    self.regular, self.good, self.inverse
                ),
            });
        }

        Ok(())
    }
}

pub fn default_criteria() -> Vec<AssessmentCriterion> {
    vec![
        AssessmentCriterion::new(
            RatioKind::LiquidezCorrente,
            1.5,
            1.0,
            "Capacidade de pagamento de curto prazo",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::LiquidezSeca,
            1.0,
            0.7,
            "Pagamento de curto prazo sem depender de estoques",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::EndividamentoGeral,
            0.4,
            0.6,
            "Participação de capital de terceiros",
            true,
        ),
        AssessmentCriterion::new(
            RatioKind::EndividamentoTotalAtivo,
            0.5,
            0.7,
            "Proporção do ativo financiada por dívidas",
            true,
        ),
        AssessmentCriterion::new(
            RatioKind::GiroDoAtivo,
            1.0,
            0.5,
            "Eficiência no uso dos ativos",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::PlSobreAtivo,
            0.5,
            0.3,
            "Proporção do ativo financiada por capital próprio",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::RoePct,
            15.0,
            8.0,
            "Retorno sobre o patrimônio líquido",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::RoaPct,
            8.0,
            4.0,
            "Retorno sobre os ativos",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::MargemLiquidaPct,
            10.0,
            5.0,
            "Lucro líquido por real de receita",
            false,
        ),
        AssessmentCriterion::new(
            RatioKind::MargemBrutaPct,
            30.0,
            15.0,
            "Lucro bruto por real de receita",
            false,
        ),
    ]
}

pub struct HealthAssessor<'a> {
    criteria: &'a [AssessmentCriterion],
}

impl<'a> HealthAssessor<'a> {
    pub fn new(criteria: &'a [AssessmentCriterion]) -> Self {
        Self { criteria }
    }

    /// Classifies every ratio that has a criterion. Ratios without one are skipped.
    pub fn assess(&self, ratios: &Ratios) -> Assessment {
        let mut assessment = Assessment::new();

        for criterion in self.criteria {
            let Some(ratio) = ratios.get(&criterion.ratio) else {
                continue;
            };

            let status = criterion.classify(ratio.value);
            debug!(
                "{} = {:.4} classified as {}",
                criterion.ratio, ratio.value, status
            );

            assessment.insert(
                criterion.ratio,
                AssessmentEntry {
                    status,
                    value: ratio.value,
                    description: criterion.description.clone(),
                },
            );
        }

        assessment
    }
}

pub fn assess(ratios: &Ratios, criteria: &[AssessmentCriterion]) -> Assessment {
    HealthAssessor::new(criteria).assess(ratios)
}
