use crate::schema::{AnalysisResult, FinancialData, Field, Insight, InsightKind, RatioKind, Ratios};
use crate::utils::format_brl;

/// Upper revenue bounds for each size band, in BRL.
const MICRO_REVENUE_LIMIT: f64 = 360_000.0;
const SMALL_REVENUE_LIMIT: f64 = 4_800_000.0;
const MEDIUM_REVENUE_LIMIT: f64 = 300_000_000.0;

fn insight(kind: InsightKind, title: &str, description: String, recommendation: &str) -> Insight {
    Insight {
        kind,
        title: title.to_string(),
        description,
        recommendation: recommendation.to_string(),
    }
}

fn size_band(revenue: f64) -> &'static str {
    if revenue <= MICRO_REVENUE_LIMIT {
        "microempresa"
    } else if revenue <= SMALL_REVENUE_LIMIT {
        "empresa de pequeno porte"
    } else if revenue <= MEDIUM_REVENUE_LIMIT {
        "empresa de médio porte"
    } else {
        "empresa de grande porte"
    }
}

pub struct InsightGenerator<'a> {
    ratios: &'a Ratios,
    data: &'a FinancialData,
}

impl<'a> InsightGenerator<'a> {
    pub fn new(ratios: &'a Ratios, data: &'a FinancialData) -> Self {
        Self { ratios, data }
    }

    fn ratio(&self, kind: RatioKind) -> Option<f64> {
        self.ratios.get(&kind).map(|r| r.value)
    }

    /// Runs every rule in display order. Rules are independent; none suppresses another.
    pub fn generate(&self) -> Vec<Insight> {
        let mut insights = Vec::new();

        if let Some(lc) = self.ratio(RatioKind::LiquidezCorrente) {
            if lc < 1.0 {
                insights.push(insight(
                    InsightKind::Warning,
                    "Liquidez Baixa",
                    format!(
                        "Liquidez corrente de {:.2}: o ativo circulante não cobre as obrigações de curto prazo.",
                        lc
                    ),
                    "Renegociar prazos com fornecedores e reforçar o capital de giro.",
                ));
            }
            if lc > 3.0 {
                insights.push(insight(
                    InsightKind::Info,
                    "Excesso de Liquidez",
                    format!(
                        "Liquidez corrente de {:.2}: há recursos de curto prazo possivelmente ociosos.",
                        lc
                    ),
                    "Avaliar investimentos ou redução de dívidas onerosas com o caixa excedente.",
                ));
            }
        }

        if let Some(eg) = self.ratio(RatioKind::EndividamentoGeral) {
            if eg > 0.7 {
                insights.push(insight(
                    InsightKind::Warning,
                    "Alto Endividamento",
                    format!("{:.1}% do capital vem de terceiros.", eg * 100.0),
                    "Reduzir a alavancagem e alongar o perfil da dívida.",
                ));
            }
        }

        if let Some(roe) = self.ratio(RatioKind::RoePct) {
            if roe > 20.0 {
                insights.push(insight(
                    InsightKind::Positive,
                    "Alta Rentabilidade",
                    format!("ROE de {:.1}% indica ótimo retorno para os acionistas.", roe),
                    "Manter a estratégia e avaliar reinvestimento dos lucros.",
                ));
            }
            if roe < 5.0 {
                insights.push(insight(
                    InsightKind::Warning,
                    "Baixa Rentabilidade",
                    format!("ROE de {:.1}% está abaixo do custo de oportunidade.", roe),
                    "Revisar custos, preços e a eficiência no uso do capital próprio.",
                ));
            }
        }

        if let Some(ml) = self.ratio(RatioKind::MargemLiquidaPct) {
            if ml < 3.0 {
                insights.push(insight(
                    InsightKind::Warning,
                    "Margem Apertada",
                    format!("Margem líquida de {:.1}% deixa pouco espaço para imprevistos.", ml),
                    "Buscar redução de despesas e revisão da política de preços.",
                ));
            }
        }

        if let Some(revenue) = self.data.get(Field::ReceitaOperacionalLiquida) {
            insights.push(insight(
                InsightKind::Info,
                "Tamanho das Operações",
                format!(
                    "Receita operacional líquida de {} ({}).",
                    format_brl(revenue),
                    size_band(revenue)
                ),
                "Comparar os indicadores com empresas do mesmo porte e setor.",
            ));
        }

        insights
    }
}

pub fn generate_insights(ratios: &Ratios, data: &FinancialData) -> Vec<Insight> {
    InsightGenerator::new(ratios, data).generate()
}

/// Insights for an already built result, e.g. one reloaded from JSON.
pub fn generate(result: &AnalysisResult) -> Vec<Insight> {
    generate_insights(&result.ratios, &result.data)
}
