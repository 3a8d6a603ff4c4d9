use crate::utils::{parse_brazilian_date, safe_divide};
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Primary line items read straight from the statement text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[schemars(description = "Total assets (Ativo Total / Total do Ativo)")]
    AtivoTotal,
    #[schemars(description = "Current assets (Ativo Circulante)")]
    AtivoCirculante,
    #[schemars(description = "Non-current assets (Ativo Não Circulante)")]
    AtivoNaoCirculante,
    #[schemars(description = "Cash and cash equivalents (Caixa e Equivalentes de Caixa)")]
    CaixaEquivalentes,
    #[schemars(description = "Trade receivables (Contas a Receber / Clientes)")]
    ContasReceber,
    #[schemars(description = "Inventories (Estoques)")]
    Estoques,
    #[schemars(description = "Total liabilities (Passivo Total / Total do Passivo)")]
    PassivoTotal,
    #[schemars(description = "Current liabilities (Passivo Circulante)")]
    PassivoCirculante,
    #[schemars(description = "Non-current liabilities (Passivo Não Circulante)")]
    PassivoNaoCirculante,
    #[schemars(description = "Loans and financing (Empréstimos e Financiamentos)")]
    EmprestimosFinanciamentos,
    #[schemars(description = "Trade payables (Fornecedores)")]
    Fornecedores,
    #[schemars(description = "Shareholders' equity (Patrimônio Líquido)")]
    PatrimonioLiquido,
    #[schemars(description = "Net operating revenue (Receita Operacional Líquida)")]
    ReceitaOperacionalLiquida,
    #[schemars(description = "Cost of goods or services sold (Custo das Vendas / CPV / CMV)")]
    CustoVendas,
    #[schemars(description = "Gross profit (Lucro Bruto / Resultado Bruto)")]
    LucroBruto,
    #[schemars(description = "Operating expenses (Despesas Operacionais)")]
    DespesasOperacionais,
    #[schemars(description = "Earnings before interest and taxes (EBIT / Lucro Operacional)")]
    Ebit,
    #[schemars(description = "EBIT before depreciation and amortization (EBITDA / LAJIDA)")]
    Ebitda,
    #[schemars(description = "Net financial result (Resultado Financeiro)")]
    ResultadoFinanceiro,
    #[schemars(description = "Net income (Lucro Líquido / Resultado Líquido)")]
    LucroLiquido,
}

impl Field {
    pub const ALL: [Field; 20] = [
        Field::AtivoTotal,
        Field::AtivoCirculante,
        Field::AtivoNaoCirculante,
        Field::CaixaEquivalentes,
        Field::ContasReceber,
        Field::Estoques,
        Field::PassivoTotal,
        Field::PassivoCirculante,
        Field::PassivoNaoCirculante,
        Field::EmprestimosFinanciamentos,
        Field::Fornecedores,
        Field::PatrimonioLiquido,
        Field::ReceitaOperacionalLiquida,
        Field::CustoVendas,
        Field::LucroBruto,
        Field::DespesasOperacionais,
        Field::Ebit,
        Field::Ebitda,
        Field::ResultadoFinanceiro,
        Field::LucroLiquido,
    ];

    /// Identifier used in serialized output, e.g. `ativo_total`.
    pub fn key(&self) -> &'static str {
        match self {
            Field::AtivoTotal => "ativo_total",
            Field::AtivoCirculante => "ativo_circulante",
            Field::AtivoNaoCirculante => "ativo_nao_circulante",
            Field::CaixaEquivalentes => "caixa_equivalentes",
            Field::ContasReceber => "contas_receber",
            Field::Estoques => "estoques",
            Field::PassivoTotal => "passivo_total",
            Field::PassivoCirculante => "passivo_circulante",
            Field::PassivoNaoCirculante => "passivo_nao_circulante",
            Field::EmprestimosFinanciamentos => "emprestimos_financiamentos",
            Field::Fornecedores => "fornecedores",
            Field::PatrimonioLiquido => "patrimonio_liquido",
            Field::ReceitaOperacionalLiquida => "receita_operacional_liquida",
            Field::CustoVendas => "custo_vendas",
            Field::LucroBruto => "lucro_bruto",
            Field::DespesasOperacionais => "despesas_operacionais",
            Field::Ebit => "ebit",
            Field::Ebitda => "ebitda",
            Field::ResultadoFinanceiro => "resultado_financeiro",
            Field::LucroLiquido => "lucro_liquido",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::AtivoTotal => "Ativo Total",
            Field::AtivoCirculante => "Ativo Circulante",
            Field::AtivoNaoCirculante => "Ativo Não Circulante",
            Field::CaixaEquivalentes => "Caixa e Equivalentes",
            Field::ContasReceber => "Contas a Receber",
            Field::Estoques => "Estoques",
            Field::PassivoTotal => "Passivo Total",
            Field::PassivoCirculante => "Passivo Circulante",
            Field::PassivoNaoCirculante => "Passivo Não Circulante",
            Field::EmprestimosFinanciamentos => "Empréstimos e Financiamentos",
            Field::Fornecedores => "Fornecedores",
            Field::PatrimonioLiquido => "Patrimônio Líquido",
            Field::ReceitaOperacionalLiquida => "Receita Operacional Líquida",
            Field::CustoVendas => "Custo das Vendas",
            Field::LucroBruto => "Lucro Bruto",
            Field::DespesasOperacionais => "Despesas Operacionais",
            Field::Ebit => "EBIT",
            Field::Ebitda => "EBITDA",
            Field::ResultadoFinanceiro => "Resultado Financeiro",
            Field::LucroLiquido => "Lucro Líquido",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ratios computed during extraction, straight from primary fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    LiquidezCorrente,
    PlSobreAtivo,
    MargemLiquida,
    MargemBruta,
    Roa,
    Roe,
}

impl DerivedField {
    /// Evaluation order.
    pub const ORDER: [DerivedField; 6] = [
        DerivedField::LiquidezCorrente,
        DerivedField::PlSobreAtivo,
        DerivedField::MargemLiquida,
        DerivedField::MargemBruta,
        DerivedField::Roa,
        DerivedField::Roe,
    ];

    /// (numerator, denominator)
    pub fn inputs(&self) -> (Field, Field) {
        match self {
            DerivedField::LiquidezCorrente => (Field::AtivoCirculante, Field::PassivoCirculante),
            DerivedField::PlSobreAtivo => (Field::PatrimonioLiquido, Field::AtivoTotal),
            DerivedField::MargemLiquida => (Field::LucroLiquido, Field::ReceitaOperacionalLiquida),
            DerivedField::MargemBruta => (Field::LucroBruto, Field::ReceitaOperacionalLiquida),
            DerivedField::Roa => (Field::Ebit, Field::AtivoTotal),
            DerivedField::Roe => (Field::LucroLiquido, Field::PatrimonioLiquido),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompanyInfo {
    #[schemars(description = "Company legal name (Razão Social / Empresa)")]
    pub company_name: Option<String>,

    #[schemars(description = "Brazilian company tax id, formatted as printed (00.000.000/0000-00)")]
    pub cnpj: Option<String>,

    #[schemars(description = "Reporting period as printed, e.g. 'Exercício 2023' or '31/12/2023'")]
    pub period: Option<String>,

    #[schemars(description = "Statement date as printed")]
    pub date: Option<String>,
}

impl CompanyInfo {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.cnpj.is_none()
            && self.period.is_none()
            && self.date.is_none()
    }

    /// Statement date as a calendar date. Accepts numeric (dd/mm/yyyy, dd.mm.yyyy)
    /// and written-out ("15 de março de 2024") forms.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_brazilian_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialData {
    /// Primary fields. A missing key means the field was not found, never zero.
    pub fields: BTreeMap<Field, f64>,

    /// Ratios derived from `fields`, present only when all inputs were present.
    pub derived: BTreeMap<DerivedField, f64>,
}

impl FinancialData {
    pub fn from_fields(fields: BTreeMap<Field, f64>) -> Self {
        let derived = compute_derived_fields(&fields);
        Self { fields, derived }
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.fields.get(&field).copied()
    }

    pub fn derived(&self, field: DerivedField) -> Option<f64> {
        self.derived.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Derived fields in their fixed evaluation order. A zero denominator yields `0`.
pub fn compute_derived_fields(fields: &BTreeMap<Field, f64>) -> BTreeMap<DerivedField, f64> {
    let mut derived = BTreeMap::new();

    for kind in DerivedField::ORDER {
        let (numerator, denominator) = kind.inputs();
        if let (Some(n), Some(d)) = (fields.get(&numerator), fields.get(&denominator)) {
            derived.insert(kind, safe_divide(*n, *d));
        }
    }

    derived
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    #[schemars(description = "1-based page number the table was found on")]
    pub page: u32,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Builds a table from a raw cell grid, treating the first row as the header.
    /// Returns `None` for grids with fewer than two rows.
    pub fn from_grid(page: u32, mut grid: Vec<Vec<String>>) -> Option<Self> {
        if grid.len() < 2 {
            return None;
        }
        let header = grid.remove(0);
        Some(Self {
            page,
            header,
            rows: grid,
        })
    }
}

/// Presentation-oriented indicators. Serialized by their display label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum RatioKind {
    #[serde(rename = "Liquidez Corrente")]
    LiquidezCorrente,
    #[serde(rename = "Liquidez Seca")]
    LiquidezSeca,
    #[serde(rename = "Endividamento Geral")]
    EndividamentoGeral,
    #[serde(rename = "Endividamento Total/Ativo")]
    EndividamentoTotalAtivo,
    #[serde(rename = "Giro do Ativo")]
    GiroDoAtivo,
    #[serde(rename = "PL/Ativo")]
    PlSobreAtivo,
    #[serde(rename = "ROE (%)")]
    RoePct,
    #[serde(rename = "ROA (%)")]
    RoaPct,
    #[serde(rename = "Margem Líquida (%)")]
    MargemLiquidaPct,
    #[serde(rename = "Margem Bruta (%)")]
    MargemBrutaPct,
}

impl RatioKind {
    pub const ALL: [RatioKind; 10] = [
        RatioKind::LiquidezCorrente,
        RatioKind::LiquidezSeca,
        RatioKind::EndividamentoGeral,
        RatioKind::EndividamentoTotalAtivo,
        RatioKind::GiroDoAtivo,
        RatioKind::PlSobreAtivo,
        RatioKind::RoePct,
        RatioKind::RoaPct,
        RatioKind::MargemLiquidaPct,
        RatioKind::MargemBrutaPct,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RatioKind::LiquidezCorrente => "Liquidez Corrente",
            RatioKind::LiquidezSeca => "Liquidez Seca",
            RatioKind::EndividamentoGeral => "Endividamento Geral",
            RatioKind::EndividamentoTotalAtivo => "Endividamento Total/Ativo",
            RatioKind::GiroDoAtivo => "Giro do Ativo",
            RatioKind::PlSobreAtivo => "PL/Ativo",
            RatioKind::RoePct => "ROE (%)",
            RatioKind::RoaPct => "ROA (%)",
            RatioKind::MargemLiquidaPct => "Margem Líquida (%)",
            RatioKind::MargemBrutaPct => "Margem Bruta (%)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for RatioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RatioValue {
    pub value: f64,

    #[schemars(
        description = "True when the denominator was exactly zero and the value was forced to 0. Distinguishes a guarded zero from a computed one."
    )]
    #[serde(default)]
    pub guarded: bool,
}

impl RatioValue {
    pub fn computed(value: f64) -> Self {
        Self {
            value,
            guarded: false,
        }
    }

    pub fn guarded() -> Self {
        Self {
            value: 0.0,
            guarded: true,
        }
    }
}

pub type Ratios = BTreeMap<RatioKind, RatioValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum HealthStatus {
    #[serde(rename = "BOM")]
    Good,
    #[serde(rename = "REGULAR")]
    Regular,
    #[serde(rename = "ATENÇÃO")]
    Warning,
}

impl HealthStatus {
    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Good => "BOM",
            HealthStatus::Regular => "REGULAR",
            HealthStatus::Warning => "ATENÇÃO",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentEntry {
    pub status: HealthStatus,
    pub value: f64,
    pub description: String,
}

pub type Assessment = BTreeMap<RatioKind, AssessmentEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum InsightKind {
    #[serde(rename = "ALERTA")]
    Warning,
    #[serde(rename = "INFO")]
    Info,
    #[serde(rename = "POSITIVO")]
    Positive,
}

impl InsightKind {
    pub fn label(&self) -> &'static str {
        match self {
            InsightKind::Warning => "ALERTA",
            InsightKind::Info => "INFO",
            InsightKind::Positive => "POSITIVO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    #[schemars(description = "The document extractor returned no text at all")]
    NoText,
    #[schemars(description = "Text was extracted but no financial field was recognized")]
    NoFinancialData,
    #[schemars(description = "At least one financial field was recognized")]
    Extracted,
}

impl ExtractionStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ExtractionStatus::NoText => "Não foi possível extrair texto do PDF.",
            ExtractionStatus::NoFinancialData => {
                "Não foram encontrados dados financeiros no PDF."
            }
            ExtractionStatus::Extracted => "Dados encontrados.",
        }
    }
}

/// Everything known about one processed document. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub filename: String,
    pub size_bytes: u64,
    pub processed_at: DateTime<Utc>,
    pub status: ExtractionStatus,

    #[schemars(description = "Bounded prefix of the extracted text, kept for display")]
    pub text_preview: String,

    pub company: CompanyInfo,
    pub data: FinancialData,
    pub tables: Vec<Table>,
    pub ratios: Ratios,
    pub assessment: Assessment,
    pub insights: Vec<Insight>,
}

impl AnalysisResult {
    pub fn ratio(&self, kind: RatioKind) -> Option<f64> {
        self.ratios.get(&kind).map(|r| r.value)
    }

    /// Asset / equity / liability bars. Missing values are shown as zero.
    pub fn composition(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Ativo Total", self.data.get(Field::AtivoTotal).unwrap_or(0.0)),
            (
                "Patrimônio",
                self.data.get(Field::PatrimonioLiquido).unwrap_or(0.0),
            ),
            ("Passivo", self.data.get(Field::PassivoTotal).unwrap_or(0.0)),
        ]
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisResult)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_fields_require_all_inputs() {
        let mut fields = BTreeMap::new();
        fields.insert(Field::LucroLiquido, 50.0);
        fields.insert(Field::PatrimonioLiquido, 500.0);

        let data = FinancialData::from_fields(fields);
        assert_eq!(data.derived(DerivedField::Roe), Some(0.1));
        assert_eq!(data.derived(DerivedField::MargemLiquida), None);
        assert_eq!(data.derived(DerivedField::PlSobreAtivo), None);
        assert_eq!(data.derived.len(), 1);
    }

    #[test]
    fn test_derived_fields_zero_denominator() {
        let mut fields = BTreeMap::new();
        fields.insert(Field::AtivoCirculante, 1000.0);
        fields.insert(Field::PassivoCirculante, 0.0);

        let data = FinancialData::from_fields(fields);
        assert_eq!(data.derived(DerivedField::LiquidezCorrente), Some(0.0));
    }

    #[test]
    fn test_table_from_grid() {
        let grid = vec![
            vec!["Conta".to_string(), "2023".to_string()],
            vec!["Ativo Total".to_string(), "1.000,00".to_string()],
        ];
        let table = Table::from_grid(1, grid).unwrap();
        assert_eq!(table.header, vec!["Conta", "2023"]);
        assert_eq!(table.rows.len(), 1);

        assert!(Table::from_grid(2, vec![vec!["only".to_string()]]).is_none());
    }

    #[test]
    fn test_ratio_kind_serializes_as_label() {
        let mut ratios = Ratios::new();
        ratios.insert(RatioKind::RoePct, RatioValue::computed(12.5));

        let json = serde_json::to_string(&ratios).unwrap();
        assert!(json.contains("\"ROE (%)\""));

        let back: Ratios = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ratios);
    }

    #[test]
    fn test_ratio_kind_from_label() {
        for kind in RatioKind::ALL {
            assert_eq!(RatioKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(RatioKind::from_label("EBITDA"), None);
    }

    #[test]
    fn test_company_reference_date() {
        let info = CompanyInfo {
            date: Some("31/12/2023".to_string()),
            ..Default::default()
        };
        assert_eq!(
            info.reference_date(),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
        assert!(!info.is_empty());
        assert!(CompanyInfo::default().is_empty());

        let info = CompanyInfo {
            date: Some("15 de março de 2024".to_string()),
            ..Default::default()
        };
        assert_eq!(info.reference_date(), NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = AnalysisResult::schema_as_json().unwrap();
        assert!(schema_json.contains("processed_at"));
        assert!(schema_json.contains("insights"));
        assert!(schema_json.contains("guarded"));
    }
}
