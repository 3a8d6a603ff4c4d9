//! Regex-driven field extraction from raw statement text.
//!
//! Each field owns an ordered list of patterns. Patterns are tried in order and
//! only the first occurrence of each pattern in the document is considered, so
//! on statements that print prior-year comparatives next to current figures the
//! first number after the label wins. This is a known source of extraction
//! error and is kept as documented behavior.

use crate::error::{AnalysisError, Result};
use crate::schema::{CompanyInfo, FinancialData, Field};
use crate::utils::parse_brazilian_decimal;
use log::{debug, info, trace};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Separator between a label and its value: whitespace, colons, an optional `R$`.
const SEP: &str = r"[\s:]*(?:R\$)?\s*";

/// A number ending on a digit, optionally negative or wrapped in parentheses.
const VALUE: &str = r"(\(\s*\d(?:[\d.,]*\d)?\s*\)|-?\d(?:[\d.,]*\d)?)";

fn label_patterns(labels: &[&str]) -> Vec<String> {
    labels
        .iter()
        .map(|label| format!(r"(?i)(?:{}){}{}", label, SEP, VALUE))
        .collect()
}

fn builtin_field_labels(field: Field) -> &'static [&'static str] {
    match field {
        Field::AtivoTotal => &[r"ATIVO\s*TOTAL|TOTAL\s*DO\s*ATIVO"],
        Field::AtivoCirculante => &[r"ATIVO\s*CIRCULANTE"],
        Field::AtivoNaoCirculante => &[r"ATIVO\s*N[ÃA]O\s*CIRCULANTE", r"ATIVO\s*PERMANENTE"],
        Field::CaixaEquivalentes => &[
            r"CAIXA\s*E\s*EQUIVALENTES\s*DE\s*CAIXA",
            r"CAIXA\s*E\s*EQUIVALENTES",
            r"DISPONIBILIDADES",
        ],
        Field::ContasReceber => &[r"CONTAS\s*A\s*RECEBER(?:\s*DE\s*CLIENTES)?", r"\bCLIENTES\b"],
        Field::Estoques => &[r"\bESTOQUES?\b"],
        Field::PassivoTotal => &[r"PASSIVO\s*TOTAL|TOTAL\s*DO\s*PASSIVO"],
        Field::PassivoCirculante => &[r"PASSIVO\s*CIRCULANTE"],
        Field::PassivoNaoCirculante => &[
            r"PASSIVO\s*N[ÃA]O\s*CIRCULANTE",
            r"EXIG[ÍI]VEL\s*A\s*LONGO\s*PRAZO",
        ],
        Field::EmprestimosFinanciamentos => &[
            r"EMPR[ÉE]STIMOS\s*E\s*FINANCIAMENTOS",
            r"\bFINANCIAMENTOS\b",
        ],
        Field::Fornecedores => &[r"\bFORNECEDORES\b"],
        Field::PatrimonioLiquido => &[r"PATRIM[ÔO]NIO\s*L[ÍI]QUIDO|\bPL\b"],
        Field::ReceitaOperacionalLiquida => &[
            r"RECEITA\s*OPERACIONAL\s*L[ÍI]QUIDA",
            r"RECEITA\s*L[ÍI]QUIDA(?:\s*DE\s*VENDAS)?(?:\s*E\s*SERVI[ÇC]OS)?|RECEITA\s*OPERACIONAL",
        ],
        Field::CustoVendas => &[
            r"CUSTOS?\s*D[AO]S?\s*(?:VENDAS|MERCADORIAS\s*VENDIDAS|PRODUTOS\s*VENDIDOS|SERVI[ÇC]OS\s*PRESTADOS)",
            r"\bCPV\b|\bCMV\b",
        ],
        Field::LucroBruto => &[r"LUCRO\s*BRUTO|RESULTADO\s*BRUTO"],
        Field::DespesasOperacionais => &[r"DESPESAS\s*OPERACIONAIS"],
        Field::Ebit => &[
            r"\bEBIT\b",
            r"\bLAJIR\b",
            r"LUCRO\s*OPERACIONAL|RESULTADO\s*OPERACIONAL",
        ],
        Field::Ebitda => &[r"\bEBITDA\b", r"\bLAJIDA\b"],
        Field::ResultadoFinanceiro => &[r"RESULTADO\s*FINANCEIRO"],
        Field::LucroLiquido => &[
            r"LUCRO\s*L[ÍI]QUIDO|RESULTADO\s*L[ÍI]QUIDO",
            r"(?:LUCRO|RESULTADO)\s*L[ÍI]QUIDO\s*DO\s*(?:EXERC[ÍI]CIO|PER[ÍI]ODO)",
        ],
    }
}

static FIELD_PATTERNS: LazyLock<Vec<(Field, Vec<Regex>)>> = LazyLock::new(|| {
    Field::ALL
        .iter()
        .map(|field| {
            let regexes = label_patterns(builtin_field_labels(*field))
                .iter()
                .map(|p| Regex::new(p).expect("valid built-in field regex"))
                .collect();
            (*field, regexes)
        })
        .collect()
});

static COMPANY_NAME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?imR)^[ \t]*(?:RAZ[ÃA]O\s+SOCIAL|DENOMINA[ÇC][ÃA]O\s+SOCIAL|EMPRESA|COMPANHIA|ENTIDADE)[ \t]*[:\-][ \t]*([^\r\n]+?)[ \t]*$",
        r"(?mR)^[ \t]*([A-ZÀ-Ý0-9][A-ZÀ-Ý0-9&.,'\- ]*?\b(?:S\.?\s?/?\s?A\.?|LTDA\.?|EIRELI))[ \t]*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid company name regex"))
    .collect()
});

static CNPJ_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)CNPJ(?:/MF)?[\s:nº°.]*(\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2})",
        r"\b(\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid cnpj regex"))
    .collect()
});

static PERIOD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(EXERC[ÍI]CIOS?\s+(?:SOCIAIS?\s+)?(?:FINDOS?|ENCERRADOS?)\s+EM\s+\d{2}/\d{2}/\d{4})",
        r"(?i)PER[ÍI]ODO\s*:?\s*(\d{2}/\d{2}/\d{4}\s*(?:A|AT[ÉE]|-)\s*\d{2}/\d{2}/\d{4})",
        r"(?i)(\d[ºo°]?\s*TRIMESTRE\s+(?:DE\s+)?\d{4})",
        r"(?i)(EXERC[ÍI]CIO\s+(?:DE\s+)?\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid period regex"))
    .collect()
});

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:DATA|EM)\s*:?\s*(\d{2}/\d{2}/\d{4})",
        r"\b(\d{2}/\d{2}/\d{4})\b",
        r"(?i)\b(\d{1,2}\s+DE\s+(?:JANEIRO|FEVEREIRO|MAR[ÇC]O|ABRIL|MAIO|JUNHO|JULHO|AGOSTO|SETEMBRO|OUTUBRO|NOVEMBRO|DEZEMBRO)\s+DE\s+\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid date regex"))
    .collect()
});

/// First capture of the first pattern that matches, trimmed.
fn first_text_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

pub fn extract_company_info(text: &str) -> CompanyInfo {
    CompanyInfo {
        company_name: first_text_match(&COMPANY_NAME_PATTERNS, text),
        cnpj: first_text_match(&CNPJ_PATTERNS, text),
        period: first_text_match(&PERIOD_PATTERNS, text),
        date: first_text_match(&DATE_PATTERNS, text),
    }
}

struct FieldMatcher {
    field: Field,
    patterns: Vec<Regex>,
}

impl FieldMatcher {
    /// Tries each pattern in order; a match whose value does not parse counts as a miss.
    fn find(&self, text: &str) -> Option<f64> {
        for (idx, re) in self.patterns.iter().enumerate() {
            let Some(raw) = re.captures(text).and_then(|caps| caps.get(1)) else {
                continue;
            };

            match parse_brazilian_decimal(raw.as_str()) {
                Some(value) => {
                    debug!(
                        "{} = {} (pattern #{}, text '{}')",
                        self.field,
                        value,
                        idx,
                        raw.as_str()
                    );
                    return Some(value);
                }
                None => {
                    trace!(
                        "{}: pattern #{} matched unparseable value '{}'",
                        self.field,
                        idx,
                        raw.as_str()
                    );
                }
            }
        }

        trace!("{}: no pattern matched", self.field);
        None
    }
}

pub struct FieldExtractor {
    matchers: Vec<FieldMatcher>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        let matchers = FIELD_PATTERNS
            .iter()
            .map(|(field, patterns)| FieldMatcher {
                field: *field,
                patterns: patterns.clone(),
            })
            .collect();
        Self { matchers }
    }

    /// Built-in patterns followed by `extra` patterns for the same field.
    /// Extra patterns are compiled case-insensitive and must capture the value in group 1.
    pub fn with_extra_patterns(extra: &BTreeMap<Field, Vec<String>>) -> Result<Self> {
        let mut extractor = Self::new();

        for (field, patterns) in extra {
            let Some(matcher) = extractor.matchers.iter_mut().find(|m| m.field == *field) else {
                continue;
            };

            for pattern in patterns {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| AnalysisError::InvalidPattern {
                        field: field.key().to_string(),
                        pattern: pattern.clone(),
                        source,
                    })?;

                if re.captures_len() < 2 {
                    return Err(AnalysisError::InvalidConfig(format!(
                        "extra pattern '{}' for field {} has no capture group for the value",
                        pattern, field
                    )));
                }

                matcher.patterns.push(re);
            }
        }

        Ok(extractor)
    }

    pub fn extract_fields(&self, text: &str) -> BTreeMap<Field, f64> {
        self.matchers
            .iter()
            .filter_map(|m| m.find(text).map(|value| (m.field, value)))
            .collect()
    }

    pub fn extract(&self, text: &str) -> (CompanyInfo, FinancialData) {
        let company = extract_company_info(text);
        let data = FinancialData::from_fields(self.extract_fields(text));

        info!(
            "Extracted {} fields and {} derived ratios from {} chars of text",
            data.fields.len(),
            data.derived.len(),
            text.len()
        );

        (company, data)
    }
}

pub fn extract(text: &str) -> (CompanyInfo, FinancialData) {
    FieldExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DerivedField;

    #[test]
    fn test_scenario_three_fields() {
        let text = "BALANÇO PATRIMONIAL\n\
                    ATIVO TOTAL R$ 1.000.000,00\n\
                    PASSIVO TOTAL R$ 400.000,00\n\
                    PATRIMÔNIO LÍQUIDO R$ 600.000,00\n";

        let (_, data) = extract(text);
        assert_eq!(data.fields.len(), 3);
        assert_eq!(data.get(Field::AtivoTotal), Some(1_000_000.0));
        assert_eq!(data.get(Field::PassivoTotal), Some(400_000.0));
        assert_eq!(data.get(Field::PatrimonioLiquido), Some(600_000.0));
        assert_eq!(data.derived(DerivedField::PlSobreAtivo), Some(0.6));
        assert_eq!(data.derived.len(), 1);
    }

    #[test]
    fn test_no_labels_yields_empty() {
        let (company, data) = extract("Relatório da administração sem números relevantes.");
        assert!(data.fields.is_empty());
        assert!(data.derived.is_empty());
        assert_eq!(company.cnpj, None);
    }

    #[test]
    fn test_alternative_labels_from_legacy_layout() {
        let text = "TOTAL DO ATIVO: 2.500,00\n\
                    TOTAL DO PASSIVO: 1.000,00\n\
                    PL: 1.500,00\n\
                    RECEITA LÍQUIDA 10.000,00\n\
                    RESULTADO LÍQUIDO 800,00\n";

        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::AtivoTotal], 2500.0);
        assert_eq!(fields[&Field::PassivoTotal], 1000.0);
        assert_eq!(fields[&Field::PatrimonioLiquido], 1500.0);
        assert_eq!(fields[&Field::ReceitaOperacionalLiquida], 10000.0);
        assert_eq!(fields[&Field::LucroLiquido], 800.0);
    }

    #[test]
    fn test_case_insensitive_and_unaccented() {
        let text = "patrimonio liquido 321,00\nativo circulante: r$ 10,5";
        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::PatrimonioLiquido], 321.0);
        assert_eq!(fields[&Field::AtivoCirculante], 10.5);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let text = "ATIVO TOTAL 2.000,00 1.500,00\nATIVO TOTAL 9.999,00";
        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::AtivoTotal], 2000.0);
    }

    #[test]
    fn test_ebit_does_not_capture_ebitda() {
        let text = "EBITDA 5.000,00\nEBIT 3.000,00";
        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::Ebitda], 5000.0);
        assert_eq!(fields[&Field::Ebit], 3000.0);
    }

    #[test]
    fn test_current_and_non_current_are_distinct() {
        let text = "ATIVO NÃO CIRCULANTE 700,00\nATIVO CIRCULANTE 300,00\n\
                    PASSIVO NÃO CIRCULANTE 200,00\nPASSIVO CIRCULANTE 150,00";
        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::AtivoNaoCirculante], 700.0);
        assert_eq!(fields[&Field::AtivoCirculante], 300.0);
        assert_eq!(fields[&Field::PassivoNaoCirculante], 200.0);
        assert_eq!(fields[&Field::PassivoCirculante], 150.0);
    }

    #[test]
    fn test_parenthesized_values_are_negative() {
        let text = "CUSTO DAS VENDAS (4.200,00)\nRESULTADO FINANCEIRO -150,00";
        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::CustoVendas], -4200.0);
        assert_eq!(fields[&Field::ResultadoFinanceiro], -150.0);
    }

    #[test]
    fn test_unparseable_value_is_absent_not_zero() {
        let text = "ATIVO TOTAL 1,2,3";
        let fields = FieldExtractor::new().extract_fields(text);
        assert!(!fields.contains_key(&Field::AtivoTotal));
    }

    #[test]
    fn test_unparseable_value_falls_through_to_next_pattern() {
        let text = "EBIT 1,2,3\nLAJIR 500,00";
        let fields = FieldExtractor::new().extract_fields(text);
        assert_eq!(fields[&Field::Ebit], 500.0);
    }

    #[test]
    fn test_label_without_value_is_absent() {
        let text = "TOTAL DO PASSIVO E PATRIMÔNIO LÍQUIDO";
        let fields = FieldExtractor::new().extract_fields(text);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_extra_patterns_are_tried_after_builtins() {
        let mut extra = BTreeMap::new();
        extra.insert(
            Field::Ebitda,
            vec![r"EBITDA\s+AJUSTADO\s+([\d.,]+)".to_string()],
        );
        extra.insert(
            Field::Ebit,
            vec![r"resultado\s+antes\s+dos\s+juros\s+([\d.,]+)".to_string()],
        );

        let extractor = FieldExtractor::with_extra_patterns(&extra).unwrap();

        let fields = extractor.extract_fields("RESULTADO ANTES DOS JUROS 42,00");
        assert_eq!(fields[&Field::Ebit], 42.0);

        let fields = extractor.extract_fields("EBITDA 10,00\nEBITDA AJUSTADO 12,00");
        assert_eq!(fields[&Field::Ebitda], 10.0);
    }

    #[test]
    fn test_invalid_extra_pattern() {
        let mut extra = BTreeMap::new();
        extra.insert(Field::Ebit, vec![r"EBIT ([\d.,+".to_string()]);
        assert!(matches!(
            FieldExtractor::with_extra_patterns(&extra),
            Err(AnalysisError::InvalidPattern { .. })
        ));

        let mut extra = BTreeMap::new();
        extra.insert(Field::Ebit, vec![r"EBIT \d+".to_string()]);
        assert!(matches!(
            FieldExtractor::with_extra_patterns(&extra),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_company_info() {
        let text = "RAZÃO SOCIAL: Indústria Exemplo S.A.\n\
                    CNPJ: 12.345.678/0001-90\n\
                    Demonstrações financeiras do exercício findo em 31/12/2023\n\
                    São Paulo, 15 de março de 2024\n";

        let info = extract_company_info(text);
        assert_eq!(info.company_name.as_deref(), Some("Indústria Exemplo S.A."));
        assert_eq!(info.cnpj.as_deref(), Some("12.345.678/0001-90"));
        assert_eq!(info.period.as_deref(), Some("exercício findo em 31/12/2023"));
        assert_eq!(info.date.as_deref(), Some("31/12/2023"));
    }

    #[test]
    fn test_company_name_from_legal_suffix_line() {
        let text = "BALANÇO PATRIMONIAL\nCOMERCIAL BOA VISTA LTDA\nATIVO TOTAL 10,00";
        let info = extract_company_info(text);
        assert_eq!(info.company_name.as_deref(), Some("COMERCIAL BOA VISTA LTDA"));
    }

    #[test]
    fn test_company_name_with_crlf_line_endings() {
        let text = "COMERCIAL BOA VISTA LTDA\r\nCNPJ: 12.345.678/0001-90\r\nATIVO TOTAL 10,00\r\n";
        let info = extract_company_info(text);
        assert_eq!(info.company_name.as_deref(), Some("COMERCIAL BOA VISTA LTDA"));
        assert_eq!(info.cnpj.as_deref(), Some("12.345.678/0001-90"));

        let text = "Razão Social: Indústria Exemplo S.A.\r\nATIVO TOTAL 10,00\r\n";
        let info = extract_company_info(text);
        assert_eq!(info.company_name.as_deref(), Some("Indústria Exemplo S.A."));
    }

    #[test]
    fn test_missing_company_info_is_none() {
        let info = extract_company_info("ATIVO TOTAL 10,00");
        assert!(info.is_empty());
    }
}
