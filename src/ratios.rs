use crate::schema::{DerivedField, FinancialData, Field, RatioKind, RatioValue, Ratios};
use log::debug;

/// Divides with the zero-denominator guard made visible on the result.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> RatioValue {
    if denominator == 0.0 {
        RatioValue::guarded()
    } else {
        RatioValue::computed(numerator / denominator)
    }
}

pub struct RatioEngine<'a> {
    data: &'a FinancialData,
}

impl<'a> RatioEngine<'a> {
    pub fn new(data: &'a FinancialData) -> Self {
        Self { data }
    }

    fn field(&self, field: Field) -> Option<f64> {
        self.data.get(field)
    }

    /// Recomputes a derived ratio from its inputs so the guard flag survives.
    fn derived(&self, kind: DerivedField) -> Option<RatioValue> {
        self.data.derived(kind)?;
        let (numerator, denominator) = kind.inputs();
        Some(guarded_ratio(
            self.field(numerator)?,
            self.field(denominator)?,
        ))
    }

    fn percent(&self, kind: DerivedField) -> Option<RatioValue> {
        self.derived(kind).map(|r| RatioValue {
            value: r.value * 100.0,
            guarded: r.guarded,
        })
    }

    fn liquidez_seca(&self) -> Option<RatioValue> {
        let ativo_circulante = self.field(Field::AtivoCirculante)?;
        let passivo_circulante = self.field(Field::PassivoCirculante)?;
        let estoques = self.field(Field::Estoques).unwrap_or(0.0);
        Some(guarded_ratio(ativo_circulante - estoques, passivo_circulante))
    }

    fn endividamento_geral(&self) -> Option<RatioValue> {
        let passivo = self.field(Field::PassivoTotal)?;
        let patrimonio = self.field(Field::PatrimonioLiquido)?;
        Some(guarded_ratio(passivo, passivo + patrimonio))
    }

    fn endividamento_total_ativo(&self) -> Option<RatioValue> {
        let passivo = self.field(Field::PassivoTotal)?;
        let ativo = self.field(Field::AtivoTotal)?;
        Some(guarded_ratio(passivo, ativo))
    }

    fn giro_do_ativo(&self) -> Option<RatioValue> {
        let receita = self.field(Field::ReceitaOperacionalLiquida)?;
        let ativo = self.field(Field::AtivoTotal)?;
        Some(guarded_ratio(receita, ativo))
    }

    fn compute(&self, kind: RatioKind) -> Option<RatioValue> {
        match kind {
            RatioKind::LiquidezCorrente => self.derived(DerivedField::LiquidezCorrente),
            RatioKind::LiquidezSeca => self.liquidez_seca(),
            RatioKind::EndividamentoGeral => self.endividamento_geral(),
            RatioKind::EndividamentoTotalAtivo => self.endividamento_total_ativo(),
            RatioKind::GiroDoAtivo => self.giro_do_ativo(),
            RatioKind::PlSobreAtivo => self.derived(DerivedField::PlSobreAtivo),
            RatioKind::RoePct => self.percent(DerivedField::Roe),
            RatioKind::RoaPct => self.percent(DerivedField::Roa),
            RatioKind::MargemLiquidaPct => self.percent(DerivedField::MargemLiquida),
            RatioKind::MargemBrutaPct => self.percent(DerivedField::MargemBruta),
        }
    }

    /// Every ratio whose inputs are all present. No imputation.
    pub fn compute_all(&self) -> Ratios {
        let mut ratios = Ratios::new();

        for kind in RatioKind::ALL {
            if let Some(value) = self.compute(kind) {
                if value.guarded {
                    debug!("{}: zero denominator, reported as 0", kind);
                }
                ratios.insert(kind, value);
            }
        }

        ratios
    }
}

pub fn compute_ratios(data: &FinancialData) -> Ratios {
    RatioEngine::new(data).compute_all()
}
