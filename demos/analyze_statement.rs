use balance_sheet_analyzer::*;

const SAMPLE: &str = "\
COMERCIAL HORIZONTE LTDA
CNPJ: 98.765.432/0001-10
Demonstrações contábeis do exercício encerrado em 31/12/2023

ATIVO CIRCULANTE 850.000,00
Estoques 300.000,00
ATIVO TOTAL 1.900.000,00
PASSIVO CIRCULANTE 920.000,00
PASSIVO TOTAL 1.450.000,00
PATRIMÔNIO LÍQUIDO 450.000,00
RECEITA LÍQUIDA 3.100.000,00
LUCRO BRUTO 930.000,00
EBIT 160.000,00
LUCRO LÍQUIDO 62.000,00
";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (filename, bytes) = match std::env::args().nth(1) {
        Some(path) => (path.clone(), std::fs::read(&path)?),
        None => ("sample.txt".to_string(), SAMPLE.as_bytes().to_vec()),
    };

    let document = UploadedDocument::new(filename, bytes);
    let analyzer = FinancialAnalyzer::default();
    let result = analyzer.analyze_document(&document, &PlainTextExtractor);

    println!("{} ({} bytes)", result.filename, result.size_bytes);
    println!("{}", result.status.message());

    if let Some(name) = &result.company.company_name {
        println!("Empresa: {}", name);
    }
    if let Some(cnpj) = &result.company.cnpj {
        println!("CNPJ: {}", cnpj);
    }

    println!("\nDados financeiros:");
    for (field, value) in &result.data.fields {
        println!("  {:<30} {}", field.label(), format_brl(*value));
    }

    println!("\nIndicadores:");
    for (kind, entry) in &result.assessment {
        println!(
            "  {:<28} {:>10.2}  {:<8} {}",
            kind.label(),
            entry.value,
            entry.status.label(),
            entry.description
        );
    }

    println!("\nInsights:");
    for insight in &result.insights {
        println!("  [{}] {}: {}", insight.kind.label(), insight.title, insight.description);
        println!("      -> {}", insight.recommendation);
    }

    Ok(())
}
