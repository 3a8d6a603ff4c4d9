use chrono::NaiveDate;

/// Parses a Brazilian-locale number (1.234.567,89 -> 1234567.89).
///
/// Every `.` is treated as a thousands separator and `,` as the decimal point.
/// Values wrapped in parentheses are accounting negatives: `(1.234,56)` -> -1234.56.
/// Returns `None` when the cleaned text is not a finite number.
pub fn parse_brazilian_decimal(s: &str) -> Option<f64> {
    let trimmed = s.trim();

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => (false, trimmed),
    };

    let cleaned = body.replace('.', "").replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }

    let value = cleaned.parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(if negative { -value } else { value })
}

/// Formats a monetary value the way Brazilian statements print it: `R$ 1.234.567,89`.
pub fn format_brl(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, frac_part)
}

/// Division that reports `0` instead of faulting on a zero denominator.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Parses a Brazilian date: DD/MM/YYYY, DD.MM.YYYY, DD-MM-YYYY or written out
/// as "15 de março de 2024".
pub fn parse_brazilian_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    ["%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_long_date(trimmed))
}

fn portuguese_month(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "janeiro" => 1,
        "fevereiro" => 2,
        "março" | "marco" => 3,
        "abril" => 4,
        "maio" => 5,
        "junho" => 6,
        "julho" => 7,
        "agosto" => 8,
        "setembro" => 9,
        "outubro" => 10,
        "novembro" => 11,
        "dezembro" => 12,
        _ => return None,
    };
    Some(month)
}

/// "15 de março de 2024"
fn parse_long_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let [day, de1, month, de2, year] = parts.as_slice() else {
        return None;
    };
    if !de1.eq_ignore_ascii_case("de") || !de2.eq_ignore_ascii_case("de") {
        return None;
    }

    NaiveDate::from_ymd_opt(
        year.parse().ok()?,
        portuguese_month(month)?,
        day.parse().ok()?,
    )
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
