use chrono::NaiveDate;

/// Rendered for missing or non-numeric amounts.
pub const ZERO_REAIS: &str = "R$ 0,00";

/// Format a float with pt-BR separators and between `min_frac` and `max_frac`
/// fraction digits: 1.234.567,8
pub fn decimal_br(val: f64, min_frac: usize, max_frac: usize) -> String {
    let negative = val < 0.0;
    let fixed = format!("{:.*}", max_frac, val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut dec = dec_part.to_string();
    while dec.len() > min_frac && dec.ends_with('0') {
        dec.pop();
    }

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    let is_zero = int_part.chars().all(|c| c == '0') && dec.chars().all(|c| c == '0');
    let sign = if negative && !is_zero { "-" } else { "" };

    if dec.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{dec}")
    }
}

/// Currency with exactly two fraction digits: R$ 1.234,50
pub fn reais(val: f64) -> String {
    if !val.is_finite() {
        return ZERO_REAIS.to_string();
    }
    format!("R$ {}", decimal_br(val, 2, 2))
}

/// Currency with up to two fraction digits: R$ 1.234,5 / R$ 1.000
pub fn reais_flex(val: f64) -> String {
    if !val.is_finite() {
        return ZERO_REAIS.to_string();
    }
    format!("R$ {}", decimal_br(val, 0, 2))
}

/// Like [`reais_flex`], but a missing value renders as [`ZERO_REAIS`].
pub fn reais_or_zero(val: Option<f64>) -> String {
    match val {
        Some(v) => reais_flex(v),
        None => ZERO_REAIS.to_string(),
    }
}

/// Display a calendar date as dd/mm/yyyy.
pub fn br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Compact axis label: "R$ 250 mil", "R$ 1,5 mi".
///
/// The unit is picked after rounding: 999_999.0 is "R$ 1 mi", not "R$ 1.000 mil".
pub fn compact_reais(val: f64) -> String {
    let abs = val.abs();
    let thousands = (abs / 100.0).round() / 10.0;
    if thousands >= 1000.0 {
        format!("R$ {} mi", decimal_br(val / 1_000_000.0, 0, 1))
    } else if abs.round() >= 1000.0 {
        format!("R$ {} mil", decimal_br(val / 1000.0, 0, 1))
    } else {
        format!("R$ {}", decimal_br(val, 0, 0))
    }
}
