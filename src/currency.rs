//! Money and count formatting, only ever used when presenting a report.
//! Amounts are shown in Brazilian reais with comma thousands and two decimals.

use rust_decimal::Decimal;

const CURRENCY_SYMBOL: &str = "R$";

/// `R$ 1,234,567.89`
pub fn format_currency(value: Decimal) -> String {
    format!("{} {}", CURRENCY_SYMBOL, format_amount(value))
}

/// `R$1,234,567.89`, for places where space is scarce
pub fn format_compact_currency(value: Decimal) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_amount(value))
}

/// `1,234`
pub fn format_units(value: i64) -> String {
    let digits = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// `1,234,567.89` with the amount rounded to cents
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(integer), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
