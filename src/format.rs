use rust_decimal::{Decimal, RoundingStrategy};

use crate::feed::{parse_occurred_on, Direction};

const CURRENCY_SYMBOL: &str = "$";
const CURRENCY_DECIMALS: u32 = 2;

/// Shown in place of a missing date.
pub const MISSING_DATE: &str = "-";

fn group_int_digits(int_part: &str) -> String {
    // Insert commas every 3 digits, preserving any leading zeros.
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));

    let mut out = String::with_capacity(int_part.len() + 1 + dp as usize);
    out.push_str(int_part);
    out.push('.');

    let mut written = 0usize;
    for ch in frac_part.chars().take(dp as usize) {
        out.push(ch);
        written += 1;
    }
    while written < dp as usize {
        out.push('0');
        written += 1;
    }

    out
}

/// Format a magnitude as currency: `$1,234.50`.
///
/// Rounds half away from zero to two decimals. The sign is dropped; use
/// [`format_signed_amount`] when direction matters.
pub fn format_money(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(CURRENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    let padded = pad_fraction_to_dp(&rounded.normalize().to_string(), CURRENCY_DECIMALS);
    let (int_part, frac_part) = padded.split_once('.').unwrap_or((padded.as_str(), "00"));
    format!("{CURRENCY_SYMBOL}{}.{frac_part}", group_int_digits(int_part))
}

/// `-$75.43` for outgoing movements, `+$2,500.00` for incoming ones.
pub fn format_signed_amount(amount: Decimal, direction: Direction) -> String {
    let sign = match direction {
        Direction::Outgoing => '-',
        Direction::Incoming => '+',
    };
    format!("{sign}{}", format_money(amount))
}

/// Render a ledger date as `25 Oct 2025`, or return the raw text unchanged
/// when it cannot be parsed.
pub fn human_date(raw: &str) -> String {
    match parse_occurred_on(raw) {
        Ok(date) => date.format("%d %b %Y").to_string(),
        Err(_) if raw.trim().is_empty() => MISSING_DATE.to_string(),
        Err(_) => raw.to_string(),
    }
}
