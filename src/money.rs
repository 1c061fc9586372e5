//! Money and rate display formatting.
//!
//! French convention: space-grouped thousands, comma decimal separator,
//! currency label as suffix. The pricing engine only ever produces
//! numbers; every user-facing amount and rate goes through here. The
//! label comes from `[document] currency_label` in config.toml.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// The CFA franc is pegged to the euro at a fixed parity.
pub const XAF_PER_EUR: Decimal = dec!(655.957);

/// Round to centimes, half away from zero. Applied when an engine result
/// leaves the crate (state file, display), never inside the engine.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format with two decimals: "12 500,00 FCFA".
pub fn format_money(amount: Decimal, label: &str) -> String {
    let rounded = round_money(amount);
    let text = format!("{rounded:.2}");
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{},{} {label}", group_thousands(whole), frac)
}

/// Format rounded to whole units: "12 500 FCFA". Used in tables where
/// centimes are noise.
pub fn format_whole_money(amount: Decimal, label: &str) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    format!("{} {label}", group_thousands(&rounded.to_string()))
}

/// Percent for display: "19,25%", trailing zeros stripped, "—" for zero.
/// Shared by the PDF lines and the terminal catalog listing.
pub fn format_percent(rate: Decimal) -> String {
    if rate.is_zero() {
        return "—".to_string();
    }
    format!("{}%", rate.normalize().to_string().replace('.', ","))
}

fn group_thousands(whole: &str) -> String {
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }

    let grouped: String = out.chars().rev().collect();
    format!("{sign}{grouped}")
}
