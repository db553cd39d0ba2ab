//! Display formatting in Colombian conventions

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Colombian peso amount: `$ 1.234.567,5`.
///
/// `.` groups thousands, `,` separates decimals, at most two decimals are
/// shown and trailing zeros are dropped.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let plain = rounded.abs().to_string();
    let (integer, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    match fraction {
        Some(fraction) => format!("{}$ {},{}", sign, grouped, fraction),
        None => format!("{}$ {}", sign, grouped),
    }
}

/// `DD/MM/YYYY`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `DD/MM/YYYY HH:MM`, 24-hour clock
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y %H:%M").to_string()
}

/// Pick the singular form for exactly one item
pub fn pluralize(count: u64, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn currency_uses_cop_separators() {
        assert_eq!(format_currency(dec("150000")), "$ 150.000");
        assert_eq!(format_currency(dec("150000.99")), "$ 150.000,99");
        assert_eq!(format_currency(dec("150000.5")), "$ 150.000,5");
        assert_eq!(format_currency(dec("150000.00")), "$ 150.000");
        assert_eq!(format_currency(dec("1500")), "$ 1.500");
        assert_eq!(format_currency(dec("1234567")), "$ 1.234.567");
        assert_eq!(format_currency(dec("1000.50")), "$ 1.000,5");
        assert_eq!(format_currency(dec("999")), "$ 999");
        assert_eq!(format_currency(Decimal::ZERO), "$ 0");
    }

    #[test]
    fn currency_rounds_to_cents() {
        assert_eq!(format_currency(dec("10.005")), "$ 10,01");
        assert_eq!(format_currency(dec("-2500.1")), "-$ 2.500,1");
    }

    #[test]
    fn dates() {
        let date = Utc.with_ymd_and_hms(2025, 8, 21, 15, 30, 0).unwrap();
        assert_eq!(format_date(&date), "21/08/2025");
        assert_eq!(format_date_time(&date), "21/08/2025 15:30");
    }

    #[test]
    fn plural_switches_at_one() {
        assert_eq!(pluralize(1, "variante", "variantes"), "variante");
        assert_eq!(pluralize(0, "variante", "variantes"), "variantes");
        assert_eq!(pluralize(7, "variante", "variantes"), "variantes");
    }
}
