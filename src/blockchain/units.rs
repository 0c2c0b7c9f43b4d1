//! Conversions between wei and human-readable ETH amounts.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::U256;

/// Parse a decimal ETH amount ("0.01", "2") into wei.
///
/// Returns `None` for negative, malformed or over-precise input.
pub fn parse_eth(amount: &str) -> Option<U256> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') {
        return None;
    }
    parse_ether(amount).ok()
}

/// Decimal places of one ETH.
const ETH_DECIMALS: i64 = 18;

/// Parse a non-negative ETH amount in plain or exponent notation ("0.05",
/// "1e-7", "2.5E3") into wei.
///
/// Digits below one wei are truncated. Amounts too large for a `U256`
/// saturate to `U256::MAX`.
pub fn parse_eth_amount(amount: &str) -> Option<U256> {
    let amount = amount.trim();
    let amount = amount.strip_prefix('+').unwrap_or(amount);

    let (mantissa, exponent) = match amount.find(['e', 'E']) {
        Some(idx) => (&amount[..idx], amount[idx + 1..].parse::<i64>().ok()?),
        None => (amount, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    // value = digits * 10^shift wei
    let shift = exponent
        .saturating_add(ETH_DECIMALS)
        .saturating_sub(frac_part.len() as i64);
    let digit_count = int_part.len() + frac_part.len();
    let kept = if shift < 0 {
        digit_count.saturating_sub(shift.unsigned_abs() as usize)
    } else {
        digit_count
    };

    let ten = U256::from(10u8);
    let mut wei = int_part
        .bytes()
        .chain(frac_part.bytes())
        .take(kept)
        .fold(U256::ZERO, |acc, d| {
            acc.saturating_mul(ten).saturating_add(U256::from(d - b'0'))
        });

    // 78 multiplications by ten saturate any non-zero U256
    for _ in 0..shift.clamp(0, 78) {
        wei = wei.saturating_mul(ten);
    }
    Some(wei)
}

/// Format wei as ETH without trailing zeros ("0.998", "1.0").
pub fn format_eth(wei: U256) -> String {
    let formatted = format_ether(wei);
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Format wei as ETH rounded to six decimal places ("0.000000").
pub fn format_eth_fixed(wei: U256) -> String {
    let micro = U256::from(1_000_000_000_000u64);
    let million = U256::from(1_000_000u64);
    let micros = wei.saturating_add(micro / U256::from(2u8)) / micro;
    let fraction: u64 = (micros % million).to();
    format!("{}.{:06}", micros / million, fraction)
}

/// Wei as a floating point ETH value, for JSON number fields.
pub fn eth_f64(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETH: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_eth_amount_plain() {
        assert_eq!(parse_eth_amount("2"), Some(U256::from(2 * ONE_ETH)));
        assert_eq!(parse_eth_amount("0.05"), parse_eth("0.05"));
        assert_eq!(parse_eth_amount(".5"), parse_eth("0.5"));
        assert_eq!(parse_eth_amount("3."), parse_eth("3"));
        assert_eq!(parse_eth_amount("0"), Some(U256::ZERO));
    }

    #[test]
    fn test_parse_eth_amount_exponent() {
        // 1e-7 ETH is 1e11 wei
        assert_eq!(parse_eth_amount("1e-7"), Some(U256::from(100_000_000_000u64)));
        assert_eq!(parse_eth_amount("1e3"), Some(U256::from(1000 * ONE_ETH)));
        assert_eq!(parse_eth_amount("2.5E+3"), Some(U256::from(2500 * ONE_ETH)));
        assert_eq!(
            parse_eth_amount("1e17"),
            Some(U256::from(ONE_ETH) * U256::from(100_000_000_000_000_000u64))
        );
    }

    #[test]
    fn test_parse_eth_amount_limits() {
        // Below one wei truncates
        assert_eq!(parse_eth_amount("1e-19"), Some(U256::ZERO));
        assert_eq!(parse_eth_amount("0.0000000000000000015"), Some(U256::from(1u8)));
        // Too large saturates
        assert_eq!(parse_eth_amount("1e400"), Some(U256::MAX));
        assert_eq!(parse_eth_amount("0e400"), Some(U256::ZERO));
    }

    #[test]
    fn test_parse_eth_amount_rejects_garbage() {
        for text in ["", ".", "abc", "1e", "e5", "1.2.3", "-1", "NaN", "inf", "0x10"] {
            assert_eq!(parse_eth_amount(text), None, "{text}");
        }
    }

    #[test]
    fn test_parse_eth() {
        assert_eq!(parse_eth("0.01"), Some(U256::from(ONE_ETH / 100)));
        assert_eq!(parse_eth(" 2 "), Some(U256::from(2 * ONE_ETH)));
        assert_eq!(parse_eth("abc"), None);
        assert_eq!(parse_eth("-1"), None);
        assert_eq!(parse_eth(""), None);
    }

    #[test]
    fn test_format_eth_trims() {
        assert_eq!(format_eth(U256::from(ONE_ETH)), "1.0");
        assert_eq!(format_eth(U256::from(998 * ONE_ETH / 1000)), "0.998");
        assert_eq!(format_eth(U256::from(2 * ONE_ETH / 1000)), "0.002");
        assert_eq!(format_eth(U256::ZERO), "0.0");
    }

    #[test]
    fn test_format_eth_fixed() {
        assert_eq!(format_eth_fixed(U256::ZERO), "0.000000");
        assert_eq!(format_eth_fixed(U256::from(ONE_ETH)), "1.000000");
        assert_eq!(format_eth_fixed(U256::from(1_234_567_890_000_000_000u128)), "1.234568");
        assert_eq!(format_eth_fixed(U256::from(499_999_999_999u64)), "0.000000");
        assert_eq!(format_eth_fixed(U256::from(500_000_000_000u64)), "0.000001");
    }

    #[test]
    fn test_eth_f64() {
        assert_eq!(eth_f64(U256::from(ONE_ETH / 1000)), 0.001);
        assert_eq!(eth_f64(U256::from(998 * ONE_ETH / 1000)), 0.998);
        assert_eq!(eth_f64(U256::from(5 * ONE_ETH / 100)), 0.05);
    }
}
