//! Rounding rules for monetary amounts

use rust_decimal::{Decimal, RoundingStrategy};

/// Amounts below this magnitude are shown as zero
const DISPLAY_EPSILON: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Round to kopecks (2 dp), half away from zero
///
/// The result always carries scale 2, so `84` renders as `84.00`.
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Value prepared for display: near-zero noise becomes `0.00`, everything else 2 dp
pub fn for_display(value: Decimal) -> Decimal {
    if value.abs() < DISPLAY_EPSILON {
        round_half_up(Decimal::ZERO)
    } else {
        round_half_up(value)
    }
}

/// 2 dp string of an amount, as written to reports
pub fn format_amount(value: Decimal) -> String {
    for_display(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_midpoint() {
        assert_eq!(round_half_up(dec!(101.505)), dec!(101.51));
        assert_eq!(round_half_up(dec!(101.504999)), dec!(101.50));
        assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13));
    }

    #[test]
    fn test_rounded_scale_is_two() {
        assert_eq!(round_half_up(dec!(84)).to_string(), "84.00");
        assert_eq!(round_half_up(dec!(10084.0000)).to_string(), "10084.00");
    }

    #[test]
    fn test_display_normalizes_near_zero() {
        assert_eq!(format_amount(dec!(0.0049)), "0.00");
        assert_eq!(format_amount(dec!(-0.004)), "0.00");
        assert_eq!(format_amount(dec!(0.005)), "0.01");
        assert_eq!(format_amount(dec!(1234.5)), "1234.50");
    }
}
