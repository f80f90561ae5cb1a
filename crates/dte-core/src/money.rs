//! # Pesos — Integer Chilean Currency
//!
//! All document amounts are whole Chilean pesos. `Pesos` wraps an `i64` and
//! exposes only the arithmetic the tax calculator needs, with `i128`
//! intermediates so multiplication and percentage splits cannot overflow.
//!
//! ## Invariant
//!
//! Amounts are never floats. The only floating-point boundary in the stack
//! is line quantity × unit price, which is rounded half away from zero into
//! a `Pesos` immediately and never leaves that single call site.

use serde::{Deserialize, Serialize};

/// A whole-peso amount. Negative values are permitted (report aggregation
/// accumulates credit notes with a negating sign); document line amounts
/// are validated as positive where they are produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pesos(pub i64);

impl Pesos {
    /// Zero pesos.
    pub const ZERO: Pesos = Pesos(0);

    /// The raw integer amount.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Saturating-free checked addition.
    pub fn checked_add(self, other: Pesos) -> Option<Pesos> {
        self.0.checked_add(other.0).map(Pesos)
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Pesos) -> Option<Pesos> {
        self.0.checked_sub(other.0).map(Pesos)
    }

    /// Net portion of a tax-inclusive amount: `floor(amount * 100 / (100 + rate))`.
    ///
    /// Defined for non-negative amounts; the floor matches the statutory
    /// rule that the net is rounded down and the tax carries the remainder.
    pub fn net_of_tax(self, rate_percent: u32) -> Pesos {
        debug_assert!(self.0 >= 0);
        let divisor = 100 + i128::from(rate_percent);
        Pesos((i128::from(self.0) * 100 / divisor) as i64)
    }

    /// Statutory tax over a net amount: `round_half_up(net * rate / 100)`.
    pub fn tax_over_net(self, rate_percent: u32) -> Pesos {
        debug_assert!(self.0 >= 0);
        let scaled = i128::from(self.0) * i128::from(rate_percent);
        Pesos(((scaled + 50) / 100) as i64)
    }

    /// Negated amount (credit-note aggregation).
    pub fn negated(self) -> Pesos {
        Pesos(-self.0)
    }
}

impl std::fmt::Display for Pesos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for Pesos {
    type Output = Pesos;
    fn add(self, other: Pesos) -> Pesos {
        Pesos(self.0 + other.0)
    }
}

impl std::ops::Sub for Pesos {
    type Output = Pesos;
    fn sub(self, other: Pesos) -> Pesos {
        Pesos(self.0 - other.0)
    }
}

impl std::ops::AddAssign for Pesos {
    fn add_assign(&mut self, other: Pesos) {
        self.0 += other.0;
    }
}

impl std::iter::Sum for Pesos {
    fn sum<I: Iterator<Item = Pesos>>(iter: I) -> Pesos {
        Pesos(iter.map(|p| p.0).sum())
    }
}

/// Round a quantity × unit-price product half away from zero into pesos.
pub fn round_line_amount(quantity: f64, unit_price: Pesos) -> Pesos {
    Pesos((quantity * unit_price.0 as f64).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_of_tax_floors() {
        // 3000 gross at 19% -> floor(3000 * 100 / 119) = 2521
        assert_eq!(Pesos(3000).net_of_tax(19), Pesos(2521));
        assert_eq!(Pesos(0).net_of_tax(19), Pesos(0));
        assert_eq!(Pesos(119).net_of_tax(19), Pesos(100));
    }

    #[test]
    fn tax_over_net_rounds_half_up() {
        // 2521 * 19 / 100 = 478.99 -> 479
        assert_eq!(Pesos(2521).tax_over_net(19), Pesos(479));
        // 100 * 19 / 100 = 19 exactly
        assert_eq!(Pesos(100).tax_over_net(19), Pesos(19));
        // 50 * 19 / 100 = 9.5 -> 10
        assert_eq!(Pesos(50).tax_over_net(19), Pesos(10));
    }

    #[test]
    fn line_amount_rounds_half_away_from_zero() {
        assert_eq!(round_line_amount(3.0, Pesos(1000)), Pesos(3000));
        assert_eq!(round_line_amount(0.5, Pesos(3)), Pesos(2)); // 1.5 -> 2
        assert_eq!(round_line_amount(1.4999, Pesos(1)), Pesos(1));
    }

    #[test]
    fn sum_and_negate() {
        let total: Pesos = [Pesos(10), Pesos(20), Pesos(30)].into_iter().sum();
        assert_eq!(total, Pesos(60));
        assert_eq!(total.negated(), Pesos(-60));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Net plus remainder-tax always reconstructs the gross amount.
        #[test]
        fn net_plus_remainder_is_gross(gross in 0i64..1_000_000_000) {
            let gross = Pesos(gross);
            let net = gross.net_of_tax(19);
            let remainder = gross - net;
            prop_assert_eq!(net + remainder, gross);
            prop_assert!(net.amount() <= gross.amount());
        }

        /// The floored net never exceeds the exact rational net.
        #[test]
        fn net_is_floor(gross in 0i64..1_000_000_000) {
            let net = Pesos(gross).net_of_tax(19).amount();
            let exact_num = i128::from(gross) * 100;
            prop_assert!(i128::from(net) * 119 <= exact_num);
            prop_assert!((i128::from(net) + 1) * 119 > exact_num);
        }
    }
}
