//! Cart pricing. Totals are always recomputed from live line items; the
//! `total_price` column on carts is a cache, never an input.

use rust_decimal::Decimal;

/// Sum of quantity × unit price over the given line items, at 2 decimal
/// places.
pub fn subtotal<I>(items: I) -> Decimal
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    items
        .into_iter()
        .map(|(quantity, price)| Decimal::from(quantity) * price)
        .sum::<Decimal>()
        .round_dp(2)
}

/// Amount taken off by a percentage coupon.
pub fn discount_amount(subtotal: Decimal, discount_percent: i32) -> Decimal {
    (subtotal * Decimal::from(discount_percent) / Decimal::from(100)).round_dp(2)
}

/// Subtotal minus the coupon discount, never below zero.
pub fn discounted_total(subtotal: Decimal, discount_percent: i32) -> Decimal {
    (subtotal - discount_amount(subtotal, discount_percent)).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn subtotal_sums_quantity_times_price() {
        let items = [(2, dec!(5.00)), (1, dec!(3.00))];
        assert_eq!(subtotal(items), dec!(13.00));
    }

    #[test]
    fn subtotal_of_an_empty_cart_is_zero() {
        assert_eq!(subtotal([]), Decimal::ZERO);
    }

    #[test]
    fn ten_percent_off_thirteen_is_eleven_seventy() {
        let subtotal = subtotal([(2, dec!(5.00)), (1, dec!(3.00))]);
        assert_eq!(discount_amount(subtotal, 10), dec!(1.30));
        assert_eq!(discounted_total(subtotal, 10), dec!(11.70));
    }

    #[test]
    fn discount_keeps_two_decimal_places() {
        assert_eq!(discount_amount(dec!(9.99), 7), dec!(0.70));
        assert_eq!(discounted_total(dec!(9.99), 7), dec!(9.29));
    }

    #[test]
    fn total_never_goes_below_zero() {
        assert_eq!(discounted_total(dec!(10.00), 100), Decimal::ZERO);
        assert_eq!(discounted_total(Decimal::ZERO, 50), Decimal::ZERO);
    }
}
