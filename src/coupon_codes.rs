//! Coupon issuance. Every new user gets a fixed-size batch of personal
//! coupons; codes are random and backed by a unique constraint in the store.

use rand::Rng;

use crate::models::CreateCouponEntity;

pub const COUPONS_PER_USER: usize = 5;

const CODE_LEN: usize = 10;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MIN_DISCOUNT: i32 = 5;
const MAX_DISCOUNT: i32 = 12;

fn generate_code(rng: &mut impl Rng) -> String {
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Mints the registration batch for a new user.
pub fn issue_batch(user_id: i32) -> Vec<CreateCouponEntity> {
    let mut rng = rand::rng();
    (0..COUPONS_PER_USER)
        .map(|_| {
            let discount = rng.random_range(MIN_DISCOUNT..=MAX_DISCOUNT);
            CreateCouponEntity {
                user_id,
                code: generate_code(&mut rng),
                discount,
                description: format!("Coupon con {discount}% di sconto"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn batch_has_five_coupons_for_the_right_user() {
        let batch = issue_batch(17);
        assert_eq!(batch.len(), COUPONS_PER_USER);
        assert!(batch.iter().all(|coupon| coupon.user_id == 17));
    }

    #[test]
    fn codes_are_ten_uppercase_alphanumerics() {
        for coupon in issue_batch(1) {
            assert_eq!(coupon.code.len(), CODE_LEN);
            assert!(
                coupon
                    .code
                    .bytes()
                    .all(|byte| CODE_CHARSET.contains(&byte)),
                "unexpected character in {}",
                coupon.code
            );
        }
    }

    #[test]
    fn discounts_stay_in_range_and_match_the_description() {
        for coupon in issue_batch(1) {
            assert!((MIN_DISCOUNT..=MAX_DISCOUNT).contains(&coupon.discount));
            assert_eq!(
                coupon.description,
                format!("Coupon con {}% di sconto", coupon.discount)
            );
        }
    }

    #[test]
    fn codes_do_not_repeat_across_batches() {
        let codes: HashSet<String> = issue_batch(1)
            .into_iter()
            .chain(issue_batch(2))
            .map(|coupon| coupon.code)
            .collect();
        assert_eq!(codes.len(), 2 * COUPONS_PER_USER);
    }
}
