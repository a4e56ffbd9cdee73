//! Order numbers.

use jiff::Timestamp;
use rand::{Rng, distributions::Alphanumeric};

/// Maximum inserts attempted before giving up on a unique number.
pub(crate) const MAX_ATTEMPTS: usize = 5;

const SUFFIX_LEN: usize = 6;

/// `ORD-<UTC yyyymmddHHMMSS>-<6 upper-case alphanumerics>`
pub(crate) fn generate_order_number<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> String {
    let suffix: String = rng
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect();

    format!("ORD-{}-{suffix}", now.strftime("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn order_numbers_have_time_prefix_and_upper_suffix() -> TestResult {
        let now: Timestamp = "2026-03-01T09:30:05Z".parse()?;
        let mut rng = StdRng::seed_from_u64(7);

        let number = generate_order_number(now, &mut rng);

        let suffix = number
            .strip_prefix("ORD-20260301093005-")
            .ok_or("missing prefix")?;

        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );

        Ok(())
    }

    #[test]
    fn consecutive_numbers_differ() {
        let now = Timestamp::now();
        let mut rng = StdRng::seed_from_u64(42);

        let first = generate_order_number(now, &mut rng);
        let second = generate_order_number(now, &mut rng);

        assert_ne!(first, second);
    }
}
