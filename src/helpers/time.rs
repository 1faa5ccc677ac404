use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

pub const SAFETY_MARGIN_SECONDS_DEFAULT: u64 = 60;

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Expiry to persist for a token the identity endpoint says lives `expires_in` seconds.
///
/// `None` when the lifetime is not a finite number or the result falls outside
/// the representable date range.
pub fn expires_at_with_margin(now: DateTime<Utc>, expires_in: f64, safety_margin_seconds: u64) -> Option<DateTime<Utc>> {
    if !expires_in.is_finite() || expires_in.abs() >= i64::MAX as f64 {
        return None;
    }
    let lifetime = TimeDelta::try_seconds(expires_in as i64)?;
    let margin = TimeDelta::try_seconds(i64::try_from(safety_margin_seconds).ok()?)?;
    now.checked_add_signed(lifetime)?.checked_sub_signed(margin)
}

pub fn get_instant() -> Instant {
    Instant::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_is_subtracted_from_reported_lifetime() {
        let now = now_utc();
        let exp = expires_at_with_margin(now, 3600.0, SAFETY_MARGIN_SECONDS_DEFAULT).unwrap();
        assert_eq!((exp - now).num_seconds(), 3540);
    }

    #[test]
    fn fractional_lifetime_is_truncated() {
        let now = now_utc();
        let exp = expires_at_with_margin(now, 3600.9, 0).unwrap();
        assert_eq!((exp - now).num_seconds(), 3600);
    }

    #[test]
    fn short_lifetime_lands_in_the_past() {
        let now = now_utc();
        let exp = expires_at_with_margin(now, 30.0, 60).unwrap();
        assert!(exp < now);
    }

    #[test]
    fn unrepresentable_lifetimes_yield_none() {
        let now = now_utc();
        assert_eq!(expires_at_with_margin(now, 1e13, 60), None);
        assert_eq!(expires_at_with_margin(now, -1e13, 60), None);
        assert_eq!(expires_at_with_margin(now, 1e300, 60), None);
        assert_eq!(expires_at_with_margin(now, f64::NAN, 60), None);
        assert_eq!(expires_at_with_margin(now, f64::INFINITY, 60), None);
        assert_eq!(expires_at_with_margin(now, 3600.0, u64::MAX), None);
    }
}
