use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Linear recency decay over `horizon_days`.
///
/// 1.0 for a snippet published at (or after) `as_of`, falling linearly to 0.0
/// at `horizon_days` old, 0.0 beyond that. A NaN horizon scores 0.0.
pub fn recency_score(published_at: DateTime<Utc>, as_of: DateTime<Utc>, horizon_days: f64) -> f64 {
    let age_days = ((as_of - published_at).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
    if horizon_days <= 0.0 {
        return if age_days == 0.0 { 1.0 } else { 0.0 };
    }
    let score = (1.0 - age_days / horizon_days).clamp(0.0, 1.0);
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_linear_decay() {
        let now = as_of();
        assert_eq!(recency_score(now, now, 365.0), 1.0);
        let half = recency_score(now - Duration::days(73), now, 146.0);
        assert!((half - 0.5).abs() < 1e-12);
        assert_eq!(recency_score(now - Duration::days(400), now, 365.0), 0.0);
    }

    #[test]
    fn test_future_dates_clamp_to_one() {
        let now = as_of();
        assert_eq!(recency_score(now + Duration::days(3), now, 365.0), 1.0);
    }

    #[test]
    fn test_monotonically_decreasing() {
        let now = as_of();
        let scores: Vec<f64> = (0..500)
            .step_by(25)
            .map(|d| recency_score(now - Duration::days(d), now, 365.0))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_zero_horizon() {
        let now = as_of();
        assert_eq!(recency_score(now, now, 0.0), 1.0);
        assert_eq!(recency_score(now - Duration::days(1), now, 0.0), 0.0);
    }

    #[test]
    fn test_nan_horizon_scores_zero() {
        let now = as_of();
        assert_eq!(recency_score(now, now, f64::NAN), 0.0);
        assert_eq!(recency_score(now - Duration::days(3), now, f64::NAN), 0.0);
        assert_eq!(recency_score(now - Duration::days(3), now, f64::INFINITY), 1.0);
    }
}
