const KMH_PER_MPS: f64 = 3.6;

pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * KMH_PER_MPS
}

pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / KMH_PER_MPS
}

/// Rounds to the nearest integer, with halves going towards positive infinity
/// (`2.5 -> 3`, `-2.5 -> -2`). Display speeds and ETA minutes use this rule.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 { floor + 1.0 } else { floor }
}

/// A driver is overspeeding only against a known, positive limit.
pub fn is_overspeeding(speed_kmh: Option<f64>, limit_kmh: Option<f64>) -> bool {
    match (speed_kmh, limit_kmh) {
        (Some(speed), Some(limit)) => limit > 0.0 && speed > limit,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_units() {
        assert!((mps_to_kmh(10.0) - 36.0).abs() < 1e-9);
        assert!((kmh_to_mps(36.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(-2.51), -3.0);
        assert_eq!(round_half_up(7.0), 7.0);
    }

    #[test]
    fn overspeeding_requires_positive_limit() {
        assert!(is_overspeeding(Some(31.0), Some(30.0)));
        assert!(!is_overspeeding(Some(30.0), Some(30.0)));
        assert!(!is_overspeeding(Some(80.0), Some(0.0)));
        assert!(!is_overspeeding(Some(80.0), None));
        assert!(!is_overspeeding(None, Some(30.0)));
    }
}
