use approx::assert_relative_eq;

use crate::engine::usage::{
    average_for_home_size, estimate_usage_pattern, HomeSize, UsageProfile, FALLBACK_AVERAGE_KWH,
};
use crate::error::EngineError;

#[test]
fn pattern_total_matches_rounded_annual_exactly() {
    for average in [250.0, 937.5, 1000.0, 1150.0, 2500.0, 15.3] {
        let profile = estimate_usage_pattern(average);
        let expected = (average * 12.0).round();
        assert_relative_eq!(profile.total(), expected, epsilon = 1e-9);
    }
}

#[test]
fn pattern_mean_equals_input() {
    let profile = estimate_usage_pattern(1150.0);
    assert_relative_eq!(profile.average(), 1150.0, epsilon = 0.5);
}

#[test]
fn pattern_peaks_in_late_summer() {
    let profile = estimate_usage_pattern(1000.0);
    let months = profile.months();
    let august = months[7];
    for (index, value) in months.iter().enumerate() {
        if index != 7 {
            assert!(
                august >= *value,
                "August ({august}) should be the peak, but month {index} has {value}"
            );
        }
    }
    // Shoulder months sit below winter.
    assert!(months[3] < months[0]);
}

#[test]
fn non_positive_or_non_finite_input_falls_back() {
    let fallback = estimate_usage_pattern(FALLBACK_AVERAGE_KWH);
    assert_eq!(estimate_usage_pattern(0.0), fallback);
    assert_eq!(estimate_usage_pattern(-250.0), fallback);
    assert_eq!(estimate_usage_pattern(f64::NAN), fallback);
    assert_eq!(estimate_usage_pattern(f64::INFINITY), fallback);
}

#[test]
fn home_size_labels_map_to_defaults() {
    assert_relative_eq!(average_for_home_size("apartment"), 700.0);
    assert_relative_eq!(average_for_home_size("Medium-Home"), 1500.0);
    assert_relative_eq!(
        average_for_home_size("mansion"),
        FALLBACK_AVERAGE_KWH
    );
    assert_relative_eq!(HomeSize::LargeHome.average_kwh(), 2500.0);
}

#[test]
fn profile_rejects_wrong_length() {
    let result = UsageProfile::try_new(&[1000.0; 11]);
    assert!(matches!(
        result,
        Err(EngineError::UsageProfileLength { found: 11 })
    ));
}

#[test]
fn profile_rejects_negative_and_non_finite_values() {
    let mut values = [1000.0; 12];
    values[4] = -1.0;
    assert!(matches!(
        UsageProfile::try_new(&values),
        Err(EngineError::InvalidUsageValue { month: 4 })
    ));

    values[4] = f64::NAN;
    assert!(matches!(
        UsageProfile::try_new(&values),
        Err(EngineError::InvalidUsageValue { month: 4 })
    ));
}
