use serde::Serialize;

use crate::error::EngineError;

/// Fixed seasonal multipliers, index 0 = January. Texas households peak hard
/// in late summer; winter carries a smaller heating bump.
pub const SEASONAL_MULTIPLIERS: [f64; 12] = [
    1.15, 1.10, 0.95, 0.95, 1.00, 1.40, 1.75, 1.80, 1.45, 0.95, 0.95, 1.15,
];

/// Default average when no usable usage figure is supplied.
pub const FALLBACK_AVERAGE_KWH: f64 = 1000.0;

/// Home-size categories mapped to a default average monthly usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HomeSize {
    Apartment,
    SmallHome,
    MediumHome,
    LargeHome,
}

impl HomeSize {
    pub fn average_kwh(&self) -> f64 {
        match self {
            HomeSize::Apartment => 700.0,
            HomeSize::SmallHome => 1000.0,
            HomeSize::MediumHome => 1500.0,
            HomeSize::LargeHome => 2500.0,
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "apartment" => Some(HomeSize::Apartment),
            "small" | "small-home" | "small_home" => Some(HomeSize::SmallHome),
            "medium" | "medium-home" | "medium_home" => Some(HomeSize::MediumHome),
            "large" | "large-home" | "large_home" => Some(HomeSize::LargeHome),
            _ => None,
        }
    }
}

/// Default average usage for a free-form home-size label. Unknown labels fall
/// back to [`FALLBACK_AVERAGE_KWH`].
pub fn average_for_home_size(label: &str) -> f64 {
    HomeSize::from_label(label)
        .map(|size| size.average_kwh())
        .unwrap_or(FALLBACK_AVERAGE_KWH)
}

/// Twelve monthly usage values in kWh, index 0 = January.
///
/// The only way the engine accepts household usage. Constructing one from a
/// slice of the wrong length, or containing negative or non-finite values,
/// is a fatal input error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageProfile([f64; 12]);

impl UsageProfile {
    pub fn try_new(values: &[f64]) -> Result<Self, EngineError> {
        let months: [f64; 12] = values
            .try_into()
            .map_err(|_| EngineError::UsageProfileLength {
                found: values.len(),
            })?;
        for (month, value) in months.iter().enumerate() {
            if !value.is_finite() || *value < 0.0 {
                return Err(EngineError::InvalidUsageValue { month });
            }
        }
        Ok(Self(months))
    }

    pub fn months(&self) -> &[f64; 12] {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn average(&self) -> f64 {
        self.total() / 12.0
    }
}

/// Expand an average monthly usage figure into a 12-month seasonal pattern.
///
/// The multipliers are rescaled so the arithmetic mean equals the input
/// exactly, each month is rounded to a whole kWh, and the rounding residual
/// lands on the highest-usage month so the annual total is exactly
/// `round(average * 12)`. Non-finite or non-positive input uses the
/// 1000 kWh fallback.
pub fn estimate_usage_pattern(average_kwh: f64) -> UsageProfile {
    let average = if average_kwh.is_finite() && average_kwh > 0.0 {
        average_kwh
    } else {
        FALLBACK_AVERAGE_KWH
    };

    let scale = 12.0 / SEASONAL_MULTIPLIERS.iter().sum::<f64>();
    let mut months = [0.0_f64; 12];
    for (slot, multiplier) in months.iter_mut().zip(SEASONAL_MULTIPLIERS) {
        *slot = (average * multiplier * scale).round();
    }

    let target = (average * 12.0).round();
    let rounded_total: f64 = months.iter().sum();
    let residual = target - rounded_total;

    let peak = months
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| index)
        .unwrap_or(7);
    months[peak] = (months[peak] + residual).max(0.0);

    UsageProfile(months)
}

/// Expand a home-size category the same way.
pub fn estimate_usage_for_home_size(size: HomeSize) -> UsageProfile {
    estimate_usage_pattern(size.average_kwh())
}
