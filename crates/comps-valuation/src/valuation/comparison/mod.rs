mod deltas;

pub use deltas::{DeltaDirection, DeltaFlags};

use super::adjustment::AdjustedComparable;
use super::domain::{rounded_ratio, SubjectProperty, ValuationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tolerances beyond which a comp's size or age is flagged against the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub sqft_tolerance_pct: f64,
    pub year_built_tolerance: u32,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            sqft_tolerance_pct: 10.0,
            year_built_tolerance: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableView {
    pub address: String,
    pub sale_price: i64,
    pub adjusted_value: i64,
    pub total_adjustment: i64,
    pub price_per_sqft_adjusted: i64,
    pub distance_miles: f64,
    pub deltas: DeltaFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    pub fn spread(&self) -> i64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub subject_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_price_per_sqft: Option<i64>,
    pub comparables: Vec<ComparableView>,
    pub average_adjusted_value: i64,
    pub value_range: ValueRange,
    /// Comp average relative to the subject's pre-existing estimate, in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_variance_pct: Option<f64>,
    pub flagged_comparables: usize,
}

/// Folds adjusted comps into a value estimate for one subject.
///
/// Every comp counts equally; ranking and filtering happen before this is called.
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    config: ComparisonConfig,
}

impl ComparisonEngine {
    pub fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    pub fn compare(
        &self,
        subject: &SubjectProperty,
        comps: &[AdjustedComparable],
    ) -> Result<ComparisonSummary, ValuationError> {
        if comps.is_empty() {
            return Err(ValuationError::EmptyComparableSet);
        }
        if subject.living_area_sqft == 0 {
            return Err(ValuationError::NonPositiveLivingArea {
                address: subject.address.clone(),
            });
        }

        let mut comparables = Vec::with_capacity(comps.len());
        let mut total: i128 = 0;
        let mut min = i64::MAX;
        let mut max = i64::MIN;

        for comp in comps {
            let adjusted_value = comp.adjusted_value();
            let price_per_sqft_adjusted = rounded_ratio(adjusted_value, comp.base.living_area_sqft)
                .ok_or_else(|| ValuationError::NonPositiveLivingArea {
                    address: comp.base.address.clone(),
                })?;

            total += i128::from(adjusted_value);
            min = min.min(adjusted_value);
            max = max.max(adjusted_value);

            comparables.push(ComparableView {
                address: comp.base.address.clone(),
                sale_price: comp.base.sale_price,
                adjusted_value,
                total_adjustment: comp.outcome.total_adjustment(comp.base.sale_price),
                price_per_sqft_adjusted,
                distance_miles: comp.base.distance_miles,
                deltas: DeltaFlags::between(&comp.base, subject, &self.config),
            });
        }

        let average_adjusted_value = (total as f64 / comps.len() as f64).round() as i64;
        let estimate_variance_pct = subject
            .estimated_value
            .filter(|estimate| *estimate != 0)
            .map(|estimate| {
                (average_adjusted_value - estimate) as f64 / estimate as f64 * 100.0
            });
        let flagged_comparables = comparables
            .iter()
            .filter(|view| view.deltas.any())
            .count();

        debug!(
            subject = %subject.address,
            comps = comps.len(),
            average_adjusted_value,
            min,
            max,
            flagged_comparables,
            "compared subject against adjusted comparables"
        );

        Ok(ComparisonSummary {
            subject_address: subject.address.clone(),
            subject_price_per_sqft: subject.estimated_price_per_sqft(),
            comparables,
            average_adjusted_value,
            value_range: ValueRange { min, max },
            estimate_variance_pct,
            flagged_comparables,
        })
    }
}
