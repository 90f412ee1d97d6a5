//! Reconciled market estimate built directly from raw comparable sales.
//!
//! Unlike [`ComparisonEngine`](super::comparison::ComparisonEngine) this estimator
//! normalizes each comp toward the subject's features and weights comps by recency
//! and distance before reconciling three estimates into one value.

use super::domain::{ComparableSale, SubjectProperty, ValuationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub sqft_rate: f64,
    pub bedroom_rate: f64,
    pub bathroom_rate: f64,
    pub recency_horizon_days: f64,
    pub recency_floor: f64,
    pub weighted_share: f64,
    pub median_share: f64,
    pub mean_share: f64,
    pub range_sigma: f64,
    pub base_confidence: u8,
    pub confidence_per_comp: u8,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sqft_rate: 30.0,
            bedroom_rate: 5_000.0,
            bathroom_rate: 3_000.0,
            recency_horizon_days: 180.0,
            recency_floor: 0.5,
            weighted_share: 0.60,
            median_share: 0.25,
            mean_share: 0.15,
            range_sigma: 0.67,
            base_confidence: 60,
            confidence_per_comp: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedComparable {
    pub address: String,
    pub sale_price: i64,
    pub normalized_price: i64,
    pub adjustment: i64,
    pub adjustment_pct: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MethodBreakdown {
    pub weighted: i64,
    pub median: i64,
    pub mean: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketEstimate {
    pub estimated_value: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub confidence: u8,
    pub used_comparables: usize,
    pub rejected_comparables: usize,
    pub methods: MethodBreakdown,
    pub std_dev: i64,
    pub comparables: Vec<NormalizedComparable>,
}

#[derive(Debug, Clone, Default)]
pub struct MarketEstimator {
    config: EstimatorConfig,
}

impl MarketEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn estimate(
        &self,
        subject: &SubjectProperty,
        comps: &[ComparableSale],
        as_of: NaiveDate,
    ) -> Result<MarketEstimate, ValuationError> {
        if comps.is_empty() {
            return Err(ValuationError::EmptyComparableSet);
        }

        let usable: Vec<&ComparableSale> = comps
            .iter()
            .filter(|comp| comp.sale_price > 0 && comp.living_area_sqft > 0 && comp.bedrooms > 0)
            .collect();
        let rejected = comps.len() - usable.len();
        if usable.is_empty() {
            return Err(ValuationError::NoUsableComparables { rejected });
        }

        let normalized: Vec<NormalizedComparable> = usable
            .iter()
            .map(|comp| self.normalize(comp, subject, as_of))
            .collect();

        let total_weight: f64 = normalized.iter().map(|comp| comp.weight).sum();
        let weighted = normalized
            .iter()
            .map(|comp| comp.normalized_price as f64 * comp.weight / total_weight)
            .sum::<f64>();
        let prices: Vec<f64> = normalized
            .iter()
            .map(|comp| comp.normalized_price as f64)
            .collect();
        let median = median(&prices);
        let mean = prices.iter().sum::<f64>() / prices.len() as f64;

        let config = &self.config;
        let estimated = (weighted * config.weighted_share
            + median * config.median_share
            + mean * config.mean_share)
            .round();
        let std_dev = std_dev_around(&prices, estimated);
        let spread = std_dev * config.range_sigma;
        let confidence = usize::from(config.base_confidence)
            .saturating_add(usable.len().saturating_mul(usize::from(config.confidence_per_comp)))
            .min(100) as u8;

        debug!(
            subject = %subject.address,
            used = usable.len(),
            rejected,
            estimated,
            "reconciled market estimate"
        );

        Ok(MarketEstimate {
            estimated_value: estimated as i64,
            min_value: (estimated - spread).round() as i64,
            max_value: (estimated + spread).round() as i64,
            confidence,
            used_comparables: usable.len(),
            rejected_comparables: rejected,
            methods: MethodBreakdown {
                weighted: weighted.round() as i64,
                median: median.round() as i64,
                mean: mean.round() as i64,
            },
            std_dev: std_dev.round() as i64,
            comparables: normalized,
        })
    }

    fn normalize(
        &self,
        comp: &ComparableSale,
        subject: &SubjectProperty,
        as_of: NaiveDate,
    ) -> NormalizedComparable {
        let config = &self.config;
        let sqft_adjustment = (f64::from(subject.living_area_sqft)
            - f64::from(comp.living_area_sqft))
            * config.sqft_rate;
        let bedroom_adjustment =
            (f64::from(subject.bedrooms) - f64::from(comp.bedrooms)) * config.bedroom_rate;
        let bathroom_adjustment = (subject.bathrooms - comp.bathrooms) * config.bathroom_rate;
        let adjustment = sqft_adjustment + bedroom_adjustment + bathroom_adjustment;

        let days_ago = (as_of - comp.sale_date).num_days() as f64;
        let recency = (1.0 - days_ago / config.recency_horizon_days).max(config.recency_floor);
        let proximity = 1.0 / (1.0 + comp.distance_miles / 2.0);

        NormalizedComparable {
            address: comp.address.clone(),
            sale_price: comp.sale_price,
            normalized_price: (comp.sale_price as f64 + adjustment).round() as i64,
            adjustment: adjustment.round() as i64,
            adjustment_pct: adjustment / comp.sale_price as f64 * 100.0,
            weight: recency * proximity,
        }
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

fn std_dev_around(values: &[f64], center: f64) -> f64 {
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::fixtures::{sale, subject};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 26).expect("valid date")
    }

    #[test]
    fn identical_comps_reconcile_to_their_price() {
        let estimator = MarketEstimator::default();
        let comps = vec![
            sale("a", 100_000, 1800, 0.5),
            sale("b", 100_000, 1800, 1.0),
            sale("c", 100_000, 1800, 2.0),
        ];

        let estimate = estimator
            .estimate(&subject(1800), &comps, as_of())
            .expect("estimate builds");

        assert_eq!(estimate.estimated_value, 100_000);
        assert_eq!(estimate.min_value, 100_000);
        assert_eq!(estimate.max_value, 100_000);
        assert_eq!(estimate.confidence, 84);
        assert_eq!(estimate.methods.median, 100_000);
    }

    #[test]
    fn comps_are_normalized_toward_subject_features() {
        let estimator = MarketEstimator::default();
        let mut comp = sale("4811 Main St", 86_000, 2162, 0.0);
        comp.bedrooms = 2;
        comp.bathrooms = 1.0;

        let estimate = estimator
            .estimate(&subject(2000), &[comp], as_of())
            .expect("estimate builds");

        let normalized = &estimate.comparables[0];
        let expected = -162.0 * 30.0 + 5_000.0 + 3_000.0;
        assert_eq!(normalized.adjustment, expected as i64);
        assert_eq!(normalized.normalized_price, 86_000 + expected as i64);
        assert_eq!(normalized.weight, 1.0);
    }

    #[test]
    fn unusable_comps_are_excluded_then_rejected() {
        let estimator = MarketEstimator::default();
        let mut studio = sale("Studio", 60_000, 500, 0.4);
        studio.bedrooms = 0;
        let zero_price = sale("Gift deed", 0, 1500, 0.4);

        let error = estimator
            .estimate(&subject(1800), &[studio, zero_price], as_of())
            .expect_err("no usable comps");
        assert_eq!(error, ValuationError::NoUsableComparables { rejected: 2 });

        assert_eq!(
            estimator.estimate(&subject(1800), &[], as_of()),
            Err(ValuationError::EmptyComparableSet)
        );
    }

    #[test]
    fn confidence_is_capped() {
        let estimator = MarketEstimator::default();
        let comps: Vec<_> = (0..8)
            .map(|i| sale(&format!("{i} Oak St"), 100_000 + i * 1_000, 1800, 0.5))
            .collect();
        let estimate = estimator
            .estimate(&subject(1800), &comps, as_of())
            .expect("estimate builds");
        assert_eq!(estimate.confidence, 100);
        assert!(estimate.min_value <= estimate.estimated_value);
        assert!(estimate.max_value >= estimate.estimated_value);
    }
}
