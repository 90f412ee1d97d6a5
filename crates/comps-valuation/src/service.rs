//! Request-level facade over the valuation engines and the corpus auditor.
//!
//! The service owns configured engines and is shared behind an `Arc` by the HTTP
//! router and the CLI; every call is independent and holds no mutable state.

use crate::config::AppConfig;
use crate::import::{CompsImporter, ImportError};
use crate::quality::{self, AuditReport, PropertyCompSet, QualityConfig};
use crate::valuation::{
    AdjustedComparable, Adjustment, AdjustmentEngine, AdjustmentPreset, ComparableSale,
    ComparisonConfig, ComparisonEngine, ComparisonSummary, MarketEstimate, MarketEstimator,
    SubjectProperty, ValuationError,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    pub base_price: i64,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustResponse {
    pub base_price: i64,
    pub adjusted_value: i64,
    pub total_adjustment: i64,
    pub percent_delta: f64,
    pub currency_delta: f64,
}

/// A comp as submitted for comparison: the sale fields plus the adjustments the
/// appraiser picked for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparableInput {
    #[serde(flatten)]
    pub sale: ComparableSale,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub subject: SubjectProperty,
    pub comparables: Vec<ComparableInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub subject: SubjectProperty,
    pub comparables: Vec<ComparableSale>,
    /// Reference date for recency weighting; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Either structured comp sets or a raw CSV export; both are audited together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditRequest {
    #[serde(default)]
    pub properties: Vec<PropertyCompSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ValuationService {
    adjustments: AdjustmentEngine,
    comparison: ComparisonEngine,
    estimator: MarketEstimator,
    quality: QualityConfig,
}

impl ValuationService {
    pub fn new(
        adjustments: AdjustmentEngine,
        comparison: ComparisonConfig,
        estimator: MarketEstimator,
        quality: QualityConfig,
    ) -> Self {
        Self {
            adjustments,
            comparison: ComparisonEngine::new(comparison),
            estimator,
            quality,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            AdjustmentEngine::standard(),
            config.comparison.clone(),
            MarketEstimator::default(),
            config.quality.clone(),
        )
    }

    pub fn presets(&self) -> &[AdjustmentPreset] {
        self.adjustments.presets()
    }

    pub fn quality_config(&self) -> &QualityConfig {
        &self.quality
    }

    pub fn adjust(&self, request: AdjustRequest) -> Result<AdjustResponse, ValuationError> {
        let outcome = self
            .adjustments
            .compute_adjusted_value(request.base_price, &request.adjustments)?;
        Ok(AdjustResponse {
            base_price: request.base_price,
            adjusted_value: outcome.adjusted_value,
            total_adjustment: outcome.total_adjustment(request.base_price),
            percent_delta: outcome.percent_delta,
            currency_delta: outcome.currency_delta,
        })
    }

    pub fn compare(&self, request: CompareRequest) -> Result<ComparisonSummary, ValuationError> {
        let adjusted = request
            .comparables
            .into_iter()
            .map(|input| self.adjustments.adjust(input.sale, input.adjustments))
            .collect::<Result<Vec<AdjustedComparable>, _>>()?;

        debug!(
            subject = %request.subject.address,
            comparables = adjusted.len(),
            "comparing adjusted comparables"
        );
        self.comparison.compare(&request.subject, &adjusted)
    }

    pub fn estimate(&self, request: EstimateRequest) -> Result<MarketEstimate, ValuationError> {
        let as_of = request
            .as_of
            .unwrap_or_else(|| Local::now().date_naive());
        self.estimator
            .estimate(&request.subject, &request.comparables, as_of)
    }

    pub fn audit(&self, request: AuditRequest) -> Result<AuditReport, ImportError> {
        let mut auditor = quality::CorpusAuditor::new(&self.quality);
        auditor.observe_all(&request.properties);

        if let Some(csv) = request.csv {
            for property in CompsImporter::comp_sets_from_reader(Cursor::new(csv.into_bytes())) {
                auditor.observe(&property?);
            }
        }

        Ok(auditor.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::IssueCategory;
    use crate::valuation::domain::fixtures::{sale, subject};
    use crate::valuation::SUPERIOR_CONDITION;

    #[test]
    fn adjust_reports_total_against_base() {
        let service = ValuationService::default();
        let response = service
            .adjust(AdjustRequest {
                base_price: 100_000,
                adjustments: vec![
                    Adjustment::preset(SUPERIOR_CONDITION),
                    Adjustment::custom("Dated roof", -5_000),
                ],
            })
            .expect("adjustment applies");

        assert_eq!(response.adjusted_value, 105_000);
        assert_eq!(response.total_adjustment, 5_000);
        assert_eq!(response.percent_delta, 10.0);
    }

    #[test]
    fn compare_applies_adjustments_per_comparable() {
        let service = ValuationService::default();
        let request = CompareRequest {
            subject: subject(1800),
            comparables: vec![
                ComparableInput {
                    sale: sale("4609 Pine Ave", 100_000, 2000, 0.4),
                    adjustments: vec![Adjustment::preset("Pool")],
                },
                ComparableInput {
                    sale: sale("2421 Sunset Blvd", 120_000, 1900, 0.9),
                    adjustments: Vec::new(),
                },
            ],
        };

        let summary = service.compare(request).expect("comparison succeeds");
        assert_eq!(summary.average_adjusted_value, 115_000);
        assert_eq!(summary.value_range.min, 110_000);
        assert_eq!(summary.value_range.max, 120_000);
    }

    #[test]
    fn compare_rejects_unknown_presets() {
        let service = ValuationService::default();
        let request = CompareRequest {
            subject: subject(1800),
            comparables: vec![ComparableInput {
                sale: sale("4609 Pine Ave", 100_000, 2000, 0.4),
                adjustments: vec![Adjustment::preset("Helipad")],
            }],
        };

        assert_eq!(
            service.compare(request),
            Err(ValuationError::UnknownPreset {
                name: "Helipad".to_string()
            })
        );
    }

    #[test]
    fn audit_merges_structured_and_csv_properties() {
        let service = ValuationService::default();
        let request = AuditRequest {
            properties: vec![PropertyCompSet {
                id: "1".to_string(),
                address: "25217 MATHEW ST".to_string(),
                estimated_value: Some(100_000),
                avg_comp_sale: None,
                comps: vec![sale("7102 Kirkwood Cir", 96_000, 1800, 0.0)],
            }],
            csv: Some(
                "property_id,property_address,estimated_value,address,sale_date,sale_price,living_area_sqft,bedrooms,bathrooms,distance_miles\n\
7,3100 FLOWERTREE RD,100000,2421 Hiawassee Rd,2025-12-31,92000,1354,3,2,0.9\n"
                    .to_string(),
            ),
        };

        let report = service.audit(request).expect("audit runs");
        assert_eq!(report.statistics.property_count, 2);
        assert!(report.issue(IssueCategory::IdenticalEstimate).is_some());
        assert_eq!(report.health_score(), Some(50));
    }
}
