//! Batch audit of stored comp sets.
//!
//! The auditor is a fold: feed it one [`PropertyCompSet`] at a time and call
//! [`CorpusAuditor::finish`] once the corpus is exhausted. Every registered detector
//! sees every property, and issues come back in registry order.

mod config;
pub mod detectors;
mod domain;
mod normalizer;
mod stats;

pub use config::{QualityConfig, DEFAULT_GENERIC_STREET_NAMES};
pub use detectors::{standard_detectors, CorpusTotals, QualityDetector};
pub use domain::{IssueCategory, PropertyCompSet, QualityIssue, Severity, SeverityCounts};
pub use stats::{health_score, CorpusStatistics, Distribution, HealthGrade};

use serde::Serialize;
use stats::StatisticsAccumulator;
use tracing::{debug, info, warn};

/// Estimated value of one property set against the average of its comps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueConsistency {
    pub property_id: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_comp_sale: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_pct: Option<i64>,
}

impl ValueConsistency {
    fn of(property: &PropertyCompSet) -> Self {
        let avg_comp_sale = property.avg_comp_sale.or_else(|| {
            (!property.comps.is_empty()).then(|| {
                let total: i128 = property
                    .comps
                    .iter()
                    .map(|comp| i128::from(comp.sale_price))
                    .sum();
                (total as f64 / property.comps.len() as f64).round() as i64
            })
        });
        let variance_pct = match (property.estimated_value, avg_comp_sale) {
            (Some(estimate), Some(average)) if estimate != 0 => {
                Some(((average - estimate) as f64 / estimate as f64 * 100.0).round() as i64)
            }
            _ => None,
        };

        Self {
            property_id: property.id.clone(),
            address: property.address.clone(),
            estimated_value: property.estimated_value,
            avg_comp_sale,
            variance_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub issues: Vec<QualityIssue>,
    pub severity_counts: SeverityCounts,
    pub statistics: CorpusStatistics,
    pub value_consistency: Vec<ValueConsistency>,
}

impl AuditReport {
    pub fn issue(&self, category: IssueCategory) -> Option<&QualityIssue> {
        self.issues.iter().find(|issue| issue.category == category)
    }

    pub fn health_score(&self) -> Option<u8> {
        self.statistics.health_score
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub struct CorpusAuditor {
    detectors: Vec<Box<dyn QualityDetector>>,
    statistics: StatisticsAccumulator,
    value_consistency: Vec<ValueConsistency>,
}

impl CorpusAuditor {
    pub fn new(config: &QualityConfig) -> Self {
        Self::with_detectors(config, standard_detectors(config))
    }

    /// Auditor running a caller-supplied detector registry, in the given order.
    pub fn with_detectors(config: &QualityConfig, detectors: Vec<Box<dyn QualityDetector>>) -> Self {
        Self {
            detectors,
            statistics: StatisticsAccumulator::new(config.search_radius_miles),
            value_consistency: Vec::new(),
        }
    }

    pub fn observe(&mut self, property: &PropertyCompSet) {
        debug!(
            property = %property.id,
            comps = property.comps.len(),
            zero_distance = property.zero_distance_count(),
            "auditing comp set"
        );

        for detector in &mut self.detectors {
            detector.observe(property);
        }
        self.statistics.observe(property);
        self.value_consistency.push(ValueConsistency::of(property));
    }

    pub fn observe_all<'a, I>(&mut self, properties: I)
    where
        I: IntoIterator<Item = &'a PropertyCompSet>,
    {
        for property in properties {
            self.observe(property);
        }
    }

    pub fn finish(self) -> AuditReport {
        let totals = CorpusTotals {
            properties: self.statistics.property_count(),
            comps: self.statistics.total_comps(),
        };
        let issues: Vec<QualityIssue> = self
            .detectors
            .iter()
            .filter_map(|detector| detector.finish(&totals))
            .collect();

        for issue in issues
            .iter()
            .filter(|issue| issue.severity == Severity::Critical)
        {
            warn!(
                category = issue.category.tag(),
                affected = issue.affected_count,
                "critical comp data issue"
            );
        }

        let statistics = self.statistics.finish();
        let severity_counts = SeverityCounts::tally(&issues);

        info!(
            properties = totals.properties,
            comps = totals.comps,
            issues = issues.len(),
            health_score = statistics.health_score,
            "comp corpus audit complete"
        );

        AuditReport {
            issues,
            severity_counts,
            statistics,
            value_consistency: self.value_consistency,
        }
    }
}

/// Audits an in-memory batch with the standard detector registry.
pub fn audit(properties: &[PropertyCompSet], config: &QualityConfig) -> AuditReport {
    let mut auditor = CorpusAuditor::new(config);
    auditor.observe_all(properties);
    auditor.finish()
}
