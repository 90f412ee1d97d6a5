use super::config::QualityConfig;
use super::domain::{share_pct, IssueCategory, PropertyCompSet, QualityIssue, Severity};
use super::normalizer::{ends_with_street, street_tokens};

/// Batch sizes the detectors report against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusTotals {
    pub properties: usize,
    pub comps: usize,
}

/// One independent heuristic folded over the batch a property at a time.
pub trait QualityDetector: Send {
    fn category(&self) -> IssueCategory;
    fn observe(&mut self, property: &PropertyCompSet);
    fn finish(&self, totals: &CorpusTotals) -> Option<QualityIssue>;
}

/// Registry in reporting order.
pub fn standard_detectors(config: &QualityConfig) -> Vec<Box<dyn QualityDetector>> {
    vec![
        Box::new(ZeroDistanceDetector::default()),
        Box::new(MixedDistanceDetector::default()),
        Box::new(IdenticalEstimateDetector::new(
            config.min_properties_for_identical_estimate,
        )),
        Box::new(PsfOutlierDetector::new(config.clone())),
        Box::new(DemoAddressDetector::new(&config.generic_street_names)),
        Box::new(PsfMismatchDetector::default()),
    ]
}

fn property_label(property: &PropertyCompSet) -> String {
    format!("#{} ({})", property.id, property.address)
}

#[derive(Debug, Default)]
pub struct ZeroDistanceDetector {
    flagged: Vec<String>,
    labels: Vec<String>,
}

impl QualityDetector for ZeroDistanceDetector {
    fn category(&self) -> IssueCategory {
        IssueCategory::ZeroDistance
    }

    fn observe(&mut self, property: &PropertyCompSet) {
        if !property.comps.is_empty() && property.zero_distance_count() == property.comps.len() {
            self.flagged.push(property.id.clone());
            self.labels.push(property_label(property));
        }
    }

    fn finish(&self, _totals: &CorpusTotals) -> Option<QualityIssue> {
        if self.flagged.is_empty() {
            return None;
        }

        Some(QualityIssue {
            severity: Severity::Critical,
            category: self.category(),
            title: "Properties with every comp at distance 0.0".to_string(),
            affected_count: self.flagged.len(),
            affected_identifiers: self.flagged.clone(),
            pool_share_pct: None,
            detail: self.labels.join(", "),
            probable_cause: "Comp sets generated before distances were calculated".to_string(),
            recommended_action: "Discard and regenerate these comp sets; their numbers cannot be trusted for pricing".to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MixedDistanceDetector {
    flagged: Vec<String>,
    labels: Vec<String>,
}

impl QualityDetector for MixedDistanceDetector {
    fn category(&self) -> IssueCategory {
        IssueCategory::MixedDistance
    }

    fn observe(&mut self, property: &PropertyCompSet) {
        let zeros = property.zero_distance_count();
        if zeros > 0 && zeros < property.comps.len() {
            self.flagged.push(property.id.clone());
            self.labels.push(format!(
                "{}: {}/{} comps at 0.0 mi",
                property_label(property),
                zeros,
                property.comps.len()
            ));
        }
    }

    fn finish(&self, _totals: &CorpusTotals) -> Option<QualityIssue> {
        if self.flagged.is_empty() {
            return None;
        }

        Some(QualityIssue {
            severity: Severity::Medium,
            category: self.category(),
            title: "Properties with some comps at distance 0.0".to_string(),
            affected_count: self.flagged.len(),
            affected_identifiers: self.flagged.clone(),
            pool_share_pct: None,
            detail: self.labels.join("; "),
            probable_cause: "Cached comps merged with newly fetched ones".to_string(),
            recommended_action: "Invalidate the cached comp set and refetch it in full".to_string(),
        })
    }
}

/// Fires only when the whole batch collapses to one distinct estimated value.
#[derive(Debug)]
pub struct IdenticalEstimateDetector {
    min_properties: usize,
    first: Option<Option<i64>>,
    diverged: bool,
    observed: usize,
    ids: Vec<String>,
}

impl IdenticalEstimateDetector {
    pub fn new(min_properties: usize) -> Self {
        Self {
            min_properties: min_properties.max(1),
            first: None,
            diverged: false,
            observed: 0,
            ids: Vec::new(),
        }
    }
}

impl QualityDetector for IdenticalEstimateDetector {
    fn category(&self) -> IssueCategory {
        IssueCategory::IdenticalEstimate
    }

    fn observe(&mut self, property: &PropertyCompSet) {
        self.observed += 1;
        if self.diverged {
            return;
        }

        match self.first {
            None => self.first = Some(property.estimated_value),
            Some(first) if first != property.estimated_value => {
                self.diverged = true;
                self.ids = Vec::new();
                return;
            }
            Some(_) => {}
        }
        self.ids.push(property.id.clone());
    }

    fn finish(&self, _totals: &CorpusTotals) -> Option<QualityIssue> {
        if self.diverged || self.observed < self.min_properties {
            return None;
        }
        let value = self.first.flatten()?;

        Some(QualityIssue {
            severity: Severity::Critical,
            category: self.category(),
            title: "Every property shares one estimated value".to_string(),
            affected_count: self.observed,
            affected_identifiers: self.ids.clone(),
            pool_share_pct: None,
            detail: format!(
                "all {} properties report an estimated value of {} (batches under {} properties are not checked)",
                self.observed, value, self.min_properties
            ),
            probable_cause: "Placeholder estimate that was never computed per property"
                .to_string(),
            recommended_action:
                "Recompute estimated values from each property's comps or an AVM before pricing"
                    .to_string(),
        })
    }
}

#[derive(Debug)]
pub struct PsfOutlierDetector {
    config: QualityConfig,
    flagged: Vec<String>,
}

impl PsfOutlierDetector {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            flagged: Vec::new(),
        }
    }
}

impl QualityDetector for PsfOutlierDetector {
    fn category(&self) -> IssueCategory {
        IssueCategory::PsfOutlier
    }

    fn observe(&mut self, property: &PropertyCompSet) {
        for comp in &property.comps {
            if let Some(psf) = comp.effective_price_per_sqft() {
                if self.config.is_psf_outlier(psf) {
                    self.flagged.push(property.comp_identifier(comp));
                }
            }
        }
    }

    fn finish(&self, totals: &CorpusTotals) -> Option<QualityIssue> {
        if self.flagged.is_empty() {
            return None;
        }
        let share = share_pct(self.flagged.len(), totals.comps);

        Some(QualityIssue {
            severity: Severity::Medium,
            category: self.category(),
            title: "Price per sqft outliers".to_string(),
            affected_count: self.flagged.len(),
            affected_identifiers: self.flagged.clone(),
            pool_share_pct: share,
            detail: format!(
                "{}/{} comps ({}%) priced outside {}-{} per sqft",
                self.flagged.len(),
                totals.comps,
                share.unwrap_or(0),
                self.config.psf_min,
                self.config.psf_max
            ),
            probable_cause: "Demo data or unusual properties".to_string(),
            recommended_action: "Verify these are legitimate comps before using them for pricing"
                .to_string(),
        })
    }
}

/// Heuristic for fallback data substituted when a provider call failed.
#[derive(Debug)]
pub struct DemoAddressDetector {
    vocabulary: Vec<Vec<String>>,
    flagged: Vec<String>,
}

impl DemoAddressDetector {
    pub fn new(street_names: &[String]) -> Self {
        let vocabulary = street_names
            .iter()
            .map(|name| street_tokens(name))
            .filter(|tokens| !tokens.is_empty())
            .collect();
        Self {
            vocabulary,
            flagged: Vec::new(),
        }
    }
}

impl QualityDetector for DemoAddressDetector {
    fn category(&self) -> IssueCategory {
        IssueCategory::DemoAddressPattern
    }

    fn observe(&mut self, property: &PropertyCompSet) {
        for comp in &property.comps {
            let tokens = street_tokens(&comp.address);
            if self
                .vocabulary
                .iter()
                .any(|street| ends_with_street(&tokens, street))
            {
                self.flagged.push(property.comp_identifier(comp));
            }
        }
    }

    fn finish(&self, totals: &CorpusTotals) -> Option<QualityIssue> {
        if self.flagged.is_empty() {
            return None;
        }
        let share = share_pct(self.flagged.len(), totals.comps);

        Some(QualityIssue {
            severity: Severity::Low,
            category: self.category(),
            title: "Generic street names (possible demo data)".to_string(),
            affected_count: self.flagged.len(),
            affected_identifiers: self.flagged.clone(),
            pool_share_pct: share,
            detail: format!(
                "{}/{} comps ({}%) sit on generic street names",
                self.flagged.len(),
                totals.comps,
                share.unwrap_or(0)
            ),
            probable_cause: "Demo or fallback data used instead of provider comps".to_string(),
            recommended_action: "Check the comp provider credentials and confirm live calls succeed"
                .to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct PsfMismatchDetector {
    flagged: Vec<String>,
}

impl QualityDetector for PsfMismatchDetector {
    fn category(&self) -> IssueCategory {
        IssueCategory::PsfMismatch
    }

    fn observe(&mut self, property: &PropertyCompSet) {
        for comp in &property.comps {
            if comp.price_per_sqft_mismatch() {
                self.flagged.push(property.comp_identifier(comp));
            }
        }
    }

    fn finish(&self, totals: &CorpusTotals) -> Option<QualityIssue> {
        if self.flagged.is_empty() {
            return None;
        }
        let share = share_pct(self.flagged.len(), totals.comps);

        Some(QualityIssue {
            severity: Severity::Medium,
            category: self.category(),
            title: "Stored price per sqft disagrees with sale price / living area".to_string(),
            affected_count: self.flagged.len(),
            affected_identifiers: self.flagged.clone(),
            pool_share_pct: share,
            detail: format!(
                "{} comp(s) carry a stale or truncated price per sqft",
                self.flagged.len()
            ),
            probable_cause: "Price per sqft stored separately from the values it derives from"
                .to_string(),
            recommended_action: "Recompute price per sqft from sale price and living area"
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::fixtures::sale;

    fn property(id: &str, estimate: Option<i64>, distances: &[f64]) -> PropertyCompSet {
        PropertyCompSet {
            id: id.to_string(),
            address: format!("{id} Flowertree Rd"),
            estimated_value: estimate,
            avg_comp_sale: None,
            comps: distances
                .iter()
                .enumerate()
                .map(|(i, distance)| sale(&format!("{i}1 Wekiva Trl"), 100_000, 1800, *distance))
                .collect(),
        }
    }

    fn run(detector: &mut dyn QualityDetector, batch: &[PropertyCompSet]) -> Option<QualityIssue> {
        for property in batch {
            detector.observe(property);
        }
        let totals = CorpusTotals {
            properties: batch.len(),
            comps: batch.iter().map(|property| property.comps.len()).sum(),
        };
        detector.finish(&totals)
    }

    #[test]
    fn empty_comp_set_is_not_all_zero() {
        let mut detector = ZeroDistanceDetector::default();
        assert!(run(&mut detector, &[property("1", None, &[])]).is_none());
    }

    #[test]
    fn mixed_detector_ignores_all_zero_sets() {
        let mut detector = MixedDistanceDetector::default();
        let batch = [
            property("1", None, &[0.0, 0.0, 0.0]),
            property("2", None, &[0.0, 0.4, 0.0]),
        ];
        let issue = run(&mut detector, &batch).expect("mixed set flagged");
        assert_eq!(issue.affected_identifiers, vec!["2".to_string()]);
        assert!(issue.detail.contains("2/3 comps"));
    }

    #[test]
    fn identical_estimate_needs_batch_wide_uniqueness() {
        let mut detector = IdenticalEstimateDetector::new(2);
        let batch = [
            property("1", Some(100_000), &[0.2]),
            property("2", Some(100_000), &[0.3]),
            property("3", Some(100_000), &[0.4]),
        ];
        let issue = run(&mut detector, &batch).expect("shared estimate flagged");
        assert_eq!(issue.affected_count, 3);
        assert_eq!(issue.severity, Severity::Critical);

        let mut detector = IdenticalEstimateDetector::new(2);
        let batch = [
            property("1", Some(100_000), &[0.2]),
            property("2", Some(100_000), &[0.3]),
            property("3", Some(101_000), &[0.4]),
        ];
        assert!(run(&mut detector, &batch).is_none());
    }

    #[test]
    fn identical_estimate_skips_single_property_and_missing_values() {
        let mut detector = IdenticalEstimateDetector::new(2);
        assert!(run(&mut detector, &[property("1", Some(100_000), &[0.2])]).is_none());

        let mut detector = IdenticalEstimateDetector::new(2);
        let batch = [property("1", None, &[0.2]), property("2", None, &[0.3])];
        assert!(run(&mut detector, &batch).is_none());
    }

    #[test]
    fn identical_estimate_minimum_is_reported_and_lowerable() {
        let config = QualityConfig::default();
        let single = [property("1", Some(100_000), &[0.2])];

        let mut detector = IdenticalEstimateDetector::new(config.min_properties_for_identical_estimate);
        assert!(run(&mut detector, &single).is_none());

        let mut detector = IdenticalEstimateDetector::new(1);
        let issue = run(&mut detector, &single).expect("single property flagged at minimum 1");
        assert_eq!(issue.affected_identifiers, vec!["1".to_string()]);
        assert!(issue.detail.contains("under 1 properties"));

        let mut detector = IdenticalEstimateDetector::new(config.min_properties_for_identical_estimate);
        let pair = [
            property("1", Some(100_000), &[0.2]),
            property("2", Some(100_000), &[0.3]),
        ];
        let issue = run(&mut detector, &pair).expect("pair flagged at default minimum");
        assert!(issue.detail.contains("under 2 properties"));
    }

    #[test]
    fn psf_outliers_report_share_of_pool() {
        let mut batch = vec![property("1", None, &[0.2, 0.3, 0.4, 0.5])];
        batch[0].comps[0].sale_price = 29 * 1800;
        batch[0].comps[1].sale_price = 101 * 1800;
        batch[0].comps[2].sale_price = 30 * 1800;
        batch[0].comps[3].sale_price = 100 * 1800;

        let mut detector = PsfOutlierDetector::new(QualityConfig::default());
        let issue = run(&mut detector, &batch).expect("outliers flagged");
        assert_eq!(issue.affected_count, 2);
        assert_eq!(issue.pool_share_pct, Some(50));
    }

    #[test]
    fn demo_vocabulary_is_configurable() {
        let mut batch = vec![property("1", None, &[0.2, 0.3])];
        batch[0].comps[0].address = "3659 Oak St".to_string();

        let mut detector = DemoAddressDetector::new(&QualityConfig::default().generic_street_names);
        let issue = run(&mut detector, &batch).expect("generic street flagged");
        assert_eq!(issue.severity, Severity::Low);
        assert_eq!(issue.affected_identifiers, vec!["1/3659 Oak St".to_string()]);

        let mut detector = DemoAddressDetector::new(&["Wekiva Trl".to_string()]);
        let issue = run(&mut detector, &batch).expect("custom vocabulary flagged");
        assert_eq!(issue.affected_identifiers, vec!["1/11 Wekiva Trl".to_string()]);
    }

    #[test]
    fn demo_match_uses_trailing_two_tokens_only() {
        let mut batch = vec![property("L", None, &[0.2, 0.3])];
        batch[0].comps[0].address = "9082 Lake View Dr".to_string();
        batch[0].comps[1].address = "4811 Main St".to_string();

        let mut detector = DemoAddressDetector::new(&QualityConfig::default().generic_street_names);
        let issue = run(&mut detector, &batch).expect("main street flagged");
        assert_eq!(issue.affected_identifiers, vec!["L/4811 Main St".to_string()]);
        assert_eq!(issue.pool_share_pct, Some(50));
    }
}
