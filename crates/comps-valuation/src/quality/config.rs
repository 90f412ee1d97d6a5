use serde::{Deserialize, Serialize};

pub const DEFAULT_GENERIC_STREET_NAMES: &[&str] = &[
    "Park Ave",
    "Main St",
    "Oak St",
    "Pine Ave",
    "Colonial Dr",
    "Maple Dr",
    "Cedar Ln",
    "Palm Way",
    "Sunset Blvd",
    "Lake View Dr",
];

/// Market-calibrated thresholds for the corpus auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Comps priced strictly below this per square foot are outliers.
    pub psf_min: f64,
    /// Comps priced strictly above this per square foot are outliers.
    pub psf_max: f64,
    /// Matched against the last two tokens of each comp address, so only two-token
    /// names such as "Oak St" can match. "Lake View Dr" stays listed but never fires.
    pub generic_street_names: Vec<String>,
    pub search_radius_miles: f64,
    /// Smallest batch the identical-estimate check runs on. With the default of 2 a
    /// one-property batch is never flagged; set 1 to check single properties too.
    pub min_properties_for_identical_estimate: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            psf_min: 30.0,
            psf_max: 100.0,
            generic_street_names: DEFAULT_GENERIC_STREET_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            search_radius_miles: 3.0,
            min_properties_for_identical_estimate: 2,
        }
    }
}

impl QualityConfig {
    pub fn is_psf_outlier(&self, price_per_sqft: i64) -> bool {
        let psf = price_per_sqft as f64;
        psf < self.psf_min || psf > self.psf_max
    }
}
