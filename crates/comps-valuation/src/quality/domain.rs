use crate::valuation::ComparableSale;
use serde::{Deserialize, Serialize};

/// One stored property together with the comp set generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCompSet {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub estimated_value: Option<i64>,
    #[serde(default)]
    pub avg_comp_sale: Option<i64>,
    #[serde(default)]
    pub comps: Vec<ComparableSale>,
}

impl PropertyCompSet {
    pub fn zero_distance_count(&self) -> usize {
        self.comps.iter().filter(|comp| comp.has_zero_distance()).count()
    }

    pub(crate) fn comp_identifier(&self, comp: &ComparableSale) -> String {
        format!("{}/{}", self.id, comp.address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Medium,
    Low,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    ZeroDistance,
    MixedDistance,
    IdenticalEstimate,
    PsfOutlier,
    DemoAddressPattern,
    PsfMismatch,
}

impl IssueCategory {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ZeroDistance => "zero-distance",
            Self::MixedDistance => "mixed-distance",
            Self::IdenticalEstimate => "identical-estimate",
            Self::PsfOutlier => "psf-outlier",
            Self::DemoAddressPattern => "demo-address-pattern",
            Self::PsfMismatch => "psf-mismatch",
        }
    }
}

/// A defect detected across an audited batch. Advisory, never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub title: String,
    pub affected_count: usize,
    pub affected_identifiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_share_pct: Option<u8>,
    pub detail: String,
    pub probable_cause: String,
    pub recommended_action: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn tally(issues: &[QualityIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut counts, issue| {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
            counts
        })
    }

    pub fn total(&self) -> usize {
        self.critical + self.medium + self.low
    }
}

/// `round(part / whole * 100)`, undefined for an empty whole.
pub(crate) fn share_pct(part: usize, whole: usize) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    let pct = (part as f64 / whole as f64 * 100.0).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}
