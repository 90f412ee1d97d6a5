use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One historical sale used as pricing evidence for a subject property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSale {
    pub address: String,
    pub sale_date: NaiveDate,
    pub sale_price: i64,
    pub living_area_sqft: u32,
    /// Price per square foot as stored by the data source, if it shipped one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_price_per_sqft: Option<i64>,
    pub bedrooms: u8,
    pub bathrooms: f64,
    pub distance_miles: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
}

impl ComparableSale {
    /// `round(sale_price / living_area_sqft)`, or `None` when the living area is zero.
    pub fn derived_price_per_sqft(&self) -> Option<i64> {
        rounded_ratio(self.sale_price, self.living_area_sqft)
    }

    /// Like [`derived_price_per_sqft`](Self::derived_price_per_sqft) but reports a
    /// precondition violation instead of `None`.
    pub fn price_per_sqft(&self) -> Result<i64, ValuationError> {
        self.derived_price_per_sqft()
            .ok_or_else(|| ValuationError::NonPositiveLivingArea {
                address: self.address.clone(),
            })
    }

    /// The stored value when present, otherwise the recomputed one.
    pub fn effective_price_per_sqft(&self) -> Option<i64> {
        self.reported_price_per_sqft
            .or_else(|| self.derived_price_per_sqft())
    }

    /// True when a stored price per square foot disagrees with the recomputation.
    pub fn price_per_sqft_mismatch(&self) -> bool {
        match (self.reported_price_per_sqft, self.derived_price_per_sqft()) {
            (Some(reported), Some(derived)) => reported != derived,
            _ => false,
        }
    }

    pub fn has_zero_distance(&self) -> bool {
        self.distance_miles == 0.0
    }
}

/// The property being valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProperty {
    pub address: String,
    /// Pre-existing estimate, unrelated to the comp-derived value.
    #[serde(default)]
    pub estimated_value: Option<i64>,
    pub bedrooms: u8,
    pub bathrooms: f64,
    pub living_area_sqft: u32,
    pub year_built: i32,
}

impl SubjectProperty {
    pub fn estimated_price_per_sqft(&self) -> Option<i64> {
        self.estimated_value
            .and_then(|value| rounded_ratio(value, self.living_area_sqft))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("at least one comparable sale is required")]
    EmptyComparableSet,
    #[error("no usable comparable sales after filtering {rejected} record(s)")]
    NoUsableComparables { rejected: usize },
    #[error("living area for '{address}' must be greater than zero")]
    NonPositiveLivingArea { address: String },
    #[error("unknown adjustment preset '{name}'")]
    UnknownPreset { name: String },
    #[error("adjustment preset '{name}' is defined more than once")]
    DuplicatePreset { name: String },
}

pub(crate) fn rounded_ratio(numerator: i64, denominator: u32) -> Option<i64> {
    if denominator == 0 {
        return None;
    }
    Some((numerator as f64 / f64::from(denominator)).round() as i64)
}
