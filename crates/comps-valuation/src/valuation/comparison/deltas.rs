use super::ComparisonConfig;
use crate::valuation::domain::{ComparableSale, SubjectProperty};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDirection {
    Above,
    Below,
    Same,
}

impl DeltaDirection {
    fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Above
        } else if delta < 0.0 {
            Self::Below
        } else {
            Self::Same
        }
    }
}

/// Differences between one comp and the subject, comp minus subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaFlags {
    pub bedrooms: i16,
    pub bedrooms_direction: DeltaDirection,
    pub bedrooms_flagged: bool,
    pub bathrooms: f64,
    pub bathrooms_direction: DeltaDirection,
    pub bathrooms_flagged: bool,
    pub sqft_pct: f64,
    pub sqft_flagged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    pub year_built_flagged: bool,
}

impl DeltaFlags {
    /// Subject living area must already be known to be non-zero.
    pub(crate) fn between(
        comp: &ComparableSale,
        subject: &SubjectProperty,
        config: &ComparisonConfig,
    ) -> Self {
        let bedrooms = i16::from(comp.bedrooms) - i16::from(subject.bedrooms);
        let bathrooms = comp.bathrooms - subject.bathrooms;
        let subject_sqft = f64::from(subject.living_area_sqft);
        let sqft_pct = (f64::from(comp.living_area_sqft) - subject_sqft) / subject_sqft * 100.0;
        let year_built = comp.year_built.map(|year| year - subject.year_built);

        Self {
            bedrooms,
            bedrooms_direction: DeltaDirection::of(f64::from(bedrooms)),
            bedrooms_flagged: bedrooms != 0,
            bathrooms,
            bathrooms_direction: DeltaDirection::of(bathrooms),
            bathrooms_flagged: bathrooms != 0.0,
            sqft_pct,
            sqft_flagged: sqft_pct.abs() > config.sqft_tolerance_pct,
            year_built,
            year_built_flagged: year_built
                .map(|delta| delta.unsigned_abs() > config.year_built_tolerance)
                .unwrap_or(false),
        }
    }

    pub fn any(&self) -> bool {
        self.bedrooms_flagged || self.bathrooms_flagged || self.sqft_flagged || self.year_built_flagged
    }
}
