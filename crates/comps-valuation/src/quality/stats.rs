use super::domain::PropertyCompSet;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningDistribution {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningDistribution {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    fn snapshot(&self) -> Option<Distribution> {
        (self.count > 0).then(|| Distribution {
            count: self.count,
            min: self.min,
            max: self.max,
            mean: self.sum / self.count as f64,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthGrade {
    Good,
    Fair,
    Poor,
}

impl HealthGrade {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            Self::Good
        } else if score >= 60 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStatistics {
    pub property_count: usize,
    pub total_comps: usize,
    pub zero_distance_comps: usize,
    /// Distances of comps that are not at 0.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Distribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_sqft: Option<Distribution>,
    pub search_radius_miles: f64,
    pub comps_beyond_radius: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_grade: Option<HealthGrade>,
}

/// Running aggregates so the corpus never has to be held in memory at once.
#[derive(Debug, Clone)]
pub(crate) struct StatisticsAccumulator {
    search_radius_miles: f64,
    property_count: usize,
    total_comps: usize,
    zero_distance_comps: usize,
    comps_beyond_radius: usize,
    distance: RunningDistribution,
    sale_price: RunningDistribution,
    price_per_sqft: RunningDistribution,
}

impl StatisticsAccumulator {
    pub(crate) fn new(search_radius_miles: f64) -> Self {
        Self {
            search_radius_miles,
            property_count: 0,
            total_comps: 0,
            zero_distance_comps: 0,
            comps_beyond_radius: 0,
            distance: RunningDistribution::default(),
            sale_price: RunningDistribution::default(),
            price_per_sqft: RunningDistribution::default(),
        }
    }

    pub(crate) fn observe(&mut self, property: &PropertyCompSet) {
        self.property_count += 1;
        for comp in &property.comps {
            self.total_comps += 1;
            if comp.has_zero_distance() {
                self.zero_distance_comps += 1;
            } else {
                self.distance.push(comp.distance_miles);
            }
            if comp.distance_miles > self.search_radius_miles {
                self.comps_beyond_radius += 1;
            }
            self.sale_price.push(comp.sale_price as f64);
            if let Some(psf) = comp.effective_price_per_sqft() {
                self.price_per_sqft.push(psf as f64);
            }
        }
    }

    pub(crate) fn property_count(&self) -> usize {
        self.property_count
    }

    pub(crate) fn total_comps(&self) -> usize {
        self.total_comps
    }

    pub(crate) fn finish(&self) -> CorpusStatistics {
        let health_score = health_score(self.total_comps, self.zero_distance_comps);
        CorpusStatistics {
            property_count: self.property_count,
            total_comps: self.total_comps,
            zero_distance_comps: self.zero_distance_comps,
            distance_miles: self.distance.snapshot(),
            sale_price: self.sale_price.snapshot(),
            price_per_sqft: self.price_per_sqft.snapshot(),
            search_radius_miles: self.search_radius_miles,
            comps_beyond_radius: self.comps_beyond_radius,
            health_score,
            health_grade: health_score.map(HealthGrade::from_score),
        }
    }
}

/// Percentage of comps free of the zero-distance defect; undefined without comps.
pub fn health_score(total_comps: usize, zero_distance_comps: usize) -> Option<u8> {
    super::domain::share_pct(
        total_comps.saturating_sub(zero_distance_comps),
        total_comps,
    )
}
