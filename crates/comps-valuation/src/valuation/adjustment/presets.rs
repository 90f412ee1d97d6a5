use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentDirection {
    Add,
    Subtract,
}

impl AdjustmentDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add Value",
            Self::Subtract => "Subtract Value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentUnit {
    Currency,
    Percent,
}

/// Named, reusable feature adjustment shared by every comp in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentPreset {
    pub name: String,
    pub magnitude: f64,
    pub direction: AdjustmentDirection,
    pub unit: AdjustmentUnit,
}

impl AdjustmentPreset {
    pub fn new(
        name: impl Into<String>,
        magnitude: f64,
        direction: AdjustmentDirection,
        unit: AdjustmentUnit,
    ) -> Self {
        Self {
            name: name.into(),
            magnitude,
            direction,
            unit,
        }
    }

    pub fn signed_magnitude(&self) -> f64 {
        match self.direction {
            AdjustmentDirection::Add => self.magnitude,
            AdjustmentDirection::Subtract => -self.magnitude,
        }
    }
}

pub const SUPERIOR_CONDITION: &str = "Superior Condition (+10%)";
pub const INFERIOR_CONDITION: &str = "Inferior Condition (-10%)";

const STANDARD_PRESETS: &[(&str, f64, AdjustmentDirection, AdjustmentUnit)] = {
    use AdjustmentDirection::{Add, Subtract};
    use AdjustmentUnit::{Currency, Percent};
    &[
        ("Pool", 10_000.0, Add, Currency),
        ("2-Car Garage", 5_000.0, Add, Currency),
        ("3-Car Garage", 8_000.0, Add, Currency),
        ("Recently Renovated", 15_000.0, Add, Currency),
        ("Updated Kitchen", 8_000.0, Add, Currency),
        ("Updated Bathrooms", 5_000.0, Add, Currency),
        ("Finished Basement", 12_000.0, Add, Currency),
        ("Larger Lot (+1000 sqft)", 3_000.0, Add, Currency),
        ("Waterfront", 25_000.0, Add, Currency),
        ("Corner Lot", 2_000.0, Add, Currency),
        ("Needs Major Repairs", 20_000.0, Subtract, Currency),
        ("Needs Roof Replacement", 12_000.0, Subtract, Currency),
        ("Needs HVAC", 8_000.0, Subtract, Currency),
        ("Outdated Interior", 10_000.0, Subtract, Currency),
        ("Smaller Lot (-1000 sqft)", 3_000.0, Subtract, Currency),
        ("Busy Street", 5_000.0, Subtract, Currency),
        (SUPERIOR_CONDITION, 10.0, Add, Percent),
        (INFERIOR_CONDITION, 10.0, Subtract, Percent),
    ]
};

pub(crate) fn standard_presets() -> Vec<AdjustmentPreset> {
    STANDARD_PRESETS
        .iter()
        .map(|&(name, magnitude, direction, unit)| {
            AdjustmentPreset::new(name, magnitude, direction, unit)
        })
        .collect()
}
