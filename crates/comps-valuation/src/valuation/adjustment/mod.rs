mod presets;
mod selection;

pub use presets::{
    AdjustmentDirection, AdjustmentPreset, AdjustmentUnit, INFERIOR_CONDITION, SUPERIOR_CONDITION,
};
pub use selection::AdjustmentSet;

use super::domain::{ComparableSale, ValuationError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One adjustment attached to a comp: either a shared preset referenced by name or a
/// free-text entry whose signed amount carries its own direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Adjustment {
    Preset { name: String },
    Custom { label: String, amount: i64 },
}

impl Adjustment {
    pub fn preset(name: impl Into<String>) -> Self {
        Self::Preset { name: name.into() }
    }

    pub fn custom(label: impl Into<String>, amount: i64) -> Self {
        Self::Custom {
            label: label.into(),
            amount,
        }
    }
}

/// Result of folding a comp's adjustments into its base price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub adjusted_value: i64,
    pub currency_delta: f64,
    pub percent_delta: f64,
}

impl AdjustmentOutcome {
    pub fn unadjusted(base_price: i64) -> Self {
        Self {
            adjusted_value: base_price,
            currency_delta: 0.0,
            percent_delta: 0.0,
        }
    }

    pub fn total_adjustment(&self, base_price: i64) -> i64 {
        self.adjusted_value - base_price
    }
}

/// Comparable sale together with the adjustments applied in one valuation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedComparable {
    pub base: ComparableSale,
    pub adjustments: Vec<Adjustment>,
    pub outcome: AdjustmentOutcome,
}

impl AdjustedComparable {
    pub fn unadjusted(base: ComparableSale) -> Self {
        let outcome = AdjustmentOutcome::unadjusted(base.sale_price);
        Self {
            base,
            adjustments: Vec::new(),
            outcome,
        }
    }

    pub fn adjusted_value(&self) -> i64 {
        self.outcome.adjusted_value
    }
}

/// Applies preset and custom adjustments against a fixed preset table.
#[derive(Debug, Clone)]
pub struct AdjustmentEngine {
    presets: Vec<AdjustmentPreset>,
    index: HashMap<String, usize>,
}

impl AdjustmentEngine {
    pub fn new(presets: Vec<AdjustmentPreset>) -> Result<Self, ValuationError> {
        let mut index = HashMap::with_capacity(presets.len());
        for (position, preset) in presets.iter().enumerate() {
            if index.insert(preset.name.clone(), position).is_some() {
                return Err(ValuationError::DuplicatePreset {
                    name: preset.name.clone(),
                });
            }
        }

        Ok(Self { presets, index })
    }

    /// Engine loaded with the built-in preset table.
    pub fn standard() -> Self {
        let presets = presets::standard_presets();
        let index = presets
            .iter()
            .enumerate()
            .map(|(position, preset)| (preset.name.clone(), position))
            .collect();
        Self { presets, index }
    }

    pub fn presets(&self) -> &[AdjustmentPreset] {
        &self.presets
    }

    pub fn preset(&self, name: &str) -> Option<&AdjustmentPreset> {
        self.index.get(name).map(|&position| &self.presets[position])
    }

    pub(crate) fn resolve(&self, name: &str) -> Result<&AdjustmentPreset, ValuationError> {
        self.preset(name).ok_or_else(|| ValuationError::UnknownPreset {
            name: name.to_string(),
        })
    }

    /// Percent adjustments scale the base price first; currency adjustments are added
    /// afterwards and the sum is rounded once.
    ///
    /// Presets behave as a set, so a name listed twice only counts once. Custom
    /// entries with a zero amount are skipped. An unknown preset name fails the whole
    /// computation.
    pub fn compute_adjusted_value(
        &self,
        base_price: i64,
        adjustments: &[Adjustment],
    ) -> Result<AdjustmentOutcome, ValuationError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut percent_delta = 0.0;
        let mut currency_delta = 0.0;

        for adjustment in adjustments {
            match adjustment {
                Adjustment::Preset { name } => {
                    let preset = self.resolve(name)?;
                    if !seen.insert(name.as_str()) {
                        continue;
                    }
                    match preset.unit {
                        AdjustmentUnit::Percent => percent_delta += preset.signed_magnitude(),
                        AdjustmentUnit::Currency => currency_delta += preset.signed_magnitude(),
                    }
                }
                Adjustment::Custom { amount, .. } => {
                    if *amount != 0 {
                        currency_delta += *amount as f64;
                    }
                }
            }
        }

        let after_percent = base_price as f64 * (1.0 + percent_delta / 100.0);
        let adjusted_value = (after_percent + currency_delta).round() as i64;

        debug!(
            base_price,
            percent_delta, currency_delta, adjusted_value, "computed adjusted comparable value"
        );

        Ok(AdjustmentOutcome {
            adjusted_value,
            currency_delta,
            percent_delta,
        })
    }

    pub fn adjust(
        &self,
        base: ComparableSale,
        adjustments: Vec<Adjustment>,
    ) -> Result<AdjustedComparable, ValuationError> {
        let outcome = self.compute_adjusted_value(base.sale_price, &adjustments)?;
        Ok(AdjustedComparable {
            base,
            adjustments,
            outcome,
        })
    }
}

impl Default for AdjustmentEngine {
    fn default() -> Self {
        Self::standard()
    }
}
