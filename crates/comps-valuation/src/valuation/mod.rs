pub mod adjustment;
pub mod avm;
pub mod comparison;
pub mod domain;

pub use adjustment::{
    AdjustedComparable, Adjustment, AdjustmentDirection, AdjustmentEngine, AdjustmentOutcome,
    AdjustmentPreset, AdjustmentSet, AdjustmentUnit, INFERIOR_CONDITION, SUPERIOR_CONDITION,
};
pub use avm::{EstimatorConfig, MarketEstimate, MarketEstimator};
pub use comparison::{
    ComparableView, ComparisonConfig, ComparisonEngine, ComparisonSummary, DeltaDirection,
    DeltaFlags, ValueRange,
};
pub use domain::{ComparableSale, SubjectProperty, ValuationError};
