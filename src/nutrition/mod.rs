//! Nutrition label calculations
//!
//! Decimal formatting, daily-value and energy calculations, nutrient names,
//! and the flat/tree hierarchy of label rows.

pub mod daily_value;
pub mod energy;
pub mod format;
pub mod hierarchy;
pub mod names;

pub use daily_value::{
    percent_daily_value, percent_daily_value_text, value_per_serving, DailyValueTable,
};
pub use energy::{energy_kilojoules, EnergyFactors, EnergyRecompute, EnergyUpdate};
pub use format::{format_magnitude, format_or_unknown, parse_decimal, ValueField, ValueInput};
pub use hierarchy::{classify, normalize, to_flat, to_tree, HierarchyError, Placement};
pub use names::{infer_unit, normalize_name, suggestions, NutrientRole, NutrientSuggestion, Unit};
