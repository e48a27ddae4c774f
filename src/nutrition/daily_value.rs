//! Daily reference values and per-serving quantities
//!
//! %VD = (value per serving / daily reference) * 100, rounded to a whole number.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::format::{parse_decimal, UNKNOWN};
use super::names::normalize_name;

/// Daily reference intake per nutrient, keyed by normalized name.
///
/// Nutrients without an entry have no %VD on the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct DailyValueTable {
    entries: BTreeMap<String, f64>,
}

impl DailyValueTable {
    pub fn empty() -> Self {
        Self { entries: BTreeMap::new() }
    }

    /// Brazilian adult reference values (2000 kcal diet).
    ///
    /// Total sugars and trans fat carry no %VD and are left out on purpose.
    pub fn brazil() -> Self {
        Self::empty()
            .with("Valor energético (kcal)", 2000.0)
            .with("Carboidratos (g)", 300.0)
            .with("Açúcares adicionados (g)", 50.0)
            .with("Proteínas (g)", 50.0)
            .with("Gorduras totais (g)", 65.0)
            .with("Gorduras saturadas (g)", 20.0)
            .with("Fibras alimentares (g)", 25.0)
            .with("Sódio (mg)", 2000.0)
    }

    pub fn with(mut self, name: &str, reference: f64) -> Self {
        self.insert(name, reference);
        self
    }

    pub fn insert(&mut self, name: &str, reference: f64) {
        self.entries.insert(normalize_name(name), reference);
    }

    /// Reference quantity for a label name, tolerant of spacing, case and accents
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.get(&normalize_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DailyValueTable {
    fn default() -> Self {
        Self::brazil()
    }
}

impl From<BTreeMap<String, f64>> for DailyValueTable {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let mut table = Self::empty();
        for (name, reference) in raw {
            table.insert(&name, reference);
        }
        table
    }
}

impl From<DailyValueTable> for BTreeMap<String, f64> {
    fn from(table: DailyValueTable) -> Self {
        table.entries
    }
}

/// Quantity in one serving of `serving_grams`, from the per-100 value
pub fn value_per_serving(per_100: Option<f64>, serving_grams: Option<f64>) -> Option<f64> {
    match (per_100, serving_grams) {
        (Some(value), Some(serving)) if value.is_finite() && serving.is_finite() => {
            Some(value * serving / 100.0)
        }
        _ => None,
    }
}

/// Percent of the daily reference provided by one serving.
///
/// `None` when the nutrient has no reference or either input is unknown.
pub fn percent_daily_value(
    table: &DailyValueTable,
    name: &str,
    per_100: Option<f64>,
    serving_grams: Option<f64>,
) -> Option<i64> {
    let reference = table.get(name).filter(|r| *r > 0.0)?;
    let per_serving = value_per_serving(per_100, serving_grams)?;
    let percent = (per_serving / reference * 100.0).round();
    percent.is_finite().then_some(percent as i64)
}

/// %VD cell text for raw row strings; "-" when unknown
pub fn percent_daily_value_text(
    table: &DailyValueTable,
    name: &str,
    value: &str,
    serving_size: &str,
) -> String {
    percent_daily_value(table, name, parse_decimal(value), parse_decimal(serving_size))
        .map(|p| p.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
