//! Energy conversion
//!
//! The kJ figure printed next to the kcal value is derived from the
//! macronutrient rows, not from the kcal value itself.

use serde::{Deserialize, Serialize};

use super::format::parse_decimal;
use super::names::NutrientRole;
use crate::models::NutrientRow;

/// Kilojoules per gram of each energy-bearing macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyFactors {
    pub carbohydrate: f64,
    pub protein: f64,
    pub fat: f64,
}

impl EnergyFactors {
    /// 4 kcal/g and 9 kcal/g at 4.2 kJ/kcal: 16.8 and 37.8 kJ/g
    pub const KCAL_DERIVED: EnergyFactors = EnergyFactors {
        carbohydrate: 16.8,
        protein: 16.8,
        fat: 37.8,
    };

    /// Rounded factors (17 / 17 / 37 kJ/g) seen in later label revisions
    pub const ROUNDED: EnergyFactors = EnergyFactors {
        carbohydrate: 17.0,
        protein: 17.0,
        fat: 37.0,
    };
}

impl Default for EnergyFactors {
    fn default() -> Self {
        Self::KCAL_DERIVED
    }
}

/// Energy in kJ for the given macronutrient grams
pub fn energy_kilojoules(factors: &EnergyFactors, carbs_g: f64, protein_g: f64, fat_g: f64) -> f64 {
    carbs_g * factors.carbohydrate + protein_g * factors.protein + fat_g * factors.fat
}

/// Text cached in `kjValue`: whole kJ, half rounded away from zero
pub fn format_kilojoules(kj: f64) -> String {
    format!("{:.0}", kj.round())
}

/// Raw values the kJ figure depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnergyInputs {
    pub carbohydrate: String,
    pub protein: String,
    pub fat: String,
    pub energy: String,
}

impl EnergyInputs {
    /// Values of the first carbohydrate, protein, total-fat and energy rows
    pub fn collect(rows: &[NutrientRow]) -> Self {
        let value_of = |role: NutrientRole| {
            rows.iter()
                .find(|r| r.role() == Some(role))
                .map(|r| r.value.clone())
                .unwrap_or_default()
        };

        Self {
            carbohydrate: value_of(NutrientRole::Carbohydrate),
            protein: value_of(NutrientRole::Protein),
            fat: value_of(NutrientRole::TotalFat),
            energy: value_of(NutrientRole::Energy),
        }
    }
}

/// Result of one recompute step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnergyUpdate {
    /// Inputs or result identical to last time; nothing written
    Unchanged,
    /// No energy row, energy value unset, or an unparseable input
    Skipped,
    /// `kjValue` of the energy row was rewritten
    Updated { row_id: String, kj_value: String },
}

/// Dependency-tracked kJ recomputation.
///
/// Call [`EnergyRecompute::apply`] after any row mutation; it only does work when
/// one of the inputs changed and only writes when the cached text differs.
#[derive(Debug, Clone, Default)]
pub struct EnergyRecompute {
    last_inputs: Option<EnergyInputs>,
}

impl EnergyRecompute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the tracked inputs so the next `apply` recomputes
    pub fn invalidate(&mut self) {
        self.last_inputs = None;
    }

    pub fn apply(&mut self, rows: &mut [NutrientRow], factors: &EnergyFactors) -> EnergyUpdate {
        let inputs = EnergyInputs::collect(rows);
        if self.last_inputs.as_ref() == Some(&inputs) {
            return EnergyUpdate::Unchanged;
        }
        self.last_inputs = Some(inputs.clone());

        let Some(energy_row) = rows.iter_mut().find(|r| r.is_energy()) else {
            return EnergyUpdate::Skipped;
        };
        if inputs.energy.trim().is_empty() {
            return EnergyUpdate::Skipped;
        }

        // Missing macronutrient rows count as zero, malformed ones abort.
        let grams = |raw: &str| {
            if raw.trim().is_empty() {
                Some(0.0)
            } else {
                parse_decimal(raw)
            }
        };
        let (Some(carbs), Some(protein), Some(fat)) =
            (grams(&inputs.carbohydrate), grams(&inputs.protein), grams(&inputs.fat))
        else {
            tracing::debug!("Skipping kJ recompute: unparseable macronutrient value");
            return EnergyUpdate::Skipped;
        };

        let kj_value = format_kilojoules(energy_kilojoules(factors, carbs, protein, fat));
        if energy_row.kj_value.as_deref() == Some(kj_value.as_str()) {
            return EnergyUpdate::Unchanged;
        }

        tracing::debug!(row = %energy_row.id, kj = %kj_value, "Energy kJ updated");
        energy_row.kj_value = Some(kj_value.clone());
        EnergyUpdate::Updated {
            row_id: energy_row.id.clone(),
            kj_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(carbs: &str, protein: &str, fat: &str, energy: &str) -> Vec<NutrientRow> {
        vec![
            NutrientRow::new("1", "Valor energético (kcal)", "kcal").with_value(energy),
            NutrientRow::new("2", "Carboidratos (g)", "g").with_value(carbs),
            NutrientRow::new("5", "Proteínas (g)", "g").with_value(protein),
            NutrientRow::new("6", "Gorduras totais (g)", "g").with_value(fat),
            NutrientRow::new("7", "Gorduras saturadas (g)", "g").with_value("99"),
        ]
    }

    #[test]
    fn test_energy_kilojoules_default_factors() {
        let kj = energy_kilojoules(&EnergyFactors::default(), 10.0, 5.0, 2.0);
        assert!((kj - (10.0 * 16.8 + 5.0 * 16.8 + 2.0 * 37.8)).abs() < 1e-9);
    }

    #[test]
    fn test_energy_kilojoules_rounded_factors() {
        let kj = energy_kilojoules(&EnergyFactors::ROUNDED, 10.0, 5.0, 2.0);
        assert!((kj - 329.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_writes_kj_on_energy_row() {
        let mut list = rows("10", "5", "2", "120");
        let mut recompute = EnergyRecompute::new();
        let update = recompute.apply(&mut list, &EnergyFactors::default());
        // 168 + 84 + 75.6 = 327.6
        assert_eq!(
            update,
            EnergyUpdate::Updated { row_id: "1".to_string(), kj_value: "328".to_string() }
        );
        assert_eq!(list[0].kj_value.as_deref(), Some("328"));
        assert!(list[1..].iter().all(|r| r.kj_value.is_none()));
    }

    #[test]
    fn test_apply_accepts_decimal_comma() {
        let mut list = rows("10,5", "", "", "50");
        let mut recompute = EnergyRecompute::new();
        recompute.apply(&mut list, &EnergyFactors::default());
        // 10.5 * 16.8 = 176.4
        assert_eq!(list[0].kj_value.as_deref(), Some("176"));
    }

    #[test]
    fn test_apply_skips_when_energy_value_empty() {
        let mut list = rows("10", "5", "2", "");
        let mut recompute = EnergyRecompute::new();
        assert_eq!(recompute.apply(&mut list, &EnergyFactors::default()), EnergyUpdate::Skipped);
        assert!(list[0].kj_value.is_none());
    }

    #[test]
    fn test_apply_skips_unchanged_inputs() {
        let mut list = rows("10", "5", "2", "120");
        let mut recompute = EnergyRecompute::new();
        recompute.apply(&mut list, &EnergyFactors::default());

        // Unrelated row changes do not trigger a recompute.
        list[4].value = "1".to_string();
        list[0].kj_value = Some("stale".to_string());
        assert_eq!(recompute.apply(&mut list, &EnergyFactors::default()), EnergyUpdate::Unchanged);
        assert_eq!(list[0].kj_value.as_deref(), Some("stale"));

        recompute.invalidate();
        assert!(matches!(
            recompute.apply(&mut list, &EnergyFactors::default()),
            EnergyUpdate::Updated { .. }
        ));
    }

    #[test]
    fn test_apply_does_not_rewrite_identical_text() {
        let mut list = rows("10", "5", "2", "120");
        let mut recompute = EnergyRecompute::new();
        recompute.apply(&mut list, &EnergyFactors::default());

        // Energy value changes, kJ result does not.
        list[0].value = "121".to_string();
        assert_eq!(recompute.apply(&mut list, &EnergyFactors::default()), EnergyUpdate::Unchanged);
        assert_eq!(list[0].kj_value.as_deref(), Some("328"));
    }

    #[test]
    fn test_apply_skips_malformed_input() {
        let mut list = rows("1x", "5", "2", "120");
        let mut recompute = EnergyRecompute::new();
        assert_eq!(recompute.apply(&mut list, &EnergyFactors::default()), EnergyUpdate::Skipped);
    }
}
