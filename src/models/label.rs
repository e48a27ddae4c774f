//! Label model
//!
//! A nutrition table being edited: product, serving info, rows and layout.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::NutrientRow;
use crate::nutrition::HierarchyError;

/// Products offered on the start screen
pub const LABEL_TEMPLATES: &[&str] = &["Pão de Forma", "Biscoito de Polvilho", "Suco de Laranja"];

/// Product name used for a blank table
pub const NEW_LABEL_NAME: &str = "Nova Tabela";

/// Serving size is typed as whole grams, up to 4 digits
pub const MAX_SERVING_SIZE_LEN: usize = 4;

/// Label editing errors
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Nutrient not found: {0}")]
    NotFound(String),

    #[error("Nutrient name cannot be empty")]
    EmptyName,

    #[error("Product name cannot be empty")]
    EmptyProductName,

    #[error("Invalid value {value:?} for nutrient {id}: use up to 5 characters, digits with one optional ',' or '.'")]
    InvalidValue { id: String, value: String },

    #[error("Invalid serving size {0:?}: use up to 4 digits")]
    InvalidServingSize(String),

    #[error("Duplicate nutrient id: {0}")]
    DuplicateId(String),

    #[error("The label already has an energy row ({0})")]
    DuplicateEnergy(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// Table layout options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Columns shown: 2 = name + per 100 g, 3 = + per serving, 4 = + %VD
    pub columns: u8,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl LayoutOptions {
    pub fn validate(&self) -> Result<(), LabelError> {
        if !(2..=4).contains(&self.columns) {
            return Err(LabelError::InvalidLayout(format!(
                "columns must be 2, 3 or 4 (got {})",
                self.columns
            )));
        }
        if !(self.width_mm.is_finite() && self.width_mm > 0.0) {
            return Err(LabelError::InvalidLayout(format!("width must be positive (got {})", self.width_mm)));
        }
        if !(self.height_mm.is_finite() && self.height_mm > 0.0) {
            return Err(LabelError::InvalidLayout(format!("height must be positive (got {})", self.height_mm)));
        }
        Ok(())
    }

    pub fn shows_serving(&self) -> bool {
        self.columns >= 3
    }

    pub fn shows_daily_value(&self) -> bool {
        self.columns >= 4
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            columns: 4,
            width_mm: 60.0,
            height_mm: 60.0,
        }
    }
}

/// A nutrition facts table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub product_name: String,
    /// "Porções por embalagem", free text
    #[serde(default)]
    pub servings: String,
    /// "Porção" in grams, digits only
    #[serde(default)]
    pub serving_size: String,
    #[serde(default)]
    pub nutrients: Vec<NutrientRow>,
    #[serde(default)]
    pub layout: LayoutOptions,
}

impl Label {
    /// A label with the standard rows and no values
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            servings: String::new(),
            serving_size: String::new(),
            nutrients: default_nutrients(),
            layout: LayoutOptions::default(),
        }
    }

    pub fn nutrient(&self, id: &str) -> Option<&NutrientRow> {
        self.nutrients.iter().find(|n| n.id == id)
    }

    pub fn energy_row(&self) -> Option<&NutrientRow> {
        self.nutrients.iter().find(|n| n.is_energy())
    }

    /// First id that appears more than once
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.nutrients
            .iter()
            .find(|n| !seen.insert(n.id.as_str()))
            .map(|n| n.id.as_str())
    }

    /// Rows with a value entered
    pub fn filled_count(&self) -> usize {
        self.nutrients.iter().filter(|n| !n.value.trim().is_empty()).count()
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new(LABEL_TEMPLATES[0])
    }
}

/// Mandatory rows of a Brazilian nutrition table, in display order
pub fn default_nutrients() -> Vec<NutrientRow> {
    [
        ("Valor energético (kcal)", "kcal"),
        ("Carboidratos (g)", "g"),
        ("Açúcares totais (g)", "g"),
        ("Açúcares adicionados (g)", "g"),
        ("Proteínas (g)", "g"),
        ("Gorduras totais (g)", "g"),
        ("Gorduras saturadas (g)", "g"),
        ("Gorduras trans (g)", "g"),
        ("Fibras alimentares (g)", "g"),
        ("Sódio (mg)", "mg"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, unit))| NutrientRow::new((i + 1).to_string(), *name, *unit))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_label_rows() {
        let label = Label::new("Suco de Laranja");
        assert_eq!(label.nutrients.len(), 10);
        assert_eq!(label.nutrients[0].id, "1");
        assert_eq!(label.nutrients[9].id, "10");
        assert_eq!(label.nutrients[9].unit, "mg");
        assert_eq!(label.energy_row().map(|r| r.id.as_str()), Some("1"));
        assert_eq!(label.filled_count(), 0);
    }

    #[test]
    fn test_duplicate_id() {
        let mut label = Label::new("X");
        assert_eq!(label.duplicate_id(), None);
        label.nutrients.push(NutrientRow::new("3", "Ferro", "mg"));
        assert_eq!(label.duplicate_id(), Some("3"));
    }

    #[test]
    fn test_layout_validation() {
        assert!(LayoutOptions::default().validate().is_ok());
        let bad_columns = LayoutOptions { columns: 5, ..Default::default() };
        assert!(matches!(bad_columns.validate(), Err(LabelError::InvalidLayout(_))));
        let bad_width = LayoutOptions { width_mm: 0.0, ..Default::default() };
        assert!(bad_width.validate().is_err());
        let bad_height = LayoutOptions { height_mm: f32::NAN, ..Default::default() };
        assert!(bad_height.validate().is_err());
    }

    #[test]
    fn test_layout_columns() {
        let two = LayoutOptions { columns: 2, ..Default::default() };
        assert!(!two.shows_serving());
        assert!(!two.shows_daily_value());
        let three = LayoutOptions { columns: 3, ..Default::default() };
        assert!(three.shows_serving());
        assert!(!three.shows_daily_value());
        assert!(LayoutOptions::default().shows_daily_value());
    }

    #[test]
    fn test_label_json_uses_camel_case() {
        let label = Label::new("Pão de Forma");
        let json = serde_json::to_value(&label).unwrap();
        assert_eq!(json["productName"], "Pão de Forma");
        assert_eq!(json["layout"]["widthMm"], 60.0);

        let parsed: Label = serde_json::from_str(r#"{"productName": "X", "nutrients": []}"#).unwrap();
        assert_eq!(parsed.layout, LayoutOptions::default());
        assert!(parsed.nutrients.is_empty());
    }
}
