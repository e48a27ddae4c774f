//! Nutrient names and units
//!
//! Label names carry their unit as an annotation ("Sódio (mg)") and are typed by
//! hand, so every lookup goes through the same normalization: unit annotation
//! dropped, lowercased, accents folded.

use serde::{Deserialize, Serialize};

/// Measurement unit of a nutrient row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "mg")]
    Milligram,
    #[serde(rename = "µg")]
    Microgram,
    #[serde(rename = "kcal")]
    Kilocalorie,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Milligram => "mg",
            Unit::Microgram => "µg",
            Unit::Kilocalorie => "kcal",
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Replace accented Latin letters with their base letter.
pub fn fold_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// The name without its unit annotation: "Açúcares totais (g)" -> "Açúcares totais"
pub fn base_name(name: &str) -> &str {
    match name.find('(') {
        Some(idx) => name[..idx].trim(),
        None => name.trim(),
    }
}

/// Canonical lookup key: base name, lowercased, accents folded, single spaces.
///
/// "Carboídratos(g)", "carboidratos (g)" and "CARBOIDRATOS" all map to "carboidratos".
pub fn normalize_name(name: &str) -> String {
    let folded = fold_diacritics(&base_name(name).to_lowercase());
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased, accent-folded full name (annotation included)
fn folded_full(name: &str) -> String {
    fold_diacritics(&name.to_lowercase())
}

/// Unit implied by the name, falling back to `current`.
///
/// Sodium is labelled in mg and energy in kcal; everything else keeps its unit.
pub fn infer_unit(name: &str, current: &str) -> String {
    let folded = folded_full(name);
    if folded.contains("sodio") {
        Unit::Milligram.as_str().to_string()
    } else if folded.contains("energia") || folded.contains("valor energetico") {
        Unit::Kilocalorie.as_str().to_string()
    } else {
        current.to_string()
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Rows the energy calculation reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientRole {
    Energy,
    Carbohydrate,
    Protein,
    TotalFat,
}

impl NutrientRole {
    /// Detect the role of a row from its name and unit
    pub fn detect(name: &str, unit: &str) -> Option<Self> {
        let folded = folded_full(name);
        if folded.contains("valor energetico") && unit.trim() == "kcal" {
            Some(NutrientRole::Energy)
        } else if folded.contains("carboidrato") {
            Some(NutrientRole::Carbohydrate)
        } else if folded.contains("proteina") {
            Some(NutrientRole::Protein)
        } else if folded.contains("gordura") && folded.contains("totais") {
            Some(NutrientRole::TotalFat)
        } else {
            None
        }
    }
}

// ============================================================================
// Suggestions
// ============================================================================

/// A catalog entry offered while the user types a new nutrient name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NutrientSuggestion {
    pub name: &'static str,
    pub unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
}

const fn plain(name: &'static str, unit: Unit) -> NutrientSuggestion {
    NutrientSuggestion { name, unit, category: None }
}

const fn vitamin(name: &'static str, unit: Unit) -> NutrientSuggestion {
    NutrientSuggestion { name, unit, category: Some("Vitaminas") }
}

const fn mineral(name: &'static str, unit: Unit) -> NutrientSuggestion {
    NutrientSuggestion { name, unit, category: Some("Minerais") }
}

use Unit::{Gram as G, Kilocalorie as KCAL, Microgram as UG, Milligram as MG};

/// Known nutrients, in the order they are offered
pub const NUTRIENT_CATALOG: &[NutrientSuggestion] = &[
    // macronutrients
    plain("Valor energético(kcal)", KCAL),
    plain("Carboidratos(g)", G),
    plain("Proteínas(g)", G),
    // sugars
    plain("Açúcares totais(g)", G),
    plain("Açúcares adicionados(g)", G),
    // fats
    plain("Gorduras totais(g)", G),
    plain("Gorduras saturadas(g)", G),
    plain("Gorduras trans(g)", G),
    plain("Gorduras monoinsaturadas(g)", G),
    plain("Gorduras poli-insaturadas(g)", G),
    // others
    plain("Colesterol(mg)", MG),
    plain("Fibras alimentares(g)", G),
    plain("Sódio(mg)", MG),
    vitamin("Vitamina A(µg)", UG),
    vitamin("Vitamina D(µg)", UG),
    vitamin("Vitamina E(mg)", MG),
    vitamin("Vitamina K(µg)", UG),
    vitamin("Vitamina C(mg)", MG),
    vitamin("Tiamina(mg)", MG),
    vitamin("Riboflavina(mg)", MG),
    vitamin("Niacina(mg)", MG),
    vitamin("Vitamina B6(mg)", MG),
    vitamin("Biotina(µg)", UG),
    vitamin("Ácido fólico(µg)", UG),
    vitamin("Ácido pantotênico(mg)", MG),
    vitamin("Vitamina B12(µg)", UG),
    mineral("Cálcio(mg)", MG),
    mineral("Cloreto(mg)", MG),
    mineral("Cobre(µg)", UG),
    mineral("Cromo(µg)", UG),
    mineral("Ferro(mg)", MG),
    mineral("Flúor(mg)", MG),
    mineral("Fósforo(mg)", MG),
    mineral("Iodo(µg)", UG),
    mineral("Magnésio(mg)", MG),
    mineral("Manganês(mg)", MG),
    mineral("Molibdênio(µg)", UG),
    mineral("Potássio(mg)", MG),
    mineral("Selênio(µg)", UG),
    mineral("Zinco(mg)", MG),
    mineral("Colina(mg)", MG),
];

/// Unit of the catalog entry with the same base name, if any
pub fn catalog_unit(name: &str) -> Option<Unit> {
    let key = normalize_name(name);
    NUTRIENT_CATALOG
        .iter()
        .find(|s| normalize_name(s.name) == key)
        .map(|s| s.unit)
}

/// Catalog entries whose name contains `query`, ignoring case and accents.
///
/// An empty query returns the whole catalog.
pub fn suggestions(query: &str) -> Vec<NutrientSuggestion> {
    let needle = folded_full(query.trim());
    if needle.is_empty() {
        return NUTRIENT_CATALOG.to_vec();
    }

    NUTRIENT_CATALOG
        .iter()
        .filter(|s| folded_full(s.name).contains(&needle))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Açúcares"), "Acucares");
        assert_eq!(fold_diacritics("Sódio"), "Sodio");
        assert_eq!(fold_diacritics("Manganês"), "Manganes");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("Açúcares totais (g)"), "Açúcares totais");
        assert_eq!(base_name("Açúcares totais(g)"), "Açúcares totais");
        assert_eq!(base_name("Sódio"), "Sódio");
    }

    #[test]
    fn test_normalize_name_ignores_cosmetics() {
        assert_eq!(normalize_name("Carboídratos (g)"), "carboidratos");
        assert_eq!(normalize_name("Carboidratos(g)"), "carboidratos");
        assert_eq!(normalize_name("  Gorduras   totais (g)"), "gorduras totais");
    }

    #[test]
    fn test_infer_unit() {
        assert_eq!(infer_unit("Sódio", "g"), "mg");
        assert_eq!(infer_unit("sodio total", "g"), "mg");
        assert_eq!(infer_unit("Valor energético", "g"), "kcal");
        assert_eq!(infer_unit("Energia", "g"), "kcal");
        assert_eq!(infer_unit("Ferro", "mg"), "mg");
        assert_eq!(infer_unit("Proteínas", "g"), "g");
    }

    #[test]
    fn test_detect_roles() {
        assert_eq!(NutrientRole::detect("Valor energético (kcal)", "kcal"), Some(NutrientRole::Energy));
        assert_eq!(NutrientRole::detect("Valor energético (kcal)", "g"), None);
        assert_eq!(NutrientRole::detect("Carboídratos (g)", "g"), Some(NutrientRole::Carbohydrate));
        assert_eq!(NutrientRole::detect("Proteínas (g)", "g"), Some(NutrientRole::Protein));
        assert_eq!(NutrientRole::detect("Gorduras totais (g)", "g"), Some(NutrientRole::TotalFat));
        assert_eq!(NutrientRole::detect("Gorduras saturadas (g)", "g"), None);
    }

    #[test]
    fn test_suggestions_accent_insensitive() {
        let found = suggestions("acucar");
        let names: Vec<_> = found.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Açúcares totais(g)", "Açúcares adicionados(g)"]);

        let vitamins = suggestions("VITAMINA B");
        assert!(vitamins.iter().all(|s| s.category == Some("Vitaminas")));
        assert_eq!(vitamins.len(), 2);
    }

    #[test]
    fn test_suggestions_empty_query_returns_catalog() {
        assert_eq!(suggestions("").len(), NUTRIENT_CATALOG.len());
    }

    #[test]
    fn test_catalog_unit() {
        assert_eq!(catalog_unit("Vitamina A"), Some(Unit::Microgram));
        assert_eq!(catalog_unit("ferro (mg)"), Some(Unit::Milligram));
        assert_eq!(catalog_unit("Vitamina"), None);
    }

    #[test]
    fn test_unit_as_str() {
        assert_eq!(Unit::Microgram.as_str(), "µg");
        assert_eq!(Unit::Kilocalorie.as_str(), "kcal");
    }
}
