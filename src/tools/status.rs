//! Nutri Status Tool
//!
//! Provides runtime status information about the Nutri service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::models::Label;

/// Label editing instructions for AI assistants
pub const LABEL_INSTRUCTIONS: &str = r#"
# Nutri Label Instructions

This guide explains how to build a Brazilian nutrition facts table
("INFORMAÇÃO NUTRICIONAL") with the Nutri tools.

## Overview

A label has:
1. **Product** - name, servings per package ("Porções por embalagem") and serving size in grams ("Porção")
2. **Nutrient rows** - name, value per 100 g/ml, unit, and an optional parent row
3. **Layout** - number of columns (2-4) and page size in millimetres

---

## Starting a Label

- `list_templates` shows the products offered as starting points.
- `select_template` starts over with the standard rows for the given product name.
  Any name works; "Nova Tabela" is the conventional blank table.
- `get_label` returns the current rows with their ids, depth and parent.

The standard rows are:
Valor energético (kcal), Carboidratos (g), Açúcares totais (g), Açúcares adicionados (g),
Proteínas (g), Gorduras totais (g), Gorduras saturadas (g), Gorduras trans (g),
Fibras alimentares (g), Sódio (mg).

---

## Entering Values

**Tool:** `set_nutrient_value`
- Values are per 100 g (or 100 ml) of product.
- Up to 5 characters: digits with at most one decimal separator.
- Use a comma or a dot: `"12,5"` and `"12.5"` are the same value.
- An empty string clears the value; it shows as `-` on the label.

**Tool:** `set_serving_size`
- Whole grams, up to 4 digits. Anything that is not a digit is dropped ("50 g" becomes "50").

The kJ value of the energy row is calculated for you from carbohydrates, proteins and total
fat as soon as the energy value is set. Do not type it.

---

## Adding and Arranging Nutrients

**Tool:** `suggest_nutrients` lists common nutrients (vitamins, minerals, fats...) matching a query.

**Tool:** `add_nutrient`
- The unit is inferred from the name: sodium is mg, energy is kcal, everything else g.
- Rows are nested by name when the parent exists:
  - "Açúcares adicionados" goes under "Açúcares totais"
  - other sugars go under "Açúcares totais", or "Carboidratos" when there is no total sugars row
  - fats go under "Gorduras totais"

**Tool:** `move_nutrient`
- Moves a row (with its children) under another row, or to the top level without a parent.
- `index` is the position among the new siblings; it is clamped to the end.
- A row cannot be moved under itself or its own children.

**Tool:** `delete_nutrient` removes the row and every row nested under it.

---

## Reviewing and Exporting

- `preview_label` shows the label as text, exactly as it will be printed.
- `set_layout`: 2 columns = name + 100 g, 3 = + per serving, 4 = + %VD.
- `export_label_pdf` writes a PDF. Without a path it goes to the export directory
  (`NUTRI_EXPORT_DIR`). A failed export changes nothing; fix the path and retry.
- `load_label` replaces the current label with one given as JSON (the `get_label` format).

%VD is computed per serving against the adult daily reference values. Total sugars and
trans fat have no reference and always show `-`.
"#;

/// Runtime status of the Nutri service
#[derive(Debug, Clone, Serialize)]
pub struct NutriStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Label information
    pub product_name: String,
    pub nutrient_count: usize,
    pub filled_count: usize,
    pub export_dir: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    export_dir: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(export_dir: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            export_dir,
        }
    }

    /// Get the current status
    pub fn get_status(&self, label: &Label) -> NutriStatus {
        let build_info = BuildInfo::current();

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            product_name: label.product_name.clone(),
            nutrient_count: label.nutrients.len(),
            filled_count: label.filled_count(),
            export_dir: self.export_dir.display().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_label() {
        let tracker = StatusTracker::new(PathBuf::from("/tmp/exports"));
        let mut label = Label::new("Suco de Laranja");
        label.nutrients[1].value = "10".to_string();

        let status = tracker.get_status(&label);
        assert_eq!(status.product_name, "Suco de Laranja");
        assert_eq!(status.nutrient_count, 10);
        assert_eq!(status.filled_count, 1);
        assert_eq!(status.export_dir, "/tmp/exports");
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_instructions_name_the_tools() {
        for tool in ["set_nutrient_value", "add_nutrient", "move_nutrient", "export_label_pdf"] {
            assert!(LABEL_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
