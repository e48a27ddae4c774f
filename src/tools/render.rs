//! Label rendering
//!
//! Turns a label into the cells of the printed table. The same `LabelTable`
//! feeds the text preview and the PDF export.

use serde::Serialize;

use crate::config::LabelConfig;
use crate::models::{Label, LayoutOptions, NutrientRow};
use crate::nutrition::format::{to_display, UNKNOWN};
use crate::nutrition::hierarchy::indentation_hint;
use crate::nutrition::{format_or_unknown, parse_decimal, percent_daily_value_text, value_per_serving};

pub const TABLE_TITLE: &str = "INFORMAÇÃO NUTRICIONAL";
pub const FOOTNOTE: &str = "*Percentual de valores diários fornecidos pela porção.";
pub const PER_100_HEADER: &str = "100 g";
pub const DAILY_VALUE_HEADER: &str = "%VD*";

/// Shown instead of an empty servings count or serving size
const PLACEHOLDER: &str = "000";

fn or_placeholder(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        PLACEHOLDER
    } else {
        text
    }
}

/// One rendered nutrient line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelLine {
    pub id: String,
    pub name: String,
    pub indent: usize,
    pub per_100: String,
    pub per_serving: String,
    pub daily_value: String,
}

impl LabelLine {
    fn build(row: &NutrientRow, serving_size: &str, config: &LabelConfig) -> Self {
        let indent = row.depth.unwrap_or_else(|| indentation_hint(&row.name));

        let per_100 = match (&row.kj_value, row.value.trim().is_empty()) {
            (_, true) => UNKNOWN.to_string(),
            (Some(kj), false) if row.is_energy() => format!("{} ({} kJ)", to_display(&row.value), kj),
            _ => to_display(&row.value),
        };

        let per_serving = format_or_unknown(value_per_serving(
            parse_decimal(&row.value),
            parse_decimal(serving_size),
        ));

        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            indent,
            per_100,
            per_serving,
            daily_value: percent_daily_value_text(&config.daily_values, &row.name, &row.value, serving_size),
        }
    }

    /// Cells shown for the given layout, name first
    pub fn cells(&self, layout: &LayoutOptions) -> Vec<&str> {
        let mut cells = vec![self.name.as_str(), self.per_100.as_str()];
        if layout.shows_serving() {
            cells.push(&self.per_serving);
        }
        if layout.shows_daily_value() {
            cells.push(&self.daily_value);
        }
        cells
    }
}

/// Everything printed on the label, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelTable {
    pub product_name: String,
    pub title: String,
    pub servings_line: String,
    pub serving_line: String,
    pub headers: Vec<String>,
    pub lines: Vec<LabelLine>,
    pub footnote: String,
    pub layout: LayoutOptions,
}

impl LabelTable {
    pub fn build(label: &Label, config: &LabelConfig) -> Self {
        let size = or_placeholder(&label.serving_size);

        // Leading empty header sits over the name column
        let mut headers = vec![String::new(), PER_100_HEADER.to_string()];
        if label.layout.shows_serving() {
            headers.push(format!("{} g", size));
        }
        if label.layout.shows_daily_value() {
            headers.push(DAILY_VALUE_HEADER.to_string());
        }

        Self {
            product_name: label.product_name.clone(),
            title: TABLE_TITLE.to_string(),
            servings_line: format!("Porções por embalagem: {} porções", or_placeholder(&label.servings)),
            serving_line: format!("Porção: {} g (medida caseira)", size),
            headers,
            lines: label
                .nutrients
                .iter()
                .map(|row| LabelLine::build(row, &label.serving_size, config))
                .collect(),
            footnote: FOOTNOTE.to_string(),
            layout: label.layout,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn line(&self, id: &str) -> Option<&LabelLine> {
        self.lines.iter().find(|l| l.id == id)
    }
}

// ============================================================================
// Text preview
// ============================================================================

const INDENT_WIDTH: usize = 2;
const VALUE_COLUMN_WIDTH: usize = 16;

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Fixed-width preview of the label, one line per row
pub fn render_text(table: &LabelTable) -> String {
    let name_width = table
        .lines
        .iter()
        .map(|l| l.indent * INDENT_WIDTH + l.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(12)
        + 2;

    let total_width = name_width + VALUE_COLUMN_WIDTH * (table.column_count() - 1);
    let heavy = "=".repeat(total_width);
    let light = "-".repeat(total_width);

    let mut out = Vec::new();
    out.push(table.title.clone());
    out.push(heavy.clone());
    out.push(table.servings_line.clone());
    out.push(table.serving_line.clone());
    out.push(heavy.clone());

    let header: String = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, if i == 0 { name_width } else { VALUE_COLUMN_WIDTH }))
        .collect();
    out.push(header.trim_end().to_string());
    out.push(light.clone());

    for line in &table.lines {
        let cells = line.cells(&table.layout);
        let mut text = pad(
            &format!("{}{}", " ".repeat(line.indent * INDENT_WIDTH), cells[0]),
            name_width,
        );
        for cell in &cells[1..] {
            text.push_str(&pad(cell, VALUE_COLUMN_WIDTH));
        }
        out.push(text.trim_end().to_string());
    }

    out.push(light);
    out.push(table.footnote.clone());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelEditor;

    fn filled_editor() -> LabelEditor {
        let mut editor = LabelEditor::new("Pão de Forma", LabelConfig::default());
        editor.set_serving_size("50").unwrap();
        editor.set_servings("10");
        editor.set_value("1", "250").unwrap();
        editor.set_value("2", "45,5").unwrap();
        editor.set_value("5", "8").unwrap();
        editor.set_value("6", "3").unwrap();
        editor.set_value("10", "480").unwrap();
        editor
    }

    #[test]
    fn test_header_lines() {
        let table = LabelTable::build(&Label::new("X"), &LabelConfig::default());
        assert_eq!(table.title, "INFORMAÇÃO NUTRICIONAL");
        assert_eq!(table.servings_line, "Porções por embalagem: 000 porções");
        assert_eq!(table.serving_line, "Porção: 000 g (medida caseira)");
        assert_eq!(table.headers, vec!["", "100 g", "000 g", "%VD*"]);
        assert_eq!(table.footnote, FOOTNOTE);
    }

    #[test]
    fn test_rows_with_values() {
        let editor = filled_editor();
        let table = LabelTable::build(editor.label(), editor.config());
        assert_eq!(table.headers[2], "50 g");
        assert_eq!(table.servings_line, "Porções por embalagem: 10 porções");

        // 45.5*16.8 + 8*16.8 + 3*37.8 = 1012.2
        let energy = table.line("1").unwrap();
        assert_eq!(energy.per_100, "250 (1012 kJ)");
        assert_eq!(energy.per_serving, "125");
        assert_eq!(energy.daily_value, "6");

        let carbs = table.line("2").unwrap();
        assert_eq!(carbs.per_100, "45,5");
        assert_eq!(carbs.per_serving, "23");
        assert_eq!(carbs.daily_value, "8");

        let protein = table.line("5").unwrap();
        assert_eq!(protein.per_serving, "4,0");

        let sodium = table.line("10").unwrap();
        assert_eq!(sodium.per_serving, "240");
        assert_eq!(sodium.daily_value, "12");
    }

    #[test]
    fn test_unknown_cells() {
        let editor = filled_editor();
        let table = LabelTable::build(editor.label(), editor.config());

        let sugars = table.line("3").unwrap();
        assert_eq!(sugars.indent, 1);
        assert_eq!(sugars.per_100, "-");
        assert_eq!(sugars.per_serving, "-");
        assert_eq!(sugars.daily_value, "-");

        assert_eq!(table.line("4").unwrap().indent, 2);
    }

    #[test]
    fn test_energy_without_kj() {
        let mut label = Label::new("X");
        label.nutrients[0].value = "100".to_string();
        let table = LabelTable::build(&label, &LabelConfig::default());
        assert_eq!(table.line("1").unwrap().per_100, "100");
    }

    #[test]
    fn test_indent_falls_back_to_name() {
        let mut label = Label::new("X");
        label.nutrients = vec![NutrientRow::new("a", "Gorduras saturadas", "g")];
        let table = LabelTable::build(&label, &LabelConfig::default());
        assert_eq!(table.lines[0].indent, 1);
    }

    #[test]
    fn test_columns_follow_layout() {
        let mut label = Label::new("X");
        label.layout.columns = 2;
        let table = LabelTable::build(&label, &LabelConfig::default());
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.lines[0].cells(&table.layout).len(), 2);

        label.layout.columns = 3;
        let table = LabelTable::build(&label, &LabelConfig::default());
        assert_eq!(table.headers, vec!["", "100 g", "000 g"]);
    }

    #[test]
    fn test_render_text() {
        let editor = filled_editor();
        let text = render_text(&LabelTable::build(editor.label(), editor.config()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "INFORMAÇÃO NUTRICIONAL");
        assert!(text.contains("250 (1012 kJ)"));
        assert!(lines.iter().any(|l| l.starts_with("  Açúcares totais (g)")));
        assert!(lines.iter().any(|l| l.starts_with("    Açúcares adicionados (g)")));
        assert_eq!(lines.last(), Some(&FOOTNOTE));
    }
}
