//! Label MCP Tools
//!
//! Tools for editing the nutrition table held by the server.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::export::{default_file_name, export_pdf, ExportLabelResponse};
use super::render::{render_text, LabelTable};
use crate::config::LabelConfig;
use crate::models::{Label, LabelEditor, LayoutOptions, NutrientRow, TreeNode, LABEL_TEMPLATES, NEW_LABEL_NAME};
use crate::nutrition::format::to_display;
use crate::nutrition::{suggestions, NutrientSuggestion};

/// Response for list_templates
#[derive(Debug, Serialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<&'static str>,
    pub blank: &'static str,
}

/// Full label response (get_label, select_template, load_label)
#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub label: Label,
    pub tree: Vec<TreeNode>,
    pub filled_count: usize,
}

impl LabelResponse {
    fn from_editor(editor: &LabelEditor) -> Self {
        Self {
            label: editor.snapshot(),
            tree: editor.tree(),
            filled_count: editor.label().filled_count(),
        }
    }
}

/// Response for preview_label
#[derive(Debug, Serialize)]
pub struct PreviewLabelResponse {
    pub text: String,
    pub table: LabelTable,
}

/// Response for simple field updates
#[derive(Debug, Serialize)]
pub struct UpdateLabelResponse {
    pub success: bool,
    pub message: String,
}

/// A nutrient row after an edit
#[derive(Debug, Serialize)]
pub struct NutrientResponse {
    pub id: String,
    pub name: String,
    pub value: String,
    pub display_value: String,
    pub unit: String,
    pub depth: Option<usize>,
    pub parent_id: Option<String>,
    /// kJ of the energy row, which any value edit may refresh
    pub energy_kj: Option<String>,
}

impl NutrientResponse {
    fn new(row: NutrientRow, editor: &LabelEditor) -> Self {
        Self {
            display_value: to_display(&row.value),
            id: row.id,
            name: row.name,
            value: row.value,
            unit: row.unit,
            depth: row.depth,
            parent_id: row.parent_id,
            energy_kj: editor.label().energy_row().and_then(|r| r.kj_value.clone()),
        }
    }
}

/// Response for delete_nutrient
#[derive(Debug, Serialize)]
pub struct DeleteNutrientResponse {
    pub success: bool,
    pub deleted_ids: Vec<String>,
}

/// Response for set_layout
#[derive(Debug, Serialize)]
pub struct SetLayoutResponse {
    pub success: bool,
    pub layout: LayoutOptions,
}

/// Response for suggest_nutrients
#[derive(Debug, Serialize)]
pub struct SuggestNutrientsResponse {
    pub items: Vec<NutrientSuggestion>,
    pub total: usize,
}

/// Products offered as starting points
pub fn list_templates() -> ListTemplatesResponse {
    ListTemplatesResponse {
        templates: LABEL_TEMPLATES.to_vec(),
        blank: NEW_LABEL_NAME,
    }
}

pub fn select_template(editor: &mut LabelEditor, name: &str) -> Result<LabelResponse, String> {
    editor.select_template(name).map_err(|e| e.to_string())?;
    Ok(LabelResponse::from_editor(editor))
}

pub fn get_label(editor: &LabelEditor) -> LabelResponse {
    LabelResponse::from_editor(editor)
}

/// Replace the label with one given as JSON (the `label` object of get_label)
pub fn load_label(editor: &mut LabelEditor, json: &str) -> Result<LabelResponse, String> {
    let label: Label = serde_json::from_str(json).map_err(|e| format!("Invalid label JSON: {}", e))?;
    if label.product_name.trim().is_empty() {
        return Err("Product name cannot be empty".to_string());
    }
    label
        .layout
        .validate()
        .map_err(|e| e.to_string())?;

    *editor = LabelEditor::from_label(label, editor.config().clone()).map_err(|e| e.to_string())?;
    tracing::info!(product = %editor.label().product_name, rows = editor.label().nutrients.len(), "Label loaded");
    Ok(LabelResponse::from_editor(editor))
}

pub fn preview_label(label: &Label, config: &LabelConfig) -> PreviewLabelResponse {
    let table = LabelTable::build(label, config);
    PreviewLabelResponse {
        text: render_text(&table),
        table,
    }
}

pub fn set_product_name(editor: &mut LabelEditor, name: &str) -> Result<UpdateLabelResponse, String> {
    editor.set_product_name(name).map_err(|e| e.to_string())?;
    Ok(UpdateLabelResponse {
        success: true,
        message: format!("Product name set to {}", editor.label().product_name),
    })
}

pub fn set_servings(editor: &mut LabelEditor, servings: &str) -> UpdateLabelResponse {
    editor.set_servings(servings);
    UpdateLabelResponse {
        success: true,
        message: format!("Servings per package set to {:?}", editor.label().servings),
    }
}

pub fn set_serving_size(editor: &mut LabelEditor, size: &str) -> Result<UpdateLabelResponse, String> {
    let stored = editor.set_serving_size(size).map_err(|e| e.to_string())?;
    Ok(UpdateLabelResponse {
        success: true,
        message: format!("Serving size set to {} g", stored),
    })
}

pub fn add_nutrient(editor: &mut LabelEditor, name: &str) -> Result<NutrientResponse, String> {
    let row = editor
        .add_nutrient(name)
        .map_err(|e| format!("Failed to add nutrient: {}", e))?;
    Ok(NutrientResponse::new(row, editor))
}

pub fn rename_nutrient(editor: &mut LabelEditor, id: &str, name: &str) -> Result<NutrientResponse, String> {
    let row = editor
        .rename_nutrient(id, name)
        .map_err(|e| format!("Failed to rename nutrient: {}", e))?;
    Ok(NutrientResponse::new(row, editor))
}

pub fn set_nutrient_value(editor: &mut LabelEditor, id: &str, value: &str) -> Result<NutrientResponse, String> {
    let row = editor.set_value(id, value).map_err(|e| e.to_string())?;
    Ok(NutrientResponse::new(row, editor))
}

pub fn delete_nutrient(editor: &mut LabelEditor, id: &str) -> Result<DeleteNutrientResponse, String> {
    let deleted_ids = editor
        .delete_nutrient(id)
        .map_err(|e| format!("Failed to delete nutrient: {}", e))?;
    Ok(DeleteNutrientResponse {
        success: true,
        deleted_ids,
    })
}

pub fn move_nutrient(
    editor: &mut LabelEditor,
    id: &str,
    parent_id: Option<&str>,
    index: Option<usize>,
) -> Result<NutrientResponse, String> {
    // No index means "append"; the hierarchy clamps it
    let index = index.unwrap_or(usize::MAX);
    let parent_id = parent_id.map(str::trim).filter(|p| !p.is_empty());

    editor
        .move_nutrient(id, parent_id, index)
        .map_err(|e| format!("Failed to move nutrient: {}", e))?;
    let row = editor
        .label()
        .nutrient(id)
        .cloned()
        .ok_or_else(|| format!("Nutrient not found: {}", id))?;
    Ok(NutrientResponse::new(row, editor))
}

pub fn set_collapsed(editor: &mut LabelEditor, id: &str, collapsed: bool) -> Result<UpdateLabelResponse, String> {
    editor.set_collapsed(id, collapsed).map_err(|e| e.to_string())?;
    Ok(UpdateLabelResponse {
        success: true,
        message: format!("Nutrient {} {}", id, if collapsed { "collapsed" } else { "expanded" }),
    })
}

/// Update the layout; omitted fields keep their current value
pub fn set_layout(
    editor: &mut LabelEditor,
    columns: Option<u8>,
    width_mm: Option<f32>,
    height_mm: Option<f32>,
) -> Result<SetLayoutResponse, String> {
    let current = editor.label().layout;
    let layout = LayoutOptions {
        columns: columns.unwrap_or(current.columns),
        width_mm: width_mm.unwrap_or(current.width_mm),
        height_mm: height_mm.unwrap_or(current.height_mm),
    };
    editor.set_layout(layout).map_err(|e| e.to_string())?;
    Ok(SetLayoutResponse { success: true, layout })
}

pub fn suggest_nutrients(query: &str, limit: usize) -> SuggestNutrientsResponse {
    let limit = limit.clamp(1, 100);
    let mut items = suggestions(query);
    items.truncate(limit);
    let total = items.len();
    SuggestNutrientsResponse { items, total }
}

/// Export a snapshot of the label; relative paths resolve under the export dir
pub fn export_label_pdf(
    label: &Label,
    config: &LabelConfig,
    output_path: Option<&str>,
    export_dir: &Path,
) -> Result<ExportLabelResponse, String> {
    let path = match output_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => {
            let p = PathBuf::from(p);
            if p.is_absolute() {
                p
            } else {
                export_dir.join(p)
            }
        }
        None => export_dir.join(default_file_name(&label.product_name)),
    };

    let table = LabelTable::build(label, config);
    export_pdf(&table, &path).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Label export failed");
        format!("Failed to export label to {}: {}", path.display(), e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> LabelEditor {
        LabelEditor::new("Pão de Forma", LabelConfig::default())
    }

    #[test]
    fn test_list_templates() {
        let response = list_templates();
        assert_eq!(response.templates.len(), 3);
        assert_eq!(response.blank, "Nova Tabela");
    }

    #[test]
    fn test_set_value_reports_energy() {
        let mut editor = editor();
        set_nutrient_value(&mut editor, "2", "10").unwrap();
        set_nutrient_value(&mut editor, "5", "5").unwrap();
        set_nutrient_value(&mut editor, "6", "2").unwrap();
        let response = set_nutrient_value(&mut editor, "1", "120").unwrap();
        assert_eq!(response.energy_kj.as_deref(), Some("328"));

        let response = set_nutrient_value(&mut editor, "2", "12.5").unwrap();
        assert_eq!(response.display_value, "12,5");

        let err = set_nutrient_value(&mut editor, "2", "abc").unwrap_err();
        assert!(err.contains("Invalid value"));
    }

    #[test]
    fn test_move_without_index_appends() {
        let mut editor = editor();
        let response = move_nutrient(&mut editor, "9", Some("2"), None).unwrap();
        assert_eq!(response.parent_id.as_deref(), Some("2"));
        assert_eq!(response.depth, Some(1));

        let response = move_nutrient(&mut editor, "9", Some("  "), Some(0)).unwrap();
        assert_eq!(response.parent_id, None);
        assert_eq!(editor.label().nutrients[0].id, "9");
    }

    #[test]
    fn test_set_layout_partial() {
        let mut editor = editor();
        let response = set_layout(&mut editor, Some(3), None, Some(90.0)).unwrap();
        assert_eq!(response.layout.columns, 3);
        assert_eq!(response.layout.width_mm, 60.0);
        assert_eq!(response.layout.height_mm, 90.0);
        assert!(set_layout(&mut editor, Some(7), None, None).is_err());
    }

    #[test]
    fn test_load_label_round_trip() {
        let mut source = editor();
        source.set_value("2", "40").unwrap();
        source.move_nutrient("9", None, 0).unwrap();
        let json = serde_json::to_string(&get_label(&source).label).unwrap();

        let mut target = LabelEditor::new("Outro", LabelConfig::default());
        let response = load_label(&mut target, &json).unwrap();
        assert_eq!(response.label, source.snapshot());
        assert_eq!(response.filled_count, 1);

        assert!(load_label(&mut target, "{").is_err());
        assert!(load_label(&mut target, r#"{"productName": " "}"#).is_err());
        assert_eq!(target.label().product_name, "Pão de Forma");
    }

    #[test]
    fn test_load_label_rejects_duplicate_ids() {
        let mut editor = editor();
        let json = r#"{"productName": "X", "nutrients": [
            {"id": "1", "name": "Carboidratos (g)", "unit": "g"},
            {"id": "1", "name": "Sódio (mg)", "unit": "mg"}
        ]}"#;
        let err = load_label(&mut editor, json).unwrap_err();
        assert!(err.contains("Duplicate nutrient id: 1"));
        assert_eq!(editor.label().product_name, "Pão de Forma");
        assert_eq!(editor.label().nutrients.len(), 10);
    }

    #[test]
    fn test_load_label_depth_only_rows() {
        let mut editor = editor();
        let json = r#"{"productName": "Biscoito", "nutrients": [
            {"id": "1", "name": "Gorduras totais (g)", "value": "3", "unit": "g", "depth": 0},
            {"id": "2", "name": "Ômega 3 (mg)", "value": "", "unit": "mg", "depth": 1},
            {"id": "3", "name": "Sódio (mg)", "value": "", "unit": "mg", "depth": 0}
        ]}"#;
        let response = load_label(&mut editor, json).unwrap();
        assert_eq!(response.tree.len(), 2);
        assert_eq!(response.tree[0].children[0].id, "2");
        assert_eq!(response.label.nutrients[1].parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_suggest_nutrients_limit() {
        assert_eq!(suggest_nutrients("vitamina", 3).total, 3);
        assert_eq!(suggest_nutrients("", 0).total, 1);
    }

    #[test]
    fn test_preview_label() {
        let editor = editor();
        let response = preview_label(editor.label(), editor.config());
        assert!(response.text.starts_with("INFORMAÇÃO NUTRICIONAL"));
        assert_eq!(response.table.lines.len(), 10);
    }

    #[test]
    fn test_failed_export_leaves_label_untouched() {
        let editor = editor();
        let before = editor.snapshot();
        let dir = std::env::temp_dir().join(format!("nutri-tools-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("taken")).unwrap();

        let err = export_label_pdf(editor.label(), editor.config(), Some("taken"), &dir).unwrap_err();
        assert!(err.contains("Failed to export"));
        assert_eq!(editor.snapshot(), before);

        let ok = export_label_pdf(editor.label(), editor.config(), None, &dir).unwrap();
        assert!(ok.file_path.ends_with(".pdf"));
        let _ = std::fs::remove_file(&ok.file_path);
    }
}
