//! Nutri MCP Server Implementation
//!
//! Implements the MCP server with all label editing tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::LabelConfig;
use crate::models::{LabelEditor, LABEL_TEMPLATES};
use crate::tools::label;
use crate::tools::status::StatusTracker;

/// Nutri MCP Service
#[derive(Clone)]
pub struct NutriService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    /// The label being edited; locks are held only for the duration of one edit
    editor: Arc<std::sync::Mutex<LabelEditor>>,
    export_dir: PathBuf,
    tool_router: ToolRouter<NutriService>,
}

impl NutriService {
    pub fn new(config: LabelConfig, export_dir: PathBuf) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(export_dir.clone()))),
            editor: Arc::new(std::sync::Mutex::new(LabelEditor::new(LABEL_TEMPLATES[0], config))),
            export_dir,
            tool_router: Self::tool_router(),
        }
    }

    /// Run `f` against the editor under its lock
    fn with_editor<T>(&self, f: impl FnOnce(&mut LabelEditor) -> Result<T, String>) -> Result<T, McpError> {
        let mut editor = self
            .editor
            .lock()
            .map_err(|e| McpError::internal_error(format!("Editor lock poisoned: {}", e), None))?;
        f(&mut *editor).map_err(|e| McpError::internal_error(e, None))
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Label Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectTemplateParams {
    /// Product name: one of list_templates, "Nova Tabela" for a blank table, or any name
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProductNameParams {
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetServingsParams {
    /// Servings per package ("Porções por embalagem"), free text
    pub servings: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetServingSizeParams {
    /// Serving size in grams, up to 4 digits (e.g., "50")
    pub serving_size: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddNutrientParams {
    /// Nutrient name as printed on the label (e.g., "Gorduras monoinsaturadas (g)")
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenameNutrientParams {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetNutrientValueParams {
    pub id: String,
    /// Value per 100 g, up to 5 characters, "," or "." as decimal separator; "" clears it
    pub value: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NutrientIdParams {
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MoveNutrientParams {
    pub id: String,
    /// New parent row id; omit to move to the top level
    pub parent_id: Option<String>,
    /// Position among the new siblings; omit to append
    pub index: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetCollapsedParams {
    pub id: String,
    pub collapsed: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetLayoutParams {
    /// 2 = name + 100 g, 3 = + per serving, 4 = + %VD
    pub columns: Option<u8>,
    pub width_mm: Option<f32>,
    pub height_mm: Option<f32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestNutrientsParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_suggest_limit")]
    pub limit: usize,
}

fn default_suggest_limit() -> usize { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportLabelPdfParams {
    /// Output file; relative paths go under the export directory. Omit for a generated name.
    pub output_path: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadLabelParams {
    /// Label JSON, as in the `label` field of get_label
    pub label_json: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutriService {
    // --- Status ---

    #[tool(description = "Get the current status of the Nutri service including build info, the label being edited, and process information")]
    async fn nutri_status(&self) -> Result<CallToolResult, McpError> {
        let label = self.with_editor(|editor| Ok(editor.snapshot()))?;
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status(&label))
    }

    #[tool(description = "Get step-by-step instructions for building a nutrition facts label. Call this when starting a session or when unsure how to use the label tools.")]
    fn label_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LABEL_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LABEL_INSTRUCTIONS)]))
    }

    // --- Label ---

    #[tool(description = "List the product templates a label can start from")]
    fn list_templates(&self) -> Result<CallToolResult, McpError> {
        json_result(&label::list_templates())
    }

    #[tool(description = "Start a new label for the given product with the standard nutrient rows. Discards the current rows and values.")]
    fn select_template(&self, Parameters(p): Parameters<SelectTemplateParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::select_template(editor, &p.name))?;
        json_result(&result)
    }

    #[tool(description = "Get the current label: product, serving info, layout, and nutrient rows (flat with depth/parentId, and as a tree)")]
    fn get_label(&self) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| Ok(label::get_label(editor)))?;
        json_result(&result)
    }

    #[tool(description = "Render the label as it will be printed: text preview plus every computed cell (per serving, %VD, kJ)")]
    fn preview_label(&self) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| Ok(label::preview_label(editor.label(), editor.config())))?;
        json_result(&result)
    }

    #[tool(description = "Set the product name")]
    fn set_product_name(&self, Parameters(p): Parameters<SetProductNameParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::set_product_name(editor, &p.name))?;
        json_result(&result)
    }

    #[tool(description = "Set the number of servings per package (Porções por embalagem)")]
    fn set_servings(&self, Parameters(p): Parameters<SetServingsParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| Ok(label::set_servings(editor, &p.servings)))?;
        json_result(&result)
    }

    #[tool(description = "Set the serving size in grams (Porção). Non-digits are dropped; at most 4 digits.")]
    fn set_serving_size(&self, Parameters(p): Parameters<SetServingSizeParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::set_serving_size(editor, &p.serving_size))?;
        json_result(&result)
    }

    // --- Nutrients ---

    #[tool(description = "Add a nutrient row. Unit is inferred from the name; sugars and fats nest under their total rows automatically.")]
    fn add_nutrient(&self, Parameters(p): Parameters<AddNutrientParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::add_nutrient(editor, &p.name))?;
        json_result(&result)
    }

    #[tool(description = "Rename a nutrient row. The unit is re-inferred from the new name.")]
    fn rename_nutrient(&self, Parameters(p): Parameters<RenameNutrientParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::rename_nutrient(editor, &p.id, &p.name))?;
        json_result(&result)
    }

    #[tool(description = "Set a nutrient value per 100 g. The kJ value of the energy row is recalculated automatically.")]
    fn set_nutrient_value(&self, Parameters(p): Parameters<SetNutrientValueParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::set_nutrient_value(editor, &p.id, &p.value))?;
        json_result(&result)
    }

    #[tool(description = "Delete a nutrient row and every row nested under it. Returns the deleted ids.")]
    fn delete_nutrient(&self, Parameters(p): Parameters<NutrientIdParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::delete_nutrient(editor, &p.id))?;
        json_result(&result)
    }

    #[tool(description = "Move a nutrient row (with its children) under another row or to the top level, at a given position")]
    fn move_nutrient(&self, Parameters(p): Parameters<MoveNutrientParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::move_nutrient(editor, &p.id, p.parent_id.as_deref(), p.index))?;
        json_result(&result)
    }

    #[tool(description = "Collapse or expand a nutrient row's children in the editor tree")]
    fn set_collapsed(&self, Parameters(p): Parameters<SetCollapsedParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::set_collapsed(editor, &p.id, p.collapsed))?;
        json_result(&result)
    }

    #[tool(description = "Set label layout: number of columns (2-4) and page width/height in millimetres. Omitted fields are unchanged.")]
    fn set_layout(&self, Parameters(p): Parameters<SetLayoutParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::set_layout(editor, p.columns, p.width_mm, p.height_mm))?;
        json_result(&result)
    }

    #[tool(description = "Suggest common nutrient names (with units) matching a query, ignoring case and accents")]
    fn suggest_nutrients(&self, Parameters(p): Parameters<SuggestNutrientsParams>) -> Result<CallToolResult, McpError> {
        json_result(&label::suggest_nutrients(&p.query, p.limit))
    }

    // --- Export ---

    #[tool(description = "Export the label to a PDF file sized to the layout. A failed export leaves the label unchanged.")]
    async fn export_label_pdf(&self, Parameters(p): Parameters<ExportLabelPdfParams>) -> Result<CallToolResult, McpError> {
        let (snapshot, config) = self.with_editor(|editor| Ok((editor.snapshot(), editor.config().clone())))?;
        let export_dir = self.export_dir.clone();

        let result = tokio::task::spawn_blocking(move || {
            label::export_label_pdf(&snapshot, &config, p.output_path.as_deref(), &export_dir)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("Export task failed: {}", e), None))?
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Replace the current label with one given as JSON (the `label` field returned by get_label)")]
    fn load_label(&self, Parameters(p): Parameters<LoadLabelParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_editor(|editor| label::load_label(editor, &p.label_json))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for NutriService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutri".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutri - Informação Nutricional".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutri - Brazilian nutrition facts label (INFORMAÇÃO NUTRICIONAL) editor. \
                 IMPORTANT: Call label_instructions before editing. \
                 Label: list_templates, select_template, get_label, load_label, preview_label. \
                 Product: set_product_name, set_servings, set_serving_size. \
                 Nutrients: add/rename/delete/move_nutrient, set_nutrient_value, set_collapsed, suggest_nutrients. \
                 Output: set_layout, export_label_pdf. Status: nutri_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> NutriService {
        NutriService::new(LabelConfig::default(), std::env::temp_dir())
    }

    #[test]
    fn test_service_starts_with_default_label() {
        let service = service();
        let product = service
            .with_editor(|editor| Ok(editor.label().product_name.clone()))
            .unwrap();
        assert_eq!(product, "Pão de Forma");
    }

    #[test]
    fn test_with_editor_maps_errors() {
        let service = service();
        let result = service.with_editor(|editor| label::set_nutrient_value(editor, "missing", "1"));
        assert!(result.is_err());
    }

    #[test]
    fn test_clones_share_editor() {
        let service = service();
        let clone = service.clone();
        clone
            .with_editor(|editor| label::set_product_name(editor, "Biscoito"))
            .unwrap();
        let product = service
            .with_editor(|editor| Ok(editor.label().product_name.clone()))
            .unwrap();
        assert_eq!(product, "Biscoito");
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();
        assert_eq!(info.server_info.name, "nutri");
        assert!(info.instructions.unwrap().contains("label_instructions"));
    }
}
