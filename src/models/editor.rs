//! Label editor
//!
//! Owns a label and applies user edits to it. Every structural change goes
//! through the tree and is flattened back, so `depth`/`parentId` always match
//! the hierarchy, and every change ends with the kJ recompute step.

use super::label::{Label, LabelError, LayoutOptions, MAX_SERVING_SIZE_LEN};
use super::{NutrientRow, TreeNode};
use crate::config::LabelConfig;
use crate::nutrition::format::validate_value;
use crate::nutrition::hierarchy;
use crate::nutrition::names::{catalog_unit, infer_unit, NutrientRole, Unit};
use crate::nutrition::{EnergyRecompute, EnergyUpdate};

#[derive(Debug, Clone)]
pub struct LabelEditor {
    label: Label,
    config: LabelConfig,
    energy: EnergyRecompute,
    next_id: u64,
}

impl LabelEditor {
    /// Editor for a new label with the standard rows
    pub fn new(product_name: &str, config: LabelConfig) -> Self {
        Self::with_label(Label::new(product_name), config)
    }

    /// Editor for an existing label; rows are normalized on the way in.
    ///
    /// Ids must be unique, since every edit addresses rows by id.
    pub fn from_label(label: Label, config: LabelConfig) -> Result<Self, LabelError> {
        if let Some(id) = label.duplicate_id() {
            return Err(LabelError::DuplicateId(id.to_string()));
        }
        if let Some(extra) = label.nutrients.iter().filter(|n| n.is_energy()).nth(1) {
            tracing::warn!(
                id = %extra.id,
                "Label has more than one energy row; only the first gets a kJ value"
            );
        }
        Ok(Self::with_label(label, config))
    }

    fn with_label(mut label: Label, config: LabelConfig) -> Self {
        label.nutrients = hierarchy::normalize(&label.nutrients);
        let mut editor = Self {
            label,
            config,
            energy: EnergyRecompute::new(),
            next_id: 1,
        };
        editor.refresh_energy();
        editor
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Current rows as a tree
    pub fn tree(&self) -> Vec<TreeNode> {
        hierarchy::to_tree(&self.label.nutrients)
    }

    /// Copy of the label for rendering or export
    pub fn snapshot(&self) -> Label {
        self.label.clone()
    }

    fn refresh_energy(&mut self) -> EnergyUpdate {
        self.energy.apply(&mut self.label.nutrients, &self.config.energy_factors)
    }

    fn commit_tree(&mut self, tree: &[TreeNode]) {
        self.label.nutrients = hierarchy::to_flat(tree);
        self.refresh_energy();
    }

    fn row_mut(&mut self, id: &str) -> Result<&mut NutrientRow, LabelError> {
        self.label
            .nutrients
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| LabelError::NotFound(id.to_string()))
    }

    fn row(&self, id: &str) -> Result<NutrientRow, LabelError> {
        self.label
            .nutrient(id)
            .cloned()
            .ok_or_else(|| LabelError::NotFound(id.to_string()))
    }

    /// Refuse a second energy row; `id` is the row being named, if it exists
    fn check_single_energy(&self, id: Option<&str>, name: &str, unit: &str) -> Result<(), LabelError> {
        if NutrientRole::detect(name, unit) != Some(NutrientRole::Energy) {
            return Ok(());
        }
        match self.label.energy_row() {
            Some(energy) if Some(energy.id.as_str()) != id => {
                Err(LabelError::DuplicateEnergy(energy.id.clone()))
            }
            _ => Ok(()),
        }
    }

    fn generate_id(&mut self) -> String {
        loop {
            let id = format!("item-{}", self.next_id);
            self.next_id += 1;
            if self.label.nutrient(&id).is_none() {
                return id;
            }
        }
    }

    // ------------------------------------------------------------------
    // Label fields
    // ------------------------------------------------------------------

    /// Start over with a fresh table for `product_name` (a template or any name).
    ///
    /// Layout is kept; rows, values and serving info are reset.
    pub fn select_template(&mut self, product_name: &str) -> Result<(), LabelError> {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return Err(LabelError::EmptyProductName);
        }

        let mut label = Label::new(product_name);
        label.layout = self.label.layout;
        label.nutrients = hierarchy::normalize(&label.nutrients);
        self.label = label;
        self.next_id = 1;
        self.energy.invalidate();
        self.refresh_energy();

        tracing::info!(product = %product_name, "Template selected");
        Ok(())
    }

    pub fn set_product_name(&mut self, name: &str) -> Result<(), LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::EmptyProductName);
        }
        self.label.product_name = name.to_string();
        Ok(())
    }

    pub fn set_servings(&mut self, servings: &str) {
        self.label.servings = servings.trim().to_string();
    }

    /// Set the serving size in grams; non-digits are dropped.
    ///
    /// Returns the stored text.
    pub fn set_serving_size(&mut self, input: &str) -> Result<String, LabelError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() > MAX_SERVING_SIZE_LEN {
            return Err(LabelError::InvalidServingSize(input.to_string()));
        }
        self.label.serving_size = digits.clone();
        Ok(digits)
    }

    pub fn set_layout(&mut self, layout: LayoutOptions) -> Result<(), LabelError> {
        layout.validate()?;
        self.label.layout = layout;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    /// Append a nutrient; its unit is inferred from the name (catalog unit, else
    /// grams) and it is nested by name when a parent row exists.
    pub fn add_nutrient(&mut self, name: &str) -> Result<NutrientRow, LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }

        let fallback = catalog_unit(name).unwrap_or(Unit::Gram);
        let unit = infer_unit(name, fallback.as_str());
        self.check_single_energy(None, name, &unit)?;

        let id = self.generate_id();
        self.label.nutrients.push(NutrientRow::new(id.clone(), name, unit));
        self.label.nutrients = hierarchy::normalize(&self.label.nutrients);
        self.refresh_energy();

        tracing::info!(id = %id, name = %name, "Nutrient added");
        self.row(&id)
    }

    /// Rename a nutrient, re-deriving its unit from the new name
    pub fn rename_nutrient(&mut self, id: &str, name: &str) -> Result<NutrientRow, LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }

        let unit = infer_unit(name, &self.row(id)?.unit);
        self.check_single_energy(Some(id), name, &unit)?;

        let row = self.row_mut(id)?;
        row.unit = unit;
        row.name = name.to_string();
        if !row.is_energy() {
            row.kj_value = None;
        }
        self.energy.invalidate();
        self.refresh_energy();

        tracing::info!(id = %id, name = %name, "Nutrient renamed");
        self.row(id)
    }

    /// Store a typed value ("12,5" is stored as "12.5")
    pub fn set_value(&mut self, id: &str, input: &str) -> Result<NutrientRow, LabelError> {
        let stored = validate_value(input).ok_or_else(|| LabelError::InvalidValue {
            id: id.to_string(),
            value: input.to_string(),
        })?;

        self.row_mut(id)?.value = stored;
        if let EnergyUpdate::Updated { kj_value, .. } = self.refresh_energy() {
            tracing::debug!(kj = %kj_value, "Energy row refreshed");
        }
        self.row(id)
    }

    pub fn has_children(&self, id: &str) -> Result<bool, LabelError> {
        let tree = self.tree();
        if hierarchy::find(&tree, id).is_none() {
            return Err(LabelError::NotFound(id.to_string()));
        }
        Ok(hierarchy::has_children(&tree, id))
    }

    /// Delete a nutrient and everything nested under it; returns the removed ids
    pub fn delete_nutrient(&mut self, id: &str) -> Result<Vec<String>, LabelError> {
        let mut tree = self.tree();
        let removed = hierarchy::remove_subtree(&mut tree, id)
            .ok_or_else(|| LabelError::NotFound(id.to_string()))?;
        self.commit_tree(&tree);

        let ids = removed.subtree_ids();
        tracing::info!(id = %id, removed = ids.len(), "Nutrient deleted");
        Ok(ids)
    }

    /// Drag-and-drop: move a nutrient under `parent` (root level when `None`)
    /// at position `index` among its new siblings.
    pub fn move_nutrient(&mut self, id: &str, parent: Option<&str>, index: usize) -> Result<(), LabelError> {
        let mut tree = self.tree();
        hierarchy::move_node(&mut tree, id, parent, index)?;
        self.commit_tree(&tree);
        tracing::info!(id = %id, parent = ?parent, index, "Nutrient moved");
        Ok(())
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) -> Result<(), LabelError> {
        self.row_mut(id)?.collapsed = Some(collapsed);
        Ok(())
    }
}
