//! Nutrient row and tree node
//!
//! The flat row list is the authoritative label content; the tree is the
//! working shape for reordering and nesting.

use serde::{Deserialize, Serialize};

use crate::nutrition::names::NutrientRole;

/// One line of the nutrition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientRow {
    pub id: String,
    pub name: String,
    /// Quantity per 100 g/ml as typed, "" when unset
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Cached kJ equivalent, only ever set on the energy row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kj_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl NutrientRow {
    /// A fresh, unplaced row with no value
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value: String::new(),
            unit: unit.into(),
            depth: None,
            kj_value: None,
            collapsed: None,
            parent_id: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn role(&self) -> Option<NutrientRole> {
        NutrientRole::detect(&self.name, &self.unit)
    }

    pub fn is_energy(&self) -> bool {
        self.role() == Some(NutrientRole::Energy)
    }
}

/// A nutrient in tree form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub value: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kj_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A leaf node carrying the row's payload
    pub fn from_row(row: &NutrientRow) -> Self {
        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            value: row.value.clone(),
            unit: row.unit.clone(),
            kj_value: row.kj_value.clone(),
            collapsed: row.collapsed,
            children: Vec::new(),
        }
    }

    /// The row for this node at the given position
    pub fn to_row(&self, depth: usize, parent_id: Option<&str>) -> NutrientRow {
        NutrientRow {
            id: self.id.clone(),
            name: self.name.clone(),
            value: self.value.clone(),
            unit: self.unit.clone(),
            depth: Some(depth),
            kj_value: self.kj_value.clone(),
            collapsed: self.collapsed,
            parent_id: parent_id.map(str::to_string),
        }
    }

    /// Ids of this node and all its descendants, pre-order
    pub fn subtree_ids(&self) -> Vec<String> {
        let mut ids = vec![self.id.clone()];
        for child in &self.children {
            ids.extend(child.subtree_ids());
        }
        ids
    }
}
