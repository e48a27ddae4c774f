//! Data models
//!
//! Label content (rows, tree nodes, layout) and the editor that mutates it.

mod editor;
mod label;
mod nutrient;

pub use editor::LabelEditor;
pub use label::{
    default_nutrients, Label, LabelError, LayoutOptions, LABEL_TEMPLATES, MAX_SERVING_SIZE_LEN,
    NEW_LABEL_NAME,
};
pub use nutrient::{NutrientRow, TreeNode};
