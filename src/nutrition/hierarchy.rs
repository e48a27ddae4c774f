//! Nutrient hierarchy
//!
//! Converts between the flat row list (authoritative, display order) and the
//! tree used for nesting and reordering. Rows without an explicit position are
//! nested by name ("Açúcares totais" under "Carboidratos", and so on).

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::names::{fold_diacritics, normalize_name};
use crate::models::{NutrientRow, TreeNode};

/// Tree editing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Nutrient not found: {0}")]
    NotFound(String),

    #[error("Cannot move nutrient {id} under {target}: target is inside its own subtree")]
    IntoOwnSubtree { id: String, target: String },
}

// ============================================================================
// Name-based classification
// ============================================================================

/// Where a row belongs in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Root,
    ChildOf(String),
}

#[derive(Debug, Clone, Copy)]
enum ChildMatch {
    Exact(&'static str),
    Contains(&'static str),
}

/// A parent/child naming convention, on normalized names
#[derive(Debug, Clone, Copy)]
pub struct InferenceRule {
    parent: &'static str,
    child: ChildMatch,
}

impl InferenceRule {
    /// Whether `child_key` nests under `parent_key` by this rule
    pub fn matches(&self, child_key: &str, parent_key: &str) -> bool {
        if parent_key != self.parent || child_key == self.parent {
            return false;
        }
        match self.child {
            ChildMatch::Exact(name) => child_key == name,
            ChildMatch::Contains(fragment) => child_key.contains(fragment),
        }
    }
}

/// Rules in priority order; the most specific parent comes first.
pub const INFERENCE_RULES: &[InferenceRule] = &[
    InferenceRule { parent: "acucares totais", child: ChildMatch::Exact("acucares adicionados") },
    InferenceRule { parent: "acucares totais", child: ChildMatch::Contains("acucar") },
    InferenceRule { parent: "gorduras totais", child: ChildMatch::Contains("gordura") },
    InferenceRule { parent: "carboidratos", child: ChildMatch::Contains("acucar") },
];

/// Parent implied by the row's name, if any.
///
/// The first rule that finds a candidate wins; within a rule, the first
/// candidate in list order.
pub fn infer_parent<'a>(row: &NutrientRow, rows: &'a [NutrientRow]) -> Option<&'a NutrientRow> {
    let child_key = normalize_name(&row.name);
    let keys: Vec<String> = rows.iter().map(|r| normalize_name(&r.name)).collect();

    INFERENCE_RULES.iter().find_map(|rule| {
        rows.iter()
            .zip(&keys)
            .find(|(candidate, key)| candidate.id != row.id && rule.matches(&child_key, key))
            .map(|(candidate, _)| candidate)
    })
}

/// Parent encoded by position: the nearest preceding row one level up.
///
/// Saved labels may carry `depth` without `parentId`; in pre-order that is
/// enough to rebuild the tree. `None` when the depths don't line up.
fn parent_by_depth(idx: usize, rows: &[NutrientRow]) -> Option<&NutrientRow> {
    let depth = rows[idx].depth.filter(|d| *d > 0)?;
    let above = rows[..idx]
        .iter()
        .rev()
        .find(|r| r.depth.is_some_and(|d| d < depth))?;
    (above.depth == Some(depth - 1)).then_some(above)
}

/// Placement of the row at `idx` among `rows`.
///
/// An explicit, resolvable `parentId` wins, then the parent implied by
/// `depth`. Rows placed at the root stay there; unplaced rows and rows with
/// inconsistent depths fall back to name inference.
pub fn classify(idx: usize, rows: &[NutrientRow]) -> Placement {
    let row = &rows[idx];
    if let Some(parent_id) = &row.parent_id {
        if parent_id != &row.id && rows.iter().any(|r| &r.id == parent_id) {
            return Placement::ChildOf(parent_id.clone());
        }
        tracing::debug!(row = %row.id, parent = %parent_id, "Dangling parent reference");
    }

    if let Some(parent) = parent_by_depth(idx, rows) {
        return Placement::ChildOf(parent.id.clone());
    }
    if row.depth == Some(0) {
        return Placement::Root;
    }

    match infer_parent(row, rows) {
        Some(parent) => Placement::ChildOf(parent.id.clone()),
        None => Placement::Root,
    }
}

// ============================================================================
// Flat <-> tree
// ============================================================================

/// Whether making `parent` the parent of `child` closes a loop
fn creates_cycle(parents: &[Option<usize>], child: usize, parent: usize) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(parent);

    while let Some(idx) = current {
        if idx == child || !visited.insert(idx) {
            return true;
        }
        current = parents[idx];
    }
    false
}

fn build_node(idx: usize, rows: &[NutrientRow], children: &[Vec<usize>]) -> TreeNode {
    let mut node = TreeNode::from_row(&rows[idx]);
    node.children = children[idx]
        .iter()
        .map(|&child| build_node(child, rows, children))
        .collect();
    node
}

/// Build the tree from the flat list.
///
/// Every row ends up in the tree exactly once; children keep list order.
pub fn to_tree(rows: &[NutrientRow]) -> Vec<TreeNode> {
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        index_of.entry(row.id.as_str()).or_insert(idx);
    }

    let mut parents: Vec<Option<usize>> = vec![None; rows.len()];
    for (idx, row) in rows.iter().enumerate() {
        let Placement::ChildOf(parent_id) = classify(idx, rows) else {
            continue;
        };
        let Some(&parent_idx) = index_of.get(parent_id.as_str()) else {
            continue;
        };

        if parent_idx == idx || creates_cycle(&parents, idx, parent_idx) {
            tracing::warn!(
                row = %row.id,
                parent = %parent_id,
                "Parent link would form a cycle; keeping row at root"
            );
            continue;
        }
        parents[idx] = Some(parent_idx);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots = Vec::new();
    for (idx, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(idx),
            None => roots.push(idx),
        }
    }

    roots
        .into_iter()
        .map(|idx| build_node(idx, rows, &children))
        .collect()
}

fn flatten_into(node: &TreeNode, depth: usize, parent_id: Option<&str>, out: &mut Vec<NutrientRow>) {
    out.push(node.to_row(depth, parent_id));
    for child in &node.children {
        flatten_into(child, depth + 1, Some(&node.id), out);
    }
}

/// Flatten the tree in pre-order, writing `depth` and `parentId` from position
pub fn to_flat(tree: &[TreeNode]) -> Vec<NutrientRow> {
    let mut out = Vec::new();
    for node in tree {
        flatten_into(node, 0, None, &mut out);
    }
    out
}

/// `to_flat(to_tree(rows))`: the rows in tree order with consistent positions
pub fn normalize(rows: &[NutrientRow]) -> Vec<NutrientRow> {
    to_flat(&to_tree(rows))
}

// ============================================================================
// Tree editing
// ============================================================================

pub fn find<'a>(tree: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in tree {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut<'a>(tree: &'a mut [TreeNode], id: &str) -> Option<&'a mut TreeNode> {
    for node in tree.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn has_children(tree: &[TreeNode], id: &str) -> bool {
    find(tree, id).is_some_and(|node| !node.children.is_empty())
}

/// Detach a node together with all its descendants
pub fn remove_subtree(tree: &mut Vec<TreeNode>, id: &str) -> Option<TreeNode> {
    if let Some(pos) = tree.iter().position(|n| n.id == id) {
        return Some(tree.remove(pos));
    }
    tree.iter_mut()
        .find_map(|node| remove_subtree(&mut node.children, id))
}

/// Move a node (with its subtree) under `new_parent`, or to the root level
/// when `None`, at `index` among its new siblings (clamped).
pub fn move_node(
    tree: &mut Vec<TreeNode>,
    id: &str,
    new_parent: Option<&str>,
    index: usize,
) -> Result<(), HierarchyError> {
    let node = find(tree, id).ok_or_else(|| HierarchyError::NotFound(id.to_string()))?;

    if let Some(target) = new_parent {
        if find(std::slice::from_ref(node), target).is_some() {
            return Err(HierarchyError::IntoOwnSubtree {
                id: id.to_string(),
                target: target.to_string(),
            });
        }
        if find(tree, target).is_none() {
            return Err(HierarchyError::NotFound(target.to_string()));
        }
    }

    let node = remove_subtree(tree, id).ok_or_else(|| HierarchyError::NotFound(id.to_string()))?;
    let siblings = match new_parent {
        Some(target) => {
            &mut find_mut(tree, target)
                .ok_or_else(|| HierarchyError::NotFound(target.to_string()))?
                .children
        }
        None => tree,
    };
    let index = index.min(siblings.len());
    siblings.insert(index, node);
    Ok(())
}

/// Set the collapsed flag; false when the id is unknown
pub fn set_collapsed(tree: &mut [TreeNode], id: &str, collapsed: bool) -> bool {
    match find_mut(tree, id) {
        Some(node) => {
            node.collapsed = Some(collapsed);
            true
        }
        None => false,
    }
}

/// Indentation guessed from the name alone, for rows that carry no `depth`
pub fn indentation_hint(name: &str) -> usize {
    let name = fold_diacritics(&name.trim().to_lowercase());

    if name.contains("carboidrato") && !name.contains("fibra") {
        0
    } else if name.contains("acucares totais") {
        1
    } else if name.contains("acucares adicionados") {
        2
    } else if name.contains("gorduras totais") {
        0
    } else if name.contains("gordura") && !name.contains("totais") {
        1
    } else {
        0
    }
}
