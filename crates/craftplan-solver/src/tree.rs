//! Tree-shaped plan view.
//!
//! Same solve as the flat graph view, re-shaped for consumers that prefer
//! recursive walking over flat indexing. Recursion is bounded by the
//! current path: re-entering an item already being expanded emits a
//! cycle-placeholder leaf instead of recursing, so naive tree walks always
//! terminate. The real cycle internals remain available through the
//! detected-cycle list.

use crate::flow::FlowSolution;
use crate::graph::DependencyGraph;
use crate::plan::DetectedCycle;
use craftplan_core::id::{FacilityId, ItemId, RecipeId};
use craftplan_core::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One node of the tree view. Values are the aggregate solve results; an
/// item demanded from several branches shows the same figures in each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub item: ItemId,
    /// Producing recipe; `None` for raw materials and placeholders.
    pub recipe: Option<RecipeId>,
    pub facility: Option<FacilityId>,
    pub facility_count: f64,
    /// Production rate in items per minute (demand for raw materials).
    pub rate: f64,
    pub is_raw: bool,
    /// True when this leaf stands in for re-entry into an open cycle.
    pub is_cycle_placeholder: bool,
    pub dependencies: Vec<TreeNode>,
}

/// The tree-shaped plan: one root per target plus the detected cycles.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlanTree {
    pub roots: Vec<TreeNode>,
    pub cycles: Vec<DetectedCycle>,
}

/// Build the tree view from an already-solved flow.
pub fn assemble(
    registry: &Registry,
    graph: &DependencyGraph,
    solution: &FlowSolution,
    cycles: Vec<DetectedCycle>,
    target_order: &[ItemId],
) -> PlanTree {
    let mut path = HashSet::new();
    let roots = target_order
        .iter()
        .map(|&item| build_node(registry, graph, solution, item, &mut path))
        .collect();
    PlanTree { roots, cycles }
}

fn build_node(
    registry: &Registry,
    graph: &DependencyGraph,
    solution: &FlowSolution,
    item: ItemId,
    path: &mut HashSet<ItemId>,
) -> TreeNode {
    if path.contains(&item) {
        // Already open further up this branch: stop and leave a marker.
        return TreeNode {
            item,
            recipe: None,
            facility: None,
            facility_count: 0.0,
            rate: 0.0,
            is_raw: false,
            is_cycle_placeholder: true,
            dependencies: Vec::new(),
        };
    }

    let Some(node) = graph.item(item) else {
        // Unreachable for well-formed graphs; emit an inert leaf.
        return TreeNode {
            item,
            recipe: None,
            facility: None,
            facility_count: 0.0,
            rate: 0.0,
            is_raw: true,
            is_cycle_placeholder: false,
            dependencies: Vec::new(),
        };
    };

    if node.raw || node.producer.is_none() {
        return TreeNode {
            item,
            recipe: None,
            facility: None,
            facility_count: 0.0,
            rate: solution.demand(item),
            is_raw: true,
            is_cycle_placeholder: false,
            dependencies: Vec::new(),
        };
    }

    let recipe = node.producer.unwrap_or(RecipeId(0));
    let count = solution.facility_count(recipe);
    let def = registry.get_recipe(recipe);
    let rate = def.map(|d| d.output_rate(item) * count).unwrap_or(0.0);
    let facility = graph.recipe(recipe).map(|n| n.facility);

    path.insert(item);
    let dependencies = def
        .map(|d| {
            d.inputs
                .iter()
                .map(|e| build_node(registry, graph, solution, e.item, path))
                .collect()
        })
        .unwrap_or_default();
    path.remove(&item);

    TreeNode {
        item,
        recipe: Some(recipe),
        facility,
        facility_count: count,
        rate,
        is_raw: false,
        is_cycle_placeholder: false,
        dependencies,
    }
}
