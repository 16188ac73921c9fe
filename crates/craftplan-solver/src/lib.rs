//! Craftplan Solver -- production-graph planning for crafting games.
//!
//! Given an immutable recipe registry and a set of target output rates, the
//! solver computes the facility counts and material flows needed to sustain
//! them, including exact solutions for production cycles (recipes whose
//! inputs transitively depend on their own outputs).
//!
//! # Solve Pipeline
//!
//! Each call to [`compute_plan`] or [`compute_tree`] runs five phases:
//!
//! 1. **Graph** -- Expand the targets into a bipartite item/recipe
//!    dependency graph, picking one producing recipe per item.
//! 2. **Cycles** -- Find strongly connected components with Tarjan's
//!    algorithm; components larger than a single recipe are cycles.
//! 3. **Condense** -- Collapse each cycle to one node and order the
//!    resulting DAG topologically.
//! 4. **Flow** -- Walk the order in reverse, propagating demand upstream;
//!    plain recipes are sized by ratio, cycles by a linear system.
//! 5. **Assemble** -- Export the flat node/edge plan or the tree view.
//!
//! # Key Types
//!
//! - [`Target`] -- An item and the rate it must be produced at.
//! - [`PlanOptions`] -- Recipe overrides, manual raw markers, and the
//!   recipe-selection policy.
//! - [`ProductionPlan`] -- Flat node/edge result with cycle annotations.
//! - [`PlanTree`] -- Recursive per-target view with cycle placeholders.

pub mod alloc;
pub mod condense;
pub mod error;
pub mod flow;
pub mod graph;
pub mod linear;
pub mod plan;
pub mod scc;
pub mod select;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod tree;

use std::collections::{HashMap, HashSet};

use craftplan_core::id::{ItemId, RecipeId};
use craftplan_core::registry::Registry;

pub use error::{CycleFailure, PlanError};
pub use flow::FlowSolution;
pub use plan::{DetectedCycle, PlanEdge, PlanKey, PlanNode, ProductionPlan};
pub use select::SelectorPolicy;
pub use tree::{PlanTree, TreeNode};

// ---------------------------------------------------------------------------
// Solve inputs
// ---------------------------------------------------------------------------

/// A production target: an item and the rate it must be produced at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub item: ItemId,
    /// Required output rate, items per minute.
    pub rate_per_minute: f64,
}

impl Target {
    pub fn per_minute(item: ItemId, rate_per_minute: f64) -> Self {
        Self {
            item,
            rate_per_minute,
        }
    }
}

/// Options steering graph expansion. The defaults pick the first registered
/// recipe for every item and treat nothing extra as raw.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Recipe-selection policy for items with several producers.
    pub selector: SelectorPolicy,
    /// Per-item recipe overrides; an override beats the selector.
    pub overrides: HashMap<ItemId, RecipeId>,
    /// Items to treat as externally supplied even though a recipe produces
    /// them.
    pub manual_raw: HashSet<ItemId>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Compute the flat production plan for the given targets.
pub fn compute_plan(
    registry: &Registry,
    targets: &[Target],
    options: &PlanOptions,
) -> Result<ProductionPlan, PlanError> {
    if targets.is_empty() {
        return Err(PlanError::EmptyTargets);
    }

    let graph = graph::DependencyGraph::build(registry, targets, options)?;
    tracing::debug!(
        items = graph.item_count(),
        recipes = graph.recipe_count(),
        "dependency graph built"
    );

    let cycles = scc::find_cycles(registry, &graph);
    if !cycles.is_empty() {
        tracing::debug!(count = cycles.len(), "production cycles detected");
    }

    let condensed = condense::CondensedGraph::build(registry, &graph, &cycles);
    let solution = flow::solve(registry, &graph, &cycles, &condensed, targets)?;
    Ok(plan::assemble(registry, &graph, &cycles, &solution))
}

/// Compute the tree-shaped plan for the given targets, one root per target
/// in the order given (duplicates collapse into the first occurrence).
pub fn compute_tree(
    registry: &Registry,
    targets: &[Target],
    options: &PlanOptions,
) -> Result<PlanTree, PlanError> {
    if targets.is_empty() {
        return Err(PlanError::EmptyTargets);
    }

    let graph = graph::DependencyGraph::build(registry, targets, options)?;
    let cycles = scc::find_cycles(registry, &graph);
    let condensed = condense::CondensedGraph::build(registry, &graph, &cycles);
    let solution = flow::solve(registry, &graph, &cycles, &condensed, targets)?;
    let plan = plan::assemble(registry, &graph, &cycles, &solution);

    let mut seen = HashSet::new();
    let target_order: Vec<ItemId> = targets
        .iter()
        .map(|t| t.item)
        .filter(|&item| seen.insert(item))
        .collect();

    Ok(tree::assemble(
        registry,
        &graph,
        &solution,
        plan.cycles,
        &target_order,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use craftplan_core::registry::{RecipeEntry, RegistryBuilder};
    use proptest::prelude::*;

    #[test]
    fn empty_targets_rejected() {
        let reg = chain_registry();
        assert!(matches!(
            compute_plan(&reg, &[], &PlanOptions::default()),
            Err(PlanError::EmptyTargets)
        ));
        assert!(matches!(
            compute_tree(&reg, &[], &PlanOptions::default()),
            Err(PlanError::EmptyTargets)
        ));
    }

    #[test]
    fn single_step_scenario() {
        // B made from raw A, 1:1 at one cycle per second. 60 B/min needs
        // exactly one facility and 60 A/min.
        let mut b = RegistryBuilder::new();
        let a = b.register_item("a", 1);
        let item_b = b.register_item("b", 1);
        let maker = b.register_facility("maker", 30.0);
        b.register_recipe(
            "make_b",
            vec![RecipeEntry {
                item: a,
                amount: 1.0,
            }],
            vec![RecipeEntry {
                item: item_b,
                amount: 1.0,
            }],
            maker,
            1.0,
        );
        b.set_forced_raw("a").unwrap();
        let reg = b.build().unwrap();

        let plan = compute_plan(
            &reg,
            &[Target::per_minute(item_b, 60.0)],
            &PlanOptions::default(),
        )
        .unwrap();
        let recipe = reg.recipe_id("make_b").unwrap();
        assert!((plan.recipe(recipe).unwrap().facility_count - 1.0).abs() < 1e-9);
        assert!((plan.item(a).unwrap().rate - 60.0).abs() < 1e-9);
        assert!(plan.item(a).unwrap().is_raw);
        assert!(plan.item(item_b).unwrap().is_target);
    }

    #[test]
    fn duplicate_targets_collapse_to_one_root() {
        let reg = chain_registry();
        let gear = reg.item_id("gear").unwrap();
        let tree = compute_tree(
            &reg,
            &[Target::per_minute(gear, 15.0), Target::per_minute(gear, 15.0)],
            &PlanOptions::default(),
        )
        .unwrap();
        assert_eq!(tree.roots.len(), 1);
        // Both rates count: 30/min at 15/min per facility.
        assert!((tree.roots[0].facility_count - 2.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn solve_is_linear_in_target_rate(rate in 0.1f64..1000.0) {
            let reg = chain_registry();
            let gear = reg.item_id("gear").unwrap();
            let opts = PlanOptions::default();
            let base = compute_plan(&reg, &[Target::per_minute(gear, rate)], &opts).unwrap();
            let doubled =
                compute_plan(&reg, &[Target::per_minute(gear, 2.0 * rate)], &opts).unwrap();

            for (key, node) in &base.nodes {
                let other = &doubled.nodes[key];
                prop_assert!((other.facility_count - 2.0 * node.facility_count).abs() < 1e-6);
                prop_assert!((other.rate - 2.0 * node.rate).abs() < 1e-6);
            }
        }
    }
}
