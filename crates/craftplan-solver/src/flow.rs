//! Demand propagation and facility-count solving.
//!
//! Walks the condensed order in reverse (consumers before producers), each
//! step pushing demand upstream onto its inputs. Plain recipe nodes are a
//! direct ratio computation; cycle nodes solve a linear system for the
//! facility counts that balance internal production and consumption against
//! the cycle's net external demand.

use crate::condense::{CondensedGraph, CondensedNode};
use crate::error::{CycleFailure, PlanError};
use crate::graph::DependencyGraph;
use crate::linear;
use crate::scc::Scc;
use crate::Target;
use craftplan_core::id::{ItemId, RecipeId};
use craftplan_core::registry::Registry;
use std::collections::HashMap;

/// Demand below this is treated as zero.
const DEMAND_EPS: f64 = 1e-9;

/// Solved facility counts this far below zero are floating-point noise and
/// clamp to zero; anything beyond is an infeasible cycle.
const NEGATIVE_TOLERANCE: f64 = 1e-6;

/// The solved material flow: aggregate item demands and facility counts.
#[derive(Debug, Default)]
pub struct FlowSolution {
    /// Aggregate demand per item, items per minute.
    pub item_demand: HashMap<ItemId, f64>,
    /// Solved (possibly fractional) facility count per recipe.
    pub facility_counts: HashMap<RecipeId, f64>,
}

impl FlowSolution {
    pub fn demand(&self, item: ItemId) -> f64 {
        self.item_demand.get(&item).copied().unwrap_or(0.0)
    }

    pub fn facility_count(&self, recipe: RecipeId) -> f64 {
        self.facility_counts.get(&recipe).copied().unwrap_or(0.0)
    }
}

/// Propagate target demand through the condensed order and solve every
/// facility count.
pub fn solve(
    registry: &Registry,
    graph: &DependencyGraph,
    cycles: &[Scc],
    condensed: &CondensedGraph,
    targets: &[Target],
) -> Result<FlowSolution, PlanError> {
    let mut solution = FlowSolution::default();
    for target in targets {
        *solution.item_demand.entry(target.item).or_insert(0.0) += target.rate_per_minute;
    }

    for node in condensed.topological_order().rev() {
        match node {
            // Items accumulate demand passively as their consumers resolve.
            CondensedNode::Item(_) => {}
            CondensedNode::Recipe(recipe) => {
                solve_recipe(registry, graph, &mut solution, recipe)?
            }
            CondensedNode::Cycle(idx) => solve_cycle(registry, &mut solution, &cycles[idx])?,
        }
    }

    tracing::debug!(
        items = solution.item_demand.len(),
        recipes = solution.facility_counts.len(),
        "flow solve complete"
    );
    Ok(solution)
}

/// Plain recipe: facility count is the max, over the outputs this recipe
/// was selected to produce, of demand divided by per-facility net output
/// rate. Inputs then receive the recipe's net consumption as additional
/// demand.
fn solve_recipe(
    registry: &Registry,
    graph: &DependencyGraph,
    solution: &mut FlowSolution,
    recipe: RecipeId,
) -> Result<(), PlanError> {
    let Some(def) = registry.get_recipe(recipe) else {
        return Ok(());
    };

    let mut count: f64 = 0.0;
    for entry in &def.outputs {
        // Co-outputs with a different selected producer are surplus here;
        // their demand is sized against that producer.
        if graph.item(entry.item).and_then(|n| n.producer) != Some(recipe) {
            continue;
        }
        let demanded = solution.demand(entry.item);
        if demanded <= DEMAND_EPS {
            continue;
        }
        // The net rate only differs from the gross rate for a recipe that
        // consumes some of its own output.
        let net_rate = def.output_rate(entry.item) - def.input_rate(entry.item);
        if net_rate <= DEMAND_EPS {
            return Err(PlanError::SelfConsuming {
                recipe,
                item: entry.item,
            });
        }
        count = count.max(demanded / net_rate);
    }
    solution.facility_counts.insert(recipe, count);

    if count > 0.0 {
        for entry in &def.inputs {
            // A co-produced input nets out only up to the produced amount;
            // net consumption still pulls demand upstream.
            let net_rate = def.input_rate(entry.item) - def.output_rate(entry.item);
            if net_rate <= DEMAND_EPS {
                continue;
            }
            *solution.item_demand.entry(entry.item).or_insert(0.0) += net_rate * count;
        }
    }
    Ok(())
}

/// Cycle: build one balance equation per member item and solve the square
/// system for exact facility counts, then push the external inputs' demand
/// upstream with the now-known counts.
fn solve_cycle(
    registry: &Registry,
    solution: &mut FlowSolution,
    scc: &Scc,
) -> Result<(), PlanError> {
    // Consumers outside the cycle (and explicit targets) have already
    // deposited their pulls; nothing internal has run yet, so the current
    // demand on a member item is exactly its net external demand.
    let external: Vec<f64> = scc.items.iter().map(|&i| solution.demand(i)).collect();
    let total: f64 = external.iter().sum();
    if total <= DEMAND_EPS {
        // Nothing exported: the cycle needs no facilities at all.
        for &recipe in &scc.recipes {
            solution.facility_counts.insert(recipe, 0.0);
        }
        return Ok(());
    }

    if scc.items.len() != scc.recipes.len() {
        let reason = CycleFailure::NonSquare {
            items: scc.items.len(),
            recipes: scc.recipes.len(),
        };
        tracing::warn!(items = ?scc.items, %reason, "production cycle unsolvable");
        return Err(PlanError::CycleUnsolvable {
            items: scc.items.clone(),
            reason,
        });
    }

    let defs: Vec<_> = scc
        .recipes
        .iter()
        .filter_map(|&r| registry.get_recipe(r))
        .collect();
    let matrix: Vec<Vec<f64>> = scc
        .items
        .iter()
        .map(|&item| {
            defs.iter()
                .map(|def| def.output_rate(item) - def.input_rate(item))
                .collect()
        })
        .collect();

    let Some(solved) = linear::solve(&matrix, &external) else {
        tracing::warn!(items = ?scc.items, "production cycle balance system is singular");
        return Err(PlanError::CycleUnsolvable {
            items: scc.items.clone(),
            reason: CycleFailure::Singular,
        });
    };

    for (&recipe, &count) in scc.recipes.iter().zip(&solved) {
        if count < -NEGATIVE_TOLERANCE {
            let reason = CycleFailure::NegativeCount { recipe, count };
            tracing::warn!(items = ?scc.items, %reason, "production cycle infeasible");
            return Err(PlanError::CycleUnsolvable {
                items: scc.items.clone(),
                reason,
            });
        }
        solution.facility_counts.insert(recipe, count.max(0.0));
    }

    // External inputs get their demand propagated exactly as in the plain
    // recipe case, now that the counts are known.
    for &recipe in &scc.recipes {
        let count = solution.facility_count(recipe);
        if count <= 0.0 {
            continue;
        }
        let Some(def) = registry.get_recipe(recipe) else {
            continue;
        };
        for entry in &def.inputs {
            if scc.contains_item(entry.item) {
                continue;
            }
            let net_rate = def.input_rate(entry.item) - def.output_rate(entry.item);
            if net_rate <= DEMAND_EPS {
                continue;
            }
            *solution.item_demand.entry(entry.item).or_insert(0.0) += net_rate * count;
        }
    }
    Ok(())
}
