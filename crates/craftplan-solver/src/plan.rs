//! Production-plan assembly.
//!
//! Turns the solved item demands and facility counts into the externally
//! visible node/edge structure consumed by presentation layers. Nodes are
//! keyed by item or recipe; detected cycles are exported with their member
//! lists and net per-item output.

use crate::flow::FlowSolution;
use crate::graph::DependencyGraph;
use crate::scc::Scc;
use craftplan_core::id::{FacilityId, ItemId, RecipeId};
use craftplan_core::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Key for a node in the production plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanKey {
    Item(ItemId),
    Recipe(RecipeId),
}

/// One node of the solved production plan.
///
/// Facility counts are continuous throughput figures; splitting them into
/// discrete units is left to [`crate::alloc`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanNode {
    pub key: PlanKey,
    /// Facility the recipe runs in (recipe nodes only).
    pub facility: Option<FacilityId>,
    /// Fractional facility count required to sustain the flow. For item
    /// nodes this is the count of the producing recipe.
    pub facility_count: f64,
    /// Item nodes: production rate in items per minute (demand for raw
    /// items). Recipe nodes: crafting cycles per minute.
    pub rate: f64,
    pub is_target: bool,
    pub is_raw: bool,
}

/// A directed edge of the plan: consumption (item to recipe) or production
/// (recipe to item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEdge {
    pub from: PlanKey,
    pub to: PlanKey,
}

/// An exported production cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedCycle {
    pub id: usize,
    /// Member items in discovery order.
    pub items: Vec<ItemId>,
    /// Member recipes in discovery order.
    pub recipes: Vec<RecipeId>,
    /// The item where tree-shaped consumers stop recursing and insert a
    /// placeholder. First member in discovery order; presentation only.
    pub break_item: ItemId,
    /// The member nodes with their solved counts and rates, items before
    /// recipes. Lets tree-view consumers show the cycle internals without
    /// the flat node map.
    pub nodes: Vec<PlanNode>,
    /// Net output per member item (production minus internal consumption),
    /// items per minute. Near-zero for items fully internal to the cycle.
    pub net_output: HashMap<ItemId, f64>,
}

/// The full solved plan: flat node/edge graph plus cycle annotations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductionPlan {
    /// Item- and recipe-keyed nodes. Serialized as a flat node list since
    /// every node carries its own key.
    #[serde(with = "node_map")]
    pub nodes: HashMap<PlanKey, PlanNode>,
    pub edges: Vec<PlanEdge>,
    pub targets: HashSet<ItemId>,
    pub cycles: Vec<DetectedCycle>,
}

mod node_map {
    use super::{PlanKey, PlanNode};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S: Serializer>(
        map: &HashMap<PlanKey, PlanNode>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut nodes: Vec<&PlanNode> = map.values().collect();
        nodes.sort_by_key(|n| n.key_sort_order());
        nodes.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<PlanKey, PlanNode>, D::Error> {
        let nodes = Vec::<PlanNode>::deserialize(deserializer)?;
        Ok(nodes.into_iter().map(|n| (n.key, n)).collect())
    }
}

impl PlanNode {
    fn key_sort_order(&self) -> (u8, u32) {
        match self.key {
            PlanKey::Item(id) => (0, id.0),
            PlanKey::Recipe(id) => (1, id.0),
        }
    }
}

impl ProductionPlan {
    pub fn item(&self, id: ItemId) -> Option<&PlanNode> {
        self.nodes.get(&PlanKey::Item(id))
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&PlanNode> {
        self.nodes.get(&PlanKey::Recipe(id))
    }

    /// Total power draw in kW across all facilities in the plan.
    pub fn total_power(&self, registry: &Registry) -> f64 {
        self.nodes
            .values()
            .filter_map(|node| {
                let facility = node.facility?;
                let power = registry.get_facility(facility)?.power;
                Some(node.facility_count * power)
            })
            .sum()
    }
}

/// Assemble the exported plan from the solved flow.
pub fn assemble(
    registry: &Registry,
    graph: &DependencyGraph,
    cycles: &[Scc],
    solution: &FlowSolution,
) -> ProductionPlan {
    let mut nodes = HashMap::new();
    let mut edges = Vec::new();

    // Gross production per item across every recipe in the plan.
    let mut production: HashMap<ItemId, f64> = HashMap::new();
    for node in graph.recipes() {
        let count = solution.facility_count(node.recipe);
        if let Some(def) = registry.get_recipe(node.recipe) {
            for entry in &def.outputs {
                if graph.contains_item(entry.item) {
                    *production.entry(entry.item).or_insert(0.0) +=
                        def.output_rate(entry.item) * count;
                }
            }
        }
    }

    for item_node in graph.items() {
        let rate = if item_node.raw {
            solution.demand(item_node.item)
        } else {
            production.get(&item_node.item).copied().unwrap_or(0.0)
        };
        let facility_count = item_node
            .producer
            .map(|r| solution.facility_count(r))
            .unwrap_or(0.0);
        nodes.insert(
            PlanKey::Item(item_node.item),
            PlanNode {
                key: PlanKey::Item(item_node.item),
                facility: None,
                facility_count,
                rate,
                is_target: graph.is_target(item_node.item),
                is_raw: item_node.raw,
            },
        );
        for &consumer in &item_node.consumers {
            edges.push(PlanEdge {
                from: PlanKey::Item(item_node.item),
                to: PlanKey::Recipe(consumer),
            });
        }
    }

    for recipe_node in graph.recipes() {
        let count = solution.facility_count(recipe_node.recipe);
        let cycles_per_minute = registry
            .get_recipe(recipe_node.recipe)
            .map(|def| count * 60.0 / def.craft_seconds)
            .unwrap_or(0.0);
        nodes.insert(
            PlanKey::Recipe(recipe_node.recipe),
            PlanNode {
                key: PlanKey::Recipe(recipe_node.recipe),
                facility: Some(recipe_node.facility),
                facility_count: count,
                rate: cycles_per_minute,
                is_target: false,
                is_raw: false,
            },
        );
        if let Some(def) = registry.get_recipe(recipe_node.recipe) {
            for entry in &def.outputs {
                if graph.contains_item(entry.item) {
                    edges.push(PlanEdge {
                        from: PlanKey::Recipe(recipe_node.recipe),
                        to: PlanKey::Item(entry.item),
                    });
                }
            }
        }
    }

    let cycles = cycles
        .iter()
        .enumerate()
        .map(|(id, scc)| detect_cycle(registry, graph, solution, id, scc))
        .collect();

    ProductionPlan {
        nodes,
        edges,
        targets: graph.targets().clone(),
        cycles,
    }
}

fn detect_cycle(
    registry: &Registry,
    graph: &DependencyGraph,
    solution: &FlowSolution,
    id: usize,
    scc: &Scc,
) -> DetectedCycle {
    let mut net_output = HashMap::new();
    let mut nodes = Vec::with_capacity(scc.items.len() + scc.recipes.len());

    for &item in &scc.items {
        let mut net = 0.0;
        let mut gross = 0.0;
        for &recipe in &scc.recipes {
            if let Some(def) = registry.get_recipe(recipe) {
                let count = solution.facility_count(recipe);
                net += (def.output_rate(item) - def.input_rate(item)) * count;
                gross += def.output_rate(item) * count;
            }
        }
        net_output.insert(item, net);

        // Member items are produced inside the cycle, never raw.
        let facility_count = graph
            .item(item)
            .and_then(|n| n.producer)
            .map(|r| solution.facility_count(r))
            .unwrap_or(0.0);
        nodes.push(PlanNode {
            key: PlanKey::Item(item),
            facility: None,
            facility_count,
            rate: gross,
            is_target: graph.is_target(item),
            is_raw: false,
        });
    }

    for &recipe in &scc.recipes {
        let count = solution.facility_count(recipe);
        let cycles_per_minute = registry
            .get_recipe(recipe)
            .map(|def| count * 60.0 / def.craft_seconds)
            .unwrap_or(0.0);
        nodes.push(PlanNode {
            key: PlanKey::Recipe(recipe),
            facility: graph.recipe(recipe).map(|n| n.facility),
            facility_count: count,
            rate: cycles_per_minute,
            is_target: false,
            is_raw: false,
        });
    }

    DetectedCycle {
        id,
        items: scc.items.clone(),
        recipes: scc.recipes.clone(),
        break_item: scc.items[0],
        nodes,
        net_output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::{compute_plan, PlanOptions, Target};

    #[test]
    fn chain_plan_nodes_and_edges() {
        let reg = chain_registry();
        let gear = reg.item_id("gear").unwrap();
        let plan = compute_plan(
            &reg,
            &[Target::per_minute(gear, 30.0)],
            &PlanOptions::default(),
        )
        .unwrap();

        assert_eq!(plan.nodes.len(), 5); // 3 items + 2 recipes
        let gear_node = plan.item(gear).unwrap();
        assert!(gear_node.is_target);
        assert!(!gear_node.is_raw);
        assert!((gear_node.rate - 30.0).abs() < 1e-9);
        assert!((gear_node.facility_count - 2.0).abs() < 1e-9);

        let ore = reg.item_id("iron_ore").unwrap();
        let ore_node = plan.item(ore).unwrap();
        assert!(ore_node.is_raw);
        assert_eq!(ore_node.facility_count, 0.0);
        assert!((ore_node.rate - 60.0).abs() < 1e-9);

        // ore -> smelt -> ingot -> make_gear -> gear: 4 edges.
        assert_eq!(plan.edges.len(), 4);
        let smelt = reg.recipe_id("smelt").unwrap();
        assert!(plan.edges.contains(&PlanEdge {
            from: PlanKey::Item(ore),
            to: PlanKey::Recipe(smelt),
        }));
        assert!(plan.edges.contains(&PlanEdge {
            from: PlanKey::Recipe(smelt),
            to: PlanKey::Item(reg.item_id("iron_ingot").unwrap()),
        }));
    }

    #[test]
    fn recipe_node_carries_facility() {
        let reg = chain_registry();
        let gear = reg.item_id("gear").unwrap();
        let plan = compute_plan(
            &reg,
            &[Target::per_minute(gear, 30.0)],
            &PlanOptions::default(),
        )
        .unwrap();
        let make_gear = plan.recipe(reg.recipe_id("make_gear").unwrap()).unwrap();
        assert_eq!(make_gear.facility, reg.facility_id("assembler"));
        // 2 facilities at 4s per cycle: 30 cycles/min.
        assert!((make_gear.rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn total_power_sums_recipe_nodes() {
        let reg = chain_registry();
        let gear = reg.item_id("gear").unwrap();
        let plan = compute_plan(
            &reg,
            &[Target::per_minute(gear, 30.0)],
            &PlanOptions::default(),
        )
        .unwrap();
        // 2 smelters at 120 kW + 2 assemblers at 80 kW.
        assert!((plan.total_power(&reg) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn cycle_metadata_exported() {
        let reg = catalyst_cycle_registry();
        let y = reg.item_id("y").unwrap();
        let plan = compute_plan(
            &reg,
            &[Target::per_minute(y, 60.0)],
            &PlanOptions::default(),
        )
        .unwrap();

        assert_eq!(plan.cycles.len(), 1);
        let cycle = &plan.cycles[0];
        assert_eq!(cycle.items.len(), 2);
        assert_eq!(cycle.break_item, cycle.items[0]);

        // x is fully internal (net ~0); y is net-exported at 60/min.
        let x = reg.item_id("x").unwrap();
        assert!(cycle.net_output[&x].abs() < 1e-9);
        assert!((cycle.net_output[&y] - 60.0).abs() < 1e-9);

        // The member nodes carry the solved counts, items before recipes.
        assert_eq!(cycle.nodes.len(), 4);
        let double = reg.recipe_id("double").unwrap();
        let double_node = cycle
            .nodes
            .iter()
            .find(|n| n.key == PlanKey::Recipe(double))
            .unwrap();
        assert!((double_node.facility_count - 1.0).abs() < 1e-9);
        assert_eq!(double_node.facility, reg.facility_id("reactor"));
    }

    #[test]
    fn raw_target_has_no_producer() {
        let reg = chain_registry();
        let ore = reg.item_id("iron_ore").unwrap();
        let plan = compute_plan(
            &reg,
            &[Target::per_minute(ore, 45.0)],
            &PlanOptions::default(),
        )
        .unwrap();
        let node = plan.item(ore).unwrap();
        assert!(node.is_raw);
        assert!(node.is_target);
        assert_eq!(node.facility_count, 0.0);
        assert!((node.rate - 45.0).abs() < 1e-9);
        assert!(plan.edges.is_empty());
    }

    #[test]
    fn plan_serializes() {
        let reg = chain_registry();
        let gear = reg.item_id("gear").unwrap();
        let plan = compute_plan(
            &reg,
            &[Target::per_minute(gear, 30.0)],
            &PlanOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("facility_count"));
    }
}
