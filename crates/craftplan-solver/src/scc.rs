//! Cycle detection over the bipartite dependency graph.
//!
//! Tarjan's strongly-connected-components algorithm, run on the directed
//! graph where an item's successors are the recipes consuming it and a
//! recipe's successors are the items it outputs. Because edges strictly
//! alternate between the two node kinds, every nontrivial component holds
//! at least one item and one recipe; the degenerate two-member component
//! (a recipe consuming and producing the same item) is not kept as a cycle.

use crate::graph::DependencyGraph;
use craftplan_core::id::{ItemId, RecipeId};
use craftplan_core::registry::Registry;
use std::collections::{HashMap, HashSet};

/// A node in the bipartite graph, for cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Item(ItemId),
    Recipe(RecipeId),
}

/// A production cycle: a maximal set of items and recipes whose production
/// is mutually interdependent.
#[derive(Debug, Clone)]
pub struct Scc {
    /// Member items in discovery order.
    pub items: Vec<ItemId>,
    /// Member recipes in discovery order.
    pub recipes: Vec<RecipeId>,
    /// Items consumed by a member recipe but produced only outside the
    /// component; their demand is propagated upstream after the cycle solve.
    pub external_inputs: Vec<ItemId>,
}

impl Scc {
    pub fn contains_item(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    pub fn contains_recipe(&self, id: RecipeId) -> bool {
        self.recipes.contains(&id)
    }
}

/// Find all production cycles in the dependency graph, in discovery order.
pub fn find_cycles(registry: &Registry, graph: &DependencyGraph) -> Vec<Scc> {
    let mut finder = Finder {
        registry,
        graph,
        index: 0,
        indices: HashMap::new(),
        lowlinks: HashMap::new(),
        stack: Vec::new(),
        on_stack: HashSet::new(),
        components: Vec::new(),
    };

    for node in graph.items().map(|n| NodeKey::Item(n.item)) {
        if !finder.indices.contains_key(&node) {
            finder.connect(node);
        }
    }
    for node in graph.recipes().map(|n| NodeKey::Recipe(n.recipe)) {
        if !finder.indices.contains_key(&node) {
            finder.connect(node);
        }
    }

    finder
        .components
        .into_iter()
        .filter_map(|members| retain_cycle(registry, graph, members))
        .collect()
}

/// Index/lowlink/stack bookkeeping for Tarjan's algorithm.
struct Finder<'a> {
    registry: &'a Registry,
    graph: &'a DependencyGraph,
    index: usize,
    indices: HashMap<NodeKey, usize>,
    lowlinks: HashMap<NodeKey, usize>,
    stack: Vec<NodeKey>,
    on_stack: HashSet<NodeKey>,
    components: Vec<Vec<NodeKey>>,
}

impl Finder<'_> {
    fn successors(&self, node: NodeKey) -> Vec<NodeKey> {
        match node {
            NodeKey::Item(id) => self
                .graph
                .item(id)
                .map(|n| n.consumers.iter().map(|&r| NodeKey::Recipe(r)).collect())
                .unwrap_or_default(),
            NodeKey::Recipe(id) => self
                .registry
                .get_recipe(id)
                .map(|def| {
                    def.outputs
                        .iter()
                        // Co-outputs nothing demanded are absent from the graph.
                        .filter(|e| self.graph.contains_item(e.item))
                        .map(|e| NodeKey::Item(e.item))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn connect(&mut self, vertex: NodeKey) {
        self.indices.insert(vertex, self.index);
        self.lowlinks.insert(vertex, self.index);
        self.index += 1;

        self.stack.push(vertex);
        self.on_stack.insert(vertex);

        for child in self.successors(vertex) {
            if !self.indices.contains_key(&child) {
                self.connect(child);
                let lowlink = self.lowlinks[&vertex].min(self.lowlinks[&child]);
                self.lowlinks.insert(vertex, lowlink);
            } else if self.on_stack.contains(&child) {
                let lowlink = self.lowlinks[&vertex].min(self.indices[&child]);
                self.lowlinks.insert(vertex, lowlink);
            }
        }

        if self.lowlinks[&vertex] == self.indices[&vertex] {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(&member);
                component.push(member);
                if member == vertex {
                    break;
                }
            }
            // Stack pops in reverse discovery order.
            component.reverse();
            self.components.push(component);
        }
    }
}

/// Keep a component only if it is a real cycle: more than two members.
/// (Bipartite alternation makes a two-member component exactly the
/// degenerate self-consuming recipe, treated as non-cyclic.)
fn retain_cycle(
    registry: &Registry,
    graph: &DependencyGraph,
    members: Vec<NodeKey>,
) -> Option<Scc> {
    if members.len() <= 2 {
        return None;
    }

    let mut items = Vec::new();
    let mut recipes = Vec::new();
    for member in members {
        match member {
            NodeKey::Item(id) => items.push(id),
            NodeKey::Recipe(id) => recipes.push(id),
        }
    }

    let member_items: HashSet<ItemId> = items.iter().copied().collect();
    let mut external_inputs = Vec::new();
    let mut seen = HashSet::new();
    for &recipe in &recipes {
        if let Some(def) = registry.get_recipe(recipe) {
            for entry in &def.inputs {
                if !member_items.contains(&entry.item)
                    && graph.contains_item(entry.item)
                    && seen.insert(entry.item)
                {
                    external_inputs.push(entry.item);
                }
            }
        }
    }

    Some(Scc {
        items,
        recipes,
        external_inputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::{PlanOptions, Target};
    use crate::graph::DependencyGraph;

    fn build(reg: &Registry, target_name: &str) -> DependencyGraph {
        let item = reg.item_id(target_name).unwrap();
        DependencyGraph::build(reg, &[Target::per_minute(item, 10.0)], &PlanOptions::default())
            .unwrap()
    }

    #[test]
    fn acyclic_chain_has_no_cycles() {
        let reg = chain_registry();
        let graph = build(&reg, "gear");
        assert!(find_cycles(&reg, &graph).is_empty());
    }

    #[test]
    fn two_item_loop_detected() {
        let reg = loop_registry();
        let graph = build(&reg, "x");
        let cycles = find_cycles(&reg, &graph);
        assert_eq!(cycles.len(), 1);
        let scc = &cycles[0];
        assert_eq!(scc.items.len(), 2);
        assert_eq!(scc.recipes.len(), 2);
        assert!(scc.external_inputs.is_empty());
        assert!(scc.contains_item(reg.item_id("x").unwrap()));
        assert!(scc.contains_item(reg.item_id("y").unwrap()));
    }

    #[test]
    fn cycle_external_inputs_computed() {
        // The doubling cycle consumes a catalyst produced outside it.
        let reg = catalyst_cycle_registry();
        let graph = build(&reg, "y");
        let cycles = find_cycles(&reg, &graph);
        assert_eq!(cycles.len(), 1);
        let scc = &cycles[0];
        let catalyst = reg.item_id("catalyst").unwrap();
        assert_eq!(scc.external_inputs, vec![catalyst]);
        assert!(!scc.contains_item(catalyst));
    }

    #[test]
    fn self_consuming_recipe_is_not_a_cycle() {
        // breeder: 1 fuel -> 2 fuel. A two-member component, dropped.
        let reg = breeder_registry();
        let graph = build(&reg, "fuel");
        assert!(find_cycles(&reg, &graph).is_empty());
    }

    #[test]
    fn discovery_order_is_deterministic() {
        let reg = loop_registry();
        let graph = build(&reg, "x");
        let a = find_cycles(&reg, &graph);
        let b = find_cycles(&reg, &graph);
        assert_eq!(a[0].items, b[0].items);
        assert_eq!(a[0].recipes, b[0].recipes);
    }
}
