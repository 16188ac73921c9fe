//! SCC condensation and topological ordering.
//!
//! Collapses each detected cycle to a single node, keeps every other item
//! and recipe as its own node, re-derives the edges through the membership
//! mapping (dropping self-loops), and orders the resulting DAG with Kahn's
//! algorithm from producers to consumers. The flow solver walks the order
//! in reverse.

use crate::graph::DependencyGraph;
use crate::scc::Scc;
use craftplan_core::id::{ItemId, RecipeId};
use craftplan_core::registry::Registry;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, HashSet, VecDeque};

slotmap::new_key_type! {
    /// Key for a node in the condensed DAG. Ephemeral; discarded after solving.
    pub struct CondensedId;
}

/// One node of the condensed DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondensedNode {
    Item(ItemId),
    Recipe(RecipeId),
    /// Index into the detected-cycle list.
    Cycle(usize),
}

/// The condensed DAG together with its topological order.
#[derive(Debug)]
pub struct CondensedGraph {
    nodes: SlotMap<CondensedId, CondensedNode>,
    /// Topological order, producers before consumers.
    order: Vec<CondensedId>,
}

impl CondensedGraph {
    /// Condense the dependency graph over the detected cycles and order it.
    pub fn build(registry: &Registry, graph: &DependencyGraph, cycles: &[Scc]) -> Self {
        let mut nodes: SlotMap<CondensedId, CondensedNode> = SlotMap::with_key();

        // Cycle membership: every member maps to the cycle's shared node.
        let mut item_to_node: HashMap<ItemId, CondensedId> = HashMap::new();
        let mut recipe_to_node: HashMap<RecipeId, CondensedId> = HashMap::new();
        for (idx, scc) in cycles.iter().enumerate() {
            let id = nodes.insert(CondensedNode::Cycle(idx));
            for &item in &scc.items {
                item_to_node.insert(item, id);
            }
            for &recipe in &scc.recipes {
                recipe_to_node.insert(recipe, id);
            }
        }
        for node in graph.items() {
            item_to_node
                .entry(node.item)
                .or_insert_with(|| nodes.insert(CondensedNode::Item(node.item)));
        }
        for node in graph.recipes() {
            recipe_to_node
                .entry(node.recipe)
                .or_insert_with(|| nodes.insert(CondensedNode::Recipe(node.recipe)));
        }

        // Re-derive edges through the membership mapping; self-loops (edges
        // internal to one condensed node) vanish.
        let mut successors: SecondaryMap<CondensedId, Vec<CondensedId>> = SecondaryMap::new();
        let mut in_degree: SecondaryMap<CondensedId, usize> = SecondaryMap::new();
        for id in nodes.keys() {
            successors.insert(id, Vec::new());
            in_degree.insert(id, 0);
        }
        let mut seen_edges: HashSet<(CondensedId, CondensedId)> = HashSet::new();
        let mut add_edge = |from: CondensedId,
                            to: CondensedId,
                            successors: &mut SecondaryMap<CondensedId, Vec<CondensedId>>,
                            in_degree: &mut SecondaryMap<CondensedId, usize>| {
            if from == to || !seen_edges.insert((from, to)) {
                return;
            }
            successors[from].push(to);
            in_degree[to] += 1;
        };

        for node in graph.items() {
            let from = item_to_node[&node.item];
            // Item is consumed by its consumer recipes. A recipe that also
            // produces the item it consumes (the degenerate pair, not kept
            // as a cycle) only gets the edge matching its net direction, so
            // the condensed graph stays acyclic.
            for recipe in &node.consumers {
                if registry.get_recipe(*recipe).is_some_and(|def| {
                    def.output_amount(node.item) >= def.input_amount(node.item)
                }) {
                    continue;
                }
                let to = recipe_to_node[recipe];
                add_edge(from, to, &mut successors, &mut in_degree);
            }
        }
        for node in graph.recipes() {
            let from = recipe_to_node[&node.recipe];
            if let Some(def) = registry.get_recipe(node.recipe) {
                // Recipe produces its output items, unless it nets out as a
                // consumer of one of them.
                for entry in &def.outputs {
                    if def.input_amount(entry.item) > def.output_amount(entry.item) {
                        continue;
                    }
                    if let Some(&to) = item_to_node.get(&entry.item) {
                        add_edge(from, to, &mut successors, &mut in_degree);
                    }
                }
            }
        }

        // Kahn's algorithm: sources are raw items and recipes needing nothing.
        let mut queue: VecDeque<CondensedId> = VecDeque::new();
        for (id, &deg) in &in_degree {
            if deg == 0 {
                queue.push_back(id);
            }
        }

        let mut order: Vec<CondensedId> = Vec::with_capacity(nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &dest in &successors[node] {
                let deg = &mut in_degree[dest];
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(dest);
                }
            }
        }

        // SCCs are maximal, so the condensed graph cannot contain a cycle.
        // A short count means the builder produced bad edges.
        debug_assert_eq!(
            order.len(),
            nodes.len(),
            "condensed graph failed to drain: builder bug"
        );

        CondensedGraph { nodes, order }
    }

    /// Nodes in topological order, producers before consumers.
    pub fn topological_order(&self) -> impl DoubleEndedIterator<Item = CondensedNode> + '_ {
        self.order.iter().map(|&id| self.nodes[id])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
