//! Bipartite item/recipe dependency graph.
//!
//! Built fresh for every computation by a memoized depth-first traversal
//! from the target items: each unvisited item is either classified raw
//! (no producing recipe, manually marked, or forced raw by game data) or
//! assigned exactly one producing recipe, whose inputs are then expanded.
//! Missing item/facility references are fatal -- they indicate invalid
//! static game data, never user error.

use crate::error::PlanError;
use crate::{PlanOptions, Target};
use craftplan_core::id::{FacilityId, ItemId, RecipeId};
use craftplan_core::registry::Registry;
use std::collections::{HashMap, HashSet};

/// Per-item node state in the dependency graph.
#[derive(Debug, Clone)]
pub struct ItemNode {
    pub item: ItemId,
    /// True when the item is supplied externally rather than produced.
    pub raw: bool,
    /// The single recipe selected to produce this item, if any.
    pub producer: Option<RecipeId>,
    /// Recipes that consume this item, in traversal order.
    pub consumers: Vec<RecipeId>,
}

/// Per-recipe node state in the dependency graph.
#[derive(Debug, Clone)]
pub struct RecipeNode {
    pub recipe: RecipeId,
    /// Resolved facility the recipe runs in.
    pub facility: FacilityId,
}

/// The bipartite item/recipe dependency graph for one computation.
///
/// Item nodes connect to the recipes consuming them; recipe nodes connect
/// back to the items they output. Each item has at most one producing
/// recipe per computation.
#[derive(Debug)]
pub struct DependencyGraph {
    items: HashMap<ItemId, ItemNode>,
    recipes: HashMap<RecipeId, RecipeNode>,
    targets: HashSet<ItemId>,
    /// Item ids in first-visit order; keeps downstream passes deterministic.
    item_order: Vec<ItemId>,
    /// Recipe ids in first-registration order.
    recipe_order: Vec<RecipeId>,
}

impl DependencyGraph {
    /// Build the dependency graph for the given targets.
    pub fn build(
        registry: &Registry,
        targets: &[Target],
        options: &PlanOptions,
    ) -> Result<Self, PlanError> {
        let mut builder = GraphBuilder {
            registry,
            options,
            graph: DependencyGraph {
                items: HashMap::new(),
                recipes: HashMap::new(),
                targets: HashSet::new(),
                item_order: Vec::new(),
                recipe_order: Vec::new(),
            },
            path: HashSet::new(),
        };

        for target in targets {
            builder.graph.targets.insert(target.item);
            builder.visit_item(target.item)?;
        }

        Ok(builder.graph)
    }

    pub fn item(&self, id: ItemId) -> Option<&ItemNode> {
        self.items.get(&id)
    }

    pub fn recipe(&self, id: RecipeId) -> Option<&RecipeNode> {
        self.recipes.get(&id)
    }

    /// Item nodes in first-visit order.
    pub fn items(&self) -> impl Iterator<Item = &ItemNode> {
        self.item_order.iter().map(|id| &self.items[id])
    }

    /// Recipe nodes in first-registration order.
    pub fn recipes(&self) -> impl Iterator<Item = &RecipeNode> {
        self.recipe_order.iter().map(|id| &self.recipes[id])
    }

    pub fn is_target(&self, id: ItemId) -> bool {
        self.targets.contains(&id)
    }

    pub fn targets(&self) -> &HashSet<ItemId> {
        &self.targets
    }

    pub fn contains_item(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

struct GraphBuilder<'a> {
    registry: &'a Registry,
    options: &'a PlanOptions,
    graph: DependencyGraph,
    /// Items currently being expanded; consulted by the cycle-avoiding
    /// selector policy.
    path: HashSet<ItemId>,
}

impl GraphBuilder<'_> {
    /// Expand `item` if it has not been visited yet. An item is expanded at
    /// most once regardless of how many recipes demand it.
    fn visit_item(&mut self, item: ItemId) -> Result<(), PlanError> {
        if self.graph.items.contains_key(&item) {
            return Ok(());
        }
        if self.registry.get_item(item).is_none() {
            return Err(PlanError::UnknownItem(item));
        }

        if self.is_raw(item) {
            self.insert_item(item, true, None);
            return Ok(());
        }

        let candidates = self.registry.producers(item);
        if candidates.is_empty() {
            self.insert_item(item, true, None);
            return Ok(());
        }

        let recipe = self.pick_recipe(item, candidates)?;
        self.insert_item(item, false, Some(recipe));

        // First encounter registers the recipe and its edges; a recipe
        // reached again through a co-output is not re-expanded.
        if self.graph.recipes.contains_key(&recipe) {
            return Ok(());
        }
        // Overrides are validated in pick_recipe and selector candidates
        // come from the registry's own producer index.
        let Some(def) = self.registry.get_recipe(recipe) else {
            return Ok(());
        };
        if self.registry.get_facility(def.facility).is_none() {
            return Err(PlanError::UnknownFacility {
                recipe,
                facility: def.facility,
            });
        }
        self.graph.recipes.insert(
            recipe,
            RecipeNode {
                recipe,
                facility: def.facility,
            },
        );
        self.graph.recipe_order.push(recipe);

        self.path.insert(item);
        let inputs: Vec<ItemId> = def.inputs.iter().map(|e| e.item).collect();
        for input in inputs {
            self.visit_item(input)?;
            // The item node exists after the visit; record the consumer edge.
            if let Some(node) = self.graph.items.get_mut(&input) {
                node.consumers.push(recipe);
            }
        }
        self.path.remove(&item);

        Ok(())
    }

    fn is_raw(&self, item: ItemId) -> bool {
        if self.options.manual_raw.contains(&item) {
            return true;
        }
        self.registry
            .get_item(item)
            .is_some_and(|def| def.forced_raw)
    }

    /// Override wins unconditionally; otherwise the configured policy picks.
    fn pick_recipe(&self, item: ItemId, candidates: &[RecipeId]) -> Result<RecipeId, PlanError> {
        if let Some(&recipe) = self.options.overrides.get(&item) {
            if self.registry.get_recipe(recipe).is_none() {
                return Err(PlanError::UnknownOverride { item, recipe });
            }
            return Ok(recipe);
        }
        Ok(self
            .options
            .selector
            .select(self.registry, candidates, &self.path))
    }

    fn insert_item(&mut self, item: ItemId, raw: bool, producer: Option<RecipeId>) {
        self.graph.items.insert(
            item,
            ItemNode {
                item,
                raw,
                producer,
                consumers: Vec::new(),
            },
        );
        self.graph.item_order.push(item);
    }
}
