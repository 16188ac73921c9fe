//! Recipe-selection policies.
//!
//! When several recipes produce the same item, exactly one must be chosen
//! per computation. An explicit per-item override (see
//! [`crate::PlanOptions::overrides`]) always wins; otherwise the configured
//! policy decides.

use craftplan_core::id::{ItemId, RecipeId};
use craftplan_core::registry::Registry;
use std::collections::HashSet;

/// Policy for picking one producing recipe out of several candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectorPolicy {
    /// Always pick the first candidate. Deterministic; relies on the
    /// registry's stable registration order as the preference order.
    #[default]
    FirstAvailable,
    /// Prefer a candidate whose inputs are disjoint from the current
    /// traversal path, falling back to the first candidate when every
    /// candidate would re-enter the path.
    CycleAvoiding,
}

impl SelectorPolicy {
    /// Pick one recipe out of a non-empty candidate list.
    ///
    /// `path` is the set of items currently being expanded by the graph
    /// builder; it is only consulted by [`SelectorPolicy::CycleAvoiding`].
    pub fn select(
        &self,
        registry: &Registry,
        candidates: &[RecipeId],
        path: &HashSet<ItemId>,
    ) -> RecipeId {
        debug_assert!(!candidates.is_empty(), "caller guarantees candidates");
        match self {
            SelectorPolicy::FirstAvailable => candidates[0],
            SelectorPolicy::CycleAvoiding => {
                if path.is_empty() {
                    return candidates[0];
                }
                candidates
                    .iter()
                    .copied()
                    .find(|&id| {
                        registry
                            .get_recipe(id)
                            .is_some_and(|r| r.inputs.iter().all(|e| !path.contains(&e.item)))
                    })
                    .unwrap_or(candidates[0])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use craftplan_core::registry::{RecipeEntry, RegistryBuilder};

    /// Two recipes for "plate": the first needs "scrap" (on-path in the
    /// cycle tests), the second only needs "ore".
    fn setup() -> (Registry, ItemId, ItemId, RecipeId, RecipeId) {
        let mut b = RegistryBuilder::new();
        let ore = b.register_item("ore", 1);
        let scrap = b.register_item("scrap", 1);
        let plate = b.register_item("plate", 2);
        let f = b.register_facility("press", 50.0);
        let from_scrap = b.register_recipe(
            "plate_from_scrap",
            vec![RecipeEntry {
                item: scrap,
                amount: 1.0,
            }],
            vec![RecipeEntry {
                item: plate,
                amount: 1.0,
            }],
            f,
            1.0,
        );
        let from_ore = b.register_recipe(
            "plate_from_ore",
            vec![RecipeEntry {
                item: ore,
                amount: 2.0,
            }],
            vec![RecipeEntry {
                item: plate,
                amount: 1.0,
            }],
            f,
            1.0,
        );
        let reg = b.build().unwrap();
        (reg, ore, scrap, from_scrap, from_ore)
    }

    #[test]
    fn first_available_picks_first() {
        let (reg, _ore, scrap, from_scrap, from_ore) = setup();
        let path: HashSet<ItemId> = [scrap].into_iter().collect();
        let picked =
            SelectorPolicy::FirstAvailable.select(&reg, &[from_scrap, from_ore], &path);
        // Path is ignored entirely.
        assert_eq!(picked, from_scrap);
    }

    #[test]
    fn cycle_avoiding_skips_on_path_inputs() {
        let (reg, _ore, scrap, from_scrap, from_ore) = setup();
        let path: HashSet<ItemId> = [scrap].into_iter().collect();
        let picked =
            SelectorPolicy::CycleAvoiding.select(&reg, &[from_scrap, from_ore], &path);
        assert_eq!(picked, from_ore);
    }

    #[test]
    fn cycle_avoiding_empty_path_behaves_as_default() {
        let (reg, _ore, _scrap, from_scrap, from_ore) = setup();
        let picked =
            SelectorPolicy::CycleAvoiding.select(&reg, &[from_scrap, from_ore], &HashSet::new());
        assert_eq!(picked, from_scrap);
    }

    #[test]
    fn cycle_avoiding_falls_back_when_all_candidates_collide() {
        let (reg, ore, scrap, from_scrap, from_ore) = setup();
        let path: HashSet<ItemId> = [ore, scrap].into_iter().collect();
        let picked =
            SelectorPolicy::CycleAvoiding.select(&reg, &[from_scrap, from_ore], &path);
        assert_eq!(picked, from_scrap);
    }
}
