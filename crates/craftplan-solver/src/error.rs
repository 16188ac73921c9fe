use craftplan_core::id::{FacilityId, ItemId, RecipeId};

/// Errors that can occur while computing a production plan.
///
/// Input errors ([`PlanError::EmptyTargets`]) reflect bad user input and are
/// kept distinct from data-integrity errors (`Unknown*`), which indicate
/// invalid static game data and abort the whole computation. Cycle
/// infeasibility is reported per cycle with the failing members attached.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// No production targets were supplied.
    #[error("no production targets supplied")]
    EmptyTargets,

    /// A target or recipe entry references an item missing from the registry.
    #[error("unknown item: {0:?}")]
    UnknownItem(ItemId),

    /// A per-item recipe override references a recipe missing from the registry.
    #[error("override for item {item:?} references unknown recipe {recipe:?}")]
    UnknownOverride { item: ItemId, recipe: RecipeId },

    /// A recipe references a facility missing from the registry.
    #[error("recipe {recipe:?} references unknown facility {facility:?}")]
    UnknownFacility {
        recipe: RecipeId,
        facility: FacilityId,
    },

    /// A recipe consumes at least as much of an item as it produces, and that
    /// item is demanded through it.
    #[error("recipe {recipe:?} cannot net-produce demanded item {item:?}")]
    SelfConsuming { recipe: RecipeId, item: ItemId },

    /// A production cycle could not be solved for the demanded output.
    #[error("unsolvable production cycle over items {items:?}: {reason}")]
    CycleUnsolvable {
        items: Vec<ItemId>,
        reason: CycleFailure,
    },
}

/// Why a cycle's facility-count system could not be solved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleFailure {
    /// Member item count and member recipe count differ, so the
    /// production/consumption balance has no square system to solve.
    #[error("system is not square ({items} items, {recipes} recipes)")]
    NonSquare { items: usize, recipes: usize },

    /// The balance matrix is singular; the cycle cannot meet the demanded
    /// net export with its recipe set.
    #[error("balance system is singular")]
    Singular,

    /// A solved facility count is negative beyond numerical tolerance,
    /// meaning the external demand is unsustainable for this cycle.
    #[error("facility count for recipe {recipe:?} solved to {count}")]
    NegativeCount { recipe: RecipeId, count: f64 },
}
