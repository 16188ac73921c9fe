use crate::id::*;
use std::collections::HashMap;

/// An item definition in the registry.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub name: String,
    /// Progression tier, used by consumers as an ordering/display hint.
    pub tier: u32,
    /// When set, the item is always treated as an externally supplied raw
    /// material, even if a recipe produces it.
    pub forced_raw: bool,
}

/// A recipe input/output entry.
#[derive(Debug, Clone)]
pub struct RecipeEntry {
    pub item: ItemId,
    pub amount: f64,
}

/// A recipe definition.
#[derive(Debug, Clone)]
pub struct RecipeDef {
    pub name: String,
    pub inputs: Vec<RecipeEntry>,
    pub outputs: Vec<RecipeEntry>,
    /// The facility this recipe runs in.
    pub facility: FacilityId,
    /// Seconds per crafting cycle. Must be positive.
    pub craft_seconds: f64,
}

impl RecipeDef {
    /// Amount of `item` produced per crafting cycle, 0.0 if not an output.
    pub fn output_amount(&self, item: ItemId) -> f64 {
        self.outputs
            .iter()
            .find(|e| e.item == item)
            .map(|e| e.amount)
            .unwrap_or(0.0)
    }

    /// Amount of `item` consumed per crafting cycle, 0.0 if not an input.
    pub fn input_amount(&self, item: ItemId) -> f64 {
        self.inputs
            .iter()
            .find(|e| e.item == item)
            .map(|e| e.amount)
            .unwrap_or(0.0)
    }

    /// Items per minute of `item` produced by one facility running this recipe.
    pub fn output_rate(&self, item: ItemId) -> f64 {
        self.output_amount(item) * 60.0 / self.craft_seconds
    }

    /// Items per minute of `item` consumed by one facility running this recipe.
    pub fn input_rate(&self, item: ItemId) -> f64 {
        self.input_amount(item) * 60.0 / self.craft_seconds
    }

    /// Whether this recipe lists `item` among its outputs.
    pub fn produces(&self, item: ItemId) -> bool {
        self.outputs.iter().any(|e| e.item == item)
    }
}

/// A facility definition.
#[derive(Debug, Clone)]
pub struct FacilityDef {
    pub name: String,
    /// Power draw of one unit, in kW.
    pub power: f64,
}

/// Builder for constructing an immutable Registry.
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
    facilities: Vec<FacilityDef>,
    facility_name_to_id: HashMap<String, FacilityId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register an item. Returns its ID.
    pub fn register_item(&mut self, name: &str, tier: u32) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        self.items.push(ItemDef {
            name: name.to_string(),
            tier,
            forced_raw: false,
        });
        self.item_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Phase 1: Register a facility. Returns its ID.
    pub fn register_facility(&mut self, name: &str, power: f64) -> FacilityId {
        let id = FacilityId(self.facilities.len() as u32);
        self.facilities.push(FacilityDef {
            name: name.to_string(),
            power,
        });
        self.facility_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Phase 1: Register a recipe. Returns its ID.
    pub fn register_recipe(
        &mut self,
        name: &str,
        inputs: Vec<RecipeEntry>,
        outputs: Vec<RecipeEntry>,
        facility: FacilityId,
        craft_seconds: f64,
    ) -> RecipeId {
        let id = RecipeId(self.recipes.len() as u32);
        self.recipes.push(RecipeDef {
            name: name.to_string(),
            inputs,
            outputs,
            facility,
            craft_seconds,
        });
        self.recipe_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Phase 2: Mark an item as always raw (externally supplied), by name.
    pub fn set_forced_raw(&mut self, name: &str) -> Result<(), RegistryError> {
        let id = self
            .item_name_to_id
            .get(name)
            .ok_or(RegistryError::NotFound(name.to_string()))?;
        self.items[id.0 as usize].forced_raw = true;
        Ok(())
    }

    /// Phase 2: Mutate an existing recipe by name.
    pub fn mutate_recipe<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut RecipeDef),
    {
        let id = self
            .recipe_name_to_id
            .get(name)
            .ok_or(RegistryError::NotFound(name.to_string()))?;
        f(&mut self.recipes[id.0 as usize]);
        Ok(())
    }

    /// Lookup item ID by name.
    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    /// Lookup recipe ID by name.
    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    /// Lookup facility ID by name.
    pub fn facility_id(&self, name: &str) -> Option<FacilityId> {
        self.facility_name_to_id.get(name).copied()
    }

    /// Phase 3: Finalize and build the immutable registry.
    ///
    /// Validates that every recipe item reference resolves, every recipe
    /// facility reference resolves, and no recipe has a non-positive
    /// crafting time (which would imply an infinite production rate).
    pub fn build(self) -> Result<Registry, RegistryError> {
        for (idx, recipe) in self.recipes.iter().enumerate() {
            for entry in recipe.inputs.iter().chain(recipe.outputs.iter()) {
                if entry.item.0 as usize >= self.items.len() {
                    return Err(RegistryError::InvalidItemRef(entry.item));
                }
            }
            if recipe.facility.0 as usize >= self.facilities.len() {
                return Err(RegistryError::InvalidFacilityRef(recipe.facility));
            }
            if recipe.craft_seconds <= 0.0 {
                return Err(RegistryError::NonPositiveCraftTime(RecipeId(idx as u32)));
            }
        }

        // Index producing recipes per item, in registration order. The graph
        // builder relies on this order being the stable recipe preference.
        let mut producers: HashMap<ItemId, Vec<RecipeId>> = HashMap::new();
        for (idx, recipe) in self.recipes.iter().enumerate() {
            for entry in &recipe.outputs {
                producers
                    .entry(entry.item)
                    .or_default()
                    .push(RecipeId(idx as u32));
            }
        }

        Ok(Registry {
            items: self.items,
            item_name_to_id: self.item_name_to_id,
            recipes: self.recipes,
            recipe_name_to_id: self.recipe_name_to_id,
            facilities: self.facilities,
            facility_name_to_id: self.facility_name_to_id,
            producers,
        })
    }
}

/// Immutable registry of game data. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct Registry {
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemId>,
    recipes: Vec<RecipeDef>,
    recipe_name_to_id: HashMap<String, RecipeId>,
    facilities: Vec<FacilityDef>,
    facility_name_to_id: HashMap<String, FacilityId>,
    producers: HashMap<ItemId, Vec<RecipeId>>,
}

impl Registry {
    pub fn get_item(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(id.0 as usize)
    }

    pub fn get_recipe(&self, id: RecipeId) -> Option<&RecipeDef> {
        self.recipes.get(id.0 as usize)
    }

    pub fn get_facility(&self, id: FacilityId) -> Option<&FacilityDef> {
        self.facilities.get(id.0 as usize)
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn recipe_id(&self, name: &str) -> Option<RecipeId> {
        self.recipe_name_to_id.get(name).copied()
    }

    pub fn facility_id(&self, name: &str) -> Option<FacilityId> {
        self.facility_name_to_id.get(name).copied()
    }

    /// Recipes producing `item`, in registration order. Empty when the item
    /// has no producer (a raw material).
    pub fn producers(&self, item: ItemId) -> &[RecipeId] {
        self.producers.get(&item).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
    #[error("invalid facility reference: {0:?}")]
    InvalidFacilityRef(FacilityId),
    #[error("recipe {0:?} has a non-positive crafting time")]
    NonPositiveCraftTime(RecipeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> RegistryBuilder {
        let mut b = RegistryBuilder::new();
        let ore = b.register_item("iron_ore", 1);
        let ingot = b.register_item("iron_ingot", 1);
        let smelter = b.register_facility("smelter", 120.0);
        b.register_recipe(
            "smelt_iron",
            vec![RecipeEntry {
                item: ore,
                amount: 1.0,
            }],
            vec![RecipeEntry {
                item: ingot,
                amount: 1.0,
            }],
            smelter,
            2.0,
        );
        b
    }

    #[test]
    fn register_and_build() {
        let builder = setup_builder();
        let reg = builder.build().unwrap();
        assert_eq!(reg.item_count(), 2);
        assert_eq!(reg.recipe_count(), 1);
        assert_eq!(reg.facility_count(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let reg = setup_builder().build().unwrap();
        assert!(reg.item_id("iron_ore").is_some());
        assert!(reg.item_id("nonexistent").is_none());
        assert!(reg.facility_id("smelter").is_some());
    }

    #[test]
    fn producer_index_follows_registration_order() {
        let mut b = setup_builder();
        let ore = b.item_id("iron_ore").unwrap();
        let ingot = b.item_id("iron_ingot").unwrap();
        let smelter = b.facility_id("smelter").unwrap();
        let alt = b.register_recipe(
            "smelt_iron_alt",
            vec![RecipeEntry {
                item: ore,
                amount: 2.0,
            }],
            vec![RecipeEntry {
                item: ingot,
                amount: 3.0,
            }],
            smelter,
            4.0,
        );
        let reg = b.build().unwrap();
        let first = reg.recipe_id("smelt_iron").unwrap();
        assert_eq!(reg.producers(ingot), &[first, alt]);
        assert!(reg.producers(ore).is_empty());
    }

    #[test]
    fn per_facility_rates() {
        let reg = setup_builder().build().unwrap();
        let ingot = reg.item_id("iron_ingot").unwrap();
        let ore = reg.item_id("iron_ore").unwrap();
        let recipe = reg.get_recipe(reg.recipe_id("smelt_iron").unwrap()).unwrap();
        // 1 ingot per 2s cycle = 30/min; same for the ore input.
        assert_eq!(recipe.output_rate(ingot), 30.0);
        assert_eq!(recipe.input_rate(ore), 30.0);
        assert_eq!(recipe.output_rate(ore), 0.0);
        assert!(recipe.produces(ingot));
        assert!(!recipe.produces(ore));
    }

    #[test]
    fn forced_raw_flag() {
        let mut b = setup_builder();
        b.set_forced_raw("iron_ingot").unwrap();
        let reg = b.build().unwrap();
        let ingot = reg.item_id("iron_ingot").unwrap();
        assert!(reg.get_item(ingot).unwrap().forced_raw);
    }

    #[test]
    fn forced_raw_unknown_item_fails() {
        let mut b = setup_builder();
        let result = b.set_forced_raw("nonexistent");
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn mutate_recipe_by_name() {
        let mut b = setup_builder();
        b.mutate_recipe("smelt_iron", |r| r.craft_seconds = 4.0).unwrap();
        let reg = b.build().unwrap();
        let recipe = reg.get_recipe(reg.recipe_id("smelt_iron").unwrap()).unwrap();
        assert_eq!(recipe.craft_seconds, 4.0);
    }

    #[test]
    fn invalid_item_ref_fails() {
        let mut b = RegistryBuilder::new();
        let f = b.register_facility("f", 1.0);
        b.register_recipe(
            "bad",
            vec![RecipeEntry {
                item: ItemId(999),
                amount: 1.0,
            }],
            vec![],
            f,
            1.0,
        );
        assert!(matches!(b.build(), Err(RegistryError::InvalidItemRef(_))));
    }

    #[test]
    fn invalid_facility_ref_fails() {
        let mut b = RegistryBuilder::new();
        b.register_item("a", 1);
        b.register_recipe("bad", vec![], vec![], FacilityId(7), 1.0);
        assert!(matches!(
            b.build(),
            Err(RegistryError::InvalidFacilityRef(FacilityId(7)))
        ));
    }

    #[test]
    fn zero_craft_time_fails() {
        let mut b = RegistryBuilder::new();
        let f = b.register_facility("f", 1.0);
        b.register_recipe("instant", vec![], vec![], f, 0.0);
        let result = b.build();
        assert!(matches!(
            result,
            Err(RegistryError::NonPositiveCraftTime(RecipeId(0)))
        ));
    }

    #[test]
    fn empty_registry_builds_successfully() {
        let reg = RegistryBuilder::new().build().unwrap();
        assert_eq!(reg.item_count(), 0);
        assert_eq!(reg.recipe_count(), 0);
        assert_eq!(reg.facility_count(), 0);
    }

    #[test]
    fn registry_get_nonexistent_returns_none() {
        let reg = setup_builder().build().unwrap();
        assert!(reg.get_item(ItemId(999)).is_none());
        assert!(reg.get_recipe(RecipeId(999)).is_none());
        assert!(reg.get_facility(FacilityId(999)).is_none());
    }
}
