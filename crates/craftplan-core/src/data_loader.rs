//! Data-driven registry loading from JSON.
//!
//! Feature-gated behind `data-loader`. Provides JSON deserialization into
//! [`RegistryBuilder`] for game data tables (items, recipes, facilities)
//! exported from the game wiki.

use crate::registry::{RecipeEntry, RegistryBuilder, RegistryError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("unknown item reference: {0}")]
    UnknownItemRef(String),
    #[error("unknown facility reference: {0}")]
    UnknownFacilityRef(String),
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level game data structure for JSON deserialization.
#[derive(Debug, serde::Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub items: Vec<ItemData>,
    #[serde(default)]
    pub facilities: Vec<FacilityData>,
    #[serde(default)]
    pub recipes: Vec<RecipeData>,
}

/// JSON representation of an item.
#[derive(Debug, serde::Deserialize)]
pub struct ItemData {
    pub name: String,
    #[serde(default)]
    pub tier: u32,
    /// Raw materials (ores, drops) have no producing recipe in-game and are
    /// always treated as externally supplied.
    #[serde(default)]
    pub raw: bool,
}

/// JSON representation of a facility.
#[derive(Debug, serde::Deserialize)]
pub struct FacilityData {
    pub name: String,
    #[serde(default)]
    pub power: f64,
}

/// JSON representation of a recipe.
#[derive(Debug, serde::Deserialize)]
pub struct RecipeData {
    pub name: String,
    pub facility: String, // references facility by name
    pub seconds: f64,
    #[serde(default)]
    pub inputs: Vec<RecipeEntryData>,
    #[serde(default)]
    pub outputs: Vec<RecipeEntryData>,
}

/// JSON representation of a recipe input/output entry.
#[derive(Debug, serde::Deserialize)]
pub struct RecipeEntryData {
    pub item: String, // references item by name
    pub amount: f64,
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load a registry builder from a JSON string.
pub fn load_game_data_json(json: &str) -> Result<RegistryBuilder, DataLoadError> {
    let data: GameData = serde_json::from_str(json)?;
    build_registry(data)
}

/// Load a registry builder from JSON bytes.
pub fn load_game_data_json_bytes(bytes: &[u8]) -> Result<RegistryBuilder, DataLoadError> {
    let data: GameData = serde_json::from_slice(bytes)?;
    build_registry(data)
}

fn build_registry(data: GameData) -> Result<RegistryBuilder, DataLoadError> {
    let mut builder = RegistryBuilder::new();

    // Phase 1: Register all items and facilities.
    for item in &data.items {
        builder.register_item(&item.name, item.tier);
    }
    for facility in &data.facilities {
        builder.register_facility(&facility.name, facility.power);
    }

    // Phase 2: Register all recipes (resolve item/facility refs by name).
    for recipe in &data.recipes {
        let facility = builder
            .facility_id(&recipe.facility)
            .ok_or_else(|| DataLoadError::UnknownFacilityRef(recipe.facility.clone()))?;
        let inputs = resolve_entries(&builder, &recipe.inputs)?;
        let outputs = resolve_entries(&builder, &recipe.outputs)?;
        builder.register_recipe(&recipe.name, inputs, outputs, facility, recipe.seconds);
    }

    // Phase 3: Apply the static forced-raw configuration.
    for item in &data.items {
        if item.raw {
            builder.set_forced_raw(&item.name)?;
        }
    }

    Ok(builder)
}

fn resolve_entries(
    builder: &RegistryBuilder,
    entries: &[RecipeEntryData],
) -> Result<Vec<RecipeEntry>, DataLoadError> {
    entries
        .iter()
        .map(|e| {
            let item = builder
                .item_id(&e.item)
                .ok_or_else(|| DataLoadError::UnknownItemRef(e.item.clone()))?;
            Ok(RecipeEntry {
                item,
                amount: e.amount,
            })
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
