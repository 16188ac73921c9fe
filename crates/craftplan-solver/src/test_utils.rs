//! Shared fixture registries for tests and benchmarks.
//!
//! Each fixture is a small, hand-checkable production setup exercising one
//! structural shape: a linear chain, a diamond, a pure loop, a catalyst
//! cycle, a self-consuming recipe, a partial-return recipe, a multi-output
//! recipe, and an item with competing producers.

use craftplan_core::registry::{RecipeEntry, Registry, RegistryBuilder};
use craftplan_core::id::ItemId;

fn entry(item: ItemId, amount: f64) -> RecipeEntry {
    RecipeEntry { item, amount }
}

/// iron_ore -> smelt -> iron_ingot -> make_gear -> gear.
///
/// smelt: 1 ore -> 1 ingot in 2s (30/min per smelter).
/// make_gear: 2 ingot -> 1 gear in 4s (15/min per assembler).
pub fn chain_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let ore = b.register_item("iron_ore", 1);
    let ingot = b.register_item("iron_ingot", 1);
    let gear = b.register_item("gear", 2);
    let smelter = b.register_facility("smelter", 120.0);
    let assembler = b.register_facility("assembler", 80.0);
    b.register_recipe(
        "smelt",
        vec![entry(ore, 1.0)],
        vec![entry(ingot, 1.0)],
        smelter,
        2.0,
    );
    b.register_recipe(
        "make_gear",
        vec![entry(ingot, 2.0)],
        vec![entry(gear, 1.0)],
        assembler,
        4.0,
    );
    b.set_forced_raw("iron_ore").unwrap();
    b.build().unwrap()
}

/// Diamond: circuit needs wire and plate, both of which come from ingot.
///
/// smelt: 1 ore -> 1 ingot in 1s.
/// draw_wire: 1 ingot -> 2 wire in 1s.
/// press_plate: 2 ingot -> 1 plate in 2s.
/// assemble: 3 wire + 1 plate -> 1 circuit in 2s.
pub fn diamond_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let ore = b.register_item("ore", 1);
    let ingot = b.register_item("ingot", 1);
    let wire = b.register_item("wire", 2);
    let plate = b.register_item("plate", 2);
    let circuit = b.register_item("circuit", 3);
    let furnace = b.register_facility("furnace", 100.0);
    let assembler = b.register_facility("assembler", 75.0);
    b.register_recipe(
        "smelt",
        vec![entry(ore, 1.0)],
        vec![entry(ingot, 1.0)],
        furnace,
        1.0,
    );
    b.register_recipe(
        "draw_wire",
        vec![entry(ingot, 1.0)],
        vec![entry(wire, 2.0)],
        assembler,
        1.0,
    );
    b.register_recipe(
        "press_plate",
        vec![entry(ingot, 2.0)],
        vec![entry(plate, 1.0)],
        assembler,
        2.0,
    );
    b.register_recipe(
        "assemble",
        vec![entry(wire, 3.0), entry(plate, 1.0)],
        vec![entry(circuit, 1.0)],
        assembler,
        2.0,
    );
    b.set_forced_raw("ore").unwrap();
    b.build().unwrap()
}

/// Pure two-item loop with no external feed: x -> y -> x.
pub fn loop_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let x = b.register_item("x", 1);
    let y = b.register_item("y", 1);
    let converter = b.register_facility("converter", 10.0);
    b.register_recipe(
        "x_to_y",
        vec![entry(x, 1.0)],
        vec![entry(y, 1.0)],
        converter,
        1.0,
    );
    b.register_recipe(
        "y_to_x",
        vec![entry(y, 1.0)],
        vec![entry(x, 1.0)],
        converter,
        1.0,
    );
    b.build().unwrap()
}

/// Catalyst cycle with a net-positive member and an external feed.
///
/// make_catalyst: 1 base -> 1 catalyst in 1s.
/// double: 1 x + 1 catalyst -> 2 y in 1s.
/// back: 1 y -> 1 x in 1s.
///
/// The {x, y, double, back} cycle nets +1 y per double cycle; catalyst
/// enters from outside.
pub fn catalyst_cycle_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let base = b.register_item("base", 1);
    let catalyst = b.register_item("catalyst", 1);
    let x = b.register_item("x", 2);
    let y = b.register_item("y", 2);
    let mixer = b.register_facility("mixer", 50.0);
    let reactor = b.register_facility("reactor", 200.0);
    b.register_recipe(
        "make_catalyst",
        vec![entry(base, 1.0)],
        vec![entry(catalyst, 1.0)],
        mixer,
        1.0,
    );
    b.register_recipe(
        "double",
        vec![entry(x, 1.0), entry(catalyst, 1.0)],
        vec![entry(y, 2.0)],
        reactor,
        1.0,
    );
    b.register_recipe(
        "back",
        vec![entry(y, 1.0)],
        vec![entry(x, 1.0)],
        reactor,
        1.0,
    );
    b.set_forced_raw("base").unwrap();
    b.build().unwrap()
}

/// Self-consuming recipe: breed turns 1 fuel into 2 fuel in 60s, for a net
/// gain of 1/min per breeder.
pub fn breeder_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let fuel = b.register_item("fuel", 1);
    let breeder = b.register_facility("breeder", 500.0);
    b.register_recipe(
        "breed",
        vec![entry(fuel, 1.0)],
        vec![entry(fuel, 2.0)],
        breeder,
        60.0,
    );
    b.build().unwrap()
}

/// Partial-return recipe: refining gives back some of the solvent it uses.
///
/// make_solvent: 1 base -> 1 solvent in 1s.
/// refine: 2 solvent -> 1 solvent + 1 extract in 1s (net 1 solvent
/// consumed per cycle).
pub fn partial_return_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let base = b.register_item("base", 1);
    let solvent = b.register_item("solvent", 1);
    let extract = b.register_item("extract", 2);
    let mixer = b.register_facility("mixer", 40.0);
    let refinery = b.register_facility("refinery", 220.0);
    b.register_recipe(
        "make_solvent",
        vec![entry(base, 1.0)],
        vec![entry(solvent, 1.0)],
        mixer,
        1.0,
    );
    b.register_recipe(
        "refine",
        vec![entry(solvent, 2.0)],
        vec![entry(solvent, 1.0), entry(extract, 1.0)],
        refinery,
        1.0,
    );
    b.set_forced_raw("base").unwrap();
    b.build().unwrap()
}

/// Multi-output recipe: refine turns 1 crude into 2 fuel + 1 resin in 1s.
pub fn refinery_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let crude = b.register_item("crude", 1);
    let fuel = b.register_item("fuel", 2);
    let resin = b.register_item("resin", 2);
    let refinery = b.register_facility("refinery", 300.0);
    b.register_recipe(
        "refine",
        vec![entry(crude, 1.0)],
        vec![entry(fuel, 2.0), entry(resin, 1.0)],
        refinery,
        1.0,
    );
    b.set_forced_raw("crude").unwrap();
    b.build().unwrap()
}

/// Two competing producers for plate; plate_from_scrap registers first and
/// is the default pick.
pub fn alt_recipe_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    let scrap = b.register_item("scrap", 1);
    let ore = b.register_item("ore", 1);
    let plate = b.register_item("plate", 2);
    let press = b.register_facility("press", 90.0);
    b.register_recipe(
        "plate_from_scrap",
        vec![entry(scrap, 1.0)],
        vec![entry(plate, 1.0)],
        press,
        1.0,
    );
    b.register_recipe(
        "plate_from_ore",
        vec![entry(ore, 2.0)],
        vec![entry(plate, 1.0)],
        press,
        1.0,
    );
    b.set_forced_raw("scrap").unwrap();
    b.set_forced_raw("ore").unwrap();
    b.build().unwrap()
}
