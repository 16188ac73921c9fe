//! JSON data tables through the full planning pipeline.

use craftplan_core::data_loader::load_game_data_json;
use craftplan_solver::{compute_plan, PlanOptions, Target};

const GAME_DATA: &str = r#"{
    "items": [
        { "name": "originium_ore", "tier": 1, "raw": true },
        { "name": "originium", "tier": 1 },
        { "name": "component", "tier": 2 }
    ],
    "facilities": [
        { "name": "crusher", "power": 240.0 },
        { "name": "fitting_station", "power": 120.0 }
    ],
    "recipes": [
        {
            "name": "crush_ore",
            "facility": "crusher",
            "seconds": 2.0,
            "inputs": [{ "item": "originium_ore", "amount": 2.0 }],
            "outputs": [{ "item": "originium", "amount": 1.0 }]
        },
        {
            "name": "fit_component",
            "facility": "fitting_station",
            "seconds": 3.0,
            "inputs": [{ "item": "originium", "amount": 1.0 }],
            "outputs": [{ "item": "component", "amount": 1.0 }]
        }
    ]
}"#;

#[test]
fn loaded_tables_plan_end_to_end() {
    let reg = load_game_data_json(GAME_DATA).unwrap().build().unwrap();
    let component = reg.item_id("component").unwrap();
    let plan = compute_plan(
        &reg,
        &[Target::per_minute(component, 40.0)],
        &PlanOptions::default(),
    )
    .unwrap();

    // fit_component runs at 20/min per station, crush_ore at 30/min per
    // crusher; 40 component/min takes 2 stations and 4/3 crushers.
    let fit = reg.recipe_id("fit_component").unwrap();
    let crush = reg.recipe_id("crush_ore").unwrap();
    assert!((plan.recipe(fit).unwrap().facility_count - 2.0).abs() < 1e-9);
    assert!((plan.recipe(crush).unwrap().facility_count - 40.0 / 30.0).abs() < 1e-9);

    // Raw flag from the table carries through: 2 ore per crush cycle.
    let ore = reg.item_id("originium_ore").unwrap();
    let node = plan.item(ore).unwrap();
    assert!(node.is_raw);
    assert!((node.rate - 80.0).abs() < 1e-9);
}

#[test]
fn bad_item_reference_fails_loading() {
    let data = r#"{
        "items": [{ "name": "a" }],
        "facilities": [{ "name": "f" }],
        "recipes": [{
            "name": "bad",
            "facility": "f",
            "seconds": 1.0,
            "inputs": [{ "item": "missing", "amount": 1.0 }],
            "outputs": [{ "item": "a", "amount": 1.0 }]
        }]
    }"#;
    assert!(load_game_data_json(data).is_err());
}
