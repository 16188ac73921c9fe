//! Refinery planning example: targets, cycles, and capacity splitting.
//!
//! Builds a small oil-processing setup where part of the fuel output is
//! burned to blend the refinery feed, computes the plan for a fuel target,
//! and prints the per-recipe facility counts, the detected cycle, the
//! total power draw, and the discrete facility units behind one fractional
//! count.
//!
//! Run with: `cargo run -p craftplan-examples --example refinery_plan`

use craftplan_core::registry::{RecipeEntry, RegistryBuilder};
use craftplan_solver::alloc::split_units;
use craftplan_solver::{compute_plan, PlanOptions, Target};

fn entry(item: craftplan_core::id::ItemId, amount: f64) -> RecipeEntry {
    RecipeEntry { item, amount }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // --- Register game data ---

    let mut builder = RegistryBuilder::new();
    let crude = builder.register_item("crude_oil", 1);
    let feed = builder.register_item("refinery_feed", 1);
    let fuel = builder.register_item("fuel", 2);
    builder
        .set_forced_raw("crude_oil")
        .expect("crude_oil registered");

    let mixer = builder.register_facility("mixer", 150.0);
    let refinery = builder.register_facility("refinery", 600.0);

    // Blending burns a little fuel, and refining makes fuel from the blend,
    // so the two recipes form a production cycle.
    builder.register_recipe(
        "blend_feed",
        vec![entry(crude, 2.0), entry(fuel, 0.5)],
        vec![entry(feed, 3.0)],
        mixer,
        2.0,
    );
    builder.register_recipe(
        "refine",
        vec![entry(feed, 3.0)],
        vec![entry(fuel, 4.0)],
        refinery,
        4.0,
    );

    let registry = builder.build().expect("valid game data");

    // --- Solve for 120 fuel/min ---

    let plan = compute_plan(
        &registry,
        &[Target::per_minute(fuel, 120.0)],
        &PlanOptions::default(),
    )
    .expect("solvable plan");

    println!("=== Plan for 120 fuel/min ===\n");
    for name in ["blend_feed", "refine"] {
        let id = registry.recipe_id(name).expect("known recipe");
        if let Some(node) = plan.recipe(id) {
            let facility = node
                .facility
                .and_then(|f| registry.get_facility(f))
                .map(|f| f.name.as_str())
                .unwrap_or("?");
            println!(
                "{name:>12}: {:.3} x {facility} ({:.1} cycles/min)",
                node.facility_count, node.rate
            );
        }
    }

    let crude_node = plan.item(crude).expect("crude in plan");
    println!("\ncrude_oil intake: {:.1}/min", crude_node.rate);
    println!("total power: {:.0} kW", plan.total_power(&registry));

    // --- Detected cycles ---

    for cycle in &plan.cycles {
        let items: Vec<&str> = cycle
            .items
            .iter()
            .filter_map(|&i| registry.get_item(i).map(|d| d.name.as_str()))
            .collect();
        println!("\ncycle #{} over {:?}", cycle.id, items);
        for (&item, &net) in &cycle.net_output {
            if net.abs() > 1e-6 {
                let name = registry
                    .get_item(item)
                    .map(|d| d.name.as_str())
                    .unwrap_or("?");
                println!("  net output {name}: {net:.1}/min");
            }
        }
    }

    // --- Discrete units for one fractional count ---

    let refine = registry.recipe_id("refine").expect("known recipe");
    let count = plan
        .recipe(refine)
        .map(|n| n.facility_count)
        .unwrap_or(0.0);
    println!("\nrefine at {count:.3} facilities becomes:");
    for unit in split_units(count) {
        println!(
            "  unit {}: {:.0}% utilization",
            unit.index,
            unit.utilization * 100.0
        );
    }
}
