//! Craftplan Core -- static game data for the production planner.
//!
//! This crate holds the immutable domain tables every plan computation reads:
//! items (with tier and forced-raw configuration), recipes (inputs, outputs,
//! facility, crafting time), and facilities (power draw). Tables are built
//! once through [`registry::RegistryBuilder`] and frozen into a
//! [`registry::Registry`]; the solver crate treats them as trusted, read-only
//! lookups.
//!
//! # Key Types
//!
//! - [`id::ItemId`], [`id::RecipeId`], [`id::FacilityId`] -- cheap copyable
//!   registry handles.
//! - [`registry::Registry`] -- immutable item/recipe/facility tables with a
//!   producing-recipe index per item (frozen at startup).
//! - [`data_loader`] -- feature-gated JSON loading of game data tables.

pub mod id;
pub mod registry;

#[cfg(feature = "data-loader")]
pub mod data_loader;
