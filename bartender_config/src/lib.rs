#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Configuration for the bartender appliance.
//!
//! - `pumps`: the persisted pump-to-ingredient assignment, a JSON file
//!   keyed by pump id, loaded once at startup and rewritten on every edit.
//! - `settings`: optional TOML tuning knobs (flow rate, clean/settle
//!   timing, button pins, display layout, logging), validated after parse.
//! - `catalog`: the drink list and the selectable ingredient options,
//!   built in or loaded from TOML.

pub mod catalog;
pub mod pumps;
pub mod settings;

pub use catalog::{Catalog, IngredientOption, Recipe, load_catalog_toml};
pub use pumps::{PumpChannel, PumpConfigStore, PumpMap, parse_pumps};
pub use settings::{Settings, load_settings_toml};
