#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Appliance core (hardware-agnostic).
//!
//! All hardware interaction goes through `bartender_traits::Actuator` and
//! `bartender_traits::Display`.
//!
//! ## Architecture
//!
//! - **Menu**: arena-backed menu tree (`menu` module) plus the two-button
//!   cursor machine driving it (`context` module)
//! - **Dispense**: recipe → per-pump timed fan-out with a join barrier and
//!   reentrancy suppression (`dispense` module)
//! - **Appliance**: the one `MenuDelegate` implementation — visibility
//!   filtering, assignment annotation, activation dispatch (`appliance`)
//! - **Input**: busy-gated button event dispatch (`input` module)
//!
//! ## Timing
//!
//! Pump runtimes are derived as `volume_ml * secs_per_ml` and slept on the
//! shared `Clock`, so the whole dispense path is deterministic under a test
//! clock. Scheduling is best-effort; there are no real-time guarantees.

pub mod appliance;
pub mod context;
pub mod dispense;
pub mod error;
pub mod input;
pub mod menu;
pub mod mocks;

pub use appliance::{Appliance, ApplianceConfig};
pub use context::{MenuContext, MenuDelegate};
pub use dispense::{
    DispenseController, DispenseJob, DispenseOutcome, FlowRate, PROGRESS_STEPS, PumpRun,
};
pub use error::{ApplianceError, Result};
pub use menu::{MenuAction, MenuEntry, MenuId, MenuItem, MenuTree};
