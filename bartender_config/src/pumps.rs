//! Persisted pump configuration.
//!
//! The backing file is a JSON object keyed by pump id:
//!
//! ```json
//! {
//!   "pump_1": { "name": "Pump 1", "pin": 17, "value": "gin" },
//!   "pump_2": { "name": "Pump 2", "pin": 27, "value": "" }
//! }
//! ```
//!
//! `pin` is fixed wiring and never changes at runtime; `value` is the
//! assigned ingredient id (empty = unassigned) and is the only field the
//! configuration menu edits. Load happens once at startup and is fatal on
//! failure; every edit rewrites the whole file.

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One hardware pump: display name, actuator channel, assigned ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpChannel {
    pub name: String,
    pub pin: u8,
    #[serde(default)]
    pub value: String,
}

/// Pump id -> channel. A `BTreeMap` so menu construction and the clean
/// cycle iterate pumps in stable sorted order.
pub type PumpMap = BTreeMap<String, PumpChannel>;

/// Parse and sanity-check a pump map from JSON text.
pub fn parse_pumps(text: &str) -> eyre::Result<PumpMap> {
    let pumps: PumpMap =
        serde_json::from_str(text).map_err(|e| eyre::eyre!("malformed pump configuration: {e}"))?;
    if pumps.is_empty() {
        eyre::bail!("pump configuration must define at least one pump");
    }
    let mut seen = std::collections::BTreeSet::new();
    for (id, pump) in &pumps {
        if id.is_empty() {
            eyre::bail!("pump id must not be empty");
        }
        if pump.name.is_empty() {
            eyre::bail!("pump '{id}' has an empty display name");
        }
        if !seen.insert(pump.pin) {
            eyre::bail!("pump '{id}' reuses actuator pin {}", pump.pin);
        }
    }
    Ok(pumps)
}

/// Owns the in-memory pump map plus the path it round-trips through.
#[derive(Debug)]
pub struct PumpConfigStore {
    path: PathBuf,
    pumps: PumpMap,
}

impl PumpConfigStore {
    /// Load the configuration at startup. A missing or malformed file is a
    /// fatal error: the appliance cannot run without known assignments.
    pub fn load(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("read pump configuration {}", path.display()))?;
        let pumps = parse_pumps(&text)
            .wrap_err_with(|| format!("load pump configuration {}", path.display()))?;
        Ok(Self { path, pumps })
    }

    /// Build a store around an already-validated map, e.g. a test fixture.
    pub fn with_map(path: impl Into<PathBuf>, pumps: PumpMap) -> Self {
        Self {
            path: path.into(),
            pumps,
        }
    }

    /// Rewrite the whole file. Writes a sibling temp file and renames it
    /// over the target; last writer wins, no merge semantics.
    pub fn save(&self) -> eyre::Result<()> {
        let json = serde_json::to_string_pretty(&self.pumps)
            .wrap_err("serialize pump configuration")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .wrap_err_with(|| format!("write pump configuration {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .wrap_err_with(|| format!("replace pump configuration {}", self.path.display()))?;
        Ok(())
    }

    /// Assign `ingredient` to `pump` and persist immediately.
    pub fn set_ingredient(&mut self, pump: &str, ingredient: &str) -> eyre::Result<()> {
        let Some(channel) = self.pumps.get_mut(pump) else {
            eyre::bail!("unknown pump id '{pump}'");
        };
        channel.value = ingredient.to_string();
        self.save().wrap_err("persist ingredient assignment")
    }

    pub fn pumps(&self) -> &PumpMap {
        &self.pumps
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current assignment for one pump, if the pump exists.
    pub fn assigned_ingredient(&self, pump: &str) -> Option<&str> {
        self.pumps.get(pump).map(|p| p.value.as_str())
    }

    /// True when at least one pump currently carries `ingredient`.
    pub fn is_assigned(&self, ingredient: &str) -> bool {
        !ingredient.is_empty() && self.pumps.values().any(|p| p.value == ingredient)
    }
}
