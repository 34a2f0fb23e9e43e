//! Appliance tuning knobs, deserialized from TOML and validated.
//!
//! Every section carries factory defaults, so the settings file is
//! optional and may be partial.

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub dispense: DispenseCfg,
    pub buttons: ButtonsCfg,
    pub display: DisplayCfg,
    pub logging: Logging,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispenseCfg {
    /// Seconds of pump actuation per millilitre of ingredient.
    pub secs_per_ml: f32,
    /// Fixed per-pump runtime for the clean cycle, in seconds.
    pub clean_secs: u64,
    /// How long input stays untrusted after a dispense completes, in ms.
    pub settle_ms: u64,
}

impl Default for DispenseCfg {
    fn default() -> Self {
        Self {
            // 500 ml in 60 s of actuation
            secs_per_ml: 60.0 / 500.0,
            clean_secs: 20,
            settle_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ButtonsCfg {
    /// BCM pin of the advance (left) button.
    pub advance_pin: u8,
    /// BCM pin of the select (right) button.
    pub select_pin: u8,
    /// Debounce window applied by the input layer, in ms.
    pub bounce_ms: u64,
}

impl Default for ButtonsCfg {
    fn default() -> Self {
        Self {
            advance_pin: 13,
            select_pin: 5,
            bounce_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// Word-wrap width in columns for menu text.
    pub wrap_width: usize,
    /// Interior width of the textual progress bar.
    pub progress_cols: usize,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            wrap_width: 13,
            progress_cols: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    /// Path to a JSON-lines log file; console-only when absent.
    pub file: Option<String>,
    /// Log level for the file layer ("info", "debug", ...).
    pub level: Option<String>,
    /// Rotation policy: "never" | "daily" | "hourly" (default: never).
    pub rotation: Option<String>,
}

pub fn load_settings_toml(s: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str::<Settings>(s)
}

impl Settings {
    pub fn validate(&self) -> eyre::Result<()> {
        if !self.dispense.secs_per_ml.is_finite() || self.dispense.secs_per_ml <= 0.0 {
            eyre::bail!("dispense.secs_per_ml must be a positive number");
        }
        if self.dispense.secs_per_ml > 10.0 {
            eyre::bail!("dispense.secs_per_ml is unreasonably large (>10 s/ml)");
        }
        if self.dispense.clean_secs == 0 {
            eyre::bail!("dispense.clean_secs must be >= 1");
        }
        if self.dispense.clean_secs > 600 {
            eyre::bail!("dispense.clean_secs is unreasonably large (>10min)");
        }
        if self.dispense.settle_ms > 60_000 {
            eyre::bail!("dispense.settle_ms is unreasonably large (>60s)");
        }
        if self.buttons.bounce_ms == 0 {
            eyre::bail!("buttons.bounce_ms must be >= 1");
        }
        if self.buttons.advance_pin == self.buttons.select_pin {
            eyre::bail!("buttons.advance_pin and buttons.select_pin must differ");
        }
        if self.display.wrap_width == 0 {
            eyre::bail!("display.wrap_width must be >= 1");
        }
        if self.display.progress_cols == 0 {
            eyre::bail!("display.progress_cols must be >= 1");
        }
        if let Some(rot) = &self.logging.rotation
            && !matches!(rot.as_str(), "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }
        Ok(())
    }
}
