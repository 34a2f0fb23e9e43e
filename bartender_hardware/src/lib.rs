//! Hardware backends for the appliance.
//!
//! Simulation is the default: `SimulatedPumps` tracks channel state in
//! memory and `ConsoleDisplay` renders to stdout, so the whole appliance
//! runs on a workstation. The `hardware` feature adds Raspberry Pi GPIO
//! pumps and buttons via `rppal` (Linux only).

pub mod error;
pub mod stdin;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

use bartender_traits::{Actuator, Display};
use bartender_ui::progress_line;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

/// Simulated pump bank: records channel state and logs every edge.
#[derive(Debug, Default)]
pub struct SimulatedPumps {
    channels: Mutex<BTreeMap<u8, bool>>,
}

impl SimulatedPumps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, channel: u8) -> bool {
        self.channels
            .lock()
            .map(|m| m.get(&channel).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    pub fn any_on(&self) -> bool {
        self.channels
            .lock()
            .map(|m| m.values().any(|on| *on))
            .unwrap_or(false)
    }
}

impl Actuator for SimulatedPumps {
    fn set(&self, channel: u8, on: bool) {
        tracing::info!(channel, on, "pump (simulated)");
        if let Ok(mut channels) = self.channels.lock() {
            channels.insert(channel, on);
        }
    }
}

enum Frame {
    Empty,
    Text(Vec<String>),
    Progress(String),
}

/// Console display: menu text as plain lines, progress as a carriage-
/// returned bar so the terminal shows one updating line per dispense.
pub struct ConsoleDisplay {
    progress_cols: usize,
    frame: Frame,
    mid_progress: bool,
}

impl ConsoleDisplay {
    pub fn new(progress_cols: usize) -> Self {
        Self {
            progress_cols,
            frame: Frame::Empty,
            mid_progress: false,
        }
    }
}

impl Display for ConsoleDisplay {
    fn clear(&mut self) {
        self.frame = Frame::Empty;
    }

    fn render_text(&mut self, lines: &[String]) {
        self.frame = Frame::Text(lines.to_vec());
    }

    fn render_progress(&mut self, percent: u8) {
        self.frame = Frame::Progress(progress_line(percent, self.progress_cols));
    }

    fn present(&mut self) {
        match &self.frame {
            Frame::Empty => {}
            Frame::Text(lines) => {
                if self.mid_progress {
                    println!();
                    self.mid_progress = false;
                }
                for line in lines {
                    println!("{line}");
                }
            }
            Frame::Progress(line) => {
                print!("\r{line}");
                let _ = std::io::stdout().flush();
                self.mid_progress = true;
            }
        }
    }
}
