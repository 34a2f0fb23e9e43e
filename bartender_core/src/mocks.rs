//! Test and helper mocks for bartender_core.

use crate::context::MenuDelegate;
use crate::menu::{MenuItem, MenuTree};
use bartender_traits::{Actuator, Display};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ActuatorState {
    edges: Vec<(u8, bool)>,
    on: BTreeSet<u8>,
}

/// Actuator spy: records every edge and tracks which channels are live.
/// Cloning shares the recorded state.
#[derive(Default, Clone)]
pub struct RecordingActuator {
    state: Arc<Mutex<ActuatorState>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(channel, on)` edges in the order they were issued.
    pub fn edges(&self) -> Vec<(u8, bool)> {
        self.state.lock().map(|s| s.edges.clone()).unwrap_or_default()
    }

    /// True while any channel is actuated.
    pub fn any_on(&self) -> bool {
        self.state.lock().map(|s| !s.on.is_empty()).unwrap_or(false)
    }

    pub fn is_on(&self, channel: u8) -> bool {
        self.state
            .lock()
            .map(|s| s.on.contains(&channel))
            .unwrap_or(false)
    }

    /// True when the channel saw an ON edge at some point.
    pub fn saw_on(&self, channel: u8) -> bool {
        self.state
            .lock()
            .map(|s| s.edges.iter().any(|&(ch, on)| ch == channel && on))
            .unwrap_or(false)
    }
}

impl Actuator for RecordingActuator {
    fn set(&self, channel: u8, on: bool) {
        if let Ok(mut s) = self.state.lock() {
            s.edges.push((channel, on));
            if on {
                s.on.insert(channel);
            } else {
                s.on.remove(&channel);
            }
        }
    }
}

/// Display that swallows everything; for tests that don't assert rendering.
#[derive(Debug, Default)]
pub struct NullDisplay;

impl Display for NullDisplay {
    fn clear(&mut self) {}
    fn render_text(&mut self, _lines: &[String]) {}
    fn render_progress(&mut self, _percent: u8) {}
    fn present(&mut self) {}
}

/// Display spy recording everything it is asked to render.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub texts: Vec<Vec<String>>,
    pub progress: Vec<u8>,
    pub clears: usize,
    pub presents: usize,
}

impl Display for RecordingDisplay {
    fn clear(&mut self) {
        self.clears += 1;
    }
    fn render_text(&mut self, lines: &[String]) {
        self.texts.push(lines.to_vec());
    }
    fn render_progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }
    fn present(&mut self) {
        self.presents += 1;
    }
}

/// Delegate spy for menu/context tests: hides items by label, records
/// activations and renders, and answers `item_activated` with a canned
/// result.
pub struct SpyDelegate {
    pub hidden: BTreeSet<String>,
    pub activated: Vec<String>,
    pub shown: Vec<String>,
    pub handled: bool,
}

impl Default for SpyDelegate {
    fn default() -> Self {
        Self {
            hidden: BTreeSet::new(),
            activated: Vec::new(),
            shown: Vec::new(),
            handled: true,
        }
    }
}

impl SpyDelegate {
    pub fn hiding<const N: usize>(labels: [&str; N]) -> Self {
        Self {
            hidden: labels.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl MenuDelegate for SpyDelegate {
    fn prepare_for_render(&mut self, tree: &mut MenuTree) {
        for id in tree.ids() {
            for item in &mut tree.node_mut(id).items {
                item.visible = !self.hidden.contains(&item.label);
            }
        }
    }

    fn item_activated(&mut self, item: &MenuItem) -> bool {
        self.activated.push(item.label.clone());
        self.handled
    }

    fn show_item(&mut self, item: &MenuItem) {
        self.shown.push(item.label.clone());
    }
}
