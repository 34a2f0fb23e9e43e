//! Dispense planning and execution.
//!
//! A `DispenseJob` is built fresh per activation: one timed run per
//! participating pump, `duration = volume_ml * secs_per_ml`. Execution
//! fans out one scoped thread per run — actuator ON, sleep, actuator OFF —
//! and the scope exit is the join barrier; control only returns once every
//! pump has completed its full runtime. The OFF edge is issued from a drop
//! guard, so it runs even if a task unwinds.
//!
//! Reentrancy: a single shared busy flag is checked-and-set on entry and
//! held through a fixed settle window after the barrier, so button events
//! that coincide with the end of actuation are ignored, never queued.

use bartender_config::{PumpMap, Recipe};
use bartender_traits::{Actuator, Clock, Display};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Number of progress updates rendered across one dispense.
pub const PROGRESS_STEPS: u32 = 100;

/// Fixed conversion from requested volume to actuation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRate {
    secs_per_ml: f32,
}

impl FlowRate {
    pub fn new(secs_per_ml: f32) -> Self {
        Self { secs_per_ml }
    }

    /// Actuation time for `volume_ml`. Non-positive, non-finite, or
    /// out-of-range inputs map to zero rather than panicking mid-pour.
    pub fn duration_for(&self, volume_ml: f32) -> Duration {
        if !volume_ml.is_finite() || volume_ml <= 0.0 {
            return Duration::ZERO;
        }
        let secs = f64::from(volume_ml) * f64::from(self.secs_per_ml);
        if !secs.is_finite() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

impl Default for FlowRate {
    fn default() -> Self {
        // 500 ml in 60 s of actuation
        Self::new(60.0 / 500.0)
    }
}

/// One pump's share of a dispense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpRun {
    pub pump: String,
    pub channel: u8,
    pub duration: Duration,
}

/// Ephemeral plan for a single dispense; discarded after the barrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispenseJob {
    pub runs: Vec<PumpRun>,
    pub max_duration: Duration,
}

impl DispenseJob {
    /// Plan a recipe pour: every pump currently assigned one of the
    /// recipe's ingredients runs for `volume * flow`. A zero-duration
    /// volume contributes no run. An ingredient with no assigned pump
    /// contributes no run and is logged — visibility filtering should have
    /// hidden the drink, so this is a logic-invariant violation, not a
    /// runtime error to recover from.
    pub fn for_recipe(recipe: &Recipe, pumps: &PumpMap, flow: FlowRate) -> Self {
        let mut runs = Vec::new();
        let mut max_duration = Duration::ZERO;
        for (ingredient, volume) in &recipe.ingredients {
            let duration = flow.duration_for(*volume);
            if duration.is_zero() {
                tracing::debug!(ingredient, volume, "non-positive volume, nothing to pour");
                continue;
            }
            let mut matched = false;
            for (id, pump) in pumps {
                if pump.value == *ingredient {
                    matched = true;
                    max_duration = max_duration.max(duration);
                    runs.push(PumpRun {
                        pump: id.clone(),
                        channel: pump.pin,
                        duration,
                    });
                }
            }
            if !matched {
                tracing::warn!(
                    ingredient,
                    drink = %recipe.name,
                    "ingredient has no assigned pump; filtering should have hidden this drink"
                );
            }
        }
        Self { runs, max_duration }
    }

    /// Plan a clean cycle: every configured pump, one fixed duration.
    pub fn clean_all(pumps: &PumpMap, per_pump: Duration) -> Self {
        let runs: Vec<PumpRun> = pumps
            .iter()
            .map(|(id, pump)| PumpRun {
                pump: id.clone(),
                channel: pump.pin,
                duration: per_pump,
            })
            .collect();
        let max_duration = if runs.is_empty() {
            Duration::ZERO
        } else {
            per_pump
        };
        Self { runs, max_duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseOutcome {
    /// Every pump task ran its full duration and was joined.
    Completed,
    /// The job had no runs; nothing was actuated.
    Empty,
    /// Another dispense held the busy flag; nothing was actuated.
    Rejected,
}

/// Opens the pump on construction and guarantees the OFF edge on drop.
struct PumpGuard<'a> {
    actuator: &'a dyn Actuator,
    channel: u8,
}

impl<'a> PumpGuard<'a> {
    fn open(actuator: &'a dyn Actuator, channel: u8) -> Self {
        actuator.set(channel, true);
        Self { actuator, channel }
    }
}

impl Drop for PumpGuard<'_> {
    fn drop(&mut self) {
        self.actuator.set(self.channel, false);
    }
}

/// Clears the shared busy flag on drop.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DispenseController {
    actuator: Arc<dyn Actuator>,
    clock: Arc<dyn Clock + Send + Sync>,
    busy: Arc<AtomicBool>,
    settle: Duration,
}

impl DispenseController {
    pub fn new(
        actuator: Arc<dyn Actuator>,
        clock: Arc<dyn Clock + Send + Sync>,
        settle: Duration,
    ) -> Self {
        Self {
            actuator,
            clock,
            busy: Arc::new(AtomicBool::new(false)),
            settle,
        }
    }

    /// Shared handle to the busy flag for input producers.
    pub fn busy_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.busy)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run a job to completion. Blocks the calling thread for
    /// `max_duration` plus the settle window; drives the progress report
    /// on that thread while the pump tasks sleep out their runtimes.
    pub fn dispense(&self, job: &DispenseJob, display: &mut dyn Display) -> DispenseOutcome {
        if job.runs.is_empty() {
            tracing::warn!("dispense job has no pump runs");
            return DispenseOutcome::Empty;
        }
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("dispense rejected: another dispense is in flight");
            return DispenseOutcome::Rejected;
        }
        let _busy = BusyGuard(&self.busy);

        tracing::info!(
            pumps = job.runs.len(),
            max_ms = job.max_duration.as_millis() as u64,
            "dispense start"
        );

        let actuator = &*self.actuator;
        let clock = &*self.clock;
        thread::scope(|s| {
            for run in &job.runs {
                s.spawn(move || {
                    tracing::debug!(
                        pump = %run.pump,
                        channel = run.channel,
                        ms = run.duration.as_millis() as u64,
                        "pump open"
                    );
                    let _pump = PumpGuard::open(actuator, run.channel);
                    clock.sleep(run.duration);
                });
            }
            self.report_progress(job.max_duration, display);
            // Scope exit joins every pump task: the barrier.
        });

        tracing::info!("dispense complete");
        // Spurious edges can coincide with the end of actuation; keep the
        // busy flag up through the settle window.
        self.clock.sleep(self.settle);
        DispenseOutcome::Completed
    }

    fn report_progress(&self, total: Duration, display: &mut dyn Display) {
        let step = total / PROGRESS_STEPS;
        for percent in 1..=PROGRESS_STEPS {
            display.clear();
            display.render_progress(percent as u8);
            display.present();
            self.clock.sleep(step);
        }
    }
}
