//! Button event plumbing between the input producers and the control loop.
//!
//! Producers (GPIO poll thread, stdin reader) send debounced edge events
//! into a small bounded channel. The control loop dispatches them into the
//! menu, gated on the dispense busy flag: events arriving while a dispense
//! is in flight are dropped, never queued.

use crate::context::{MenuContext, MenuDelegate};
use bartender_traits::ButtonEvent;
use crossbeam_channel as xch;
use std::sync::atomic::{AtomicBool, Ordering};

/// Bounded event channel. Small on purpose: a burst of presses has no
/// business being replayed later.
pub fn channel() -> (xch::Sender<ButtonEvent>, xch::Receiver<ButtonEvent>) {
    xch::bounded(8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    IgnoredBusy,
}

/// Apply one event to the menu unless a dispense holds the busy flag.
pub fn dispatch(
    event: ButtonEvent,
    busy: &AtomicBool,
    ctx: &mut MenuContext,
    delegate: &mut dyn MenuDelegate,
) -> Dispatch {
    if busy.load(Ordering::Acquire) {
        tracing::debug!(?event, "input ignored while dispensing");
        return Dispatch::IgnoredBusy;
    }
    match event {
        ButtonEvent::Advance => ctx.advance(delegate),
        ButtonEvent::Select => ctx.select(delegate),
    }
    Dispatch::Applied
}

/// Drop events that piled up while a dispense was in flight. Returns how
/// many were discarded.
pub fn drain(rx: &xch::Receiver<ButtonEvent>) -> usize {
    let dropped = rx.try_iter().count();
    if dropped > 0 {
        tracing::debug!(dropped, "discarded stale button events");
    }
    dropped
}
