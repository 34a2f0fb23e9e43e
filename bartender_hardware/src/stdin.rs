//! Keyboard fallback input for running without wired buttons:
//! `l` + Enter advances, `r` + Enter selects.

use bartender_traits::ButtonEvent;
use crossbeam_channel::Sender;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

/// Spawn the stdin reader thread. Events are dropped while `busy` is up,
/// mirroring the hardware buttons. The thread exits on EOF or when the
/// receiver goes away.
pub fn spawn_stdin_input(tx: Sender<ButtonEvent>, busy: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let event = match line.trim() {
                "l" | "L" => Some(ButtonEvent::Advance),
                "r" | "R" => Some(ButtonEvent::Select),
                "" => None,
                other => {
                    tracing::debug!(input = other, "unmapped key");
                    None
                }
            };
            let Some(event) = event else { continue };
            if busy.load(Ordering::Acquire) {
                tracing::debug!(?event, "key dropped while dispensing");
                continue;
            }
            if tx.send(event).is_err() {
                break;
            }
        }
        tracing::debug!("stdin input thread exiting");
    })
}
