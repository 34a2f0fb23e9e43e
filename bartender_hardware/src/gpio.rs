//! Raspberry Pi GPIO backends (feature `hardware`, Linux only).

use crate::error::{HwError, Result};
use bartender_config::PumpMap;
use bartender_traits::{Actuator, ButtonEvent};
use crossbeam_channel::Sender;
use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const BUTTON_POLL: Duration = Duration::from_millis(5);

/// Relay-driven pump bank. The wiring is active-low: a channel idles HIGH
/// and pours while LOW, so pins are initialized HIGH before anything else.
pub struct GpioPumps {
    pins: Mutex<BTreeMap<u8, OutputPin>>,
}

impl GpioPumps {
    pub fn new(pumps: &PumpMap) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pins = BTreeMap::new();
        for (id, pump) in pumps {
            let mut pin = gpio
                .get(pump.pin)
                .map_err(|e| HwError::Gpio(format!("pump '{id}' pin {}: {e}", pump.pin)))?
                .into_output();
            pin.set_high();
            pins.insert(pump.pin, pin);
        }
        tracing::info!(pumps = pins.len(), "gpio pump bank ready");
        Ok(Self {
            pins: Mutex::new(pins),
        })
    }
}

impl Actuator for GpioPumps {
    fn set(&self, channel: u8, on: bool) {
        if let Ok(mut pins) = self.pins.lock() {
            match pins.get_mut(&channel) {
                Some(pin) => {
                    if on {
                        pin.set_low();
                    } else {
                        pin.set_high();
                    }
                }
                None => tracing::error!(channel, "no pump wired to channel"),
            }
        }
    }
}

/// Two-button poll thread: watches for falling edges on pulled-up inputs,
/// applies a quiet-window debounce, and forwards events unless a dispense
/// holds the busy flag. The thread is joined on drop.
pub struct GpioButtons {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GpioButtons {
    pub fn spawn(
        advance_pin: u8,
        select_pin: u8,
        bounce: Duration,
        tx: Sender<ButtonEvent>,
        busy: Arc<AtomicBool>,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let advance = gpio
            .get(advance_pin)
            .map_err(|e| HwError::Gpio(format!("advance button pin {advance_pin}: {e}")))?
            .into_input_pullup();
        let select = gpio
            .get(select_pin)
            .map_err(|e| HwError::Gpio(format!("select button pin {select_pin}: {e}")))?
            .into_input_pullup();

        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&shutdown);
        let handle = std::thread::spawn(move || {
            poll_buttons(advance, select, bounce, &tx, &busy, &stop);
            tracing::debug!("button poll thread exiting");
        });
        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }
}

fn poll_buttons(
    advance: InputPin,
    select: InputPin,
    bounce: Duration,
    tx: &Sender<ButtonEvent>,
    busy: &AtomicBool,
    stop: &AtomicBool,
) {
    let mut last_advance = Level::High;
    let mut last_select = Level::High;
    let mut quiet_until = Instant::now();

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let now = Instant::now();
        let advance_level = advance.read();
        let select_level = select.read();

        let mut event = None;
        if last_advance == Level::High && advance_level == Level::Low {
            event = Some(ButtonEvent::Advance);
        } else if last_select == Level::High && select_level == Level::Low {
            event = Some(ButtonEvent::Select);
        }
        last_advance = advance_level;
        last_select = select_level;

        if let Some(event) = event
            && now >= quiet_until
        {
            quiet_until = now + bounce;
            if busy.load(Ordering::Acquire) {
                tracing::debug!(?event, "button dropped while dispensing");
            } else if tx.send(event).is_err() {
                break;
            }
        }
        std::thread::sleep(BUTTON_POLL);
    }
}

impl Drop for GpioButtons {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("button poll thread panicked during shutdown");
        }
    }
}
