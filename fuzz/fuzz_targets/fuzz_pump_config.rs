#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Fuzz the pump configuration loader: arbitrary JSON must either parse
    // into a validated map or be rejected gracefully, never panic.
    let _ = bartender_config::parse_pumps(data);
});
