use bartender_config::{PumpChannel, PumpMap};
use bartender_core::mocks::{NullDisplay, RecordingActuator, RecordingDisplay};
use bartender_core::{DispenseController, DispenseJob, DispenseOutcome, FlowRate, PROGRESS_STEPS};
use bartender_traits::MonotonicClock;
use proptest::prelude::*;
use rstest::rstest;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn pumps(assignments: &[(&str, u8, &str)]) -> PumpMap {
    assignments
        .iter()
        .map(|(id, pin, value)| {
            (
                id.to_string(),
                PumpChannel {
                    name: id.to_uppercase(),
                    pin: *pin,
                    value: value.to_string(),
                },
            )
        })
        .collect()
}

fn recipe(name: &str, parts: &[(&str, f32)]) -> bartender_config::Recipe {
    bartender_config::Recipe {
        name: name.to_string(),
        ingredients: parts
            .iter()
            .map(|(ing, vol)| (ing.to_string(), *vol))
            .collect(),
    }
}

fn controller(actuator: &RecordingActuator, settle: Duration) -> DispenseController {
    DispenseController::new(
        Arc::new(actuator.clone()),
        Arc::new(MonotonicClock::new()),
        settle,
    )
}

#[test]
fn durations_follow_the_flow_rate() {
    // The worked example: FLOW = 60/500, gin 30 ml, tonic 90 ml.
    let config = pumps(&[("pump_1", 17, "gin"), ("pump_2", 27, "tonic")]);
    let drink = recipe("Test", &[("gin", 30.0), ("tonic", 90.0)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::new(60.0 / 500.0));

    assert_eq!(job.runs.len(), 2);
    let by_pump: BTreeMap<&str, Duration> = job
        .runs
        .iter()
        .map(|r| (r.pump.as_str(), r.duration))
        .collect();
    assert!((by_pump["pump_1"].as_secs_f64() - 3.6).abs() < 1e-3);
    assert!((by_pump["pump_2"].as_secs_f64() - 10.8).abs() < 1e-3);
    assert_eq!(job.max_duration, by_pump["pump_2"]);
}

#[test]
fn every_pump_assigned_the_ingredient_participates() {
    let config = pumps(&[("pump_1", 17, "gin"), ("pump_2", 27, "gin")]);
    let drink = recipe("Double", &[("gin", 50.0)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::default());
    assert_eq!(job.runs.len(), 2);
}

#[rstest]
#[case(0.0)]
#[case(-10.0)]
#[case(f32::NAN)]
fn non_positive_volume_contributes_no_run(#[case] volume: f32) {
    let config = pumps(&[("pump_1", 17, "gin")]);
    let drink = recipe("Flat", &[("gin", volume)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::default());
    assert!(job.runs.is_empty());
    assert_eq!(job.max_duration, Duration::ZERO);
}

#[test]
fn unassigned_ingredient_contributes_no_run() {
    let config = pumps(&[("pump_1", 17, "gin")]);
    let drink = recipe("Gimlet", &[("gin", 50.0), ("lime", 20.0)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::default());
    assert_eq!(job.runs.len(), 1);
    assert_eq!(job.runs[0].pump, "pump_1");
}

#[test]
fn clean_covers_every_configured_pump() {
    let config = pumps(&[
        ("pump_1", 17, "gin"),
        ("pump_2", 27, ""),
        ("pump_3", 22, "tonic"),
    ]);
    let job = DispenseJob::clean_all(&config, Duration::from_secs(20));
    assert_eq!(job.runs.len(), 3);
    assert!(job.runs.iter().all(|r| r.duration == Duration::from_secs(20)));
    assert_eq!(job.max_duration, Duration::from_secs(20));
}

#[test]
fn empty_job_actuates_nothing() {
    let actuator = RecordingActuator::new();
    let ctl = controller(&actuator, Duration::ZERO);
    let job = DispenseJob {
        runs: Vec::new(),
        max_duration: Duration::ZERO,
    };
    assert_eq!(
        ctl.dispense(&job, &mut NullDisplay),
        DispenseOutcome::Empty
    );
    assert!(actuator.edges().is_empty());
}

#[test]
fn barrier_returns_only_after_the_slowest_pump() {
    let config = pumps(&[("pump_1", 17, "gin"), ("pump_2", 27, "tonic")]);
    // 30 ml and 90 ml at 1 ms/ml: 30 ms and 90 ms of actuation.
    let drink = recipe("Quick", &[("gin", 30.0), ("tonic", 90.0)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::new(0.001));

    let actuator = RecordingActuator::new();
    let ctl = controller(&actuator, Duration::ZERO);

    let started = Instant::now();
    let outcome = ctl.dispense(&job, &mut NullDisplay);
    let elapsed = started.elapsed();

    assert_eq!(outcome, DispenseOutcome::Completed);
    assert!(
        elapsed >= Duration::from_millis(90),
        "returned after {elapsed:?}, before the slowest pump finished"
    );
    assert!(!actuator.any_on(), "an actuator was left ON");
    assert!(!ctl.is_busy());

    // Per channel: ON strictly precedes OFF, exactly one of each.
    for channel in [17u8, 27u8] {
        let edges: Vec<bool> = actuator
            .edges()
            .into_iter()
            .filter(|(ch, _)| *ch == channel)
            .map(|(_, on)| on)
            .collect();
        assert_eq!(edges, [true, false], "channel {channel}");
    }
}

#[test]
fn busy_flag_is_up_during_the_pour_and_held_through_settle() {
    let config = pumps(&[("pump_1", 17, "gin")]);
    let drink = recipe("Shot", &[("gin", 80.0)]);
    // 80 ms pour + 40 ms settle
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::new(0.001));

    let actuator = RecordingActuator::new();
    let ctl = controller(&actuator, Duration::from_millis(40));

    let started = Instant::now();
    std::thread::scope(|s| {
        let ctl = &ctl;
        let handle = s.spawn(move || ctl.dispense(&job, &mut NullDisplay));

        // Observe the flag from the input thread's point of view.
        let saw_busy = (0..200).any(|_| {
            std::thread::sleep(Duration::from_millis(1));
            ctl.is_busy()
        });
        assert!(saw_busy, "busy flag never went up during the dispense");
        assert_eq!(handle.join().unwrap(), DispenseOutcome::Completed);
    });

    assert!(started.elapsed() >= Duration::from_millis(120));
    assert!(!ctl.is_busy(), "busy flag must clear after settle");
}

#[test]
fn concurrent_dispense_is_rejected() {
    let actuator = RecordingActuator::new();
    let ctl = controller(&actuator, Duration::ZERO);
    ctl.busy_flag().store(true, std::sync::atomic::Ordering::Release);

    let config = pumps(&[("pump_1", 17, "gin")]);
    let drink = recipe("Shot", &[("gin", 10.0)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::new(0.001));

    assert_eq!(
        ctl.dispense(&job, &mut NullDisplay),
        DispenseOutcome::Rejected
    );
    assert!(actuator.edges().is_empty(), "rejected job must not actuate");
}

#[test]
fn progress_runs_through_all_steps() {
    let config = pumps(&[("pump_1", 17, "gin")]);
    let drink = recipe("Shot", &[("gin", 20.0)]);
    let job = DispenseJob::for_recipe(&drink, &config, FlowRate::new(0.001));

    let actuator = RecordingActuator::new();
    let ctl = controller(&actuator, Duration::ZERO);
    let mut display = RecordingDisplay::default();
    ctl.dispense(&job, &mut display);

    let expected: Vec<u8> = (1..=PROGRESS_STEPS as u8).collect();
    assert_eq!(display.progress, expected);
    assert_eq!(display.presents as u32, PROGRESS_STEPS);
}

proptest! {
    #[test]
    fn duration_is_volume_times_flow(volume in 0.1f32..500.0, secs_per_ml in 0.001f32..1.0) {
        let d = FlowRate::new(secs_per_ml).duration_for(volume);
        let expected = f64::from(volume) * f64::from(secs_per_ml);
        prop_assert!((d.as_secs_f64() - expected).abs() < 1e-6);
    }

    #[test]
    fn max_duration_is_the_longest_run(volumes in proptest::collection::vec(0.1f32..500.0, 1..6)) {
        let config: PumpMap = volumes
            .iter()
            .enumerate()
            .map(|(i, _)| {
                (
                    format!("pump_{i}"),
                    PumpChannel {
                        name: format!("Pump {i}"),
                        pin: i as u8,
                        value: format!("ing_{i}"),
                    },
                )
            })
            .collect();
        let drink = bartender_config::Recipe {
            name: "prop".to_string(),
            ingredients: volumes
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("ing_{i}"), *v))
                .collect(),
        };
        let job = DispenseJob::for_recipe(&drink, &config, FlowRate::new(0.01));
        let longest = job.runs.iter().map(|r| r.duration).max().unwrap_or_default();
        prop_assert_eq!(job.max_duration, longest);
        prop_assert_eq!(job.runs.len(), volumes.len());
    }
}
