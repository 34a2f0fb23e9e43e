//! Bartender appliance binary: configuration loading, logging setup,
//! hardware assembly, and the interactive run loop.

mod cli;
mod error_fmt;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use bartender_config::settings::Logging;
use bartender_config::{Catalog, PumpConfigStore, Settings};
use bartender_core::{
    Appliance, ApplianceConfig, DispenseController, DispenseOutcome, FlowRate, MenuContext, input,
};
use bartender_hardware::ConsoleDisplay;
use bartender_hardware::stdin::spawn_stdin_input;
use bartender_traits::{Actuator, MonotonicClock};
use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use eyre::WrapErr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() {
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);
    let _ = color_eyre::install();

    if let Err(err) = run(args) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn run(args: Cli) -> eyre::Result<()> {
    let settings = load_settings(&args)?;
    init_logging(&args.log_level, &settings.logging);
    settings.validate().wrap_err("invalid settings")?;

    let catalog = load_catalog(&args)?;
    // Fatal when missing or malformed: the appliance cannot run without
    // known pump assignments.
    let store = PumpConfigStore::load(&args.pumps)?;

    tracing::info!(
        pumps = store.pumps().len(),
        drinks = catalog.drinks.len(),
        "configuration loaded"
    );

    match args.cmd {
        Commands::Run => run_appliance(store, catalog, &settings),
        Commands::Dispense { drink } => {
            let exit = Arc::new(AtomicBool::new(false));
            let mut app = build_appliance(store, catalog, &settings, &exit)?;
            match app.dispense_drink(&drink)? {
                DispenseOutcome::Completed => {
                    println!("Poured: {drink}");
                    Ok(())
                }
                DispenseOutcome::Empty => {
                    eyre::bail!("nothing to pour for '{drink}' (all volumes are zero)")
                }
                DispenseOutcome::Rejected => eyre::bail!("another dispense is in flight"),
            }
        }
        Commands::Clean => {
            let exit = Arc::new(AtomicBool::new(false));
            let mut app = build_appliance(store, catalog, &settings, &exit)?;
            match app.clean() {
                DispenseOutcome::Completed => {
                    println!("Clean cycle finished");
                    Ok(())
                }
                DispenseOutcome::Empty => eyre::bail!("no pumps configured"),
                DispenseOutcome::Rejected => eyre::bail!("another dispense is in flight"),
            }
        }
        Commands::SelfCheck => self_check(&store, &catalog),
    }
}

fn load_settings(args: &Cli) -> eyre::Result<Settings> {
    let Some(path) = &args.settings else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read settings {}", path.display()))?;
    bartender_config::load_settings_toml(&text)
        .map_err(|e| eyre::eyre!("malformed settings {}: {e}", path.display()))
}

fn load_catalog(args: &Cli) -> eyre::Result<Catalog> {
    let Some(path) = &args.drinks else {
        return Ok(Catalog::builtin());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read drink catalog {}", path.display()))?;
    bartender_config::load_catalog_toml(&text)
        .wrap_err_with(|| format!("load drink catalog {}", path.display()))
}

/// Console layer always; optional JSON-lines file layer per `[logging]`.
fn init_logging(console_level: &str, logging: &Logging) {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{
        EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let file_layer = logging.file.as_deref().map(|file| {
        let rotation = match logging.rotation.as_deref() {
            Some("daily") => Rotation::DAILY,
            Some("hourly") => Rotation::HOURLY,
            _ => Rotation::NEVER,
        };
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "bartender.log".into());
        let (writer, guard) = tracing_appender::non_blocking(RollingFileAppender::new(
            rotation, dir, name,
        ));
        let _ = FILE_GUARD.set(guard);
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(EnvFilter::new(logging.level.as_deref().unwrap_or("info")))
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(EnvFilter::new(console_level)),
        )
        .with(file_layer)
        .init();
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_actuator(store: &PumpConfigStore) -> eyre::Result<Arc<dyn Actuator>> {
    let pumps = bartender_hardware::gpio::GpioPumps::new(store.pumps())
        .wrap_err("open gpio pump bank")?;
    Ok(Arc::new(pumps))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_actuator(_store: &PumpConfigStore) -> eyre::Result<Arc<dyn Actuator>> {
    Ok(Arc::new(bartender_hardware::SimulatedPumps::new()))
}

/// Host-side shutdown hook: on hardware the OS halts; in simulation the
/// run loop exits.
fn shutdown_hook(exit: Arc<AtomicBool>) -> Box<dyn FnMut()> {
    Box::new(move || {
        #[cfg(all(feature = "hardware", target_os = "linux"))]
        {
            if let Err(e) = std::process::Command::new("shutdown").args(["-h", "now"]).spawn() {
                tracing::error!(error = %e, "failed to invoke host shutdown");
            }
        }
        exit.store(true, Ordering::Release);
    })
}

fn build_appliance(
    store: PumpConfigStore,
    catalog: Catalog,
    settings: &Settings,
    exit: &Arc<AtomicBool>,
) -> eyre::Result<Appliance> {
    let actuator = make_actuator(&store)?;
    let dispenser = DispenseController::new(
        actuator,
        Arc::new(MonotonicClock::new()),
        Duration::from_millis(settings.dispense.settle_ms),
    );
    Ok(Appliance::new(
        store,
        catalog,
        Box::new(ConsoleDisplay::new(settings.display.progress_cols)),
        dispenser,
        ApplianceConfig {
            flow: FlowRate::new(settings.dispense.secs_per_ml),
            clean_duration: Duration::from_secs(settings.dispense.clean_secs),
            wrap_width: settings.display.wrap_width,
        },
        shutdown_hook(Arc::clone(exit)),
    ))
}

fn run_appliance(
    store: PumpConfigStore,
    catalog: Catalog,
    settings: &Settings,
) -> eyre::Result<()> {
    let exit = Arc::new(AtomicBool::new(false));
    {
        let exit = Arc::clone(&exit);
        ctrlc::set_handler(move || exit.store(true, Ordering::Release))
            .wrap_err("install ctrl-c handler")?;
    }

    let mut app = build_appliance(store, catalog, settings, &exit)?;
    let busy = app.busy_flag();
    let (tx, rx) = input::channel();

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let _buttons = bartender_hardware::gpio::GpioButtons::spawn(
        settings.buttons.advance_pin,
        settings.buttons.select_pin,
        Duration::from_millis(settings.buttons.bounce_ms),
        tx.clone(),
        Arc::clone(&busy),
    )
    .wrap_err("open gpio buttons")?;

    // Keyboard fallback stays available alongside the wired buttons.
    let _stdin = spawn_stdin_input(tx, Arc::clone(&busy));

    let tree = app.build_menu();
    let mut ctx = MenuContext::new(tree, &mut app);
    ctx.show_menu(&mut app);
    tracing::info!("appliance ready ('l' = advance, 'r' = select)");

    while !exit.load(Ordering::Acquire) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                input::dispatch(event, &busy, &mut ctx, &mut app);
                // A dispense may have run inside the dispatch; drop events
                // that piled up meanwhile.
                input::drain(&rx);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("appliance stopped");
    Ok(())
}

fn self_check(store: &PumpConfigStore, catalog: &Catalog) -> eyre::Result<()> {
    let pourable = catalog
        .drinks
        .iter()
        .filter(|d| d.ingredients.keys().all(|ing| store.is_assigned(ing)))
        .count();
    let assigned = store
        .pumps()
        .values()
        .filter(|p| !p.value.is_empty())
        .count();

    println!(
        "pumps: {} ({assigned} assigned)",
        store.pumps().len()
    );
    println!("drinks: {} ({pourable} pourable)", catalog.drinks.len());
    for drink in &catalog.drinks {
        let missing: Vec<&str> = drink
            .ingredients
            .keys()
            .filter(|ing| !store.is_assigned(ing))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            println!("  hidden: {} (needs {})", drink.name, missing.join(", "));
        }
    }
    println!("self-check: ok");
    Ok(())
}
