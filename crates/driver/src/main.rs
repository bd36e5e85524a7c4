//! co2mon
//!
//! Reads a zyTemp-family USB CO2 monitor through its hidraw node and prints
//! one line per measurement to stdout until the device fails or goes away.

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use common::{setup_logging, validate_log_level};
use driver::{
    ConfigSource, DeviceLocator, DeviceOpener, DriverConfig, Monitor, Probe, ProbeOutcome,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "co2mon")]
#[command(
    author,
    version,
    about = "Print CO2, temperature and humidity readings from a USB CO2 monitor"
)]
#[command(after_help = "
Without DEVICE, the configured device is used, or /dev/hidraw0 to /dev/hidraw19
are probed for the sensor (vendor 0x04d9).

You may find the right device with:
    dmesg | grep zyTemp | grep input0 | tail -1 | sed -e 's/.*hidraw\\([[:digit:]]\\+\\).*/\\/dev\\/hidraw\\1/'

OUTPUT:
    H <raw> (<percent> %)     relative humidity
    T <raw> (<celsius> °C)    temperature
    C <raw> ppm               CO2 concentration

CONFIGURATION:
    1. Path specified with --config
    2. ~/.config/co2mon/co2mon.toml
    3. /etc/co2mon/co2mon.toml
    4. Built-in defaults
")]
struct Args {
    /// hidraw device node of the sensor
    #[arg(value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Probe the candidate device nodes, print what they are and exit
    #[arg(long)]
    list_devices: bool,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // The exit status depends only on the error kind
            let _ = e.print();
            std::process::exit(exit_code(e.kind()));
        }
    };

    if args.save_config {
        let path = DriverConfig::default_path();
        DriverConfig::default()
            .save(&path)
            .context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let (config, source) = if let Some(ref path) = args.config {
        let config =
            DriverConfig::load(Some(path.clone())).context("Failed to load configuration")?;
        (config, ConfigSource::File(path.clone()))
    } else {
        DriverConfig::load_or_default()
    };

    // Use CLI log level if specified, otherwise use config value
    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    validate_log_level(log_level)?;
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("co2mon v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    run(&args, &config)
}

/// Process exit status for an argument parsing outcome
///
/// Usage errors and --help both exit with status 1; only --version succeeds.
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Device named on the command line, else the one from the configuration
///
/// `None` means auto-detect.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn requested_device(args: &Args, config: &DriverConfig) -> Option<PathBuf> {
    args.device.clone().or_else(|| config.device_path())
}

#[cfg(target_os = "linux")]
fn run(args: &Args, config: &DriverConfig) -> Result<()> {
    use driver::hid::hidraw::HidrawOpener;

    let locator = DeviceLocator::new(HidrawOpener)
        .with_candidates(config.candidates())
        .with_ids(config.vendor_id()?, config.product_id()?);

    if args.list_devices {
        list_devices(&locator);
        return Ok(());
    }

    let located = match requested_device(args, config) {
        Some(path) => locator.open_explicit(&path)?,
        None => locator.detect()?,
    };

    let stdout = std::io::stdout().lock();
    let never = Monitor::new(located.device, stdout)
        .run()
        .with_context(|| format!("Monitoring {} stopped", located.path.display()))?;
    match never {}
}

#[cfg(not(target_os = "linux"))]
fn run(_args: &Args, _config: &DriverConfig) -> Result<()> {
    anyhow::bail!("Raw HID access is only supported on Linux (hidraw)")
}

/// Print every candidate node that exists
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn list_devices<O: DeviceOpener>(locator: &DeviceLocator<O>) {
    let probes: Vec<Probe> = locator
        .probe_all()
        .into_iter()
        .filter(|probe| {
            !matches!(&probe.outcome, ProbeOutcome::Unavailable(e) if e.is_not_found())
        })
        .collect();

    if probes.is_empty() {
        println!("No hidraw devices found.");
        return;
    }

    println!("Found {} hidraw device(s):\n", probes.len());
    for probe in probes {
        let path = probe.path.display().to_string();
        match probe.outcome {
            ProbeOutcome::Sensor(identity) => {
                println!("  {:<16} {}  CO2 monitor", path, identity)
            }
            ProbeOutcome::Other(identity) => println!("  {:<16} {}", path, identity),
            ProbeOutcome::Unavailable(e) => println!("  {:<16} unavailable: {}", path, e),
        }
    }
}
