use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gpio_image_kiosk::button::{GpioLine, LevelSource, LineConfig};
use gpio_image_kiosk::config::{DEFAULT_CHIP, DEFAULT_LINE};
use gpio_image_kiosk::debounce::{DebouncePolicy, Debouncer};
use gpio_image_kiosk::events::RawLevel;
use gpio_image_kiosk::shutdown::ShutdownSignal;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "button-probe",
    about = "Report debounced presses on the kiosk button line"
)]
struct Args {
    /// GPIO character device.
    #[arg(long, default_value = DEFAULT_CHIP)]
    chip: PathBuf,

    /// Line offset of the button.
    #[arg(long, default_value_t = DEFAULT_LINE)]
    line: u32,

    /// Sampling interval.
    #[arg(long, default_value = "5ms", value_parser = humantime::parse_duration)]
    poll_interval: Duration,

    /// Debounce window applied to press/release transitions.
    #[arg(long, default_value = "20ms", value_parser = humantime::parse_duration)]
    debounce: Duration,

    /// Debounce handling of reverts inside the window.
    #[arg(long, value_enum, default_value = "strict")]
    policy: DebouncePolicy,

    /// Logging level (error|warn|info|debug|trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let shutdown = ShutdownSignal::install().context("failed to install signal handlers")?;
    let mut line = GpioLine::request(LineConfig {
        chip: args.chip.clone(),
        offset: args.line,
        consumer: "button-probe".to_string(),
    })?;

    let initial = line.read_level()?;
    info!(level = %initial, "waiting for button");
    let mut debouncer = Debouncer::new(initial, args.debounce, args.policy);

    while !shutdown.is_requested() {
        let level = line.read_level()?;
        if let Some(confirmed) = debouncer.feed(level, Instant::now()) {
            info!("{}", describe(confirmed));
        }
        thread::sleep(args.poll_interval);
    }

    let config = line.config();
    info!(
        chip = %config.chip.display(),
        line = config.offset,
        "interrupted; releasing line"
    );
    line.release();
    Ok(())
}

fn describe(level: RawLevel) -> &'static str {
    match level {
        RawLevel::Low => "pressed",
        RawLevel::High => "released",
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .parse(level)
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
