//! Binary entrypoint for the GPIO image kiosk.
//!
//! Startup resolves the monitor, prepares both images and requests the button
//! line; any failure there exits non-zero before a window is opened.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use gpio_image_kiosk::button::GpioLine;
use gpio_image_kiosk::config::Configuration;
use gpio_image_kiosk::debounce::{DebouncePolicy, Debouncer};
use gpio_image_kiosk::events::RawLevel;
use gpio_image_kiosk::geometry::GeometryResolver;
use gpio_image_kiosk::poll_loop::PollLoop;
use gpio_image_kiosk::processing::{Anchor, ImagePair};
use gpio_image_kiosk::render::run_kiosk;
use gpio_image_kiosk::shutdown::ShutdownSignal;

#[derive(Debug, Parser)]
#[command(
    name = "gpio-image-kiosk",
    version,
    about = "Fullscreen two-image kiosk toggled by a GPIO button"
)]
struct Cli {
    /// Optional YAML config file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Display output to show the images on (e.g. HDMI-1)
    #[arg(long, value_name = "NAME")]
    output: Option<String>,

    /// GPIO character device
    #[arg(long, value_name = "PATH")]
    chip: Option<PathBuf>,

    /// Button line offset on the chip
    #[arg(long, value_name = "OFFSET")]
    line: Option<u32>,

    /// Image shown while the button is released
    #[arg(long, value_name = "FILE")]
    first_image: Option<PathBuf>,

    /// Image shown while the button is pressed
    #[arg(long, value_name = "FILE")]
    second_image: Option<PathBuf>,

    /// Sampling interval (e.g. 5ms)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    poll_interval: Option<Duration>,

    /// Minimum time a new level must hold before it is accepted (e.g. 20ms)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    debounce: Option<Duration>,

    /// Debounce handling of reverts inside the window
    #[arg(long, value_enum)]
    debounce_policy: Option<DebouncePolicy>,

    /// Placement of the scaled image on the monitor
    #[arg(long, value_enum)]
    anchor: Option<Anchor>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply(self, mut cfg: Configuration) -> Configuration {
        if let Some(output) = self.output {
            cfg.target_output = output;
        }
        if let Some(chip) = self.chip {
            cfg.chip_path = chip;
        }
        if let Some(line) = self.line {
            cfg.line_offset = line;
        }
        if let Some(path) = self.first_image {
            cfg.images[0] = path;
        }
        if let Some(path) = self.second_image {
            cfg.images[1] = path;
        }
        if let Some(interval) = self.poll_interval {
            cfg.poll_interval = interval;
        }
        if let Some(threshold) = self.debounce {
            cfg.debounce_threshold = threshold;
        }
        if let Some(policy) = self.debounce_policy {
            cfg.debounce_policy = policy;
        }
        if let Some(anchor) = self.anchor {
            cfg.anchor = anchor;
        }
        cfg
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("gpio_image_kiosk={level}").parse()?)
        .add_directive("winit=warn".parse()?)
        .add_directive("softbuffer=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let base = match cli.config.as_ref() {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::default(),
    };
    let cfg = cli
        .apply(base)
        .validated()
        .context("invalid configuration values")?;
    info!(?cfg, "configuration loaded");

    let shutdown = ShutdownSignal::install().context("failed to install signal handlers")?;

    let geometry = GeometryResolver::new(cfg.query_command.clone())
        .resolve(&cfg.target_output)
        .context("failed to resolve target display")?;
    let images = ImagePair::load(&cfg.images, &geometry, cfg.anchor)
        .context("failed to prepare images")?;
    if shutdown.is_requested() {
        info!("shutdown requested during startup; exiting");
        return Ok(());
    }
    let line = GpioLine::request(cfg.line()).context("failed to acquire button line")?;

    let debouncer = Debouncer::new(RawLevel::High, cfg.debounce_threshold, cfg.debounce_policy);
    let poll = PollLoop::new(line, debouncer, images, shutdown, cfg.poll_interval);
    info!(
        interval = %humantime::format_duration(cfg.poll_interval),
        threshold = %humantime::format_duration(cfg.debounce_threshold),
        policy = ?cfg.debounce_policy,
        "starting poll loop"
    );
    run_kiosk(geometry, poll).context("kiosk stopped with an error")?;
    Ok(())
}
