use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

use crate::button::LineConfig;
use crate::debounce::{DEFAULT_THRESHOLD, DebouncePolicy};
use crate::poll_loop::DEFAULT_POLL_INTERVAL;
use crate::processing::Anchor;

pub const DEFAULT_OUTPUT: &str = "HDMI-1";
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";
pub const DEFAULT_LINE: u32 = 17;
pub const DEFAULT_CONSUMER: &str = "gpio-image-kiosk";
const DEFAULT_IMAGE_NAMES: [&str; 2] = ["feg.png", "test.png"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Output name as reported by the display query, matched exactly.
    pub target_output: String,
    /// GPIO character device holding the button line.
    pub chip_path: PathBuf,
    /// Line offset of the button on `chip_path`.
    pub line_offset: u32,
    /// Consumer label shown by gpioinfo while the line is held.
    pub consumer: String,
    /// Image shown while released, then image shown while pressed.
    pub images: [PathBuf; 2],
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub debounce_threshold: Duration,
    pub debounce_policy: DebouncePolicy,
    pub anchor: Anchor,
    /// Display enumeration command and arguments.
    pub query_command: Vec<String>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.target_output.trim().is_empty(),
            "target-output must not be empty"
        );
        ensure!(
            !self.poll_interval.is_zero(),
            "poll-interval must be greater than zero"
        );
        ensure!(
            !self.debounce_threshold.is_zero(),
            "debounce-threshold must be greater than zero"
        );
        ensure!(
            self.poll_interval <= self.debounce_threshold,
            "poll-interval ({}) must not exceed debounce-threshold ({})",
            humantime::format_duration(self.poll_interval),
            humantime::format_duration(self.debounce_threshold)
        );
        ensure!(
            !self.query_command.is_empty() && !self.query_command[0].trim().is_empty(),
            "query-command must name a program"
        );
        for (idx, path) in self.images.iter().enumerate() {
            ensure!(
                !path.as_os_str().is_empty(),
                "images[{idx}] must not be empty"
            );
        }
        Ok(self)
    }

    pub fn line(&self) -> LineConfig {
        LineConfig {
            chip: self.chip_path.clone(),
            offset: self.line_offset,
            consumer: self.consumer.clone(),
        }
    }

    /// `images/` next to the running executable, or the working directory
    /// when the executable path is unavailable.
    pub fn default_image_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default()
            .join("images")
    }
}

impl Default for Configuration {
    fn default() -> Self {
        let dir = Self::default_image_dir();
        Self {
            target_output: DEFAULT_OUTPUT.to_string(),
            chip_path: PathBuf::from(DEFAULT_CHIP),
            line_offset: DEFAULT_LINE,
            consumer: DEFAULT_CONSUMER.to_string(),
            images: DEFAULT_IMAGE_NAMES.map(|name| dir.join(name)),
            poll_interval: DEFAULT_POLL_INTERVAL,
            debounce_threshold: DEFAULT_THRESHOLD,
            debounce_policy: DebouncePolicy::default(),
            anchor: Anchor::default(),
            query_command: vec!["xrandr".to_string(), "--query".to_string()],
        }
    }
}
