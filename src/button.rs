use std::path::PathBuf;

use gpiocdev::Request;
use gpiocdev::line::{Bias, Value};
use tracing::info;

use crate::error::Error;
use crate::events::RawLevel;

/// A non-blocking source of raw input levels.
pub trait LevelSource {
    fn read_level(&mut self) -> Result<RawLevel, Error>;

    /// Give the underlying handle back. Calling it again is a no-op.
    fn release(&mut self);
}

#[derive(Debug, Clone)]
pub struct LineConfig {
    pub chip: PathBuf,
    pub offset: u32,
    pub consumer: String,
}

/// One GPIO line requested as a pulled-up input.
///
/// The request is dropped exactly once, either through [`LevelSource::release`]
/// or when the value goes out of scope.
#[derive(Debug)]
pub struct GpioLine {
    config: LineConfig,
    request: Option<Request>,
}

impl GpioLine {
    pub fn request(config: LineConfig) -> Result<Self, Error> {
        let request = Request::builder()
            .on_chip(&config.chip)
            .with_consumer(config.consumer.as_str())
            .with_line(config.offset)
            .as_input()
            .with_bias(Bias::PullUp)
            .request()
            .map_err(|source| Error::LineRequest {
                chip: config.chip.clone(),
                offset: config.offset,
                source,
            })?;
        info!(
            chip = %config.chip.display(),
            line = config.offset,
            consumer = %config.consumer,
            "requested input line with pull-up bias"
        );
        Ok(Self {
            config,
            request: Some(request),
        })
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl LevelSource for GpioLine {
    fn read_level(&mut self) -> Result<RawLevel, Error> {
        let Some(request) = self.request.as_ref() else {
            return Err(Error::LineReleased {
                chip: self.config.chip.clone(),
                offset: self.config.offset,
            });
        };
        let value = request
            .value(self.config.offset)
            .map_err(|source| Error::LineRead {
                chip: self.config.chip.clone(),
                offset: self.config.offset,
                source,
            })?;
        Ok(level_from_value(value))
    }

    fn release(&mut self) {
        if let Some(request) = self.request.take() {
            drop(request);
            info!(
                chip = %self.config.chip.display(),
                line = self.config.offset,
                "released input line"
            );
        }
    }
}

impl Drop for GpioLine {
    fn drop(&mut self) {
        self.release();
    }
}

/// Map the line value to a level. Without active-low, active is electrically high.
pub fn level_from_value(value: Value) -> RawLevel {
    match value {
        Value::Active => RawLevel::High,
        Value::Inactive => RawLevel::Low,
    }
}
