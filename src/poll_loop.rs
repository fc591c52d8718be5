//! Fixed-cadence sampling loop: line -> debouncer -> display state -> surface.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::button::LevelSource;
use crate::debounce::Debouncer;
use crate::display_state::DisplayStateMachine;
use crate::error::Error;
use crate::events::{DisplaySelection, RenderCommand};
use crate::processing::{ImagePair, ScaledImage};
use crate::shutdown::ShutdownSignal;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// The rendering collaborator that actually puts pixels on the monitor.
pub trait RenderSink {
    fn render(&mut self, image: &ScaledImage, selection: DisplaySelection) -> Result<(), Error>;

    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Sample again at this instant.
    Continue(Instant),
    Stopped,
}

/// Owns all mutable kiosk state for the single control thread.
pub struct PollLoop<S: LevelSource> {
    sampler: Option<S>,
    debouncer: Debouncer,
    display: DisplayStateMachine,
    images: ImagePair,
    shutdown: ShutdownSignal,
    interval: Duration,
    stopped: bool,
}

impl<S: LevelSource> PollLoop<S> {
    pub fn new(
        sampler: S,
        debouncer: Debouncer,
        images: ImagePair,
        shutdown: ShutdownSignal,
        interval: Duration,
    ) -> Self {
        Self {
            sampler: Some(sampler),
            debouncer,
            display: DisplayStateMachine::new(),
            images,
            shutdown,
            interval,
            stopped: false,
        }
    }

    pub fn selection(&self) -> DisplaySelection {
        self.display.current()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Paint whatever is currently selected, e.g. on first map or expose.
    pub fn repaint(&self, sink: &mut impl RenderSink) -> Result<(), Error> {
        let selection = self.display.current();
        sink.render(self.images.get(selection), selection)
    }

    /// Stop without sampling when shutdown was requested before the first tick,
    /// e.g. a signal that arrived during startup. Returns whether the loop is stopped.
    pub fn stop_if_requested(&mut self, sink: &mut impl RenderSink) -> bool {
        if !self.stopped && self.shutdown.is_requested() {
            info!("shutdown requested before start; stopping poll loop");
            self.stop(sink);
        }
        self.stopped
    }

    /// One sampling step. A read or render failure shuts the loop down before
    /// the error is returned.
    pub fn tick(&mut self, now: Instant, sink: &mut impl RenderSink) -> Result<Tick, Error> {
        if self.stopped {
            return Ok(Tick::Stopped);
        }
        if self.shutdown.is_requested() {
            info!("shutdown requested; stopping poll loop");
            self.stop(sink);
            return Ok(Tick::Stopped);
        }

        match self.step(now, sink) {
            Ok(()) => Ok(Tick::Continue(now + self.interval)),
            Err(err) => {
                warn!(error = %err, "fatal error in poll loop");
                self.stop(sink);
                Err(err)
            }
        }
    }

    fn step(&mut self, now: Instant, sink: &mut impl RenderSink) -> Result<(), Error> {
        let Some(sampler) = self.sampler.as_mut() else {
            return Ok(());
        };
        let raw = sampler.read_level()?;
        let Some(level) = self.debouncer.feed(raw, now) else {
            return Ok(());
        };
        debug!(%level, "confirmed level change");
        if let Some(command) = self.display.on_confirmed(level) {
            self.dispatch(command, sink)?;
        }
        Ok(())
    }

    /// Manual toggle from the surface (the `n` key).
    pub fn toggle(&mut self, sink: &mut impl RenderSink) -> Result<(), Error> {
        if self.stopped {
            return Ok(());
        }
        let command = self.display.toggle();
        self.dispatch(command, sink)
    }

    fn dispatch(&self, command: RenderCommand, sink: &mut impl RenderSink) -> Result<(), Error> {
        let RenderCommand(selection) = command;
        info!(%selection, "showing image");
        sink.render(self.images.get(selection), selection)
    }

    /// Release the input line, then close the surface. Runs once.
    pub fn stop(&mut self, sink: &mut impl RenderSink) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(mut sampler) = self.sampler.take() {
            sampler.release();
        }
        sink.close();
    }
}
