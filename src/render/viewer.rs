use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use softbuffer::{Context as SoftContext, Surface};
use tracing::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::button::LevelSource;
use crate::error::Error;
use crate::events::DisplaySelection;
use crate::geometry::MonitorGeometry;
use crate::poll_loop::{PollLoop, RenderSink, Tick};
use crate::processing::ScaledImage;
use crate::render::frame::compose_frame;

type WindowHandle = Arc<Window>;

/// Open the kiosk window on the resolved monitor and run the poll loop on the
/// event-loop thread until shutdown.
///
/// # Errors
/// Returns the first fatal surface or input error. A signal or Escape-driven
/// shutdown returns `Ok`.
pub fn run_kiosk<S: LevelSource>(
    geometry: MonitorGeometry,
    mut poll: PollLoop<S>,
) -> Result<(), Error> {
    if poll.stop_if_requested(&mut KioskSurface::default()) {
        info!("kiosk stopped before the window opened");
        return Ok(());
    }
    let event_loop = EventLoop::new().map_err(|err| Error::Surface(err.to_string()))?;
    let mut app = KioskApp::new(geometry, poll);
    let result = event_loop.run_app(&mut app);

    app.poll.stop(&mut app.surface);
    if let Some(err) = app.failure.take() {
        return Err(err);
    }
    result.map_err(|err| Error::Surface(err.to_string()))?;
    info!("kiosk stopped");
    Ok(())
}

/// Window plus softbuffer surface; the rendering side of the poll loop.
#[derive(Default)]
struct KioskSurface {
    window: Option<WindowHandle>,
    context: Option<SoftContext<WindowHandle>>,
    surface: Option<Surface<WindowHandle, WindowHandle>>,
}

impl KioskSurface {
    fn open(event_loop: &ActiveEventLoop, geometry: &MonitorGeometry) -> Result<Self, Error> {
        let monitor = event_loop
            .available_monitors()
            .find(|monitor| monitor.name().as_deref() == Some(geometry.name.as_str()));
        if monitor.is_none() {
            debug!(output = %geometry.name, "no matching winit monitor; using current");
        }

        let attrs = Window::default_attributes()
            .with_title("gpio-image-kiosk")
            .with_decorations(false)
            .with_resizable(false)
            .with_position(PhysicalPosition::new(geometry.origin_x, geometry.origin_y))
            .with_inner_size(PhysicalSize::new(geometry.width, geometry.height))
            .with_fullscreen(Some(Fullscreen::Borderless(monitor)))
            .with_active(true);
        let window = event_loop
            .create_window(attrs)
            .map_err(|err| Error::Surface(format!("failed to create window: {err}")))?;
        window.set_cursor_visible(false);
        let window = WindowHandle::new(window);

        let context = SoftContext::new(window.clone())
            .map_err(|err| Error::Surface(format!("failed to create softbuffer context: {err}")))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| Error::Surface(format!("failed to create softbuffer surface: {err}")))?;
        info!(output = %geometry, "kiosk window opened");

        Ok(Self {
            window: Some(window),
            context: Some(context),
            surface: Some(surface),
        })
    }

    fn is_open(&self) -> bool {
        self.window.is_some()
    }

    fn refocus(&self) {
        if let Some(window) = self.window.as_ref() {
            window.focus_window();
        }
    }
}

impl RenderSink for KioskSurface {
    fn render(&mut self, image: &ScaledImage, selection: DisplaySelection) -> Result<(), Error> {
        let (Some(window), Some(surface)) = (self.window.as_ref(), self.surface.as_mut()) else {
            return Ok(());
        };
        let size = window.inner_size();
        let (Some(width), Some(height)) = (
            NonZeroU32::new(size.width.max(1)),
            NonZeroU32::new(size.height.max(1)),
        ) else {
            return Ok(());
        };
        surface
            .resize(width, height)
            .map_err(|err| Error::Surface(format!("failed to resize surface: {err}")))?;
        let mut buffer = surface
            .buffer_mut()
            .map_err(|err| Error::Surface(format!("failed to map surface buffer: {err}")))?;
        compose_frame(image, width.get(), height.get(), &mut buffer);
        buffer
            .present()
            .map_err(|err| Error::Surface(format!("failed to present frame: {err}")))?;
        debug!(%selection, width = width.get(), height = height.get(), "presented frame");
        Ok(())
    }

    fn close(&mut self) {
        self.surface = None;
        self.context = None;
        if let Some(window) = self.window.take() {
            window.set_visible(false);
            info!("kiosk window closed");
        }
    }
}

struct KioskApp<S: LevelSource> {
    geometry: MonitorGeometry,
    poll: PollLoop<S>,
    surface: KioskSurface,
    next_tick: Option<Instant>,
    failure: Option<Error>,
}

impl<S: LevelSource> KioskApp<S> {
    fn new(geometry: MonitorGeometry, poll: PollLoop<S>) -> Self {
        Self {
            geometry,
            poll,
            surface: KioskSurface::default(),
            next_tick: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        self.poll.stop(&mut self.surface);
        self.failure.get_or_insert(err);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.logical_key.as_ref() {
            Key::Named(NamedKey::Escape) => {
                info!("escape pressed; requesting shutdown");
                self.poll.shutdown_signal().request();
            }
            Key::Character("n") => {
                if let Err(err) = self.poll.toggle(&mut self.surface) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}

impl<S: LevelSource> ApplicationHandler for KioskApp<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.surface.is_open() || self.poll.stop_if_requested(&mut self.surface) {
            if self.poll.is_stopped() {
                event_loop.exit();
            }
            return;
        }
        match KioskSurface::open(event_loop, &self.geometry) {
            Ok(surface) => self.surface = surface,
            Err(err) => return self.fail(event_loop, err),
        }
        if let Err(err) = self.poll.repaint(&mut self.surface) {
            return self.fail(event_loop, err);
        }
        self.next_tick = Some(Instant::now());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.poll.shutdown_signal().request();
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::Focused(false) => {
                debug!("kiosk window lost focus; reclaiming");
                self.surface.refocus();
            }
            WindowEvent::Resized(_) | WindowEvent::RedrawRequested => {
                if let Err(err) = self.poll.repaint(&mut self.surface) {
                    warn!(error = %err, "repaint failed");
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(deadline) = self.next_tick else {
            return;
        };
        let now = Instant::now();
        if now >= deadline || self.poll.shutdown_signal().is_requested() {
            match self.poll.tick(now, &mut self.surface) {
                Ok(Tick::Continue(next)) => self.next_tick = Some(next),
                Ok(Tick::Stopped) => {
                    self.next_tick = None;
                    event_loop.exit();
                    return;
                }
                Err(err) => {
                    self.next_tick = None;
                    return self.fail(event_loop, err);
                }
            }
        }
        if let Some(next) = self.next_tick {
            event_loop.set_control_flow(ControlFlow::WaitUntil(next));
        }
    }
}
