use crate::keys::key_identifier;
use anyhow::{Context, Result, anyhow};
use rand::rngs::StdRng;
use rdmx_experiment::{Block, DataFile, SessionEvent, TaskSession};
use rdmx_render::{Captions, FrameStats, Scene, SkiaRenderer, Style, icon_rgba, load_font};
use rdmx_timing::{FramePacer, HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Icon, Window, WindowId},
};

const ICON_SIZE: u32 = 64;

pub type Session = TaskSession<HighPrecisionTimer, StdRng>;

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: Session,
    data_file: DataFile,
    renderer: Option<SkiaRenderer>,
    frame_timer: HighPrecisionTimer,
    pacer: FramePacer,
    icon: Option<Icon>,
    current_size: Option<PhysicalSize<u32>>,
    scale_factor: f64,
    refresh_rate: Option<f64>,

    should_exit: bool,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(session: Session, data_file: DataFile) -> Self {
        let icon = match Self::build_icon() {
            Ok(icon) => Some(icon),
            Err(e) => {
                warn!("window icon unavailable: {e:#}");
                None
            }
        };

        Self {
            window: None,
            pixels: None,
            session,
            data_file,
            renderer: None,
            frame_timer: HighPrecisionTimer::new(),
            pacer: FramePacer::from_refresh_rate(None),
            icon,
            current_size: None,
            scale_factor: 1.0,
            refresh_rate: None,
            should_exit: false,
            failure: None,
        }
    }

    /// Runs the window until the session finishes, is aborted or fails.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "starting task window"
        );

        let result = event_loop.run_app(&mut self);
        self.release_window();

        let stats = self.frame_timer.frame_stats();
        info!(
            frames = self.frame_timer.frame_count(),
            avg_render_ms = stats.average_frame_time_ns / 1e6,
            max_render_ms = stats.max_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            "render timing"
        );

        if let Some(e) = self.failure.take() {
            return Err(e);
        }
        info!(
            status = ?self.session.status(),
            trials = self.data_file.rows(),
            path = %self.data_file.path().display(),
            "run ended"
        );
        result.map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("no monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);
        self.pacer = FramePacer::from_refresh_rate(self.refresh_rate);

        let config = self.session.config();
        let (w, h) = config.window_size;
        let mut window_attributes = Window::default_attributes()
            .with_title(format!("{} - random-dot motion", config.experiment_name))
            .with_resizable(false)
            .with_window_icon(self.icon.clone());
        window_attributes = if config.fullscreen {
            window_attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
        } else {
            window_attributes.with_inner_size(PhysicalSize::new(w, h))
        };

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.current_size = Some(physical_size);
        self.scale_factor = window.scale_factor();

        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = self.scale_factor,
            refresh_hz = ?self.refresh_rate,
            frame_ms = self.pacer.period().as_secs_f64() * 1e3,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        let config = self.session.config();
        let font = load_font(config.font_path.as_deref())?;
        let style = Style {
            ring_radius: config.target_ring_radius,
            text_height: config.text_height,
            dot_size: config.dots.dot_size,
        };
        let captions = Captions::standard(
            self.session.practice_trials().len(),
            self.session.main_trials().len(),
        );
        self.renderer = Some(SkiaRenderer::new(
            physical_size.width,
            physical_size.height,
            self.session.layout(),
            style,
            captions,
            font,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let session = &self.session;
        let scene = Scene {
            phase: session.phase(),
            trial_state: session.current_trial_state(),
            dots: session.dot_field().dots(),
            feedback: session.current_trial().and_then(|t| t.feedback.as_ref()),
            progress: session.trial_progress(),
        };

        let stats: FrameStats =
            renderer.render_frame(&scene, pixels.frame_mut(), &mut self.frame_timer)?;
        let now = self.frame_timer.now();
        pixels.render()?;
        let present = self.frame_timer.elapsed(now);

        trace!(
            present_ms = present.as_secs_f64() * 1e3,
            clear_ms = stats.clear.as_secs_f64() * 1e3,
            phase_ms = stats.phase.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    fn update(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let events = self.session.update();
        self.handle_session_events(events, event_loop)
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) -> Result<()> {
        let PhysicalKey::Code(code) = key else {
            return Ok(());
        };
        let Some(identifier) = key_identifier(code) else {
            trace!(?code, "unmapped key");
            return Ok(());
        };
        let events = self.session.handle_key(identifier);
        self.handle_session_events(events, event_loop)
    }

    fn handle_session_events(
        &mut self,
        events: Vec<SessionEvent>,
        event_loop: &ActiveEventLoop,
    ) -> Result<()> {
        for event in events {
            match event {
                SessionEvent::TrialComplete {
                    block: Block::Main,
                    record,
                } => {
                    self.data_file
                        .append(&record)
                        .context("failed to save trial")?;
                }
                SessionEvent::TrialComplete {
                    block: Block::Practice,
                    record,
                } => {
                    debug!(rt = record.rt, correct = record.correct, "practice trial done");
                }
                SessionEvent::Aborted | SessionEvent::Finished => {
                    self.cleanup_and_exit(event_loop);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) -> Result<()> {
        if new_size.width == 0 || new_size.height == 0 {
            return Ok(());
        }
        self.current_size = Some(new_size);
        if let Some(pixels) = &mut self.pixels {
            pixels.resize_surface(new_size.width, new_size.height)?;
            pixels.resize_buffer(new_size.width, new_size.height)?;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height)?;
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
        Ok(())
    }

    fn fail(&mut self, e: anyhow::Error, event_loop: &ActiveEventLoop) {
        error!("{e:#}");
        self.failure.get_or_insert(e);
        self.cleanup_and_exit(event_loop);
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.should_exit = true;
        event_loop.exit();
    }

    /// Drops the surface before the window it draws into.
    fn release_window(&mut self) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        self.renderer = None;
        self.pixels = None;
        self.window = None;
    }

    fn build_icon() -> Result<Icon> {
        let rgba = icon_rgba(ICON_SIZE)?;
        Ok(Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE)?)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(e.context("failed to create window and surface"), event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.should_exit {
            return;
        }
        let result = match event {
            WindowEvent::CloseRequested => {
                // closing the window is an abort
                let events = self.session.handle_key(rdmx_core::ABORT_KEY);
                let r = self.handle_session_events(events, event_loop);
                self.cleanup_and_exit(event_loop);
                r
            }
            WindowEvent::RedrawRequested => {
                self.pacer.begin(&self.frame_timer);
                let r = self.render().and_then(|_| self.update(event_loop));
                self.pacer.finish(&self.frame_timer);
                if let Some(win) = &self.window {
                    win.request_redraw();
                }
                r
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_input(event.physical_key, event_loop)
            }
            WindowEvent::Resized(sz) => self.handle_resize(sz),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                match self.window.as_ref().map(|w| w.inner_size()) {
                    Some(size) => self.handle_resize(size),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.fail(e, event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.release_window();
        debug!("application resources cleaned up");
    }
}
