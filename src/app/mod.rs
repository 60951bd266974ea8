mod egui_host;
mod frame;
mod input;
mod timing;

use crate::assets::{ImageSource, TextureResolver};
use crate::config::ViewerConfig;
use crate::params::{ControlEvent, ParameterStore};
use crate::render::{OrbitCamera, RenderContext, UiPaint};
use crate::ui::{ControlPanel, PanelOutput};
use egui_host::EguiHost;
use frame::FrameDriver;
use input::{zoom_factor, MouseState};
use timing::FrameTiming;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tga", "tiff"];

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render: Option<RenderContext>,
    egui: Option<EguiHost>,
    store: ParameterStore,
    resolver: TextureResolver,
    frame_driver: FrameDriver,
    panel: ControlPanel,
    camera: OrbitCamera,
    mouse: MouseState,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
    startup_failed: bool,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            window: None,
            render: None,
            egui: None,
            store: ParameterStore::new(),
            resolver: TextureResolver::new(config.max_texture_dimension),
            frame_driver: FrameDriver::from_config(&config),
            panel: ControlPanel::new(),
            camera: OrbitCamera::looking_at_origin(config.camera_distance),
            mouse: MouseState::default(),
            timing: FrameTiming::new(config.window_title.clone()),
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
            startup_failed: false,
            config,
        }
    }

    fn init_graphics(&mut self, window: Arc<Window>) -> Result<(), crate::render::RenderError> {
        let render = RenderContext::new(Arc::clone(&window), &self.config, self.resolver.current())?;
        let max_dimension = self
            .config
            .max_texture_dimension
            .min(render.max_texture_dimension());
        if max_dimension != self.resolver.max_dimension() {
            log::info!("Texture size capped at {} by the GPU", max_dimension);
        }
        self.resolver.set_max_dimension(max_dimension);
        self.egui = Some(EguiHost::new(&window));
        self.render = Some(render);
        Ok(())
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(millihz) = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
        {
            let hz = millihz as f32 / 1000.0;
            if hz > 1.0 {
                target = Duration::from_secs_f32(1.0 / hz);
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn redraw(&mut self) {
        let (Some(window), Some(render), Some(egui)) =
            (self.window.as_ref(), self.render.as_mut(), self.egui.as_mut())
        else {
            return;
        };
        let started = Instant::now();
        self.timing.update(Some(window), started);

        let frame = self
            .frame_driver
            .prepare(&mut self.store, &mut self.resolver);

        let params = self.store.snapshot();
        let status = self.frame_driver.texture_status();
        let panel = &mut self.panel;
        let mut output = PanelOutput::default();
        let ui = egui.run(window, |ctx| {
            output = panel.show(ctx, &params, status);
        });

        let paint = UiPaint {
            clipped_primitives: &ui.clipped_primitives,
            textures_delta: &ui.textures_delta,
            pixels_per_point: ui.pixels_per_point,
        };
        if let Err(err) = render.render(&frame, &self.camera, self.resolver.current(), paint) {
            log::warn!("Frame skipped: {}", err);
        }
        self.timing
            .set_render_ms(started.elapsed().as_secs_f32() * 1000.0);

        self.apply_panel_output(output);
    }

    fn apply_panel_output(&mut self, output: PanelOutput) {
        for event in output.events {
            self.dispatch(event);
        }
        if output.pick_texture {
            if let Some(source) = pick_texture() {
                self.dispatch(ControlEvent::SetTextureSource(source));
            }
        }
    }

    fn dispatch(&mut self, event: ControlEvent) {
        if let Err(err) = self.store.apply(event) {
            log::warn!("Rejected control change: {}", err);
        }
    }

    fn viewport_height(&self) -> f32 {
        self.window
            .as_ref()
            .map(|window| window.inner_size().height as f32)
            .unwrap_or(1.0)
    }

    fn pointer_over_ui(&self) -> bool {
        self.egui.as_ref().is_some_and(EguiHost::wants_pointer)
    }
}

fn pick_texture() -> Option<ImageSource> {
    let path: PathBuf = rfd::FileDialog::new()
        .set_title("Upload Texture")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()?;
    log::info!("Texture selected: {}", path.display());
    Some(ImageSource::from_path(path))
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                self.startup_failed = true;
                event_loop.exit();
                return;
            }
        };
        if let Err(err) = self.init_graphics(Arc::clone(&window)) {
            log::error!("GPU initialisation failed: {}", err);
            self.startup_failed = true;
            event_loop.exit();
            return;
        }

        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (self.window.as_ref(), self.egui.as_mut()) {
            (Some(window), Some(egui)) => egui.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if consumed || event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                    PhysicalKey::Code(KeyCode::KeyL) => self.dispatch(ControlEvent::ToggleLight),
                    _ => {}
                }
            }
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => {
                self.mouse.release_all();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(render) = &mut self.render {
                    render.resize(new_size);
                }
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let height = self.viewport_height();
                self.mouse
                    .handle_motion(position.x as f32, position.y as f32, height, &mut self.camera);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                // Drags start only outside the panel but always end.
                if state == ElementState::Released || !(consumed || self.pointer_over_ui()) {
                    self.mouse.handle_button(button, state);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !(consumed || self.pointer_over_ui()) {
                    self.camera.zoom(zoom_factor(delta));
                }
            }
            WindowEvent::DroppedFile(path) => {
                log::info!("Texture dropped: {}", path.display());
                self.dispatch(ControlEvent::SetTextureSource(ImageSource::from_path(path)));
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    let (config, config_note) = ViewerConfig::load_or_default(&ViewerConfig::default_path());
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.clone()),
    )
    .format_timestamp_millis()
    .init();
    if let Some((level, message)) = config_note {
        log::log!(level, "{}", message);
    }

    log::info!("Orbviz sphere preview");
    log::info!("   Drag to orbit, right-drag to pan, scroll to zoom, L toggles the light, ESC to exit");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", err);
        std::process::exit(1);
    }
    if app.startup_failed {
        std::process::exit(1);
    }
}
