use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::{Vec2, Vec3};
use log::info;
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{
    DeviceEvent, ElementState, Event, KeyboardInput, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use meshview::{
    transform, Camera, CameraMovement, CameraParams, InputState, KeyCode, Model, NamedKey,
    Renderer,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;

    let mut model = Model::new();
    match options.model_path.as_deref() {
        Some(path) => model.load_obj(path)?,
        None => model = Model::unit_cube(),
    }
    print_model_summary(&model);

    if options.summary_only {
        return Ok(());
    }

    match run_interactive(&model) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Nothing to draw on; rerun with --summary-only or set DISPLAY to enable rendering."
                );
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn print_model_summary(model: &Model) {
    let texture_count: usize = model.meshes.iter().map(|mesh| mesh.textures.len()).sum();
    println!(
        "Loaded model with {} mesh(es): {} vertices, {} indices, {} texture(s)",
        model.meshes.len(),
        model.vertex_count(),
        model.index_count(),
        texture_count
    );
}

fn run_interactive(model: &Model) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("meshview")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let mut renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    renderer.upload_model(model);

    let mut app = AppState {
        renderer,
        camera: Camera::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Y, -90.0, 0.0),
        input: InputState::new(),
        last_frame: Instant::now(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    camera: Camera,
    input: InputState,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        if self.handle_keyboard(input) {
                            control_flow.set_exit();
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let offset = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                        };
                        self.input.push_scroll_delta(offset);
                    }
                    _ => {}
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                // winit reports dy growing downward; the camera wants up.
                self.input
                    .push_mouse_delta(Vec2::new(delta.0 as f32, -delta.1 as f32));
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                self.step_frame()?;
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    /// Returns true when the pressed key asks to quit.
    fn handle_keyboard(&self, input: &KeyboardInput) -> bool {
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return false;
        };
        if keycode == KeyCode::Named(NamedKey::Escape) && input.state == ElementState::Pressed {
            return true;
        }
        match input.state {
            ElementState::Pressed => self.input.set_key_down(keycode),
            ElementState::Released => self.input.set_key_up(keycode),
        }
        false
    }

    fn step_frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let delta_seconds = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        for (key, direction) in MOVEMENT_BINDINGS {
            if self.input.is_key_down(key) {
                self.camera.process_keyboard(direction, delta_seconds);
            }
        }

        let look = self.input.take_mouse_delta();
        if look != Vec2::ZERO {
            self.camera.process_mouse_movement(look.x, look.y, true);
        }
        let scroll = self.input.take_scroll_delta();
        if scroll != 0.0 {
            self.camera.process_mouse_scroll(scroll);
        }

        let camera = CameraParams {
            view: self.camera.view_matrix(),
            projection: transform::perspective(
                self.camera.zoom().to_radians(),
                self.renderer_aspect(),
                0.1,
                100.0,
            ),
            position: self.camera.position,
        };
        self.renderer.update_globals(&camera);

        if let Err(err) = self.renderer.render() {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
            }
        }
        Ok(())
    }

    fn renderer_aspect(&self) -> f32 {
        let size = self.renderer.window().inner_size();
        if size.height == 0 {
            1.0
        } else {
            size.width as f32 / size.height as f32
        }
    }
}

const MOVEMENT_BINDINGS: [(KeyCode, CameraMovement); 8] = [
    (KeyCode::Character('W'), CameraMovement::Forward),
    (KeyCode::Character('S'), CameraMovement::Backward),
    (KeyCode::Character('A'), CameraMovement::Left),
    (KeyCode::Character('D'), CameraMovement::Right),
    (KeyCode::Named(NamedKey::Up), CameraMovement::Forward),
    (KeyCode::Named(NamedKey::Down), CameraMovement::Backward),
    (KeyCode::Named(NamedKey::Left), CameraMovement::Left),
    (KeyCode::Named(NamedKey::Right), CameraMovement::Right),
];

fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Space => KeyCode::Named(NamedKey::Space),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::LShift => KeyCode::Named(NamedKey::LeftShift),
        Key::RShift => KeyCode::Named(NamedKey::RightShift),
        Key::Up => KeyCode::Named(NamedKey::Up),
        Key::Down => KeyCode::Named(NamedKey::Down),
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::W => KeyCode::Character('W'),
        Key::A => KeyCode::Character('A'),
        Key::S => KeyCode::Character('S'),
        Key::D => KeyCode::Character('D'),
        Key::Q => KeyCode::Character('Q'),
        Key::E => KeyCode::Character('E'),
        _ => return None,
    })
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    model_path: Option<String>,
    summary_only: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut model_path = None;
        let mut summary_only = false;
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "--summary-only" => summary_only = true,
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: meshview [model.obj] [--summary-only]"
                    ));
                }
                other => {
                    if model_path.replace(other.to_string()).is_some() {
                        return Err(anyhow!("only one model path may be given"));
                    }
                }
            }
        }
        Ok(Self {
            model_path,
            summary_only,
        })
    }
}
