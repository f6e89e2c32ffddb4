use anyhow::Context;
use std::time::Instant;
use viewport_core::{
    GpuRenderer, Resolution, ScreenSpec, Theme, ViewMode, ViewportConfig, ViewportEngine,
    ViewportError, ViewportSize,
};
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

// Touch ids are offset so they never collide with the mouse pointer.
const MOUSE_POINTER_ID: i32 = 0;
const TOUCH_ID_BASE: i32 = 1;

fn demo_screens() -> Vec<ScreenSpec> {
    vec![
        ScreenSpec::flat(27.0, Resolution::new(2560, 1440), 650.0, 1),
        ScreenSpec::curved(34.0, Resolution::new(3440, 1440), 750.0, 1500.0, 2),
    ]
}

fn load_screens() -> anyhow::Result<Vec<ScreenSpec>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading screen list {}", path))?;
            Ok(viewport_core::parse_screens(&json)?)
        }
        None => Ok(demo_screens()),
    }
}

fn log_screen_metrics(specs: &[ScreenSpec]) {
    for (i, s) in specs.iter().enumerate() {
        let (w, h) = s.physical_size_m();
        let (ew, eh) = s.effective_resolution();
        let curve = s
            .curvature_radius_mm
            .map(|r| format!(", {:.0}R", r))
            .unwrap_or_default();
        log::info!(
            "[scene] screen {}: {:.0}\" {}x{} {:.3}x{:.3} m{}",
            i,
            s.diagonal_inches,
            s.resolution.width_px,
            s.resolution.height_px,
            w,
            h,
            curve
        );
        log::info!(
            "[scene] screen {}: {:.0} ppi, looks like {:.0}x{:.0}, fov {:.1}x{:.1} deg",
            i,
            s.pixels_per_inch(),
            ew,
            eh,
            s.horizontal_fov_rad().to_degrees(),
            s.vertical_fov_rad().to_degrees()
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let screens = load_screens()?;
    log_screen_metrics(&screens);

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Screen comparison viewport (native)")
        .build(&event_loop)?;

    let size = window.inner_size();
    let renderer = pollster::block_on(GpuRenderer::new(
        &window,
        ViewportSize::new(size.width, size.height),
    ))?;
    let mut engine = ViewportEngine::new(ViewportConfig::default(), renderer)?;
    engine.resize(size.width, size.height)?;
    engine.update_screens(&screens)?;
    log::info!("[input] keys: 1 front, 2 top, 3 isometric, T theme, Esc quit");

    let window = &window;
    let mut cursor = (0.0_f32, 0.0_f32);
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                if let Err(e) = engine.resize(size.width, size.height) {
                    log::warn!("[camera] resize failed: {}", e);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                cursor = (position.x as f32, position.y as f32);
                engine.pointer_move(MOUSE_POINTER_ID, cursor.0, cursor.1);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => engine.pointer_down(MOUSE_POINTER_ID, cursor.0, cursor.1),
                ElementState::Released => engine.pointer_up(MOUSE_POINTER_ID),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive; the engine follows the
                // DOM convention where positive means scrolling down.
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(p) => -(p.y as f32),
                };
                engine.wheel(dy);
            }
            WindowEvent::Touch(touch) => {
                let id = TOUCH_ID_BASE + touch.id as i32;
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => engine.pointer_down(id, x, y),
                    TouchPhase::Moved => engine.pointer_move(id, x, y),
                    TouchPhase::Ended => engine.pointer_up(id),
                    TouchPhase::Cancelled => engine.pointer_cancel(id),
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match logical_key.as_ref() {
                Key::Named(NamedKey::Escape) => elwt.exit(),
                Key::Character("1") => engine.set_view_mode(ViewMode::Front),
                Key::Character("2") => engine.set_view_mode(ViewMode::Top),
                Key::Character("3") => engine.set_view_mode(ViewMode::Isometric),
                Key::Character("t" | "T") => {
                    let theme: Theme = engine.theme().toggled();
                    if let Err(e) = engine.set_theme(theme) {
                        log::warn!("[scene] theme change failed: {}", e);
                    }
                }
                _ => {}
            },
            _ => {}
        },
        Event::AboutToWait => match engine.tick(Instant::now()) {
            Ok(()) => window.request_redraw(),
            Err(ViewportError::RenderContext(msg)) => {
                log::error!("[gpu] {}", msg);
                elwt.exit();
            }
            Err(e) => log::warn!("[gpu] frame skipped: {}", e),
        },
        _ => {}
    })?;
    Ok(())
}
