use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{Pixels, SurfaceTexture};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::surface::SurfaceSize;

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
}

/// Pointer and keyboard input collected between two redraws.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub mouse_pos: Option<(u32, u32)>,
    /// Position of a completed left click (press + release) this frame.
    pub click: Option<(u32, u32)>,
    pub keys: Vec<VirtualKeyCode>,
}

impl InputFrame {
    fn end_frame(&mut self) {
        self.click = None;
        self.keys.clear();
    }
}

pub trait GameApp {
    fn update(&mut self, input: &InputFrame, dt: Duration, size: SurfaceSize);

    fn render(&mut self, frame: &mut [u8], size: SurfaceSize);

    /// Window title for the current state; `None` leaves it unchanged.
    fn title(&self) -> Option<String> {
        None
    }
}

pub fn run_game<G: GameApp + 'static>(
    config: AppConfig,
    mut game: G,
) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = if let Some(monitor) = monitor_size {
        PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        )
    } else {
        config.desired_size
    };
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(initial_size)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let mut surface_size = SurfaceSize::new(window_size.width, window_size.height);
    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut pixels = Pixels::new(surface_size.width, surface_size.height, surface_texture)?;

    let mut input = InputFrame::default();
    let mut pressed_at: Option<(u32, u32)> = None;
    let mut last_frame = Instant::now();
    let mut last_title: Option<String> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    if size.width == 0 || size.height == 0 {
                        return;
                    }
                    surface_size = SurfaceSize::new(size.width, size.height);
                    if let Err(err) = pixels.resize_surface(size.width, size.height) {
                        tracing::warn!(%err, "surface resize failed");
                    }
                    if let Err(err) = pixels.resize_buffer(size.width, size.height) {
                        tracing::warn!(%err, "buffer resize failed");
                    }
                    window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.mouse_pos =
                        Some((position.x.max(0.0) as u32, position.y.max(0.0) as u32));
                }
                WindowEvent::MouseInput {
                    state: mouse_state,
                    button: MouseButton::Left,
                    ..
                } => match mouse_state {
                    ElementState::Pressed => pressed_at = input.mouse_pos,
                    ElementState::Released => {
                        if pressed_at.take().is_some() {
                            input.click = input.mouse_pos;
                        }
                    }
                },
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => input.keys.push(*key),
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(last_frame);
                last_frame = now;

                game.update(&input, dt, surface_size);
                input.end_frame();

                game.render(pixels.frame_mut(), surface_size);
                if let Err(err) = pixels.render() {
                    tracing::error!(%err, "present failed");
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                let title = game.title();
                if title.is_some() && title != last_title {
                    if let Some(text) = &title {
                        window.set_title(text);
                    }
                    last_title = title;
                }
            }
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            _ => {}
        }
    });

    #[allow(unreachable_code)]
    Ok(())
}
