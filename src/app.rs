//! The "HI" application: event callbacks plus the per-frame scene update.

use std::pin::Pin;

use instant::Instant;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    config::Config,
    context::Context,
    flow::{CallbacksConstructor, EventCallbacks, Out},
    render::Renderer,
};

#[derive(Debug)]
pub struct Application {
    renderer: Renderer,
    start: Instant,
}

impl Application {
    pub async fn new(ctx: &Context, config: &Config) -> anyhow::Result<Self> {
        let renderer = Renderer::new(&ctx.device, ctx.config.format, config).await?;
        Ok(Self {
            renderer,
            start: Instant::now(),
        })
    }

    /// Constructor handed to [`crate::flow::run`].
    pub fn constructor() -> CallbacksConstructor<Application> {
        Box::new(construct)
    }
}

fn construct<'a>(
    ctx: &'a Context,
    config: Config,
) -> Pin<Box<dyn Future<Output = anyhow::Result<Application>> + 'a>> {
    Box::pin(async move { Application::new(ctx, &config).await })
}

/// Escape closes the window when pressed.
pub fn is_exit_key(key: PhysicalKey, state: ElementState) -> bool {
    key == PhysicalKey::Code(KeyCode::Escape) && state == ElementState::Pressed
}

/// The click report, in logical (screen) coordinates.
pub fn cursor_report(position: PhysicalPosition<f64>, scale_factor: f64) -> String {
    let position = position.to_logical::<f64>(scale_factor);
    format!("Pos X {} Pos Y {}", position.x, position.y)
}

impl EventCallbacks for Application {
    fn on_key(&mut self, _ctx: &Context, event: &KeyEvent) -> Out {
        if is_exit_key(event.physical_key, event.state) {
            log::info!("Escape pressed, closing");
            Out::Exit
        } else {
            Out::Empty
        }
    }

    fn on_mouse(&mut self, ctx: &Context, button: MouseButton, state: ElementState) -> Out {
        if state == ElementState::Pressed {
            log::debug!("{:?} button pressed", button);
            println!(
                "{}",
                cursor_report(ctx.mouse.coords, ctx.window().scale_factor())
            );
        }
        Out::Empty
    }

    fn on_resize(&mut self, _ctx: &Context, width: u32, height: u32) -> Out {
        log::debug!("Framebuffer resized to {}x{}", width, height);
        Out::Empty
    }

    fn on_render(&mut self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>) {
        let elapsed = self.start.elapsed().as_secs_f32();
        self.renderer
            .update(&ctx.queue, elapsed, ctx.config.width, ctx.config.height);
        self.renderer.draw(render_pass);
    }
}
