//! Window event loop and the event-callback interface.
//!
//! [`run`] opens the window, creates the [`Context`], builds the application
//! through its constructor and then forwards winit events to it through
//! [`EventCallbacks`].
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, the GPU context and the callbacks
//! 2. Keyboard, mouse and resize events go to the matching `on_*` hook
//! 3. `RedrawRequested` clears the frame, lets `on_render` record draws and presents
//! 4. The loop ends when the window is closed or a hook returns [`Out::Exit`]

use std::{iter, pin::Pin, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{config::Config, context::Context, render::begin_frame_pass};

/// What the loop should do after a callback returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Out {
    /// Close the window and leave the event loop.
    Exit,
    #[default]
    Empty,
}

/// Hooks invoked by the event loop.
pub trait EventCallbacks {
    fn on_key(&mut self, ctx: &Context, event: &KeyEvent) -> Out;

    /// `ctx.mouse.coords` holds the cursor position at the time of the click.
    fn on_mouse(&mut self, ctx: &Context, button: MouseButton, state: ElementState) -> Out;

    /// Called after the surface and depth buffer were resized.
    fn on_resize(&mut self, ctx: &Context, width: u32, height: u32) -> Out;

    /// Records this frame's draws into a pass that is already cleared.
    fn on_render(&mut self, ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>);
}

/// Builds the callbacks once the context exists.
pub type CallbacksConstructor<C> = Box<
    dyn for<'a> FnOnce(&'a Context, Config) -> Pin<Box<dyn Future<Output = anyhow::Result<C>> + 'a>>,
>;

#[derive(Debug)]
pub struct AppState<C> {
    pub(crate) ctx: Context,
    callbacks: C,
    is_surface_configured: bool,
}

impl<C: EventCallbacks> AppState<C> {
    fn resize(&mut self, width: u32, height: u32) -> Out {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
            self.callbacks.on_resize(&self.ctx, width, height)
        } else {
            Out::Empty
        }
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // keep the loop going
        self.ctx.window.request_redraw();

        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(t)
            | wgpu::CurrentSurfaceTexture::Suboptimal(t) => t,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = begin_frame_pass(
                &mut encoder,
                &view,
                &self.ctx.depth_texture.view,
                self.ctx.clear_colour,
            );
            self.callbacks.on_render(&self.ctx, &mut render_pass);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<C> {
    async_runtime: tokio::runtime::Runtime,
    config: Config,
    state: Option<AppState<C>>,
    constructor: Option<CallbacksConstructor<C>>,
    error: Option<anyhow::Error>,
}

impl<C> App<C> {
    fn new(config: Config, constructor: CallbacksConstructor<C>) -> anyhow::Result<Self> {
        Ok(Self {
            async_runtime: tokio::runtime::Runtime::new()?,
            config,
            state: None,
            constructor: Some(constructor),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState<C>> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let constructor = self
            .constructor
            .take()
            .ok_or_else(|| anyhow::anyhow!("The application was already constructed"))?;
        let config = self.config.clone();
        let clear_colour = self.config.clear_colour;

        let (ctx, callbacks) = self.async_runtime.block_on(async move {
            let ctx = Context::new(window, clear_colour).await?;
            let callbacks = constructor(&ctx, config).await?;
            anyhow::Ok((ctx, callbacks))
        })?;

        Ok(AppState {
            ctx,
            callbacks,
            is_surface_configured: false,
        })
    }
}

impl<C: EventCallbacks + 'static> ApplicationHandler for App<C> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(mut state) => {
                let size = state.ctx.window.inner_size();
                if state.resize(size.width, size.height) == Out::Exit {
                    event_loop.exit();
                }
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        let out = match event {
            WindowEvent::CloseRequested => Out::Exit,
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                state.ctx.mouse.coords = position;
                Out::Empty
            }
            WindowEvent::KeyboardInput { ref event, .. } => {
                state.callbacks.on_key(&state.ctx, event)
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => state.callbacks.on_mouse(&state.ctx, button, button_state),
            WindowEvent::RedrawRequested => {
                match state.render() {
                    Ok(_) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(wgpu::CurrentSurfaceTexture::Timeout) => {
                        log::warn!("Surface timed out, skipping frame");
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
                Out::Empty
            }
            _ => Out::Empty,
        };

        if out == Out::Exit {
            event_loop.exit();
        }
    }
}

/// Installs `env_logger`, filtered through `RUST_LOG`. Call once, before
/// [`run`].
pub fn init_logger() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };
}

/// Runs the event loop until the window closes.
///
/// Errors during setup (no adapter, unreadable mesh, shader failures) end the
/// loop and are returned here.
pub fn run<C: EventCallbacks + 'static>(
    config: Config,
    constructor: CallbacksConstructor<C>,
) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, constructor)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
