//! Application event loop.
//!
//! Startup loads the scene before any window exists, so a bad model fails fast.
//! The window, device, shader, textures and GPU meshes are created once in
//! `resumed`; nothing is created or destroyed while frames are running.
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Window events mutate [`ViewerState`] (keys, cursor) or the surface (resize)
//! 2. `about_to_wait` asks for a redraw once the frame interval has passed
//! 3. `RedrawRequested` uploads the frame uniforms, walks the scene graph,
//!    replays the recorded draws and presents
//! 4. Closing the window (or Escape) exits the loop, GPU meshes are released

use std::{iter, path::Path, sync::Arc};

use anyhow::Context as _;
use instant::{Duration, Instant};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    context::Context,
    data_structures::{
        model::{GpuMesh, Mesh},
        texture::Texture,
    },
    pipelines::{
        basic::{load_shader_source, mk_basic_pipeline},
        uniforms::{FrameUniform, UniformResources},
    },
    render::{RenderError, SceneRenderer},
    resources::{
        self, ImportedScene,
        texture::{diffuse_normal_bind_group, diffuse_normal_layout, load_texture},
    },
    state::{KeyOutcome, ViewerState},
};

/// Schedules redraws at a fixed target interval.
///
/// This is a pacing policy on top of whatever the present mode does; with vsync on
/// the effective rate is the slower of the two.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last_frame: Option<Instant>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the start of a frame; returns the time since the previous one.
    pub fn begin_frame(&mut self, now: Instant) -> Duration {
        let dt = self
            .last_frame
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_frame = Some(now);
        dt
    }

    /// When the next frame should start.
    pub fn next_deadline(&self, now: Instant) -> Instant {
        match self.last_frame {
            Some(last) => last + self.interval,
            None => now,
        }
    }

    /// How long to wait before the next frame; zero when it is already late.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_deadline(now).saturating_duration_since(now)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }
}

/// Counts presented frames against the optional `--max-frames` limit.
///
/// Frames skipped because the surface is unconfigured do not count.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameBudget {
    max_frames: Option<u64>,
    presented: u64,
}

impl FrameBudget {
    pub fn new(max_frames: Option<u64>) -> Self {
        Self {
            max_frames,
            presented: 0,
        }
    }

    pub fn record(&mut self, presented: bool) {
        if presented {
            self.presented += 1;
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_frames.is_some_and(|max| self.presented >= max)
    }
}

#[derive(Debug, Error)]
enum FrameError {
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Scene(#[from] RenderError),
}

/// Everything that lives on the GPU for the lifetime of the window.
struct Viewer {
    ctx: Context,
    renderer: SceneRenderer,
    uniforms: UniformResources,
    pipeline: wgpu::RenderPipeline,
    texture_bind_group: wgpu::BindGroup,
}

impl Viewer {
    async fn new(
        window: Arc<Window>,
        config: &ViewerConfig,
        scene: LoadedScene,
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config.vsync).await?;

        let LoadedScene { scene, meshes } = scene;
        let gpu_meshes = scene
            .meshes
            .iter()
            .zip(&meshes)
            .map(|(imported, mesh)| GpuMesh::upload(&ctx.device, &imported.name, mesh))
            .collect::<Vec<_>>();
        log::info!("Uploaded {} meshes", gpu_meshes.len());
        let renderer = SceneRenderer::new(scene.graph, gpu_meshes, config.debug_scene);

        let uniforms = ctx.create_uniforms(renderer.object_slots());
        let texture_layout = diffuse_normal_layout(&ctx.device);

        let (diffuse, normal, source) = futures::try_join!(
            load_named_texture(&config.diffuse, false, &ctx),
            load_named_texture(&config.normal, true, &ctx),
            async {
                load_shader_source(&config.shader)
                    .await
                    .map_err(anyhow::Error::from)
            },
        )?;
        let texture_bind_group =
            diffuse_normal_bind_group(&ctx.device, &texture_layout, &diffuse, &normal);

        let label = config.shader.display().to_string();
        let pipeline = mk_basic_pipeline(
            &ctx.device,
            ctx.config.format,
            &uniforms,
            &texture_layout,
            &label,
            &source,
        )
        .await?;

        Ok(Self {
            ctx,
            renderer,
            uniforms,
            pipeline,
            texture_bind_group,
        })
    }

    /// Draw and present one frame. Returns `false` when the surface is unconfigured
    /// and nothing was drawn.
    fn render(&mut self, state: &ViewerState) -> Result<bool, FrameError> {
        if !self.ctx.is_surface_configured() {
            return Ok(false);
        }

        let view = state.camera.calc_matrix();
        let frame = FrameUniform::new(
            view,
            self.ctx.projection.calc_matrix(),
            &state.light,
            &state.material,
        );
        self.uniforms.write_frame(&self.ctx.queue, &frame);

        self.renderer.record(&view, state.spin_angle())?;
        let recorder = self.renderer.recorder();
        self.uniforms.write_objects(&self.ctx.queue, recorder.objects());

        let output = self.ctx.surface.get_current_texture()?;
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
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.uniforms.frame_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            recorder.replay(&mut render_pass, &self.uniforms, &self.renderer.meshes);
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        self.ctx.window().pre_present_notify();
        output.present();
        Ok(true)
    }
}

async fn load_named_texture(
    path: &Path,
    is_normal_map: bool,
    ctx: &Context,
) -> anyhow::Result<Texture> {
    load_texture(path, is_normal_map, &ctx.device, &ctx.queue)
        .await
        .with_context(|| format!("could not load texture {}", path.display()))
}

/// An imported scene together with its extracted geometry, one mesh per imported mesh.
struct LoadedScene {
    scene: ImportedScene,
    meshes: Vec<Mesh>,
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    config: ViewerConfig,
    scene: Option<LoadedScene>,
    viewer: Option<Viewer>,
    state: ViewerState,
    pacer: FramePacer,
    frames: FrameBudget,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(async_runtime: tokio::runtime::Runtime, config: ViewerConfig, scene: LoadedScene) -> Self {
        let pacer = FramePacer::new(config.frame_interval);
        let frames = FrameBudget::new(config.max_frames);
        Self {
            async_runtime,
            config,
            scene: Some(scene),
            viewer: None,
            state: ViewerState::new(),
            pacer,
            frames,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        if let Some(mut viewer) = self.viewer.take() {
            viewer.renderer.release();
            log::info!(
                "Released GPU resources after {} frames",
                self.frames.presented()
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.scene.take() else {
            return;
        };

        let window_attributes = Window::default_attributes()
            .with_title("basic-viewer")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                let error = anyhow::Error::new(e).context("could not open a window");
                return self.fail(event_loop, error);
            }
        };

        match self
            .async_runtime
            .block_on(Viewer::new(window, &self.config, scene))
        {
            Ok(viewer) => {
                viewer.ctx.window().request_redraw();
                self.viewer = Some(viewer);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => viewer.ctx.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if self.state.handle_key(code) == KeyOutcome::Exit {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let viewport = viewer.ctx.viewport();
                self.state
                    .controller
                    .process_pointer(&mut self.state.camera, position, viewport);
            }
            WindowEvent::RedrawRequested => {
                self.pacer.begin_frame(Instant::now());
                match viewer.render(&self.state) {
                    Ok(presented) => self.frames.record(presented),
                    Err(FrameError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => {
                        let size = viewer.ctx.window().inner_size();
                        viewer.ctx.resize(size.width, size.height);
                    }
                    Err(FrameError::Surface(wgpu::SurfaceError::Timeout)) => {
                        log::warn!("Surface timeout, skipping frame");
                    }
                    Err(e) => {
                        let error = anyhow::Error::new(e).context("rendering failed");
                        return self.fail(event_loop, error);
                    }
                }
                if self.frames.is_exhausted() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(viewer) = &self.viewer else {
            return;
        };
        let now = Instant::now();
        if self.pacer.is_due(now) {
            viewer.ctx.window().request_redraw();
        }
        let wait = self.pacer.remaining(now).max(Duration::from_millis(1));
        event_loop.set_control_flow(ControlFlow::WaitUntil(now + wait));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn init_logger(config: &ViewerConfig) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if config.debug_scene {
        builder.filter_module("basic_viewer::render", log::LevelFilter::Debug);
    }
    if let Err(e) = builder.try_init() {
        log::warn!("Logger already initialised: {}", e);
    }
}

/// Load the scene named by `config` and run the viewer until the window closes.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    init_logger(&config);

    let async_runtime =
        tokio::runtime::Runtime::new().context("could not start the async runtime")?;
    let scene = async_runtime
        .block_on(resources::load_scene(&config.model))
        .with_context(|| format!("could not load model {}", config.model.display()))?;
    let meshes = scene
        .extract_meshes()
        .context("the scene cannot be drawn with the fixed vertex layout")?;
    let scene = LoadedScene { scene, meshes };

    let event_loop = EventLoop::new().context("could not create the event loop")?;
    let mut app = App::new(async_runtime, config, scene);
    event_loop.run_app(&mut app).context("event loop error")?;
    app.shutdown();

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
