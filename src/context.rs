use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::Projection,
    data_structures::texture,
    pipelines::uniforms::UniformResources,
};

/// Background colour of every frame.
pub const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 1.0,
    b: 1.0,
    a: 1.0,
};

/// Adapter, device and queue, optionally compatible with a window surface.
///
/// Passing no surface gives a headless device.
pub async fn request_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
) -> anyhow::Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .context("no suitable graphics adapter")?;
    log::info!("Using adapter {:?}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .context("could not create the graphics device")?;
    device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
        log::error!("Uncaptured wgpu error: {}", error);
    }));
    Ok((adapter, device, queue))
}

/// Prefer a non-blocking mode when vsync is off, fall back to `Fifo`.
pub fn choose_present_mode(supported: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Framebuffer size as last reported by the window; zero while minimized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FramebufferSize {
    pub width: u32,
    pub height: u32,
}

impl FramebufferSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `(0, 0)` when either side is zero, so pointer handling can skip the event.
    pub fn viewport(self) -> (u32, u32) {
        if self.is_empty() {
            (0, 0)
        } else {
            (self.width, self.height)
        }
    }
}

/// Window, surface and device state plus the resources every frame uses.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub projection: Projection,
    pub clear_colour: wgpu::Color,
    framebuffer: FramebufferSize,
    is_surface_configured: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::debug!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("could not create a surface for the window")?;
        let (adapter, device, queue) = request_device(&instance, Some(&surface)).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour, so an sRGB surface does the encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: choose_present_mode(&surface_caps.present_modes, vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface {:?} {}x{}, {:?}",
            config.format,
            config.width,
            config.height,
            config.present_mode
        );

        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(90.0),
            0.01,
            50.0,
        );

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let mut ctx = Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            projection,
            clear_colour: CLEAR_COLOUR,
            framebuffer: FramebufferSize::default(),
            is_surface_configured: false,
        };
        ctx.resize(size.width, size.height);
        Ok(ctx)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }

    /// Current framebuffer size in pixels, `(0, 0)` while minimized.
    pub fn viewport(&self) -> (u32, u32) {
        self.framebuffer.viewport()
    }

    /// Reconfigure the surface, depth buffer and projection. Zero sizes leave the
    /// surface unconfigured until the next non-zero resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer = FramebufferSize::new(width, height);
        if self.framebuffer.is_empty() {
            self.is_surface_configured = false;
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.projection.resize(width, height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = texture::Texture::create_depth_texture(
            &self.device,
            [width, height],
            "depth_texture",
        );
        self.is_surface_configured = true;
    }

    /// Per-frame uniform buffers sized for `object_slots` draws.
    pub fn create_uniforms(&self, object_slots: usize) -> UniformResources {
        UniformResources::new(&self.device, object_slots)
    }
}
