//! Command line arguments and the resolved viewer configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

pub const DEFAULT_SHADER: &str = "assets/shaders/basic.wgsl";
pub const DEFAULT_DIFFUSE: &str = "assets/textures/diffuse.png";
pub const DEFAULT_NORMAL: &str = "assets/textures/normal.png";

#[derive(Parser, Debug)]
#[command(
    name = "basic-viewer",
    about = "Minimal real-time 3D model viewer",
    long_about = "Loads a glTF or OBJ scene and renders it with a single lighting shader.\n\n\
        CONTROLS:\n\
          mouse      swing the view direction around the eye\n\
          W/S        move forward/backward\n\
          A/D        strafe left/right\n\
          J/K        spin every node in place\n\
          1-4        light colour white/red/green/blue\n\
          V/B        metallic down/up\n\
          N/M        roughness down/up\n\
          Escape     quit",
    version
)]
pub struct Args {
    /// Model file to load (.gltf, .glb or .obj).
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// WGSL shader with `vs_main` and `fs_main` entry points.
    #[arg(long, default_value = DEFAULT_SHADER)]
    pub shader: PathBuf,

    /// Diffuse texture.
    #[arg(long, default_value = DEFAULT_DIFFUSE)]
    pub diffuse: PathBuf,

    /// Tangent-space normal map.
    #[arg(long, default_value = DEFAULT_NORMAL)]
    pub normal: PathBuf,

    /// Initial window width in pixels.
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Initial window height in pixels.
    #[arg(long, default_value = "800")]
    pub height: u32,

    /// Target time between frames in milliseconds.
    #[arg(long, default_value = "15")]
    pub frame_interval_ms: u64,

    /// Disable vertical sync (may cause tearing).
    #[arg(long)]
    pub no_vsync: bool,

    /// Log the node hierarchy with its matrices on the first frame.
    #[arg(long)]
    pub debug_scene: bool,

    /// Exit after rendering N frames.
    #[arg(long)]
    pub max_frames: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    pub model: PathBuf,
    pub shader: PathBuf,
    pub diffuse: PathBuf,
    pub normal: PathBuf,
    pub width: u32,
    pub height: u32,
    pub frame_interval: Duration,
    pub vsync: bool,
    pub debug_scene: bool,
    pub max_frames: Option<u64>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::new(),
            shader: DEFAULT_SHADER.into(),
            diffuse: DEFAULT_DIFFUSE.into(),
            normal: DEFAULT_NORMAL.into(),
            width: 800,
            height: 800,
            frame_interval: Duration::from_millis(15),
            vsync: true,
            debug_scene: false,
            max_frames: None,
        }
    }
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        Self {
            model: args.model,
            shader: args.shader,
            diffuse: args.diffuse,
            normal: args.normal,
            width: args.width.max(1),
            height: args.height.max(1),
            frame_interval: Duration::from_millis(args.frame_interval_ms),
            vsync: !args.no_vsync,
            debug_scene: args.debug_scene,
            max_frames: args.max_frames,
        }
    }
}

impl ViewerConfig {
    pub fn with_model(mut self, model: impl Into<PathBuf>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_textures(mut self, diffuse: impl Into<PathBuf>, normal: impl Into<PathBuf>) -> Self {
        self.diffuse = diffuse.into();
        self.normal = normal.into();
        self
    }

    pub fn with_shader(mut self, shader: impl Into<PathBuf>) -> Self {
        self.shader = shader.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_debug_scene(mut self, debug_scene: bool) -> Self {
        self.debug_scene = debug_scene;
        self
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }
}
