//! basic-viewer
//!
//! A minimal real-time 3D model viewer built on wgpu and winit. A glTF or OBJ
//! scene is imported into a node hierarchy, its meshes are uploaded once, and
//! every frame the hierarchy is walked to issue one draw per referenced mesh with
//! a single lighting shader. Mouse and keyboard input steer the camera and edit
//! the light, the material and a shared spin angle.
//!
//! High-level modules
//! - `camera`: eye/target camera, orbit and dolly navigation, projection
//! - `config`: command line arguments and resolved viewer configuration
//! - `context`: window surface, device and queue
//! - `data_structures`: vertices, CPU/GPU meshes, textures and the scene graph
//! - `flow`: the winit event loop and frame pacing
//! - `pipelines`: the lighting pipeline and its uniform layouts
//! - `render`: scene graph traversal and draw recording
//! - `resources`: scene import, geometry extraction and texture loading
//! - `state`: camera, light, material and spin state edited by input
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod state;
