//! Engine data structures: meshes, textures and the scene graph.
//!
//! - `model` contains the vertex layout, CPU meshes and the GPU mesh resource
//! - `texture` contains GPU texture wrapper and image decoding
//! - `scene_graph` holds the imported node hierarchy

pub mod model;
pub mod scene_graph;
pub mod texture;
