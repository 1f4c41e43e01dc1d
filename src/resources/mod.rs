use std::path::Path;

use thiserror::Error;

use crate::{
    data_structures::{
        model,
        scene_graph::{InvalidMeshReference, SceneGraph},
    },
    resources::{
        mesh::{ExtractError, ImportedMesh, extract_mesh},
        texture::{load_binary, load_string},
    },
};

/**
 * This module contains all logic for loading scenes, meshes and textures from external files.
 */
pub mod gltf_scene;
pub mod mesh;
pub mod obj_scene;
pub mod texture;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported model format: {path} (expected .gltf, .glb or .obj)")]
    UnsupportedFormat { path: String },
    #[error(transparent)]
    Gltf(#[from] gltf::Error),
    #[error(transparent)]
    Obj(#[from] tobj::LoadError),
    #[error("{path} contains no scene nodes")]
    EmptyScene { path: String },
    #[error("node {node} appears more than once in the hierarchy")]
    InvalidHierarchy { node: usize },
    #[error("mesh {mesh:?} has no vertex positions")]
    MissingPositions { mesh: String },
    #[error(transparent)]
    InvalidMeshReference(#[from] InvalidMeshReference),
}

/// The importer's output: a node hierarchy plus the flat list of meshes it references.
#[derive(Clone, Debug)]
pub struct ImportedScene {
    pub graph: SceneGraph,
    pub meshes: Vec<ImportedMesh>,
}

impl ImportedScene {
    /// Reject scenes whose nodes reference meshes that are not there.
    pub fn validate(&self) -> Result<(), InvalidMeshReference> {
        self.graph.validate(self.meshes.len())
    }

    /// Run geometry extraction on every mesh, in order.
    pub fn extract_meshes(&self) -> Result<Vec<model::Mesh>, ExtractError> {
        self.meshes.iter().map(extract_mesh).collect()
    }
}

/// Load a model file, picking the importer from the file extension.
///
/// The returned scene has already been post-processed (triangulated, normals and
/// tangents filled in where possible) and validated.
pub async fn load_scene(path: &Path) -> Result<ImportedScene, ImportError> {
    let file_name = path.display().to_string();
    let io_error = |source| ImportError::Io {
        path: file_name.clone(),
        source,
    };
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let scene = match extension.as_deref() {
        Some("gltf") | Some("glb") => {
            let bytes = load_binary(path).await.map_err(io_error)?;
            gltf_scene::load_gltf(&bytes, path.parent(), &file_name)?
        }
        Some("obj") => {
            let text = load_string(path).await.map_err(io_error)?;
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("ROOT");
            obj_scene::load_obj(&text, name)?
        }
        _ => return Err(ImportError::UnsupportedFormat { path: file_name }),
    };
    scene.validate()?;

    log::info!(
        "Loaded {}: {} nodes, {} meshes",
        file_name,
        scene.graph.len(),
        scene.meshes.len()
    );
    Ok(scene)
}
