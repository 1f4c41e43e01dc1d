use std::io::{BufReader, Cursor};

use crate::{
    data_structures::scene_graph::{SceneGraph, SceneNode},
    resources::{
        ImportError, ImportedScene,
        mesh::{ImportedMesh, post_process},
    },
};

fn chunked<const N: usize>(values: &[f32]) -> Vec<[f32; N]> {
    values
        .chunks_exact(N)
        .map(|chunk| {
            let mut out = [0.0; N];
            out.copy_from_slice(chunk);
            out
        })
        .collect()
}

/// Build an [`ImportedScene`] from the text of an `.obj` file.
///
/// Materials are ignored; the viewer binds its own textures. The result is a single
/// root node with identity transform that references every object of the file.
pub fn load_obj(text: &str, file_name: &str) -> Result<ImportedScene, ImportError> {
    let mut obj_reader = BufReader::new(Cursor::new(text));
    let (models, _) = tobj::load_obj_buf(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )?;
    if models.is_empty() {
        return Err(ImportError::EmptyScene {
            path: file_name.to_string(),
        });
    }

    let meshes: Vec<ImportedMesh> = models
        .into_iter()
        .map(|m| {
            let positions = chunked::<3>(&m.mesh.positions);
            let vertex_count = positions.len();
            // tobj leaves absent attributes empty
            let normals = Some(chunked::<3>(&m.mesh.normals)).filter(|n| n.len() == vertex_count);
            let tex_coords =
                Some(chunked::<2>(&m.mesh.texcoords)).filter(|uv| uv.len() == vertex_count);
            let faces = m.mesh.indices.chunks(3).map(<[u32]>::to_vec).collect();
            post_process(ImportedMesh {
                name: m.name,
                positions,
                normals,
                tex_coords,
                tangents: None,
                faces,
            })
        })
        .collect();

    let root = SceneNode::named(file_name).with_meshes(0..meshes.len());
    Ok(ImportedScene {
        graph: SceneGraph::new(root),
        meshes,
    })
}
