use std::{collections::HashSet, path::Path};

use cgmath::Matrix4;

use crate::{
    data_structures::scene_graph::{NodeId, SceneGraph, SceneNode},
    resources::{
        ImportError, ImportedScene,
        mesh::{Face, ImportedMesh, post_process},
    },
};

/// Build an [`ImportedScene`] from the contents of a `.gltf`/`.glb` file.
///
/// `base` is the directory external buffer URIs are resolved against.
pub fn load_gltf(bytes: &[u8], base: Option<&Path>, file_name: &str) -> Result<ImportedScene, ImportError> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let buffer_data = gltf::import_buffers(&gltf.document, base, gltf.blob.clone())?;

    // Each glTF mesh maps to the flat indices of its triangle primitives.
    let mut meshes = Vec::new();
    let mut mesh_slots = Vec::new();
    for mesh in gltf.document.meshes() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        let primitive_count = mesh.primitives().count();
        let mut slots = Vec::with_capacity(primitive_count);

        for primitive in mesh.primitives() {
            let name = if primitive_count > 1 {
                format!("{}[{}]", mesh_name, primitive.index())
            } else {
                mesh_name.clone()
            };
            let reader = primitive.reader(|buffer| Some(&*buffer_data[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| ImportError::MissingPositions { mesh: name.clone() })?
                .collect();
            let normals = reader.read_normals().map(|n| n.collect::<Vec<_>>());
            let tex_coords = reader
                .read_tex_coords(0)
                .map(|uv| uv.into_f32().collect::<Vec<_>>());
            // glTF tangents are vec4, w only carries the bitangent sign
            let tangents = reader
                .read_tangents()
                .map(|t| t.map(|[x, y, z, _]| [x, y, z]).collect::<Vec<_>>());
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let Some(faces) = faces_for_mode(primitive.mode(), &indices) else {
                log::warn!(
                    "{}: skipping primitive {} of mesh {:?}, mode {:?} has no triangles",
                    file_name,
                    primitive.index(),
                    mesh_name,
                    primitive.mode()
                );
                continue;
            };

            slots.push(meshes.len());
            meshes.push(post_process(ImportedMesh {
                name,
                positions,
                normals,
                tex_coords,
                tangents,
                faces,
            }));
        }
        mesh_slots.push(slots);
    }

    let scene = gltf
        .document
        .default_scene()
        .or_else(|| gltf.document.scenes().next())
        .ok_or_else(|| ImportError::EmptyScene {
            path: file_name.to_string(),
        })?;
    let roots: Vec<gltf::Node> = scene.nodes().collect();
    if roots.is_empty() {
        return Err(ImportError::EmptyScene {
            path: file_name.to_string(),
        });
    }

    let mut visited = HashSet::new();
    let graph = if roots.len() == 1 {
        let root = &roots[0];
        visited.insert(root.index());
        let mut graph = SceneGraph::new(to_scene_node(root, &mesh_slots));
        let root_id = graph.root();
        attach_children(&mut graph, root_id, root, &mesh_slots, &mut visited)?;
        graph
    } else {
        let mut graph = SceneGraph::new(SceneNode::named("ROOT"));
        let root_id = graph.root();
        for node in &roots {
            if !visited.insert(node.index()) {
                return Err(ImportError::InvalidHierarchy { node: node.index() });
            }
            let id = graph.add_child(root_id, to_scene_node(node, &mesh_slots));
            attach_children(&mut graph, id, node, &mesh_slots, &mut visited)?;
        }
        graph
    };

    Ok(ImportedScene { graph, meshes })
}

fn to_scene_node(node: &gltf::Node, mesh_slots: &[Vec<usize>]) -> SceneNode {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let transform = Matrix4::from(node.transform().matrix());
    let meshes = node
        .mesh()
        .and_then(|mesh| mesh_slots.get(mesh.index()))
        .cloned()
        .unwrap_or_default();
    SceneNode::new(name, transform).with_meshes(meshes)
}

fn attach_children(
    graph: &mut SceneGraph,
    parent: NodeId,
    node: &gltf::Node,
    mesh_slots: &[Vec<usize>],
    visited: &mut HashSet<usize>,
) -> Result<(), ImportError> {
    for child in node.children() {
        if !visited.insert(child.index()) {
            return Err(ImportError::InvalidHierarchy {
                node: child.index(),
            });
        }
        let id = graph.add_child(parent, to_scene_node(&child, mesh_slots));
        attach_children(graph, id, &child, mesh_slots, visited)?;
    }
    Ok(())
}

/// Turn an index stream into triangles according to the primitive topology.
///
/// Returns `None` for points and lines.
pub fn faces_for_mode(mode: gltf::mesh::Mode, indices: &[u32]) -> Option<Vec<Face>> {
    use gltf::mesh::Mode;

    let faces = match mode {
        Mode::Triangles => indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
        Mode::TriangleStrip => (0..indices.len().saturating_sub(2))
            .map(|i| {
                if i % 2 == 0 {
                    vec![indices[i], indices[i + 1], indices[i + 2]]
                } else {
                    vec![indices[i + 1], indices[i], indices[i + 2]]
                }
            })
            .collect(),
        Mode::TriangleFan => (1..indices.len().saturating_sub(1))
            .map(|i| vec![indices[0], indices[i], indices[i + 1]])
            .collect(),
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => return None,
    };
    Some(faces)
}
