use cgmath::{InnerSpace, Vector2, Vector3, Zero};
use thiserror::Error;

use crate::data_structures::model::{self, PLACEHOLDER_COLOR};

/// One face of an imported mesh: a tuple of vertex indices.
pub type Face = Vec<u32>;

/// A mesh as it comes out of the importer, before it is flattened for the GPU.
///
/// Attribute arrays are parallel to `positions`. Everything but positions is
/// optional because model files are free to omit them.
#[derive(Clone, Debug, Default)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    /// UV channel 0.
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub faces: Vec<Face>,
}

impl ImportedMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("mesh {mesh:?} has no normals")]
    MissingNormals { mesh: String },
    #[error("mesh {mesh:?} has no texture coordinates in channel 0")]
    MissingTexCoords { mesh: String },
    #[error("mesh {mesh:?} has no tangents")]
    MissingTangents { mesh: String },
    #[error("mesh {mesh:?} has {found} {attribute} but {expected} positions")]
    AttributeCountMismatch {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("mesh {mesh:?} references vertex {index} but only has {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },
}

fn attribute<'a, T>(
    mesh: &ImportedMesh,
    values: &'a Option<Vec<T>>,
    name: &'static str,
    missing: ExtractError,
) -> Result<&'a [T], ExtractError> {
    let values = values.as_deref().ok_or(missing)?;
    if values.len() != mesh.vertex_count() {
        return Err(ExtractError::AttributeCountMismatch {
            mesh: mesh.name.clone(),
            attribute: name,
            expected: mesh.vertex_count(),
            found: values.len(),
        });
    }
    Ok(values)
}

/// Flatten an imported mesh into the vertex/index pair the GPU mesh expects.
///
/// Vertex count is preserved and the indices are every face's tuple in order. The
/// vertex colour is always [`PLACEHOLDER_COLOR`]; it does not come from the file.
pub fn extract_mesh(mesh: &ImportedMesh) -> Result<model::Mesh, ExtractError> {
    let name = || mesh.name.clone();
    let normals = attribute(
        mesh,
        &mesh.normals,
        "normals",
        ExtractError::MissingNormals { mesh: name() },
    )?;
    let tex_coords = attribute(
        mesh,
        &mesh.tex_coords,
        "texture coordinates",
        ExtractError::MissingTexCoords { mesh: name() },
    )?;
    let tangents = attribute(
        mesh,
        &mesh.tangents,
        "tangents",
        ExtractError::MissingTangents { mesh: name() },
    )?;

    let vertices = mesh
        .positions
        .iter()
        .zip(normals)
        .zip(tex_coords)
        .zip(tangents)
        .map(|(((&position, &normal), &tex_coords), &tangent)| model::ModelVertex {
            position,
            color: PLACEHOLDER_COLOR,
            normal,
            tex_coords,
            tangent,
        })
        .collect::<Vec<_>>();

    let indices = mesh.faces.iter().flatten().copied().collect::<Vec<u32>>();
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(ExtractError::IndexOutOfRange {
            mesh: name(),
            index,
            vertex_count: vertices.len(),
        });
    }

    Ok(model::Mesh { vertices, indices })
}

/// Split polygons into triangle fans. Faces with fewer than three indices are dropped.
pub fn triangulate(faces: Vec<Face>) -> Vec<Face> {
    let mut triangles = Vec::with_capacity(faces.len());
    for face in faces {
        match face.len() {
            0..=2 => (),
            3 => triangles.push(face),
            _ => {
                for i in 1..face.len() - 1 {
                    triangles.push(vec![face[0], face[i], face[i + 1]]);
                }
            }
        }
    }
    triangles
}

/// Fill in smooth vertex normals when the source has none.
///
/// Each triangle adds its (area weighted) face normal to its three vertices, the
/// sums are normalized at the end.
pub fn generate_normals(mesh: &mut ImportedMesh) {
    if mesh.normals.is_some() {
        return;
    }
    let mut normals = vec![Vector3::<f32>::zero(); mesh.vertex_count()];
    for face in mesh.faces.iter().filter(|f| f.len() == 3) {
        let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
        if a.max(b).max(c) >= normals.len() {
            continue;
        }
        let p0: Vector3<f32> = mesh.positions[a].into();
        let p1: Vector3<f32> = mesh.positions[b].into();
        let p2: Vector3<f32> = mesh.positions[c].into();
        let face_normal = (p1 - p0).cross(p2 - p0);
        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }
    mesh.normals = Some(
        normals
            .into_iter()
            .map(|n| {
                if n.magnitude2() > f32::EPSILON {
                    n.normalize().into()
                } else {
                    [0.0, 0.0, 1.0]
                }
            })
            .collect(),
    );
}

/**
 * Models without tangents need them calculated for normal maps to work.
 *
 * Every triangle solves
 *     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
 *     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
 * for T; the per-triangle tangents are summed per vertex, then made orthogonal to
 * the vertex normal and normalized. Requires normals and UV channel 0, does nothing
 * without them.
 */
pub fn calculate_tangents(mesh: &mut ImportedMesh) {
    if mesh.tangents.is_some() {
        return;
    }
    let (Some(normals), Some(tex_coords)) = (&mesh.normals, &mesh.tex_coords) else {
        return;
    };
    let vertex_count = mesh.vertex_count();
    if normals.len() != vertex_count || tex_coords.len() != vertex_count {
        return;
    }

    let mut tangents = vec![Vector3::<f32>::zero(); vertex_count];
    let mut degenerate = 0usize;
    for face in mesh.faces.iter().filter(|f| f.len() == 3) {
        let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
        if a.max(b).max(c) >= vertex_count {
            continue;
        }
        let pos0: Vector3<f32> = mesh.positions[a].into();
        let pos1: Vector3<f32> = mesh.positions[b].into();
        let pos2: Vector3<f32> = mesh.positions[c].into();

        let uv0: Vector2<f32> = tex_coords[a].into();
        let uv1: Vector2<f32> = tex_coords[b].into();
        let uv2: Vector2<f32> = tex_coords[c].into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            degenerate += 1;
            continue;
        }
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) / det;

        tangents[a] += tangent;
        tangents[b] += tangent;
        tangents[c] += tangent;
    }
    if degenerate > 0 {
        log::warn!(
            "mesh {:?}: skipped {} triangles with a degenerate UV mapping while computing tangents",
            mesh.name,
            degenerate
        );
    }

    mesh.tangents = Some(
        tangents
            .into_iter()
            .zip(normals)
            .map(|(t, &n)| {
                let n: Vector3<f32> = n.into();
                // Gram-Schmidt against the normal
                let t = t - n * n.dot(t);
                if t.magnitude2() > f32::EPSILON {
                    t.normalize().into()
                } else {
                    any_perpendicular(n).into()
                }
            })
            .collect(),
    );
}

fn any_perpendicular(n: Vector3<f32>) -> Vector3<f32> {
    let axis = if n.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    let t = axis - n * n.dot(axis);
    if t.magnitude2() > f32::EPSILON {
        t.normalize()
    } else {
        Vector3::unit_x()
    }
}

/// The import post-processing chain: triangulate, generate normals, compute tangents.
pub fn post_process(mut mesh: ImportedMesh) -> ImportedMesh {
    mesh.faces = triangulate(std::mem::take(&mut mesh.faces));
    generate_normals(&mut mesh);
    calculate_tangents(&mut mesh);
    mesh
}
