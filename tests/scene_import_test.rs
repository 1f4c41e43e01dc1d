use std::path::Path;

use basic_viewer::resources::{
    ImportError, gltf_scene::faces_for_mode, load_scene, mesh::ExtractError, obj_scene::load_obj,
};
use cgmath::{Matrix4, Vector3};

use crate::common::test_utils::{assert_mat4_eq, temp_file};

mod common;

const TWO_TRIANGLES: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
o second
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 4/4 5/5 6/6 7/7
";

#[tokio::test]
async fn obj_objects_hang_off_a_single_root() {
    let path = temp_file("two_objects.obj", TWO_TRIANGLES);

    let scene = load_scene(&path).await.unwrap();

    assert_eq!(scene.graph.len(), 1);
    let root = scene.graph.node(scene.graph.root());
    assert_eq!(root.name, "two_objects");
    assert_eq!(root.meshes, vec![0, 1]);
    assert_eq!(scene.meshes.len(), 2);
    // The quad was triangulated and normals generated on import.
    assert_eq!(scene.meshes[1].faces.len(), 2);
    assert!(scene.meshes[1].normals.is_some());
    assert!(scene.meshes[1].tangents.is_some());

    let meshes = scene.extract_meshes().unwrap();
    assert_eq!(meshes[0].indices.len(), 3);
    assert_eq!(meshes[1].indices.len(), 6);
}

#[tokio::test]
async fn bundled_cube_extracts_one_vertex_per_face_corner() {
    let scene = load_scene(Path::new("assets/models/cube.obj")).await.unwrap();

    let meshes = scene.extract_meshes().unwrap();

    assert_eq!(meshes.len(), 1);
    assert_eq!(meshes[0].vertices.len(), 24);
    assert_eq!(meshes[0].indices.len(), 36);
    assert!(meshes[0].indices_in_bounds());
}

#[test]
fn obj_without_uvs_cannot_be_extracted() {
    let scene = load_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", "bare").unwrap();

    assert!(scene.meshes[0].normals.is_some());
    assert_eq!(
        scene.extract_meshes(),
        Err(ExtractError::MissingTexCoords {
            mesh: scene.meshes[0].name.clone()
        })
    );
}

#[tokio::test]
async fn unknown_extension_is_rejected() {
    let path = temp_file("model.stl", "solid nothing");

    let result = load_scene(&path).await;

    assert!(matches!(result, Err(ImportError::UnsupportedFormat { .. })));
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let result = load_scene(Path::new("does/not/exist.obj")).await;

    assert!(matches!(result, Err(ImportError::Io { .. })));
}

#[tokio::test]
async fn gltf_with_several_roots_gets_a_synthetic_root() {
    let scene = load_scene(Path::new("tests/fixtures/two_roots.gltf"))
        .await
        .unwrap();

    let order: Vec<(String, usize)> = scene
        .graph
        .depth_first()
        .into_iter()
        .map(|(id, depth)| (scene.graph.node(id).name.clone(), depth))
        .collect();
    assert_eq!(
        order,
        vec![
            ("ROOT".to_string(), 0),
            ("left".to_string(), 1),
            ("child".to_string(), 2),
            ("right".to_string(), 1),
        ]
    );

    let left = scene.graph.node(scene.graph.node(scene.graph.root()).children()[0]);
    assert_eq!(left.meshes, vec![0]);
    assert_mat4_eq(
        &left.transform,
        &Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0)),
    );
    assert_eq!(scene.graph.mesh_reference_count(), 2);

    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.meshes[0].name, "triangle");
    assert!(scene.meshes[0].tangents.is_some());
    let meshes = scene.extract_meshes().unwrap();
    assert_eq!(meshes[0].vertices.len(), 3);
    assert_eq!(meshes[0].indices, vec![0, 1, 2]);
}

#[test]
fn primitive_modes_become_triangles() {
    use gltf::mesh::Mode;

    let indices = [0, 1, 2, 3, 4];

    assert_eq!(
        faces_for_mode(Mode::Triangles, &indices[..3]),
        Some(vec![vec![0, 1, 2]])
    );
    assert_eq!(
        faces_for_mode(Mode::TriangleStrip, &indices),
        Some(vec![vec![0, 1, 2], vec![2, 1, 3], vec![2, 3, 4]])
    );
    assert_eq!(
        faces_for_mode(Mode::TriangleFan, &indices),
        Some(vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4]])
    );
    assert_eq!(faces_for_mode(Mode::Lines, &indices), None);
    assert_eq!(faces_for_mode(Mode::Points, &indices), None);
}
