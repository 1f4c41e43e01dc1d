use std::path::PathBuf;

use basic_viewer::{
    data_structures::scene_graph::SceneNode,
    render::{DrawTarget, RenderError},
    pipelines::uniforms::ObjectUniform,
    resources::mesh::ImportedMesh,
};
use cgmath::{Matrix3, Matrix4, Vector3};

pub(crate) const EPSILON: f32 = 1e-5;

/// A node with a pure translation as its local transform.
pub(crate) fn translated(name: &str, x: f32, y: f32, z: f32) -> SceneNode {
    SceneNode::new(name, Matrix4::from_translation(Vector3::new(x, y, z)))
}

pub(crate) fn assert_mat4_eq(actual: &Matrix4<f32>, expected: &Matrix4<f32>) {
    let a: [[f32; 4]; 4] = (*actual).into();
    let e: [[f32; 4]; 4] = (*expected).into();
    for c in 0..4 {
        for r in 0..4 {
            assert!(
                (a[c][r] - e[c][r]).abs() < EPSILON,
                "column {} row {}: {:?} != {:?}",
                c,
                r,
                a,
                e
            );
        }
    }
}

pub(crate) fn assert_mat3_eq(actual: &Matrix3<f32>, expected: &Matrix3<f32>) {
    let a: [[f32; 3]; 3] = (*actual).into();
    let e: [[f32; 3]; 3] = (*expected).into();
    for c in 0..3 {
        for r in 0..3 {
            assert!(
                (a[c][r] - e[c][r]).abs() < EPSILON,
                "column {} row {}: {:?} != {:?}",
                c,
                r,
                a,
                e
            );
        }
    }
}

pub(crate) fn assert_vec3_eq(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual.x - expected.x).abs() < EPSILON
            && (actual.y - expected.y).abs() < EPSILON
            && (actual.z - expected.z).abs() < EPSILON,
        "{:?} != {:?}",
        actual,
        expected
    );
}

/// One draw as the traversal issued it, with the matrices bound at that moment.
#[derive(Clone, Debug)]
pub(crate) struct Call {
    pub node: String,
    pub mesh: usize,
    pub object: ObjectUniform,
}

/// Records every `set_object` and `draw_mesh` call without a GPU.
#[derive(Debug, Default)]
pub(crate) struct CallLog {
    pub objects: Vec<ObjectUniform>,
    pub calls: Vec<Call>,
}

impl DrawTarget for CallLog {
    fn set_object(&mut self, uniform: ObjectUniform) {
        self.objects.push(uniform);
    }

    fn draw_mesh(&mut self, node: &str, mesh: usize) -> Result<(), RenderError> {
        let object = *self.objects.last().expect("draw before set_object");
        self.calls.push(Call {
            node: node.to_string(),
            mesh,
            object,
        });
        Ok(())
    }
}

/// A unit quad in the XY plane as the importer would hand it over, two triangles.
pub(crate) fn imported_quad() -> ImportedMesh {
    ImportedMesh {
        name: "quad".to_string(),
        positions: vec![
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ],
        normals: Some(vec![[0.0, 0.0, 1.0]; 4]),
        tex_coords: Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        tangents: Some(vec![[1.0, 0.0, 0.0]; 4]),
        faces: vec![vec![0, 1, 2], vec![0, 2, 3]],
    }
}

/// Write `contents` to a fresh file in the system temp directory.
pub(crate) fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "basic-viewer-{}-{}",
        std::process::id(),
        name.replace('.', "_")
    ));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write temp file");
    path
}

#[cfg(feature = "integration-tests")]
pub(crate) async fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    let (_, device, queue) = basic_viewer::context::request_device(&instance, None)
        .await
        .expect("no headless device available");
    (device, queue)
}
