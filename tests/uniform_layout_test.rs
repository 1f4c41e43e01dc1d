use std::mem::size_of;

use basic_viewer::{
    pipelines::uniforms::{FrameUniform, ObjectUniform, object_stride},
    state::{Material, PointLight},
};
use cgmath::{Deg, Matrix3, Matrix4, SquareMatrix, Vector3};

use crate::common::test_utils::{assert_mat3_eq, assert_mat4_eq};

mod common;

#[test]
fn uniform_sizes_match_the_shader_layout() {
    assert_eq!(size_of::<FrameUniform>(), 176);
    assert_eq!(size_of::<ObjectUniform>(), 112);
    assert_eq!(size_of::<FrameUniform>() % 16, 0);
}

#[test]
fn object_stride_respects_the_offset_alignment() {
    assert_eq!(object_stride(256), 256);
    assert_eq!(object_stride(64), 128);
    assert_eq!(object_stride(16), 112);
    assert_eq!(object_stride(0), 112);
}

#[test]
fn frame_uniform_carries_light_and_material() {
    let light = PointLight::default();
    let material = Material {
        metallic: 0.4,
        roughness: 0.3,
    };

    let uniform = FrameUniform::new(Matrix4::identity(), Matrix4::identity(), &light, &material);

    assert_eq!(uniform.light_pos, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(uniform.light_color, [1.0, 1.0, 1.0, 1.0]);
    assert_eq!(uniform.metallic, 0.4);
    assert_eq!(uniform.roughness, 0.3);
}

#[test]
fn object_uniform_pads_normal_columns() {
    let model = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
    let normal = Matrix3::from_angle_z(Deg(45.0));

    let uniform = ObjectUniform::new(model, normal);

    assert_mat4_eq(&uniform.model(), &model);
    assert_mat3_eq(&uniform.normal(), &normal);
    assert!(uniform.norm_mat.iter().all(|column| column[3] == 0.0));
}
