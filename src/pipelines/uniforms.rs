use bytemuck::Zeroable;
use cgmath::{Matrix3, Matrix4};
use wgpu::util::DeviceExt;

use crate::state::{Material, PointLight};

/// Group 0: values shared by every draw of a frame.
///
/// Layout matches `FrameUniform` in `basic.wgsl`; the two trailing floats pad the
/// struct to a multiple of 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_mat: [[f32; 4]; 4],
    pub proj_mat: [[f32; 4]; 4],
    pub light_pos: [f32; 4],
    pub light_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    _padding: [f32; 2],
}

impl FrameUniform {
    pub fn new(
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        light: &PointLight,
        material: &Material,
    ) -> Self {
        Self {
            view_mat: view.into(),
            proj_mat: projection.into(),
            light_pos: light.pos.into(),
            light_color: light.color,
            roughness: material.roughness,
            metallic: material.metallic,
            _padding: [0.0; 2],
        }
    }
}

/// Group 2: per-draw matrices, one slot per visited node.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model_mat: [[f32; 4]; 4],
    // WGSL mat3x3 columns are vec3 padded to 16 bytes
    pub norm_mat: [[f32; 4]; 3],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, normal: Matrix3<f32>) -> Self {
        let pad = |c: cgmath::Vector3<f32>| [c.x, c.y, c.z, 0.0];
        Self {
            model_mat: model.into(),
            norm_mat: [pad(normal.x), pad(normal.y), pad(normal.z)],
        }
    }

    pub fn model(&self) -> Matrix4<f32> {
        self.model_mat.into()
    }

    pub fn normal(&self) -> Matrix3<f32> {
        let [x, y, z] = self.norm_mat;
        Matrix3::new(x[0], x[1], x[2], y[0], y[1], y[2], z[0], z[1], z[2])
    }
}

/// GPU side of the two uniform groups.
#[derive(Debug)]
pub struct UniformResources {
    pub frame_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub object_buffer: wgpu::Buffer,
    pub object_bind_group: wgpu::BindGroup,
    pub object_bind_group_layout: wgpu::BindGroupLayout,
    /// Distance in bytes between two object slots.
    pub object_stride: u64,
    pub object_capacity: usize,
}

impl UniformResources {
    /// Allocate the frame uniform and `object_capacity` per-draw slots.
    pub fn new(device: &wgpu::Device, object_capacity: usize) -> Self {
        let frame_bind_group_layout = mk_frame_bind_group_layout(device);
        let object_bind_group_layout = mk_object_bind_group_layout(device);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::cast_slice(&[FrameUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        let object_stride = object_stride(device.limits().min_uniform_buffer_offset_alignment);
        let object_capacity = object_capacity.max(1);
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: object_stride * object_capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &object_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &object_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
            label: Some("object_bind_group"),
        });

        Self {
            frame_buffer,
            frame_bind_group,
            frame_bind_group_layout,
            object_buffer,
            object_bind_group,
            object_bind_group_layout,
            object_stride,
            object_capacity,
        }
    }

    pub fn write_frame(&self, queue: &wgpu::Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Upload object slots; slots past the capacity are dropped with a warning.
    pub fn write_objects(&self, queue: &wgpu::Queue, objects: &[ObjectUniform]) {
        if objects.len() > self.object_capacity {
            log::warn!(
                "{} object slots requested, only {} allocated",
                objects.len(),
                self.object_capacity
            );
        }
        for (slot, object) in objects.iter().take(self.object_capacity).enumerate() {
            queue.write_buffer(
                &self.object_buffer,
                self.dynamic_offset(slot) as u64,
                bytemuck::cast_slice(&[*object]),
            );
        }
    }

    pub fn dynamic_offset(&self, slot: usize) -> u32 {
        (self.object_stride * slot as u64) as u32
    }
}

/// Round the object uniform size up to the device's dynamic offset alignment.
pub fn object_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<ObjectUniform>() as u64;
    let alignment = u64::from(alignment.max(1));
    size.div_ceil(alignment) * alignment
}

pub fn mk_frame_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("frame_bind_group_layout"),
    })
}

pub fn mk_object_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
            },
            count: None,
        }],
        label: Some("object_bind_group_layout"),
    })
}
