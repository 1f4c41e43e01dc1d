//! CPU meshes, the vertex layout shared with the shader, and the GPU mesh resource.
//!
//! A [`Mesh`] is the flat vertex/index pair produced by geometry extraction. A
//! [`GpuMesh`] owns the wgpu buffers for exactly one such mesh and is created once
//! at load time and released once at shutdown.

use std::mem;

use wgpu::util::DeviceExt;

/// Anything that can be laid out in a vertex buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Placeholder colour for imported geometry: opaque yellow.
pub const PLACEHOLDER_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// One vertex as the shader sees it.
///
/// The field order is the attribute order: position (0), color (1), normal (2),
/// tex_coords (3) and tangent (4).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub tangent: [f32; 3],
}

impl Default for ModelVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            color: PLACEHOLDER_COLOR,
            normal: [0.0; 3],
            tex_coords: [0.0; 2],
            tangent: [0.0; 3],
        }
    }
}

const MODEL_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
    wgpu::VertexAttribute {
        offset: mem::offset_of!(ModelVertex, position) as wgpu::BufferAddress,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    wgpu::VertexAttribute {
        offset: mem::offset_of!(ModelVertex, color) as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x4,
    },
    wgpu::VertexAttribute {
        offset: mem::offset_of!(ModelVertex, normal) as wgpu::BufferAddress,
        shader_location: 2,
        format: wgpu::VertexFormat::Float32x3,
    },
    wgpu::VertexAttribute {
        offset: mem::offset_of!(ModelVertex, tex_coords) as wgpu::BufferAddress,
        shader_location: 3,
        format: wgpu::VertexFormat::Float32x2,
    },
    wgpu::VertexAttribute {
        offset: mem::offset_of!(ModelVertex, tangent) as wgpu::BufferAddress,
        shader_location: 4,
        format: wgpu::VertexFormat::Float32x3,
    },
];

/**
 * stride: size of one `ModelVertex`
 * offset: the field offset inside `ModelVertex` for every attribute
 */
impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MODEL_VERTEX_ATTRIBUTES,
        }
    }
}

/// Vertices plus triangle-list indices (stride 3).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// The reference quad: four corners plus a fifth vertex to the far left that
    /// closes an extra triangle, giving 5 vertices and 9 indices.
    pub fn simple_quad() -> Self {
        let vertex = |position: [f32; 3], color: [f32; 4]| ModelVertex {
            position,
            color,
            ..Default::default()
        };
        let vertices = vec![
            vertex([-0.5, 0.5, 0.0], [1.0, 0.0, 0.0, 1.0]),
            vertex([0.5, 0.5, 0.0], [0.0, 1.0, 0.0, 1.0]),
            vertex([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0, 1.0]),
            vertex([0.5, -0.5, 0.0], [1.0, 1.0, 1.0, 1.0]),
            vertex([-0.75, 0.0, 0.0], [0.5, 0.7, 0.2, 1.0]),
        ];
        let indices = vec![0, 3, 1, 0, 2, 3, 4, 2, 0];
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` when every index addresses an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len();
        self.indices.iter().all(|&i| (i as usize) < count)
    }
}

/// The GPU side of one [`Mesh`]: vertex buffer, index buffer and vertex layout.
///
/// All handles are `None` once released (or when the mesh was never uploaded).
#[derive(Debug, Default)]
pub struct GpuMesh {
    pub name: String,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    layout: Option<wgpu::VertexBufferLayout<'static>>,
    index_count: u32,
}

impl GpuMesh {
    /// Upload `mesh` into freshly allocated, immutable buffers.
    ///
    /// The vertex buffer is exactly `vertices * stride` bytes and the index buffer
    /// `indices * 4` bytes. Every call creates an independent set of buffers.
    pub fn upload(device: &wgpu::Device, name: &str, mesh: &Mesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: name.to_string(),
            vertex_buffer: Some(vertex_buffer),
            index_buffer: Some(index_buffer),
            layout: Some(ModelVertex::desc()),
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn layout(&self) -> Option<&wgpu::VertexBufferLayout<'static>> {
        self.layout.as_ref()
    }

    /// Vertex and index buffer sizes in bytes, `None` once released.
    pub fn buffer_sizes(&self) -> Option<(wgpu::BufferAddress, wgpu::BufferAddress)> {
        let vertex = self.vertex_buffer.as_ref()?.size();
        let index = self.index_buffer.as_ref()?.size();
        Some((vertex, index))
    }

    pub fn is_released(&self) -> bool {
        self.vertex_buffer.is_none() && self.index_buffer.is_none() && self.layout.is_none()
    }

    /// Indexed triangle-list draw with whatever pipeline and bind groups are bound.
    ///
    /// A released mesh draws nothing.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&self.vertex_buffer, &self.index_buffer)
        else {
            return;
        };
        if self.index_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Free both buffers and forget the layout. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
        }
        if let Some(buffer) = self.index_buffer.take() {
            buffer.destroy();
        }
        self.layout = None;
        self.index_count = 0;
    }
}
