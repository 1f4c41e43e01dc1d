use std::path::Path;

use thiserror::Error;

use crate::{
    data_structures::{
        model::{self, Vertex},
        texture::Texture,
    },
    pipelines::uniforms::UniformResources,
};

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("could not read shader {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("shader {label} failed validation:\n{message}")]
    Validation { label: String, message: String },
}

/// Read WGSL source text from disk.
pub async fn load_shader_source(path: &Path) -> Result<String, ShaderError> {
    crate::resources::texture::load_string(path)
        .await
        .map_err(|source| ShaderError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Compile `source` and build the lighting pipeline from it.
///
/// Bind groups: 0 frame uniform, 1 diffuse + normal textures, 2 per-draw matrices.
/// Validation errors raised while creating the module or the pipeline are caught
/// through an error scope and returned instead of reaching the uncaptured handler.
pub async fn mk_basic_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    uniforms: &UniformResources,
    texture_bind_group_layout: &wgpu::BindGroupLayout,
    label: &str,
    source: &str,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Basic Pipeline Layout"),
        bind_group_layouts: &[
            &uniforms.frame_bind_group_layout,
            texture_bind_group_layout,
            &uniforms.object_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    };

    let pipeline = mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(Texture::DEPTH_FORMAT),
        &[model::ModelVertex::desc()],
        shader,
    );

    match device.pop_error_scope().await {
        Some(error) => Err(ShaderError::Validation {
            label: label.to_string(),
            message: error.to_string(),
        }),
        None => Ok(pipeline),
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // imported models do not agree on winding
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
