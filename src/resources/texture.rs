use std::path::Path;

use crate::data_structures::texture::{self, TextureError};

/// Diffuse map at bindings 0/1, normal map at bindings 2/3 (texture, sampler).
pub fn diffuse_normal_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("Model texture_bind_group_layout"),
    })
}

/// Bind the diffuse texture (slot 0) and normal map (slot 1) together.
pub fn diffuse_normal_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    diffuse: &texture::Texture,
    normal: &texture::Texture,
) -> wgpu::BindGroup {
    let diffuse_sampler = diffuse
        .sampler
        .clone()
        .unwrap_or_else(|| texture::create_default_sampler(device));
    let normal_sampler = normal
        .sampler
        .clone()
        .unwrap_or_else(|| texture::create_default_sampler(device));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&diffuse.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&diffuse_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&normal_sampler),
            },
        ],
        label: Some("diffuse_normal_bind_group"),
    })
}

pub async fn load_string(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}

pub async fn load_binary(path: &Path) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(path).await
}

/// Read, decode (bottom-up) and upload one texture file.
pub async fn load_texture(
    path: &Path,
    is_normal_map: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<texture::Texture, TextureError> {
    let label = path.display().to_string();
    let data = load_binary(path).await.map_err(|source| TextureError::Io {
        path: label.clone(),
        source,
    })?;
    texture::Texture::from_bytes(device, queue, &data, &label, is_normal_map)
}
