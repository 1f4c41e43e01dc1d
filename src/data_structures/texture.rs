//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around wgpu texture resources, the
//! depth buffer used by the frame loop, and the decode step that turns image file
//! contents into a bottom-up RGBA pixel buffer ready for upload.

use image::GenericImageView;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not read texture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode texture {label}: {source}")]
    Decode {
        label: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {label} has {channels} channels, only 3 (RGB) and 4 (RGBA) are supported")]
    UnsupportedChannelCount { label: String, channels: u8 },
    #[error("texture {label} is {width}x{height}, the device allows at most {max}x{max}")]
    TooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Pixel layout of the decoded source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Infer the format from the number of channels in the source image.
    pub fn from_channel_count(label: &str, channels: u8) -> Result<Self, TextureError> {
        match channels {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            channels => Err(TextureError::UnsupportedChannelCount {
                label: label.to_string(),
                channels,
            }),
        }
    }
}

/// A decoded image, flipped so that row 0 is the bottom row.
///
/// wgpu has no three-channel 8-bit format, so RGB sources are widened to RGBA
/// with an opaque alpha; `format` still records what the file contained.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            label: label.to_string(),
            source,
        })?;
        Self::from_image(img, label)
    }

    pub fn from_image(img: image::DynamicImage, label: &str) -> Result<Self, TextureError> {
        let format = PixelFormat::from_channel_count(label, img.color().channel_count())?;
        let img = img.flipv();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            format,
            rgba: img.to_rgba8().into_raw(),
        })
    }

    /// Reject images the device cannot hold in a single 2D texture.
    pub fn ensure_fits(&self, label: &str, max_dimension: u32) -> Result<(), TextureError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                label: label.to_string(),
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }
}

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Decode `bytes` and upload them as a sampled 2D texture.
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, etc.)
    /// * `label` is used as a debug name for the GPU resource
    /// * `is_normal_map` toggles between sRGB (false) and linear (true) color space
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        is_normal_map: bool,
    ) -> Result<Self, TextureError> {
        let decoded = DecodedImage::from_bytes(bytes, label)?;
        Self::from_decoded(device, queue, decoded, label, is_normal_map)
    }

    /// Upload a decoded image. The CPU pixel buffer is dropped as soon as the copy is queued.
    ///
    /// Images larger than the device's 2D texture limit are rejected before any GPU
    /// resource is created.
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        decoded: DecodedImage,
        label: &str,
        is_normal_map: bool,
    ) -> Result<Self, TextureError> {
        decoded.ensure_fits(label, device.limits().max_texture_dimension_2d)?;
        let size = wgpu::Extent3d {
            width: decoded.width,
            height: decoded.height,
            depth_or_array_layers: 1,
        };
        let format = if is_normal_map {
            wgpu::TextureFormat::Rgba8Unorm
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &decoded.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * decoded.width),
                rows_per_image: Some(decoded.height),
            },
            size,
        );
        drop(decoded);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_default_sampler(device));

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

/// Linear min/mag filtering, repeat on both axes.
pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
