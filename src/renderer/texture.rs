//! Texture loading
//!
//! A missing or unreadable image never stops the game: the error is logged
//! and a 1x1 black texture is bound in its place.

use std::path::Path;

use image::RgbaImage;

use crate::error::TextureError;

/// Decode an image file into RGBA8
pub fn decode(path: &Path) -> Result<RgbaImage, TextureError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Stand-in for textures that failed to load
pub fn fallback() -> RgbaImage {
    RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]))
}

/// Decode, or log and fall back to black
pub fn decode_or_fallback(path: &Path) -> RgbaImage {
    match decode(path) {
        Ok(img) => {
            log::info!("Loaded texture {} ({}x{})", path.display(), img.width(), img.height());
            img
        }
        Err(e) => {
            log::error!("Texture failed to load: {e}");
            fallback()
        }
    }
}

/// Texture, view and sampler bound together for the lit pipeline
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload an image with mipmapping off and repeat addressing
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, img: &RgbaImage, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: img.width(),
            height: img.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            img.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * img.width()),
                rows_per_image: Some(img.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = decode(Path::new("does/not/exist.png")).unwrap_err();
        let TextureError::Decode { path, .. } = err;
        assert_eq!(path, Path::new("does/not/exist.png"));
    }

    #[test]
    fn test_missing_file_falls_back_to_black() {
        let img = decode_or_fallback(Path::new("does/not/exist.jpg"));
        assert_eq!(img.dimensions(), (1, 1));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_decodes_png() {
        let path = std::env::temp_dir().join("space_bowling_texture_test.png");
        RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        let img = decode(&path).unwrap();
        assert_eq!(img.dimensions(), (2, 3));
        assert_eq!(img.get_pixel(1, 2).0, [10, 20, 30, 255]);
        let _ = std::fs::remove_file(path);
    }
}
