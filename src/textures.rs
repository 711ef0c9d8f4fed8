/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;
use image::imageops::FilterType;
use log::{debug, warn};
use wgpu::util::DeviceExt;

use crate::draw_context::DrawContext;

/// What happens to texture coordinates outside of `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapping {
    Repeat,
    #[default]
    ClampToEdge,
    MirroredRepeat,
}

impl From<Wrapping> for wgpu::AddressMode {
    fn from(value: Wrapping) -> Self {
        match value {
            Wrapping::Repeat => Self::Repeat,
            Wrapping::ClampToEdge => Self::ClampToEdge,
            Wrapping::MirroredRepeat => Self::MirrorRepeat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapLinear,
}

impl Filter {
    #[must_use]
    pub fn uses_mipmaps(self) -> bool {
        matches!(self, Self::NearestMipmapNearest | Self::LinearMipmapLinear)
    }

    fn filter_mode(self) -> wgpu::FilterMode {
        match self {
            Self::Nearest | Self::NearestMipmapNearest => wgpu::FilterMode::Nearest,
            Self::Linear | Self::LinearMipmapLinear => wgpu::FilterMode::Linear,
        }
    }

    fn mipmap_filter_mode(self) -> wgpu::FilterMode {
        match self {
            Self::LinearMipmapLinear => wgpu::FilterMode::Linear,
            _ => wgpu::FilterMode::Nearest,
        }
    }
}

/// Color maps are stored as sRGB and sampled as linear values, data maps
/// (normals, roughness) are used as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    #[default]
    Srgb,
    Linear,
}

impl ColorSpace {
    fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            Self::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureOptions {
    pub wrap_s: Wrapping,
    pub wrap_t: Wrapping,
    /// How many times the texture is tiled across the UV range.
    pub repeat: [f32; 2],
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub generate_mipmaps: bool,
    pub color_space: ColorSpace,
    /// Texel used when the image cannot be loaded.
    pub placeholder: [u8; 4],
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap_s: Wrapping::ClampToEdge,
            wrap_t: Wrapping::ClampToEdge,
            repeat: [1., 1.],
            min_filter: Filter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
            generate_mipmaps: true,
            color_space: ColorSpace::Srgb,
            placeholder: [255, 255, 255, 255],
        }
    }
}

impl TextureOptions {
    pub const FLAT_NORMAL: [u8; 4] = [128, 128, 255, 255];

    /// Options for a tangent space normal map.
    #[must_use]
    pub fn normal_map() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            placeholder: Self::FLAT_NORMAL,
            ..Self::default()
        }
    }

    /// Options for a map whose channels hold plain values, like roughness.
    #[must_use]
    pub fn data_map() -> Self {
        Self {
            color_space: ColorSpace::Linear,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_repeat(mut self, x: f32, y: f32) -> Self {
        self.wrap_s = Wrapping::Repeat;
        self.wrap_t = Wrapping::Repeat;
        self.repeat = [x, y];
        self
    }

    /// Number of mip levels a `width` x `height` image gets with these options.
    #[must_use]
    pub fn mip_level_count(&self, width: u32, height: u32) -> u32 {
        if self.generate_mipmaps && self.min_filter.uses_mipmaps() {
            full_mip_level_count(width, height)
        } else {
            1
        }
    }
}

#[must_use]
pub fn full_mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Successive halvings of `image` down to a single texel, `image` included.
#[must_use]
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let level_count = full_mip_level_count(image.width(), image.height());
    let mut levels = Vec::with_capacity(level_count as usize);
    levels.push(image.clone());
    for _ in 1..level_count {
        let Some(previous) = levels.last() else {
            break;
        };
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        levels.push(image::imageops::resize(
            previous,
            width,
            height,
            FilterType::Triangle,
        ));
    }
    levels
}

/// A sampled texture on the GPU, ready to be bound to a material.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub repeat: [f32; 2],
}

impl Texture {
    pub fn from_image(
        context: &DrawContext,
        image: &RgbaImage,
        options: &TextureOptions,
        label: Option<&str>,
    ) -> Self {
        let mip_level_count = options.mip_level_count(image.width(), image.height());
        let levels = if mip_level_count > 1 {
            mip_chain(image)
        } else {
            vec![image.clone()]
        };
        let data = levels
            .iter()
            .flat_map(|level| level.as_raw().iter().copied())
            .collect::<Vec<u8>>();
        let texture = context.device.create_texture_with_data(
            &context.queue,
            &wgpu::TextureDescriptor {
                label,
                size: wgpu::Extent3d {
                    width: image.width(),
                    height: image.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: options.color_space.texture_format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = context.device.create_sampler(&wgpu::SamplerDescriptor {
            label,
            address_mode_u: options.wrap_s.into(),
            address_mode_v: options.wrap_t.into(),
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: options.mag_filter.filter_mode(),
            min_filter: options.min_filter.filter_mode(),
            mipmap_filter: options.min_filter.mipmap_filter_mode(),
            ..Default::default()
        });
        debug!(
            "Uploaded texture {:?} {}x{} with {} mip levels",
            label.unwrap_or_default(),
            image.width(),
            image.height(),
            mip_level_count
        );
        Self {
            texture,
            view,
            sampler,
            repeat: options.repeat,
        }
    }

    /// 1x1 texture filled with `options.placeholder`.
    #[must_use]
    pub fn placeholder(context: &DrawContext, options: &TextureOptions) -> Self {
        let image = RgbaImage::from_pixel(1, 1, image::Rgba(options.placeholder));
        Self::from_image(context, &image, options, Some("Placeholder Texture"))
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.texture.mip_level_count()
    }
}

/// Reads images relative to an assets directory.
#[derive(Debug, Clone)]
pub struct TextureLoader {
    root: PathBuf,
}

impl TextureLoader {
    pub const ENV_ASSETS_DIR: &'static str = "ASSETS_DIR";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `ASSETS_DIR` when set, the `assets` folder of the crate otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        let root = env::var_os(Self::ENV_ASSETS_DIR).map_or_else(
            || Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"),
            PathBuf::from,
        );
        Self::new(root)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    pub fn decode(&self, path: impl AsRef<Path>) -> anyhow::Result<RgbaImage> {
        let path = self.resolve(path);
        let image = image::open(&path)
            .with_context(|| format!("Could not load texture {}", path.display()))?;
        Ok(image.to_rgba8())
    }

    /// Never fails: an image that cannot be read or decoded is replaced by
    /// the placeholder texel of `options`.
    pub fn load(
        &self,
        context: &DrawContext,
        path: impl AsRef<Path>,
        options: &TextureOptions,
    ) -> Texture {
        let path = path.as_ref();
        match self.decode(path) {
            Ok(image) => Texture::from_image(context, &image, options, path.to_str()),
            Err(err) => {
                warn!("{err:#}, using placeholder instead");
                let mut texture = Texture::placeholder(context, options);
                texture.repeat = options.repeat;
                texture
            }
        }
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_halves_down_to_one_texel() {
        let image = RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]));
        let chain = mip_chain(&image);
        let sizes = chain
            .iter()
            .map(|level| (level.width(), level.height()))
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
        assert_eq!(chain[3].get_pixel(0, 0), &image::Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn mip_level_count_follows_largest_side() {
        assert_eq!(full_mip_level_count(1, 1), 1);
        assert_eq!(full_mip_level_count(1024, 1024), 11);
        assert_eq!(full_mip_level_count(1000, 3), 10);
        assert_eq!(full_mip_level_count(0, 0), 1);
    }

    #[test]
    fn linear_min_filter_uses_a_single_level() {
        let options = TextureOptions {
            min_filter: Filter::Linear,
            ..TextureOptions::default()
        };
        assert_eq!(options.mip_level_count(1024, 1024), 1);
        let options = TextureOptions {
            generate_mipmaps: false,
            ..TextureOptions::default()
        };
        assert_eq!(options.mip_level_count(1024, 1024), 1);
        assert_eq!(TextureOptions::default().mip_level_count(1024, 1024), 11);
    }

    #[test]
    fn repeat_switches_wrapping() {
        let options = TextureOptions::default().with_repeat(5., 5.);
        assert_eq!(options.wrap_s, Wrapping::Repeat);
        assert_eq!(options.wrap_t, Wrapping::Repeat);
        assert_eq!(options.repeat, [5., 5.]);
        assert_eq!(TextureOptions::default().wrap_s, Wrapping::ClampToEdge);
    }

    #[test]
    fn data_maps_are_linear() {
        assert_eq!(TextureOptions::normal_map().color_space, ColorSpace::Linear);
        assert_eq!(
            TextureOptions::normal_map().placeholder,
            TextureOptions::FLAT_NORMAL
        );
        assert_eq!(TextureOptions::data_map().color_space, ColorSpace::Linear);
        assert_eq!(TextureOptions::default().color_space, ColorSpace::Srgb);
    }

    #[test]
    fn missing_image_is_an_error_when_decoding() {
        let loader = TextureLoader::new(env::temp_dir().join("wgpu-first-steps-missing"));
        let err = loader.decode("nothing.png").expect_err("file does not exist");
        assert!(format!("{err:#}").contains("nothing.png"));
    }

    #[test]
    fn decode_reads_png_from_assets_dir() {
        let dir = env::temp_dir().join(format!("wgpu-first-steps-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        image.save(dir.join("tile.png")).expect("png encoding");
        let decoded = TextureLoader::new(&dir)
            .decode("tile.png")
            .expect("png decoding");
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 1), &image::Rgba([1, 2, 3, 255]));
        std::fs::remove_dir_all(&dir).ok();
    }
}
