use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;

use super::resource::{Disposable, ResourceId};

/// Sampling filter used when the texture is minified or magnified.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

impl TextureFilter {
    pub(crate) fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            TextureFilter::Linear => wgpu::FilterMode::Linear,
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

#[derive(Debug)]
pub(crate) struct TextureGpu {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// RGBA8 sRGB image plus its lazily uploaded GPU texture.
#[derive(Debug)]
pub struct Texture {
    id: ResourceId,
    label: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    filter: TextureFilter,

    gpu: RefCell<Option<TextureGpu>>,
    disposed: Cell<bool>,
}

impl Texture {
    /// Wraps tightly packed RGBA8 pixels (row-major, top row first).
    pub fn from_rgba8(
        label: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "texture has zero size");
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            pixels.len() == expected,
            "texture data is {} bytes, expected {expected} for {width}x{height} RGBA8",
            pixels.len()
        );

        Ok(Self {
            id: ResourceId::next(),
            label: label.into(),
            width,
            height,
            pixels,
            filter: TextureFilter::default(),
            gpu: RefCell::new(None),
            disposed: Cell::new(false),
        })
    }

    /// 1x1 texture of a single color.
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self::filled(label, 1, 1, |_, _| rgba)
    }

    /// Checkerboard of `cells` x `cells` squares over a `size` x `size` image.
    pub fn checker(label: impl Into<String>, size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        Self::filled(label, size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 { a } else { b }
        })
        .with_filter(TextureFilter::Nearest)
    }

    /// Builds a texture by evaluating `f(x, y)` for every pixel.
    pub fn filled(
        label: impl Into<String>,
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }

        Self {
            id: ResourceId::next(),
            label: label.into(),
            width,
            height,
            pixels,
            filter: TextureFilter::default(),
            gpu: RefCell::new(None),
            disposed: Cell::new(false),
        }
    }

    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    #[inline]
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn filter(&self) -> TextureFilter {
        self.filter
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.borrow().is_some()
    }

    /// Creates and fills the GPU texture if needed. Returns `false` once disposed.
    pub(crate) fn ensure_uploaded(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        if self.disposed.get() {
            return false;
        }
        if self.gpu.borrow().is_some() {
            return true;
        }

        let size = wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&self.label),
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
            &self.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        *self.gpu.borrow_mut() = Some(TextureGpu { texture, view });
        true
    }

    pub(crate) fn with_gpu<R>(&self, f: impl FnOnce(&TextureGpu) -> R) -> Option<R> {
        self.gpu.borrow().as_ref().map(f)
    }
}

impl Disposable for Texture {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        if let Some(gpu) = self.gpu.borrow_mut().take() {
            gpu.texture.destroy();
        }
        true
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}
