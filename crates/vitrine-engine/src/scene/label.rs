use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

pub use fontdue::Font;

use super::resource::Disposable;
use super::{shapes, Material, Node, Texture};
use crate::paint::Color;

const LABEL_WIDTH: u32 = 200;
const LABEL_HEIGHT: u32 = 100;
const LABEL_BACKGROUND: u32 = 0x0066dd;
const TEXT_ORIGIN: (f32, f32) = (10.0, 40.0);

/// Loads a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<Rc<Font>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read font {}", path.display()))?;
    let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
        .map_err(|e| anyhow::anyhow!("failed to parse font {}: {e}", path.display()))?;
    Ok(Rc::new(font))
}

/// Plane mesh showing a line of text rasterized into its texture.
pub struct MeshLabel {
    font: Rc<Font>,
    text: String,
    material: Rc<Material>,
}

impl MeshLabel {
    pub fn new(font: Rc<Font>, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let texture = rasterize(&font, &text)?.shared();
        let material = Material::new("label", Color::WHITE).shared();
        material.set_map(texture);
        Ok(Self { font, text, material })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn material(&self) -> &Rc<Material> {
        &self.material
    }

    /// Builds a scene node displaying this label, `width` units wide.
    pub fn node(&self, name: impl Into<String>, width: f32) -> Node {
        let aspect = LABEL_HEIGHT as f32 / LABEL_WIDTH as f32;
        let geometry = shapes::plane_geometry(width, width * aspect).shared();
        Node::mesh(name, geometry, Rc::clone(&self.material))
    }

    /// Re-rasterizes the label. The replaced texture is released immediately.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        if text == self.text {
            return Ok(());
        }
        let texture = rasterize(&self.font, &text)?.shared();
        if let Some(previous) = self.material.set_map(texture) {
            previous.dispose();
        }
        self.text = text;
        Ok(())
    }
}

impl std::fmt::Debug for MeshLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshLabel")
            .field("text", &self.text)
            .field("material", &self.material.label())
            .finish()
    }
}

fn rasterize(font: &fontdue::Font, text: &str) -> Result<Texture> {
    let px = LABEL_HEIGHT as f32 * 0.2;
    let ascent = font
        .horizontal_line_metrics(px)
        .map(|m| m.ascent)
        .unwrap_or(px);

    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x: TEXT_ORIGIN.0,
        y: TEXT_ORIGIN.1 - ascent,
        max_width: Some(LABEL_WIDTH as f32 - TEXT_ORIGIN.0),
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let background = Color::from_hex(LABEL_BACKGROUND).to_srgb_u8();
    let mut pixels = vec![background; (LABEL_WIDTH * LABEL_HEIGHT) as usize];

    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let (_, coverage) = font.rasterize_config(glyph.key);
        blit_coverage(
            &mut pixels,
            LABEL_WIDTH,
            glyph.x.round() as i32,
            glyph.y.round() as i32,
            glyph.width,
            &coverage,
        );
    }

    let bytes = pixels.iter().flatten().copied().collect();
    Texture::from_rgba8("label", LABEL_WIDTH, LABEL_HEIGHT, bytes)
}

/// Blends white over `pixels` using an 8-bit coverage mask placed at `(x, y)`.
fn blit_coverage(pixels: &mut [[u8; 4]], stride: u32, x: i32, y: i32, width: usize, coverage: &[u8]) {
    let rows = pixels.len() as i32 / stride as i32;
    for (i, &alpha) in coverage.iter().enumerate() {
        if alpha == 0 {
            continue;
        }
        let px = x + (i % width) as i32;
        let py = y + (i / width) as i32;
        if px < 0 || py < 0 || px >= stride as i32 || py >= rows {
            continue;
        }
        let dst = &mut pixels[(py * stride as i32 + px) as usize];
        for c in &mut dst[..3] {
            let a = alpha as u32;
            *c = ((255 * a + *c as u32 * (255 - a)) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_coverage_writes_white() {
        let mut pixels = [[0, 0, 0, 255]; 4];
        blit_coverage(&mut pixels, 2, 1, 0, 1, &[255, 255]);
        assert_eq!(pixels[1], [255, 255, 255, 255]);
        assert_eq!(pixels[3], [255, 255, 255, 255]);
        assert_eq!(pixels[0], [0, 0, 0, 255]);
    }

    #[test]
    fn out_of_bounds_coverage_is_clipped() {
        let mut pixels = [[10, 10, 10, 255]; 4];
        blit_coverage(&mut pixels, 2, -1, 1, 2, &[255, 255, 255, 255]);
        assert_eq!(pixels[2], [255, 255, 255, 255]);
        assert_eq!(pixels[3], [10, 10, 10, 255]);
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let err = load_font(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("failed to read font"));
    }
}
