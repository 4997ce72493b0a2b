use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::resource::{Disposable, ResourceId};
use super::Texture;
use crate::paint::Color;

/// Named texture slots a material can sample.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureSlot {
    /// Base color, multiplied with the material color.
    Map,
    /// Green channel multiplies the fragment alpha.
    AlphaMap,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 2] = [TextureSlot::Map, TextureSlot::AlphaMap];

    fn index(self) -> usize {
        match self {
            TextureSlot::Map => 0,
            TextureSlot::AlphaMap => 1,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MaterialGpu {
    pub uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    /// Textures the bind group was built with, per slot.
    pub bound: [Option<ResourceId>; 2],
}

/// Unlit surface description: color, opacity and optional texture slots.
///
/// Properties use interior mutability so per-frame callbacks can animate a
/// material through a shared `Rc<Material>`.
#[derive(Debug)]
pub struct Material {
    id: ResourceId,
    label: String,

    color: Cell<Color>,
    opacity: Cell<f32>,
    transparent: Cell<bool>,
    textures: [RefCell<Option<Rc<Texture>>>; 2],

    pub(crate) gpu: RefCell<Option<MaterialGpu>>,
    disposed: Cell<bool>,
}

impl Material {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            id: ResourceId::next(),
            label: label.into(),
            color: Cell::new(color),
            opacity: Cell::new(1.0),
            transparent: Cell::new(false),
            textures: [RefCell::new(None), RefCell::new(None)],
            gpu: RefCell::new(None),
            disposed: Cell::new(false),
        }
    }

    pub fn with_texture(self, slot: TextureSlot, texture: Rc<Texture>) -> Self {
        self.set_texture(slot, Some(texture));
        self
    }

    /// Enables alpha blending with the given opacity.
    pub fn with_opacity(self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self.transparent.set(true);
        self
    }

    #[inline]
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> Color {
        self.color.get()
    }

    pub fn set_color(&self, color: Color) {
        self.color.set(color);
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.get()
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.opacity.set(opacity.clamp(0.0, 1.0));
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent.get()
    }

    pub fn set_transparent(&self, transparent: bool) {
        self.transparent.set(transparent);
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<Rc<Texture>> {
        self.textures[slot.index()].borrow().clone()
    }

    /// Replaces the texture in `slot`, returning the previous one.
    ///
    /// The previous texture is not disposed; it is released when its last
    /// reference is dropped or when a teardown reaches it.
    pub fn set_texture(&self, slot: TextureSlot, texture: Option<Rc<Texture>>) -> Option<Rc<Texture>> {
        self.textures[slot.index()].replace(texture)
    }

    #[inline]
    pub fn map(&self) -> Option<Rc<Texture>> {
        self.texture(TextureSlot::Map)
    }

    #[inline]
    pub fn set_map(&self, texture: Rc<Texture>) -> Option<Rc<Texture>> {
        self.set_texture(TextureSlot::Map, Some(texture))
    }

    /// Every texture currently referenced, in slot order.
    pub fn textures(&self) -> Vec<Rc<Texture>> {
        TextureSlot::ALL
            .iter()
            .filter_map(|&slot| self.texture(slot))
            .collect()
    }
}

impl Disposable for Material {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        if let Some(gpu) = self.gpu.borrow_mut().take() {
            gpu.uniform.destroy();
        }
        true
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}
