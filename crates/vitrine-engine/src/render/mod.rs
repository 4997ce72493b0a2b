//! GPU rendering subsystem.
//!
//! A `Renderer` draws a `Scene` through a camera onto a surface. The surface
//! type is chosen by a `SurfaceKind`: `Windowed` renders into a window's
//! swapchain through `Gpu`, `Headless` takes `()` and is used where no GPU
//! exists.
//!
//! Convention:
//! - right-handed world space, Y up
//! - colors authored in sRGB, converted to linear before upload

mod composer;
mod ctx;
mod forward;

use anyhow::Result;

use crate::camera::PerspectiveCamera;
use crate::device::Gpu;
use crate::scene::Scene;

pub use composer::{Composer, Pass, RenderPass};
pub use ctx::{RenderCtx, RenderTarget};
pub use forward::ForwardRenderer;

/// Family of surfaces a renderer can draw onto.
pub trait SurfaceKind: 'static {
    type Surface<'s>;
}

/// Window swapchain surface.
pub enum Windowed {}

impl SurfaceKind for Windowed {
    type Surface<'s> = Gpu<'s>;
}

/// No surface at all.
pub enum Headless {}

impl SurfaceKind for Headless {
    type Surface<'s> = ();
}

pub type SurfaceOf<'s, K> = <K as SurfaceKind>::Surface<'s>;

pub trait Renderer {
    type Kind: SurfaceKind;

    fn render(
        &mut self,
        surface: &mut SurfaceOf<'_, Self::Kind>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<()>;

    /// Releases GPU objects owned by the renderer. Idempotent.
    fn dispose(&mut self);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    type Kind = R::Kind;

    fn render(
        &mut self,
        surface: &mut SurfaceOf<'_, Self::Kind>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<()> {
        (**self).render(surface, scene, camera)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}
