use anyhow::{Context, Result};

use super::{Renderer, SurfaceKind, SurfaceOf};
use crate::camera::PerspectiveCamera;
use crate::scene::Scene;

/// One stage of a `Composer`.
pub trait Pass<K: SurfaceKind> {
    fn name(&self) -> &str;

    fn run(
        &mut self,
        surface: &mut SurfaceOf<'_, K>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<()>;

    fn dispose(&mut self);
}

/// Pass that draws the scene with a wrapped renderer.
pub struct RenderPass<R> {
    renderer: R,
}

impl<R: Renderer> RenderPass<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

impl<R: Renderer> Pass<R::Kind> for RenderPass<R> {
    fn name(&self) -> &str {
        "render"
    }

    fn run(
        &mut self,
        surface: &mut SurfaceOf<'_, R::Kind>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<()> {
        self.renderer.render(surface, scene, camera)
    }

    fn dispose(&mut self) {
        self.renderer.dispose();
    }
}

/// Ordered list of passes, itself usable as a renderer.
pub struct Composer<K: SurfaceKind> {
    passes: Vec<Box<dyn Pass<K>>>,
    disposed: bool,
}

impl<K: SurfaceKind> Composer<K> {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            disposed: false,
        }
    }

    pub fn with_pass(mut self, pass: impl Pass<K> + 'static) -> Self {
        self.add_pass(pass);
        self
    }

    pub fn add_pass(&mut self, pass: impl Pass<K> + 'static) {
        self.passes.push(Box::new(pass));
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl<K: SurfaceKind> Default for Composer<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SurfaceKind> Renderer for Composer<K> {
    type Kind = K;

    fn render(
        &mut self,
        surface: &mut SurfaceOf<'_, K>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<()> {
        anyhow::ensure!(!self.disposed, "composer used after dispose");
        for pass in &mut self.passes {
            pass.run(surface, scene, camera)
                .with_context(|| format!("pass '{}' failed", pass.name()))?;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if std::mem::replace(&mut self.disposed, true) {
            return;
        }
        for pass in &mut self.passes {
            pass.dispose();
        }
        log::debug!("composer disposed {} passes", self.passes.len());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::render::Headless;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recording {
        name: &'static str,
        log: Log,
        fail: bool,
    }

    impl Renderer for Recording {
        type Kind = Headless;

        fn render(&mut self, _: &mut (), _: &Scene, _: &PerspectiveCamera) -> Result<()> {
            self.log.borrow_mut().push(format!("render {}", self.name));
            anyhow::ensure!(!self.fail, "{} broke", self.name);
            Ok(())
        }

        fn dispose(&mut self) {
            self.log.borrow_mut().push(format!("dispose {}", self.name));
        }
    }

    fn recording(name: &'static str, log: &Log, fail: bool) -> RenderPass<Recording> {
        RenderPass::new(Recording {
            name,
            log: Rc::clone(log),
            fail,
        })
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(50.0, 1.0, 1.0, 100.0)
    }

    #[test]
    fn passes_run_in_order() {
        let log = Log::default();
        let mut composer = Composer::<Headless>::new()
            .with_pass(recording("a", &log, false))
            .with_pass(recording("b", &log, false));

        composer.render(&mut (), &Scene::new(), &camera()).unwrap();
        assert_eq!(*log.borrow(), ["render a", "render b"]);
    }

    #[test]
    fn failing_pass_stops_the_chain() {
        let log = Log::default();
        let mut composer = Composer::<Headless>::new()
            .with_pass(recording("a", &log, true))
            .with_pass(recording("b", &log, false));

        let err = composer.render(&mut (), &Scene::new(), &camera()).unwrap_err();
        assert!(format!("{err:#}").contains("a broke"));
        assert_eq!(*log.borrow(), ["render a"]);
    }

    #[test]
    fn dispose_reaches_every_pass_once() {
        let log = Log::default();
        let mut composer = Composer::<Headless>::new()
            .with_pass(recording("a", &log, false))
            .with_pass(recording("b", &log, false));

        composer.dispose();
        composer.dispose();
        assert_eq!(*log.borrow(), ["dispose a", "dispose b"]);
        assert!(composer.render(&mut (), &Scene::new(), &camera()).is_err());
    }
}
