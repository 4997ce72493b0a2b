use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Geometry, Material, Texture};

/// Process-unique identity of a GPU-backed resource.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceId(u64);

impl ResourceId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capability shared by every resource that holds GPU memory.
///
/// `dispose` releases the GPU side and returns `true`; calling it again is a
/// no-op returning `false`. CPU-side data is kept, so a disposed resource can
/// still be inspected.
pub trait Disposable {
    fn resource_id(&self) -> ResourceId;
    fn dispose(&self) -> bool;
    fn is_disposed(&self) -> bool;
}

/// Kind tag for reporting.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

/// A shared handle to any known resource kind.
#[derive(Debug, Clone)]
pub enum Resource {
    Geometry(Rc<Geometry>),
    Material(Rc<Material>),
    Texture(Rc<Texture>),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Geometry(_) => ResourceKind::Geometry,
            Resource::Material(_) => ResourceKind::Material,
            Resource::Texture(_) => ResourceKind::Texture,
        }
    }

    fn as_disposable(&self) -> &dyn Disposable {
        match self {
            Resource::Geometry(g) => g.as_ref(),
            Resource::Material(m) => m.as_ref(),
            Resource::Texture(t) => t.as_ref(),
        }
    }
}

impl Disposable for Resource {
    fn resource_id(&self) -> ResourceId {
        self.as_disposable().resource_id()
    }

    fn dispose(&self) -> bool {
        self.as_disposable().dispose()
    }

    fn is_disposed(&self) -> bool {
        self.as_disposable().is_disposed()
    }
}

impl From<Rc<Geometry>> for Resource {
    fn from(value: Rc<Geometry>) -> Self {
        Resource::Geometry(value)
    }
}

impl From<Rc<Material>> for Resource {
    fn from(value: Rc<Material>) -> Self {
        Resource::Material(value)
    }
}

impl From<Rc<Texture>> for Resource {
    fn from(value: Rc<Texture>) -> Self {
        Resource::Texture(value)
    }
}
