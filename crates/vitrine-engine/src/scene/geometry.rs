use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::resource::{Disposable, ResourceId};

/// Interleaved vertex as stored on the CPU and uploaded verbatim.
///
/// `color` is a per-vertex sRGB tint multiplied with the material color
/// (white for ordinary meshes; used by the grid/axes helpers).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    pub const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2, // uv
        2 => Float32x3  // color
    ];

    #[inline]
    pub const fn new(position: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, uv, color: [1.0, 1.0, 1.0] }
    }

    #[inline]
    pub const fn colored(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, uv: [0.0, 0.0], color }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Primitive assembly for a geometry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
    Points,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::Points => wgpu::PrimitiveTopology::PointList,
        }
    }
}

/// Range of elements drawn with one entry of a multi-material slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: usize,
}

#[derive(Debug)]
pub(crate) struct GeometryGpu {
    pub vertex: wgpu::Buffer,
    pub index: Option<wgpu::Buffer>,
    pub count: u32,
}

/// CPU vertex data plus its lazily uploaded GPU buffers.
///
/// Vertices can be rewritten in place with `update_vertices`; the vertex count
/// is fixed at construction.
#[derive(Debug)]
pub struct Geometry {
    id: ResourceId,
    label: String,
    topology: Topology,
    vertices: RefCell<Vec<Vertex>>,
    indices: Option<Vec<u32>>,
    groups: Vec<DrawGroup>,

    gpu: RefCell<Option<GeometryGpu>>,
    /// Vertices changed since the last upload.
    dirty: Cell<bool>,
    disposed: Cell<bool>,
}

impl Geometry {
    pub fn new(
        label: impl Into<String>,
        topology: Topology,
        vertices: Vec<Vertex>,
        indices: Option<Vec<u32>>,
    ) -> Self {
        Self {
            id: ResourceId::next(),
            label: label.into(),
            topology,
            vertices: RefCell::new(vertices),
            indices,
            groups: Vec::new(),
            gpu: RefCell::new(None),
            dirty: Cell::new(false),
            disposed: Cell::new(false),
        }
    }

    /// Splits the element range into groups for a multi-material mesh.
    pub fn with_groups(mut self, groups: Vec<DrawGroup>) -> Self {
        self.groups = groups;
        self
    }

    #[inline]
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertices(&self) -> Ref<'_, [Vertex]> {
        Ref::map(self.vertices.borrow(), Vec::as_slice)
    }

    /// Rewrites vertices in place. An uploaded buffer is refreshed before the
    /// next draw; a disposed geometry ignores the update.
    pub fn update_vertices(&self, f: impl FnOnce(&mut [Vertex])) {
        if self.disposed.get() {
            return;
        }
        f(&mut self.vertices.borrow_mut());
        self.dirty.set(true);
    }

    /// Whether `update_vertices` ran since the last upload.
    pub fn needs_refresh(&self) -> bool {
        self.dirty.get()
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn groups(&self) -> &[DrawGroup] {
        &self.groups
    }

    /// Number of elements drawn: indices when indexed, vertices otherwise.
    pub fn element_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertices.borrow().len() as u32,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.borrow().is_some()
    }

    /// Uploads vertex/index buffers if needed, or rewrites the vertex buffer
    /// after `update_vertices`.
    ///
    /// Returns `false` for disposed or empty geometry; nothing is drawn for it.
    pub(crate) fn ensure_uploaded(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let vertices = self.vertices.borrow();
        if self.disposed.get() || vertices.is_empty() {
            return false;
        }
        if let Some(gpu) = self.gpu.borrow().as_ref() {
            if self.dirty.replace(false) {
                queue.write_buffer(&gpu.vertex, 0, bytemuck::cast_slice(&vertices));
            }
            return true;
        }

        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&self.label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index = self.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&self.label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        log::trace!("uploaded geometry '{}' ({} vertices)", self.label, vertices.len());
        self.dirty.set(false);

        *self.gpu.borrow_mut() = Some(GeometryGpu {
            vertex,
            index,
            count: self.element_count(),
        });
        true
    }

    pub(crate) fn with_gpu<R>(&self, f: impl FnOnce(&GeometryGpu) -> R) -> Option<R> {
        self.gpu.borrow().as_ref().map(f)
    }
}

impl Disposable for Geometry {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        if let Some(gpu) = self.gpu.borrow_mut().take() {
            gpu.vertex.destroy();
            if let Some(index) = gpu.index {
                index.destroy();
            }
        }
        true
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Geometry {
        Geometry::new(
            "tri",
            Topology::Triangles,
            vec![
                Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0]),
            ],
            None,
        )
    }

    // ── vertex updates ───────────────────────────────────────────────────

    #[test]
    fn update_rewrites_in_place_and_flags_refresh() {
        let geo = triangle();
        assert!(!geo.needs_refresh());

        geo.update_vertices(|v| v[1].position[1] = 2.0);

        assert!(geo.needs_refresh());
        assert_eq!(geo.vertices()[1].position, [1.0, 2.0, 0.0]);
        assert_eq!(geo.element_count(), 3);
    }

    #[test]
    fn disposed_geometry_ignores_updates() {
        let geo = triangle();
        assert!(geo.dispose());
        geo.update_vertices(|v| v[0].position = [9.0; 3]);
        assert!(!geo.needs_refresh());
        assert_eq!(geo.vertices()[0].position, [0.0; 3]);
        assert!(!geo.dispose());
    }
}
