use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use super::{RenderCtx, RenderTarget, Renderer, Windowed};
use crate::camera::PerspectiveCamera;
use crate::device::Gpu;
use crate::scene::{
    Disposable, DrawGroup, Material, MaterialGpu, Mesh, ResourceId, Scene, Texture, TextureFilter,
    TextureSlot, Topology, Vertex,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const NODE_UNIFORM_SIZE: u64 = std::mem::size_of::<NodeUniform>() as u64;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct NodeUniform {
    mvp: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct MaterialUniform {
    color: [f32; 4],
}

impl MaterialUniform {
    fn from_material(material: &Material) -> Self {
        let mut color = material.color().to_linear();
        color[3] *= material.opacity();
        Self { color }
    }
}

struct Layouts {
    shader: wgpu::ShaderModule,
    node_bgl: wgpu::BindGroupLayout,
    material_bgl: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

struct DepthTarget {
    size: (u32, u32),
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct NodeUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

struct Samplers {
    linear: wgpu::Sampler,
    nearest: wgpu::Sampler,
}

/// One mesh to draw this frame with its model-view-projection matrix.
struct DrawItem {
    mvp: Mat4,
    mesh: Mesh,
}

/// Minimal unlit forward renderer.
///
/// Draws every visible mesh once per frame: opaque materials first, then
/// transparent ones. Geometry, materials and textures upload on first use;
/// disposed resources are skipped.
#[derive(Default)]
pub struct ForwardRenderer {
    format: Option<wgpu::TextureFormat>,
    layouts: Option<Layouts>,
    pipelines: HashMap<(Topology, bool), wgpu::RenderPipeline>,
    samplers: Option<Samplers>,
    depth: Option<DepthTarget>,
    nodes: Option<NodeUniforms>,
    node_stride: u64,
    fallback: Option<Rc<Texture>>,
    disposed: bool,
}

impl ForwardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the scene into `target`. The caller owns frame acquisition and submission.
    pub fn encode(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        self.ensure_layouts(ctx);
        self.ensure_depth(ctx);
        self.ensure_samplers(ctx);

        let view_projection = camera.view_projection();
        let mut draws = Vec::new();
        scene.root.walk_visible(Mat4::IDENTITY, &mut |node, world| {
            if let Some(mesh) = node.mesh_ref() {
                draws.push(DrawItem {
                    mvp: view_projection * world,
                    mesh: mesh.clone(),
                });
            }
        });

        draws.retain(|d| d.mesh.geometry.ensure_uploaded(ctx.device, ctx.queue));
        for draw in &draws {
            for material in draw.mesh.material.iter() {
                self.prepare_material(ctx, material);
            }
        }

        self.write_node_uniforms(ctx, &draws);

        let (Some(depth), Some(nodes)) = (self.depth.as_ref(), self.nodes.as_ref()) else {
            return;
        };

        let [r, g, b, a] = scene.background.to_linear();
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrine forward pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        // Opaque first so transparent surfaces blend over finished depth.
        for transparent in [false, true] {
            for (i, draw) in draws.iter().enumerate() {
                let offset = (i as u64 * self.node_stride) as u32;
                rpass.set_bind_group(0, &nodes.bind_group, &[offset]);
                self.draw_mesh(&mut rpass, &draw.mesh, transparent);
            }
        }
    }

    fn draw_mesh(&self, rpass: &mut wgpu::RenderPass<'_>, mesh: &Mesh, transparent: bool) {
        let geometry = &mesh.geometry;
        let total = geometry.element_count();
        let full = [DrawGroup {
            start: 0,
            count: total,
            material_index: 0,
        }];
        let groups = if geometry.groups().is_empty() {
            &full[..]
        } else {
            geometry.groups()
        };

        geometry.with_gpu(|gpu| {
            rpass.set_vertex_buffer(0, gpu.vertex.slice(..));
            if let Some(index) = &gpu.index {
                rpass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
            }

            for group in groups {
                let Some(material) = mesh.material.get(group.material_index) else { continue };
                if material.is_disposed() || material.is_transparent() != transparent {
                    continue;
                }
                let Some(pipeline) = self.pipelines.get(&(geometry.topology(), transparent)) else {
                    continue;
                };
                let bound = material.gpu.borrow();
                let Some(material_gpu) = bound.as_ref() else { continue };

                let end = (group.start + group.count).min(total);
                if group.start >= end {
                    continue;
                }

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &material_gpu.bind_group, &[]);
                if gpu.index.is_some() {
                    rpass.draw_indexed(group.start..end, 0, 0..1);
                } else {
                    rpass.draw(group.start..end, 0..1);
                }
            }
        });
    }

    /// Layouts are created once; pipelines follow the surface format.
    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.layouts.is_none() {
            self.create_layouts(ctx);
        }
        if self.format == Some(ctx.surface_format) {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };

        self.pipelines.clear();
        for topology in [Topology::Triangles, Topology::Lines, Topology::Points] {
            for transparent in [false, true] {
                let pipeline = create_pipeline(ctx, layouts, topology, transparent);
                self.pipelines.insert((topology, transparent), pipeline);
            }
        }
        self.format = Some(ctx.surface_format);
    }

    fn create_layouts(&mut self, ctx: &RenderCtx<'_>) {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vitrine mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let node_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vitrine node bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(NODE_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let material_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vitrine material bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<MaterialUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vitrine mesh pipeline layout"),
            bind_group_layouts: &[&node_bgl, &material_bgl],
            immediate_size: 0,
        });

        self.layouts = Some(Layouts {
            shader,
            node_bgl,
            material_bgl,
            pipeline_layout,
        });

        let align = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        self.node_stride = NODE_UNIFORM_SIZE.div_ceil(align) * align;
    }

    fn ensure_depth(&mut self, ctx: &RenderCtx<'_>) {
        let size = (ctx.size.0.max(1), ctx.size.1.max(1));
        if self.depth.as_ref().is_some_and(|d| d.size == size) {
            return;
        }
        if let Some(old) = self.depth.take() {
            old.texture.destroy();
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("vitrine depth"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("depth target resized to {}x{}", size.0, size.1);
        self.depth = Some(DepthTarget { size, texture, view });
    }

    fn ensure_samplers(&mut self, ctx: &RenderCtx<'_>) {
        if self.samplers.is_some() {
            return;
        }
        let sampler = |filter: wgpu::FilterMode, label| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        };
        self.samplers = Some(Samplers {
            linear: sampler(wgpu::FilterMode::Linear, "vitrine linear sampler"),
            nearest: sampler(wgpu::FilterMode::Nearest, "vitrine nearest sampler"),
        });
    }

    /// Uploads textures, writes the color uniform, and rebuilds the bind group
    /// when the bound textures changed.
    fn prepare_material(&mut self, ctx: &RenderCtx<'_>, material: &Material) {
        if material.is_disposed() {
            return;
        }
        let fallback = Rc::clone(
            self.fallback
                .get_or_insert_with(|| Texture::solid("vitrine fallback white", [255; 4]).shared()),
        );
        fallback.ensure_uploaded(ctx.device, ctx.queue);

        let slots = TextureSlot::ALL.map(|slot| {
            material
                .texture(slot)
                .filter(|t| t.ensure_uploaded(ctx.device, ctx.queue))
        });
        let ids: [Option<ResourceId>; 2] =
            [slots[0].as_ref().map(|t| t.resource_id()), slots[1].as_ref().map(|t| t.resource_id())];
        let uniform = MaterialUniform::from_material(material);

        let mut slot = material.gpu.borrow_mut();
        if let Some(gpu) = slot.as_ref().filter(|g| g.bound == ids) {
            ctx.queue.write_buffer(&gpu.uniform, 0, bytemuck::bytes_of(&uniform));
            return;
        }

        let (Some(layouts), Some(samplers)) = (self.layouts.as_ref(), self.samplers.as_ref()) else {
            return;
        };

        let buffer = match slot.take() {
            Some(old) => old.uniform,
            None => ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(material.label()),
                size: std::mem::size_of::<MaterialUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        };
        ctx.queue.write_buffer(&buffer, 0, bytemuck::bytes_of(&uniform));

        let [map, alpha] = slots;
        let map = map.unwrap_or_else(|| Rc::clone(&fallback));
        let alpha = alpha.unwrap_or(fallback);
        let sampler = match map.filter() {
            TextureFilter::Linear => &samplers.linear,
            TextureFilter::Nearest => &samplers.nearest,
        };

        let bind_group = map
            .with_gpu(|m| {
                alpha.with_gpu(|a| {
                    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some(material.label()),
                        layout: &layouts.material_bgl,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: buffer.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(&m.view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::TextureView(&a.view),
                            },
                            wgpu::BindGroupEntry {
                                binding: 3,
                                resource: wgpu::BindingResource::Sampler(sampler),
                            },
                        ],
                    })
                })
            })
            .flatten();

        match bind_group {
            Some(bind_group) => {
                *slot = Some(MaterialGpu {
                    uniform: buffer,
                    bind_group,
                    bound: ids,
                });
            }
            None => buffer.destroy(),
        }
    }

    fn write_node_uniforms(&mut self, ctx: &RenderCtx<'_>, draws: &[DrawItem]) {
        if draws.is_empty() {
            return;
        }
        let Some(layouts) = self.layouts.as_ref() else { return };

        if self.nodes.as_ref().is_none_or(|n| n.capacity < draws.len()) {
            let capacity = draws.len().next_power_of_two().max(64);
            if let Some(old) = self.nodes.take() {
                old.buffer.destroy();
            }
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vitrine node ubo"),
                size: capacity as u64 * self.node_stride,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("vitrine node bind group"),
                layout: &layouts.node_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(NODE_UNIFORM_SIZE),
                    }),
                }],
            });
            self.nodes = Some(NodeUniforms {
                buffer,
                bind_group,
                capacity,
            });
        }

        let Some(nodes) = self.nodes.as_ref() else { return };
        let stride = self.node_stride as usize;
        let mut bytes = vec![0u8; draws.len() * stride];
        for (i, draw) in draws.iter().enumerate() {
            let uniform = NodeUniform {
                mvp: draw.mvp.to_cols_array_2d(),
            };
            bytes[i * stride..i * stride + NODE_UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        ctx.queue.write_buffer(&nodes.buffer, 0, &bytes);
    }
}

fn create_pipeline(
    ctx: &RenderCtx<'_>,
    layouts: &Layouts,
    topology: Topology,
    transparent: bool,
) -> wgpu::RenderPipeline {
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("vitrine mesh pipeline"),
        layout: Some(&layouts.pipeline_layout),

        vertex: wgpu::VertexState {
            module: &layouts.shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &layouts.shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(if transparent {
                    wgpu::BlendState::ALPHA_BLENDING
                } else {
                    wgpu::BlendState::REPLACE
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: topology.to_wgpu(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: !transparent,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

impl Renderer for ForwardRenderer {
    type Kind = Windowed;

    fn render(
        &mut self,
        gpu: &mut Gpu<'_>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<()> {
        anyhow::ensure!(!self.disposed, "renderer used after dispose");

        let Some(mut frame) = gpu.begin_frame()? else {
            return Ok(());
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let ctx = gpu.render_ctx();
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            self.encode(&ctx, &mut target, scene, camera);
        }

        gpu.submit(frame);
        Ok(())
    }

    fn dispose(&mut self) {
        if std::mem::replace(&mut self.disposed, true) {
            return;
        }
        if let Some(depth) = self.depth.take() {
            depth.texture.destroy();
        }
        if let Some(nodes) = self.nodes.take() {
            nodes.buffer.destroy();
        }
        if let Some(fallback) = self.fallback.take() {
            fallback.dispose();
        }
        self.pipelines.clear();
        self.samplers = None;
        self.layouts = None;
        log::debug!("forward renderer disposed");
    }
}
