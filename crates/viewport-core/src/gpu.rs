//! wgpu render step shared by the web and native front-ends.

use crate::engine::{FrameView, RenderTarget};
use crate::error::{Result, ViewportError};
use crate::mesh::{LineVertex, MeshData, SceneMesh, Uniforms, Vertex};
use crate::scene::ViewportSize;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct IndexedBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    count: u32,
}

#[derive(Default)]
struct SceneBuffers {
    opaque: Option<IndexedBuffers>,
    translucent: Option<IndexedBuffers>,
    lines: Option<(wgpu::Buffer, u32)>,
}

pub struct GpuRenderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    buffers: SceneBuffers,
    uploaded_revision: Option<u64>,
}

impl<'w> GpuRenderer<'w> {
    /// Acquire adapter, device and surface. Any failure here means the host
    /// cannot render at all and is reported as `RenderContext`.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'w>>,
        size: ViewportSize,
    ) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(target)
            .map_err(|e| ViewportError::RenderContext(format!("create_surface: {e}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| ViewportError::RenderContext("no GPU adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| ViewportError::RenderContext(format!("request_device: {e:?}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| ViewportError::RenderContext("surface has no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width_px,
            height: size.height_px,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, size);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::SCENE_WGSL.into()),
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let mesh_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];
        let mesh_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &mesh_attrs,
        };
        let line_attrs = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32,
            2 => Float32x3,
            3 => Float32,
            4 => Float32x4
        ];
        let line_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &line_attrs,
        };

        let pipeline = |label, entries, buffers, cull_mode, depth_write| {
            make_pipeline(
                &device, &layout, &shader, format, label, entries, buffers, cull_mode, depth_write,
            )
        };
        let opaque_pipeline = pipeline(
            "opaque_pipeline",
            ("vs_main", "fs_main"),
            std::slice::from_ref(&mesh_layout),
            Some(wgpu::Face::Back),
            true,
        );
        // Panels are seen from both sides and must not hide what is behind.
        let translucent_pipeline = pipeline(
            "translucent_pipeline",
            ("vs_main", "fs_main"),
            std::slice::from_ref(&mesh_layout),
            None,
            false,
        );
        let line_pipeline = pipeline(
            "line_pipeline",
            ("vs_line", "fs_line"),
            std::slice::from_ref(&line_layout),
            None,
            false,
        );

        log::info!(
            "[gpu] ready: {:?} {}x{} backend={:?}",
            format,
            size.width_px,
            size.height_px,
            adapter.get_info().backend
        );
        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            uniform_buffer,
            bind_group,
            opaque_pipeline,
            translucent_pipeline,
            line_pipeline,
            buffers: SceneBuffers::default(),
            uploaded_revision: None,
        })
    }

    fn upload(&mut self, mesh: &SceneMesh) {
        let indexed = |label: &str, data: &MeshData| {
            if data.is_empty() {
                return None;
            }
            let vertex = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&data.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            Some(IndexedBuffers {
                vertex,
                index,
                count: data.indices.len() as u32,
            })
        };
        let opaque = indexed("opaque", &mesh.opaque);
        let translucent = indexed("translucent", &mesh.translucent);
        let lines = (!mesh.lines.is_empty()).then(|| {
            let vb = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("lines"),
                    contents: bytemuck::cast_slice(&mesh.lines),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            (vb, mesh.lines.len() as u32)
        });
        // Replacing the struct drops the previous revision's buffers.
        self.buffers = SceneBuffers {
            opaque,
            translucent,
            lines,
        };
        self.uploaded_revision = Some(mesh.revision);
        log::debug!("[gpu] uploaded scene rev={}", mesh.revision);
    }
}

impl RenderTarget for GpuRenderer<'_> {
    fn resize(&mut self, size: ViewportSize) {
        if size.width_px == self.config.width && size.height_px == self.config.height {
            return;
        }
        self.config.width = size.width_px;
        self.config.height = size.height_px;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, size);
    }

    fn render(&mut self, frame: &FrameView<'_>) -> anyhow::Result<()> {
        if self.uploaded_revision != Some(frame.scene.revision) {
            let mesh = SceneMesh::build(frame.scene);
            self.upload(&mesh);
        }
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("[gpu] surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(anyhow::anyhow!("surface error: {e:?}")),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = Uniforms {
            view_proj: frame.view_proj.to_cols_array_2d(),
            viewport: [
                frame.viewport.width_px as f32,
                frame.viewport.height_px as f32,
            ],
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let bg = frame.theme.background();
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x as f64,
                            g: bg.y as f64,
                            b: bg.z as f64,
                            a: bg.w as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);
            if let Some(b) = &self.buffers.opaque {
                rpass.set_pipeline(&self.opaque_pipeline);
                rpass.set_vertex_buffer(0, b.vertex.slice(..));
                rpass.set_index_buffer(b.index.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..b.count, 0, 0..1);
            }
            if let Some((vb, count)) = &self.buffers.lines {
                rpass.set_pipeline(&self.line_pipeline);
                rpass.set_vertex_buffer(0, vb.slice(..));
                rpass.draw(0..*count, 0..1);
            }
            if let Some(b) = &self.buffers.translucent {
                rpass.set_pipeline(&self.translucent_pipeline);
                rpass.set_vertex_buffer(0, b.vertex.slice(..));
                rpass.set_index_buffer(b.index.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..b.count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn make_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    label: &str,
    (vs_entry, fs_entry): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout],
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

fn create_depth_view(device: &wgpu::Device, size: ViewportSize) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: size.width_px,
            height: size.height_px,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
