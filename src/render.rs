use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::{Mat4, Vec3};
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::model::{Mesh, Model};
use crate::vertex::{Vertex, VertexAttribute};

/// Camera state consumed by the renderer's uniform buffer.
///
/// Both matrices are uploaded column-major exactly as produced by the
/// transform module.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

/// GPU renderer backed by wgpu that draws the currently uploaded model.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    meshes: Vec<MeshBuffers>,
}

impl Renderer {
    /// Initializes the GPU renderer for the provided window.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = unsafe { instance.create_surface(window.as_ref())? };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| {
                    matches!(
                        mode,
                        wgpu::PresentMode::Mailbox | wgpu::PresentMode::Immediate
                    )
                })
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("renderer-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<GlobalUniform>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("renderer-pipeline-layout"),
            bind_group_layouts: &[&global_layout],
            push_constant_ranges: &[],
        });

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let attributes = vertex_attributes();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("renderer-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        });

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            pipeline,
            global_buffer,
            global_bind_group,
            meshes: Vec::new(),
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Creates GPU buffers for every mesh of the model.
    ///
    /// Buffers from a previous upload are dropped here, which releases them
    /// while the device is still alive.
    pub fn upload_model(&mut self, model: &Model) {
        self.meshes = model
            .meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| MeshBuffers::from_mesh(&self.device, mesh, &format!("mesh-{index}")))
            .collect();
    }

    /// Writes the camera matrices into the global uniform buffer.
    pub fn update_globals(&self, camera: &CameraParams) {
        let uniform = GlobalUniform {
            view: camera.view.to_cols_array_2d(),
            projection: camera.projection.to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).into(),
        };
        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&uniform));
    }

    /// Draws every uploaded mesh in a single depth-tested pass.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("main-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.03,
                        g: 0.03,
                        b: 0.05,
                        a: 1.0,
                    }),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.global_bind_group, &[]);

        for mesh in &self.meshes {
            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            match &mesh.index {
                Some(index) => {
                    pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
                None => pass.draw(0..mesh.vertex_count, 0..1),
            }
        }

        drop(pass); // explicit to satisfy lifetimes on some backends
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Vertex buffer attributes generated from the fixed slot contract.
///
/// Offsets accumulate in slot order, which matches the field order of
/// [`Vertex`], so the table stays in sync with the record by construction.
fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
    let mut offset = 0u64;
    VertexAttribute::ALL
        .iter()
        .map(|attribute| {
            let format = match attribute.component_count() {
                2 => wgpu::VertexFormat::Float32x2,
                _ => wgpu::VertexFormat::Float32x3,
            };
            let entry = wgpu::VertexAttribute {
                format,
                offset,
                shader_location: attribute.shader_slot(),
            };
            offset += (attribute.component_count() * std::mem::size_of::<f32>()) as u64;
            entry
        })
        .collect()
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: Option<wgpu::Buffer>,
    vertex_count: u32,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = (!mesh.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}-indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        Self {
            vertex,
            index,
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlobalUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    camera_position: [f32; 4],
}

// Shader input locations 0-2 consume the first three slots of the fixed
// attribute contract (0 position, 1 normal, 2 texcoord, 3 tangent,
// 4 bitangent). The buffer carries all five.
const SHADER: &str = r#"
struct GlobalUniform {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    camera_position: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = vec4<f32>(input.position, 1.0);
    out.position = globals.projection * globals.view * world_position;
    out.world_pos = world_position.xyz;
    out.normal = input.normal;
    out.tex_coords = input.tex_coords;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    // Headlight: the light rides on the camera.
    let light_dir = normalize(globals.camera_position.xyz - input.world_pos);
    let normal = normalize(input.normal);
    let diffuse = max(dot(normal, light_dir), 0.0);
    let ambient = 0.15;
    let base_color = vec3<f32>(0.78, 0.80, 0.85);
    return vec4<f32>((ambient + diffuse) * base_color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_table_matches_the_slot_contract() {
        let attributes = vertex_attributes();
        let slots: Vec<u32> = attributes.iter().map(|a| a.shader_location).collect();
        let offsets: Vec<u64> = attributes.iter().map(|a| a.offset).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
        assert_eq!(offsets, vec![0, 12, 24, 32, 44]);
        assert_eq!(attributes[2].format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn attribute_table_covers_the_whole_vertex() {
        let last = vertex_attributes().last().copied().unwrap();
        let end = last.offset + 3 * std::mem::size_of::<f32>() as u64;
        assert_eq!(end, std::mem::size_of::<Vertex>() as u64);
    }
}
