// --- File: renderer.rs ---
use std::error::Error;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use lifegrid::Grid;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

// --- Colours ---
const ALIVE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
const DEAD_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
// Anything outside the grid square.
const BACKGROUND_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

// --- GPU Data Structures ---

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GlobalUniforms {
    resolution: [f32; 2],
    grid_size: u32,
    words_per_row: u32,
    alive_color: [f32; 4],
    dead_color: [f32; 4],
    background_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FullscreenVertex {
    position: [f32; 2],
}

impl FullscreenVertex {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FullscreenVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
        }
    }
}

const FULLSCREEN_QUAD: [FullscreenVertex; 6] = [
    FullscreenVertex { position: [-1.0, -1.0] },
    FullscreenVertex { position: [1.0, -1.0] },
    FullscreenVertex { position: [-1.0, 1.0] },
    FullscreenVertex { position: [-1.0, 1.0] },
    FullscreenVertex { position: [1.0, -1.0] },
    FullscreenVertex { position: [1.0, 1.0] },
];

/// Number of `u32` words one packed grid row occupies.
fn words_per_row(grid_size: usize) -> usize {
    grid_size.div_ceil(32)
}

/// Packs `grid` into `out`, one bit per cell, rows padded to whole words.
fn pack_cells(grid: &Grid, out: &mut Vec<u32>) {
    let size = grid.size();
    let stride = words_per_row(size);
    out.clear();
    out.resize(size * stride, 0);
    for (row, col) in grid.alive_cells() {
        out[row * stride + col / 32] |= 1 << (col % 32);
    }
}

// --- Renderer ---
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    fullscreen_vertex_buffer: wgpu::Buffer,
    global_uniform_buffer: wgpu::Buffer,
    cell_storage_buffer: wgpu::Buffer,
    bind_group_globals: wgpu::BindGroup,
    bind_group_cells: wgpu::BindGroup,
    grid_size: usize,
    packed: Vec<u32>,
}

impl Renderer {
    /// Sets up the surface and pipeline for a fixed `grid_size`×`grid_size` grid.
    pub async fn new(window: Arc<Window>, grid_size: usize) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or("no suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Grid Shader Module"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // --- Create Buffers ---
        let fullscreen_vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Fullscreen Quad Vertex Buffer"),
                contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let global_uniforms = GlobalUniforms {
            resolution: [size.width as f32, size.height as f32],
            grid_size: grid_size as u32,
            words_per_row: words_per_row(grid_size) as u32,
            alive_color: ALIVE_COLOR.to_array(),
            dead_color: DEAD_COLOR.to_array(),
            background_color: BACKGROUND_COLOR.to_array(),
        };
        let global_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global Uniform Buffer"),
            contents: bytemuck::cast_slice(&[global_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Grid size never changes, so the storage buffer is sized once.
        let cell_words = (grid_size * words_per_row(grid_size)).max(1);
        let cell_storage_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Storage Buffer"),
            size: (cell_words * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // --- Bind Groups ---
        let bind_group_layout_globals =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Globals Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<GlobalUniforms>() as _,
                        ),
                    },
                    count: None,
                }],
            });

        let bind_group_layout_cells =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Cells Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group_globals = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &bind_group_layout_globals,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_uniform_buffer.as_entire_binding(),
            }],
        });

        let bind_group_cells = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cells Bind Group"),
            layout: &bind_group_layout_cells,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: cell_storage_buffer.as_entire_binding(),
            }],
        });

        // --- Render Pipeline ---
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Grid Render Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout_globals, &bind_group_layout_cells],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Grid Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[FullscreenVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            fullscreen_vertex_buffer,
            global_uniform_buffer,
            cell_storage_buffer,
            bind_group_globals,
            bind_group_cells,
            grid_size,
            packed: Vec::with_capacity(cell_words),
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let new_size = PhysicalSize::new(new_size.width.max(1), new_size.height.max(1));
        if new_size == self.size {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        // `resolution` sits at offset 0 of the uniforms.
        let resolution = [new_size.width as f32, new_size.height as f32];
        self.queue
            .write_buffer(&self.global_uniform_buffer, 0, bytemuck::cast_slice(&resolution));
        log::debug!("renderer resized to {}x{}", new_size.width, new_size.height);
    }

    /// Uploads `grid` and draws one frame.
    pub fn render(&mut self, grid: &Grid) -> Result<(), wgpu::SurfaceError> {
        debug_assert_eq!(grid.size(), self.grid_size);

        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        pack_cells(grid, &mut self.packed);
        if !self.packed.is_empty() {
            self.queue
                .write_buffer(&self.cell_storage_buffer, 0, bytemuck::cast_slice(&self.packed));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Grid Render Encoder"),
            });
        {
            let background = BACKGROUND_COLOR.as_dvec4();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Grid Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.x,
                            g: background.y,
                            b: background.z,
                            a: background.w,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_vertex_buffer(0, self.fullscreen_vertex_buffer.slice(..));
            render_pass.set_bind_group(0, &self.bind_group_globals, &[]);
            render_pass.set_bind_group(1, &self.bind_group_cells, &[]);
            render_pass.draw(0..FULLSCREEN_QUAD.len() as u32, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();
        Ok(())
    }
}

// --- End of File: renderer.rs ---
