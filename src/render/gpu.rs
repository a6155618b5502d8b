use std::collections::HashMap;

use crate::{
    foundation::{
        core::{Canvas, Frame, Rgba},
        error::{AccumError, AccumResult},
    },
    program::generate::{FRAGMENT_ENTRY, PARAMS_SIZE, ProgramSource, VERTEX_ENTRY},
    render::host::{DrawOptions, ProgramId, RenderHost, SurfaceId, Uniforms},
};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;
const BYTES_PER_PIXEL: u32 = 16;

struct GpuSurface {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    canvas: Canvas,
}

/// `wgpu` host: surfaces are `Rgba32Float` textures and programs are the generated WGSL.
pub struct GpuHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    params: wgpu::Buffer,
    surfaces: HashMap<SurfaceId, GpuSurface>,
    programs: HashMap<ProgramId, wgpu::RenderPipeline>,
    next_surface: u32,
    next_program: u32,
}

impl GpuHost {
    pub fn new() -> AccumResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                AccumError::resource("no gpu adapter available")
            }
            other => AccumError::resource(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("accumulator_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| AccumError::resource(format!("wgpu request_device failed: {e:?}")))?;

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("accumulator_bgl"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("accumulator_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("accumulator_params"),
            size: PARAMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::debug!(adapter = ?adapter.get_info().name, "gpu host ready");
        Ok(Self {
            device,
            queue,
            bind_group_layout,
            pipeline_layout,
            params,
            surfaces: HashMap::new(),
            programs: HashMap::new(),
            next_surface: 0,
            next_program: 0,
        })
    }

    fn surface(&self, id: SurfaceId, role: &str) -> AccumResult<&GpuSurface> {
        self.surfaces.get(&id).ok_or_else(|| {
            AccumError::resource(format!("{role} surface {id:?} was not allocated"))
        })
    }

    fn create_surface(&self, canvas: Canvas) -> AccumResult<GpuSurface> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let max = self.device.limits().max_texture_dimension_2d;
        if canvas.width > max || canvas.height > max {
            return Err(AccumError::resource(format!(
                "surface {}x{} exceeds the device limit of {max}",
                canvas.width, canvas.height
            )));
        }
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("accumulator_surface"),
            size: extent(canvas),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        let invalid = pollster::block_on(self.device.pop_error_scope());
        if let Some(err) = out_of_memory.or(invalid) {
            return Err(AccumError::resource(format!(
                "surface {}x{} could not be allocated: {err}",
                canvas.width, canvas.height
            )));
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(GpuSurface {
            texture,
            view,
            canvas,
        })
    }
}

impl RenderHost for GpuHost {
    fn allocate_surface(&mut self, canvas: Canvas) -> AccumResult<SurfaceId> {
        let surface = self.create_surface(canvas)?;
        self.next_surface += 1;
        let id = SurfaceId(self.next_surface);
        self.surfaces.insert(id, surface);
        Ok(id)
    }

    fn resize_surface(&mut self, id: SurfaceId, canvas: Canvas) -> AccumResult<()> {
        if self.surface(id, "resized")?.canvas == canvas {
            return Ok(());
        }
        let replacement = self.create_surface(canvas)?;
        if let Some(old) = self.surfaces.insert(id, replacement) {
            old.texture.destroy();
        }
        Ok(())
    }

    fn release_surface(&mut self, id: SurfaceId) -> AccumResult<()> {
        let surface = self
            .surfaces
            .remove(&id)
            .ok_or_else(|| AccumError::resource(format!("release of unknown surface {id:?}")))?;
        surface.texture.destroy();
        Ok(())
    }

    fn surface_size(&self, id: SurfaceId) -> Option<Canvas> {
        self.surfaces.get(&id).map(|s| s.canvas)
    }

    fn write_surface(&mut self, id: SurfaceId, frame: &Frame) -> AccumResult<()> {
        let surface = self.surface(id, "upload")?;
        if surface.canvas != frame.canvas() || frame.pixels.len() != frame.canvas().pixel_count() {
            return Err(AccumError::validation(format!(
                "upload of {}x{} frame into {}x{} surface",
                frame.width, frame.height, surface.canvas.width, surface.canvas.height
            )));
        }
        let bytes: Vec<u8> = frame
            .pixels
            .iter()
            .flat_map(|px| px.iter().flat_map(|c| c.to_le_bytes()))
            .collect();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &surface.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * BYTES_PER_PIXEL),
                rows_per_image: Some(frame.height),
            },
            extent(surface.canvas),
        );
        Ok(())
    }

    fn read_surface(&mut self, id: SurfaceId) -> AccumResult<Frame> {
        let surface = self.surface(id, "readback")?;
        let canvas = surface.canvas;
        let bytes_per_row = align_to(
            canvas
                .width
                .checked_mul(BYTES_PER_PIXEL)
                .ok_or_else(|| AccumError::resource("readback row size overflow"))?,
            wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        );
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("accumulator_readback"),
            size: u64::from(bytes_per_row) * u64::from(canvas.height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("accumulator_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &surface.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(canvas.height),
                },
            },
            extent(canvas),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| AccumError::resource(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| AccumError::resource("readback channel closed"))?
            .map_err(|e| AccumError::resource(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let row_bytes = (canvas.width * BYTES_PER_PIXEL) as usize;
        let mut pixels: Vec<Rgba> = Vec::with_capacity(canvas.pixel_count());
        for row in 0..canvas.height as usize {
            let start = row * bytes_per_row as usize;
            pixels.extend(mapped[start..start + row_bytes].chunks_exact(16).map(|px| {
                let c = |i: usize| f32::from_le_bytes([px[i], px[i + 1], px[i + 2], px[i + 3]]);
                [c(0), c(4), c(8), c(12)]
            }));
        }
        drop(mapped);
        readback.unmap();

        Frame::from_pixels(canvas, pixels)
    }

    fn compile_program(&mut self, source: &ProgramSource) -> AccumResult<ProgramId> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(source.label.as_str()),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.as_str().into()),
            });
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(source.label.as_str()),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(AccumError::compilation(format!(
                "program '{}' failed to compile: {err}",
                source.label
            )));
        }

        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(id, pipeline);
        Ok(id)
    }

    fn release_program(&mut self, id: ProgramId) -> AccumResult<()> {
        self.programs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AccumError::resource(format!("release of unknown program {id:?}")))
    }

    fn execute_program(
        &mut self,
        program: ProgramId,
        uniforms: &Uniforms,
        target: SurfaceId,
        opts: DrawOptions,
    ) -> AccumResult<()> {
        uniforms.check_target(target)?;
        let pipeline = self
            .programs
            .get(&program)
            .ok_or_else(|| AccumError::resource(format!("unknown program {program:?}")))?;
        let target = self.surface(target, "draw target")?;
        let source = self.surface(uniforms.source, "source")?;
        let previous = match uniforms.previous {
            Some(id) => self.surface(id, "previous")?,
            None => source,
        };

        let mut params = [0u8; PARAMS_SIZE as usize];
        params[0..4].copy_from_slice(&uniforms.opacity.to_le_bytes());
        params[8..12].copy_from_slice(&(target.canvas.width as f32).to_le_bytes());
        params[12..16].copy_from_slice(&(target.canvas.height as f32).to_le_bytes());
        self.queue.write_buffer(&self.params, 0, &params);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("accumulator_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&previous.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params.as_entire_binding(),
                },
            ],
        });

        let load = if opts.clear_target {
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
        } else {
            wgpu::LoadOp::Load
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("accumulator_draw_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("accumulator_draw_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(pipeline);
            rp.set_bind_group(0, &bind_group, &[]);
            rp.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }
}

fn extent(canvas: Canvas) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: canvas.width,
        height: canvas.height,
        depth_or_array_layers: 1,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
