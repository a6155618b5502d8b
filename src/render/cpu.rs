use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    foundation::{
        core::{Canvas, Frame, Rgba},
        error::{AccumError, AccumResult},
    },
    program::{
        generate::{FRAGMENT_ENTRY, ProgramSource},
        kernel::Kernel,
    },
    render::host::{DrawOptions, ProgramId, RenderHost, SurfaceId, Uniforms},
};

/// Environment override for the draw thread pool size.
pub const THREADS_ENV: &str = "WAVYTE_ACCUM_THREADS";

/// Reference host that keeps surfaces in memory and runs programs through their [`Kernel`].
///
/// Each draw is split into rows across a private rayon pool.
pub struct CpuHost {
    surfaces: HashMap<SurfaceId, Frame>,
    programs: HashMap<ProgramId, Kernel>,
    next_surface: u32,
    next_program: u32,
    pool: rayon::ThreadPool,
}

impl CpuHost {
    /// Pool size from `WAVYTE_ACCUM_THREADS` when set, rayon's default otherwise.
    pub fn new() -> AccumResult<Self> {
        let threads = match std::env::var(THREADS_ENV) {
            Ok(v) => Some(v.trim().parse::<usize>().map_err(|_| {
                AccumError::validation(format!("{THREADS_ENV} must be a positive integer, got '{v}'"))
            })?),
            Err(_) => None,
        };
        Self::with_threads(threads)
    }

    pub fn with_threads(threads: Option<usize>) -> AccumResult<Self> {
        Ok(Self {
            surfaces: HashMap::new(),
            programs: HashMap::new(),
            next_surface: 0,
            next_program: 0,
            pool: build_thread_pool(threads)?,
        })
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn surface(&self, id: SurfaceId, role: &str) -> AccumResult<&Frame> {
        self.surfaces.get(&id).ok_or_else(|| {
            AccumError::resource(format!("{role} surface {id:?} was not allocated"))
        })
    }

    fn draw(
        &self,
        kernel: Kernel,
        uniforms: &Uniforms,
        target: &mut Frame,
        opts: DrawOptions,
    ) -> AccumResult<()> {
        let source = self.surface(uniforms.source, "source")?;
        let previous = match (kernel.needs_previous(), uniforms.previous) {
            (true, Some(id)) => Some(self.surface(id, "previous")?),
            (true, None) => {
                return Err(AccumError::validation(
                    "composite program needs a previous surface",
                ));
            }
            (false, _) => None,
        };

        if opts.clear_target {
            target.pixels.fill([0.0; 4]);
        }

        let target_canvas = target.canvas();
        let width = target.width as usize;
        let opacity = uniforms.opacity;
        self.pool.install(|| {
            target
                .pixels
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, out) in row.iter_mut().enumerate() {
                        let (x, y) = (x as u32, y as u32);
                        let src = sample_nearest(source, target_canvas, x, y);
                        let dst = previous
                            .map(|p| sample_nearest(p, target_canvas, x, y))
                            .unwrap_or([0.0; 4]);
                        *out = kernel.apply(src, dst, opacity);
                    }
                });
        });
        Ok(())
    }
}

impl RenderHost for CpuHost {
    fn allocate_surface(&mut self, canvas: Canvas) -> AccumResult<SurfaceId> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let frame = Frame::try_filled(canvas, [0.0; 4])?;
        self.next_surface += 1;
        let id = SurfaceId(self.next_surface);
        self.surfaces.insert(id, frame);
        tracing::trace!(surface = id.0, width = canvas.width, height = canvas.height, "allocate");
        Ok(id)
    }

    fn resize_surface(&mut self, id: SurfaceId, canvas: Canvas) -> AccumResult<()> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let surface = self
            .surfaces
            .get_mut(&id)
            .ok_or_else(|| AccumError::resource(format!("resize of unknown surface {id:?}")))?;
        if surface.canvas() != canvas {
            *surface = Frame::try_filled(canvas, [0.0; 4])?;
        }
        Ok(())
    }

    fn release_surface(&mut self, id: SurfaceId) -> AccumResult<()> {
        self.surfaces
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AccumError::resource(format!("release of unknown surface {id:?}")))
    }

    fn surface_size(&self, id: SurfaceId) -> Option<Canvas> {
        self.surfaces.get(&id).map(Frame::canvas)
    }

    fn write_surface(&mut self, id: SurfaceId, frame: &Frame) -> AccumResult<()> {
        let surface = self
            .surfaces
            .get_mut(&id)
            .ok_or_else(|| AccumError::resource(format!("upload to unknown surface {id:?}")))?;
        if surface.canvas() != frame.canvas() || frame.pixels.len() != surface.pixels.len() {
            return Err(AccumError::validation(format!(
                "upload of {}x{} frame into {}x{} surface",
                frame.width, frame.height, surface.width, surface.height
            )));
        }
        surface.pixels.copy_from_slice(&frame.pixels);
        Ok(())
    }

    fn read_surface(&mut self, id: SurfaceId) -> AccumResult<Frame> {
        self.surface(id, "readback").cloned()
    }

    fn compile_program(&mut self, source: &ProgramSource) -> AccumResult<ProgramId> {
        if !source.wgsl.contains(&format!("fn {FRAGMENT_ENTRY}(")) {
            return Err(AccumError::compilation(format!(
                "program '{}' has no '{FRAGMENT_ENTRY}' entry point",
                source.label
            )));
        }
        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(id, source.kernel);
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
        let kernel = *self
            .programs
            .get(&program)
            .ok_or_else(|| AccumError::resource(format!("unknown program {program:?}")))?;

        let mut surface = self.surfaces.remove(&target).ok_or_else(|| {
            AccumError::resource(format!("draw target surface {target:?} was not allocated"))
        })?;
        let result = self.draw(kernel, uniforms, &mut surface, opts);
        self.surfaces.insert(target, surface);
        result
    }
}

/// Nearest texel of `frame` at the centre of target pixel `(x, y)`, in normalized coordinates.
fn sample_nearest(frame: &Frame, target: Canvas, x: u32, y: u32) -> Rgba {
    let u = (x as f32 + 0.5) / target.width as f32;
    let v = (y as f32 + 0.5) / target.height as f32;
    let sx = ((u * frame.width as f32).floor() as u32).min(frame.width - 1);
    let sy = ((v * frame.height as f32).floor() as u32).min(frame.height - 1);
    frame.pixels[(sy as usize) * (frame.width as usize) + sx as usize]
}

fn build_thread_pool(threads: Option<usize>) -> AccumResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AccumError::validation(
            "cpu host thread count must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("accum-cpu-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AccumError::resource(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
