use crate::{
    foundation::{
        core::{Canvas, Frame},
        error::{AccumError, AccumResult},
    },
    program::generate::ProgramSource,
};

/// Opaque handle to a host-owned surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

/// Opaque handle to a host-compiled program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Per-draw program inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub source: SurfaceId,
    /// Last accumulated result; `None` for programs that only read the source.
    pub previous: Option<SurfaceId>,
    pub opacity: f32,
}

impl Uniforms {
    /// Reject a draw that would read the surface it writes.
    pub fn check_target(&self, target: SurfaceId) -> AccumResult<()> {
        if self.source == target {
            return Err(AccumError::validation(format!(
                "draw target {target:?} is also the source"
            )));
        }
        if self.previous == Some(target) {
            return Err(AccumError::validation(format!(
                "draw target {target:?} is also the previous surface"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawOptions {
    /// Clear the target to transparent before drawing.
    pub clear_target: bool,
}

/// Services the accumulator consumes from the surrounding render engine.
///
/// A host owns all surfaces and compiled programs; callers only ever hold ids. Every failing
/// operation must leave the affected resource in its pre-failure state.
pub trait RenderHost {
    fn allocate_surface(&mut self, canvas: Canvas) -> AccumResult<SurfaceId>;

    /// Resize in place. Contents are undefined afterwards.
    fn resize_surface(&mut self, id: SurfaceId, canvas: Canvas) -> AccumResult<()>;

    fn release_surface(&mut self, id: SurfaceId) -> AccumResult<()>;

    fn surface_size(&self, id: SurfaceId) -> Option<Canvas>;

    /// Upload `frame`; its size must match the surface.
    fn write_surface(&mut self, id: SurfaceId, frame: &Frame) -> AccumResult<()>;

    fn read_surface(&mut self, id: SurfaceId) -> AccumResult<Frame>;

    fn compile_program(&mut self, source: &ProgramSource) -> AccumResult<ProgramId>;

    fn release_program(&mut self, id: ProgramId) -> AccumResult<()>;

    /// Run `program` once over every pixel of `target`.
    fn execute_program(
        &mut self,
        program: ProgramId,
        uniforms: &Uniforms,
        target: SurfaceId,
        opts: DrawOptions,
    ) -> AccumResult<()>;

    /// Allocate a surface sized to `frame` and upload it.
    fn create_surface_from(&mut self, frame: &Frame) -> AccumResult<SurfaceId> {
        let id = self.allocate_surface(frame.canvas())?;
        if let Err(e) = self.write_surface(id, frame) {
            let _ = self.release_surface(id);
            return Err(e);
        }
        Ok(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/host.rs"]
mod tests;
