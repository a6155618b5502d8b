use crate::{
    accumulator::inputs::AccumulatorInputs,
    blend::mode::BlendMode,
    foundation::{
        core::Canvas,
        error::{AccumError, AccumResult},
    },
    program::generate::{CompositeProgram, passthrough_source},
    render::{
        host::{DrawOptions, ProgramId, RenderHost, SurfaceId, Uniforms},
        pingpong::PingPong,
    },
};

/// Resources held between `initialize` and `destroy`.
#[derive(Debug)]
struct Live {
    buffers: PingPong,
    composite: CompositeProgram,
    passthrough: ProgramId,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Ready(Live),
    Destroyed,
}

/// Temporal feedback stage: folds each incoming frame onto the result of all previous frames.
///
/// Lifecycle: [`Accumulator::initialize`] once, then any number of [`Accumulator::set_inputs`],
/// [`Accumulator::resize`] and [`Accumulator::draw_frame`] calls, then [`Accumulator::destroy`].
/// Out-of-order calls return [`AccumError::Lifecycle`] and change nothing. Inputs may be set
/// before initialization; they take effect when the stage is initialized.
#[derive(Debug)]
pub struct Accumulator {
    state: State,
    inputs: AccumulatorInputs,
    frames_drawn: u64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
            inputs: AccumulatorInputs::default(),
            frames_drawn: 0,
        }
    }

    pub fn inputs(&self) -> &AccumulatorInputs {
        &self.inputs
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// The surface holding the latest result.
    pub fn output(&self) -> Option<SurfaceId> {
        self.live().map(|l| l.buffers.current())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.live().map(|l| l.buffers.current_index())
    }

    pub fn canvas(&self) -> Option<Canvas> {
        self.live().map(|l| l.buffers.canvas())
    }

    /// Mode the compiled composite program was generated for.
    pub fn active_mode(&self) -> Option<BlendMode> {
        self.live().map(|l| l.composite.mode)
    }

    fn live(&self) -> Option<&Live> {
        match &self.state {
            State::Ready(live) => Some(live),
            _ => None,
        }
    }

    fn live_mut(&mut self, op: &str) -> AccumResult<&mut Live> {
        match &mut self.state {
            State::Ready(live) => Ok(live),
            State::Uninitialized => Err(AccumError::lifecycle(format!(
                "{op} called before initialize"
            ))),
            State::Destroyed => Err(AccumError::lifecycle(format!("{op} called after destroy"))),
        }
    }

    fn ensure_uninitialized(&self) -> AccumResult<()> {
        match self.state {
            State::Uninitialized => Ok(()),
            State::Ready(_) => Err(AccumError::lifecycle("accumulator is already initialized")),
            State::Destroyed => Err(AccumError::lifecycle("initialize called after destroy")),
        }
    }

    /// Allocate a primary surface of `width` x `height` and initialize around it.
    #[tracing::instrument(skip(self, host))]
    pub fn initialize<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        width: u32,
        height: u32,
    ) -> AccumResult<()> {
        self.ensure_uninitialized()?;
        let canvas = Canvas::new(width, height)?;
        let primary = host.allocate_surface(canvas)?;
        if let Err(e) = self.initialize_with(host, primary) {
            if let Err(release) = host.release_surface(primary) {
                tracing::warn!(error = %release, "failed to release primary surface");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Initialize with a host-supplied primary surface, which becomes buffer 0.
    ///
    /// The partner surface is allocated at the primary's size and both programs are compiled.
    /// On failure nothing allocated here is kept and `primary` is left to the caller.
    pub fn initialize_with<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        primary: SurfaceId,
    ) -> AccumResult<()> {
        self.ensure_uninitialized()?;
        let canvas = host.surface_size(primary).ok_or_else(|| {
            AccumError::resource(format!("primary surface {primary:?} is not allocated"))
        })?;

        let passthrough = host.compile_program(&passthrough_source())?;
        let composite = match CompositeProgram::build(host, self.inputs.blend_mode) {
            Ok(p) => p,
            Err(e) => {
                release_program(host, passthrough);
                return Err(e);
            }
        };
        let buffers = match PingPong::new(host, primary, canvas) {
            Ok(b) => b,
            Err(e) => {
                release_program(host, passthrough);
                release_program(host, composite.id);
                return Err(e);
            }
        };

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            mode = composite.mode.id(),
            "accumulator initialized"
        );
        self.state = State::Ready(Live {
            buffers,
            composite,
            passthrough,
        });
        self.frames_drawn = 0;
        Ok(())
    }

    /// Apply new inputs.
    ///
    /// A blend mode change regenerates the composite program before returning; the same mode
    /// reuses it. If regeneration fails the previous program and previous inputs stay active.
    #[tracing::instrument(skip_all, fields(mode = inputs.blend_mode.id()))]
    pub fn set_inputs<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        inputs: AccumulatorInputs,
    ) -> AccumResult<()> {
        if matches!(self.state, State::Destroyed) {
            return Err(AccumError::lifecycle("set_inputs called after destroy"));
        }
        let inputs = inputs.validated()?;
        match &mut self.state {
            State::Destroyed | State::Uninitialized => {}
            State::Ready(live) => {
                if live.composite.mode != inputs.blend_mode {
                    let fresh = CompositeProgram::build(host, inputs.blend_mode)?;
                    let stale = std::mem::replace(&mut live.composite, fresh);
                    release_program(host, stale.id);
                    tracing::debug!(
                        from = stale.mode.id(),
                        to = fresh.mode.id(),
                        "composite program regenerated"
                    );
                }
            }
        }
        self.inputs = inputs;
        Ok(())
    }

    /// Resize both buffers. Accumulated contents are undefined afterwards.
    #[tracing::instrument(skip(self, host))]
    pub fn resize<H: RenderHost + ?Sized>(
        &mut self,
        host: &mut H,
        width: u32,
        height: u32,
    ) -> AccumResult<()> {
        let canvas = Canvas::new(width, height)?;
        let live = self.live_mut("resize")?;
        live.buffers.resize(host, canvas)
    }

    /// Draw one frame and return the surface holding the new result.
    ///
    /// With `clear` set the source is copied as-is; otherwise it is blended over the previous
    /// result. If the draw fails the buffers are swapped back, so [`Accumulator::output`] still
    /// names the last good result.
    pub fn draw_frame<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> AccumResult<SurfaceId> {
        let AccumulatorInputs {
            source,
            clear,
            opacity,
            ..
        } = self.inputs;
        let live = self.live_mut("draw_frame")?;
        let source =
            source.ok_or_else(|| AccumError::validation("draw_frame needs a source surface"))?;

        let swap = live.buffers.advance();
        let (program, previous) = if clear {
            (live.passthrough, None)
        } else {
            (live.composite.id, Some(swap.previous))
        };
        let uniforms = Uniforms {
            source,
            previous,
            opacity,
        };
        if let Err(e) = host.execute_program(program, &uniforms, swap.next, DrawOptions::default())
        {
            live.buffers.advance();
            return Err(e);
        }

        self.frames_drawn += 1;
        tracing::trace!(frame = self.frames_drawn, clear, target = swap.next.0, "frame drawn");
        Ok(swap.next)
    }

    /// Release both buffers and both programs.
    ///
    /// Every release is attempted; the stage ends destroyed even if one fails, and the first
    /// failure is returned.
    #[tracing::instrument(skip_all)]
    pub fn destroy<H: RenderHost + ?Sized>(&mut self, host: &mut H) -> AccumResult<()> {
        match std::mem::replace(&mut self.state, State::Destroyed) {
            State::Destroyed => Err(AccumError::lifecycle("accumulator is already destroyed")),
            State::Uninitialized => Ok(()),
            State::Ready(live) => {
                let buffers = live.buffers.teardown(host);
                let composite = host.release_program(live.composite.id);
                let passthrough = host.release_program(live.passthrough);
                tracing::debug!(frames = self.frames_drawn, "accumulator destroyed");
                buffers.and(composite).and(passthrough)
            }
        }
    }
}

fn release_program<H: RenderHost + ?Sized>(host: &mut H, id: ProgramId) {
    if let Err(e) = host.release_program(id) {
        tracing::warn!(program = id.0, error = %e, "failed to release program");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/accumulator/stage.rs"]
mod tests;
