use super::*;
use crate::{
    foundation::core::Frame,
    program::generate::ProgramSource,
    render::cpu::CpuHost,
};

/// Wraps a [`CpuHost`] and records every compile, with switchable failures.
struct Recording {
    inner: CpuHost,
    compiled: Vec<String>,
    fail_label: Option<String>,
    fail_draws: bool,
}

impl Recording {
    fn new() -> Self {
        Self {
            inner: CpuHost::with_threads(Some(1)).unwrap(),
            compiled: Vec::new(),
            fail_label: None,
            fail_draws: false,
        }
    }
}

impl RenderHost for Recording {
    fn allocate_surface(&mut self, canvas: Canvas) -> AccumResult<SurfaceId> {
        self.inner.allocate_surface(canvas)
    }

    fn resize_surface(&mut self, id: SurfaceId, canvas: Canvas) -> AccumResult<()> {
        self.inner.resize_surface(id, canvas)
    }

    fn release_surface(&mut self, id: SurfaceId) -> AccumResult<()> {
        self.inner.release_surface(id)
    }

    fn surface_size(&self, id: SurfaceId) -> Option<Canvas> {
        self.inner.surface_size(id)
    }

    fn write_surface(&mut self, id: SurfaceId, frame: &Frame) -> AccumResult<()> {
        self.inner.write_surface(id, frame)
    }

    fn read_surface(&mut self, id: SurfaceId) -> AccumResult<Frame> {
        self.inner.read_surface(id)
    }

    fn compile_program(&mut self, source: &ProgramSource) -> AccumResult<ProgramId> {
        if self.fail_label.as_deref() == Some(source.label.as_str()) {
            return Err(AccumError::compilation("rejected by test host"));
        }
        self.compiled.push(source.label.clone());
        self.inner.compile_program(source)
    }

    fn release_program(&mut self, id: ProgramId) -> AccumResult<()> {
        self.inner.release_program(id)
    }

    fn execute_program(
        &mut self,
        program: ProgramId,
        uniforms: &Uniforms,
        target: SurfaceId,
        opts: DrawOptions,
    ) -> AccumResult<()> {
        if self.fail_draws {
            return Err(AccumError::resource("draw rejected by test host"));
        }
        self.inner.execute_program(program, uniforms, target, opts)
    }
}

fn ready(host: &mut Recording) -> (Accumulator, SurfaceId) {
    let mut acc = Accumulator::new();
    acc.initialize(host, 4, 4).unwrap();
    let src = host
        .create_surface_from(&Frame::filled(
            Canvas::new(4, 4).unwrap(),
            [0.5, 0.5, 0.5, 1.0],
        ))
        .unwrap();
    acc.set_inputs(host, AccumulatorInputs::default().with_source(src))
        .unwrap();
    (acc, src)
}

#[test]
fn out_of_order_calls_are_lifecycle_errors() {
    let mut host = Recording::new();
    let mut acc = Accumulator::new();
    assert!(matches!(
        acc.draw_frame(&mut host),
        Err(AccumError::Lifecycle(_))
    ));
    assert!(matches!(
        acc.resize(&mut host, 2, 2),
        Err(AccumError::Lifecycle(_))
    ));

    acc.initialize(&mut host, 2, 2).unwrap();
    assert!(matches!(
        acc.initialize(&mut host, 2, 2),
        Err(AccumError::Lifecycle(_))
    ));

    acc.destroy(&mut host).unwrap();
    assert!(matches!(acc.destroy(&mut host), Err(AccumError::Lifecycle(_))));
    assert!(matches!(
        acc.set_inputs(&mut host, AccumulatorInputs::default()),
        Err(AccumError::Lifecycle(_))
    ));
    assert_eq!(host.inner.surface_count(), 0);
    assert_eq!(host.inner.program_count(), 0);
}

#[test]
fn initialize_compiles_both_programs_for_the_preset_mode() {
    let mut host = Recording::new();
    let mut acc = Accumulator::new();
    acc.set_inputs(
        &mut host,
        AccumulatorInputs::default().with_blend_mode(BlendMode::Glow),
    )
    .unwrap();
    assert!(host.compiled.is_empty());

    acc.initialize(&mut host, 3, 3).unwrap();
    assert_eq!(
        host.compiled,
        ["accumulator_passthrough", "accumulator_glow"]
    );
    assert_eq!(acc.active_mode(), Some(BlendMode::Glow));
    assert_eq!(acc.current_index(), Some(0));
    assert_eq!(host.inner.surface_count(), 2);
}

#[test]
fn failed_initialize_holds_nothing() {
    let mut host = Recording::new();
    host.fail_label = Some("accumulator_normal".to_string());
    let mut acc = Accumulator::new();
    let err = acc.initialize(&mut host, 3, 3).unwrap_err();
    assert!(matches!(err, AccumError::Compilation(_)));
    assert!(!acc.is_ready());
    assert_eq!(host.inner.surface_count(), 0);
    assert_eq!(host.inner.program_count(), 0);

    host.fail_label = None;
    acc.initialize(&mut host, 3, 3).unwrap();
    assert!(acc.is_ready());
}

#[test]
fn mode_change_regenerates_exactly_once() {
    let mut host = Recording::new();
    let (mut acc, src) = ready(&mut host);
    let before = host.compiled.len();

    let screen = AccumulatorInputs::default()
        .with_source(src)
        .with_blend_mode(BlendMode::Screen);
    acc.set_inputs(&mut host, screen.clone()).unwrap();
    assert_eq!(host.compiled.len(), before + 1);

    acc.set_inputs(&mut host, screen.with_opacity(0.5)).unwrap();
    acc.draw_frame(&mut host).unwrap();
    assert_eq!(host.compiled.len(), before + 1);
    assert_eq!(host.inner.program_count(), 2);
}

#[test]
fn failed_regeneration_keeps_previous_program_and_inputs() {
    let mut host = Recording::new();
    let (mut acc, src) = ready(&mut host);
    host.fail_label = Some("accumulator_overlay".to_string());

    let err = acc
        .set_inputs(
            &mut host,
            AccumulatorInputs::default()
                .with_source(src)
                .with_blend_mode(BlendMode::Overlay)
                .with_opacity(0.25),
        )
        .unwrap_err();
    assert!(matches!(err, AccumError::Compilation(_)));
    assert_eq!(acc.active_mode(), Some(BlendMode::Normal));
    assert_eq!(acc.inputs().blend_mode, BlendMode::Normal);
    assert_eq!(acc.inputs().opacity, 1.0);
    assert!(acc.draw_frame(&mut host).is_ok());
}

#[test]
fn draw_alternates_buffers_and_reports_output() {
    let mut host = Recording::new();
    let (mut acc, _src) = ready(&mut host);
    let start = acc.output().unwrap();
    for n in 1..=5u64 {
        let out = acc.draw_frame(&mut host).unwrap();
        assert_eq!(Some(out), acc.output());
        assert_eq!(acc.current_index(), Some((n % 2) as usize));
        assert_eq!(acc.frames_drawn(), n);
        assert_eq!(out == start, n % 2 == 0);
    }
}

#[test]
fn failed_draw_restores_the_previous_output() {
    let mut host = Recording::new();
    let (mut acc, _src) = ready(&mut host);
    acc.draw_frame(&mut host).unwrap();
    let good = acc.output();

    host.fail_draws = true;
    assert!(acc.draw_frame(&mut host).is_err());
    assert_eq!(acc.output(), good);
    assert_eq!(acc.current_index(), Some(1));
    assert_eq!(acc.frames_drawn(), 1);
}

#[test]
fn draw_without_source_is_a_validation_error() {
    let mut host = Recording::new();
    let mut acc = Accumulator::new();
    acc.initialize(&mut host, 2, 2).unwrap();
    assert!(matches!(
        acc.draw_frame(&mut host),
        Err(AccumError::Validation(_))
    ));
    assert_eq!(acc.current_index(), Some(0));
}

#[test]
fn resize_then_draw_produces_resized_output() {
    let mut host = Recording::new();
    let (mut acc, _src) = ready(&mut host);
    acc.draw_frame(&mut host).unwrap();
    acc.resize(&mut host, 7, 3).unwrap();
    assert_eq!(acc.current_index(), Some(1));

    let out = acc.draw_frame(&mut host).unwrap();
    let frame = host.read_surface(out).unwrap();
    assert_eq!((frame.width, frame.height), (7, 3));
    assert!(frame.pixels.iter().all(|p| *p == [0.5, 0.5, 0.5, 1.0]));
}

#[test]
fn failed_resize_leaves_buffers_untouched() {
    let mut host = Recording::new();
    let (mut acc, _src) = ready(&mut host);
    acc.draw_frame(&mut host).unwrap();
    let before = acc.output();
    let surfaces = acc.live().unwrap().buffers.surfaces();

    assert!(matches!(
        acc.resize(&mut host, u32::MAX, u32::MAX),
        Err(AccumError::Resource(_))
    ));
    assert_eq!(acc.canvas(), Some(Canvas::new(4, 4).unwrap()));
    assert_eq!(acc.output(), before);
    for id in surfaces {
        assert_eq!(host.surface_size(id), Some(Canvas::new(4, 4).unwrap()));
    }
    acc.draw_frame(&mut host).unwrap();
}

#[test]
fn set_inputs_after_destroy_reports_lifecycle_before_validation() {
    let mut host = Recording::new();
    let (mut acc, src) = ready(&mut host);
    acc.destroy(&mut host).unwrap();
    let bad = AccumulatorInputs::default()
        .with_source(src)
        .with_opacity(f32::NAN);
    assert!(matches!(
        acc.set_inputs(&mut host, bad),
        Err(AccumError::Lifecycle(_))
    ));
}
