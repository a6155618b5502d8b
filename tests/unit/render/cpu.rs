use super::*;
use crate::{
    blend::mode::BlendMode,
    program::generate::{composite_source, passthrough_source},
};

fn host() -> CpuHost {
    CpuHost::with_threads(Some(2)).unwrap()
}

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn zero_threads_is_rejected() {
    assert!(matches!(
        CpuHost::with_threads(Some(0)),
        Err(AccumError::Validation(_))
    ));
}

#[test]
fn zero_sized_surfaces_are_rejected() {
    let mut h = host();
    let err = h
        .allocate_surface(Canvas {
            width: 0,
            height: 4,
        })
        .unwrap_err();
    assert!(matches!(err, AccumError::Validation(_)));
}

#[test]
fn upload_and_readback_round_trip() {
    let mut h = host();
    let frame = Frame::filled(canvas(3, 2), [0.25, 0.5, 0.75, 1.0]);
    let id = h.create_surface_from(&frame).unwrap();
    assert_eq!(h.read_surface(id).unwrap(), frame);

    let wrong = Frame::transparent(canvas(2, 2));
    assert!(h.write_surface(id, &wrong).is_err());
    assert_eq!(h.read_surface(id).unwrap(), frame);
}

#[test]
fn multiply_program_blends_source_over_previous() {
    let mut h = host();
    let src = h
        .create_surface_from(&Frame::filled(canvas(4, 4), [0.5, 0.5, 0.5, 1.0]))
        .unwrap();
    let prev = h
        .create_surface_from(&Frame::filled(canvas(4, 4), [0.2, 0.4, 0.6, 1.0]))
        .unwrap();
    let target = h.allocate_surface(canvas(4, 4)).unwrap();
    let program = h
        .compile_program(&composite_source(BlendMode::Multiply))
        .unwrap();

    h.execute_program(
        program,
        &Uniforms {
            source: src,
            previous: Some(prev),
            opacity: 1.0,
        },
        target,
        DrawOptions::default(),
    )
    .unwrap();

    let out = h.read_surface(target).unwrap();
    assert!(out.pixels.iter().all(|p| *p == [0.1, 0.2, 0.3, 1.0]));
}

#[test]
fn source_of_a_different_size_is_sampled_to_the_target() {
    let mut h = host();
    let mut pixels = vec![[0.0, 0.0, 0.0, 1.0]; 4];
    pixels[1] = [1.0, 0.0, 0.0, 1.0];
    let src = h
        .create_surface_from(&Frame::from_pixels(canvas(2, 2), pixels).unwrap())
        .unwrap();
    let target = h.allocate_surface(canvas(4, 4)).unwrap();
    let program = h.compile_program(&passthrough_source()).unwrap();

    h.execute_program(
        program,
        &Uniforms {
            source: src,
            previous: None,
            opacity: 1.0,
        },
        target,
        DrawOptions::default(),
    )
    .unwrap();

    let out = h.read_surface(target).unwrap();
    assert_eq!(out.pixel(3, 0), Some([1.0, 0.0, 0.0, 1.0]));
    assert_eq!(out.pixel(2, 1), Some([1.0, 0.0, 0.0, 1.0]));
    assert_eq!(out.pixel(1, 0), Some([0.0, 0.0, 0.0, 1.0]));
    assert_eq!(out.pixel(3, 2), Some([0.0, 0.0, 0.0, 1.0]));
}

#[test]
fn aliased_or_incomplete_draws_leave_the_target_intact() {
    let mut h = host();
    let frame = Frame::filled(canvas(2, 2), [0.3, 0.3, 0.3, 1.0]);
    let a = h.create_surface_from(&frame).unwrap();
    let b = h.create_surface_from(&frame).unwrap();
    let program = h
        .compile_program(&composite_source(BlendMode::Screen))
        .unwrap();

    let aliased = Uniforms {
        source: a,
        previous: Some(b),
        opacity: 1.0,
    };
    assert!(
        h.execute_program(program, &aliased, b, DrawOptions::default())
            .is_err()
    );

    let missing_prev = Uniforms {
        source: a,
        previous: None,
        opacity: 1.0,
    };
    assert!(
        h.execute_program(program, &missing_prev, b, DrawOptions::default())
            .is_err()
    );
    assert_eq!(h.read_surface(b).unwrap(), frame);
}

#[test]
fn programs_without_fragment_entry_fail_to_compile() {
    let mut h = host();
    let mut source = passthrough_source();
    source.wgsl = "// empty".to_string();
    assert!(matches!(
        h.compile_program(&source),
        Err(AccumError::Compilation(_))
    ));
    assert_eq!(h.program_count(), 0);
}

#[test]
fn released_resources_are_gone() {
    let mut h = host();
    let s = h.allocate_surface(canvas(1, 1)).unwrap();
    let p = h.compile_program(&passthrough_source()).unwrap();
    h.release_surface(s).unwrap();
    h.release_program(p).unwrap();
    assert_eq!(h.surface_count(), 0);
    assert_eq!(h.program_count(), 0);
    assert!(h.release_surface(s).is_err());
}

#[test]
fn oversized_surfaces_are_resource_errors() {
    let mut h = host();
    let huge = Canvas {
        width: u32::MAX,
        height: u32::MAX,
    };
    assert!(matches!(
        h.allocate_surface(huge),
        Err(AccumError::Resource(_))
    ));
    assert_eq!(h.surface_count(), 0);

    let id = h.allocate_surface(canvas(2, 3)).unwrap();
    assert!(matches!(
        h.resize_surface(id, huge),
        Err(AccumError::Resource(_))
    ));
    assert_eq!(h.surface_size(id), Some(canvas(2, 3)));
}
