use super::*;
use crate::render::cpu::CpuHost;

fn setup(w: u32, h: u32) -> (CpuHost, PingPong) {
    let mut host = CpuHost::with_threads(Some(1)).unwrap();
    let canvas = Canvas::new(w, h).unwrap();
    let primary = host.allocate_surface(canvas).unwrap();
    let pp = PingPong::new(&mut host, primary, canvas).unwrap();
    (host, pp)
}

#[test]
fn starts_on_the_primary_surface() {
    let (host, pp) = setup(4, 3);
    assert_eq!(pp.current_index(), 0);
    let [a, b] = pp.surfaces();
    assert_ne!(a, b);
    assert_eq!(pp.current(), a);
    assert_eq!(host.surface_size(b), Some(Canvas::new(4, 3).unwrap()));
}

#[test]
fn advance_alternates_and_never_aliases() {
    let (_host, mut pp) = setup(2, 2);
    for n in 1..=9usize {
        let swap = pp.advance();
        assert_ne!(swap.previous, swap.next);
        assert_eq!(swap.next, pp.current());
        assert_eq!(pp.current_index(), n % 2);
    }
}

#[test]
fn resize_keeps_index_and_resizes_both() {
    let (mut host, mut pp) = setup(2, 2);
    pp.advance();
    let bigger = Canvas::new(8, 5).unwrap();
    pp.resize(&mut host, bigger).unwrap();
    assert_eq!(pp.current_index(), 1);
    assert_eq!(pp.canvas(), bigger);
    for id in pp.surfaces() {
        assert_eq!(host.surface_size(id), Some(bigger));
    }
}

#[test]
fn failed_resize_restores_the_first_surface() {
    let (mut host, mut pp) = setup(3, 3);
    let [a, b] = pp.surfaces();
    host.release_surface(b).unwrap();

    let err = pp.resize(&mut host, Canvas::new(6, 6).unwrap());
    assert!(err.is_err());
    assert_eq!(host.surface_size(a), Some(Canvas::new(3, 3).unwrap()));
    assert_eq!(pp.canvas(), Canvas::new(3, 3).unwrap());
}

#[test]
fn teardown_releases_both() {
    let (mut host, pp) = setup(2, 2);
    let [a, b] = pp.surfaces();
    pp.teardown(&mut host).unwrap();
    assert_eq!(host.surface_size(a), None);
    assert_eq!(host.surface_size(b), None);
}
