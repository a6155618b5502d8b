//! Double-buffer (ping-pong) surface manager.
//!
//! Two identically sized surfaces alternate roles each frame: the one at `current` holds the
//! result of the last frame and the other is the next draw target. A manager only exists between
//! [`PingPong::new`] and [`PingPong::teardown`], so it can never be advanced uninitialized or
//! used after release.

use crate::{
    foundation::{core::Canvas, error::AccumResult},
    render::host::{RenderHost, SurfaceId},
};

/// Roles of the two surfaces after one [`PingPong::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swap {
    /// Result of the previous frame; read-only this frame.
    pub previous: SurfaceId,
    /// Destination of this frame's draw.
    pub next: SurfaceId,
}

#[derive(Debug)]
pub struct PingPong {
    surfaces: [SurfaceId; 2],
    current: usize,
    canvas: Canvas,
}

impl PingPong {
    /// Take ownership of `primary` and allocate its partner at the same size.
    pub fn new<H: RenderHost + ?Sized>(
        host: &mut H,
        primary: SurfaceId,
        canvas: Canvas,
    ) -> AccumResult<Self> {
        let secondary = host.allocate_surface(canvas)?;
        Ok(Self {
            surfaces: [primary, secondary],
            current: 0,
            canvas,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The surface holding the latest result.
    pub fn current(&self) -> SurfaceId {
        self.surfaces[self.current]
    }

    pub fn surfaces(&self) -> [SurfaceId; 2] {
        self.surfaces
    }

    pub fn advance(&mut self) -> Swap {
        let previous = self.surfaces[self.current];
        self.current = (self.current + 1) % 2;
        Swap {
            previous,
            next: self.surfaces[self.current],
        }
    }

    /// Resize both surfaces together; the index is kept.
    ///
    /// If the second surface fails, the first is put back to the old size before the error is
    /// returned.
    pub fn resize<H: RenderHost + ?Sized>(&mut self, host: &mut H, canvas: Canvas) -> AccumResult<()> {
        if canvas == self.canvas {
            return Ok(());
        }
        let [a, b] = self.surfaces;
        host.resize_surface(a, canvas)?;
        if let Err(e) = host.resize_surface(b, canvas) {
            if let Err(restore) = host.resize_surface(a, self.canvas) {
                tracing::warn!(error = %restore, "failed to restore surface after resize failure");
            }
            return Err(e);
        }
        self.canvas = canvas;
        Ok(())
    }

    /// Release both surfaces. Both releases are attempted; the first error is returned.
    pub fn teardown<H: RenderHost + ?Sized>(self, host: &mut H) -> AccumResult<()> {
        let first = host.release_surface(self.surfaces[0]);
        let second = host.release_surface(self.surfaces[1]);
        first.and(second)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pingpong.rs"]
mod tests;
