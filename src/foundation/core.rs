use crate::foundation::error::{AccumError, AccumResult};

/// Three straight color channels in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Straight (non-premultiplied) RGBA in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Width and height of a surface, both non-zero once validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> AccumResult<Self> {
        if width == 0 || height == 0 {
            return Err(AccumError::validation(format!(
                "surface size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// A CPU-side frame in the single intermediate format: straight-alpha `f32` RGBA, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl Frame {
    pub fn filled(canvas: Canvas, px: Rgba) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            pixels: vec![px; canvas.pixel_count()],
        }
    }

    pub fn transparent(canvas: Canvas) -> Self {
        Self::filled(canvas, [0.0; 4])
    }

    /// Like [`Frame::filled`], but reports sizes the allocator cannot satisfy as
    /// [`AccumError::Resource`].
    pub fn try_filled(canvas: Canvas, px: Rgba) -> AccumResult<Self> {
        let too_large = || {
            AccumError::resource(format!(
                "surface {}x{} is too large to allocate",
                canvas.width, canvas.height
            ))
        };
        let count = (canvas.width as usize)
            .checked_mul(canvas.height as usize)
            .ok_or_else(too_large)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(count).map_err(|_| too_large())?;
        pixels.resize(count, px);
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            pixels,
        })
    }

    pub fn from_pixels(canvas: Canvas, pixels: Vec<Rgba>) -> AccumResult<Self> {
        if pixels.len() != canvas.pixel_count() {
            return Err(AccumError::validation(format!(
                "frame expects {} pixels for {}x{}, got {}",
                canvas.pixel_count(),
                canvas.width,
                canvas.height,
                pixels.len()
            )));
        }
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            pixels,
        })
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get((y as usize) * (self.width as usize) + (x as usize))
            .copied()
    }

    /// Decode tightly packed straight RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> AccumResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if data.len() != canvas.pixel_count() * 4 {
            return Err(AccumError::validation(
                "from_rgba8 expects width * height * 4 bytes",
            ));
        }
        let pixels = data
            .chunks_exact(4)
            .map(|p| {
                [
                    unorm8_to_f32(p[0]),
                    unorm8_to_f32(p[1]),
                    unorm8_to_f32(p[2]),
                    unorm8_to_f32(p[3]),
                ]
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            out.extend(px.iter().map(|&c| f32_to_unorm8(c)));
        }
        out
    }

    pub fn from_image(img: &image::RgbaImage) -> AccumResult<Self> {
        Self::from_rgba8(img.width(), img.height(), img.as_raw())
    }

    pub fn to_image(&self) -> AccumResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .ok_or_else(|| AccumError::validation("frame buffer does not match its dimensions"))
    }
}

fn unorm8_to_f32(v: u8) -> f32 {
    f32::from(v) / 255.0
}

fn f32_to_unorm8(v: f32) -> u8 {
    // NaN saturates to 0 through the `as` cast.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
