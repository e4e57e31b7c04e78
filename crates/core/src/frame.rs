//! Pixel buffers and the sprite drawing capability.
//!
//! The host owns a [`FrameBuffer`] and hands it to the simulation each tick.
//! Particles draw through the [`SpriteTarget`] trait; [`Painter`] implements
//! it for a frame buffer and a [`SpriteSheet`] of solid-color squares.
//! A [`Frame`] is an owned snapshot of the buffer, handed to a recorder.

use crate::color::Srgb;
use crate::error::EngineError;
use crate::vector::Vector2;

/// Anything particles can be drawn onto.
pub trait SpriteTarget {
    /// Composites the sprite for `tag` with its top-left corner at
    /// `position`, blended at `opacity` in [0, 1].
    fn draw_sprite(&mut self, tag: usize, position: Vector2, opacity: f64);
}

/// Mutable RGBA8 pixel buffer, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

/// Immutable RGBA8 snapshot of a [`FrameBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Creates a buffer filled with opaque `background`.
    ///
    /// Returns `EngineError::InvalidDimensions` if either dimension is zero
    /// or the byte length overflows.
    pub fn new(width: usize, height: usize, background: Srgb) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(EngineError::InvalidDimensions)?;
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0; len],
        };
        buffer.clear(background);
        Ok(buffer)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Srgb) {
        let rgba = color.to_rgba8();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// RGBA at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Blends `rgba` over the pixel at `(x, y)`; out-of-bounds writes are dropped.
    pub fn blend_pixel(&mut self, x: isize, y: isize, rgba: [u8; 4], opacity: f64) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = opacity.clamp(0.0, 1.0);
        let i = (y as usize * self.width + x as usize) * 4;
        for c in 0..3 {
            let dst = self.pixels[i + c] as f64;
            self.pixels[i + c] = (rgba[c] as f64 * a + dst * (1.0 - a)).round() as u8;
        }
        self.pixels[i + 3] = 255;
    }

    /// Draws a one-pixel line from `from` to `to` (DDA, endpoints included).
    pub fn draw_line(&mut self, from: Vector2, to: Vector2, rgba: [u8; 4]) {
        let delta = to - from;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let p = from + delta * (i as f64 / steps as f64);
            self.blend_pixel(p.x.floor() as isize, p.y.floor() as isize, rgba, 1.0);
        }
    }

    /// Copies the current contents into an owned [`Frame`].
    pub fn snapshot(&self) -> Frame {
        Frame {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

impl Frame {
    /// Wraps raw RGBA8 bytes; returns `None` if the length does not match.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        let expected = width.checked_mul(height)?.checked_mul(4)?;
        (expected == pixels.len() && width > 0 && height > 0).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame of one opaque color.
    pub fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Option<Self> {
        let pixels = [rgb[0], rgb[1], rgb[2], 255].repeat(width.checked_mul(height)?);
        Self::from_rgba(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// Solid square sprites, one per palette entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    colors: Vec<[u8; 4]>,
    size: usize,
}

impl SpriteSheet {
    /// Returns `EngineError::InvalidPalette` for an empty palette.
    pub fn new(palette: &[Srgb], size: usize) -> Result<Self, EngineError> {
        if palette.is_empty() {
            return Err(EngineError::InvalidPalette("palette has no colors".into()));
        }
        Ok(Self {
            colors: palette.iter().map(|c| c.to_rgba8()).collect(),
            size: size.max(1),
        })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Color for `tag`; tags wrap around the palette.
    pub fn color(&self, tag: usize) -> [u8; 4] {
        self.colors[tag % self.colors.len()]
    }
}

/// Draws sprites from a [`SpriteSheet`] onto a [`FrameBuffer`].
pub struct Painter<'a> {
    frame: &'a mut FrameBuffer,
    sprites: &'a SpriteSheet,
}

impl<'a> Painter<'a> {
    pub fn new(frame: &'a mut FrameBuffer, sprites: &'a SpriteSheet) -> Self {
        Self { frame, sprites }
    }
}

impl SpriteTarget for Painter<'_> {
    fn draw_sprite(&mut self, tag: usize, position: Vector2, opacity: f64) {
        let rgba = self.sprites.color(tag);
        let x0 = position.x.floor() as isize;
        let y0 = position.y.floor() as isize;
        let size = self.sprites.size() as isize;
        for dy in 0..size {
            for dx in 0..size {
                self.frame.blend_pixel(x0 + dx, y0 + dy, rgba, opacity);
            }
        }
    }
}
