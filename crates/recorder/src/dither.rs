//! Floyd-Steinberg error diffusion onto a [`FixedPalette`].

use crate::palette::FixedPalette;
use flowfield_core::Frame;

/// A frame reduced to palette indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    width: usize,
    height: usize,
    indices: Vec<u8>,
}

impl IndexedFrame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Expands back to opaque RGBA8 through `palette`.
    pub fn to_rgba(&self, palette: &FixedPalette) -> Vec<u8> {
        self.indices
            .iter()
            .flat_map(|&i| {
                let [r, g, b] = palette.color(i);
                [r, g, b, 255]
            })
            .collect()
    }
}

/// Quantizes `frame` to `palette`, diffusing each pixel's error to its
/// unvisited neighbors with weights 7/16 (right), 3/16 (below left),
/// 5/16 (below) and 1/16 (below right). Alpha is ignored.
pub fn dither(frame: &Frame, palette: &FixedPalette) -> IndexedFrame {
    let width = frame.width();
    let height = frame.height();
    let pixels = frame.pixels();
    let mut indices = Vec::with_capacity(width * height);

    // error rows are padded by one pixel on each side
    let mut current = vec![[0.0f32; 3]; width + 2];
    let mut next = vec![[0.0f32; 3]; width + 2];

    for y in 0..height {
        for x in 0..width {
            let i = (y * width + x) * 4;
            let err = current[x + 1];
            let wanted = [
                (pixels[i] as f32 + err[0]).clamp(0.0, 255.0),
                (pixels[i + 1] as f32 + err[1]).clamp(0.0, 255.0),
                (pixels[i + 2] as f32 + err[2]).clamp(0.0, 255.0),
            ];
            let index = palette.nearest(wanted);
            indices.push(index);

            let got = palette.color(index);
            for c in 0..3 {
                let e = wanted[c] - got[c] as f32;
                current[x + 2][c] += e * 7.0 / 16.0;
                next[x][c] += e * 3.0 / 16.0;
                next[x + 1][c] += e * 5.0 / 16.0;
                next[x + 2][c] += e * 1.0 / 16.0;
            }
        }
        std::mem::swap(&mut current, &mut next);
        next.fill([0.0; 3]);
    }

    IndexedFrame {
        width,
        height,
        indices,
    }
}
