//! Fixed output palettes for the animation.

/// An ordered list of opaque RGB colors, at most 256 entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPalette {
    colors: Vec<[u8; 3]>,
}

impl FixedPalette {
    /// Returns `None` for an empty palette or one with more than 256 colors.
    pub fn new(colors: Vec<[u8; 3]>) -> Option<Self> {
        (!colors.is_empty() && colors.len() <= 256).then_some(Self { colors })
    }

    /// The 27-color cube with every channel in {0x00, 0x80, 0xff}.
    ///
    /// Cheap to search and, with dithering, close enough for a preview GIF.
    pub fn cube27() -> Self {
        const LEVELS: [u8; 3] = [0x00, 0x80, 0xff];
        let mut colors = Vec::with_capacity(27);
        for r in LEVELS {
            for g in LEVELS {
                for b in LEVELS {
                    colors.push([r, g, b]);
                }
            }
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn color(&self, index: u8) -> [u8; 3] {
        self.colors[index as usize]
    }

    /// Index of the entry closest to `rgb` by squared Euclidean distance.
    ///
    /// Ties go to the lower index.
    pub fn nearest(&self, rgb: [f32; 3]) -> u8 {
        let mut best = 0;
        let mut best_dist = f32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            let dist: f32 = (0..3)
                .map(|k| {
                    let d = rgb[k] - c[k] as f32;
                    d * d
                })
                .sum();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best as u8
    }
}

impl Default for FixedPalette {
    fn default() -> Self {
        Self::cube27()
    }
}
