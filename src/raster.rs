//! Rendering glyphs and images into fixed-size RGB grids.

use serde::{Deserialize, Serialize};

use crate::fonts::GlyphSource;
use crate::metrics::GlyphMetrics;

/// One pixel, red then green then blue.
pub type Rgb = [u8; 3];

/// Black.
pub const BLACK: Rgb = [0, 0, 0];
/// White.
pub const WHITE: Rgb = [255, 255, 255];

/// How glyph coverage turns into pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RasterMode {
    /// Anti-aliased, blending between two colors.
    Color {
        /// Fill for uncovered pixels.
        background: Rgb,
        /// Fill for fully covered pixels.
        foreground: Rgb,
    },
    /// Thresholded: a pixel is either [`WHITE`] (on) or [`BLACK`] (off).
    Mono,
}

impl Default for RasterMode {
    fn default() -> Self {
        Self::Color {
            background: BLACK,
            foreground: WHITE,
        }
    }
}

impl RasterMode {
    /// The fill a fresh grid starts with.
    fn background(self) -> Rgb {
        match self {
            Self::Color { background, .. } => background,
            Self::Mono => BLACK,
        }
    }

    /// The pixel for a given coverage value.
    fn shade(self, coverage: u8) -> Rgb {
        match self {
            Self::Color {
                background,
                foreground,
            } => {
                let cov = u32::from(coverage);
                let mut out = [0; 3];
                for ((o, bg), fg) in out.iter_mut().zip(background).zip(foreground) {
                    let mixed = (u32::from(bg) * (255 - cov) + u32::from(fg) * cov + 127) / 255;
                    *o = u8::try_from(mixed).unwrap_or(u8::MAX);
                }
                out
            }
            Self::Mono if coverage >= u8::MAX / 2 => WHITE,
            Self::Mono => BLACK,
        }
    }
}

/// A `width * height` grid of pixels, row-major from the top left.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelGrid {
    /// Columns.
    width: usize,
    /// Rows.
    height: usize,
    /// `width * height` pixels.
    pixels: Vec<Rgb>,
}

impl PixelGrid {
    /// A grid filled with `fill`.
    pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Overwrite the pixel at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, px: Rgb) {
        self.pixels[y * self.width + x] = px;
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        // chunks() refuses a zero size
        self.pixels.chunks(self.width.max(1))
    }

    /// Every pixel, row-major.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}

impl From<&image::RgbImage> for PixelGrid {
    fn from(value: &image::RgbImage) -> Self {
        Self {
            width: value.width() as usize,
            height: value.height() as usize,
            pixels: value.pixels().map(|p| p.0).collect(),
        }
    }
}

/// Render `c` into a `metrics`-sized grid.
///
/// The pen sits at the top-left corner: the ascender line is row zero and the glyph's own
/// left bearing is kept. Nothing is centered. Ink falling outside the grid is dropped and
/// any space left over stays background.
pub fn rasterize(
    c: char,
    font: &impl GlyphSource,
    size: u32,
    metrics: GlyphMetrics,
    mode: RasterMode,
) -> PixelGrid {
    let mut grid = PixelGrid::new(
        usize::from(metrics.width),
        usize::from(metrics.height),
        mode.background(),
    );

    let coverage = font.rasterize(c, size);
    if coverage.glyph.is_empty() {
        return grid;
    }

    #[expect(clippy::cast_possible_truncation, reason = "ascent is a few hundred px at most")]
    let baseline = font.ascent(size).round() as i64;
    let glyph = coverage.glyph;
    let top = baseline - i64::from(glyph.ymin) - glyph.height as i64;
    let left = i64::from(glyph.xmin);

    for (gy, row) in coverage.bitmap.chunks(glyph.width).enumerate() {
        let Ok(y) = usize::try_from(top + gy as i64) else {
            continue;
        };
        if y >= grid.height {
            break;
        }
        for (gx, value) in row.iter().enumerate() {
            let Ok(x) = usize::try_from(left + gx as i64) else {
                continue;
            };
            if x >= grid.width {
                break;
            }
            grid.set(x, y, mode.shade(*value));
        }
    }

    grid
}
