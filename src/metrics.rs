//! Working out the single box every glyph of a run is rendered into.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fonts::GlyphSource;

/// The smallest size the auto-size search probes.
pub const MIN_FONT_SIZE: u32 = 10;
/// The search gives up growing past this, whatever the glyphs say.
pub const MAX_FONT_SIZE: u32 = 4096;
/// A glyph must stay under this share of the target box.
pub const DEFAULT_MARGIN: f64 = 0.9;
/// Width correction applied to monochrome tables.
pub const MONO_WIDTH_RATIO: f64 = 0.70;

/// The box, in pixels, shared by every glyph in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphMetrics {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
}

impl GlyphMetrics {
    /// Validate a computed box: both sides must be at least one pixel and fit a `uint16_t`.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        match (u16::try_from(width), u16::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Self {
                width: w,
                height: h,
            }),
            _ => Err(Error::MetricsOverflow { width, height }),
        }
    }

    /// Pixels per glyph.
    pub fn area(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Correction applied to a measured box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Adjust {
    /// Use the measurement as is.
    #[default]
    None,
    /// Scale the width, rounding halves to even.
    WidthRatio(f64),
    /// Add signed pixel offsets.
    Offset {
        /// Added to the width.
        width: i32,
        /// Added to the height.
        height: i32,
    },
}

impl Adjust {
    /// Apply to a raw `(width, height)`.
    fn apply(self, width: usize, height: usize) -> (i64, i64) {
        let (width, height) = (width as i64, height as i64);
        match self {
            Self::None => (width, height),
            #[expect(
                clippy::cast_possible_truncation,
                reason = "a glyph box is nowhere near i64::MAX"
            )]
            Self::WidthRatio(ratio) => ((width as f64 * ratio).round_ties_even() as i64, height),
            Self::Offset {
                width: dw,
                height: dh,
            } => (width + i64::from(dw), height + i64::from(dh)),
        }
    }
}

/// Measure every character of `probe` at `size` and return the largest width and height
/// seen, after `adjust`. Glyphs without ink don't count.
pub fn measure(
    font: &impl GlyphSource,
    probe: impl IntoIterator<Item = char>,
    size: u32,
    adjust: Adjust,
) -> Result<GlyphMetrics> {
    let mut max_width = 0;
    let mut max_height = 0;
    for c in probe {
        let glyph = font.measure(c, size);
        if glyph.is_empty() {
            continue;
        }
        max_width = max_width.max(glyph.width);
        max_height = max_height.max(glyph.height);
    }

    let (width, height) = adjust.apply(max_width, max_height);
    let metrics = GlyphMetrics::new(width, height)?;
    tracing::debug!(
        size,
        raw_width = max_width,
        raw_height = max_height,
        ?metrics,
        "measured glyphs"
    );
    Ok(metrics)
}

/// Result of [`auto_size`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AutoSize {
    /// The largest size that kept every glyph inside the margin.
    pub size: u32,
    /// The box glyphs are rendered into; the search target.
    pub metrics: GlyphMetrics,
}

/// Find the largest font size, counting up from [`MIN_FONT_SIZE`], at which every character
/// stays under `margin` of `target` on both axes.
///
/// The search stops at the first size where any glyph reaches the margin and returns the size
/// before it. If [`MIN_FONT_SIZE`] itself is already too big it is returned anyway, so the
/// result may under-fit a very small target.
pub fn auto_size(
    font: &impl GlyphSource,
    chars: &[char],
    target: GlyphMetrics,
    margin: f64,
) -> Result<AutoSize> {
    let inked = chars
        .iter()
        .any(|c| !font.measure(*c, MIN_FONT_SIZE).is_empty());
    if !inked {
        return Err(Error::MetricsOverflow {
            width: 0,
            height: 0,
        });
    }

    let limit_w = f64::from(target.width) * margin;
    let limit_h = f64::from(target.height) * margin;
    let fits = |size: u32| {
        chars.iter().all(|c| {
            let glyph = font.measure(*c, size);
            (glyph.width as f64) < limit_w && (glyph.height as f64) < limit_h
        })
    };

    let mut best = MIN_FONT_SIZE;
    let mut size = MIN_FONT_SIZE;
    while size <= MAX_FONT_SIZE && fits(size) {
        best = size;
        size += 1;
    }
    if best == MIN_FONT_SIZE && !fits(MIN_FONT_SIZE) {
        tracing::warn!(?target, "glyphs overflow the target even at the minimum size");
    }

    Ok(AutoSize {
        size: best,
        metrics: target,
    })
}
