//! Font loading and glyph rasterization with fontdue.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The built-in font, only used when a job explicitly asks for it.
pub const BUILTIN_FONT: (&[u8], &str) = (
    include_bytes!("../fonts/ttf/DejaVuSansMono-Bold.ttf"),
    "DejaVuSansMono-Bold.ttf",
);

/// Where a font comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontSource {
    /// A TrueType/OpenType file on disk.
    File(PathBuf),
    /// [`BUILTIN_FONT`].
    BuiltIn,
}

/// What to do when a font file cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFallback {
    /// Fail the run.
    #[default]
    Fail,
    /// Substitute [`BUILTIN_FONT`] and carry on in degraded mode.
    BuiltIn,
}

/// A font resource at one point size.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    /// The font resource.
    pub source: FontSource,
    /// Point size, used directly as the pixel size.
    pub size: u32,
}

/// The ink box of one glyph, relative to the pen position on the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphBox {
    /// Left edge offset from the pen.
    pub xmin: i32,
    /// Bottom edge offset from the baseline, positive up.
    pub ymin: i32,
    /// Ink width.
    pub width: usize,
    /// Ink height.
    pub height: usize,
}

impl GlyphBox {
    /// Whether the glyph has no ink at all (space and friends).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rasterized glyph: its box plus `width * height` coverage values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    /// Where the coverage sits.
    pub glyph: GlyphBox,
    /// Row-major coverage, 0 is empty and 255 is fully inked.
    pub bitmap: Vec<u8>,
}

/// Anything that can measure and rasterize characters.
pub trait GlyphSource {
    /// Measure `c` at `size` without rasterizing.
    fn measure(&self, c: char, size: u32) -> GlyphBox;
    /// Rasterize `c` at `size`.
    fn rasterize(&self, c: char, size: u32) -> Coverage;
    /// Distance from the top of the line to the baseline at `size`.
    fn ascent(&self, size: u32) -> f32;
}

/// A parsed font plus the name it was loaded under.
pub struct LoadedFont {
    /// File name, e.g. `LiberationSansNarrow-Bold.ttf`.
    name: String,
    /// The parsed font.
    font: fontdue::Font,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("name", &self.name).finish()
    }
}

impl LoadedFont {
    /// Load a font, failing hard if it cannot be read or parsed.
    pub fn load(source: &FontSource) -> Result<Self> {
        match source {
            FontSource::BuiltIn => {
                Self::from_bytes(BUILTIN_FONT.1, BUILTIN_FONT.0, Path::new(BUILTIN_FONT.1))
            }
            FontSource::File(path) => {
                let bytes = std::fs::read(path).map_err(|e| Error::FontLoad {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                let name = path
                    .file_name()
                    .map(|v| v.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Self::from_bytes(&name, &bytes, path)
            }
        }
    }

    /// Load a font, substituting the built-in one if allowed. The flag is true when the
    /// substitution happened.
    pub fn load_with(source: &FontSource, fallback: FontFallback) -> Result<(Self, bool)> {
        match (Self::load(source), fallback) {
            (Ok(font), _) => Ok((font, false)),
            (Err(e), FontFallback::BuiltIn) => {
                tracing::warn!(error = %e, font = BUILTIN_FONT.1, "falling back to built-in font");
                Ok((Self::load(&FontSource::BuiltIn)?, true))
            }
            (Err(e), FontFallback::Fail) => Err(e),
        }
    }

    /// Parse raw font bytes.
    fn from_bytes(name: &str, bytes: &[u8], path: &Path) -> Result<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |reason| Error::FontLoad {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            },
        )?;
        Ok(Self {
            name: name.to_string(),
            font,
        })
    }

    /// The file name the font was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file stem as a C identifier fragment: `LiberationSansNarrow-Bold.ttf` becomes
    /// `LiberationSansNarrow_Bold`.
    pub fn identifier(&self) -> String {
        let stem = Path::new(&self.name)
            .file_stem()
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone());
        stem.replace('-', "_")
    }
}

impl GlyphSource for LoadedFont {
    fn measure(&self, c: char, size: u32) -> GlyphBox {
        let metrics = self.font.metrics(c, size as f32);
        GlyphBox {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
        }
    }

    fn rasterize(&self, c: char, size: u32) -> Coverage {
        let (metrics, bitmap) = self.font.rasterize(c, size as f32);
        Coverage {
            glyph: GlyphBox {
                xmin: metrics.xmin,
                ymin: metrics.ymin,
                width: metrics.width,
                height: metrics.height,
            },
            bitmap,
        }
    }

    fn ascent(&self, size: u32) -> f32 {
        self.font
            .horizontal_line_metrics(size as f32)
            .map_or(size as f32, |v| v.ascent)
    }
}
