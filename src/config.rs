//! Job files: the RON description of what a run should generate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::charset::{CharacterSet, PRINTABLE};
use crate::error::{Error, Result};
use crate::fonts::{FontFallback, FontSource, FontSpec};
use crate::metrics::{Adjust, DEFAULT_MARGIN, GlyphMetrics, MONO_WIDTH_RATIO};
use crate::pack::Scheme;
use crate::raster::{BLACK, Rgb, WHITE};

/// How the glyph box of a glyph set is chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Sizing {
    /// Render at `size`; the box is the largest glyph of `probe` after `adjust`.
    Fixed {
        /// Point size.
        size: u32,
        /// Measurement correction.
        #[serde(default)]
        adjust: Adjust,
        /// Characters measured; every printable ASCII character when absent.
        #[serde(default)]
        probe: Option<String>,
    },
    /// Render into `target`, at the biggest size that keeps glyphs within `margin` of it.
    Auto {
        /// The box glyphs must fit.
        target: GlyphMetrics,
        /// Share of `target` glyphs may use.
        #[serde(default = "default_margin")]
        margin: f64,
    },
}

impl Sizing {
    /// The characters a fixed-size measurement looks at.
    pub fn probe(&self) -> &str {
        match self {
            Self::Fixed {
                probe: Some(probe), ..
            } => probe.as_str(),
            _ => PRINTABLE,
        }
    }
}

/// One array per character plus a header and descriptor table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphJob {
    /// The font to render with.
    pub font: FontSource,
    /// What to do if it won't load.
    #[serde(default)]
    pub fallback: FontFallback,
    /// How the size and box are chosen.
    pub sizing: Sizing,
    /// What to render and how to name it.
    #[serde(default = "CharacterSet::glyph_set")]
    pub charset: CharacterSet,
    /// Byte layout of every array.
    #[serde(default)]
    pub scheme: Scheme,
    /// Color of empty pixels (RGB565 only).
    #[serde(default = "default_background")]
    pub background: Rgb,
    /// Color of inked pixels (RGB565 only).
    #[serde(default = "default_foreground")]
    pub foreground: Rgb,
    /// Base name of the header and descriptor.
    #[serde(default = "default_glyph_header")]
    pub header: String,
    /// Where everything is written.
    pub out_dir: PathBuf,
}

/// A single-file, 1-bit `sFONT` table per size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableJob {
    /// The font to render with.
    pub font: FontSource,
    /// What to do if it won't load.
    #[serde(default)]
    pub fallback: FontFallback,
    /// One table is written per size.
    pub sizes: Vec<u32>,
    /// Table contents, in index order.
    #[serde(default = "CharacterSet::ascii_table")]
    pub charset: CharacterSet,
    /// Applied to the measured width.
    #[serde(default = "default_width_ratio")]
    pub width_ratio: f64,
    /// Where the tables are written.
    pub out_dir: PathBuf,
}

impl TableJob {
    /// One font spec per requested size, in order.
    pub fn font_specs(&self) -> impl Iterator<Item = FontSpec> + '_ {
        self.sizes.iter().map(|size| FontSpec {
            source: self.font.clone(),
            size: *size,
        })
    }
}

/// Every image in a directory converted to RGB565.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageJob {
    /// Directory scanned for images.
    pub input_dir: PathBuf,
    /// Base name of the header declaring the arrays.
    #[serde(default = "default_image_header")]
    pub header: String,
    /// Where everything is written.
    pub out_dir: PathBuf,
}

/// Anything a run can do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Job {
    /// See [`GlyphJob`].
    Glyphs(GlyphJob),
    /// See [`TableJob`].
    Table(TableJob),
    /// See [`ImageJob`].
    Images(ImageJob),
}

impl Job {
    /// Resolve relative paths against `base`.
    fn rebase(&mut self, base: &Path) {
        fn fix(path: &mut PathBuf, base: &Path) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        fn fix_font(font: &mut FontSource, base: &Path) {
            if let FontSource::File(path) = font {
                fix(path, base);
            }
        }

        match self {
            Self::Glyphs(job) => {
                fix_font(&mut job.font, base);
                fix(&mut job.out_dir, base);
            }
            Self::Table(job) => {
                fix_font(&mut job.font, base);
                fix(&mut job.out_dir, base);
            }
            Self::Images(job) => {
                fix(&mut job.input_dir, base);
                fix(&mut job.out_dir, base);
            }
        }
    }
}

/// The contents of a job file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    /// Run in order.
    pub jobs: Vec<Job>,
}

impl JobFile {
    /// Where the job file lives when none is given.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|v| v.join("glyphpack").join("jobs.ron"))
    }

    /// Parse a job file. Relative paths inside it are taken relative to the file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut file = Self::parse(&data).map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })?;
        if let Some(base) = path.parent() {
            for job in &mut file.jobs {
                job.rebase(base);
            }
        }
        Ok(file)
    }

    /// Parse job file contents.
    pub fn parse(data: &str) -> std::result::Result<Self, String> {
        ron::from_str(data).map_err(|e| e.to_string())
    }
}

/// Serde default for [`Sizing::Auto::margin`].
fn default_margin() -> f64 {
    DEFAULT_MARGIN
}

/// Serde default for [`TableJob::width_ratio`].
fn default_width_ratio() -> f64 {
    MONO_WIDTH_RATIO
}

/// Black.
fn default_background() -> Rgb {
    BLACK
}

/// White.
fn default_foreground() -> Rgb {
    WHITE
}

/// `characters`.
fn default_glyph_header() -> String {
    "characters".to_string()
}

/// `images`.
fn default_image_header() -> String {
    "images".to_string()
}
