//! Driving jobs end to end: measure, rasterize, pack, emit.

use std::path::{Path, PathBuf};

use crate::charset::CharacterSet;
use crate::config::{GlyphJob, ImageJob, Job, Sizing, TableJob};
use crate::emit::{AssetEmitter, FontTable, PackedAsset};
use crate::error::{Error, Result};
use crate::fonts::{GlyphSource, LoadedFont};
use crate::images;
use crate::metrics::{self, Adjust, GlyphMetrics};
use crate::pack::{self, Scheme};
use crate::raster::{self, RasterMode};

/// Everything a job produced.
#[derive(Debug, Default)]
pub struct Summary {
    /// Files written, in order.
    pub written: Vec<PathBuf>,
    /// Inputs that were skipped, with why.
    pub skipped: Vec<Error>,
    /// Whether a fallback font stood in for the requested one.
    pub degraded: bool,
}

impl Summary {
    /// Fold another summary into this one.
    fn merge(&mut self, other: Self) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
        self.degraded |= other.degraded;
    }
}

/// The font, size and box every glyph of one run is rendered with.
pub struct GlyphRun<'a, F> {
    /// The font.
    pub font: &'a F,
    /// Point size.
    pub size: u32,
    /// Shared box.
    pub metrics: GlyphMetrics,
    /// How coverage becomes pixels.
    pub mode: RasterMode,
    /// How pixels become bytes.
    pub scheme: Scheme,
}

impl<F: GlyphSource> GlyphRun<'_, F> {
    /// Rasterize and pack one character.
    pub fn pack(&self, c: char) -> Vec<u8> {
        let grid = raster::rasterize(c, self.font, self.size, self.metrics, self.mode);
        pack::pack(&grid, self.scheme)
    }
}

/// Run any job. `date` stamps font table banners.
pub fn run_job(job: &Job, date: time::Date) -> Result<Summary> {
    match job {
        Job::Glyphs(job) => run_glyphs(job),
        Job::Table(job) => run_table(job, date),
        Job::Images(job) => run_images(job),
    }
}

/// Run several jobs in order, stopping at the first hard failure.
pub fn run_all(jobs: &[Job], date: time::Date) -> Result<Summary> {
    let mut summary = Summary::default();
    for job in jobs {
        summary.merge(run_job(job, date)?);
    }
    Ok(summary)
}

/// Create the output directory if needed.
fn prepare_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Load the job's font and generate its glyph set.
pub fn run_glyphs(job: &GlyphJob) -> Result<Summary> {
    let (font, degraded) = LoadedFont::load_with(&job.font, job.fallback)?;
    let mut summary = generate_glyphs(&font, font.name(), job)?;
    summary.degraded = degraded;
    Ok(summary)
}

/// Work out the size and box a glyph job renders at.
pub fn resolve_size(font: &impl GlyphSource, job: &GlyphJob) -> Result<(u32, GlyphMetrics)> {
    match &job.sizing {
        Sizing::Fixed { size, adjust, .. } => Ok((
            *size,
            metrics::measure(font, job.sizing.probe().chars(), *size, *adjust)?,
        )),
        Sizing::Auto { target, margin } => {
            let chars: Vec<char> = job.charset.chars().collect();
            let sized = metrics::auto_size(font, &chars, *target, *margin)?;
            Ok((sized.size, sized.metrics))
        }
    }
}

/// One array per character of the job's set, then the header and descriptor.
pub fn generate_glyphs(
    font: &impl GlyphSource,
    font_name: &str,
    job: &GlyphJob,
) -> Result<Summary> {
    let (size, metrics) = resolve_size(font, job)?;
    let mode = match job.scheme {
        Scheme::Rgb565 => RasterMode::Color {
            background: job.background,
            foreground: job.foreground,
        },
        Scheme::Mono => RasterMode::Mono,
    };
    let run = GlyphRun {
        font,
        size,
        metrics,
        mode,
        scheme: job.scheme,
    };
    tracing::info!(
        font = font_name,
        size,
        ?metrics,
        symbols = job.charset.len(),
        "generating glyph set"
    );

    prepare_dir(&job.out_dir)?;
    let mut emitter =
        AssetEmitter::new(&job.out_dir, &job.header).with_banner(format!("Font: {font_name}"));
    let mut summary = Summary::default();
    for symbol in job.charset.symbols() {
        let asset = PackedAsset {
            bytes: run.pack(symbol.ch),
            name: symbol.name,
        };
        summary.written.push(emitter.emit(&asset)?);
    }
    summary.written.extend(emitter.finalize(Some(metrics))?);
    Ok(summary)
}

/// Write one table per size, each rendered from its own font spec.
pub fn run_table(job: &TableJob, date: time::Date) -> Result<Summary> {
    prepare_dir(&job.out_dir)?;
    let mut summary = Summary::default();
    for spec in job.font_specs() {
        let (font, degraded) = LoadedFont::load_with(&spec.source, job.fallback)?;
        summary.degraded |= degraded;
        let table = build_table(
            &font,
            &font.identifier(),
            spec.size,
            &job.charset,
            job.width_ratio,
        )?;
        summary.written.push(table.write(&job.out_dir, date)?);
    }
    Ok(summary)
}

/// Measure the printable set at `size`, narrow it by `width_ratio`, and pack every
/// character of `charset` one bit per pixel.
pub fn build_table(
    font: &impl GlyphSource,
    font_id: &str,
    size: u32,
    charset: &CharacterSet,
    width_ratio: f64,
) -> Result<FontTable> {
    let metrics = metrics::measure(
        font,
        crate::charset::PRINTABLE.chars(),
        size,
        Adjust::WidthRatio(width_ratio),
    )?;
    let run = GlyphRun {
        font,
        size,
        metrics,
        mode: RasterMode::Mono,
        scheme: Scheme::Mono,
    };
    tracing::info!(
        font = font_id,
        size,
        ?metrics,
        glyphs = charset.len(),
        "generating font table"
    );
    Ok(FontTable {
        font: font_id.to_string(),
        size,
        metrics,
        glyphs: charset.chars().map(|c| run.pack(c)).collect(),
    })
}

/// Convert every image in the input directory; undecodable files are skipped.
pub fn run_images(job: &ImageJob) -> Result<Summary> {
    let scan = images::scan_dir(&job.input_dir)?;
    prepare_dir(&job.out_dir)?;

    let mut emitter = AssetEmitter::new(&job.out_dir, &job.header);
    let mut summary = Summary {
        skipped: scan.skipped,
        ..Summary::default()
    };
    for image in scan.images {
        let asset = PackedAsset {
            bytes: pack::pack_rgb565(&image.grid),
            name: image.name,
        };
        summary.written.push(emitter.emit(&asset)?);
    }
    summary.written.extend(emitter.finalize(None)?);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::{CharGroup, Naming};
    use crate::fonts::testing::BlockFont;
    use crate::fonts::{FontFallback, FontSource};

    fn glyph_job(out_dir: &Path, charset: CharacterSet) -> GlyphJob {
        GlyphJob {
            font: FontSource::BuiltIn,
            fallback: FontFallback::Fail,
            // BlockFont 'A' at 14 is 7x14, widened to 10x14
            sizing: Sizing::Fixed {
                size: 14,
                adjust: Adjust::Offset {
                    width: 3,
                    height: 0,
                },
                probe: Some("A".to_string()),
            },
            charset,
            scheme: Scheme::Rgb565,
            background: crate::raster::BLACK,
            foreground: crate::raster::WHITE,
            header: "characters".to_string(),
            out_dir: out_dir.to_path_buf(),
        }
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn single_letter_glyph_set() {
        let dir = tempfile::tempdir().unwrap();
        let charset = CharacterSet::single(CharGroup::new("char_", Naming::Char, "A"));
        let job = glyph_job(dir.path(), charset);
        let summary = generate_glyphs(&BlockFont::new(), "Block.ttf", &job).unwrap();
        assert_eq!(summary.written.len(), 3);

        let source = read(dir.path(), "char_A.cpp");
        assert!(
            source.starts_with("#include \"characters.h\"\nconst unsigned char char_A[280] = {\n")
        );
        let payload = source.lines().nth(2).unwrap().trim();
        assert_eq!(payload.split(", ").count(), 280);
        assert!(payload.split(", ").all(|v| v.len() == 4 && v.starts_with("0x")));

        let header = read(dir.path(), "characters.h");
        assert!(header.starts_with("// Font: Block.ttf\n"));
        assert!(header.contains("extern const unsigned char char_A[];"));
        assert_eq!(
            read(dir.path(), "characters.cpp"),
            "#include \"characters.h\"\n\nconst _characters characters = {10, 14, {char_A}};\n"
        );
    }

    #[test]
    fn punctuation_uses_index_names() {
        let dir = tempfile::tempdir().unwrap();
        let charset = CharacterSet::single(CharGroup::new("punctuation_", Naming::Index, "!"));
        generate_glyphs(&BlockFont::new(), "Block.ttf", &glyph_job(dir.path(), charset)).unwrap();
        assert!(dir.path().join("punctuation_0.cpp").exists());
        assert!(read(dir.path(), "characters.cpp").contains("{punctuation_0}"));
        assert!(!read(dir.path(), "characters.h").contains("punctuation_!"));
    }

    #[test]
    fn blank_glyphs_are_full_size_background() {
        let dir = tempfile::tempdir().unwrap();
        let charset = CharacterSet::single(CharGroup::new("blank_", Naming::Index, " "));
        generate_glyphs(&BlockFont::new(), "Block.ttf", &glyph_job(dir.path(), charset)).unwrap();
        let source = read(dir.path(), "blank_0.cpp");
        assert!(source.contains("blank_0[280]"));
        let payload = source.lines().nth(2).unwrap().trim();
        assert!(payload.split(", ").all(|v| v == "0x00"));
    }

    #[test]
    fn descriptor_follows_charset_order() {
        let dir = tempfile::tempdir().unwrap();
        let charset = CharacterSet {
            groups: vec![
                CharGroup::new("char_", Naming::Char, "zA"),
                CharGroup::new("punctuation_", Naming::Index, "!?"),
                CharGroup::new("char_", Naming::Char, "0"),
            ],
        };
        generate_glyphs(&BlockFont::new(), "Block.ttf", &glyph_job(dir.path(), charset)).unwrap();
        assert!(read(dir.path(), "characters.cpp").ends_with(
            "{10, 14, {char_z, char_A, punctuation_0, punctuation_1, char_0}};\n"
        ));
    }

    #[test]
    fn runs_are_byte_identical() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let font = LoadedFont::load(&FontSource::BuiltIn).unwrap();
        for dir in [&first, &second] {
            let mut job = glyph_job(dir.path(), CharacterSet::glyph_set());
            job.sizing = Sizing::Fixed {
                size: 18,
                adjust: Adjust::None,
                probe: None,
            };
            generate_glyphs(&font, font.name(), &job).unwrap();
        }
        for name in [
            "characters.h",
            "characters.cpp",
            "char_A.cpp",
            "punctuation_3.cpp",
            "char_z.cpp",
        ] {
            assert_eq!(read(first.path(), name), read(second.path(), name), "{name}");
        }
    }

    #[test]
    fn mono_glyph_sets_pack_bits() {
        let dir = tempfile::tempdir().unwrap();
        let charset = CharacterSet::single(CharGroup::new("char_", Naming::Char, "A"));
        let mut job = glyph_job(dir.path(), charset);
        job.scheme = Scheme::Mono;
        generate_glyphs(&BlockFont::new(), "Block.ttf", &job).unwrap();
        // 10 wide rounds up to 2 bytes per row, 14 rows
        assert!(read(dir.path(), "char_A.cpp").contains("char_A[28]"));
    }

    #[test]
    fn auto_sized_sets_use_the_target_box() {
        let dir = tempfile::tempdir().unwrap();
        let charset = CharacterSet::single(CharGroup::new("number_", Naming::Char, "0"));
        let mut job = glyph_job(dir.path(), charset);
        job.sizing = Sizing::Auto {
            target: GlyphMetrics {
                width: 36,
                height: 40,
            },
            margin: metrics::DEFAULT_MARGIN,
        };
        let (size, metrics) = resolve_size(&BlockFont::new(), &job).unwrap();
        assert_eq!(size, 35);
        assert_eq!(
            metrics,
            GlyphMetrics {
                width: 36,
                height: 40,
            }
        );

        generate_glyphs(&BlockFont::new(), "Block.ttf", &job).unwrap();
        assert!(read(dir.path(), "number_0.cpp").contains("number_0[2880]"));
    }

    #[test]
    fn table_has_one_glyph_per_char() {
        let font = BlockFont::new();
        let charset = CharacterSet::ascii_table();
        let table = build_table(&font, "Block", 20, &charset, metrics::MONO_WIDTH_RATIO).unwrap();
        // widest probe glyph is 20 (M, W), scaled by 0.7
        assert_eq!(
            table.metrics,
            GlyphMetrics {
                width: 14,
                height: 20,
            }
        );
        assert_eq!(table.glyphs.len(), 95);
        assert!(table.glyphs.iter().all(|g| g.len() == 20 * 2));
        // space is blank, '!' is a 10 wide block: 0xFF, 0xC0 per row
        assert!(table.glyphs[0].iter().all(|b| *b == 0));
        assert_eq!(&table.glyphs[1][..2], [0xFF, 0xC0]);
    }

    #[test]
    fn table_job_writes_one_file_per_size() {
        let dir = tempfile::tempdir().unwrap();
        let job = TableJob {
            font: FontSource::BuiltIn,
            fallback: FontFallback::Fail,
            sizes: vec![12, 14],
            charset: CharacterSet::ascii_table(),
            width_ratio: metrics::MONO_WIDTH_RATIO,
            out_dir: dir.path().to_path_buf(),
        };
        let date = time::Date::from_calendar_date(2026, time::Month::January, 2).unwrap();
        let summary = run_table(&job, date).unwrap();
        assert_eq!(
            summary.written,
            [
                dir.path().join("DejaVuSansMono_Bold12.c"),
                dir.path().join("DejaVuSansMono_Bold14.c"),
            ]
        );
        let text = read(dir.path(), "DejaVuSansMono_Bold12.c");
        assert!(text.contains("sFONT DejaVuSansMono_Bold12 = {"));
        assert!(text.contains("02-January-2026"));
        assert!(text.matches(",\n").count() >= 95);
    }

    #[test]
    fn table_sizes_each_load_their_font_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = TableJob {
            font: FontSource::File(dir.path().join("Missing-Bold.ttf")),
            fallback: FontFallback::Fail,
            sizes: vec![12, 14],
            charset: CharacterSet::ascii_table(),
            width_ratio: metrics::MONO_WIDTH_RATIO,
            out_dir: dir.path().join("out"),
        };
        let specs: Vec<_> = job.font_specs().collect();
        assert!(specs.iter().all(|v| v.source == job.font));
        let date = time::Date::from_calendar_date(2026, time::Month::January, 2).unwrap();
        assert!(matches!(run_table(&job, date), Err(Error::FontLoad { .. })));

        job.fallback = FontFallback::BuiltIn;
        let summary = run_table(&job, date).unwrap();
        assert!(summary.degraded);
        assert_eq!(summary.written.len(), 2);
    }

    #[test]
    fn missing_font_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = glyph_job(dir.path(), CharacterSet::glyph_set());
        job.font = FontSource::File(dir.path().join("Missing.ttf"));
        assert!(matches!(run_glyphs(&job), Err(Error::FontLoad { .. })));

        job.fallback = FontFallback::BuiltIn;
        job.sizing = Sizing::Fixed {
            size: 16,
            adjust: Adjust::None,
            probe: None,
        };
        assert!(run_glyphs(&job).unwrap().degraded);
    }

    #[test]
    fn image_batch_skips_undecodable_files() {
        let input = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut img = image::RgbImage::new(2, 3);
        img.put_pixel(1, 0, image::Rgb([0xFF, 0x00, 0x00]));
        img.save(input.path().join("Logo.png")).unwrap();
        std::fs::write(input.path().join("bad.bmp"), b"nope").unwrap();

        let job = ImageJob {
            input_dir: input.path().to_path_buf(),
            header: "torino_logo_sm".to_string(),
            out_dir: out.path().to_path_buf(),
        };
        let summary = run_images(&job).unwrap();
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(
            summary.written,
            [out.path().join("logo.cpp"), out.path().join("torino_logo_sm.h")]
        );
        let source = read(out.path(), "logo.cpp");
        assert!(
            source.starts_with("#include \"torino_logo_sm.h\"\nconst unsigned char logo[12] = {\n")
        );
        assert!(source.contains("0x00, 0x00, 0xF8, 0x00, 0x00, 0x00"));
        assert!(
            read(out.path(), "torino_logo_sm.h").contains("extern const unsigned char logo[];")
        );
    }
}
