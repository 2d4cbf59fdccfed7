//! Glyph Pack
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::{Result, eyre::eyre};
use time::{OffsetDateTime, macros::format_description};
use tracing_subscriber::EnvFilter;

use glyphpack::charset::CharacterSet;
use glyphpack::config::{GlyphJob, ImageJob, Job, JobFile, Sizing, TableJob};
use glyphpack::fonts::{FontFallback, FontSource};
use glyphpack::metrics::{Adjust, DEFAULT_MARGIN, GlyphMetrics, MONO_WIDTH_RATIO};
use glyphpack::pack::Scheme;
use glyphpack::pipeline;
use glyphpack::raster::{BLACK, WHITE};

/// Rasterize fonts and images into C arrays for microcontroller displays.
#[derive(Parser)]
#[command(name = "glyphpack", version, about, propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Date stamped into font table banners, as YYYY-MM-DD. Defaults to today.
    #[arg(long, global = true, value_parser = parse_date)]
    date: Option<time::Date>,

    /// What to generate.
    #[command(subcommand)]
    command: Commands,
}

/// The font options shared by the glyph and table commands.
#[derive(Args)]
struct FontArgs {
    /// TrueType/OpenType font file.
    #[arg(long, required_unless_present = "builtin_font")]
    font: Option<PathBuf>,

    /// Render with the built-in font instead of a file.
    #[arg(long, conflicts_with = "font")]
    builtin_font: bool,

    /// Fall back to the built-in font if the font file won't load.
    #[arg(long)]
    fallback: bool,
}

impl FontArgs {
    /// Split into the font source and fallback policy.
    fn into_parts(self) -> (FontSource, FontFallback) {
        let source = match self.font {
            Some(path) if !self.builtin_font => FontSource::File(path),
            _ => FontSource::BuiltIn,
        };
        let fallback = if self.fallback {
            FontFallback::BuiltIn
        } else {
            FontFallback::Fail
        };
        (source, fallback)
    }
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// One array per character plus a header with a descriptor table
    Glyphs {
        /// Font selection.
        #[command(flatten)]
        font: FontArgs,
        /// Render at this point size, sizing the box from the printable characters.
        #[arg(long, conflicts_with = "target", required_unless_present = "target")]
        size: Option<u32>,
        /// Added to the measured width.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        width_offset: i32,
        /// Added to the measured height.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        height_offset: i32,
        /// Render into a WIDTHxHEIGHT box at the largest size that fits.
        #[arg(long, value_parser = parse_box)]
        target: Option<GlyphMetrics>,
        /// Share of the target box glyphs may use.
        #[arg(long, default_value_t = DEFAULT_MARGIN)]
        margin: f64,
        /// Pack one bit per pixel instead of RGB565.
        #[arg(long)]
        mono: bool,
        /// Header and descriptor name.
        #[arg(long, default_value = "characters")]
        header: String,
        /// Output directory.
        #[arg(short, long)]
        out: PathBuf,
    },
    /// A 1-bit sFONT table per size
    Table {
        /// Font selection.
        #[command(flatten)]
        font: FontArgs,
        /// Point sizes, one table each.
        #[arg(long = "size", required = true)]
        sizes: Vec<u32>,
        /// Applied to the measured width.
        #[arg(long, default_value_t = MONO_WIDTH_RATIO)]
        width_ratio: f64,
        /// Output directory.
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Every image in a directory as RGB565 arrays
    Images {
        /// Directory to scan.
        #[arg(short, long)]
        input: PathBuf,
        /// Header name.
        #[arg(long, default_value = "images")]
        header: String,
        /// Output directory; the input directory when absent.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Run every job in a RON job file
    Run {
        /// The job file; the user config directory's glyphpack/jobs.ron when absent.
        config: Option<PathBuf>,
    },
}

/// `YYYY-MM-DD`.
fn parse_date(s: &str) -> std::result::Result<time::Date, String> {
    time::Date::parse(s, format_description!("[year]-[month]-[day]")).map_err(|e| e.to_string())
}

/// `WIDTHxHEIGHT`.
fn parse_box(s: &str) -> std::result::Result<GlyphMetrics, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<i64>().map_err(|e| e.to_string());
    GlyphMetrics::new(parse(w)?, parse(h)?).map_err(|e| e.to_string())
}

/// Turn the parsed command line into jobs.
fn jobs(command: Commands) -> Result<Vec<Job>> {
    Ok(match command {
        Commands::Glyphs {
            font,
            size,
            width_offset,
            height_offset,
            target,
            margin,
            mono,
            header,
            out,
        } => {
            let (font, fallback) = font.into_parts();
            let sizing = match (size, target) {
                (_, Some(target)) => Sizing::Auto { target, margin },
                (Some(size), None) => Sizing::Fixed {
                    size,
                    adjust: if width_offset == 0 && height_offset == 0 {
                        Adjust::None
                    } else {
                        Adjust::Offset {
                            width: width_offset,
                            height: height_offset,
                        }
                    },
                    probe: None,
                },
                (None, None) => return Err(eyre!("either --size or --target is required")),
            };
            vec![Job::Glyphs(GlyphJob {
                font,
                fallback,
                sizing,
                charset: CharacterSet::glyph_set(),
                scheme: if mono { Scheme::Mono } else { Scheme::Rgb565 },
                background: BLACK,
                foreground: WHITE,
                header,
                out_dir: out,
            })]
        }
        Commands::Table {
            font,
            sizes,
            width_ratio,
            out,
        } => {
            let (font, fallback) = font.into_parts();
            vec![Job::Table(TableJob {
                font,
                fallback,
                sizes,
                charset: CharacterSet::ascii_table(),
                width_ratio,
                out_dir: out,
            })]
        }
        Commands::Images { input, header, out } => vec![Job::Images(ImageJob {
            out_dir: out.unwrap_or_else(|| input.clone()),
            input_dir: input,
            header,
        })],
        Commands::Run { config } => {
            let path = config
                .or_else(JobFile::default_path)
                .ok_or_else(|| eyre!("no job file given and no config directory found"))?;
            tracing::info!(path = %path.display(), "loading jobs");
            JobFile::load(&path)?.jobs
        }
    })
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let date = cli.date.unwrap_or_else(|| {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    });

    let summary = pipeline::run_all(&jobs(cli.command)?, date)?;

    if summary.degraded {
        tracing::warn!("output was rendered with the built-in fallback font");
    }
    tracing::info!(
        files = summary.written.len(),
        skipped = summary.skipped.len(),
        "done"
    );
    Ok(())
}
