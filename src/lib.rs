//! Turn fonts and images into C arrays for small microcontroller displays.
//!
//! A run measures a character set once, rasterizes every character into the same box,
//! packs each grid as RGB565 or 1-bit rows, and writes the arrays out as C/C++ sources
//! together with a header describing the whole set.
#![warn(missing_docs, clippy::missing_docs_in_private_items)]

pub mod charset;
pub mod config;
pub mod emit;
pub mod error;
pub mod fonts;
pub mod images;
pub mod metrics;
pub mod pack;
pub mod pipeline;
pub mod raster;

pub use error::{Error, Result};
