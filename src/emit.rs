//! Writing packed assets out as C/C++ sources plus the header that ties them together.

use std::path::{Path, PathBuf};

use time::macros::format_description;

use crate::error::{Error, Result};
use crate::metrics::GlyphMetrics;
use crate::pack::hex_list;

/// A named, packed glyph or image. Produced once, written once.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedAsset {
    /// The array identifier.
    pub name: String,
    /// The packed payload.
    pub bytes: Vec<u8>,
}

impl PackedAsset {
    /// Element count of the emitted array.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// The names emitted so far, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Array names, in emission order.
    names: Vec<String>,
}

impl Manifest {
    /// Record an emitted array.
    fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    /// Array names, in emission order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Writes one source file per asset into a directory and, at the end, the shared header.
#[derive(Debug)]
pub struct AssetEmitter {
    /// Output directory.
    dir: PathBuf,
    /// Header base name, e.g. `characters`.
    header: String,
    /// Comment line placed on top of the header, e.g. `Font: Foo.ttf`.
    banner: Option<String>,
    /// Everything emitted so far.
    manifest: Manifest,
}

impl AssetEmitter {
    /// An emitter writing into `dir` with `<header>.h` as the shared header.
    pub fn new(dir: impl Into<PathBuf>, header: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            header: header.into(),
            banner: None,
            manifest: Manifest::default(),
        }
    }

    /// Put `// <banner>` on the first line of the header.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Names emitted so far.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Write `<name>.cpp` holding the asset's array and record it in the manifest.
    pub fn emit(&mut self, asset: &PackedAsset) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.cpp", asset.name));
        write_file(&path, &render_source(&self.header, asset))?;
        self.manifest.push(&asset.name);
        tracing::info!(path = %path.display(), bytes = asset.len(), "generated");
        Ok(path)
    }

    /// Write the header and, when every asset shares `metrics`, the descriptor instance.
    /// Returns the files written.
    pub fn finalize(self, metrics: Option<GlyphMetrics>) -> Result<Vec<PathBuf>> {
        let header_path = self.dir.join(format!("{}.h", self.header));
        let mut written = Vec::new();

        match metrics {
            Some(metrics) => {
                write_file(
                    &header_path,
                    &render_header(&self.header, self.banner.as_deref(), &self.manifest),
                )?;
                written.push(header_path);

                let table_path = self.dir.join(format!("{}.cpp", self.header));
                write_file(
                    &table_path,
                    &render_descriptor(&self.header, metrics, &self.manifest),
                )?;
                written.push(table_path);
            }
            None => {
                write_file(
                    &header_path,
                    &render_extern_header(&self.header, &self.manifest),
                )?;
                written.push(header_path);
            }
        }

        for path in &written {
            tracing::info!(path = %path.display(), symbols = self.manifest.names.len(), "generated");
        }
        Ok(written)
    }
}

/// Create or truncate `path` with `contents`.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))
}

/// `_CHARACTERS_H_` for `characters`.
fn include_guard(header: &str) -> String {
    format!("_{}_H_", header.to_uppercase())
}

/// The per-asset source unit.
pub fn render_source(header: &str, asset: &PackedAsset) -> String {
    format!(
        "#include \"{header}.h\"\nconst unsigned char {}[{}] = {{\n    {}\n}};\n",
        asset.name,
        asset.len(),
        hex_list(&asset.bytes)
    )
}

/// The header: externs for every array plus the descriptor type and its instance.
pub fn render_header(header: &str, banner: Option<&str>, manifest: &Manifest) -> String {
    let guard = include_guard(header);
    let mut out = String::new();
    if let Some(banner) = banner {
        out.push_str(&format!("// {banner}\n\n"));
    }
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n#include <cstdint>\n\n"));
    for name in manifest.names() {
        out.push_str(&format!("extern const unsigned char {name}[];\n"));
    }
    out.push_str(&format!(
        "\n\nstruct _{header}\n{{\n    const uint16_t width;\n    const uint16_t height;\n    \
         const unsigned char *characters[];\n}};\n\nextern const _{header} {header};\n\n#endif\n"
    ));
    out
}

/// A header that only declares the arrays, for sets without a shared size.
pub fn render_extern_header(header: &str, manifest: &Manifest) -> String {
    let guard = include_guard(header);
    let mut out = format!("#ifndef {guard}\n#define {guard}\n\n");
    for name in manifest.names() {
        out.push_str(&format!("extern const unsigned char {name}[];\n"));
    }
    out.push_str("\n#endif\n");
    out
}

/// The descriptor instance: `{width, height, {name, ...}}` in manifest order.
pub fn render_descriptor(header: &str, metrics: GlyphMetrics, manifest: &Manifest) -> String {
    format!(
        "#include \"{header}.h\"\n\nconst _{header} {header} = {{{}, {}, {{{}}}}};\n",
        metrics.width,
        metrics.height,
        manifest.names().join(", ")
    )
}

/// `DD-Month-YYYY`, as stamped into font table banners.
pub fn banner_date(date: time::Date) -> String {
    date.format(format_description!("[day]-[month repr:long]-[year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// A complete monochrome font table in the ST LCD driver's `sFONT` layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontTable {
    /// Font identifier, e.g. `LiberationSansNarrow_Bold`.
    pub font: String,
    /// Point size.
    pub size: u32,
    /// Per-glyph box.
    pub metrics: GlyphMetrics,
    /// One packed glyph per character, in table order.
    pub glyphs: Vec<Vec<u8>>,
}

impl FontTable {
    /// `LiberationSansNarrow_Bold28`.
    pub fn symbol(&self) -> String {
        format!("{}{}", self.font, self.size)
    }

    /// File name the table is written under.
    pub fn file_name(&self) -> String {
        format!("{}.c", self.symbol())
    }

    /// The full `.c` source, stamped with `date`.
    pub fn render(&self, date: time::Date) -> String {
        let symbol = self.symbol();
        let file_name = self.file_name();
        let date = banner_date(date);
        let mut out = format!(
            r#"/**
******************************************************************************
* @file    {file_name}
* @author  MCD Application Team
* @version V1.0.0
* @date    {date}
* @brief   This file provides text {symbol} for STM32xx-EVAL's LCD driver.
******************************************************************************
* @attention
*
* <h2><center>&copy; COPYRIGHT(c) 2014 STMicroelectronics</center></h2>
*
* Redistribution and use in source and binary forms, with or without modification,
* are permitted provided that the following conditions are met:
*   1. Redistributions of source code must retain the above copyright notice,
*      this list of conditions and the following disclaimer.
*   2. Redistributions in binary form must reproduce the above copyright notice,
*      this list of conditions and the following disclaimer in the documentation
*      and/or other materials provided with the distribution.
*   3. Neither the name of STMicroelectronics nor the names of its contributors
*      may be used to endorse or promote products derived from this software
*      without specific prior written permission.
*
* THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
* AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
* IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
* DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
* FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
* DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
* SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
* CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
* OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
* OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
*
******************************************************************************
*/

/* Includes ------------------------------------------------------------------*/
#include "fonts.h"

//
//  Font data for {font} {size}pt
//

const uint8_t {symbol}_Table[] =
{{
"#,
            font = self.font,
            size = self.size,
        );
        for glyph in &self.glyphs {
            out.push_str(&hex_list(glyph));
            out.push_str(",\n");
        }
        out.push_str(&format!(
            "}};\n\nsFONT {symbol} = {{\n{symbol}_Table,\n{}, /* Width */\n{}, /* Height */\n}};\n\n\
             /************************ (C) COPYRIGHT Pablin *****END OF FILE****/",
            self.metrics.width, self.metrics.height
        ));
        out
    }

    /// Write the table into `dir`.
    pub fn write(&self, dir: &Path, date: time::Date) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        write_file(&path, &self.render(date))?;
        tracing::info!(path = %path.display(), glyphs = self.glyphs.len(), "generated");
        Ok(path)
    }
}
