//! Packing pixel grids into the byte layouts display drivers expect.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::raster::{PixelGrid, Rgb};

/// The byte layout to pack into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    /// Two bytes per pixel, 5-6-5 bits, high byte first.
    #[default]
    Rgb565,
    /// One bit per pixel, most significant bit leftmost, each row padded to a byte.
    Mono,
}

impl Scheme {
    /// Bytes a `width * height` grid packs into.
    pub fn packed_len(self, width: usize, height: usize) -> usize {
        match self {
            Self::Rgb565 => width * height * 2,
            Self::Mono => height * width.div_ceil(8),
        }
    }
}

/// Truncate a color to 5-6-5 bits. No rounding, no dithering.
pub fn rgb565([r, g, b]: Rgb) -> u16 {
    ((u16::from(r) & 0xF8) << 8) | ((u16::from(g) & 0xFC) << 3) | (u16::from(b) >> 3)
}

/// Whether a pixel counts as set in a 1-bit grid.
fn is_on(px: Rgb) -> bool {
    px != [0, 0, 0]
}

/// Pack a grid under `scheme`.
pub fn pack(grid: &PixelGrid, scheme: Scheme) -> Vec<u8> {
    match scheme {
        Scheme::Rgb565 => pack_rgb565(grid),
        Scheme::Mono => pack_mono(grid),
    }
}

/// Every pixel as a big-endian RGB565 pair.
pub fn pack_rgb565(grid: &PixelGrid) -> Vec<u8> {
    let mut out = Vec::with_capacity(Scheme::Rgb565.packed_len(grid.width(), grid.height()));
    for px in grid.pixels() {
        out.extend(rgb565(*px).to_be_bytes());
    }
    out
}

/// Rows of bits, eight pixels per byte. A row that doesn't fill its last byte has that byte
/// shifted left so the unused low bits are zero. Bytes never straddle rows.
pub fn pack_mono(grid: &PixelGrid) -> Vec<u8> {
    let width = grid.width();
    let mut out = Vec::with_capacity(Scheme::Mono.packed_len(width, grid.height()));
    if width == 0 {
        return out;
    }
    for row in grid.rows() {
        let mut byte = 0u8;
        for (x, px) in row.iter().enumerate() {
            byte = (byte << 1) | u8::from(is_on(*px));
            if x % 8 == 7 {
                out.push(byte);
                byte = 0;
            }
        }
        if width % 8 != 0 {
            out.push(byte << (8 - width % 8));
        }
    }
    out
}

/// `0x0A, 0xFF, ...`: two uppercase hex digits per byte, comma separated.
pub fn hex_list(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 6);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "0x{byte:02X}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{BLACK, WHITE};

    #[test]
    fn rgb565_formula() {
        assert_eq!(rgb565([0, 0, 0]), 0x0000);
        assert_eq!(rgb565([255, 255, 255]), 0xFFFF);
        assert_eq!(rgb565([255, 0, 0]), 0xF800);
        assert_eq!(rgb565([0, 255, 0]), 0x07E0);
        assert_eq!(rgb565([0, 0, 255]), 0x001F);
        // truncation, not rounding
        assert_eq!(rgb565([7, 3, 7]), 0x0000);
        assert_eq!(rgb565([0x12, 0x34, 0x56]), 0x11AA);
    }

    #[test]
    fn rgb565_bytes_rebuild_the_value() {
        for r in (0..=255u8).step_by(17) {
            for g in (0..=255u8).step_by(5) {
                for b in (0..=255u8).step_by(51) {
                    let v = rgb565([r, g, b]);
                    let grid = PixelGrid::new(1, 1, [r, g, b]);
                    let bytes = pack_rgb565(&grid);
                    assert_eq!(bytes, [(v >> 8) as u8, (v & 0xFF) as u8]);
                    assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), v);
                }
            }
        }
    }

    #[test]
    fn rgb565_length_is_two_per_pixel() {
        let grid = PixelGrid::new(10, 14, [200, 100, 50]);
        assert_eq!(pack(&grid, Scheme::Rgb565).len(), 280);
    }

    #[test]
    fn mono_13_by_2_all_on() {
        let grid = PixelGrid::new(13, 2, WHITE);
        assert_eq!(pack(&grid, Scheme::Mono), [0xFF, 0xF8, 0xFF, 0xF8]);
    }

    #[test]
    fn mono_padding_bits_are_zero() {
        for width in 1..=20 {
            for height in 1..=3 {
                let grid = PixelGrid::new(width, height, WHITE);
                let bytes = pack_mono(&grid);
                let per_row = width.div_ceil(8);
                assert_eq!(bytes.len(), height * per_row);
                assert_eq!(bytes.len(), Scheme::Mono.packed_len(width, height));
                if width % 8 != 0 {
                    let pad = 8 - width % 8;
                    for row in bytes.chunks(per_row) {
                        let last = row[per_row - 1];
                        assert_eq!(last & ((1u8 << pad) - 1), 0, "width {width}");
                        assert_eq!(last.count_ones() as usize, width % 8);
                    }
                }
            }
        }
    }

    #[test]
    fn mono_rows_start_fresh() {
        // a single lit pixel at the end of row 0 must not bleed into row 1
        let mut grid = PixelGrid::new(3, 2, BLACK);
        grid.set(2, 0, WHITE);
        grid.set(0, 1, WHITE);
        assert_eq!(pack_mono(&grid), [0b0010_0000, 0b1000_0000]);
    }

    #[test]
    fn mono_msb_is_leftmost() {
        let mut grid = PixelGrid::new(8, 1, BLACK);
        grid.set(0, 0, WHITE);
        grid.set(7, 0, WHITE);
        assert_eq!(pack_mono(&grid), [0x81]);
    }

    #[test]
    fn hex_list_format() {
        assert_eq!(hex_list(&[]), "");
        assert_eq!(hex_list(&[0x0a]), "0x0A");
        assert_eq!(hex_list(&[0x00, 0xff, 0x3c]), "0x00, 0xFF, 0x3C");
    }
}
