//! Built-in glyph table for the overlay.
//!
//! The overlay only ever prints the frame statistics line, so instead of an
//! asset-loaded font the glyphs it needs are baked into the binary as 8x8
//! bitmaps and expanded to a single-row R8 atlas at startup. Characters
//! without a bitmap render as blanks.

pub const GLYPH_WIDTH: usize = 8;
pub const GLYPH_HEIGHT: usize = 8;

/// One row of bits per scanline, most significant bit on the left.
type GlyphBitmap = [u8; GLYPH_HEIGHT];

#[rustfmt::skip]
const GLYPHS: &[(char, GlyphBitmap)] = &[
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('(', [0x0C, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0C, 0x00]),
    (')', [0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x18, 0x30, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00]),
    (':', [0x00, 0x18, 0x18, 0x00, 0x18, 0x18, 0x00, 0x00]),
    ('0', [0x3C, 0x66, 0x6E, 0x76, 0x66, 0x66, 0x3C, 0x00]),
    ('1', [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00]),
    ('2', [0x3C, 0x66, 0x06, 0x0C, 0x30, 0x60, 0x7E, 0x00]),
    ('3', [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x66, 0x3C, 0x00]),
    ('4', [0x0C, 0x1C, 0x3C, 0x6C, 0x7E, 0x0C, 0x0C, 0x00]),
    ('5', [0x7E, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C, 0x00]),
    ('6', [0x3C, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x3C, 0x00]),
    ('7', [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x00]),
    ('8', [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x3C, 0x00]),
    ('9', [0x3C, 0x66, 0x66, 0x3E, 0x06, 0x0C, 0x38, 0x00]),
    ('F', [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x60, 0x00]),
    ('P', [0x7C, 0x66, 0x66, 0x7C, 0x60, 0x60, 0x60, 0x00]),
    ('S', [0x3C, 0x66, 0x60, 0x3C, 0x06, 0x66, 0x3C, 0x00]),
    ('m', [0x00, 0x00, 0x6C, 0x7E, 0x6A, 0x6A, 0x6A, 0x00]),
    ('s', [0x00, 0x00, 0x3E, 0x60, 0x3C, 0x06, 0x7C, 0x00]),
];

pub fn glyph_count() -> usize {
    GLYPHS.len()
}

pub fn glyph_index(c: char) -> Option<usize> {
    GLYPHS.iter().position(|(glyph, _)| *glyph == c)
}

pub fn atlas_width() -> usize {
    GLYPHS.len() * GLYPH_WIDTH
}

pub fn atlas_height() -> usize {
    GLYPH_HEIGHT
}

/// Expands the bitmaps into a row-major, one-byte-per-pixel coverage image
/// with all glyphs side by side on a single row.
pub fn bake_atlas() -> Vec<u8> {
    let width = atlas_width();
    let mut pixels = vec![0u8; width * atlas_height()];

    for (slot, (_, bitmap)) in GLYPHS.iter().enumerate() {
        for (y, row) in bitmap.iter().enumerate() {
            for x in 0..GLYPH_WIDTH {
                if row & (0x80 >> x) != 0 {
                    pixels[y * width + slot * GLYPH_WIDTH + x] = 0xFF;
                }
            }
        }
    }
    pixels
}

/// `[u0, v0, u1, v1]` of the glyph's cell in the atlas.
pub fn uv_rect(index: usize) -> [f32; 4] {
    let width = atlas_width() as f32;
    let left = (index * GLYPH_WIDTH) as f32;
    [left / width, 0.0, (left + GLYPH_WIDTH as f32) / width, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_glyphs() {
        assert!(glyph_index('0').is_some());
        assert!(glyph_index('F').is_some());
        assert!(glyph_index('Z').is_none());
        assert!(glyph_index('@').is_none());
    }

    #[test]
    fn atlas_has_one_cell_per_glyph() {
        let pixels = bake_atlas();
        assert_eq!(pixels.len(), atlas_width() * atlas_height());
        assert_eq!(atlas_width(), glyph_count() * GLYPH_WIDTH);
    }

    #[test]
    fn baked_pixels_match_the_bitmap() {
        let pixels = bake_atlas();
        let zero = glyph_index('0').unwrap();

        // '0' row 0 is 0x3C: two blank pixels, four set, two blank
        let row_start = zero * GLYPH_WIDTH;
        assert_eq!(pixels[row_start], 0);
        assert_eq!(pixels[row_start + 2], 0xFF);
        assert_eq!(pixels[row_start + 5], 0xFF);
        assert_eq!(pixels[row_start + 7], 0);

        // the space glyph is entirely blank
        let space = glyph_index(' ').unwrap();
        for y in 0..GLYPH_HEIGHT {
            for x in 0..GLYPH_WIDTH {
                assert_eq!(pixels[y * atlas_width() + space * GLYPH_WIDTH + x], 0);
            }
        }
    }

    #[test]
    fn uv_rects_stay_inside_the_atlas() {
        for index in 0..glyph_count() {
            let [u0, v0, u1, v1] = uv_rect(index);
            assert!(0.0 <= u0 && u0 < u1 && u1 <= 1.0);
            assert!(0.0 <= v0 && v0 < v1 && v1 <= 1.0);
        }
    }
}
