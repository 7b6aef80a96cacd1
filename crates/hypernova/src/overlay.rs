//! Screen-space text layout.
//!
//! Produces one instance record per character; the renderer copies the
//! records into the current frame slot's vertex region and draws them as
//! instanced quads. The instance buffer is rewritten in full every frame
//! the overlay is visible, so layout never depends on previous contents.

use crate::font;

/// Upper bound on characters per frame; the per-slot vertex regions are
/// sized for exactly this many instance records.
pub const MAX_OVERLAY_CHARS: usize = 1024;

/// Per-character quad, expanded to four vertices in the vertex shader.
/// `rect` is `[x, y, w, h]` in clip space with `(x, y)` the top-left
/// corner; `uv` is `[u0, v0, u1, v1]` into the glyph atlas.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphInstance {
    pub rect: [f32; 4],
    pub uv: [f32; 4],
    pub color: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    /// Multiplier on the glyph cell, per axis.
    pub scale: [f32; 2],
    /// Extra advance between characters, in unscaled glyph pixels.
    pub padding: [f32; 2],
    pub color: [f32; 4],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale: [2.0, 2.0],
            padding: [0.5, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

pub struct Overlay {
    screen_width: f32,
    screen_height: f32,
    instances: Vec<GlyphInstance>,
}

impl Overlay {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width: screen_width as f32,
            screen_height: screen_height as f32,
            instances: Vec::with_capacity(MAX_OVERLAY_CHARS),
        }
    }

    /// Discards the previous frame's layout.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Lays `text` out left-to-right starting at `position` (pixels,
    /// top-left origin). Characters without a glyph advance the pen but
    /// emit nothing; past the instance cap the rest of the line is dropped.
    pub fn push_text(&mut self, text: &str, position: [f32; 2], style: &TextStyle) {
        let cell_w = font::GLYPH_WIDTH as f32 * style.scale[0];
        let cell_h = font::GLYPH_HEIGHT as f32 * style.scale[1];
        let advance = (font::GLYPH_WIDTH as f32 + style.padding[0]) * style.scale[0];

        let mut pen_x = position[0];
        let pen_y = position[1] + style.padding[1] * style.scale[1];

        for c in text.chars() {
            if self.instances.len() == MAX_OVERLAY_CHARS {
                break;
            }

            if let Some(index) = font::glyph_index(c) {
                if c != ' ' {
                    self.instances.push(GlyphInstance {
                        rect: self.to_clip_rect(pen_x, pen_y, cell_w, cell_h),
                        uv: font::uv_rect(index),
                        color: style.color,
                    });
                }
            }
            pen_x += advance;
        }
    }

    pub fn instances(&self) -> &[GlyphInstance] {
        &self.instances
    }

    fn to_clip_rect(&self, x: f32, y: f32, w: f32, h: f32) -> [f32; 4] {
        [
            x / self.screen_width * 2.0 - 1.0,
            1.0 - y / self.screen_height * 2.0,
            w / self.screen_width * 2.0,
            h / self.screen_height * 2.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> Overlay {
        Overlay::new(800, 600)
    }

    #[test]
    fn emits_one_instance_per_visible_character() {
        let mut overlay = overlay();
        overlay.push_text("FPS: 60", [8.0, 8.0], &TextStyle::default());

        // the space emits nothing; every other character has a glyph
        assert_eq!(overlay.instances().len(), 6);
    }

    #[test]
    fn characters_advance_monotonically() {
        let mut overlay = overlay();
        overlay.push_text("123", [0.0, 0.0], &TextStyle::default());

        let xs: Vec<f32> = overlay.instances().iter().map(|g| g.rect[0]).collect();
        assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn unknown_characters_advance_but_emit_nothing() {
        let mut overlay = overlay();
        overlay.push_text("1Z2", [0.0, 0.0], &TextStyle::default());
        let with_gap: Vec<f32> = overlay.instances().iter().map(|g| g.rect[0]).collect();

        overlay.clear();
        overlay.push_text("12", [0.0, 0.0], &TextStyle::default());
        let adjacent: Vec<f32> = overlay.instances().iter().map(|g| g.rect[0]).collect();

        assert_eq!(with_gap.len(), 2);
        assert!(with_gap[1] > adjacent[1]);
    }

    #[test]
    fn layout_is_clipped_at_the_instance_cap() {
        let mut overlay = overlay();
        let long = "8".repeat(MAX_OVERLAY_CHARS + 50);
        overlay.push_text(&long, [0.0, 0.0], &TextStyle::default());
        assert_eq!(overlay.instances().len(), MAX_OVERLAY_CHARS);
    }

    #[test]
    fn clear_rewrites_from_scratch() {
        let mut overlay = overlay();
        overlay.push_text("99", [0.0, 0.0], &TextStyle::default());
        overlay.clear();
        overlay.push_text("1", [0.0, 0.0], &TextStyle::default());
        assert_eq!(overlay.instances().len(), 1);
    }

    #[test]
    fn top_left_maps_to_clip_space_corner() {
        let overlay = overlay();
        let rect = overlay.to_clip_rect(0.0, 0.0, 800.0, 600.0);
        assert_eq!(rect, [-1.0, 1.0, 2.0, 2.0]);
    }
}
