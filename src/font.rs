use std::path::Path;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, Rect as GlyphRect, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};
use imageproc::{drawing, rect::Rect};

/// Edge length of a built-in glyph before scaling.
const GLYPH_SIZE: u32 = 8;

/// Font used to caption detections.
#[derive(Clone)]
pub enum LabelFont {
    TrueType { font: FontArc, scale: PxScale },
    /// 8x8 bitmap font compiled into the binary, magnified by an integer factor.
    Builtin { scale: u32 },
}

/// Outcome of resolving the configured font.
///
/// The renderer accepts either variant; the distinction exists so the caller
/// can report that the fallback is in use.
pub enum FontLoad {
    Loaded(LabelFont),
    Fallback { font: LabelFont, reason: String },
}

impl FontLoad {
    pub const fn is_fallback(&self) -> bool {
        matches!(self, FontLoad::Fallback { .. })
    }

    pub fn into_font(self) -> LabelFont {
        match self {
            FontLoad::Loaded(font) | FontLoad::Fallback { font, .. } => font,
        }
    }
}

impl LabelFont {
    /// Loads a TrueType/OpenType font from `path`, falling back to the
    /// built-in bitmap font on any failure.
    pub fn load(path: &Path, size: f32) -> FontLoad {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return FontLoad::Fallback {
                    font: Self::builtin(size),
                    reason: format!("cannot read {}: {}", path.display(), e),
                }
            }
        };

        match FontArc::try_from_vec(bytes) {
            Ok(font) => FontLoad::Loaded(LabelFont::TrueType {
                font,
                scale: PxScale::from(size),
            }),
            Err(e) => FontLoad::Fallback {
                font: Self::builtin(size),
                reason: format!("unsupported font {}: {}", path.display(), e),
            },
        }
    }

    /// Built-in font sized as close to `size` pixels as integer magnification allows.
    pub fn builtin(size: f32) -> Self {
        let scale = (size / GLYPH_SIZE as f32).round().max(1.0) as u32;
        LabelFont::Builtin { scale }
    }

    /// `(width, height)` of the pixels `draw_text` covers for `text`.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        match self {
            LabelFont::TrueType { font, scale } => match ink_bounds(font, *scale, text) {
                Some(bounds) => (bounds.width() as u32, bounds.height() as u32),
                None => (0, 0),
            },
            LabelFont::Builtin { scale } => {
                let glyph = GLYPH_SIZE * scale;
                (text.chars().count() as u32 * glyph, glyph)
            }
        }
    }

    /// Draws `text` so its ink starts at `(x, y)`, clipping at the image edges.
    pub fn draw_text(&self, image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            LabelFont::TrueType { font, scale } => {
                // imageproc anchors the layout at the ascent line, not at the ink
                let Some(bounds) = ink_bounds(font, *scale, text) else {
                    return;
                };
                let origin_x = x - bounds.min.x as i32;
                let origin_y = y - bounds.min.y as i32;
                drawing::draw_text_mut(image, color, origin_x, origin_y, *scale, font, text)
            }
            LabelFont::Builtin { scale } => draw_bitmap_text(image, color, x, y, *scale, text),
        }
    }
}

/// Union of the glyph pixel bounds, laid out the way `imageproc` draws them.
fn ink_bounds(font: &FontArc, scale: PxScale, text: &str) -> Option<GlyphRect> {
    let scaled = font.as_scaled(scale);
    let mut caret = 0.0f32;
    let mut last: Option<GlyphId> = None;
    let mut bounds: Option<GlyphRect> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        let Some(outlined) = scaled.outline_glyph(glyph) else {
            continue;
        };
        if let Some(last) = last {
            caret += scaled.kern(id, last);
        }
        last = Some(id);

        let px = outlined.px_bounds();
        bounds = Some(match bounds {
            None => px,
            Some(b) => GlyphRect {
                min: point(b.min.x.min(px.min.x), b.min.y.min(px.min.y)),
                max: point(b.max.x.max(px.max.x), b.max.y.max(px.max.y)),
            },
        });
    }

    bounds.filter(|b| b.width() > 0.0 && b.height() > 0.0)
}

fn draw_bitmap_text(image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let advance = (GLYPH_SIZE * scale) as i32;

    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or([0; 8]);
        let origin_x = x + i as i32 * advance;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // bit 0 is the leftmost pixel
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + (col * scale) as i32;
                let py = y + (row as u32 * scale) as i32;
                drawing::draw_filled_rect_mut(
                    image,
                    Rect::at(px, py).of_size(scale, scale),
                    color,
                );
            }
        }
    }
}
