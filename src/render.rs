//! Overlays detection results onto an image.
//!
//! Every detection gets a randomly colored 3 px box outline and a caption
//! (`label (score)`) in white on a darker plate sitting directly above the
//! box. Detections are drawn in order, so later ones end up on top.

use image::{Rgb, RgbImage};
use imageproc::{drawing, rect::Rect};
use rand::Rng;

use crate::detection::{BoundingBox, Detection};
use crate::font::LabelFont;

/// Outline thickness in pixels, growing inward from the box edges.
pub const STROKE_WIDTH: i32 = 3;

pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Uniformly random color, each channel drawn independently.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb<u8> {
    Rgb([rng.gen(), rng.gen(), rng.gen()])
}

/// Plate color for a box color: every channel halved.
pub const fn darken(color: Rgb<u8>) -> Rgb<u8> {
    let Rgb([r, g, b]) = color;
    Rgb([r / 2, g / 2, b / 2])
}

/// Working copy of the source image plus the font used for captions.
///
/// Owning the buffer means the drawing state goes away with the canvas,
/// whichever way rendering exits.
struct Canvas<'a> {
    image: RgbImage,
    font: &'a LabelFont,
}

impl<'a> Canvas<'a> {
    fn new(image: &RgbImage, font: &'a LabelFont) -> Self {
        Self {
            image: image.clone(),
            font,
        }
    }

    fn draw_detection(&mut self, detection: &Detection, color: Rgb<u8>) {
        self.outline(&detection.bbox, color);
        self.caption(&detection.bbox, &detection.caption(), color);
    }

    fn outline(&mut self, bbox: &BoundingBox, color: Rgb<u8>) {
        for inset in 0..STROKE_WIDTH {
            let shrink = 2 * inset as u32;
            let (width, height) = (bbox.width(), bbox.height());
            if width <= shrink || height <= shrink {
                break;
            }
            let rect = Rect::at(bbox.xmin + inset, bbox.ymin + inset)
                .of_size(width - shrink, height - shrink);
            drawing::draw_hollow_rect_mut(&mut self.image, rect, color);
        }
    }

    fn caption(&mut self, bbox: &BoundingBox, text: &str, color: Rgb<u8>) {
        let (text_width, text_height) = self.font.text_size(text);
        if text_width == 0 || text_height == 0 {
            return;
        }

        let top = bbox.ymin - text_height as i32;
        let plate = Rect::at(bbox.xmin, top).of_size(text_width, text_height);
        drawing::draw_filled_rect_mut(&mut self.image, plate, darken(color));
        self.font
            .draw_text(&mut self.image, TEXT_COLOR, bbox.xmin, top, text);
    }

    fn finish(self) -> RgbImage {
        self.image
    }
}

/// Draws `detections` onto a copy of `image`.
///
/// Colors come from `rng`, one per detection, so a seeded generator gives
/// reproducible output. Coordinates outside the image are clipped.
pub fn render<R: Rng + ?Sized>(
    image: &RgbImage,
    detections: &[Detection],
    font: &LabelFont,
    rng: &mut R,
) -> RgbImage {
    if detections.is_empty() {
        return image.clone();
    }

    let mut canvas = Canvas::new(image, font);
    for detection in detections {
        let color = random_color(rng);
        canvas.draw_detection(detection, color);
    }
    canvas.finish()
}
