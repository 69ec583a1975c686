use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{ImageBuffer, Rgb};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::detection::domain::backend_kind::BackendKind;
use crate::pipeline::diagnostics::DiagnosticsSink;
use crate::shared::asset_resolver;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{LABEL_FONT_NAME, LABEL_FONT_URL};
use crate::shared::frame::Frame;

const FONT_SIZE: f32 = 18.0;
const LABEL_PADDING: i32 = 3;
const LABEL_BG: [u8; 3] = [0, 0, 0];
const LABEL_TEXT: [u8; 3] = [255, 255, 255];

/// Fixed rectangle color per backend; a glance at a recording tells
/// which detector produced it.
pub fn backend_color(kind: BackendKind) -> [u8; 3] {
    match kind {
        BackendKind::Haar => [46, 204, 113],      // green
        BackendKind::DnnPerson => [230, 126, 34], // orange
        BackendKind::MediaPipe => [52, 152, 219], // blue
    }
}

/// Draws detection rectangles and emotion labels onto frames.
///
/// Mutates in place: by the time a frame reaches annotation it is the
/// pipeline's own working copy. Without a font the annotator degrades to
/// rectangles only.
pub struct FrameAnnotator {
    font: Option<FontVec>,
}

impl FrameAnnotator {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// Resolve the label font through the asset cache; on failure warn
    /// once and fall back to boxes-only annotation.
    pub fn with_resolved_font(
        bundled_dir: Option<&Path>,
        sink: &mut dyn DiagnosticsSink,
    ) -> Self {
        match load_font(bundled_dir) {
            Ok(font) => Self::new(Some(font)),
            Err(err) => {
                sink.warning(&format!(
                    "label font unavailable ({err}), drawing boxes without labels"
                ));
                Self::new(None)
            }
        }
    }

    /// Draw one detection: rectangle at `bbox` in the backend color,
    /// label text above it over a filled background.
    pub fn draw(
        &self,
        frame: &mut Frame,
        bbox: &BoundingBox,
        label: &str,
        confidence: f64,
        backend: BackendKind,
    ) {
        if frame.is_empty() {
            return;
        }
        let (fw, fh) = (frame.width(), frame.height());
        let bbox = bbox.clip(fw, fh);
        let color = Rgb(backend_color(backend));

        let mut canvas: ImageBuffer<Rgb<u8>, &mut [u8]> =
            ImageBuffer::from_raw(fw, fh, frame.data_mut())
                .expect("Frame data length must match dimensions");

        // Rectangle, inset ring per thickness step
        let thickness = thickness_for(&bbox);
        for i in 0..thickness {
            let w = bbox.width - 2 * i;
            let h = bbox.height - 2 * i;
            if w < 1 || h < 1 {
                break;
            }
            let rect = Rect::at(bbox.x + i, bbox.y + i).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }

        let Some(ref font) = self.font else {
            return;
        };

        let text = format!("{label} {confidence:.2}");
        let scale = PxScale::from(FONT_SIZE);
        let (text_w, text_h) = text_size(scale, font, &text);
        let bg_w = text_w as i32 + 2 * LABEL_PADDING;
        let bg_h = text_h as i32 + 2 * LABEL_PADDING;
        let (lx, ly) = label_anchor(bg_w, bg_h, &bbox, fw, fh);

        let bg = Rect::at(lx, ly).of_size(bg_w.min(fw as i32 - lx).max(1) as u32, bg_h as u32);
        draw_filled_rect_mut(&mut canvas, bg, Rgb(LABEL_BG));
        draw_text_mut(
            &mut canvas,
            Rgb(LABEL_TEXT),
            lx + LABEL_PADDING,
            ly + LABEL_PADDING,
            scale,
            font,
            &text,
        );
    }
}

/// Rectangle thickness scaled to box size: hairlines vanish on large
/// boxes, thick strokes swallow small ones.
fn thickness_for(bbox: &BoundingBox) -> i32 {
    (bbox.width.min(bbox.height) / 64).clamp(2, 6)
}

/// Top-left corner of the label background: immediately above the box,
/// clamped so the label never leaves the frame (boxes touching the top
/// edge push their label down inside the frame instead).
fn label_anchor(bg_w: i32, bg_h: i32, bbox: &BoundingBox, frame_w: u32, frame_h: u32) -> (i32, i32) {
    let max_x = (frame_w as i32 - bg_w).max(0);
    let x = bbox.x.clamp(0, max_x);
    let max_y = (frame_h as i32 - bg_h).max(0);
    let y = (bbox.y - bg_h).clamp(0, max_y);
    (x, y)
}

fn load_font(bundled_dir: Option<&Path>) -> Result<FontVec, Box<dyn std::error::Error>> {
    let path = asset_resolver::resolve(LABEL_FONT_NAME, LABEL_FONT_URL, bundled_dir, None)?;
    let bytes = std::fs::read(path)?;
    Ok(FontVec::try_from_vec(bytes)?)
}
