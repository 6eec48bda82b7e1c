//! Overlay rendering.
//!
//! Draws detected text polygons and confidence labels onto a copy of the
//! source image. Rendering is a best-effort consumer: a block without a
//! full polygon is skipped, a missing font degrades the label, and a
//! rendering failure never disturbs the text or JSON outputs.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use thiserror::Error;
use tracing::{debug, warn};

use crate::normalize::{Point, TextBlock};

const OUTLINE: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_TEXT: Rgb<u8> = Rgb([0, 0, 0]);
const LABEL_BACKGROUND: Rgb<u8> = Rgb([255, 255, 0]);

/// Vertical gap between a polygon's first point and its label.
const LABEL_OFFSET: i32 = 20;
const LABEL_SCALE: f32 = 16.0;

/// Common system font locations tried when no font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Overlay rendering errors, surfaced to the renderer's caller only.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read source image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to save annotated image {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Draws polygon outlines and confidence labels onto image copies.
pub struct OverlayRenderer {
    font: Option<FontVec>,
}

impl OverlayRenderer {
    /// Create a renderer, resolving the label font from the configured path
    /// first and common system locations after. Without any font the
    /// renderer still works but draws outlines only.
    pub fn new(font_path: Option<&Path>) -> Self {
        let font = font_path
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from))
            .find_map(|path| load_font(&path));

        if font.is_none() {
            warn!("no label font available; overlays will carry outlines only");
        }

        Self { font }
    }

    /// Annotate a copy of the source image with every block's polygon and
    /// label, then save it to `destination`. The source is never modified.
    /// Blocks with fewer than four polygon points are skipped.
    pub fn render(
        &self,
        source: &Path,
        blocks: &[TextBlock],
        destination: &Path,
    ) -> Result<(), RenderError> {
        let image = image::open(source).map_err(|source_err| RenderError::Load {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let mut canvas = image.to_rgb8();

        for block in blocks {
            if block.polygon.len() < 4 {
                debug!("skipping block without a full polygon: {:?}", block.text);
                continue;
            }
            draw_outline(&mut canvas, &block.polygon);
            self.draw_label(&mut canvas, block);
        }

        canvas.save(destination).map_err(|source_err| RenderError::Save {
            path: destination.to_path_buf(),
            source: source_err,
        })
    }

    /// Draw `"{text} ({confidence:.2})"` above the polygon's first point:
    /// black text on a yellow background when the label box can be measured,
    /// plain red text when the measurement is degenerate, nothing without a
    /// font.
    fn draw_label(&self, canvas: &mut RgbImage, block: &TextBlock) {
        let Some(font) = &self.font else {
            return;
        };

        let label = format!("{} ({:.2})", block.text, block.confidence);
        let (anchor_x, anchor_y) = block.polygon[0];
        let x = anchor_x;
        let y = anchor_y - LABEL_OFFSET;
        let scale = PxScale::from(LABEL_SCALE);

        let (width, height) = text_size(scale, font, &label);
        if width > 0 && height > 0 {
            let background = Rect::at(x - 1, y - 1).of_size(width + 2, height + 2);
            draw_filled_rect_mut(canvas, background, LABEL_BACKGROUND);
            draw_hollow_rect_mut(canvas, background, OUTLINE);
            draw_text_mut(canvas, LABEL_TEXT, x, y, scale, font, &label);
        } else {
            draw_text_mut(canvas, OUTLINE, x, y, scale, font, &label);
        }
    }
}

/// Draw the closed polygon outline, two pixels wide.
fn draw_outline(canvas: &mut RgbImage, polygon: &[Point]) {
    for index in 0..polygon.len() {
        let (x1, y1) = polygon[index];
        let (x2, y2) = polygon[(index + 1) % polygon.len()];
        for offset in 0..2 {
            let shift = offset as f32;
            draw_line_segment_mut(
                canvas,
                (x1 as f32 + shift, y1 as f32 + shift),
                (x2 as f32 + shift, y2 as f32 + shift),
                OUTLINE,
            );
        }
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let bytes = std::fs::read(path).ok()?;
    let font = FontVec::try_from_vec(bytes).ok()?;
    debug!(path = %path.display(), "loaded overlay label font");
    Some(font)
}
