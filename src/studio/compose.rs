// ============================================================================
// COMPOSITION RASTERIZER: frame over transformed subject, CPU, row-parallel
// ============================================================================

use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use super::transform::{Position, Size, Transform};

/// Output resolution multiplier relative to the on-screen boundary.
pub const EXPORT_SCALE: f64 = 2.0;

/// Largest side of the exported image; guards against absurd boundaries.
const MAX_OUTPUT_DIM: u32 = 16_384;

/// Where an image lands inside a box when contained (scaled to fit, centred).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Contain an `img_w`×`img_h` image in a `box_w`×`box_h` box.
pub fn contain(img_w: u32, img_h: u32, box_w: f64, box_h: f64) -> ContainRect {
    if img_w == 0 || img_h == 0 {
        return ContainRect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
    }
    let s = (box_w / img_w as f64).min(box_h / img_h as f64);
    let width = img_w as f64 * s;
    let height = img_h as f64 * s;
    ContainRect {
        x: (box_w - width) / 2.0,
        y: (box_h - height) / 2.0,
        width,
        height,
    }
}

/// An image placed in some coordinate space, premultiplied and downsampled
/// ahead of time to roughly the pixel footprint it will cover so bilinear
/// sampling neither aliases nor bleeds transparent black into edges.
struct PlacedSource {
    pixels: RgbaImage,
    rect: ContainRect,
    /// Source pixels per placement-space unit.
    density_x: f64,
    density_y: f64,
    /// Placement-space width of one output pixel, for edge coverage.
    pixel_span: f64,
}

impl PlacedSource {
    fn new(src: &RgbaImage, rect: ContainRect, footprint_scale: f64) -> Self {
        let premultiplied = premultiply(src);
        let target_w = (rect.width * footprint_scale).ceil().max(1.0) as u32;
        let target_h = (rect.height * footprint_scale).ceil().max(1.0) as u32;
        let pixels = if target_w < src.width() && target_h < src.height() {
            imageops::resize(&premultiplied, target_w, target_h, imageops::FilterType::Triangle)
        } else {
            premultiplied
        };
        let density_x = if rect.width > 0.0 { pixels.width() as f64 / rect.width } else { 0.0 };
        let density_y = if rect.height > 0.0 { pixels.height() as f64 / rect.height } else { 0.0 };
        let pixel_span = if footprint_scale > 0.0 { 1.0 / footprint_scale } else { 0.0 };
        Self { pixels, rect, density_x, density_y, pixel_span }
    }

    /// Premultiplied sample at a point in placement space. Alpha fades over
    /// one output pixel across the rect border; transparent beyond it.
    fn sample(&self, x: f64, y: f64) -> [f32; 4] {
        let qx = x - self.rect.x;
        let qy = y - self.rect.y;
        let coverage = edge_coverage(qx, self.rect.width, self.pixel_span)
            * edge_coverage(qy, self.rect.height, self.pixel_span);
        if coverage <= 0.0 {
            return [0.0; 4];
        }
        let mut px = bilinear_sample(
            &self.pixels,
            (qx * self.density_x - 0.5) as f32,
            (qy * self.density_y - 0.5) as f32,
        );
        if coverage < 1.0 {
            for c in px.iter_mut() {
                *c *= coverage as f32;
            }
        }
        px
    }
}

/// Fraction of an output pixel centred at `q` that lies within `[0, extent)`.
fn edge_coverage(q: f64, extent: f64, pixel_span: f64) -> f64 {
    if pixel_span <= 0.0 {
        return if q >= 0.0 && q < extent { 1.0 } else { 0.0 };
    }
    let inside = q.min(extent - q);
    (inside / pixel_span + 0.5).clamp(0.0, 1.0)
}

/// Copy of `src` with colour channels scaled by alpha.
fn premultiply(src: &RgbaImage) -> RgbaImage {
    let mut out = src.clone();
    for p in out.pixels_mut() {
        let a = p[3] as u32;
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            p[c] = ((p[c] as u32 * a + 127) / 255) as u8;
        }
    }
    out
}

/// Render the boundary at `scale`× with the subject placed by `position` and
/// `transform`, the frame contained on top, and a transparent background.
pub fn render(
    frame: &RgbaImage,
    subject: &RgbaImage,
    boundary: Size,
    position: Position,
    transform: &Transform,
    scale: f64,
) -> Result<RgbaImage, String> {
    let out_w = (boundary.width * scale).round();
    let out_h = (boundary.height * scale).round();
    if !(out_w >= 1.0 && out_h >= 1.0) {
        return Err(format!(
            "boundary {}x{} has no drawable area",
            boundary.width, boundary.height
        ));
    }
    if out_w > MAX_OUTPUT_DIM as f64 || out_h > MAX_OUTPUT_DIM as f64 {
        return Err(format!(
            "output {}x{} exceeds the {} px limit",
            out_w, out_h, MAX_OUTPUT_DIM
        ));
    }
    let (out_w, out_h) = (out_w as u32, out_h as u32);

    let frame_layer = PlacedSource::new(
        frame,
        contain(frame.width(), frame.height(), boundary.width, boundary.height),
        scale,
    );
    let box_w = transform.width as f64;
    let box_h = transform.height as f64;
    let subject_layer = PlacedSource::new(
        subject,
        contain(subject.width(), subject.height(), box_w, box_h),
        scale * transform.scale.abs(),
    );

    let center = transform.center(position);
    let (sin, cos) = transform.rotation_radians().sin_cos();
    let inv_zoom = if transform.scale.abs() > 1e-9 { 1.0 / transform.scale } else { 1.0 };

    let mut dst = RgbaImage::new(out_w, out_h);
    let row_bytes = out_w as usize * 4;
    dst.as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(oy, row)| {
            let by = (oy as f64 + 0.5) / scale;
            let dy = by - center.y;
            for ox in 0..out_w as usize {
                let bx = (ox as f64 + 0.5) / scale;
                let dx = bx - center.x;
                // Undo rotation then zoom about the subject centre
                let lx = (dx * cos + dy * sin) * inv_zoom + box_w / 2.0;
                let ly = (-dx * sin + dy * cos) * inv_zoom + box_h / 2.0;
                let under = subject_layer.sample(lx, ly);
                let over = frame_layer.sample(bx, by);
                let px = source_over(over, under);
                row[ox * 4..ox * 4 + 4].copy_from_slice(&px.0);
            }
        });
    Ok(dst)
}

/// Porter-Duff source-over on premultiplied layers, un-premultiplied into a
/// straight-alpha output pixel.
fn source_over(src: [f32; 4], dst: [f32; 4]) -> Rgba<u8> {
    let keep = 1.0 - src[3] / 255.0;
    let out_a = src[3] + dst[3] * keep;
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let premultiplied = src[c] + dst[c] * keep;
        out[c] = (premultiplied * 255.0 / out_a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = out_a.round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Bilinear interpolation sampling from an RgbaImage, edge-clamped.
fn bilinear_sample(img: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let (w, h) = (img.width() as i32, img.height() as i32);

    // Clamp to the edge so contained images keep solid borders
    let sample = |sx: i32, sy: i32| -> [f32; 4] {
        let p = img.get_pixel(sx.clamp(0, w - 1) as u32, sy.clamp(0, h - 1) as u32);
        [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = lerp(tl[c], tr[c], fx);
        let bot = lerp(bl[c], br[c], fx);
        out[c] = lerp(top, bot, fy);
    }
    out
}
