// ============================================================================
// TRANSFORM STATE: subject size / rotation / zoom / placement
// ============================================================================

/// Smallest width or height the subject box may take, in pixels.
pub const MIN_DIMENSION: u32 = 50;
/// Box size used when the frame boundary cannot be measured.
pub const DEFAULT_DIMENSION: u32 = 200;
/// Lower zoom bound.
pub const MIN_SCALE: f64 = 0.1;
/// Upper zoom bound.
pub const MAX_SCALE: f64 = 10.0;
/// Zoom change per discrete step (button press or wheel notch).
pub const ZOOM_STEP: f64 = 0.1;
/// Above this zoom the preview switches from nearest to smooth sampling.
pub const SMOOTH_PREVIEW_SCALE: f64 = 1.5;

/// A point in frame-boundary space (pixels from the boundary's top-left).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A measured extent (frame boundary content box, viewport, ...).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub const fn square(side: f64) -> Self {
        Self { width: side, height: side }
    }
}

/// Top-left of the subject box, relative to the frame boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Direction of a discrete zoom step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Live, editable subject transform.
///
/// `width`/`height` are the un-transformed box size; `rotate` (degrees, any
/// real value) and `scale` are applied on top of it around the box centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub width: u32,
    pub height: u32,
    pub rotate: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            rotate: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Apply one zoom step, clamped to `[MIN_SCALE, MAX_SCALE]` and rounded to
    /// two decimals so repeated steps never accumulate float drift.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let delta = match direction {
            ZoomDirection::In => ZOOM_STEP,
            ZoomDirection::Out => -ZOOM_STEP,
        };
        let next = (self.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
        self.scale = (next * 100.0).round() / 100.0;
    }

    /// Width over height, or 1 when either side is zero.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    pub fn rotation_radians(&self) -> f64 {
        self.rotate.to_radians()
    }

    /// Whether the on-screen preview should be sampled smoothly.
    pub fn smooth_preview(&self) -> bool {
        self.scale > SMOOTH_PREVIEW_SCALE
    }

    /// Centre of the subject box for a given top-left position.
    pub fn center(&self, position: Position) -> Point {
        Point::new(
            position.x as f64 + self.width as f64 / 2.0,
            position.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Map a boundary-space point into the subject's local box coordinates
    /// (origin at the box's top-left, before rotation and zoom).
    pub fn to_local(&self, position: Position, point: Point) -> Point {
        let center = self.center(position);
        let (sin, cos) = self.rotation_radians().sin_cos();
        let dx = point.x - center.x;
        let dy = point.y - center.y;
        let inv_scale = if self.scale.abs() > 1e-9 { 1.0 / self.scale } else { 1.0 };
        let lx = (dx * cos + dy * sin) * inv_scale;
        let ly = (-dx * sin + dy * cos) * inv_scale;
        Point::new(lx + self.width as f64 / 2.0, ly + self.height as f64 / 2.0)
    }

    /// Map a local box coordinate back into boundary space.
    pub fn to_boundary(&self, position: Position, local: Point) -> Point {
        let center = self.center(position);
        let (sin, cos) = self.rotation_radians().sin_cos();
        let lx = (local.x - self.width as f64 / 2.0) * self.scale;
        let ly = (local.y - self.height as f64 / 2.0) * self.scale;
        Point::new(center.x + lx * cos - ly * sin, center.y + lx * sin + ly * cos)
    }

    /// Hit test against the rotated, zoomed subject box.
    pub fn contains(&self, position: Position, point: Point) -> bool {
        let local = self.to_local(position, point);
        local.x >= 0.0
            && local.y >= 0.0
            && local.x <= self.width as f64
            && local.y <= self.height as f64
    }
}

/// Immutable copy of the placement taken when the view is locked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedSnapshot {
    pub position: Position,
    pub transform: Transform,
}

/// Round half toward positive infinity, the rounding every pixel value in the
/// studio goes through (`-2.5` becomes `-2`, `2.5` becomes `3`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
