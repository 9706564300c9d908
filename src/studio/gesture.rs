// ============================================================================
// GESTURES: drag / resize / rotate state and the maths behind each move
// ============================================================================

use super::transform::{MIN_DIMENSION, Point, Position, Size, Transform, round_half_up};

/// Which resize handle started a resize. Corner handles drive two axes, edge
/// handles one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeHandle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeHandle {
    /// The four handles drawn on the subject's corners.
    pub const CORNERS: [ResizeHandle; 4] = [
        ResizeHandle::NorthWest,
        ResizeHandle::NorthEast,
        ResizeHandle::SouthWest,
        ResizeHandle::SouthEast,
    ];

    pub fn moves_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn moves_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub fn moves_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub fn is_corner(self) -> bool {
        (self.moves_east() || self.moves_west()) && (self.moves_north() || self.moves_south())
    }

    /// Compass code (`"nw"`, `"e"`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::NorthEast => "ne",
            Self::NorthWest => "nw",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code.to_ascii_lowercase().as_str() {
            "n" => Self::North,
            "s" => Self::South,
            "e" => Self::East,
            "w" => Self::West,
            "ne" => Self::NorthEast,
            "nw" => Self::NorthWest,
            "se" => Self::SouthEast,
            "sw" => Self::SouthWest,
            _ => return None,
        })
    }

    /// Handle centre in the subject's local box coordinates.
    pub fn local_anchor(self, width: f64, height: f64) -> Point {
        let x = if self.moves_west() {
            0.0
        } else if self.moves_east() {
            width
        } else {
            width / 2.0
        };
        let y = if self.moves_north() {
            0.0
        } else if self.moves_south() {
            height
        } else {
            height / 2.0
        };
        Point::new(x, y)
    }
}

/// Drag in progress: where the pointer and the box started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
    pub start_pointer: Point,
    pub start_position: Position,
}

impl DragGesture {
    /// New position for the pointer at `pointer`, kept inside `boundary` (when
    /// measured) and rounded to whole pixels.
    pub fn position_at(&self, pointer: Point, size: (u32, u32), boundary: Option<Size>) -> Position {
        let mut x = self.start_position.x as f64 + (pointer.x - self.start_pointer.x);
        let mut y = self.start_position.y as f64 + (pointer.y - self.start_pointer.y);
        if let Some(b) = boundary {
            x = x.min(b.width - size.0 as f64).max(0.0);
            y = y.min(b.height - size.1 as f64).max(0.0);
        }
        Position::new(round_half_up(x) as i32, round_half_up(y) as i32)
    }
}

/// Resize in progress. The aspect ratio is locked at gesture start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeGesture {
    pub handle: ResizeHandle,
    pub start_pointer: Point,
    pub start_width: f64,
    pub start_height: f64,
    pub aspect_ratio: f64,
}

impl ResizeGesture {
    pub fn new(handle: ResizeHandle, start_pointer: Point, transform: &Transform) -> Self {
        Self {
            handle,
            start_pointer,
            start_width: transform.width as f64,
            start_height: transform.height as f64,
            aspect_ratio: transform.aspect_ratio(),
        }
    }

    /// Width and height for the pointer at `pointer`. `viewport` bounds the
    /// largest allowed side at twice its longer dimension.
    pub fn dimensions_at(&self, pointer: Point, viewport: Size) -> (u32, u32) {
        let dx = pointer.x - self.start_pointer.x;
        let dy = pointer.y - self.start_pointer.y;
        let ratio = self.aspect_ratio;
        let degenerate = ratio == 0.0 || !ratio.is_finite();
        let height_for = |w: f64| if degenerate { w } else { w / ratio };
        let width_for = |h: f64| if degenerate { h } else { h * ratio };
        let handle = self.handle;

        let mut new_w = self.start_width;
        let mut new_h = self.start_height;
        if handle.moves_east() {
            new_w = self.start_width + dx;
        }
        if handle.moves_west() {
            new_w = self.start_width - dx;
        }
        if handle.moves_south() {
            new_h = self.start_height + dy;
        }
        if handle.moves_north() {
            new_h = self.start_height - dy;
        }

        // Corners: the axis with the larger delta drives, the other follows
        let width_drives = if handle.is_corner() {
            dx.abs() >= dy.abs()
        } else {
            handle.moves_east() || handle.moves_west()
        };
        if width_drives {
            new_h = height_for(new_w);
        } else {
            new_w = width_for(new_h);
        }

        let min = MIN_DIMENSION as f64;
        let max = viewport.width.max(viewport.height) * 2.0;
        let clamp = |v: f64| v.min(max).max(min);

        let mut w = clamp(new_w);
        let mut h = height_for(w);
        if h < min {
            h = min;
            w = width_for(h);
        } else if h > max {
            h = max;
            w = width_for(h);
        }
        w = clamp(w);
        h = clamp(height_for(w));

        if handle.is_corner() && !degenerate {
            if dx.abs() >= dy.abs() {
                h = w / ratio;
            } else {
                w = h * ratio;
            }
            w = clamp(w);
            h = clamp(h);
        }

        (round_half_up(w) as u32, round_half_up(h) as u32)
    }
}

/// Rotation in progress: centre of the subject and the fixed angular offset
/// between the pointer and the subject's rotation at gesture start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotateGesture {
    pub center: Point,
    pub offset_rad: f64,
}

impl RotateGesture {
    pub fn new(center: Point, start_pointer: Point, start_rotate_deg: f64) -> Self {
        let pointer_angle = (start_pointer.y - center.y).atan2(start_pointer.x - center.x);
        Self {
            center,
            offset_rad: pointer_angle - start_rotate_deg.to_radians(),
        }
    }

    /// Rotation in degrees for the pointer at `pointer`. Not normalised.
    pub fn rotation_at(&self, pointer: Point) -> f64 {
        let angle = (pointer.y - self.center.y).atan2(pointer.x - self.center.x);
        (angle - self.offset_rad).to_degrees()
    }
}

/// What the subject is doing right now. Exactly one gesture can be live, and
/// a download shuts all of them out.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging(DragGesture),
    Resizing(ResizeGesture),
    Rotating(RotateGesture),
    Downloading,
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_downloading(&self) -> bool {
        matches!(self, Self::Downloading)
    }

    /// Whether a pointer gesture currently owns the pointer.
    pub fn is_gesture(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resizing(_) | Self::Rotating(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging(_) => "dragging",
            Self::Resizing(_) => "resizing",
            Self::Rotating(_) => "rotating",
            Self::Downloading => "downloading",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1280.0, 720.0);

    fn gesture(handle: ResizeHandle, w: u32, h: u32) -> ResizeGesture {
        let t = Transform { width: w, height: h, ..Transform::default() };
        ResizeGesture::new(handle, Point::new(0.0, 0.0), &t)
    }

    #[test]
    fn test_resize_locks_the_transform_ratio() {
        assert_eq!(gesture(ResizeHandle::East, 300, 150).aspect_ratio, 2.0);
        assert_eq!(gesture(ResizeHandle::East, 300, 0).aspect_ratio, 1.0);
    }

    #[test]
    fn test_corner_drag_follows_larger_delta() {
        let g = gesture(ResizeHandle::SouthEast, 200, 100);
        assert_eq!(g.dimensions_at(Point::new(40.0, 10.0), VIEWPORT), (240, 120));
    }

    #[test]
    fn test_corner_drag_height_driven() {
        let g = gesture(ResizeHandle::SouthEast, 200, 100);
        assert_eq!(g.dimensions_at(Point::new(5.0, 30.0), VIEWPORT), (260, 130));
    }

    #[test]
    fn test_west_and_north_handles_invert_delta() {
        let g = gesture(ResizeHandle::NorthWest, 200, 100);
        assert_eq!(g.dimensions_at(Point::new(-40.0, 0.0), VIEWPORT), (240, 120));
        let g = gesture(ResizeHandle::North, 200, 100);
        assert_eq!(g.dimensions_at(Point::new(0.0, 20.0), VIEWPORT), (160, 80));
    }

    #[test]
    fn test_edge_handle_keeps_aspect() {
        let g = gesture(ResizeHandle::East, 300, 150);
        assert_eq!(g.dimensions_at(Point::new(-100.0, 999.0), VIEWPORT), (200, 100));
    }

    #[test]
    fn test_shrink_stops_at_minimum_with_aspect() {
        let g = gesture(ResizeHandle::SouthEast, 200, 100);
        let (w, h) = g.dimensions_at(Point::new(-190.0, 0.0), VIEWPORT);
        assert_eq!((w, h), (100, 50));
    }

    #[test]
    fn test_grow_stops_at_viewport_bound() {
        let g = gesture(ResizeHandle::SouthEast, 100, 200);
        let (w, h) = g.dimensions_at(Point::new(0.0, 10_000.0), VIEWPORT);
        assert_eq!(h, 2560);
        assert_eq!(w, 1280);
    }

    #[test]
    fn test_resized_boxes_hold_aspect_and_bounds() {
        let max = 2.0 * 1280.0;
        for &(w, h) in &[(200u32, 100u32), (120, 300), (333, 77), (50, 50)] {
            for handle in ResizeHandle::CORNERS {
                let g = gesture(handle, w, h);
                for step in -30..30 {
                    let p = Point::new(step as f64 * 17.0, step as f64 * -11.0);
                    let (nw, nh) = g.dimensions_at(p, VIEWPORT);
                    assert!(nw as f64 >= MIN_DIMENSION as f64 && nw as f64 <= max);
                    assert!(nh as f64 >= MIN_DIMENSION as f64 && nh as f64 <= max);
                    let ratio = w as f64 / h as f64;
                    // Rounding to whole pixels costs at most half a pixel per side
                    let tolerance = 0.5 / nh as f64 * (1.0 + ratio) + 1e-9;
                    if (nw as f64) > MIN_DIMENSION as f64 && (nh as f64) > MIN_DIMENSION as f64 {
                        assert!((nw as f64 / nh as f64 - ratio).abs() <= tolerance);
                    }
                }
            }
        }
    }

    #[test]
    fn test_degenerate_aspect_treats_sides_equal() {
        let g = ResizeGesture {
            handle: ResizeHandle::East,
            start_pointer: Point::new(0.0, 0.0),
            start_width: 100.0,
            start_height: 0.0,
            aspect_ratio: f64::INFINITY,
        };
        assert_eq!(g.dimensions_at(Point::new(20.0, 0.0), VIEWPORT), (120, 120));
    }

    #[test]
    fn test_rotation_tracks_pointer_angle() {
        let center = Point::new(100.0, 100.0);
        // Grab to the right of centre while already rotated 10 degrees
        let g = RotateGesture::new(center, Point::new(200.0, 100.0), 10.0);
        let r = g.rotation_at(Point::new(100.0, 200.0));
        assert!((r - 100.0).abs() < 1e-9);
        let r = g.rotation_at(Point::new(200.0, 100.0));
        assert!((r - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_is_not_wrapped() {
        let g = RotateGesture::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 350.0);
        let r = g.rotation_at(Point::new(0.0, 1.0));
        assert!((r - 440.0).abs() < 1e-9 || (r - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_drag_clamps_to_boundary() {
        let g = DragGesture {
            start_pointer: Point::new(10.0, 10.0),
            start_position: Position::new(100, 100),
        };
        let b = Some(Size::square(500.0));
        assert_eq!(g.position_at(Point::new(30.4, 5.6), (300, 150), b), Position::new(120, 96));
        assert_eq!(g.position_at(Point::new(900.0, 900.0), (300, 150), b), Position::new(200, 350));
        assert_eq!(g.position_at(Point::new(-900.0, -900.0), (300, 150), b), Position::new(0, 0));
        // Wider than the boundary: pinned at the left edge
        assert_eq!(g.position_at(Point::new(50.0, 10.0), (600, 150), b), Position::new(0, 100));
    }

    #[test]
    fn test_handle_codes_round_trip() {
        for code in ["n", "s", "e", "w", "ne", "nw", "se", "sw"] {
            assert_eq!(ResizeHandle::from_code(code).map(|h| h.code()), Some(code));
        }
        assert!(ResizeHandle::from_code("x").is_none());
        assert!(ResizeHandle::SouthWest.is_corner());
        assert!(!ResizeHandle::West.is_corner());
    }
}
