// ============================================================================
// INITIAL FIT: size and centre a freshly decoded subject in the boundary
// ============================================================================

use super::transform::{
    DEFAULT_DIMENSION, MIN_DIMENSION, Position, Size, Transform, round_half_up,
};

/// Fraction of the boundary content box the subject initially fills.
pub const INITIAL_SCALE_FACTOR: f64 = 0.6;

/// Compute the starting transform and position for a subject of natural size
/// `natural_w`×`natural_h`.
///
/// With a measurable `boundary` the image is contained in a box
/// `INITIAL_SCALE_FACTOR` times the boundary and centred in it. Without one the
/// shorter side gets `DEFAULT_DIMENSION` and the box sits at the origin.
pub fn fit_subject(natural_w: u32, natural_h: u32, boundary: Option<Size>) -> (Transform, Position) {
    let (w, h) = (natural_w as f64, natural_h as f64);
    let aspect = if w > 0.0 && h > 0.0 { w / h } else { 1.0 };

    let (mut fit_w, mut fit_h) = match boundary {
        Some(b) => {
            let target_w = b.width * INITIAL_SCALE_FACTOR;
            let target_h = b.height * INITIAL_SCALE_FACTOR;
            // Compare image aspect to target aspect to find the binding side
            if w / h > target_w / target_h {
                (target_w, target_w / aspect)
            } else {
                (target_h * aspect, target_h)
            }
        }
        None => {
            let d = DEFAULT_DIMENSION as f64;
            if aspect > 1.0 { (d * aspect, d) } else { (d, d / aspect) }
        }
    };

    let min = MIN_DIMENSION as f64;
    if fit_w < min || fit_h < min {
        if aspect >= 1.0 {
            fit_w = fit_w.max(min);
            fit_h = fit_w / aspect;
            if fit_h < min {
                fit_h = min;
                fit_w = fit_h * aspect;
            }
        } else {
            fit_h = fit_h.max(min);
            fit_w = fit_h * aspect;
            if fit_w < min {
                fit_w = min;
                fit_h = fit_w / aspect;
            }
        }
    }

    let width = round_half_up(fit_w.max(min)) as u32;
    let height = round_half_up(fit_h.max(min)) as u32;

    let position = match boundary {
        Some(b) => Position::new(
            round_half_up((b.width - width as f64) / 2.0) as i32,
            round_half_up((b.height - height as f64) / 2.0) as i32,
        ),
        None => Position::default(),
    };

    (
        Transform {
            width,
            height,
            rotate: 0.0,
            scale: 1.0,
        },
        position,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_photo_binds_on_width() {
        let (t, pos) = fit_subject(400, 200, Some(Size::square(500.0)));
        assert_eq!((t.width, t.height), (300, 150));
        assert_eq!(pos, Position::new(100, 175));
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.rotate, 0.0);
    }

    #[test]
    fn test_tall_photo_binds_on_height() {
        let (t, pos) = fit_subject(300, 600, Some(Size::square(500.0)));
        assert_eq!((t.width, t.height), (150, 300));
        assert_eq!(pos, Position::new(175, 100));
    }

    #[test]
    fn test_non_square_boundary() {
        let (t, pos) = fit_subject(1000, 1000, Some(Size::new(450.0, 350.0)));
        assert_eq!((t.width, t.height), (210, 210));
        assert_eq!(pos, Position::new(120, 70));
    }

    #[test]
    fn test_extreme_panorama_respects_minimum() {
        // 0.6 * 350 = 210 wide gives a 21 px tall strip; clamp lifts the height
        let (t, _) = fit_subject(1000, 100, Some(Size::square(350.0)));
        assert_eq!(t.height, MIN_DIMENSION);
        assert_eq!(t.width, 500);
    }

    #[test]
    fn test_extreme_portrait_respects_minimum() {
        let (t, _) = fit_subject(10, 200, Some(Size::square(350.0)));
        assert_eq!(t.width, MIN_DIMENSION);
        assert_eq!(t.height, 1000);
    }

    #[test]
    fn test_unmeasured_boundary_uses_default_box() {
        let (t, pos) = fit_subject(400, 200, None);
        assert_eq!((t.width, t.height), (400, 200));
        assert_eq!(pos, Position::default());

        let (t, _) = fit_subject(200, 400, None);
        assert_eq!((t.width, t.height), (200, 400));
    }

    #[test]
    fn test_tiny_boundary_keeps_minimum_on_both_sides() {
        let (t, _) = fit_subject(64, 64, Some(Size::square(40.0)));
        assert!(t.width >= MIN_DIMENSION && t.height >= MIN_DIMENSION);
    }
}
