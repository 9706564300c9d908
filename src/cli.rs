// ============================================================================
// PhotoStudio CLI: headless framing via command-line arguments
// ============================================================================
//
// Usage examples:
//   PhotoStudio --frame frame.png --photo me.jpg
//   PhotoStudio -f frame.png -p me.jpg --drag 20,-15 --zoom 3 -o out.png
//   PhotoStudio -f frame.png -p me.jpg --resize se:40,10 --rotate -12.5
//
// No window is opened. Gestures are replayed through the same handlers the
// desktop UI uses, then the view is locked and exported at 2x.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{load_image_sync, write_png};
use crate::studio::{
    AssetRole, EXPORT_FILENAME, Point, ResizeHandle, Size, Studio, StudioError, ZoomDirection,
};
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Zoom Photo Studio headless compositor.
///
/// Places a photo inside a decorative frame and writes the framed PNG.
#[derive(Parser, Debug)]
#[command(
    name = "photostudio",
    about = "Zoom Photo Studio headless compositor",
    long_about = "Fit a photo inside a decorative frame, optionally move, resize,\n\
                  rotate and zoom it, then export the composition as a PNG at\n\
                  twice the frame boundary's size.\n\n\
                  Example:\n  \
                  photostudio --frame frame.png --photo me.jpg --zoom 2 -o framed.png"
)]
pub struct CliArgs {
    /// Decorative frame image, drawn on top.
    #[arg(short, long, value_name = "IMAGE")]
    pub frame: PathBuf,

    /// Photo placed underneath the frame.
    #[arg(short, long, value_name = "IMAGE")]
    pub photo: PathBuf,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE", default_value = EXPORT_FILENAME)]
    pub output: PathBuf,

    /// Side of the square frame boundary in pixels (export is twice this).
    #[arg(short, long, default_value_t = 500.0, value_name = "PX")]
    pub boundary: f64,

    /// Viewport size that bounds resizing (largest side is 2x its longer edge).
    #[arg(long, default_value = "1280x720", value_name = "WxH", value_parser = parse_viewport)]
    pub viewport: Size,

    /// Move the photo by DX,DY pixels (kept inside the boundary).
    #[arg(long, value_name = "DX,DY", value_parser = parse_offset, allow_hyphen_values = true)]
    pub drag: Option<(f64, f64)>,

    /// Drag a resize handle (n, s, e, w, ne, nw, se, sw) by DX,DY pixels.
    #[arg(long, value_name = "HANDLE:DX,DY", value_parser = parse_resize, allow_hyphen_values = true)]
    pub resize: Option<(ResizeHandle, (f64, f64))>,

    /// Rotate the photo by DEG degrees (clockwise on screen).
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    pub rotate: Option<f64>,

    /// Zoom steps of 0.1; negative values zoom out.
    #[arg(short, long, default_value_t = 0, value_name = "STEPS", allow_hyphen_values = true)]
    pub zoom: i32,

    /// Print the placement and timing.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating a window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| {
            a == "--frame" || a == "-f" || a == "--photo" || a == "-p" || a == "--help" || a == "-h"
        })
    }
}

fn parse_offset(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{}'", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad DX '{}': {}", x, e))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad DY '{}': {}", y, e))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("offset '{}' is not finite", s));
    }
    Ok((x, y))
}

fn parse_resize(s: &str) -> Result<(ResizeHandle, (f64, f64)), String> {
    let (handle, offset) = s
        .split_once(':')
        .ok_or_else(|| format!("expected HANDLE:DX,DY, got '{}'", s))?;
    let handle = ResizeHandle::from_code(handle.trim())
        .ok_or_else(|| format!("unknown handle '{}' (use n, s, e, w, ne, nw, se, sw)", handle))?;
    Ok((handle, parse_offset(offset)?))
}

fn parse_viewport(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w = w.trim().parse::<f64>().map_err(|e| format!("bad width '{}': {}", w, e))?;
    let h = h.trim().parse::<f64>().map_err(|e| format!("bad height '{}': {}", h, e))?;
    if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
        return Err(format!("viewport '{}' must be positive", s));
    }
    Ok(Size::new(w, h))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the headless compositor and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    let start = Instant::now();
    match compose(&args) {
        Ok(studio) => {
            if args.verbose {
                let saved = studio.display_placement();
                println!(
                    "photo box {}x{} at ({}, {}), rotate {:.2} deg, zoom {:.2}",
                    saved.transform.width,
                    saved.transform.height,
                    saved.position.x,
                    saved.position.y,
                    saved.transform.rotate,
                    saved.transform.scale
                );
                println!(
                    "  → {} ({:.0}ms)",
                    args.output.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_err!("CLI export failed: {:?}", e);
            eprintln!("error: {}", e);
            if let StudioError::Read { message, .. } | StudioError::Decode { message, .. } = &e {
                eprintln!("  {}", message);
            }
            ExitCode::FAILURE
        }
    }
}

/// Load, place, lock and export. Returns the studio for reporting.
pub fn compose(args: &CliArgs) -> Result<Studio, StudioError> {
    if !(args.boundary.is_finite() && args.boundary >= 1.0) {
        return Err(StudioError::BoundaryUnavailable);
    }

    let mut studio = Studio::new();
    studio.set_boundary(Some(Size::square(args.boundary)));
    studio.set_viewport(args.viewport);

    let frame = load_image_sync(&args.frame, AssetRole::Frame);
    studio.apply_decoded(AssetRole::Frame, frame)?;
    let photo = load_image_sync(&args.photo, AssetRole::Subject);
    studio.apply_decoded(AssetRole::Subject, photo)?;

    replay_gestures(&mut studio, args);

    studio.toggle_lock()?;
    let output = args.output.clone();
    studio.export(|image| {
        write_png(&image, &output)?;
        Ok(())
    })?;
    log_info!("CLI export written to {}", args.output.display());
    Ok(studio)
}

/// Drive the requested gestures through the studio's pointer handlers.
fn replay_gestures(studio: &mut Studio, args: &CliArgs) {
    if let Some((handle, (dx, dy))) = args.resize {
        let t = *studio.transform();
        let local = handle.local_anchor(t.width as f64, t.height as f64);
        let grab = t.to_boundary(studio.position(), local);
        if studio.begin_resize(handle, grab) {
            studio.pointer_moved(Point::new(grab.x + dx, grab.y + dy));
            studio.end_gesture();
        }
    }

    if let Some(degrees) = args.rotate {
        let center = studio.transform().center(studio.position());
        let start = studio.transform().rotation_radians();
        // Grab a point on the current rotation's ray and sweep it by `degrees`
        let grab = Point::new(center.x + 100.0 * start.cos(), center.y + 100.0 * start.sin());
        let end = start + degrees.to_radians();
        if studio.begin_rotate(grab) {
            studio.pointer_moved(Point::new(center.x + 100.0 * end.cos(), center.y + 100.0 * end.sin()));
            studio.end_gesture();
        }
    }

    if let Some((dx, dy)) = args.drag {
        let grab = studio.transform().center(studio.position());
        if studio.begin_drag(grab) {
            studio.pointer_moved(Point::new(grab.x + dx, grab.y + dy));
            studio.end_gesture();
        }
    }

    let direction = if args.zoom >= 0 { ZoomDirection::In } else { ZoomDirection::Out };
    for _ in 0..args.zoom.unsigned_abs() {
        studio.zoom(direction);
    }
}
