//! Photo compositor: a decorative frame over a user photo that can be dragged,
//! resized, rotated and zoomed, then locked and exported as a PNG.
//!
//! [`Studio`] owns both assets, the live [`Transform`], the lock state and the
//! [`InteractionMode`]. The desktop UI and the headless CLI drive it through
//! the same handlers, so every gate (locked, downloading, one gesture at a
//! time) lives here rather than in the surfaces.

pub mod compose;
pub mod fit;
pub mod gesture;
pub mod transform;

use image::RgbaImage;

use crate::{log_err, log_info, log_warn};
pub use compose::EXPORT_SCALE;
pub use gesture::{DragGesture, InteractionMode, ResizeGesture, ResizeHandle, RotateGesture};
pub use transform::{
    MIN_DIMENSION, Point, Position, SavedSnapshot, Size, Transform, ZoomDirection,
};

/// File name every export is saved under.
pub const EXPORT_FILENAME: &str = "framed-photo.png";

// ============================================================================
// ERRORS
// ============================================================================

/// The two user-supplied images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetRole {
    Frame,
    Subject,
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetRole::Frame => write!(f, "frame"),
            AssetRole::Subject => write!(f, "photo"),
        }
    }
}

/// Error type for studio operations. `Display` is the user-facing wording.
#[derive(Debug)]
pub enum StudioError {
    /// Export attempted without both a frame and a photo.
    AssetsMissing,
    /// Export attempted before the view was saved.
    ViewNotSaved,
    /// The frame boundary has not been measured yet.
    BoundaryUnavailable,
    /// A download is already running.
    DownloadInProgress,
    /// Download completion requested with no download pending.
    NotDownloading,
    /// An uploaded file could not be read.
    Read { role: AssetRole, message: String },
    /// An uploaded file was read but could not be decoded.
    Decode { role: AssetRole, message: String },
    /// Rasterizing the composition failed.
    Rasterize(String),
    Io(std::io::Error),
    Image(image::ImageError),
}

impl std::fmt::Display for StudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StudioError::AssetsMissing => write!(f, "Please upload both a frame and your photo."),
            StudioError::ViewNotSaved => write!(f, "Please save the view before downloading."),
            StudioError::BoundaryUnavailable => write!(
                f,
                "Required elements not found. Please ensure images are loaded."
            ),
            StudioError::DownloadInProgress => write!(f, "A download is already in progress."),
            StudioError::NotDownloading => write!(f, "No download is pending."),
            StudioError::Read { role: AssetRole::Frame, .. }
            | StudioError::Decode { role: AssetRole::Frame, .. } => {
                write!(f, "Failed to load frame image file.")
            }
            StudioError::Read { role: AssetRole::Subject, .. } => {
                write!(f, "Failed to load user photo file.")
            }
            StudioError::Decode { role: AssetRole::Subject, .. } => write!(
                f,
                "Could not process uploaded photo. Please try a different one."
            ),
            StudioError::Rasterize(e) => write!(f, "Download failed: {}", e),
            StudioError::Io(e) => write!(f, "Download failed: {}", e),
            StudioError::Image(e) => write!(f, "Download failed: {}", e),
        }
    }
}

impl std::error::Error for StudioError {}

impl From<std::io::Error> for StudioError {
    fn from(e: std::io::Error) -> Self {
        StudioError::Io(e)
    }
}

impl From<image::ImageError> for StudioError {
    fn from(e: image::ImageError) -> Self {
        StudioError::Image(e)
    }
}

// ============================================================================
// STUDIO STATE
// ============================================================================

/// A decoded image plus a generation counter so renderers know when to
/// re-upload it.
#[derive(Debug)]
pub struct Asset {
    pub image: RgbaImage,
    pub generation: u64,
}

/// Result of toggling the lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockChange {
    Locked,
    Unlocked,
}

impl LockChange {
    pub fn message(self) -> &'static str {
        match self {
            LockChange::Locked => {
                "View saved and locked. You can now download or unlock to edit again."
            }
            LockChange::Unlocked => "View unlocked for editing.",
        }
    }
}

#[derive(Debug)]
pub struct Studio {
    frame: Option<Asset>,
    subject: Option<Asset>,
    transform: Transform,
    position: Position,
    snapshot: Option<SavedSnapshot>,
    locked: bool,
    mode: InteractionMode,
    /// Frame boundary content box; `None` until the surface has laid it out.
    boundary: Option<Size>,
    viewport: Size,
    next_generation: u64,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

impl Studio {
    pub fn new() -> Self {
        Self {
            frame: None,
            subject: None,
            transform: Transform::default(),
            position: Position::default(),
            snapshot: None,
            locked: false,
            mode: InteractionMode::Idle,
            boundary: None,
            viewport: Size::new(1280.0, 720.0),
            next_generation: 1,
        }
    }

    // --- accessors ---------------------------------------------------------

    pub fn frame(&self) -> Option<&Asset> {
        self.frame.as_ref()
    }

    pub fn subject(&self) -> Option<&Asset> {
        self.subject.as_ref()
    }

    pub fn has_assets(&self) -> bool {
        self.frame.is_some() && self.subject.is_some()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn snapshot(&self) -> Option<&SavedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn boundary(&self) -> Option<Size> {
        self.boundary
    }

    pub fn set_boundary(&mut self, boundary: Option<Size>) {
        self.boundary = boundary;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Editing handlers may run: not locked and not downloading.
    pub fn can_edit(&self) -> bool {
        !self.locked && !self.mode.is_downloading()
    }

    /// The lock toggle is available.
    pub fn can_toggle_lock(&self) -> bool {
        self.has_assets() && !self.mode.is_downloading()
    }

    /// The download action is available.
    pub fn can_download(&self) -> bool {
        self.has_assets() && self.snapshot.is_some() && !self.mode.is_downloading()
    }

    /// Placement to draw: the snapshot while locked or downloading, the live
    /// state otherwise.
    pub fn display_placement(&self) -> SavedSnapshot {
        match self.snapshot {
            Some(saved) if self.locked || self.mode.is_downloading() => saved,
            _ => SavedSnapshot {
                position: self.position,
                transform: self.transform,
            },
        }
    }

    /// Guidance shown in place of the composition while assets are missing.
    pub fn placeholder_message(&self) -> Option<&'static str> {
        match (self.frame.is_some(), self.subject.is_some()) {
            (true, true) => None,
            (true, false) => Some("Now, upload your photo."),
            (false, true) => Some("Please upload a frame image."),
            (false, false) => Some("Upload a frame and your photo to begin."),
        }
    }

    pub fn upload_label(&self, role: AssetRole) -> &'static str {
        match role {
            AssetRole::Frame if self.frame.is_some() => "Change Frame",
            AssetRole::Frame => "Upload Frame",
            AssetRole::Subject if self.subject.is_some() => "Change Photo",
            AssetRole::Subject => "Upload Photo",
        }
    }

    // --- asset loading -----------------------------------------------------

    fn take_generation(&mut self) -> u64 {
        let g = self.next_generation;
        self.next_generation += 1;
        g
    }

    /// Drop the snapshot, unlock and return to idle: a fresh edit session.
    fn begin_session(&mut self) {
        self.snapshot = None;
        self.locked = false;
        self.mode = InteractionMode::Idle;
    }

    /// Replace the frame image.
    fn load_frame(&mut self, image: RgbaImage) {
        let generation = self.take_generation();
        log_info!("Frame loaded: {}x{}", image.width(), image.height());
        self.frame = Some(Asset { image, generation });
        self.begin_session();
    }

    /// Replace the subject photo and fit it into the boundary.
    fn load_subject(&mut self, image: RgbaImage) {
        let generation = self.take_generation();
        let (transform, position) = fit::fit_subject(image.width(), image.height(), self.boundary);
        if self.boundary.is_none() {
            log_warn!("Frame boundary not measured; using default photo placement");
        }
        log_info!(
            "Photo loaded: {}x{} -> box {}x{} at ({}, {})",
            image.width(),
            image.height(),
            transform.width,
            transform.height,
            position.x,
            position.y
        );
        self.subject = Some(Asset { image, generation });
        self.transform = transform;
        self.position = position;
        self.begin_session();
    }

    /// Route a decode result to its role. A failure unsets that asset and
    /// hands the error back for reporting. While a download is running the
    /// result is refused untouched so the caller can retry it afterwards.
    pub fn apply_decoded(
        &mut self,
        role: AssetRole,
        decoded: Result<RgbaImage, StudioError>,
    ) -> Result<(), StudioError> {
        if self.mode.is_downloading() {
            log_warn!("Deferring {} upload until the download finishes", role);
            return Err(StudioError::DownloadInProgress);
        }
        match decoded {
            Ok(image) => {
                match role {
                    AssetRole::Frame => self.load_frame(image),
                    AssetRole::Subject => self.load_subject(image),
                }
                Ok(())
            }
            Err(e) => {
                log_err!("Failed to load {}: {:?}", role, e);
                match role {
                    AssetRole::Frame => self.frame = None,
                    AssetRole::Subject => self.subject = None,
                }
                if self.mode.is_gesture() {
                    self.mode = InteractionMode::Idle;
                }
                Err(e)
            }
        }
    }

    // --- gestures ----------------------------------------------------------

    fn gesture_allowed(&self) -> bool {
        self.has_assets() && self.can_edit() && self.mode.is_idle()
    }

    /// Start moving the subject with the pointer at `pointer`.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.gesture_allowed() {
            return false;
        }
        self.mode = InteractionMode::Dragging(DragGesture {
            start_pointer: pointer,
            start_position: self.position,
        });
        true
    }

    /// Start a resize from `handle`. The current aspect ratio is locked in.
    pub fn begin_resize(&mut self, handle: ResizeHandle, pointer: Point) -> bool {
        if !self.gesture_allowed() {
            return false;
        }
        self.mode = InteractionMode::Resizing(ResizeGesture::new(handle, pointer, &self.transform));
        true
    }

    /// Start rotating about the subject's current centre.
    pub fn begin_rotate(&mut self, pointer: Point) -> bool {
        if !self.gesture_allowed() {
            return false;
        }
        let center = self.transform.center(self.position);
        self.mode = InteractionMode::Rotating(RotateGesture::new(center, pointer, self.transform.rotate));
        true
    }

    /// Feed a pointer move to whichever gesture is live.
    pub fn pointer_moved(&mut self, pointer: Point) -> bool {
        if self.locked {
            return false;
        }
        match self.mode {
            InteractionMode::Dragging(g) => {
                let size = (self.transform.width, self.transform.height);
                self.position = g.position_at(pointer, size, self.boundary);
                true
            }
            InteractionMode::Resizing(g) => {
                let (w, h) = g.dimensions_at(pointer, self.viewport);
                self.transform.width = w;
                self.transform.height = h;
                true
            }
            InteractionMode::Rotating(g) => {
                self.transform.rotate = g.rotation_at(pointer);
                true
            }
            InteractionMode::Idle | InteractionMode::Downloading => false,
        }
    }

    /// Pointer released (or lost): end the live gesture, if any.
    pub fn end_gesture(&mut self) -> bool {
        if self.mode.is_gesture() {
            self.mode = InteractionMode::Idle;
            true
        } else {
            false
        }
    }

    /// One discrete zoom step.
    pub fn zoom(&mut self, direction: ZoomDirection) -> bool {
        if !self.has_assets() || !self.can_edit() {
            return false;
        }
        self.transform.zoom(direction);
        true
    }

    /// Wheel notch at `pointer`. Only consumed (and the page scroll suppressed)
    /// when it lands on the subject while editing is possible.
    pub fn wheel(&mut self, pointer: Point, direction: ZoomDirection) -> bool {
        if !self.has_assets() || !self.can_edit() {
            return false;
        }
        if !self.transform.contains(self.position, pointer) {
            return false;
        }
        self.zoom(direction)
    }

    // --- lock & export -----------------------------------------------------

    /// Save-and-lock when editable, unlock when locked. Unlocking keeps the
    /// snapshot.
    pub fn toggle_lock(&mut self) -> Result<LockChange, StudioError> {
        if self.mode.is_downloading() || !self.has_assets() {
            let e = if self.mode.is_downloading() {
                StudioError::DownloadInProgress
            } else {
                StudioError::AssetsMissing
            };
            log_warn!("Lock toggle rejected: {}", e);
            return Err(e);
        }
        let change = if self.locked {
            self.locked = false;
            LockChange::Unlocked
        } else {
            self.mode = InteractionMode::Idle;
            self.snapshot = Some(SavedSnapshot {
                position: self.position,
                transform: self.transform,
            });
            self.locked = true;
            LockChange::Locked
        };
        log_info!("{}", change.message());
        Ok(change)
    }

    /// Check export preconditions and enter `Downloading`. Handles disappear
    /// and every editing handler is shut out until the download completes.
    pub fn begin_download(&mut self) -> Result<(), StudioError> {
        let rejected = if self.mode.is_downloading() {
            Some(StudioError::DownloadInProgress)
        } else if self.boundary.is_none() {
            Some(StudioError::BoundaryUnavailable)
        } else if !self.has_assets() {
            Some(StudioError::AssetsMissing)
        } else if self.snapshot.is_none() {
            Some(StudioError::ViewNotSaved)
        } else {
            None
        };
        if let Some(e) = rejected {
            log_warn!("Download rejected: {}", e);
            return Err(e);
        }
        self.mode = InteractionMode::Downloading;
        Ok(())
    }

    /// Rasterize the saved view at [`EXPORT_SCALE`] and hand it to `deliver`.
    /// `Downloading` is cleared on every exit path.
    pub fn complete_download<T>(
        &mut self,
        deliver: impl FnOnce(RgbaImage) -> Result<T, StudioError>,
    ) -> Result<T, StudioError> {
        if !self.mode.is_downloading() {
            return Err(StudioError::NotDownloading);
        }
        let _scope = DownloadScope(&mut self.mode);

        let result = rasterize_saved(
            self.frame.as_ref(),
            self.subject.as_ref(),
            self.snapshot.as_ref(),
            self.boundary,
        )
        .and_then(deliver);
        match &result {
            Ok(_) => log_info!("Export complete"),
            Err(e) => log_err!("{}", e),
        }
        result
    }

    /// [`begin_download`](Self::begin_download) and
    /// [`complete_download`](Self::complete_download) back to back.
    pub fn export<T>(
        &mut self,
        deliver: impl FnOnce(RgbaImage) -> Result<T, StudioError>,
    ) -> Result<T, StudioError> {
        self.begin_download()?;
        self.complete_download(deliver)
    }
}

/// Returns the studio to idle when dropped, whatever path left the download.
struct DownloadScope<'a>(&'a mut InteractionMode);

impl Drop for DownloadScope<'_> {
    fn drop(&mut self) {
        *self.0 = InteractionMode::Idle;
    }
}

fn rasterize_saved(
    frame: Option<&Asset>,
    subject: Option<&Asset>,
    snapshot: Option<&SavedSnapshot>,
    boundary: Option<Size>,
) -> Result<RgbaImage, StudioError> {
    let (Some(frame), Some(subject)) = (frame, subject) else {
        return Err(StudioError::AssetsMissing);
    };
    let saved = snapshot.ok_or(StudioError::ViewNotSaved)?;
    let boundary = boundary.ok_or(StudioError::BoundaryUnavailable)?;
    compose::render(
        &frame.image,
        &subject.image,
        boundary,
        saved.position,
        &saved.transform,
        EXPORT_SCALE,
    )
    .map_err(StudioError::Rasterize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn loaded_studio() -> Studio {
        let mut s = Studio::new();
        s.set_boundary(Some(Size::square(500.0)));
        s.load_frame(RgbaImage::from_pixel(50, 50, Rgba([255, 255, 255, 0])));
        s.load_subject(RgbaImage::from_pixel(400, 200, Rgba([10, 20, 30, 255])));
        s
    }

    #[test]
    fn test_subject_upload_fits_and_centres() {
        let s = loaded_studio();
        assert_eq!((s.transform().width, s.transform().height), (300, 150));
        assert_eq!(s.position(), Position::new(100, 175));
        assert!(s.mode().is_idle());
    }

    #[test]
    fn test_placeholder_and_labels_follow_assets() {
        let mut s = Studio::new();
        assert_eq!(s.placeholder_message(), Some("Upload a frame and your photo to begin."));
        assert_eq!(s.upload_label(AssetRole::Frame), "Upload Frame");
        s.load_frame(RgbaImage::new(4, 4));
        assert_eq!(s.placeholder_message(), Some("Now, upload your photo."));
        assert_eq!(s.upload_label(AssetRole::Frame), "Change Frame");
        assert_eq!(s.upload_label(AssetRole::Subject), "Upload Photo");
        s.load_subject(RgbaImage::new(4, 4));
        assert_eq!(s.placeholder_message(), None);

        let mut s = Studio::new();
        s.load_subject(RgbaImage::new(4, 4));
        assert_eq!(s.placeholder_message(), Some("Please upload a frame image."));
    }

    #[test]
    fn test_lock_then_unlock_keeps_state_and_snapshot() {
        let mut s = loaded_studio();
        let before = (*s.transform(), s.position());
        assert_eq!(s.toggle_lock().unwrap(), LockChange::Locked);
        assert!(s.is_locked());
        assert_eq!(s.toggle_lock().unwrap(), LockChange::Unlocked);
        assert!(!s.is_locked());
        assert_eq!((*s.transform(), s.position()), before);
        let saved = s.snapshot().copied().unwrap();
        assert_eq!(saved.transform, before.0);
        assert_eq!(saved.position, before.1);
    }

    #[test]
    fn test_locked_view_rejects_every_handler() {
        let mut s = loaded_studio();
        s.toggle_lock().unwrap();
        let p = Point::new(250.0, 250.0);
        assert!(!s.begin_drag(p));
        assert!(!s.begin_resize(ResizeHandle::SouthEast, p));
        assert!(!s.begin_rotate(p));
        assert!(!s.zoom(ZoomDirection::In));
        assert!(!s.wheel(p, ZoomDirection::In));
        assert_eq!(s.transform().scale, 1.0);
    }

    #[test]
    fn test_new_upload_while_locked_starts_fresh_session() {
        let mut s = loaded_studio();
        s.toggle_lock().unwrap();
        s.load_subject(RgbaImage::new(100, 100));
        assert!(!s.is_locked());
        assert!(s.snapshot().is_none());

        s.toggle_lock().unwrap();
        s.load_frame(RgbaImage::new(10, 10));
        assert!(!s.is_locked());
        assert!(s.snapshot().is_none());
    }

    #[test]
    fn test_only_one_gesture_at_a_time() {
        let mut s = loaded_studio();
        let p = Point::new(250.0, 250.0);
        assert!(s.begin_drag(p));
        assert!(!s.begin_rotate(p));
        assert!(!s.begin_resize(ResizeHandle::NorthEast, p));
        assert_eq!(s.mode().label(), "dragging");
        assert!(s.end_gesture());
        assert!(s.mode().is_idle());
        assert!(!s.end_gesture());
        assert!(s.begin_rotate(p));
    }

    #[test]
    fn test_drag_moves_and_clamps() {
        let mut s = loaded_studio();
        s.begin_drag(Point::new(250.0, 250.0));
        s.pointer_moved(Point::new(260.6, 240.2));
        assert_eq!(s.position(), Position::new(111, 165));
        s.pointer_moved(Point::new(2000.0, 2000.0));
        assert_eq!(s.position(), Position::new(200, 350));
        s.end_gesture();
        assert!(!s.pointer_moved(Point::new(0.0, 0.0)));
        assert_eq!(s.position(), Position::new(200, 350));
    }

    #[test]
    fn test_resize_gesture_updates_box() {
        let mut s = loaded_studio();
        assert!(s.begin_resize(ResizeHandle::SouthEast, Point::new(400.0, 325.0)));
        s.pointer_moved(Point::new(430.0, 330.0));
        assert_eq!((s.transform().width, s.transform().height), (330, 165));
        s.end_gesture();
    }

    #[test]
    fn test_rotate_gesture_turns_about_centre() {
        let mut s = loaded_studio();
        // Centre is (250, 250)
        assert!(s.begin_rotate(Point::new(250.0, 150.0)));
        s.pointer_moved(Point::new(350.0, 250.0));
        assert!((s.transform().rotate - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_only_over_subject() {
        let mut s = loaded_studio();
        assert!(!s.wheel(Point::new(5.0, 5.0), ZoomDirection::In));
        assert_eq!(s.transform().scale, 1.0);
        assert!(s.wheel(Point::new(250.0, 250.0), ZoomDirection::In));
        assert_eq!(s.transform().scale, 1.1);
    }

    #[test]
    fn test_download_without_save_is_rejected() {
        let mut s = loaded_studio();
        let mut produced = false;
        let err = s
            .export(|_| {
                produced = true;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, StudioError::ViewNotSaved));
        assert!(!produced);
        assert!(s.mode().is_idle());
    }

    #[test]
    fn test_download_without_assets_is_rejected() {
        let mut s = Studio::new();
        s.set_boundary(Some(Size::square(500.0)));
        s.load_frame(RgbaImage::new(4, 4));
        let err = s.export(|_| Ok(())).unwrap_err();
        assert!(matches!(err, StudioError::AssetsMissing));
        assert_eq!(err.to_string(), "Please upload both a frame and your photo.");
    }

    #[test]
    fn test_export_renders_snapshot_not_live_state() {
        let mut s = loaded_studio();
        s.toggle_lock().unwrap();
        s.toggle_lock().unwrap();
        // Drift the live state after unlocking without saving again
        s.zoom(ZoomDirection::In);
        s.begin_drag(Point::new(0.0, 0.0));
        s.pointer_moved(Point::new(-100.0, -175.0));
        s.end_gesture();
        assert_eq!(s.position(), Position::new(0, 0));

        let image = s.export(Ok).unwrap();
        assert_eq!(image.dimensions(), (1000, 1000));
        // Snapshot box spans x 100..400, y 175..325 on a 500 boundary
        assert_eq!(image.get_pixel(500, 500)[3], 255);
        assert_eq!(image.get_pixel(100, 100)[3], 0);
        assert!(s.mode().is_idle());
        assert_eq!(s.position(), Position::new(0, 0));
    }

    #[test]
    fn test_failed_delivery_still_clears_download() {
        let mut s = loaded_studio();
        s.toggle_lock().unwrap();
        s.begin_download().unwrap();
        assert!(!s.can_edit());
        assert!(!s.can_toggle_lock());
        assert_eq!(s.display_placement(), *s.snapshot().unwrap());
        let err = s
            .complete_download(|_| -> Result<(), StudioError> {
                Err(StudioError::Rasterize("tainted".into()))
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Download failed: tainted");
        assert!(s.mode().is_idle());
        assert!(s.can_download());
    }

    #[test]
    fn test_second_download_request_is_rejected() {
        let mut s = loaded_studio();
        s.toggle_lock().unwrap();
        s.begin_download().unwrap();
        assert!(matches!(s.begin_download(), Err(StudioError::DownloadInProgress)));
        assert!(matches!(s.toggle_lock(), Err(StudioError::DownloadInProgress)));
    }

    #[test]
    fn test_decode_failure_unsets_asset() {
        let mut s = loaded_studio();
        let err = s
            .apply_decoded(
                AssetRole::Subject,
                Err(StudioError::Decode { role: AssetRole::Subject, message: "bad".into() }),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not process uploaded photo. Please try a different one."
        );
        assert!(s.subject().is_none());
        assert!(s.frame().is_some());
    }

    #[test]
    fn test_upload_during_download_is_refused_untouched() {
        let mut s = loaded_studio();
        s.toggle_lock().unwrap();
        s.begin_download().unwrap();
        let generation = s.subject().map(|a| a.generation).unwrap();

        let err = s
            .apply_decoded(AssetRole::Subject, Ok(RgbaImage::new(64, 64)))
            .unwrap_err();
        assert!(matches!(err, StudioError::DownloadInProgress));
        let err = s
            .apply_decoded(
                AssetRole::Frame,
                Err(StudioError::Read { role: AssetRole::Frame, message: "gone".into() }),
            )
            .unwrap_err();
        assert!(matches!(err, StudioError::DownloadInProgress));

        assert!(s.mode().is_downloading());
        assert!(s.frame().is_some());
        assert_eq!(s.subject().map(|a| a.generation), Some(generation));
        assert!(s.snapshot().is_some());
        assert_eq!(s.complete_download(Ok).unwrap().dimensions(), (1000, 1000));

        // Once idle the same upload goes through
        s.apply_decoded(AssetRole::Subject, Ok(RgbaImage::new(64, 64))).unwrap();
        assert!(s.snapshot().is_none());
    }

    #[test]
    fn test_read_and_decode_failures_word_differently() {
        let read = StudioError::Read { role: AssetRole::Subject, message: String::new() };
        let decode = StudioError::Decode { role: AssetRole::Subject, message: String::new() };
        assert_eq!(read.to_string(), "Failed to load user photo file.");
        assert_eq!(
            decode.to_string(),
            "Could not process uploaded photo. Please try a different one."
        );
        let frame = StudioError::Read { role: AssetRole::Frame, message: String::new() };
        assert_eq!(frame.to_string(), "Failed to load frame image file.");
    }

    #[test]
    fn test_generations_increase_per_upload() {
        let mut s = Studio::new();
        s.load_frame(RgbaImage::new(1, 1));
        let first = s.frame().map(|a| a.generation).unwrap();
        s.load_frame(RgbaImage::new(1, 1));
        assert!(s.frame().map(|a| a.generation).unwrap() > first);
    }
}
