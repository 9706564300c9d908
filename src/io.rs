// ============================================================================
// IMAGE IO: decode uploads, encode/write exports, native pickers
// ============================================================================

use image::RgbaImage;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageError};
use rfd::FileDialog;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::studio::{AssetRole, EXPORT_FILENAME, StudioError};

/// Extensions offered by the upload pickers (the `image/*` set we can decode).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tga", "gif", "ico", "tiff", "tif",
];

/// Largest side accepted from an upload. Prevents memory exhaustion from
/// crafted files.
const MAX_UPLOAD_DIM: u32 = 16_384;

/// Read and decode an image file into RGBA for `role`.
pub fn load_image_sync(path: &Path, role: AssetRole) -> Result<RgbaImage, StudioError> {
    let bytes = std::fs::read(path).map_err(|e| StudioError::Read {
        role,
        message: format!("{}: {}", path.display(), e),
    })?;
    decode_bytes(&bytes, role)
}

/// Decode an in-memory image (format sniffed from its header).
pub fn decode_bytes(bytes: &[u8], role: AssetRole) -> Result<RgbaImage, StudioError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| StudioError::Decode {
        role,
        message: e.to_string(),
    })?;
    let img = decoded.into_rgba8();
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || w > MAX_UPLOAD_DIM || h > MAX_UPLOAD_DIM {
        return Err(StudioError::Decode {
            role,
            message: format!("unsupported dimensions {}x{}", w, h),
        });
    }
    Ok(img)
}

/// Encode as PNG into any writer.
pub fn encode_png<W: Write>(image: &RgbaImage, writer: W) -> Result<(), ImageError> {
    PngEncoder::new(writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )
}

/// Encode as PNG and write to `path`.
/// Standalone so it can run on a background thread via `rayon::spawn`.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), StudioError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_png(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Native picker for an upload.
pub fn pick_image(role: AssetRole) -> Option<PathBuf> {
    let title = match role {
        AssetRole::Frame => "Choose a frame image",
        AssetRole::Subject => "Choose your photo",
    };
    FileDialog::new()
        .set_title(title)
        .add_filter("Images", IMAGE_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
}

/// Native save dialog pre-filled with the export file name.
pub fn pick_export_path() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Save framed photo")
        .set_file_name(EXPORT_FILENAME)
        .add_filter("PNG image", &["png"])
        .save_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        encode_png(img, &mut out).unwrap();
        out
    }

    #[test]
    fn test_decode_png_bytes() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let decoded = decode_bytes(&png_bytes(&img), AssetRole::Frame).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_corrupt_bytes_report_role() {
        let err = decode_bytes(b"definitely not an image", AssetRole::Frame).unwrap_err();
        assert!(matches!(err, StudioError::Decode { role: AssetRole::Frame, .. }));
        assert_eq!(err.to_string(), "Failed to load frame image file.");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_image_sync(Path::new("/no/such/photo.png"), AssetRole::Subject).unwrap_err();
        assert!(matches!(err, StudioError::Read { role: AssetRole::Subject, .. }));
        assert_eq!(err.to_string(), "Failed to load user photo file.");
    }

    #[test]
    fn test_unreadable_contents_are_decode_error() {
        let path = std::env::temp_dir().join(format!("photostudio-io-bad-{}.jpg", std::process::id()));
        std::fs::write(&path, b"not a jpeg").unwrap();
        let err = load_image_sync(&path, AssetRole::Subject).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, StudioError::Decode { role: AssetRole::Subject, .. }));
    }

    #[test]
    fn test_write_png_to_disk() {
        let path = std::env::temp_dir().join(format!("photostudio-io-{}.png", std::process::id()));
        let img = RgbaImage::from_pixel(5, 5, Rgba([9, 9, 9, 255]));
        write_png(&img, &path).unwrap();
        let back = load_image_sync(&path, AssetRole::Frame).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, img);
    }
}
