use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::LogoMode;

/// Square icon sizes referenced by the PWA manifests.
pub const LOGO_SIZES: [u32; 4] = [32, 96, 192, 512];

pub const LOGO_FILE: &str = "logo.png";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

pub fn logo_file_name(size: u32) -> String {
    format!("logo-{size}x{size}.png")
}

/// Resize the logo to every size in [`LOGO_SIZES`]. Failures are logged and
/// produce an empty list so the pages still get built.
pub fn generate_logo_assets(source: &Path, assets_dir: &Path) -> Vec<LogoAsset> {
    match try_generate_logo_assets(source, assets_dir) {
        Ok(assets) => assets,
        Err(e) => {
            error!("Logo generation failed: {e}");
            Vec::new()
        }
    }
}

pub fn try_generate_logo_assets(
    source: &Path,
    assets_dir: &Path,
) -> Result<Vec<LogoAsset>, AssetError> {
    let image = open_image(source)?;

    // Keep transparency in the output even when the source has none.
    let image = if image.color().has_alpha() {
        image
    } else {
        DynamicImage::ImageRgba8(image.to_rgba8())
    };

    let mut assets: Vec<LogoAsset> = Vec::with_capacity(LOGO_SIZES.len());
    for size in LOGO_SIZES {
        let path = assets_dir.join(logo_file_name(size));
        let saved = image
            .resize_exact(size, size, FilterType::Lanczos3)
            .save_with_format(&path, ImageFormat::Png);
        if let Err(source) = saved {
            // All sizes or none: drop what this run already wrote.
            for written in &assets {
                match std::fs::remove_file(&written.path) {
                    Ok(()) => debug!("Removed partial {}", written.path.display()),
                    Err(e) => warn!("Could not remove {}: {e}", written.path.display()),
                }
            }
            return Err(AssetError::Encode { path, source });
        }

        debug!("Wrote {}", path.display());
        assets.push(LogoAsset {
            path,
            width: size,
            height: size,
        });
    }

    Ok(assets)
}

fn open_image(path: &Path) -> Result<DynamicImage, AssetError> {
    let io_error = |source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    };

    ImageReader::open(path)
        .map_err(io_error)?
        .with_guessed_format()
        .map_err(io_error)?
        .decode()
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Full-size copy of the source logo next to the resized ones.
pub fn copy_logo(source: &Path, assets_dir: &Path) -> Result<PathBuf, AssetError> {
    let target = assets_dir.join(LOGO_FILE);
    std::fs::copy(source, &target).map_err(|source| AssetError::Io {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

/// What `{{logo}}` expands to in a page one directory below the output root.
pub fn logo_reference(mode: LogoMode, source: &Path) -> Result<String, AssetError> {
    match mode {
        LogoMode::File => Ok(format!("../assets/{LOGO_FILE}")),
        LogoMode::Embed => {
            let bytes = std::fs::read(source).map_err(|e| AssetError::Io {
                path: source.to_path_buf(),
                source: e,
            })?;
            Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_rgba_logo(dir: &Path, size: u32) -> PathBuf {
        let path = dir.join("logo.png");
        RgbaImage::from_pixel(size, size, Rgba([0, 75, 135, 200]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_generates_four_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_rgba_logo(dir.path(), 512);
        let assets_dir = dir.path().join("assets");
        std::fs::create_dir(&assets_dir).unwrap();

        let assets = generate_logo_assets(&source, &assets_dir);
        assert_eq!(assets.len(), 4);

        let mut names: Vec<String> = std::fs::read_dir(&assets_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "logo-192x192.png",
                "logo-32x32.png",
                "logo-512x512.png",
                "logo-96x96.png"
            ]
        );

        for asset in &assets {
            let (width, height) = image::image_dimensions(&asset.path).unwrap();
            assert_eq!((width, height), (asset.width, asset.height));
        }
    }

    #[test]
    fn test_opaque_source_gains_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("opaque.png");
        RgbImage::from_pixel(64, 64, Rgb([255, 255, 255]))
            .save(&source)
            .unwrap();

        let assets = try_generate_logo_assets(&source, dir.path()).unwrap();
        let icon = image::open(&assets[0].path).unwrap();
        assert!(icon.color().has_alpha());
    }

    #[test]
    fn test_unreadable_source_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("logo.png");
        std::fs::write(&source, b"not an image").unwrap();

        assert!(generate_logo_assets(&source, dir.path()).is_empty());
        assert!(generate_logo_assets(&dir.path().join("missing.png"), dir.path()).is_empty());
    }

    #[test]
    fn test_failed_size_removes_earlier_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_rgba_logo(dir.path(), 128);
        let assets_dir = dir.path().join("assets");
        std::fs::create_dir(&assets_dir).unwrap();
        // A directory where the 96px file should go makes that save fail.
        std::fs::create_dir(assets_dir.join(logo_file_name(96))).unwrap();

        let err = try_generate_logo_assets(&source, &assets_dir).unwrap_err();
        assert!(matches!(err, AssetError::Encode { .. }));
        assert!(!assets_dir.join(logo_file_name(32)).exists());

        assert!(generate_logo_assets(&source, &assets_dir).is_empty());
        for size in [32, 192, 512] {
            assert!(!assets_dir.join(logo_file_name(size)).exists());
        }
    }

    #[test]
    fn test_logo_reference_modes() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_rgba_logo(dir.path(), 8);

        assert_eq!(
            logo_reference(LogoMode::File, &source).unwrap(),
            "../assets/logo.png"
        );

        let embedded = logo_reference(LogoMode::Embed, &source).unwrap();
        let encoded = embedded.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), std::fs::read(&source).unwrap());
    }

    #[test]
    fn test_copy_logo() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_rgba_logo(dir.path(), 16);
        let assets_dir = dir.path().join("assets");
        std::fs::create_dir(&assets_dir).unwrap();

        let copied = copy_logo(&source, &assets_dir).unwrap();
        assert_eq!(copied, assets_dir.join("logo.png"));
        assert_eq!(std::fs::read(copied).unwrap(), std::fs::read(source).unwrap());
    }
}
