use std::path::Path;

use tiny_skia::{ColorU8, IntSize, Pixmap};

/// Why a configured image could not be used.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("no path configured")]
    NotConfigured,
    #[error("file not found: {0}")]
    Missing(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error("image {path} has unusable dimensions")]
    Dimensions { path: String },
}

/// Read and decode an image file (PNG, JPEG, GIF, WebP) into a pixmap.
pub async fn load_image(path: &str) -> Result<Pixmap, AssetError> {
    if path.is_empty() {
        return Err(AssetError::NotConfigured);
    }
    if !Path::new(path).exists() {
        return Err(AssetError::Missing(path.to_string()));
    }
    let bytes = tokio::fs::read(path).await.map_err(|source| AssetError::Read {
        path: path.to_string(),
        source,
    })?;
    decode_image(&bytes).map_err(|e| match e {
        DecodeFailure::Image(source) => AssetError::Decode {
            path: path.to_string(),
            source,
        },
        DecodeFailure::Dimensions => AssetError::Dimensions {
            path: path.to_string(),
        },
    })
}

enum DecodeFailure {
    Image(image::ImageError),
    Dimensions,
}

fn decode_image(bytes: &[u8]) -> Result<Pixmap, DecodeFailure> {
    let rgba = image::load_from_memory(bytes)
        .map_err(DecodeFailure::Image)?
        .to_rgba8();
    let size = IntSize::from_wh(rgba.width(), rgba.height()).ok_or(DecodeFailure::Dimensions)?;

    // tiny-skia stores premultiplied alpha
    let mut data = Vec::with_capacity(rgba.as_raw().len());
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        let p = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
    Pixmap::from_vec(data, size).ok_or(DecodeFailure::Dimensions)
}
