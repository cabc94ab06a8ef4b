use anyhow::{Context, Result};
use base64::Engine;
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

use crate::session::UploadedImage;

/// File extensions accepted by the upload picker.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];

/// Check if a file has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// The MIME type to attach to an upload, from its file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "image/jpeg",
    }
}

/// Read one selected file into an in-memory upload record.
async fn read_one(path: PathBuf) -> Result<UploadedImage> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let base64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let name = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedImage {
        base64,
        mime_type: mime_from_path(&path).to_string(),
        name,
    })
}

/// Read a batch of selected files into upload records, preserving selection
/// order.
///
/// All reads run concurrently and are joined with an all-or-nothing outcome:
/// if any single file fails to read, the whole batch fails and nothing is
/// returned — the caller's existing upload list is never partially updated.
///
/// # Example
///
/// ```rust,no_run
/// use pixgen::upload::read_batch;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let batch = read_batch(&[PathBuf::from("cat.png"), PathBuf::from("dog.jpg")]).await?;
/// assert_eq!(batch.len(), 2);
/// # Ok(())
/// # }
/// ```
pub async fn read_batch(paths: &[PathBuf]) -> Result<Vec<UploadedImage>> {
    let reads = paths.iter().cloned().map(read_one);
    try_join_all(reads).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // ── is_supported_image ───────────────────────────────────────────

    #[test]
    fn supported_extensions() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.JPEG")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(is_supported_image(Path::new("photo.gif")));
    }

    #[test]
    fn unsupported_extensions() {
        assert!(!is_supported_image(Path::new("doc.pdf")));
        assert!(!is_supported_image(Path::new("video.mp4")));
        assert!(!is_supported_image(Path::new("noext")));
    }

    // ── mime_from_path ───────────────────────────────────────────────

    #[test]
    fn mime_detection() {
        assert_eq!(mime_from_path(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("a.png")), "image/png");
        assert_eq!(mime_from_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_from_path(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_from_path(Path::new("a.tiff")), "image/tiff");
    }

    #[test]
    fn mime_fallback_jpeg() {
        assert_eq!(mime_from_path(Path::new("noext")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("weird.xyz")), "image/jpeg");
    }

    // ── read_batch ───────────────────────────────────────────────────

    #[tokio::test]
    async fn batch_reads_in_order() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.jpg");
        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second").unwrap();

        let batch = read_batch(&[a, b]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].name, "a.png");
        assert_eq!(batch[0].mime_type, "image/png");
        assert_eq!(batch[1].name, "b.jpg");
        assert_eq!(batch[1].mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn batch_encodes_base64() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.png");
        fs::write(&path, b"hello").unwrap();

        let batch = read_batch(&[path]).await.unwrap();
        assert_eq!(batch[0].base64, "aGVsbG8=");
    }

    #[tokio::test]
    async fn batch_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("ok.png");
        fs::write(&good, b"fine").unwrap();
        let missing = dir.path().join("missing.png");

        let result = read_batch(&[good, missing]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn batch_empty_is_ok() {
        let batch = read_batch(&[]).await.unwrap();
        assert!(batch.is_empty());
    }
}
