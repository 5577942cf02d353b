//! Profile picture storage.
//!
//! Images are stored content-addressed as `<md5>.<ext>`, so uploading the same
//! picture twice reuses one file.

use crate::error::AppError;
use image::ImageFormat;
use std::path::{Path, PathBuf};

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Public path under which stored pictures are served.
pub const PUBLIC_PATH: &str = "/uploads/profile-pictures";

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp", "gif"];

/// An uploaded image held in memory after its multipart part was read.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Lowercase hex digest of `bytes`.
    pub md5: String,
}

impl UploadedImage {
    fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// Accepts jpeg, png, webp and gif files up to `MAX_IMAGE_BYTES`, judged
    /// by file name and by the leading bytes of the content.
    pub fn check(&self) -> Result<String, AppError> {
        let invalid = || AppError::BadRequest("Only image files (jpeg, jpg, png, webp, gif) are allowed".to_string());

        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(AppError::BadRequest("Profile image must not exceed 2 MB".to_string()));
        }
        let ext = self.extension().ok_or_else(invalid)?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(invalid());
        }
        let guessed = mime_guess::from_path(&self.file_name).first_or_octet_stream();
        if guessed.type_() != mime_guess::mime::IMAGE {
            return Err(invalid());
        }
        match image::guess_format(&self.bytes) {
            Ok(ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP) => Ok(ext),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Checks and writes the image, returning the stored file name.
    pub async fn save(&self, image: &UploadedImage) -> Result<String, AppError> {
        let ext = image.check()?;
        let file_name = format!("{}.{}", image.md5, ext);
        let target = self.root.join(&file_name);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Internal(format!("cannot create upload directory: {}", e)))?;
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(file_name);
        }
        tokio::fs::write(&target, &image.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("cannot store profile image: {}", e)))?;
        Ok(file_name)
    }
}
