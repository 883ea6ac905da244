//! Student photo storage on local disk.

use std::path::{Path, PathBuf};

use tuition_types::{AppError, UserId};

/// Largest accepted photo.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Sub-directory of the upload root holding student photos.
pub const STUDENT_PHOTO_DIR: &str = "students";

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Lower-cased extension of an accepted photo file name.
pub fn photo_extension(file_name: &str) -> Result<String, AppError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::BadRequest(
            "Only .jpg, .jpeg and .png images are allowed".into(),
        ))
    }
}

/// `student-<user>-<millis>.<ext>`
pub fn photo_file_name(user: UserId, timestamp_millis: i64, ext: &str) -> String {
    format!("student-{user}-{timestamp_millis}.{ext}")
}

/// Writes a validated photo below `root` and returns its public URL.
pub async fn store_photo(
    root: &Path,
    user: UserId,
    file_name: &str,
    bytes: &[u8],
) -> Result<(String, PathBuf), AppError> {
    let ext = photo_extension(file_name)?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded photo is empty".into()));
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(AppError::BadRequest("Photo must be at most 5 MiB".into()));
    }

    let dir = root.join(STUDENT_PHOTO_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("creating upload dir: {e}")))?;

    let name = photo_file_name(user, chrono::Utc::now().timestamp_millis(), &ext);
    let path = dir.join(&name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("writing photo: {e}")))?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "photo stored");
    Ok((format!("/uploads/{STUDENT_PHOTO_DIR}/{name}"), path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images_only() {
        assert_eq!(photo_extension("me.PNG").unwrap(), "png");
        assert_eq!(photo_extension("me.jpeg").unwrap(), "jpeg");
        assert!(photo_extension("me.gif").is_err());
        assert!(photo_extension("noext").is_err());
    }

    #[test]
    fn file_name_embeds_user_and_time() {
        assert_eq!(
            photo_file_name(UserId::new(3), 1_720_000_000_000, "png"),
            "student-3-1720000000000.png"
        );
    }

    #[tokio::test]
    async fn stores_under_students_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (url, path) = store_photo(dir.path(), UserId::new(5), "a.jpg", b"img")
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/students/student-5-"));
        assert!(url.ends_with(".jpg"));
        assert_eq!(tokio::fs::read(path).await.unwrap(), b"img");
    }

    #[tokio::test]
    async fn rejects_oversized_photo() {
        let dir = tempfile::tempdir().unwrap();
        let big = vec![0u8; MAX_PHOTO_BYTES + 1];
        let err = store_photo(dir.path(), UserId::new(5), "a.png", &big)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
