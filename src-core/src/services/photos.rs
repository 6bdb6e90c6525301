//! Photos service
//!
//! Stores already-compressed photos with their metadata. The gallery reads
//! newest first through the upload-date index.

use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::database::{NewPhoto, Photo, PhotoMimeType, PhotoPatch, Repository};
use crate::dates::now_millis;
use crate::error::{AppError, Result};
use crate::validation::{
    check_caption, check_photo_mime_type, check_photo_tags, check_positive, ValidationError,
    Violations,
};
use chrono::SubsecRound;

fn validate_new_photo(input: NewPhoto) -> std::result::Result<Photo, ValidationError> {
    let mut v = Violations::new();
    let caption = input.caption.unwrap_or_default();

    if input.image_blob.is_empty() {
        v.empty("imageBlob");
    }
    check_caption(&mut v, &caption);
    check_photo_tags(&mut v, &input.tags);
    check_positive(&mut v, "originalSize", input.original_size);
    check_positive(&mut v, "compressedSize", input.compressed_size);
    check_positive(&mut v, "width", input.width);
    check_positive(&mut v, "height", input.height);
    let mime_type = check_photo_mime_type(&mut v, &input.mime_type);
    v.finish()?;

    Ok(Photo {
        id: 0,
        image_blob: input.image_blob,
        caption,
        tags: input.tags,
        upload_date: input
            .upload_date
            .map(|d| d.trunc_subsecs(3))
            .unwrap_or_else(now_millis),
        original_size: input.original_size,
        compressed_size: input.compressed_size,
        width: input.width,
        height: input.height,
        mime_type: mime_type.unwrap_or(PhotoMimeType::Jpeg),
    })
}

fn validate_photo_fields(photo: &Photo) -> std::result::Result<(), ValidationError> {
    let mut v = Violations::new();
    check_caption(&mut v, &photo.caption);
    check_photo_tags(&mut v, &photo.tags);
    v.finish()
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn clamp_page_size(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Service for managing photos
#[derive(Clone, Debug)]
pub struct PhotosService {
    repo: Repository,
}

impl PhotosService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: NewPhoto) -> Result<Photo> {
        let photo = validate_new_photo(input)?;

        tracing::info!(
            "Saving photo ({} bytes, {}x{}, {})",
            photo.compressed_size,
            photo.width,
            photo.height,
            photo.mime_type.as_str()
        );

        let created = self.repo.insert_photo(&photo).await?;

        tracing::info!("Photo saved successfully: {}", created.id);
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Option<Photo> {
        match self.repo.get_photo(id).await {
            Ok(photo) => photo,
            Err(e) => {
                tracing::error!("Failed to get photo {}: {}", id, e);
                None
            }
        }
    }

    /// All photos, newest first
    pub async fn get_all(&self) -> Vec<Photo> {
        self.repo.list_photos().await.unwrap_or_else(|e| {
            tracing::error!("Failed to get photos: {}", e);
            Vec::new()
        })
    }

    /// One page of the gallery, newest first
    pub async fn get_page(&self, offset: u32, limit: Option<u32>) -> Vec<Photo> {
        let limit = clamp_page_size(limit);

        match self.repo.list_photos_page(offset, limit).await {
            Ok(page) => {
                tracing::debug!(
                    "Retrieved photo page: offset={}, limit={}, returned={}",
                    offset,
                    limit,
                    page.len()
                );
                page
            }
            Err(e) => {
                tracing::error!("Failed to get photo page: {}", e);
                Vec::new()
            }
        }
    }

    /// Edit caption and tags; the merged record is validated
    pub async fn update(&self, id: i64, patch: PhotoPatch) -> Result<Photo> {
        let existing = self
            .repo
            .get_photo(id)
            .await?
            .ok_or_else(|| AppError::not_found("photos", id))?;

        let merged = patch.apply(&existing);
        validate_photo_fields(&merged)?;

        let updated = self.repo.put_photo(&merged).await?;
        tracing::debug!("Photo updated successfully: {}", id);
        Ok(updated)
    }

    /// Deleting an absent id is a no-op
    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.repo.delete_photo(id).await? {
            tracing::info!("Photo deleted successfully: {}", id);
        }
        Ok(())
    }

    /// Total compressed bytes stored
    pub async fn get_storage_size(&self) -> i64 {
        match self.repo.photos_total_size().await {
            Ok(total) => {
                tracing::debug!("Total photo storage: {:.2}MB", total as f64 / 1024.0 / 1024.0);
                total
            }
            Err(e) => {
                tracing::error!("Failed to calculate storage size: {}", e);
                0
            }
        }
    }

    pub async fn count(&self) -> i64 {
        self.repo.count_photos().await.unwrap_or_else(|e| {
            tracing::error!("Failed to count photos: {}", e);
            0
        })
    }

    pub async fn clear(&self) -> Result<()> {
        tracing::info!("Clearing all photos");
        self.repo.clear_photos().await
    }
}
