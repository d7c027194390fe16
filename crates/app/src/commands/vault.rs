//! Vault image commands
//!
//! Upload, fetch and delete scanned document images in the local store.

use std::time::Instant;

use chrono::Utc;
use openbooks_domain::{Result, StoredImage};
use uuid::Uuid;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Store an uploaded image in the local vault.
pub async fn upload_image(
    ctx: &AppContext,
    owner_id: &str,
    file_name: &str,
    mime_type: &str,
    data: Vec<u8>,
) -> Result<StoredImage> {
    let started = Instant::now();
    let image = StoredImage {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        file_name: file_name.to_string(),
        mime_type: mime_type.to_string(),
        data,
        created_at: Utc::now().timestamp(),
    };
    let result = ctx.image_store.save_image(&image).await.map(|()| image);
    log_command_execution("vault::upload_image", started.elapsed(), result.is_ok());
    result
}

/// Fetch an image by id.
pub async fn get_image(ctx: &AppContext, id: &str) -> Result<Option<StoredImage>> {
    let started = Instant::now();
    let result = ctx.image_store.get_image(id).await;
    log_command_execution("vault::get_image", started.elapsed(), result.is_ok());
    result
}

/// List an owner's vault images, most recent first.
pub async fn list_images(ctx: &AppContext, owner_id: &str) -> Result<Vec<StoredImage>> {
    let started = Instant::now();
    let result = ctx.image_store.list_images(owner_id).await;
    log_command_execution("vault::list_images", started.elapsed(), result.is_ok());
    result
}

/// Delete an image from the vault.
pub async fn delete_image(ctx: &AppContext, id: &str) -> Result<()> {
    let started = Instant::now();
    let result = ctx.image_store.delete_image(id).await;
    log_command_execution("vault::delete_image", started.elapsed(), result.is_ok());
    result
}
