//! Item picture commands.

use std::path::Path;

use crate::cli::args::{ImageCommands, OutputFormat};
use crate::config::ImageConfig;
use crate::error::ListAllError;
use crate::features::images::{looks_like_image, ImageProcessor};
use crate::output::{format_images, format_message, short_id};
use crate::storage::Database;

/// Execute image subcommands
///
/// # Errors
///
/// Returns an error if the item or image cannot be resolved, the picture
/// cannot be read or processed, or output formatting fails.
pub fn image(
    db: &Database,
    config: &ImageConfig,
    cmd: ImageCommands,
    format: OutputFormat,
) -> Result<String, ListAllError> {
    let processor = ImageProcessor::new(config.clone());

    db.transaction(|store| match cmd {
        ImageCommands::Attach { item, path, raw } => {
            let found = store.resolve_item(&item)?;
            let bytes = read_picture(&path)?;
            let data = if raw {
                processor.validate(&bytes)?;
                bytes
            } else {
                processor.compress(&bytes)?
            };

            let info = processor.info(&data)?;
            let attached = store.attach_image(found.id, data)?;
            format_message(
                &format!(
                    "Attached image {} ({}x{}, {} bytes) to {}",
                    short_id(attached.id),
                    info.width,
                    info.height,
                    info.bytes,
                    found.title
                ),
                format,
            )
        }
        ImageCommands::List { item } => {
            let found = store.resolve_item(&item)?;
            let images = store.images_for_item(found.id)?;
            format_images(&found, &images, format)
        }
        ImageCommands::Remove { image } => {
            let found = store.resolve_image(&image)?;
            store.delete_image(found.id)?;
            format_message(&format!("Removed image {}", short_id(found.id)), format)
        }
        ImageCommands::Thumbnail { image, out, size } => {
            let found = store.resolve_image(&image)?;
            let thumb = processor.thumbnail(&found.data, size)?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&out, &thumb).map_err(|e| {
                ListAllError::Image(format!("Failed to write {}: {e}", out.display()))
            })?;
            format_message(
                &format!("Wrote thumbnail ({} bytes) to {}", thumb.len(), out.display()),
                format,
            )
        }
    })
}

fn read_picture(path: &Path) -> Result<Vec<u8>, ListAllError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ListAllError::Image(format!("Failed to read {}: {e}", path.display())))?;
    if !looks_like_image(&bytes) {
        return Err(ListAllError::Image(format!(
            "{} is not a PNG or JPEG image",
            path.display()
        )));
    }
    Ok(bytes)
}
