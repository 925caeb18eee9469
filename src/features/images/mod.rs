//! Image compression and thumbnails for item attachments.

mod processor;

pub use processor::{looks_like_image, ImageInfo, ImageProcessor};
