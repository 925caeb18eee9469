//! What an export includes.

use crate::config::ExportConfig;

/// Content switches applied to every export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportOptions {
    pub include_crossed_out_items: bool,
    pub include_descriptions: bool,
    pub include_quantities: bool,
    pub include_dates: bool,
    pub include_archived_lists: bool,
    pub include_images: bool,
}

impl ExportOptions {
    /// Titles and completion state only.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            include_crossed_out_items: true,
            include_descriptions: false,
            include_quantities: false,
            include_dates: false,
            include_archived_lists: false,
            include_images: false,
        }
    }

    /// Everything, including archived lists and image payloads.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            include_crossed_out_items: true,
            include_descriptions: true,
            include_quantities: true,
            include_dates: true,
            include_archived_lists: true,
            include_images: true,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            include_crossed_out_items: config.include_crossed_out_items,
            include_descriptions: config.include_descriptions,
            include_quantities: config.include_quantities,
            include_dates: config.include_dates,
            include_archived_lists: config.include_archived_lists,
            include_images: config.include_images,
        }
    }
}
