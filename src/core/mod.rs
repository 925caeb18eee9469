//! Core abstractions for listall.
//!
//! This module provides shared traits and the conflict rule used when
//! records from different sources meet.

mod conflict;
mod traits;

pub use conflict::{resolve_last_write_wins, Resolution};
pub use traits::{move_to_position, normalize_order, Ordered};
