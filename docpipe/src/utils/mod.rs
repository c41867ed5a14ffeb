//! Utility functions for timestamps and identifiers.

mod ids;
mod timestamps;

pub use ids::generate_project_id;
pub use timestamps::{iso_timestamp, Timestamp};
