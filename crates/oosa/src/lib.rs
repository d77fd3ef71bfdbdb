//! OOSA core library for outdoor events, activity ideas, and the attraction catalogue.

pub mod attractions;
pub mod events;
pub mod types;

pub use attractions::AttractionCatalog;
pub use events::{EventFilter, OosaClient};
pub use types::*;
