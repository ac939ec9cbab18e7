pub mod cli;
pub mod config;
pub mod core;
pub mod extractors;
pub mod utils;

pub use self::core::{Extraction, ExtractorEngine, MediaRecord, PlaylistRecord, StreamFormat};
pub use self::extractors::ContvExtractor;
