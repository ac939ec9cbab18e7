pub mod downloader;
pub mod error;
pub mod extractor;
pub mod hls;
pub mod http;
pub mod metadata;

pub use downloader::Downloader;
pub use error::ExtractionError;
pub use extractor::{Extractor, ExtractorEngine};
pub use metadata::{
    Extraction, MediaRecord, PlaylistEntry, PlaylistRecord, StreamFormat, SubtitleTrack, Thumbnail,
};
