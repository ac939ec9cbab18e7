pub mod contv;

pub use contv::ContvExtractor;
