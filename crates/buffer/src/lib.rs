//! Frame replacement policies for the Rustdb buffer pool.
//!
//! The buffer pool manager owns the physical frames; a [`Replacer`] only
//! tracks which frames were touched when and which of them are currently safe
//! to reclaim, and answers which frame to give up when the pool is full.
pub mod clock;
pub mod config;
pub mod replacer;
pub mod typedef;

pub use config::ReplacerConfig;
pub use replacer::lru_k_replacer::LrukReplacer;
pub use replacer::lru_replacer::LruReplacer;
pub use replacer::snapshot::{FrameSnapshot, ReplacerSnapshot};
pub use replacer::{AccessType, KDistance, Replacer};
pub use typedef::{FrameId, Timestamp};

pub(crate) type Result<T> = std::result::Result<T, rustdb_error::Error>;
