//! Parser layer
//! - types.rs: Common types (FeedItem, VersionRecord)
//! - feed.rs: registry RSS feed parser
//! - version_table.rs: versions page table scanner
//! - timestamp.rs: date parsing shared by both documents

pub mod feed;
pub mod timestamp;
pub mod types;
pub mod version_table;

pub use feed::FeedItemExtractor;
pub use types::{FeedItem, VersionRecord};
pub use version_table::{VersionRecords, VersionTableScanner};
