//! Version resolver implementations

mod dist_tags;
mod versions_page;

pub use dist_tags::DistTagResolver;
pub use versions_page::VersionsPageResolver;
