#![allow(dead_code)]

pub mod registry;

#[allow(unused_imports)]
pub use registry::{MockRegistry, RecordingNotifier, rss_feed, versions_page};
