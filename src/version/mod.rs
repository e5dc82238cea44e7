//! Version resolution layer
//!
//! This module turns a package name into "the version that was just
//! published", and remembers which (name, version) pairs were already seen.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│  Resolvers  │────▶│   Store     │
//! │  (fetch)    │     │ (pick ver.) │     │  (dedup)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │       │
//!                        ▼       ▼
//!              ┌─────────────┐ ┌─────────────┐
//!              │ Comparator  │ │  Selector   │
//!              │ (dist-tags) │ │ (nearest t) │
//!              └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`comparator`]: dotted numeric version comparison and `latest_of`
//! - [`selector`]: nearest-in-time ranking of version records
//! - [`registry`]: Registry trait for fetching feed and package metadata
//! - [`registries`]: Concrete registry implementations (npm)
//! - [`resolver`]: Version resolver trait
//! - [`resolvers`]: dist-tags and versions page resolvers
//! - [`store`]: SQLite record of reported packages
//! - [`error`]: Error types for registry, resolver and store operations
//! - [`types`]: Common types like `ResolvedPackage` and `RankedVersions`

pub mod comparator;
pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod resolvers;
pub mod selector;
pub mod store;
pub mod types;
