pub mod app;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod parser;
pub mod server;
pub mod version;
