//! Configuration and dependency wiring for the content sync pipeline.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::SyncSettings;
