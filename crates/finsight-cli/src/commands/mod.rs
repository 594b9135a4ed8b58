//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analysis` - Anomalies, trends, forecast and recommendations
//! - `core` - Shared utilities (config, storage, dataset loaders)
//! - `import` - CSV import and demo data
//! - `reports` - Report generation, history and metrics
//! - `settings` - Settings show/set/reset
//! - `store` - Raw key-value store access

pub mod analysis;
pub mod core;
pub mod import;
pub mod reports;
pub mod settings;
pub mod store;

// Re-export command functions for main.rs
pub use analysis::*;
pub use self::core::*;
pub use import::*;
pub use reports::*;
pub use settings::*;
pub use store::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
