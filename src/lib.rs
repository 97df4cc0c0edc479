// Receipt Processor - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod error;
pub mod receipt;
pub mod rules;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{ScoreError, StoreError};
pub use receipt::{Amount, Item, NewReceipt, Receipt};
pub use rules::{
    compute_points, PointRule, PointsBreakdown, RuleContribution, RuleEngine, SkippedRule,
};
pub use store::{InMemoryReceiptStore, ReceiptStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
