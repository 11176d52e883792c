pub mod aggregator;
pub mod checks;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod error;
pub mod findings;
pub mod logging;
pub mod notify;
pub mod run;
pub mod transport;
pub mod types;

pub use aggregator::{AuditSummary, FindingCollector};
pub use cli::Cli;
pub use config::Config;
pub use error::{BotError, Result};
pub use findings::{CheckKind, Finding, FindingSet};
pub use notify::{PrincipalChatMap, Router};
