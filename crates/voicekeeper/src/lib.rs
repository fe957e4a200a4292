//! # Voicekeeper
//!
//! Community-management bot core for a gaming guild: on-demand voice
//! rooms that clean themselves up, live "looking for players"
//! announcements, nickname-format verification, and leave-of-absence
//! tracking.
//!
//! The crate is platform-agnostic — the embedding process implements
//! [`Gateway`](voicekeeper_gateway::Gateway) against its chat platform
//! client and feeds the [`Coordinator`] voice presence updates, text
//! commands, and control activations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voicekeeper::{BotConfig, Coordinator};
//! use voicekeeper_gateway::InMemoryGateway;
//!
//! # async fn run() {
//! let gateway = Arc::new(InMemoryGateway::new());
//! let bot = Arc::new(Coordinator::new(gateway, BotConfig::default()));
//! bot.startup_check().await;
//! let reconciler = bot.start_reconciler();
//! // feed bot.on_voice_update / on_command / on_control from the platform…
//! reconciler.shutdown().await;
//! # }
//! ```

mod commands;
mod config;
mod cooldown;
mod coordinator;
mod error;
mod leave;
mod verify;

pub use commands::Command;
pub use config::{BotConfig, LeaveConfig, VerificationConfig};
pub use cooldown::CooldownMap;
pub use coordinator::{Coordinator, SearchControl};
pub use error::BotError;
pub use leave::{LeaveBook, LeaveDuration, LeaveRecord};
pub use verify::{NickFormat, ParsedNick, VerifiedPlayer, VerifiedRegistry};

/// Installs a `tracing` subscriber honoring `RUST_LOG`, for embedders
/// that don't bring their own.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
