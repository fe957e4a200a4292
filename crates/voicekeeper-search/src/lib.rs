//! Player-search announcements for Voicekeeper.
//!
//! A member in a voice channel can put up a "looking for players"
//! announcement tied to that channel. Other members opt in and out
//! through the announcement's controls; the announcement re-renders on
//! every change, and a periodic reconciler retires announcements whose
//! channel is gone or whose owner has left it.
//!
//! # Key types
//!
//! - [`SearchSession`] — one live announcement and its opt-in set
//! - [`SearchBoard`] — owner-keyed registry (one session per member)
//! - [`SearchService`] — gateway-facing operations and the reconcile pass
//! - [`spawn_reconciler`] / [`ReconcilerHandle`] — the periodic sweep

mod board;
mod error;
mod reconciler;
mod render;
mod service;
mod session;

pub use board::SearchBoard;
pub use error::SearchError;
pub use reconciler::{spawn_reconciler, ReconcilerHandle};
pub use render::{render, RenderCaps};
pub use service::{ReconcileSummary, SearchConfig, SearchService};
pub use session::SearchSession;
