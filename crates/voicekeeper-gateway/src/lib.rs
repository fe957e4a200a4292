//! Platform boundary for Voicekeeper.
//!
//! The bot core never calls a platform client directly. Everything it
//! needs from the chat platform — channel CRUD, member moves, role
//! grants, announcement messages — is expressed as the [`Gateway`] trait,
//! and the embedding process implements it against the real client.
//!
//! # Key types
//!
//! - [`Gateway`] — the capability trait the core is generic over
//! - [`GatewayError`] — the platform failure taxonomy
//! - [`InMemoryGateway`] — a map-backed implementation that drives the
//!   test suites and local experiments

mod error;
mod gateway;
mod memory;

pub use error::GatewayError;
pub use gateway::{
    Capabilities, Gateway, NewVoiceChannel, RoleInfo, VoiceChannelInfo,
};
pub use memory::InMemoryGateway;
