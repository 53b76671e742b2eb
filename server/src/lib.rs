//! Blockverse relay server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod auth;
pub mod config;
pub mod player;
pub mod policy;
pub mod registry;
pub mod relay;
pub mod room;
pub mod session;
pub mod ws;
