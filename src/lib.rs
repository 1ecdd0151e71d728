//! Client-side core for the CareLink support platform.
//!
//! Provides the typed API clients, the realtime subscription adapter, and
//! the chat reconciliation session that merges optimistic sends, realtime
//! pushes, and paginated history into one deduplicated, chronologically
//! ordered message list per conversation.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod realtime;
pub mod views;
