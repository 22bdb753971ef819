//! Core reconciliation engine for `boardsync`.
//!
//! Converges a kanban-style project board toward the live state of the
//! issues and pull requests it tracks. The engine is transport-agnostic:
//! every outbound call goes through the [`api::BoardApi`] capability, so
//! the GraphQL client, a dry-run recorder, and the in-memory test double
//! all plug into the same reconciliation loop.
//!
//! Module map:
//! - [`types`] — wire-shaped domain model (connections, cards, columns)
//! - [`paginate`] — cursor pagination and the complete-view check
//! - [`index`] — content-id → card lookup used to decide add vs. move
//! - [`classify`] — pure status policy mapping items to target columns
//! - [`notes`] — keeps free-text note cards above content cards
//! - [`reconcile`] — the per-item state machine and run orchestration
//! - [`pitch`] — secondary report: labeled in-progress issues → note card
//! - [`config`] — TOML + env configuration and the API token

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod index;
pub mod notes;
pub mod paginate;
pub mod pitch;
pub mod reconcile;
pub mod types;

pub use api::BoardApi;
pub use classify::Target;
pub use config::{AccountKind, SecretToken, SyncConfig};
pub use error::BoardError;
pub use reconcile::{SyncReport, sync_board};
