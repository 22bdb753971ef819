//! GitHub GraphQL transport for `boardsync`.
//!
//! Implements the [`boardsync_core::BoardApi`] capability against the
//! GitHub GraphQL endpoint. Request documents are static GraphQL with
//! typed variables; nothing is spliced into the query text except the
//! account-kind root field, which comes from a closed enum. An absent
//! `afterCardId` reaches the wire as a JSON null, so "no anchor" can
//! never be confused with an empty string.

mod client;
mod queries;

pub use client::GithubClient;
