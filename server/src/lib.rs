//! Review server: share-link previews, notification subscriptions, and
//! canvas version storage over a pluggable document store.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`routes`] | Axum router and HTTP handlers |
//! | [`services`] | Share metadata, subscriptions, version commits |
//! | [`store`] | Document store trait with memory and Postgres backends |
//! | [`state`] | Shared handler state |
//! | [`config`] | Environment configuration |
//! | [`db`] | Postgres pool and migrations |

pub mod config;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
