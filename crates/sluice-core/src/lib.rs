//! sluice-core library.
//!
//! The complaint lifecycle engine: the [`model`] for a citizen complaint, the
//! [`lifecycle`] state machine that moves it forward, the [`store`] that owns
//! and persists the collection, the [`timeline`] projection shown back to the
//! submitter, and the demonstration [`advancer`] that drives complaints
//! through their statuses on fixed delays.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums inside the library, `anyhow::Result` at the edges.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod advancer;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod storage;
pub mod store;
pub mod timeline;
