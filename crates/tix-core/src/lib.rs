//! tix-core library.
//!
//! Ticket model, creation validation, audit history, the update reconciler,
//! and the SQLite document store behind them.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums at module seams ([`error::TicketError`],
//!   [`store::StoreError`]); `anyhow::Result` for config and glue.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod validate;

pub use error::{ErrorCode, TicketError};
pub use service::{ListRequest, TicketService};
