//! Library exports for snipmark.
//!
//! Exposes the drawing, history and clipboard transfer subsystems so the
//! binary, the schema dumper and integration tests share one implementation.

pub mod capture;
pub mod config;
pub mod draw;
pub mod history;
pub mod session;
pub mod transfer;
pub mod util;

pub use config::Config;
pub use session::Session;
