//! HTTP transport layer.

pub mod server;

pub use server::{create_server, start_server, AppState};
