//! HTTP API consumed by the bundled web UI.

pub mod handlers;
pub mod models;
pub mod server;

pub use server::start_http_server;
