//! # roster-api
//!
//! The read API consumed by the dashboard and the VRChat in-world display,
//! built with Axum. This crate is a library; the `roster-bot` binary hosts
//! the server next to the gateway client so both share one process (and one
//! roster cache).

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, serve};
pub use state::AppState;
