//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single thread, blocking I/O
//! - One connection at a time, one command per connection
//! - Commands routed through the Dispatcher

mod client;
mod connection;
mod server;

pub use client::{Client, Reply};
pub use connection::Connection;
pub use server::Server;
