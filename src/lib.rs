//! # filewire
//!
//! A minimal remote file-management protocol over TCP:
//! - One textual command per connection
//! - Thin filesystem operations (list, delete, rename, move, directories)
//! - Length-prefixed bulk transfers for downloads and uploads
//! - Strictly sequential, blocking server
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one connection at a time)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Dispatcher                                │
//! │         (verb → operation, outcome → reply text)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Transfers  │          │   Storage   │
//!   │ (down / up) │          │ (root dir)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod dispatcher;
pub mod network;
pub mod protocol;
pub mod storage;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{ClientConfig, Config};
pub use dispatcher::{Control, Dispatcher};
pub use error::{FileWireError, Result};
pub use network::{Client, Reply, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of filewire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
