//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (plain text over TCP)
//!
//! One command per connection. The client sends a single line:
//! ```text
//! VERB [ARG1 [ARG2]]
//! ```
//! and the server answers with one text reply, or enters one of the two
//! bulk-transfer sub-protocols ([`download`], [`upload`]). Nothing on the
//! wire is newline-terminated by contract: a frame is one bounded receive,
//! or exactly the bytes announced by a preceding decimal length frame.
//!
//! ### Tokens
//! - `ACK`           - client is ready for a download payload
//! - `UPLOAD_ACK`    - server is ready for the next upload step
//! - `ERROR`         - download refused
//! - `DATA_RECEIVED` - upload payload fully stored
//! - `SUCCESS`       - prefix of every successful directory/move/upload reply

mod codec;
mod command;
mod response;
mod transfer;

pub mod download;
pub mod upload;

pub use codec::{
    encode_length, expect_token, parse_length, read_frame, read_length, read_to_close,
    write_frame, Step,
};
pub use command::{Command, Verb};
pub use download::DownloadOutcome;
pub use response::{Response, Status};
pub use transfer::{checksum, Transfer, TransferOutcome};
pub use upload::UploadOutcome;

pub const ACK: &str = "ACK";
pub const UPLOAD_ACK: &str = "UPLOAD_ACK";
pub const ERROR: &str = "ERROR";
pub const DATA_RECEIVED: &str = "DATA_RECEIVED";
pub const SUCCESS: &str = "SUCCESS";

pub const DELETED: &str = "DELETED";
pub const RENAMED: &str = "RENAMED";
pub const RENAME_ERROR: &str = "RENAME_ERROR";
pub const UNKNOWN_COMMAND: &str = "UNKNOWN_COMMAND";

/// Reply to `SHUTDOWN`
pub const SHUTDOWN_NOTICE: &str = "Servidor apagandose...\n";
