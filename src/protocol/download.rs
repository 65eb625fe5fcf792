//! Download sub-protocol (server → client)
//!
//! ```text
//! client                          server
//!   │  DOWNLOAD_FILE <file>         │
//!   │ ────────────────────────────► │  not a regular file → "ERROR", end
//!   │            "<len>"            │
//!   │ ◄──────────────────────────── │
//!   │  "ACK"                        │
//!   │ ────────────────────────────► │  anything else → "ERROR", end
//!   │         <len bytes>           │
//!   │ ◄──────────────────────────── │
//! ```

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{FileWireError, Result};

use super::codec::{encode_length, expect_token, read_length, write_frame, Step};
use super::transfer::{checksum, Transfer, TransferOutcome};
use super::{ACK, ERROR};

// =============================================================================
// Server Side
// =============================================================================

enum ServePhase {
    Announce,
    AwaitAck,
    SendPayload,
}

/// Drive the server half once the file has been read.
///
/// `Step::Malformed` means the client answered the length with something
/// other than the acknowledgment; the error token has already been sent.
pub fn serve<S: Read + Write>(stream: &mut S, content: &[u8], chunk: usize) -> Result<Step<()>> {
    let mut phase = ServePhase::Announce;

    loop {
        phase = match phase {
            ServePhase::Announce => {
                write_frame(stream, &encode_length(content.len() as u64))?;
                tracing::debug!("Announced download of {} bytes", content.len());
                ServePhase::AwaitAck
            }
            ServePhase::AwaitAck => match expect_token(stream, chunk, ACK)? {
                Step::Done(()) => ServePhase::SendPayload,
                Step::Malformed(frame) => {
                    tracing::warn!("Expected {}, got {:?}", ACK, frame);
                    write_frame(stream, ERROR.as_bytes())?;
                    return Ok(Step::Malformed(frame));
                }
                Step::PeerClosed => return Ok(Step::PeerClosed),
            },
            ServePhase::SendPayload => {
                write_frame(stream, content)?;
                tracing::debug!(
                    bytes = content.len(),
                    crc32 = %format!("{:08x}", checksum(content)),
                    "Download payload sent"
                );
                return Ok(Step::Done(()));
            }
        };
    }
}

// =============================================================================
// Client Side
// =============================================================================

/// What the client ended up with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The whole announced payload
    Complete(Bytes),

    /// The server answered with text instead of a length
    Rejected(String),

    /// The server closed the stream short of the announced length
    Incomplete { received: usize, declared: u64 },
}

enum FetchPhase {
    AwaitLength,
    Acknowledge(u64),
    Receive(u64),
}

/// Drive the client half after the command line has been sent
pub fn fetch<S: Read + Write>(stream: &mut S, chunk: usize) -> Result<DownloadOutcome> {
    let mut phase = FetchPhase::AwaitLength;

    loop {
        phase = match phase {
            FetchPhase::AwaitLength => match read_length(stream, chunk)? {
                Step::Done(len) => {
                    tracing::debug!("Server announced {} bytes", len);
                    FetchPhase::Acknowledge(len)
                }
                Step::Malformed(text) => return Ok(DownloadOutcome::Rejected(text)),
                Step::PeerClosed => {
                    return Err(FileWireError::Protocol(
                        "server closed the connection before announcing a length".to_string(),
                    ))
                }
            },
            FetchPhase::Acknowledge(len) => {
                write_frame(stream, ACK.as_bytes())?;
                FetchPhase::Receive(len)
            }
            FetchPhase::Receive(len) => {
                return match Transfer::new(len).receive_from(stream, chunk)? {
                    TransferOutcome::Complete(payload) => Ok(DownloadOutcome::Complete(payload)),
                    TransferOutcome::Incomplete { received, declared } => {
                        Ok(DownloadOutcome::Incomplete { received, declared })
                    }
                };
            }
        };
    }
}
