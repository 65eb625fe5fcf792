//! Upload sub-protocol (client → server)
//!
//! ```text
//! client                          server
//!   │  UPLOAD_FILE <file>           │
//!   │ ────────────────────────────► │
//!   │          "UPLOAD_ACK"         │
//!   │ ◄──────────────────────────── │
//!   │  "<len>"                      │
//!   │ ────────────────────────────► │  not a number → error text, end
//!   │          "UPLOAD_ACK"         │
//!   │ ◄──────────────────────────── │
//!   │  <len bytes>                  │
//!   │ ────────────────────────────► │  closed early → error text, end
//!   │       "DATA_RECEIVED\n"       │
//!   │  "SUCCESS: Fichero ... \n"    │
//!   │ ◄──────────────────────────── │
//! ```
//!
//! The client reads its file before connecting, so the server never waits
//! for a length that will not come because of a missing local file.

use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{FileWireError, Result};

use super::codec::{encode_length, expect_token, read_length, read_to_close, write_frame, Step};
use super::transfer::{checksum, Transfer, TransferOutcome};
use super::{DATA_RECEIVED, SUCCESS, UPLOAD_ACK};

/// Sent when the length frame does not parse
pub const INVALID_LENGTH: &str = "Error: tamaño de fichero inválido.";

/// Sent (best effort) when the client disconnects mid-payload
pub const CLOSED_EARLY: &str = "Error: conexión cerrada antes de recibir el fichero completo.";

// =============================================================================
// Server Side
// =============================================================================

enum ReceivePhase {
    Announce,
    AwaitLength,
    Confirm(u64),
    Receive(u64),
}

/// Drive the server half up to the end of the payload.
///
/// On `Step::Done` the caller stores the bytes and answers with
/// [`confirm`] or [`reject`]. On any other step the error text, if the
/// stream still allowed it, has already been sent.
pub fn receive<S: Read + Write>(stream: &mut S, chunk: usize) -> Result<Step<Bytes>> {
    let mut phase = ReceivePhase::Announce;

    loop {
        phase = match phase {
            ReceivePhase::Announce => {
                write_frame(stream, UPLOAD_ACK.as_bytes())?;
                ReceivePhase::AwaitLength
            }
            ReceivePhase::AwaitLength => match read_length(stream, chunk)? {
                Step::Done(len) => ReceivePhase::Confirm(len),
                Step::Malformed(frame) => {
                    tracing::warn!("Invalid upload length {:?}", frame);
                    write_frame(stream, INVALID_LENGTH.as_bytes())?;
                    return Ok(Step::Malformed(frame));
                }
                Step::PeerClosed => return Ok(Step::PeerClosed),
            },
            ReceivePhase::Confirm(len) => {
                write_frame(stream, UPLOAD_ACK.as_bytes())?;
                tracing::debug!("Accepted upload of {} bytes", len);
                ReceivePhase::Receive(len)
            }
            ReceivePhase::Receive(len) => {
                return match Transfer::new(len).receive_from(stream, chunk)? {
                    TransferOutcome::Complete(payload) => Ok(Step::Done(payload)),
                    TransferOutcome::Incomplete { received, declared } => {
                        tracing::warn!("Upload cut short at {} of {} bytes", received, declared);
                        if let Err(e) = write_frame(stream, CLOSED_EARLY.as_bytes()) {
                            tracing::debug!("Could not report short upload: {}", e);
                        }
                        Ok(Step::PeerClosed)
                    }
                };
            }
        };
    }
}

/// Completion token followed by the success line
pub fn confirm<W: Write>(stream: &mut W, stored_name: &str) -> Result<()> {
    write_frame(stream, format!("{}\n", DATA_RECEIVED).as_bytes())?;
    write_frame(
        stream,
        format!("{}: Fichero '{}' subido correctamente.\n", SUCCESS, stored_name).as_bytes(),
    )
}

/// Report a failure to store a fully received payload
pub fn reject<W: Write>(stream: &mut W, message: &str) -> Result<()> {
    write_frame(stream, message.as_bytes())
}

// =============================================================================
// Client Side
// =============================================================================

/// What the server said about an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Payload accepted; `message` is the `SUCCESS` line when one arrived
    Stored {
        confirmed: bool,
        message: Option<String>,
    },

    /// The server refused at some step; carries its text
    Rejected(String),
}

enum PushPhase {
    AwaitReady,
    Announce,
    AwaitConfirm,
    SendPayload,
    AwaitReceipt,
}

/// Drive the client half after the command line has been sent
pub fn push<S: Read + Write>(stream: &mut S, content: &[u8], chunk: usize) -> Result<UploadOutcome> {
    let mut phase = PushPhase::AwaitReady;

    loop {
        phase = match phase {
            PushPhase::AwaitReady => match await_upload_ack(stream, chunk)? {
                Some(text) => return Ok(UploadOutcome::Rejected(text)),
                None => PushPhase::Announce,
            },
            PushPhase::Announce => {
                write_frame(stream, &encode_length(content.len() as u64))?;
                PushPhase::AwaitConfirm
            }
            PushPhase::AwaitConfirm => match await_upload_ack(stream, chunk)? {
                Some(text) => return Ok(UploadOutcome::Rejected(text)),
                None => PushPhase::SendPayload,
            },
            PushPhase::SendPayload => {
                write_frame(stream, content)?;
                tracing::debug!(
                    bytes = content.len(),
                    crc32 = %format!("{:08x}", checksum(content)),
                    "Upload payload sent"
                );
                PushPhase::AwaitReceipt
            }
            PushPhase::AwaitReceipt => {
                let receipt = read_to_close(stream, chunk)?;
                return Ok(parse_receipt(&String::from_utf8_lossy(&receipt)));
            }
        };
    }
}

/// `None` once the acknowledgment arrived, otherwise the server's text
fn await_upload_ack<S: Read>(stream: &mut S, chunk: usize) -> Result<Option<String>> {
    match expect_token(stream, chunk, UPLOAD_ACK)? {
        Step::Done(()) => Ok(None),
        Step::Malformed(text) => Ok(Some(text)),
        Step::PeerClosed => Err(FileWireError::Protocol(format!(
            "server closed the connection instead of sending {}",
            UPLOAD_ACK
        ))),
    }
}

/// Interpret the newline-joined frames that close an upload
pub fn parse_receipt(text: &str) -> UploadOutcome {
    let mut confirmed = false;
    let mut message = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line == DATA_RECEIVED {
            confirmed = true;
        } else if line.starts_with(SUCCESS) {
            message = Some(line.to_string());
        } else if line.starts_with("Error") {
            return UploadOutcome::Rejected(line.to_string());
        }
    }

    if !confirmed && message.is_none() {
        return UploadOutcome::Rejected(text.trim().to_string());
    }

    UploadOutcome::Stored { confirmed, message }
}
