//! Protocol codec
//!
//! Framing primitives shared by both peers.
//!
//! ## Frames
//!
//! There is no delimiter on the wire. A frame is either:
//! - whatever a single bounded receive returns (command lines, tokens,
//!   replies), or
//! - exactly the number of bytes announced by a preceding length frame
//!   (the transfer payloads, see [`super::Transfer`]).
//!
//! ## Length frames
//! ```text
//! ┌────────────────────────────┐
//! │ decimal ASCII, e.g. "1048" │
//! └────────────────────────────┘
//! ```

use std::io::{ErrorKind, Read, Write};

use crate::error::Result;

/// Outcome of one handshake step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// The step completed with the expected value
    Done(T),

    /// The peer sent something else; carries the frame as text
    Malformed(String),

    /// The peer closed the stream before the step completed
    PeerClosed,
}

impl<T> Step<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done(_))
    }
}

// =============================================================================
// Bounded Frames
// =============================================================================

/// Perform one receive of at most `max` bytes.
///
/// Returns `None` when the peer has closed the stream.
pub fn read_frame<R: Read>(reader: &mut R, max: usize) -> Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; max.max(1)];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(n) => {
                buf.truncate(n);
                tracing::trace!("Read frame of {} bytes", n);
                return Ok(Some(buf));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Send one frame in full
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer.write_all(frame)?;
    writer.flush()?;
    tracing::trace!("Wrote frame of {} bytes", frame.len());
    Ok(())
}

/// Read until the peer closes, each receive bounded by `max`
pub fn read_to_close<R: Read>(reader: &mut R, max: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(frame) = read_frame(reader, max)? {
        out.extend_from_slice(&frame);
    }
    Ok(out)
}

// =============================================================================
// Tokens and Lengths
// =============================================================================

/// Read one frame and check it is exactly `token` (surrounding whitespace
/// is tolerated)
pub fn expect_token<R: Read>(reader: &mut R, max: usize, token: &str) -> Result<Step<()>> {
    let frame = match read_frame(reader, max)? {
        Some(frame) => frame,
        None => return Ok(Step::PeerClosed),
    };

    let text = String::from_utf8_lossy(&frame);
    if text.trim() == token {
        Ok(Step::Done(()))
    } else {
        Ok(Step::Malformed(text.into_owned()))
    }
}

/// Encode a payload length as a frame
pub fn encode_length(len: u64) -> Vec<u8> {
    len.to_string().into_bytes()
}

/// Parse a length frame
pub fn parse_length(frame: &[u8]) -> Step<u64> {
    let text = String::from_utf8_lossy(frame);
    match text.trim().parse::<u64>() {
        Ok(len) => Step::Done(len),
        Err(_) => Step::Malformed(text.into_owned()),
    }
}

/// Read one frame and parse it as a length
pub fn read_length<R: Read>(reader: &mut R, max: usize) -> Result<Step<u64>> {
    match read_frame(reader, max)? {
        Some(frame) => Ok(parse_length(&frame)),
        None => Ok(Step::PeerClosed),
    }
}
