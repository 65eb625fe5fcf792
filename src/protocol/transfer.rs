//! Bulk payload accumulator
//!
//! A transfer owns the bytes of one announced payload. It is complete only
//! when the number of bytes received equals the announced length; the
//! stream closing first is reported, never papered over.

use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::Result;

/// Upper bound on the buffer reserved up front, whatever the peer announces
const PREALLOC_LIMIT: u64 = 1024 * 1024;

/// Result of draining a transfer from a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Exactly the announced number of bytes
    Complete(Bytes),

    /// The stream closed after `received` of `declared` bytes
    Incomplete { received: usize, declared: u64 },
}

/// An in-flight payload of declared length
#[derive(Debug)]
pub struct Transfer {
    declared: u64,
    buffer: BytesMut,
}

impl Transfer {
    pub fn new(declared: u64) -> Self {
        let capacity = declared.min(PREALLOC_LIMIT) as usize;
        Self {
            declared,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    pub fn declared(&self) -> u64 {
        self.declared
    }

    pub fn received(&self) -> usize {
        self.buffer.len()
    }

    pub fn remaining(&self) -> u64 {
        self.declared.saturating_sub(self.buffer.len() as u64)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Receive until the declared length is reached or the peer closes.
    ///
    /// Every read asks for at most `chunk` bytes and never for more than
    /// what is still owed, so bytes past the payload stay in the stream.
    pub fn receive_from<R: Read>(mut self, reader: &mut R, chunk: usize) -> Result<TransferOutcome> {
        let mut scratch = vec![0u8; chunk.max(1)];

        while !self.is_complete() {
            let want = self.remaining().min(scratch.len() as u64) as usize;
            let n = match reader.read(&mut scratch[..want]) {
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                tracing::debug!(
                    "Stream closed after {} of {} bytes",
                    self.received(),
                    self.declared
                );
                return Ok(TransferOutcome::Incomplete {
                    received: self.received(),
                    declared: self.declared,
                });
            }

            self.buffer.extend_from_slice(&scratch[..n]);
        }

        let payload = self.buffer.freeze();
        tracing::debug!(
            bytes = payload.len(),
            crc32 = %format!("{:08x}", checksum(&payload)),
            "Transfer complete"
        );
        Ok(TransferOutcome::Complete(payload))
    }
}

/// CRC-32 of a payload, logged by both peers so transfers can be compared
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
