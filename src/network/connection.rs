//! Connection Handler
//!
//! Serves exactly one command on one accepted stream.

use std::net::TcpStream;
use std::time::Duration;

use crate::dispatcher::{Control, Dispatcher};
use crate::error::Result;
use crate::protocol::read_frame;

/// Handles a single client connection
pub struct Connection {
    /// Unbuffered so that every receive honors the configured bound
    stream: TcpStream,

    /// Upper bound of every receive
    buffer_size: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, buffer_size: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Tokens are tiny and each one waits for an answer
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            buffer_size,
            peer_addr,
        })
    }

    /// Configure connection timeouts (`None` blocks forever)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(read)?;
        self.stream.set_write_timeout(write)?;
        Ok(())
    }

    /// Read one command line, dispatch it, and report what the accept loop
    /// should do next.
    ///
    /// A peer that vanishes or stalls is logged and answered with
    /// `Control::Continue`; only unexpected failures surface as errors.
    pub fn handle(&mut self, dispatcher: &Dispatcher) -> Result<Control> {
        match self.serve(dispatcher) {
            Ok(control) => Ok(control),
            Err(e) if e.is_disconnect() => {
                tracing::warn!("Connection closed by {} mid-exchange: {}", self.peer_addr, e);
                Ok(Control::Continue)
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Timed out waiting on {}", self.peer_addr);
                Ok(Control::Continue)
            }
            Err(e) => Err(e),
        }
    }

    fn serve(&mut self, dispatcher: &Dispatcher) -> Result<Control> {
        let frame = match read_frame(&mut self.stream, self.buffer_size)? {
            Some(frame) => frame,
            None => {
                tracing::debug!("Client {} disconnected without a command", self.peer_addr);
                return Ok(Control::Continue);
            }
        };

        let line = String::from_utf8_lossy(&frame);
        tracing::info!("Got command from {}: {}", self.peer_addr, line.trim());

        dispatcher.dispatch(&line, &mut self.stream)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
