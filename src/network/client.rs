//! Client
//!
//! The peer side of every exchange. One command per connection, as the
//! server expects.

use std::fs;
use std::net::TcpStream;
use std::path::PathBuf;

use crate::config::ClientConfig;
use crate::error::{FileWireError, Result};
use crate::protocol::{
    download, read_to_close, upload, write_frame, Command, DownloadOutcome, Response,
    UploadOutcome,
};
use crate::storage::base_name;

/// What a command produced on the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Reply to a one-shot command
    Text(Response),

    /// Download stored locally
    Downloaded { path: PathBuf, bytes: usize },

    /// Server answered the download with text instead of a length
    DownloadRejected(String),

    /// Server closed short of the announced length; nothing was written
    DownloadIncomplete { received: usize, declared: u64 },

    /// Upload accepted
    Uploaded {
        confirmed: bool,
        message: Option<String>,
    },

    /// Upload refused by the server
    UploadRejected(String),
}

/// Blocking client
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Parse and send a command line
    pub fn send_line(&self, line: &str) -> Result<Reply> {
        let command = Command::parse(line)?;
        self.send(&command)
    }

    /// Send one command on a fresh connection and wait for its outcome
    pub fn send(&self, command: &Command) -> Result<Reply> {
        match command {
            Command::UploadFile { file } => {
                // Read first: the server must not be left waiting for a length
                let content = self.read_local(file)?;
                let mut stream = self.open(command)?;
                match upload::push(&mut stream, &content, self.config.buffer_size)? {
                    UploadOutcome::Stored { confirmed, message } => {
                        Ok(Reply::Uploaded { confirmed, message })
                    }
                    UploadOutcome::Rejected(text) => Ok(Reply::UploadRejected(text)),
                }
            }
            Command::DownloadFile { file } => {
                let mut stream = self.open(command)?;
                match download::fetch(&mut stream, self.config.buffer_size)? {
                    DownloadOutcome::Complete(payload) => {
                        let path = self.save_download(file, &payload)?;
                        Ok(Reply::Downloaded {
                            path,
                            bytes: payload.len(),
                        })
                    }
                    DownloadOutcome::Rejected(text) => Ok(Reply::DownloadRejected(text)),
                    DownloadOutcome::Incomplete { received, declared } => {
                        tracing::warn!("Download of '{}' stopped at {} of {} bytes", file, received, declared);
                        Ok(Reply::DownloadIncomplete { received, declared })
                    }
                }
            }
            _ => {
                let mut stream = self.open(command)?;
                let reply = read_to_close(&mut stream, self.config.buffer_size)?;
                Ok(Reply::Text(Response::from_wire(&reply)))
            }
        }
    }

    /// Connect and send the command line
    fn open(&self, command: &Command) -> Result<TcpStream> {
        let addr = self.config.server_addr();
        let mut stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.config.read_timeout())?;

        let line = command.to_string();
        tracing::debug!("Sending {:?} to {}", line, addr);
        write_frame(&mut stream, line.as_bytes())?;
        Ok(stream)
    }

    fn read_local(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.config.local_dir.join(file);
        fs::read(&path).map_err(|source| FileWireError::LocalFile { path, source })
    }

    /// Write under the local directory using the requested base name
    fn save_download(&self, file: &str, payload: &[u8]) -> Result<PathBuf> {
        let path = self.config.local_dir.join(base_name(file)?);
        fs::write(&path, payload)?;
        Ok(path)
    }
}
