//! Configuration for filewire
//!
//! Centralized configuration with sensible defaults. The server can also
//! read a TOML file; values given on the command line win over the file.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{FileWireError, Result};

/// Default size of every bounded read, shared by both peers
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default TCP port
pub const DEFAULT_PORT: u16 = 5005;

/// Ports a user may pick (the privileged range is refused)
pub const PORT_RANGE: RangeInclusive<u16> = 1024..=65535;

/// Check a user supplied port against [`PORT_RANGE`]
pub fn validate_port(port: u16) -> Result<u16> {
    if PORT_RANGE.contains(&port) {
        Ok(port)
    } else {
        Err(FileWireError::Config(format!(
            "port {} outside {}-{}",
            port,
            PORT_RANGE.start(),
            PORT_RANGE.end()
        )))
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Bind address (any-interface by default)
    pub ip: String,

    /// Bind port
    pub port: u16,

    /// Pending connections queued by the kernel
    pub backlog: i32,

    /// Upper bound of every receive call
    pub buffer_size: usize,

    /// Connection read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = wait forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Filesystem Configuration
    // -------------------------------------------------------------------------
    /// Directory every path argument is resolved against.
    /// Not a sandbox: `..` and absolute paths still escape it.
    pub root_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            backlog: 1,
            buffer_size: DEFAULT_BUFFER_SIZE,
            read_timeout_ms: 30_000,
            write_timeout_ms: 30_000,
            root_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `ip:port` as handed to the socket layer
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(FileWireError::Config("buffer size must be positive".to_string()));
        }
        if self.backlog < 1 {
            return Err(FileWireError::Config("backlog must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Build a config from TOML text on top of the defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: TomlConfig =
            toml::from_str(text).map_err(|e| FileWireError::Config(e.to_string()))?;
        Self::from_toml(&file)
    }

    /// Apply the `[server]` table of a parsed file on top of the defaults
    pub fn from_toml(file: &TomlConfig) -> Result<Self> {
        let mut builder = Config::builder();
        let server = &file.server;

        if let Some(ip) = &server.ip {
            builder = builder.ip(ip.as_str());
        }
        if let Some(port) = server.port {
            builder = builder.port(validate_port(port)?);
        }
        if let Some(backlog) = server.backlog {
            builder = builder.backlog(backlog);
        }
        if let Some(size) = server.buffer_size {
            builder = builder.buffer_size(size);
        }
        if let Some(ms) = server.read_timeout_ms {
            builder = builder.read_timeout_ms(ms);
        }
        if let Some(ms) = server.write_timeout_ms {
            builder = builder.write_timeout_ms(ms);
        }
        if let Some(root) = &server.root_dir {
            builder = builder.root_dir(root.as_path());
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the bind address
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.config.ip = ip.into();
        self
    }

    /// Set the bind port (0 picks an ephemeral port)
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the listen backlog
    pub fn backlog(mut self, backlog: i32) -> Self {
        self.config.backlog = backlog;
        self
    }

    /// Set the bounded read size
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the directory path arguments are resolved against
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address
    pub ip: String,

    /// Server port
    pub port: u16,

    /// Upper bound of every receive call
    pub buffer_size: usize,

    /// Directory downloads are written into
    pub local_dir: PathBuf,

    /// Read timeout (milliseconds, 0 = wait forever)
    pub read_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            local_dir: PathBuf::from("."),
            read_timeout_ms: 0,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.config.ip = ip.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    pub fn local_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.local_dir = path.into();
        self
    }

    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// =============================================================================
// TOML File Layout
// =============================================================================

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[server]` table; every key is optional
#[derive(Debug, Deserialize, Default)]
pub struct ServerSection {
    pub ip: Option<String>,
    pub port: Option<u16>,
    pub backlog: Option<i32>,
    pub buffer_size: Option<usize>,
    pub read_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
    pub root_dir: Option<PathBuf>,
}

/// `[logging]` table
#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub level: Option<String>,
}

impl TomlConfig {
    /// Parse a file without applying it, so the binary can read `[logging]`
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            FileWireError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&text).map_err(|e| FileWireError::Config(e.to_string()))
    }
}
