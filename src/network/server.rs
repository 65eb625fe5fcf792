//! TCP Server
//!
//! Sequential accept loop: accept, serve one command, close, repeat.
//!
//! ```text
//! LISTENING ──accept──► ACCEPTED ──read──► PROCESSING ──► CLOSED
//!     ▲                                                     │
//!     └──────────────────── Control::Continue ◄─────────────┤
//!                                                           │
//!                 TERMINATED ◄──── Control::Shutdown ◄──────┘
//! ```

use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

use socket2::{Domain, Protocol, Socket, Type};

use crate::config::Config;
use crate::dispatcher::{Control, Dispatcher};
use crate::error::{FileWireError, Result};

use super::Connection;

/// TCP server for filewire
pub struct Server {
    config: Config,
    listener: TcpListener,
    dispatcher: Dispatcher,
}

impl Server {
    /// Open the storage root and bind the listening socket
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::open(&config)?;
        let listener = create_listener(&config)?;

        tracing::info!(
            "Listening on {} (root {})",
            listener.local_addr()?,
            config.root_dir.display()
        );

        Ok(Self {
            config,
            listener,
            dispatcher,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Run until a client sends `SHUTDOWN` (blocking).
    ///
    /// Consumes the server so the listening socket is closed on return.
    pub fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };
            tracing::info!("Accepted client {}", peer);

            match self.serve(stream) {
                Control::Continue => {}
                Control::Shutdown => break,
            }
        }

        tracing::info!("Closing listener");
        Ok(())
    }

    fn serve(&self, stream: std::net::TcpStream) -> Control {
        let mut connection = match Connection::new(stream, self.config.buffer_size) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Could not set up connection: {}", e);
                return Control::Continue;
            }
        };

        let timeouts = connection.set_timeouts(self.config.read_timeout(), self.config.write_timeout());
        if let Err(e) = timeouts {
            tracing::warn!("Could not set timeouts for {}: {}", connection.peer_addr(), e);
        }

        match connection.handle(&self.dispatcher) {
            Ok(control) => control,
            Err(e) => {
                tracing::warn!("Error serving {}: {}", connection.peer_addr(), e);
                Control::Continue
            }
        }
        // connection dropped here: the stream is closed
    }
}

/// Listening socket with SO_REUSEADDR and the configured backlog
fn create_listener(config: &Config) -> Result<TcpListener> {
    let addr = config
        .listen_addr()
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| FileWireError::Config(format!("cannot resolve {}", config.listen_addr())))?;

    let socket = Socket::new(
        match addr {
            SocketAddr::V4(_) => Domain::IPV4,
            SocketAddr::V6(_) => Domain::IPV6,
        },
        Type::STREAM,
        Some(Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(config.backlog)?;

    Ok(socket.into())
}
