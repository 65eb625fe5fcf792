//! filewire CLI Client
//!
//! Sends one command to a filewire server and prints the outcome.

use std::path::PathBuf;

use clap::Parser;
use filewire::config::{DEFAULT_BUFFER_SIZE, DEFAULT_PORT};
use filewire::protocol::Command;
use filewire::{Client, ClientConfig, Reply};
use tracing_subscriber::{fmt, EnvFilter};

/// filewire CLI
#[derive(Parser, Debug)]
#[command(name = "filewire-cli")]
#[command(about = "Client for the filewire remote file server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(long, default_value = "127.0.0.1")]
    ip: String,

    /// Server port, 1024-65535
    #[arg(short, long, default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1024..))]
    port: u16,

    /// Bytes per receive
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Where downloads are written and uploads are read from
    #[arg(short, long, default_value = ".")]
    local_dir: PathBuf,

    /// Read timeout in milliseconds, 0 waits forever
    #[arg(long, default_value_t = 0)]
    timeout_ms: u64,

    /// Command and its arguments, e.g. `DOWNLOAD_FILE notes.txt`
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    let command = match Command::parse(&args.command.join(" ")) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = ClientConfig::builder()
        .ip(&args.ip)
        .port(args.port)
        .buffer_size(args.buffer_size)
        .local_dir(&args.local_dir)
        .read_timeout_ms(args.timeout_ms)
        .build();

    println!("Mandando el comando: {} a la IP: {}", command, args.ip);

    let reply = match Client::new(config).send(&command) {
        Ok(reply) => reply,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    print_reply(&reply);
}

/// Remote failures are reported here only; the exit code stays 0
fn print_reply(reply: &Reply) {
    match reply {
        Reply::Text(response) => println!("Respuesta del servidor:\n{}", response.text),
        Reply::Downloaded { path, bytes } => {
            println!("Descargado correctamente ({} bytes)", bytes);
            println!("Fichero guardado en '{}'", path.display());
        }
        Reply::DownloadRejected(text) => println!("No se pudo descargar: {}", text),
        Reply::DownloadIncomplete { received, declared } => println!(
            "No se pudo descargar: recibidos {} de {} bytes",
            received, declared
        ),
        Reply::Uploaded { confirmed, message } => {
            if *confirmed {
                println!("Confirmación recibida");
            }
            if let Some(message) = message {
                println!("{}", message);
            }
        }
        Reply::UploadRejected(text) => println!("Error en UPLOAD_FILE: {}", text),
    }
}
