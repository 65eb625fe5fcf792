//! Dispatcher Module
//!
//! Routes one parsed command line to the storage layer or into a transfer
//! sub-protocol, and turns the outcome into the reply the client reads.
//!
//! ## Responsibilities
//! - Answer arity failures with the verb's own error text, before any
//!   filesystem access
//! - Map typed storage errors to the wire messages
//! - Tell the accept loop whether to keep going

use std::io::{Read, Write};

use crate::config::Config;
use crate::error::{FileWireError, Result};
use crate::protocol::{
    download, upload, write_frame, Command, Response, Step, Verb, DELETED, ERROR, RENAMED,
    RENAME_ERROR, SHUTDOWN_NOTICE, SUCCESS, UNKNOWN_COMMAND,
};
use crate::storage::StorageManager;

/// What the accept loop does after a connection is served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Shutdown,
}

/// Usage text sent for `HELP`
pub const HELP_TEXT: &str = "
Comandos disponibles:

1. SHUTDOWN
   - Apaga el servidor.
   - Uso: SHUTDOWN

2. LIST_FILES [ruta]
   - Lista solo los ficheros en la ruta indicada (por defecto la actual).
   - Uso: LIST_FILES [ruta]

3. DOWNLOAD_FILE <fichero>
   - Descarga un fichero desde el servidor al cliente.
   - Uso: DOWNLOAD_FILE <nombre_fichero>

4. DELETE_FILE <fichero>
   - Borra un fichero en el servidor.
   - Uso: DELETE_FILE <nombre_fichero>

5. UPLOAD_FILE <fichero>
   - Sube un fichero desde el cliente al servidor.
   - Uso: UPLOAD_FILE <nombre_fichero>

6. MOVE_FILE <fichero> <destino>
   - Mueve un fichero a un directorio destino.
   - Uso: MOVE_FILE <nombre_fichero> <ruta_destino>

7. CREATE_DIR <nombre>
   - Crea un nuevo directorio en el servidor.
   - Uso: CREATE_DIR <nombre_directorio>

8. DELETE_DIR <nombre>
   - Borra un directorio en el servidor.
   - Uso: DELETE_DIR <nombre_directorio>

9. LIST_DIR [ruta]
   - Lista los subdirectorios en la ruta indicada (por defecto la actual).
   - Uso: LIST_DIR [ruta]

10. RENAME_FILE <fichero> <nuevo_nombre>
    - Renombra un fichero existente.
    - Uso: RENAME_FILE <nombre_actual> <nuevo_nombre>

11. HELP
    - Muestra esta ayuda.
    - Uso: HELP
";

/// Placeholder when a listing finds no regular files
pub const NO_FILES: &str = "No hay archivos en la ruta.";

/// Routes commands for one server
pub struct Dispatcher {
    storage: StorageManager,

    /// Bound on every receive inside the sub-protocols
    buffer_size: usize,
}

impl Dispatcher {
    pub fn new(storage: StorageManager, buffer_size: usize) -> Self {
        Self {
            storage,
            buffer_size,
        }
    }

    /// Open the storage root named by the config
    pub fn open(config: &Config) -> Result<Self> {
        let storage = StorageManager::open(&config.root_dir)?;
        Ok(Self::new(storage, config.buffer_size))
    }

    /// Serve one command line received on `stream`
    pub fn dispatch<S: Read + Write>(&self, line: &str, stream: &mut S) -> Result<Control> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(FileWireError::MissingArgument { verb }) => {
                tracing::debug!("Missing argument for {}", verb);
                write_frame(stream, missing_argument_reply(verb).as_bytes())?;
                return Ok(Control::Continue);
            }
            Err(e) => return Err(e),
        };

        match command {
            Command::DownloadFile { file } => self.serve_download(stream, &file),
            Command::UploadFile { file } => self.serve_upload(stream, &file),
            Command::Shutdown => {
                tracing::info!("Shutdown requested by client");
                write_frame(stream, SHUTDOWN_NOTICE.as_bytes())?;
                Ok(Control::Shutdown)
            }
            one_shot => {
                // Stream-level verbs are matched above, so a reply always exists
                let response = self
                    .execute(&one_shot)
                    .unwrap_or_else(|| Response::error(UNKNOWN_COMMAND));
                tracing::debug!("{:?} -> {:?}", one_shot, response.status);
                write_frame(stream, response.as_bytes())?;
                Ok(Control::Continue)
            }
        }
    }

    /// Reply to a command that needs no further exchange.
    ///
    /// `None` for the two transfer verbs, which need the stream, and for
    /// `SHUTDOWN`, which also stops the accept loop.
    pub fn execute(&self, command: &Command) -> Option<Response> {
        let response = match command {
            Command::ListFiles { path } => list_files_reply(path, self.storage.list_files(path)),
            Command::ListDir { path } => list_dir_reply(path, self.storage.list_dirs(path)),
            Command::DeleteFile { file } => match self.storage.delete_file(file) {
                Ok(()) => Response::ok(DELETED),
                Err(e) => {
                    tracing::debug!("DELETE_FILE {}: {}", file, e);
                    Response::error(ERROR)
                }
            },
            Command::RenameFile { file, new_name } => {
                match self.storage.rename_file(file, new_name) {
                    Ok(()) => Response::ok(RENAMED),
                    Err(e) => {
                        tracing::debug!("RENAME_FILE {} {}: {}", file, new_name, e);
                        Response::error(RENAME_ERROR)
                    }
                }
            }
            Command::MoveFile { file, dest_dir } => {
                move_file_reply(file, dest_dir, self.storage.move_file(file, dest_dir))
            }
            Command::CreateDir { name } => create_dir_reply(name, self.storage.create_dir(name)),
            Command::DeleteDir { name } => delete_dir_reply(name, self.storage.delete_dir(name)),
            Command::Help => Response::ok(HELP_TEXT),
            Command::Unknown { verb } => {
                tracing::debug!("Unknown verb {:?}", verb);
                Response::error(UNKNOWN_COMMAND)
            }
            Command::DownloadFile { .. } | Command::UploadFile { .. } | Command::Shutdown => {
                return None
            }
        };
        Some(response)
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    fn serve_download<S: Read + Write>(&self, stream: &mut S, file: &str) -> Result<Control> {
        let content = match self.storage.read_file(file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Download of '{}' refused: {}", file, e);
                write_frame(stream, ERROR.as_bytes())?;
                return Ok(Control::Continue);
            }
        };

        match download::serve(stream, &content, self.buffer_size)? {
            Step::Done(()) => tracing::info!("Sent '{}' ({} bytes)", file, content.len()),
            Step::Malformed(_) => {}
            Step::PeerClosed => tracing::debug!("Client left before acknowledging '{}'", file),
        }
        Ok(Control::Continue)
    }

    fn serve_upload<S: Read + Write>(&self, stream: &mut S, file: &str) -> Result<Control> {
        let payload = match upload::receive(stream, self.buffer_size)? {
            Step::Done(payload) => payload,
            Step::Malformed(_) | Step::PeerClosed => return Ok(Control::Continue),
        };

        match self.storage.store_upload(file, &payload) {
            Ok(stored) => {
                tracing::info!("Stored upload '{}' as '{}' ({} bytes)", file, stored, payload.len());
                upload::confirm(stream, &stored)?;
            }
            Err(e) => {
                tracing::warn!("Storing upload '{}' failed: {}", file, e);
                upload::reject(stream, &upload_error_reply(file, &e))?;
            }
        }
        Ok(Control::Continue)
    }
}

// =============================================================================
// Reply Mapping
// =============================================================================

/// Per-verb text for a command line that lacks a required argument
pub fn missing_argument_reply(verb: Verb) -> Response {
    match verb {
        Verb::DownloadFile => Response::error("Error: Debes especificar el fichero a descargar."),
        Verb::UploadFile => Response::error("Error: Debes especificar un nombre de fichero."),
        Verb::DeleteFile => Response::error(ERROR),
        Verb::RenameFile => Response::error(RENAME_ERROR),
        Verb::MoveFile => Response::error("Error: Debes especificar fichero y destino."),
        Verb::CreateDir => Response::error("Error: Debes especificar un nombre de directorio."),
        Verb::DeleteDir => Response::error("ERROR: Debes especificar un nombre de directorio."),
        // These take no required argument
        Verb::ListFiles | Verb::ListDir | Verb::Help | Verb::Shutdown => Response::error(ERROR),
    }
}

fn listing_error(path: &str, error: &FileWireError) -> Response {
    match error {
        FileWireError::NotFound(_) => Response::error(format!("Error: La ruta '{}' no existe.", path)),
        FileWireError::NotADirectory(_) => {
            Response::error(format!("Error: '{}' no es un directorio.", path))
        }
        FileWireError::PermissionDenied(_) => Response::error(format!(
            "Error: No tienes permisos para acceder a '{}'.",
            path
        )),
        other => Response::error(format!("Error al listar '{}': {}", path, other)),
    }
}

fn list_files_reply(path: &str, result: Result<Vec<String>>) -> Response {
    match result {
        Ok(files) if files.is_empty() => Response::ok(NO_FILES),
        Ok(files) => Response::ok(files.join("\n")),
        Err(e) => listing_error(path, &e),
    }
}

fn list_dir_reply(path: &str, result: Result<Vec<String>>) -> Response {
    match result {
        Ok(dirs) if dirs.is_empty() => {
            Response::ok(format!("No hay subdirectorios en '{}'.", path))
        }
        Ok(dirs) => Response::ok(format!("Directorios en {}:\n{}", path, dirs.join("\n"))),
        Err(e) => listing_error(path, &e),
    }
}

fn move_file_reply(file: &str, dest_dir: &str, result: Result<String>) -> Response {
    match result {
        Ok(base) => Response::ok(format!(
            "{}: Fichero '{}' movido a '{}'.",
            SUCCESS, base, dest_dir
        )),
        Err(FileWireError::NotFound(_)) => {
            Response::error(format!("Error: El fichero '{}' no existe.", file))
        }
        Err(FileWireError::PermissionDenied(_)) => Response::error(format!(
            "Error: Permisos insuficientes para mover '{}'.",
            file
        )),
        Err(e) => Response::error(format!("Error al mover fichero: {}", e)),
    }
}

fn create_dir_reply(name: &str, result: Result<()>) -> Response {
    match result {
        Ok(()) => Response::ok(format!(
            "{}: Directorio '{}' creado correctamente.",
            SUCCESS, name
        )),
        Err(FileWireError::AlreadyExists(_)) => {
            Response::error(format!("Error: La ruta '{}' ya existe.", name))
        }
        Err(FileWireError::PermissionDenied(_)) => Response::error(format!(
            "Error: No tienes permisos para crear '{}'.",
            name
        )),
        Err(e) => Response::error(format!("Error al crear el directorio: {}", e)),
    }
}

fn delete_dir_reply(name: &str, result: Result<()>) -> Response {
    match result {
        Ok(()) => Response::ok(format!(
            "{}: Directorio '{}' eliminado correctamente.",
            SUCCESS, name
        )),
        Err(FileWireError::NotFound(_)) => {
            Response::error(format!("Error: El directorio '{}' no existe.", name))
        }
        Err(FileWireError::NotADirectory(_)) => {
            Response::error(format!("Error: '{}' no es un directorio.", name))
        }
        Err(FileWireError::DirectoryNotEmpty(_)) => Response::error(format!(
            "Error: El directorio '{}' no está vacío y no se puede eliminar.",
            name
        )),
        Err(FileWireError::PermissionDenied(_)) => Response::error(format!(
            "Error: No tienes permisos para eliminar '{}'.",
            name
        )),
        Err(e) => Response::error(format!("Error al eliminar el directorio: {}", e)),
    }
}

fn upload_error_reply(file: &str, error: &FileWireError) -> String {
    match error {
        FileWireError::PermissionDenied(_) => {
            format!("Error: permisos insuficientes para escribir '{}'.", file)
        }
        other => format!("Error al subir fichero: {}", other),
    }
}
