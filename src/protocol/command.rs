//! Command definitions
//!
//! A command line is `VERB [ARG1 [ARG2]]`, whitespace-delimited, with no
//! quoting. The verb is matched case-insensitively; each variant of
//! [`Command`] owns exactly the arguments its verb requires.

use std::fmt;

use crate::error::{FileWireError, Result};

/// Verbs understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    ListFiles,
    ListDir,
    DownloadFile,
    UploadFile,
    DeleteFile,
    RenameFile,
    MoveFile,
    CreateDir,
    DeleteDir,
    Help,
    Shutdown,
}

impl Verb {
    pub const ALL: [Verb; 11] = [
        Verb::ListFiles,
        Verb::ListDir,
        Verb::DownloadFile,
        Verb::UploadFile,
        Verb::DeleteFile,
        Verb::RenameFile,
        Verb::MoveFile,
        Verb::CreateDir,
        Verb::DeleteDir,
        Verb::Help,
        Verb::Shutdown,
    ];

    /// Wire spelling of the verb
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::ListFiles => "LIST_FILES",
            Verb::ListDir => "LIST_DIR",
            Verb::DownloadFile => "DOWNLOAD_FILE",
            Verb::UploadFile => "UPLOAD_FILE",
            Verb::DeleteFile => "DELETE_FILE",
            Verb::RenameFile => "RENAME_FILE",
            Verb::MoveFile => "MOVE_FILE",
            Verb::CreateDir => "CREATE_DIR",
            Verb::DeleteDir => "DELETE_DIR",
            Verb::Help => "HELP",
            Verb::Shutdown => "SHUTDOWN",
        }
    }

    /// Case-insensitive lookup of a verb token
    pub fn from_token(token: &str) -> Option<Verb> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(token))
    }

    /// Number of positional arguments that must follow the verb
    pub fn required_args(self) -> usize {
        match self {
            Verb::ListFiles | Verb::ListDir | Verb::Help | Verb::Shutdown => 0,
            Verb::DownloadFile
            | Verb::UploadFile
            | Verb::DeleteFile
            | Verb::CreateDir
            | Verb::DeleteDir => 1,
            Verb::RenameFile | Verb::MoveFile => 2,
        }
    }

    /// One-line usage, as shown in argument errors
    pub fn usage(self) -> &'static str {
        match self {
            Verb::ListFiles => "LIST_FILES [ruta]",
            Verb::ListDir => "LIST_DIR [ruta]",
            Verb::DownloadFile => "DOWNLOAD_FILE <fichero>",
            Verb::UploadFile => "UPLOAD_FILE <fichero>",
            Verb::DeleteFile => "DELETE_FILE <fichero>",
            Verb::RenameFile => "RENAME_FILE <fichero> <nuevo_nombre>",
            Verb::MoveFile => "MOVE_FILE <fichero> <destino>",
            Verb::CreateDir => "CREATE_DIR <nombre>",
            Verb::DeleteDir => "DELETE_DIR <nombre>",
            Verb::Help => "HELP",
            Verb::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List regular files under a path
    ListFiles { path: String },

    /// List subdirectories under a path
    ListDir { path: String },

    /// Stream a file from the server to the client
    DownloadFile { file: String },

    /// Stream a file from the client to the server
    UploadFile { file: String },

    DeleteFile { file: String },

    RenameFile { file: String, new_name: String },

    /// Copy into `dest_dir`, then remove the original
    MoveFile { file: String, dest_dir: String },

    CreateDir { name: String },

    DeleteDir { name: String },

    Help,

    /// Stop the accept loop after replying
    Shutdown,

    /// Anything else, including an empty line
    Unknown { verb: String },
}

/// Default path for the listing verbs
const CURRENT_DIR: &str = ".";

impl Command {
    /// Parse a command line.
    ///
    /// Fails only when a known verb lacks a required argument; unknown
    /// verbs parse into [`Command::Unknown`]. Surplus arguments are ignored.
    pub fn parse(line: &str) -> Result<Command> {
        let mut words = line.split_whitespace();

        let token = match words.next() {
            Some(token) => token,
            None => return Ok(Command::Unknown { verb: String::new() }),
        };

        let verb = match Verb::from_token(token) {
            Some(verb) => verb,
            None => {
                return Ok(Command::Unknown {
                    verb: token.to_ascii_uppercase(),
                })
            }
        };

        let args: Vec<String> = words.map(str::to_string).collect();
        if args.len() < verb.required_args() {
            return Err(FileWireError::MissingArgument { verb });
        }

        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or_default();

        let command = match verb {
            Verb::ListFiles => Command::ListFiles {
                path: optional_path(next()),
            },
            Verb::ListDir => Command::ListDir {
                path: optional_path(next()),
            },
            Verb::DownloadFile => Command::DownloadFile { file: next() },
            Verb::UploadFile => Command::UploadFile { file: next() },
            Verb::DeleteFile => Command::DeleteFile { file: next() },
            Verb::RenameFile => Command::RenameFile {
                file: next(),
                new_name: next(),
            },
            Verb::MoveFile => Command::MoveFile {
                file: next(),
                dest_dir: next(),
            },
            Verb::CreateDir => Command::CreateDir { name: next() },
            Verb::DeleteDir => Command::DeleteDir { name: next() },
            Verb::Help => Command::Help,
            Verb::Shutdown => Command::Shutdown,
        };

        Ok(command)
    }

    /// The verb, or `None` for unknown commands
    pub fn verb(&self) -> Option<Verb> {
        match self {
            Command::ListFiles { .. } => Some(Verb::ListFiles),
            Command::ListDir { .. } => Some(Verb::ListDir),
            Command::DownloadFile { .. } => Some(Verb::DownloadFile),
            Command::UploadFile { .. } => Some(Verb::UploadFile),
            Command::DeleteFile { .. } => Some(Verb::DeleteFile),
            Command::RenameFile { .. } => Some(Verb::RenameFile),
            Command::MoveFile { .. } => Some(Verb::MoveFile),
            Command::CreateDir { .. } => Some(Verb::CreateDir),
            Command::DeleteDir { .. } => Some(Verb::DeleteDir),
            Command::Help => Some(Verb::Help),
            Command::Shutdown => Some(Verb::Shutdown),
            Command::Unknown { .. } => None,
        }
    }
}

fn optional_path(arg: String) -> String {
    if arg.is_empty() {
        CURRENT_DIR.to_string()
    } else {
        arg
    }
}

/// Renders the command line exactly as it goes on the wire
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ListFiles { path } | Command::ListDir { path } => {
                write!(f, "{} {}", self.verb_str(), path)
            }
            Command::DownloadFile { file }
            | Command::UploadFile { file }
            | Command::DeleteFile { file } => write!(f, "{} {}", self.verb_str(), file),
            Command::RenameFile { file, new_name } => {
                write!(f, "{} {} {}", self.verb_str(), file, new_name)
            }
            Command::MoveFile { file, dest_dir } => {
                write!(f, "{} {} {}", self.verb_str(), file, dest_dir)
            }
            Command::CreateDir { name } | Command::DeleteDir { name } => {
                write!(f, "{} {}", self.verb_str(), name)
            }
            Command::Help | Command::Shutdown => f.write_str(self.verb_str()),
            Command::Unknown { verb } => f.write_str(verb),
        }
    }
}

impl Command {
    fn verb_str(&self) -> &str {
        match self {
            Command::Unknown { verb } => verb,
            known => known.verb().map(Verb::as_str).unwrap_or_default(),
        }
    }
}
