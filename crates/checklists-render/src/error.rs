use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read preamble {path}: {source}")]
    Preamble { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("compiler '{compiler}' not found: {source}")]
    CompilerNotFound { compiler: String, source: io::Error },

    #[error("could not run compiler '{compiler}': {source}")]
    CompilerSpawn { compiler: String, source: io::Error },

    #[error("compiler '{compiler}' failed ({status}):\n{output}")]
    CompilerFailed {
        compiler: String,
        status: ExitStatus,
        output: String,
    },
}

pub type RenderResult<T> = Result<T, RenderError>;
