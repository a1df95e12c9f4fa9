pub mod core;
pub mod engine;
pub mod exec;
pub mod report;
pub mod run_cmd;
pub mod storage;

use thiserror::Error;

pub use storage::JsonlWriter;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{0}")]
    Message(String),
    #[error("{command} failed ({cause}):\n{output}")]
    CommandFailed {
        command: String,
        cause: String,
        output: String,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("interrupted")]
    Interrupted,
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl BenchError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BenchError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;

/// Replace path separators so a package identifier can be used as a file name.
pub fn flatten_package_name(name: &str) -> String {
    name.replace('/', "-")
}
