use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Question is empty")]
    EmptyQuestion,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Transport and quota failures degrade a single batch or query; everything
    /// else aborts the run that raised it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Quota(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
