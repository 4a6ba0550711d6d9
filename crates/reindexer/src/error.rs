use searchsync_change_queue::QueueError;
use searchsync_index_meta::MetaError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReindexerError>;

#[derive(Error, Debug)]
pub enum ReindexerError {
    /// Unknown entity type or other registry misconfiguration. Fatal for
    /// the call, never retried.
    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error("Change queue error: {0}")]
    Queue(#[from] QueueError),

    /// The destructive recreate step failed. Locks and the elevated
    /// identity are still released on the way out.
    #[error("Index recreation failed: {0}")]
    Recreation(#[source] anyhow::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}
