//! Types d'erreurs pour jbxplayer

use std::path::PathBuf;

/// Erreurs de description et de lecture d'un morceau
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Song file not found: {}", .0.display())]
    SongFileMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to probe audio format: {0}")]
    Probe(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed playback descriptor: {0}")]
    MalformedDescriptor(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type Result spécialisé pour jbxplayer
pub type Result<T> = std::result::Result<T, Error>;
