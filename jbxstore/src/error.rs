//! Types d'erreurs pour jbxstore

use std::path::PathBuf;

/// Erreurs d'accès aux fichiers de données
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed line {line} in {}: {content:?}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Type Result spécialisé pour jbxstore
pub type Result<T> = std::result::Result<T, Error>;
