//! Types d'erreurs pour jbxclient

/// Erreurs du client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by the server")]
    ServerClosed,

    #[error("Playback error: {0}")]
    Player(#[from] jbxplayer::Error),

    #[error("Playback task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Type Result spécialisé pour jbxclient
pub type Result<T> = std::result::Result<T, Error>;
