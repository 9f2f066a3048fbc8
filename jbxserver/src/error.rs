//! Types d'erreurs pour jbxserver
//!
//! Seules les défaillances d'infrastructure sont des erreurs : les refus
//! du protocole (commande inconnue, utilisateur non connecté, ...) sont des
//! réponses ordinaires.

/// Erreurs fatales du serveur
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Store(#[from] jbxstore::Error),
}

/// Type Result spécialisé pour jbxserver
pub type Result<T> = std::result::Result<T, Error>;
