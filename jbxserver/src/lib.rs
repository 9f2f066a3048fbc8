//! # jbxserver - Moteur de protocole du serveur Jukebox
//!
//! Protocole texte, une commande par ligne et une réponse par commande :
//! - **Multiplexer** : accepte les connexions TCP, découpe les lignes, écrit les réponses
//! - **CommandDispatcher** : décode une ligne, vérifie l'arité puis l'authentification, agit sur l'état
//! - **ServerState** : catalogue, comptes, playlists, sessions et lectures en cours
//! - **PlaybackTracker** : lecture en cours par connexion et nombre d'auditeurs par morceau
//!
//! Toutes les commandes sont traitées par une seule boucle : l'état n'est
//! jamais partagé et n'a pas besoin de verrou.
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use jbxconfig::get_config;
//! use jbxplayer::{NullSink, PlayerConfigExt};
//! use jbxserver::{CommandDispatcher, Multiplexer, ServerConfigExt};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let state = config.load_server_state()?;
//! let player = Arc::new(config.wav_player(Arc::new(NullSink))?);
//!
//! let dispatcher = CommandDispatcher::new(state, player);
//! let server = Multiplexer::bind(
//!     &config.get_listen_address(),
//!     dispatcher,
//!     config.multiplexer_settings(),
//! )
//! .await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

mod command;
mod config_ext;
mod connection;
mod dispatcher;
mod error;
pub mod logs;
mod multiplexer;
mod playback;
mod reply;
mod session;
mod state;

// Réexports publics
pub use command::Command;
pub use config_ext::ServerConfigExt;
pub use connection::{Connection, ConnectionState, Frame};
pub use dispatcher::CommandDispatcher;
pub use error::{Error, Result};
pub use logs::{LogHandle, init_logging};
pub use multiplexer::{Multiplexer, MultiplexerSettings};
pub use playback::PlaybackTracker;
pub use reply::{Reply, render_list};
pub use session::{ConnectionId, SessionRegistry};
pub use state::ServerState;
