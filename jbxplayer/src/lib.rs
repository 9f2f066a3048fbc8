//! # jbxplayer - Lecture des morceaux du Jukebox
//!
//! Service de lecture consommé par le protocole :
//! - **PlaybackDescriptor** : format audio d'un morceau, envoyé au client en réponse à `play`
//! - **Player** : description d'un morceau et lancement d'une tâche de lecture annulable
//! - **WavPlayer** : implémentation sur des fichiers WAV, analysés avec symphonia
//! - **AudioSink** : destination des blocs PCM lus
//!
//! La tâche de lecture est détachée : le protocole ne l'attend jamais et
//! l'arrête uniquement en annulant son `CancellationToken`. Le signal est
//! vérifié entre chaque bloc et au moins une fois par intervalle
//! d'attente.
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use jbxplayer::{NullSink, PlaybackSettings, Player, WavPlayer};
//! use jbxstore::SongId;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> jbxplayer::Result<()> {
//! let player = WavPlayer::new("songs", PlaybackSettings::default(), Arc::new(NullSink));
//! let descriptor = player.describe(&SongId::new("queen", "we will rock you"))?;
//! println!("{}", descriptor);
//!
//! let token = CancellationToken::new();
//! let handle = player.spawn(descriptor, token.clone());
//! token.cancel();
//! let _ = handle.await;
//! # Ok(())
//! # }
//! ```

mod descriptor;
mod error;
mod player;
mod probe;
mod sink;

#[cfg(feature = "jbxconfig")]
mod config_ext;

// Réexports publics
pub use descriptor::{AudioEncoding, PlaybackDescriptor};
pub use error::{Error, Result};
pub use player::{PlaybackOutcome, PlaybackSettings, Player, WavPlayer};
pub use probe::probe_wav;
pub use sink::{AudioSink, NullSink};

#[cfg(feature = "jbxconfig")]
pub use config_ext::PlayerConfigExt;
