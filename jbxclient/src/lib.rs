//! # jbxclient - Client interactif du Jukebox
//!
//! Lit des commandes sur l'entrée standard, les envoie au serveur et
//! affiche les réponses. Quand `play` est accepté, le serveur renvoie le
//! format du morceau ; le client le joue alors localement avec un
//! [`jbxplayer::WavPlayer`] sur son propre répertoire de morceaux et l'écrit
//! dans un fichier WAV ([`WavFileSink`]).
//!
//! ```no_run
//! use jbxclient::{ClientSession, WavFileSink};
//! use jbxplayer::{PlaybackSettings, WavPlayer};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> jbxclient::Result<()> {
//! let sink = Arc::new(WavFileSink::new("playback.wav"));
//! let player = WavPlayer::new("songs", PlaybackSettings::default(), sink);
//! let mut session = ClientSession::connect("127.0.0.1:7777", Arc::new(player)).await?;
//!
//! println!("{}", session.send("login user@example.com secret").await?);
//! println!("{}", session.send("play queen-we will rock you").await?);
//! # Ok(())
//! # }
//! ```

mod error;
mod reply;
mod session;
mod sink;

pub use error::{Error, Result};
pub use reply::ServerReply;
pub use session::{ClientSession, run_interactive};
pub use sink::WavFileSink;
