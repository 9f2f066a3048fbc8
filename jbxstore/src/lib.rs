//! # jbxstore - Magasins de données du serveur Jukebox
//!
//! Cette crate regroupe les données de référence et les données
//! persistantes manipulées par le protocole :
//! - **Catalog** : morceaux connus (`artist--title`), chargé une fois, en lecture seule
//! - **UserStore** : comptes `email → mot de passe`, complété à chaque inscription
//! - **PlaylistStore** : playlists nommées, une ligne par playlist
//! - **SongId** : identifiant canonique `artist-title` en minuscules
//!
//! Les fichiers appartiennent au serveur une fois chargés : ils ne sont
//! jamais relus, seules les modifications faites par le serveur y sont
//! écrites.
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use jbxstore::{Catalog, PlaylistStore, SongId};
//! use std::path::Path;
//!
//! # fn main() -> jbxstore::Result<()> {
//! let catalog = Catalog::load(Path::new("data/songs.txt"))?;
//! let mut playlists = PlaylistStore::load(Path::new("data/playlists.txt"), &catalog)?;
//!
//! playlists.create("road-trip")?;
//! if let Some(song) = catalog.resolve("queen-bohemian rhapsody") {
//!     playlists.add_song("road-trip", &song)?;
//! }
//! # Ok(())
//! # }
//! ```

mod catalog;
mod error;
mod persistence;
mod playlists;
mod song;
mod users;

#[cfg(feature = "jbxconfig")]
mod config_ext;

// Réexports publics
pub use catalog::Catalog;
pub use error::{Error, Result};
pub use playlists::{Playlist, PlaylistCreation, PlaylistStore, SongAddition};
pub use song::SongId;
pub use users::{is_valid_email, Registration, UserStore};

#[cfg(feature = "jbxconfig")]
pub use config_ext::StoreConfigExt;
