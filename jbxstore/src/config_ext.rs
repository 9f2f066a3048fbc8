//! Extension de jbxconfig pour les magasins de données

use crate::{Catalog, PlaylistStore, Result, UserStore};

/// Trait d'extension pour jbxconfig::Config
///
/// Charge chaque magasin depuis le fichier désigné par la configuration
/// (`storage.*`).
pub trait StoreConfigExt {
    /// Charge le catalogue (`storage.songs_file`)
    fn load_catalog(&self) -> Result<Catalog>;

    /// Charge les comptes (`storage.users_file`)
    fn load_users(&self) -> Result<UserStore>;

    /// Charge les playlists (`storage.playlists_file`), résolues dans `catalog`
    fn load_playlists(&self, catalog: &Catalog) -> Result<PlaylistStore>;
}

impl StoreConfigExt for jbxconfig::Config {
    fn load_catalog(&self) -> Result<Catalog> {
        let path = self.get_songs_file()?;
        Catalog::load(&path)
    }

    fn load_users(&self) -> Result<UserStore> {
        let path = self.get_users_file()?;
        UserStore::load(&path)
    }

    fn load_playlists(&self, catalog: &Catalog) -> Result<PlaylistStore> {
        let path = self.get_playlists_file()?;
        PlaylistStore::load(&path, catalog)
    }
}
