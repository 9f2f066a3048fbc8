//! Extension de jbxconfig pour le serveur

use crate::{MultiplexerSettings, Result, ServerState};
use jbxstore::StoreConfigExt;

/// Trait d'extension pour jbxconfig::Config
pub trait ServerConfigExt {
    /// Charge le catalogue, les comptes et les playlists (`storage.*`)
    fn load_server_state(&self) -> Result<ServerState>;

    /// Réglages du multiplexeur (`host.read_buffer_size`, `host.max_line_length`)
    fn multiplexer_settings(&self) -> MultiplexerSettings;
}

impl ServerConfigExt for jbxconfig::Config {
    fn load_server_state(&self) -> Result<ServerState> {
        let catalog = self.load_catalog()?;
        let users = self.load_users()?;
        let playlists = self.load_playlists(&catalog)?;
        Ok(ServerState::new(catalog, users, playlists))
    }

    fn multiplexer_settings(&self) -> MultiplexerSettings {
        MultiplexerSettings {
            read_buffer_size: self.get_read_buffer_size(),
            max_line_length: self.get_max_line_length(),
            ..MultiplexerSettings::default()
        }
    }
}
