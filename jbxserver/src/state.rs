//! État du serveur, possédé exclusivement par le dispatcher

use crate::playback::PlaybackTracker;
use crate::session::SessionRegistry;
use jbxstore::{Catalog, PlaylistStore, UserStore};

/// Agrégat des magasins et des tables volatiles
#[derive(Debug)]
pub struct ServerState {
    pub catalog: Catalog,
    pub users: UserStore,
    pub playlists: PlaylistStore,
    pub sessions: SessionRegistry,
    pub playback: PlaybackTracker,
}

impl ServerState {
    pub fn new(catalog: Catalog, users: UserStore, playlists: PlaylistStore) -> Self {
        Self {
            catalog,
            users,
            playlists,
            sessions: SessionRegistry::new(),
            playback: PlaybackTracker::new(),
        }
    }
}
