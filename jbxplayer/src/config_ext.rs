//! Extension de jbxconfig pour le lecteur

use crate::{AudioSink, PlaybackSettings, Result, WavPlayer};
use std::sync::Arc;

/// Trait d'extension pour jbxconfig::Config
pub trait PlayerConfigExt {
    /// Paramètres des tâches de lecture (`player.*`)
    fn playback_settings(&self) -> PlaybackSettings;

    /// Lecteur WAV sur `player.songs_directory`
    fn wav_player(&self, sink: Arc<dyn AudioSink>) -> Result<WavPlayer>;
}

impl PlayerConfigExt for jbxconfig::Config {
    fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            chunk_size: self.get_player_chunk_size(),
            poll_interval: self.get_player_poll_interval(),
            realtime: self.get_player_realtime(),
        }
    }

    fn wav_player(&self, sink: Arc<dyn AudioSink>) -> Result<WavPlayer> {
        let songs_dir = self.get_songs_dir()?;
        Ok(WavPlayer::new(songs_dir, self.playback_settings(), sink))
    }
}
