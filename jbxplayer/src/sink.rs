//! Destination des données audio lues par une tâche de lecture

use crate::descriptor::PlaybackDescriptor;
use jbxstore::SongId;
use std::io;

/// Reçoit les blocs PCM bruts d'un morceau, dans l'ordre du fichier
pub trait AudioSink: Send + Sync {
    /// Appelé avant le premier bloc, avec le format des données à venir
    fn start(&self, _descriptor: &PlaybackDescriptor) -> io::Result<()> {
        Ok(())
    }

    fn write_chunk(&self, song: &SongId, chunk: &[u8]) -> io::Result<()>;

    /// Appelé une fois quand la lecture se termine, arrêtée ou non
    fn finish(&self, _song: &SongId) {}
}

/// Puits qui ignore les données
///
/// Le rendu est fait par le client à partir du descripteur ; côté serveur
/// seule la cadence de lecture compte.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn write_chunk(&self, _song: &SongId, _chunk: &[u8]) -> io::Result<()> {
        Ok(())
    }
}
