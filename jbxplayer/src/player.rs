//! Service de lecture : description d'un morceau et tâche de lecture annulable

use crate::descriptor::PlaybackDescriptor;
use crate::probe::{audio_track, open_format, probe_wav};
use crate::sink::AudioSink;
use crate::{Error, Result};
use jbxstore::SongId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use symphonia::core::errors::Error as SymphoniaError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Paramètres des tâches de lecture
#[derive(Debug, Clone)]
pub struct PlaybackSettings {
    /// Taille maximale d'un bloc envoyé au puits, en octets
    pub chunk_size: usize,
    /// Intervalle maximal entre deux vérifications du signal d'arrêt
    pub poll_interval: Duration,
    /// Cadence la lecture sur la durée réelle du morceau
    pub realtime: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            poll_interval: Duration::from_millis(50),
            realtime: true,
        }
    }
}

/// Fin d'une tâche de lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed { bytes: u64 },
    Cancelled { bytes: u64 },
}

/// Service de lecture utilisé par le protocole
///
/// `describe` est appelé de façon synchrone pendant le traitement de la
/// commande `play` ; `spawn` lance ensuite une tâche détachée qui s'arrête
/// dès que `token` est annulé.
pub trait Player: Send + Sync {
    fn describe(&self, song: &SongId) -> Result<PlaybackDescriptor>;

    fn spawn(
        &self,
        descriptor: PlaybackDescriptor,
        token: CancellationToken,
    ) -> JoinHandle<Result<PlaybackOutcome>>;
}

/// Lecteur de fichiers `<songs_dir>/<artist>-<title>.wav`
pub struct WavPlayer {
    songs_dir: PathBuf,
    settings: PlaybackSettings,
    sink: Arc<dyn AudioSink>,
}

impl WavPlayer {
    pub fn new(
        songs_dir: impl Into<PathBuf>,
        settings: PlaybackSettings,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        Self {
            songs_dir: songs_dir.into(),
            settings,
            sink,
        }
    }

    pub fn songs_dir(&self) -> &Path {
        &self.songs_dir
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn song_path(&self, song: &SongId) -> PathBuf {
        self.songs_dir.join(format!("{}.wav", song))
    }
}

impl Player for WavPlayer {
    fn describe(&self, song: &SongId) -> Result<PlaybackDescriptor> {
        let path = self.song_path(song);
        if !path.is_file() {
            return Err(Error::SongFileMissing(path));
        }
        probe_wav(&path, song)
    }

    fn spawn(
        &self,
        descriptor: PlaybackDescriptor,
        token: CancellationToken,
    ) -> JoinHandle<Result<PlaybackOutcome>> {
        let path = self.song_path(&descriptor.song);
        let settings = self.settings.clone();
        let sink = self.sink.clone();

        tokio::task::spawn_blocking(move || {
            let song = descriptor.song.clone();
            info!(song=%song, path=%path.display(), "Playback started");

            let result = sink
                .start(&descriptor)
                .map_err(Error::from)
                .and_then(|()| stream_song(&path, &descriptor, sink.as_ref(), &settings, &token));
            sink.finish(&song);

            match &result {
                Ok(PlaybackOutcome::Completed { bytes }) => {
                    info!(song=%song, bytes, "Playback completed")
                }
                Ok(PlaybackOutcome::Cancelled { bytes }) => {
                    info!(song=%song, bytes, "Playback cancelled")
                }
                Err(e) => error!(song=%song, path=%path.display(), "Playback failed: {}", e),
            }
            result
        })
    }
}

/// Cadence l'envoi des blocs sur le débit du morceau
struct Pacer {
    start: Instant,
    bytes_per_second: f64,
    realtime: bool,
    poll_interval: Duration,
}

impl Pacer {
    fn new(descriptor: &PlaybackDescriptor, settings: &PlaybackSettings) -> Self {
        Self {
            start: Instant::now(),
            bytes_per_second: descriptor.bytes_per_second(),
            realtime: settings.realtime,
            poll_interval: settings.poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Attend l'échéance du prochain bloc ; `false` si la lecture est annulée
    fn wait(&self, written: u64, token: &CancellationToken) -> bool {
        if !self.realtime || self.bytes_per_second <= 0.0 {
            return !token.is_cancelled();
        }

        let due = Duration::from_secs_f64(written as f64 / self.bytes_per_second);
        loop {
            if token.is_cancelled() {
                return false;
            }
            let elapsed = self.start.elapsed();
            if elapsed >= due {
                return true;
            }
            std::thread::sleep((due - elapsed).min(self.poll_interval));
        }
    }
}

fn stream_song(
    path: &Path,
    descriptor: &PlaybackDescriptor,
    sink: &dyn AudioSink,
    settings: &PlaybackSettings,
    token: &CancellationToken,
) -> Result<PlaybackOutcome> {
    let mut format = open_format(path)?;
    let (track_id, _) = audio_track(&*format)?;
    let pacer = Pacer::new(descriptor, settings);
    let chunk_size = settings.chunk_size.max(1);
    let mut written: u64 = 0;

    loop {
        if token.is_cancelled() {
            return Ok(PlaybackOutcome::Cancelled { bytes: written });
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(Error::Probe(format!(
                    "{}: read error: {e}",
                    path.display()
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        for chunk in packet.buf().chunks(chunk_size) {
            sink.write_chunk(&descriptor.song, chunk)?;
            written += chunk.len() as u64;
            if !pacer.wait(written, token) {
                debug!(song=%descriptor.song, bytes=written, "Stop signal received");
                return Ok(PlaybackOutcome::Cancelled { bytes: written });
            }
        }
    }

    Ok(PlaybackOutcome::Completed { bytes: written })
}
