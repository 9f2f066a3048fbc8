//! Sortie du client : le morceau joué est écrit dans un fichier WAV

use jbxplayer::{AudioEncoding, AudioSink, PlaybackDescriptor};
use jbxstore::SongId;
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

// Positions des tailles à compléter dans l'en-tête RIFF
const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 40;
const HEADER_LEN: u32 = 44;

struct OpenWav {
    file: BufWriter<File>,
    data_len: u32,
}

/// Puits qui écrit les blocs reçus dans un fichier WAV
///
/// Le fichier est recréé à chaque morceau ; les tailles de l'en-tête sont
/// complétées dans `finish`, y compris après un `stop`.
pub struct WavFileSink {
    path: PathBuf,
    current: Mutex<Option<OpenWav>>,
}

impl WavFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Option<OpenWav>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn format_tag(encoding: AudioEncoding) -> u16 {
    match encoding {
        AudioEncoding::PcmSigned | AudioEncoding::PcmUnsigned => 1,
        AudioEncoding::PcmFloat => 3,
        AudioEncoding::ALaw => 6,
        AudioEncoding::ULaw => 7,
    }
}

fn write_header(out: &mut impl Write, descriptor: &PlaybackDescriptor) -> io::Result<()> {
    let channels = u16::try_from(descriptor.channels)
        .map_err(|_| io::Error::other(format!("{} channels", descriptor.channels)))?;
    let block_align = u16::try_from(descriptor.frame_size)
        .map_err(|_| io::Error::other(format!("frame size {}", descriptor.frame_size)))?;
    let bits = u16::try_from(descriptor.sample_size_in_bits)
        .map_err(|_| io::Error::other(format!("{} bits", descriptor.sample_size_in_bits)))?;
    let sample_rate = descriptor.sample_rate.round() as u32;
    let byte_rate = descriptor.bytes_per_second().round() as u32;

    out.write_all(b"RIFF")?;
    out.write_all(&(HEADER_LEN - 8).to_le_bytes())?;
    out.write_all(b"WAVE")?;
    out.write_all(b"fmt ")?;
    out.write_all(&16u32.to_le_bytes())?;
    out.write_all(&format_tag(descriptor.encoding).to_le_bytes())?;
    out.write_all(&channels.to_le_bytes())?;
    out.write_all(&sample_rate.to_le_bytes())?;
    out.write_all(&byte_rate.to_le_bytes())?;
    out.write_all(&block_align.to_le_bytes())?;
    out.write_all(&bits.to_le_bytes())?;
    out.write_all(b"data")?;
    out.write_all(&0u32.to_le_bytes())
}

fn complete(mut wav: OpenWav) -> io::Result<()> {
    wav.file.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
    wav.file
        .write_all(&(HEADER_LEN - 8 + wav.data_len).to_le_bytes())?;
    wav.file.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
    wav.file.write_all(&wav.data_len.to_le_bytes())?;
    wav.file.flush()
}

impl AudioSink for WavFileSink {
    fn start(&self, descriptor: &PlaybackDescriptor) -> io::Result<()> {
        if descriptor.big_endian {
            warn!(song=%descriptor.song, "Big-endian samples written as is in a RIFF file");
        }
        let mut file = BufWriter::new(File::create(&self.path)?);
        write_header(&mut file, descriptor)?;
        *self.lock() = Some(OpenWav { file, data_len: 0 });
        debug!(song=%descriptor.song, path=%self.path.display(), "Writing playback output");
        Ok(())
    }

    fn write_chunk(&self, _song: &SongId, chunk: &[u8]) -> io::Result<()> {
        let mut current = self.lock();
        let wav = current
            .as_mut()
            .ok_or_else(|| io::Error::other("no song started"))?;
        let len = u32::try_from(chunk.len()).map_err(io::Error::other)?;
        let data_len = wav
            .data_len
            .checked_add(len)
            .filter(|total| total.checked_add(HEADER_LEN).is_some())
            .ok_or_else(|| io::Error::other("WAV output larger than 4 GiB"))?;
        wav.file.write_all(chunk)?;
        wav.data_len = data_len;
        Ok(())
    }

    fn finish(&self, song: &SongId) {
        let Some(wav) = self.lock().take() else {
            return;
        };
        let bytes = wav.data_len;
        match complete(wav) {
            Ok(()) => debug!(song=%song, bytes, path=%self.path.display(), "Playback output complete"),
            Err(e) => warn!(song=%song, path=%self.path.display(), "Failed to complete WAV output: {}", e),
        }
    }
}
