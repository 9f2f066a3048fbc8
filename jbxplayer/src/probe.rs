//! Lecture des paramètres d'un fichier WAV avec symphonia

use crate::descriptor::{AudioEncoding, PlaybackDescriptor};
use crate::{Error, Result};
use jbxstore::SongId;
use std::fs::File;
use std::path::Path;
use symphonia::core::codecs::{
    CodecParameters, CodecType, CODEC_TYPE_NULL, CODEC_TYPE_PCM_ALAW, CODEC_TYPE_PCM_F32BE,
    CODEC_TYPE_PCM_F32LE, CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE, CODEC_TYPE_PCM_MULAW,
    CODEC_TYPE_PCM_S16BE, CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24BE, CODEC_TYPE_PCM_S24LE,
    CODEC_TYPE_PCM_S32BE, CODEC_TYPE_PCM_S32LE, CODEC_TYPE_PCM_S8, CODEC_TYPE_PCM_U16BE,
    CODEC_TYPE_PCM_U16LE, CODEC_TYPE_PCM_U24BE, CODEC_TYPE_PCM_U24LE, CODEC_TYPE_PCM_U32BE,
    CODEC_TYPE_PCM_U32LE, CODEC_TYPE_PCM_U8,
};
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Ouvre un fichier audio et retourne son lecteur de conteneur
pub(crate) fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Probe(format!("{}: {e}", path.display())))?;

    Ok(probed.format)
}

/// Premier flux audio du conteneur
pub(crate) fn audio_track(format: &dyn FormatReader) -> Result<(u32, CodecParameters)> {
    format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .map(|t| (t.id, t.codec_params.clone()))
        .ok_or_else(|| Error::Probe("No audio track found".to_string()))
}

/// Codage et boutisme d'un codec PCM
fn encoding_of(codec: CodecType) -> Result<(AudioEncoding, bool)> {
    let mapped = match codec {
        CODEC_TYPE_PCM_S8 | CODEC_TYPE_PCM_S16LE | CODEC_TYPE_PCM_S24LE | CODEC_TYPE_PCM_S32LE => {
            (AudioEncoding::PcmSigned, false)
        }
        CODEC_TYPE_PCM_S16BE | CODEC_TYPE_PCM_S24BE | CODEC_TYPE_PCM_S32BE => {
            (AudioEncoding::PcmSigned, true)
        }
        CODEC_TYPE_PCM_U8 | CODEC_TYPE_PCM_U16LE | CODEC_TYPE_PCM_U24LE | CODEC_TYPE_PCM_U32LE => {
            (AudioEncoding::PcmUnsigned, false)
        }
        CODEC_TYPE_PCM_U16BE | CODEC_TYPE_PCM_U24BE | CODEC_TYPE_PCM_U32BE => {
            (AudioEncoding::PcmUnsigned, true)
        }
        CODEC_TYPE_PCM_F32LE | CODEC_TYPE_PCM_F64LE => (AudioEncoding::PcmFloat, false),
        CODEC_TYPE_PCM_F32BE | CODEC_TYPE_PCM_F64BE => (AudioEncoding::PcmFloat, true),
        CODEC_TYPE_PCM_MULAW => (AudioEncoding::ULaw, false),
        CODEC_TYPE_PCM_ALAW => (AudioEncoding::ALaw, false),
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "codec {:?} is not PCM",
                other
            )))
        }
    };
    Ok(mapped)
}

/// Construit le descripteur de lecture d'un fichier WAV
pub fn probe_wav(path: &Path, song: &SongId) -> Result<PlaybackDescriptor> {
    let format = open_format(path)?;
    let (_, params) = audio_track(&*format)?;

    let (encoding, big_endian) = encoding_of(params.codec)?;

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| Error::Probe("Missing sample rate".to_string()))?;
    let channels = params
        .channels
        .ok_or_else(|| Error::Probe("Missing channel info".to_string()))?
        .count() as u32;

    // Les lois A et µ stockent chaque échantillon sur un octet.
    let sample_size_in_bits = match encoding {
        AudioEncoding::ULaw | AudioEncoding::ALaw => 8,
        _ => params
            .bits_per_coded_sample
            .or(params.bits_per_sample)
            .ok_or_else(|| Error::Probe("Missing sample size".to_string()))?,
    };

    let frame_size = channels * sample_size_in_bits.div_ceil(8);

    Ok(PlaybackDescriptor {
        encoding,
        sample_rate: sample_rate as f32,
        sample_size_in_bits,
        channels,
        frame_size,
        frame_rate: sample_rate as f32,
        big_endian,
        song: song.clone(),
    })
}
