//! Descripteur de lecture envoyé au client en réponse à `play`
//!
//! Enregistrement texte à champs fixes, séparés par des espaces :
//!
//! ```text
//! Encoding:PCM_SIGNED SampleRate:44100.0 SampleSizeInBits:16 Channels:2 FrameSize:4 FrameRate:44100.0 BigEndian:false queen-we will rock you
//! ```
//!
//! L'identifiant du morceau occupe la fin de la ligne et peut contenir des
//! espaces.

use crate::{Error, Result};
use jbxstore::SongId;
use std::fmt;
use std::str::FromStr;

/// Codage des échantillons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEncoding {
    PcmSigned,
    PcmUnsigned,
    PcmFloat,
    ULaw,
    ALaw,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::PcmSigned => "PCM_SIGNED",
            AudioEncoding::PcmUnsigned => "PCM_UNSIGNED",
            AudioEncoding::PcmFloat => "PCM_FLOAT",
            AudioEncoding::ULaw => "ULAW",
            AudioEncoding::ALaw => "ALAW",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PCM_SIGNED" => Ok(AudioEncoding::PcmSigned),
            "PCM_UNSIGNED" => Ok(AudioEncoding::PcmUnsigned),
            "PCM_FLOAT" => Ok(AudioEncoding::PcmFloat),
            "ULAW" => Ok(AudioEncoding::ULaw),
            "ALAW" => Ok(AudioEncoding::ALaw),
            other => Err(Error::MalformedDescriptor(format!(
                "unknown encoding '{}'",
                other
            ))),
        }
    }
}

/// Format audio d'un morceau et son identifiant
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackDescriptor {
    pub encoding: AudioEncoding,
    pub sample_rate: f32,
    pub sample_size_in_bits: u32,
    pub channels: u32,
    pub frame_size: u32,
    pub frame_rate: f32,
    pub big_endian: bool,
    pub song: SongId,
}

impl PlaybackDescriptor {
    /// Débit du flux en octets par seconde
    pub fn bytes_per_second(&self) -> f64 {
        self.frame_size as f64 * self.frame_rate as f64
    }
}

// Les flottants gardent toujours leur partie décimale (`44100.0`).
impl fmt::Display for PlaybackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Encoding:{} SampleRate:{:?} SampleSizeInBits:{} Channels:{} FrameSize:{} FrameRate:{:?} BigEndian:{} {}",
            self.encoding,
            self.sample_rate,
            self.sample_size_in_bits,
            self.channels,
            self.frame_size,
            self.frame_rate,
            self.big_endian,
            self.song
        )
    }
}

fn field<'a>(part: Option<&'a str>, key: &str) -> Result<&'a str> {
    let part = part.ok_or_else(|| Error::MalformedDescriptor(format!("missing field {}", key)))?;
    part.strip_prefix(key)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| Error::MalformedDescriptor(format!("expected {}:<value>, got '{}'", key, part)))
}

fn parse_value<T: FromStr>(part: Option<&str>, key: &str) -> Result<T> {
    let value = field(part, key)?;
    value
        .parse()
        .map_err(|_| Error::MalformedDescriptor(format!("invalid {} '{}'", key, value)))
}

/// Décodage d'un descripteur reçu par un client
///
/// L'identifiant est coupé au premier `-` ; sa forme canonique est
/// conservée.
impl FromStr for PlaybackDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let line = s.trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(8, ' ');

        let encoding = field(parts.next(), "Encoding")?.parse()?;
        let sample_rate = parse_value(parts.next(), "SampleRate")?;
        let sample_size_in_bits = parse_value(parts.next(), "SampleSizeInBits")?;
        let channels = parse_value(parts.next(), "Channels")?;
        let frame_size = parse_value(parts.next(), "FrameSize")?;
        let frame_rate = parse_value(parts.next(), "FrameRate")?;
        let big_endian = parse_value(parts.next(), "BigEndian")?;

        let song_text = parts
            .next()
            .ok_or_else(|| Error::MalformedDescriptor("missing song id".to_string()))?;
        let song = SongId::split_first(song_text)
            .ok_or_else(|| Error::MalformedDescriptor(format!("invalid song id '{}'", song_text)))?;

        Ok(Self {
            encoding,
            sample_rate,
            sample_size_in_bits,
            channels,
            frame_size,
            frame_rate,
            big_endian,
            song,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cd_quality(song: SongId) -> PlaybackDescriptor {
        PlaybackDescriptor {
            encoding: AudioEncoding::PcmSigned,
            sample_rate: 44100.0,
            sample_size_in_bits: 16,
            channels: 2,
            frame_size: 4,
            frame_rate: 44100.0,
            big_endian: false,
            song,
        }
    }

    #[test]
    fn test_encode_format() {
        let descriptor = cd_quality(SongId::new("queen", "we will rock you"));
        assert_eq!(
            descriptor.to_string(),
            "Encoding:PCM_SIGNED SampleRate:44100.0 SampleSizeInBits:16 Channels:2 FrameSize:4 FrameRate:44100.0 BigEndian:false queen-we will rock you"
        );
        assert_eq!(descriptor.bytes_per_second(), 176400.0);
    }

    #[test]
    fn test_decode_keeps_song_with_spaces() {
        let line = "Encoding:ULAW SampleRate:8000.0 SampleSizeInBits:8 Channels:1 FrameSize:1 FrameRate:8000.0 BigEndian:true xavier-song one\r\n";
        let descriptor: PlaybackDescriptor = line.parse().unwrap();
        assert_eq!(descriptor.encoding, AudioEncoding::ULaw);
        assert_eq!(descriptor.sample_rate, 8000.0);
        assert!(descriptor.big_endian);
        assert_eq!(descriptor.song, SongId::new("xavier", "song one"));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!("[ Unknown command ]".parse::<PlaybackDescriptor>().is_err());
        assert!(
            "Encoding:PCM_SIGNED SampleRate:abc SampleSizeInBits:16 Channels:2 FrameSize:4 FrameRate:44100.0 BigEndian:false a-b"
                .parse::<PlaybackDescriptor>()
                .is_err()
        );
        assert!(
            "Encoding:PCM_SIGNED SampleRate:44100.0 SampleSizeInBits:16 Channels:2 FrameSize:4 FrameRate:44100.0 BigEndian:false"
                .parse::<PlaybackDescriptor>()
                .is_err()
        );
    }
}
