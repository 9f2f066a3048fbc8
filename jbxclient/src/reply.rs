//! Interprétation des réponses du serveur

use jbxplayer::PlaybackDescriptor;
use std::fmt;
use tracing::warn;

const STOPPED: &str = "[ Song stopped successfully ]";
const DISCONNECTED: &str = "[ Disconnected from server ]";

/// Réponse du serveur, vue par le client
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    /// Le serveur a accepté `play` : format du morceau à jouer localement
    Playback(PlaybackDescriptor),
    /// Réponse à `stop`
    Stopped,
    /// Dernière réponse avant la fermeture de la connexion
    Disconnected,
    /// Toute autre réponse, affichée telle quelle
    Message(String),
}

impl ServerReply {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if line.starts_with("Encoding:") {
            match line.parse::<PlaybackDescriptor>() {
                Ok(descriptor) => return ServerReply::Playback(descriptor),
                Err(e) => warn!("Unreadable playback descriptor '{}': {}", line, e),
            }
        }

        match line {
            STOPPED => ServerReply::Stopped,
            DISCONNECTED => ServerReply::Disconnected,
            other => ServerReply::Message(other.to_string()),
        }
    }
}

impl fmt::Display for ServerReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerReply::Playback(_) => f.write_str("[ Your song is now playing... ]"),
            ServerReply::Stopped => f.write_str(STOPPED),
            ServerReply::Disconnected => f.write_str(DISCONNECTED),
            ServerReply::Message(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jbxplayer::AudioEncoding;

    #[test]
    fn test_playback_reply() {
        let reply = ServerReply::parse(
            "Encoding:PCM_SIGNED SampleRate:44100.0 SampleSizeInBits:16 Channels:2 FrameSize:4 FrameRate:44100.0 BigEndian:false queen-we will rock you\n",
        );
        let ServerReply::Playback(descriptor) = &reply else {
            panic!("expected a playback reply, got {:?}", reply);
        };
        assert_eq!(descriptor.encoding, AudioEncoding::PcmSigned);
        assert_eq!(descriptor.channels, 2);
        assert_eq!(descriptor.song.to_string(), "queen-we will rock you");
        assert_eq!(reply.to_string(), "[ Your song is now playing... ]");
    }

    #[test]
    fn test_control_replies() {
        assert_eq!(ServerReply::parse("[ Song stopped successfully ]\n"), ServerReply::Stopped);
        assert_eq!(
            ServerReply::parse("[ Disconnected from server ]\r\n"),
            ServerReply::Disconnected
        );
        assert_eq!(
            ServerReply::parse("[ No results found ]\n"),
            ServerReply::Message("[ No results found ]".to_string())
        );
    }

    #[test]
    fn test_broken_descriptor_is_shown_as_is() {
        let reply = ServerReply::parse("Encoding:PCM_SIGNED SampleRate:fast");
        assert_eq!(
            reply,
            ServerReply::Message("Encoding:PCM_SIGNED SampleRate:fast".to_string())
        );
    }
}
