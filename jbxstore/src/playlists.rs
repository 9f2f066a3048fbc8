//! Playlists nommées, persistées une par ligne
//!
//! Format d'une ligne : `name` pour une playlist vide, sinon
//! `name::artist-title;artist-title;`.

use crate::catalog::Catalog;
use crate::persistence::{append_line, read_lines, rewrite_lines};
use crate::song::SongId;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const NAME_SEPARATOR: &str = "::";
const SONG_SEPARATOR: char = ';';

/// Une playlist : un nom et une suite ordonnée de morceaux sans doublon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    name: String,
    songs: Vec<SongId>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> &[SongId] {
        &self.songs
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn contains(&self, song: &SongId) -> bool {
        self.songs.contains(song)
    }

    /// Vérifie qu'un nom peut être écrit tel quel dans le fichier
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && !name.contains(NAME_SEPARATOR)
            && !name.contains(SONG_SEPARATOR)
            && !name.chars().any(char::is_whitespace)
    }

    /// Forme persistée de la playlist
    pub fn to_line(&self) -> String {
        if self.songs.is_empty() {
            return self.name.clone();
        }
        let mut line = format!("{}{}", self.name, NAME_SEPARATOR);
        for song in &self.songs {
            line.push_str(&song.to_string());
            line.push(SONG_SEPARATOR);
        }
        line
    }

    /// Décode une ligne persistée
    ///
    /// Chaque morceau est résolu dans le catalogue ; un identifiant
    /// inconnu rend la ligne invalide.
    fn parse_line(line: &str, catalog: &Catalog) -> Option<Self> {
        let (name, songs) = match line.split_once(NAME_SEPARATOR) {
            Some((name, songs)) => (name, songs),
            None => (line, ""),
        };
        if name.is_empty() {
            return None;
        }

        let mut playlist = Playlist::new(name);
        for text in songs.split(SONG_SEPARATOR).filter(|s| !s.trim().is_empty()) {
            let song = catalog.resolve(text)?;
            if !playlist.contains(&song) {
                playlist.songs.push(song);
            }
        }
        Some(playlist)
    }
}

/// Issue d'une création de playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistCreation {
    Created,
    NameTaken,
    InvalidName,
}

/// Issue d'un ajout de morceau
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongAddition {
    Added,
    NoSuchPlaylist,
    AlreadyPresent,
}

/// Ensemble des playlists, dans l'ordre du fichier
#[derive(Debug)]
pub struct PlaylistStore {
    path: PathBuf,
    playlists: Vec<Playlist>,
}

impl PlaylistStore {
    /// Charge les playlists ; un fichier absent donne un ensemble vide
    pub fn load(path: &Path, catalog: &Catalog) -> Result<Self> {
        let mut playlists: Vec<Playlist> = Vec::new();

        if let Some(lines) = read_lines(path)? {
            for (idx, line) in lines.iter().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let playlist =
                    Playlist::parse_line(line.trim_end(), catalog).ok_or_else(|| {
                        Error::MalformedLine {
                            path: path.to_path_buf(),
                            line: idx + 1,
                            content: line.clone(),
                        }
                    })?;
                if playlists.iter().any(|p| p.name == playlist.name) {
                    warn!(path=%path.display(), name=%playlist.name, "Duplicate playlist ignored");
                    continue;
                }
                playlists.push(playlist);
            }
        }

        info!(path=%path.display(), playlists=playlists.len(), "Playlist store loaded");
        Ok(Self {
            path: path.to_path_buf(),
            playlists,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.iter()
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Crée une playlist vide et l'ajoute en fin de fichier
    pub fn create(&mut self, name: &str) -> Result<PlaylistCreation> {
        if !Playlist::is_valid_name(name) {
            return Ok(PlaylistCreation::InvalidName);
        }
        if self.contains(name) {
            return Ok(PlaylistCreation::NameTaken);
        }

        let playlist = Playlist::new(name);
        append_line(&self.path, &playlist.to_line())?;
        self.playlists.push(playlist);
        debug!(name=%name, "Playlist created");
        Ok(PlaylistCreation::Created)
    }

    /// Ajoute un morceau en fin de playlist
    ///
    /// Le fichier entier est réécrit avant que la modification ne soit
    /// appliquée en mémoire : en cas d'échec, l'état reste inchangé.
    pub fn add_song(&mut self, name: &str, song: &SongId) -> Result<SongAddition> {
        let Some(index) = self.playlists.iter().position(|p| p.name == name) else {
            return Ok(SongAddition::NoSuchPlaylist);
        };
        if self.playlists[index].contains(song) {
            return Ok(SongAddition::AlreadyPresent);
        }

        let mut updated = self.playlists[index].clone();
        updated.songs.push(song.clone());

        let lines: Vec<String> = self
            .playlists
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == index {
                    updated.to_line()
                } else {
                    p.to_line()
                }
            })
            .collect();
        rewrite_lines(&self.path, &lines)?;

        self.playlists[index] = updated;
        debug!(name=%name, song=%song, "Song added to playlist");
        Ok(SongAddition::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let mut playlist = Playlist::new("road");
        assert_eq!(playlist.to_line(), "road");

        playlist.songs.push(SongId::new("a", "b"));
        playlist.songs.push(SongId::new("c", "d"));
        assert_eq!(playlist.to_line(), "road::a-b;c-d;");
    }

    #[test]
    fn test_parse_line_resolves_songs() {
        let catalog = Catalog::from_songs([SongId::new("a-ha", "take on me")]);
        let playlist = Playlist::parse_line("eighties::a-ha-take on me;", &catalog).unwrap();
        assert_eq!(playlist.name(), "eighties");
        assert_eq!(playlist.songs(), &[SongId::new("a-ha", "take on me")]);

        assert!(Playlist::parse_line("eighties::unknown-song;", &catalog).is_none());
    }

    #[test]
    fn test_name_validity() {
        assert!(Playlist::is_valid_name("road-trip"));
        assert!(!Playlist::is_valid_name("a::b"));
        assert!(!Playlist::is_valid_name("a;b"));
        assert!(!Playlist::is_valid_name(""));
    }
}
